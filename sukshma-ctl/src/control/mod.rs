//! Control value mapping and serial command output.
//!
//! - [`mapping`]: Wrap-aware piecewise maps from Euler axes to control values
//! - [`command`]: [`ControlCommand`] and its wire formats
//! - [`emitter`]: Line writer over the serial transport

pub mod command;
pub mod emitter;
pub mod mapping;

pub use command::{ControlCommand, PayloadFormat};
pub use emitter::SerialEmitter;
pub use mapping::{AxisMapping, ControlMapper, PiecewiseMap};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[control]` section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Period of the stream loop while a mode is streaming (default: 100)
    #[serde(default = "default_stream_interval_ms")]
    pub stream_interval_ms: u64,

    #[serde(default)]
    pub format: PayloadFormat,

    /// Command values before the first stream (default: X0 Y0 Z0 L5)
    #[serde(default)]
    pub initial: ControlCommand,

    #[serde(default = "AxisMapping::default_pan")]
    pub pan: AxisMapping,

    #[serde(default = "AxisMapping::default_tilt")]
    pub tilt: AxisMapping,

    #[serde(default = "AxisMapping::default_zoom")]
    pub zoom: AxisMapping,

    #[serde(default = "AxisMapping::default_light")]
    pub light: AxisMapping,
}

fn default_stream_interval_ms() -> u64 {
    100
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            stream_interval_ms: default_stream_interval_ms(),
            format: PayloadFormat::default(),
            initial: ControlCommand::default(),
            pan: AxisMapping::default_pan(),
            tilt: AxisMapping::default_tilt(),
            zoom: AxisMapping::default_zoom(),
            light: AxisMapping::default_light(),
        }
    }
}

impl ControlConfig {
    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms)
    }

    pub fn mapper(&self) -> ControlMapper {
        ControlMapper {
            pan: self.pan,
            tilt: self.tilt,
            zoom: self.zoom,
            light: self.light,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.stream_interval_ms == 0 {
            return Err(Error::Config(
                "control.stream_interval_ms must be greater than 0".to_string(),
            ));
        }
        for (name, m) in [
            ("pan", &self.pan),
            ("tilt", &self.tilt),
            ("zoom", &self.zoom),
            ("light", &self.light),
        ] {
            if !(0.0..360.0).contains(&m.map.wrap_above) {
                return Err(Error::Config(format!(
                    "control.{}.wrap_above must be in [0, 360), got {}",
                    name, m.map.wrap_above
                )));
            }
        }
        Ok(())
    }
}
