//! Orientation-to-control-value mapping.
//!
//! Each control value is a clamped linear map over a band of one Euler axis.
//! Euler angles live in `[0, 360)`, so bands near 0° would be split in two.
//! Instead, angles above `wrap_above` are shifted down by 360° before mapping
//! and the band edges go through the same shift, turning e.g. the pan band
//! `337.5..22.5` into the contiguous `-22.5..22.5`.

use crate::core::orientation::{wrap_degrees, EulerAngles, EulerAxis};
use crate::core::types::ControlMode;
use serde::{Deserialize, Serialize};

use super::command::ControlCommand;

/// Clamped, wrap-aware linear map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PiecewiseMap {
    /// Angle mapped to `out_start`
    pub in_start: f32,
    /// Angle mapped to `out_end`
    pub in_end: f32,
    pub out_start: f32,
    pub out_end: f32,
    /// Angles strictly above this are treated as negative (`a - 360`)
    pub wrap_above: f32,
}

impl PiecewiseMap {
    pub const fn new(in_start: f32, in_end: f32, out_start: f32, out_end: f32, wrap_above: f32) -> Self {
        Self {
            in_start,
            in_end,
            out_start,
            out_end,
            wrap_above,
        }
    }

    #[inline]
    fn signed(&self, deg: f32) -> f32 {
        if deg > self.wrap_above {
            deg - 360.0
        } else {
            deg
        }
    }

    /// Continuous output for an angle in degrees
    pub fn map(&self, angle: f32) -> f32 {
        let a = self.signed(wrap_degrees(angle));
        let start = self.signed(self.in_start);
        let end = self.signed(self.in_end);

        let span = end - start;
        if span.abs() < f32::EPSILON {
            return if a < start { self.out_start } else { self.out_end };
        }

        let t = ((a - start) / span).clamp(0.0, 1.0);
        self.out_start + t * (self.out_end - self.out_start)
    }

    /// Output rounded half-to-even, as sent on the wire
    pub fn map_int(&self, angle: f32) -> i32 {
        self.map(angle).round_ties_even() as i32
    }
}

/// A map bound to the Euler axis it reads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisMapping {
    pub source: EulerAxis,
    #[serde(flatten)]
    pub map: PiecewiseMap,
}

impl AxisMapping {
    pub const fn new(source: EulerAxis, map: PiecewiseMap) -> Self {
        Self { source, map }
    }

    pub fn value(&self, euler: &EulerAngles) -> f32 {
        self.map.map(euler.axis(self.source))
    }

    pub fn default_pan() -> Self {
        Self::new(EulerAxis::X, PiecewiseMap::new(337.5, 22.5, 45.0, -45.0, 180.0))
    }

    pub fn default_tilt() -> Self {
        Self::new(EulerAxis::Y, PiecewiseMap::new(300.0, 330.0, -20.0, 70.0, 180.0))
    }

    pub fn default_zoom() -> Self {
        Self::new(EulerAxis::Y, PiecewiseMap::new(290.0, 335.0, -35.0, 65.0, 179.0))
    }

    pub fn default_light() -> Self {
        Self::new(EulerAxis::Y, PiecewiseMap::new(290.0, 335.0, 0.0, 10.0, 179.0))
    }
}

/// Per-mode mapping set
#[derive(Debug, Clone, PartialEq)]
pub struct ControlMapper {
    pub pan: AxisMapping,
    pub tilt: AxisMapping,
    pub zoom: AxisMapping,
    pub light: AxisMapping,
}

impl Default for ControlMapper {
    fn default() -> Self {
        Self {
            pan: AxisMapping::default_pan(),
            tilt: AxisMapping::default_tilt(),
            zoom: AxisMapping::default_zoom(),
            light: AxisMapping::default_light(),
        }
    }
}

impl ControlMapper {
    /// Update the fields `mode` drives.
    ///
    /// Returns the continuous slider level for Zoom and Light.
    pub fn apply(&self, mode: ControlMode, euler: &EulerAngles, cmd: &mut ControlCommand) -> Option<f32> {
        match mode {
            ControlMode::Unlock => {
                cmd.x = round(self.pan.value(euler));
                cmd.y = round(self.tilt.value(euler));
                None
            }
            ControlMode::Zoom => {
                let level = self.zoom.value(euler);
                cmd.z = round(level);
                Some(level)
            }
            ControlMode::Light => {
                let level = self.light.value(euler);
                cmd.light = round(level);
                Some(level)
            }
        }
    }
}

#[inline]
fn round(v: f32) -> i32 {
    v.round_ties_even() as i32
}
