//! Configuration for SukshmaCtl
//!
//! Loaded from a TOML file. Every section and field is optional; anything
//! missing falls back to the rig's stock values, so an empty file is a valid
//! configuration.
//!
//! ```toml
//! [can]
//! adapter_port = "/dev/ttyACM0"
//! poll_every_n_ticks = 1
//!
//! [serial]
//! port = "/dev/ttyUSB0"
//! baud_rate = 115200
//!
//! [zones]
//! fallback = "none"
//! [[zones.rules]]
//! zone = "unlock"
//! axis = "x"
//! ranges = [{ min = 330.0, max = 353.0 }]
//!
//! [control]
//! format = "compact"
//! pan = { source = "x", in_start = 337.5, in_end = 22.5, out_start = 45.0, out_end = -45.0, wrap_above = 180.0 }
//! ```

use crate::can::ORIENTATION_BITRATE;
use crate::control::ControlConfig;
use crate::course::CourseConfig;
use crate::error::{Error, Result};
use crate::input::keyboard::ConsoleKeys;
use crate::interaction::InteractionConfig;
use crate::zones::ZoneTable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct SukshmaConfig {
    #[serde(default)]
    pub can: CanConfig,
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub zones: ZoneTable,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub course: CourseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// CAN adapter (SLCAN dongle) settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CanConfig {
    /// Serial device of the SLCAN adapter (default: /dev/ttyACM0)
    #[serde(default = "default_adapter_port")]
    pub adapter_port: String,

    /// Baud rate of the adapter's serial link (default: 115200)
    #[serde(default = "default_baud")]
    pub adapter_baud: u32,

    /// CAN bus bitrate in bit/s (default: 125000)
    #[serde(default = "default_bitrate")]
    pub bitrate: u32,

    /// Poll the adapter on every Nth tick (default: 1)
    #[serde(default = "default_poll_every_n_ticks")]
    pub poll_every_n_ticks: u32,

    /// Frames drained per poll (default: 8)
    #[serde(default = "default_max_frames_per_poll")]
    pub max_frames_per_poll: usize,
}

/// Button / command serial port
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SerialConfig {
    /// Serial device (default: /dev/ttyUSB0)
    #[serde(default = "default_serial_port")]
    pub port: String,

    /// Baud rate (default: 115200)
    #[serde(default = "default_baud")]
    pub baud_rate: u32,

    /// Blocking read timeout of the button reader (default: 100)
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// stdin operator console
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConsoleConfig {
    /// Read keys from stdin (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Key standing in for a button press in keyboard fallback (default: b)
    #[serde(default = "default_press_key")]
    pub press_key: char,

    /// Key standing in for a button release in keyboard fallback (default: n)
    #[serde(default = "default_release_key")]
    pub release_key: char,

    /// Key that re-arms orientation calibration (default: r)
    #[serde(default = "default_reset_key")]
    pub reset_key: char,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_adapter_port() -> String {
    "/dev/ttyACM0".to_string()
}

fn default_serial_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud() -> u32 {
    115_200
}

fn default_bitrate() -> u32 {
    ORIENTATION_BITRATE
}

fn default_poll_every_n_ticks() -> u32 {
    1
}

fn default_max_frames_per_poll() -> usize {
    8
}

fn default_read_timeout_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

fn default_press_key() -> char {
    'b'
}

fn default_release_key() -> char {
    'n'
}

fn default_reset_key() -> char {
    'r'
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CanConfig {
    fn default() -> Self {
        Self {
            adapter_port: default_adapter_port(),
            adapter_baud: default_baud(),
            bitrate: default_bitrate(),
            poll_every_n_ticks: default_poll_every_n_ticks(),
            max_frames_per_poll: default_max_frames_per_poll(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            press_key: default_press_key(),
            release_key: default_release_key(),
            reset_key: default_reset_key(),
        }
    }
}

impl ConsoleConfig {
    pub fn keys(&self) -> ConsoleKeys {
        ConsoleKeys {
            press: self.press_key,
            release: self.release_key,
            reset: self.reset_key,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SukshmaConfig {
    /// Load and validate a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: SukshmaConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = self.to_toml()?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.can.poll_every_n_ticks == 0 {
            return Err(Error::Config(
                "can.poll_every_n_ticks must be at least 1".to_string(),
            ));
        }
        if self.can.max_frames_per_poll == 0 {
            return Err(Error::Config(
                "can.max_frames_per_poll must be at least 1".to_string(),
            ));
        }
        crate::can::slcan::bitrate_command(self.can.bitrate)
            .map_err(|e| Error::Config(e.to_string()))?;

        let keys = self.console.keys();
        if keys.press == keys.release || keys.press == keys.reset || keys.release == keys.reset {
            return Err(Error::Config("console keys must be distinct".to_string()));
        }

        self.interaction.validate()?;
        self.zones.validate()?;
        self.control.validate()?;
        self.course.validate()?;
        Ok(())
    }
}
