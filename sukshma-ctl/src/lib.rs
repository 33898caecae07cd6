//! SukshmaCtl - Gesture control core for a motorized AR microscope rig
//!
//! A hand-worn orientation sensor (quaternion over CAN) and a single button
//! (serial line) drive a small modal interface: hold the button to hover over
//! actions, release to select, and in a control mode hold the button to stream
//! pan/tilt, zoom or light values to the rig over serial.
//!
//! ## Modules
//!
//! - [`can`]: CAN adapters and orientation frame assembly
//! - [`calibration`]: Zero-reference calibration
//! - [`zones`]: Hover zone classification
//! - [`input`]: Button reader thread, keyboard fallback, edge detection
//! - [`interaction`]: Mode state machine
//! - [`control`]: Value mapping, command encoding, serial output
//! - [`scheduler`]: Cooperative timers for stream loops and delayed hides
//! - [`ui`]: Visibility surface implemented by the renderer
//! - [`course`]: Optional training course tracker
//! - [`app`]: Wiring and the tick loop

pub mod app;
pub mod calibration;
pub mod can;
pub mod config;
pub mod control;
pub mod core;
pub mod course;
pub mod error;
pub mod input;
pub mod interaction;
pub mod scheduler;
pub mod transport;
pub mod ui;
pub mod zones;

// Re-export commonly used types
pub use app::App;
pub use config::SukshmaConfig;
pub use crate::core::orientation::{EulerAngles, OrientationSample};
pub use crate::core::types::{ButtonEdge, ControlMode, HoverZone, InteractionMode};
pub use error::{Error, Result};
