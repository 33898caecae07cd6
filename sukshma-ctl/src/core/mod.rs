//! Core data types shared by the input, classification and control layers.
//!
//! - [`orientation`]: Raw CAN orientation samples and engine-convention Euler angles
//! - [`types`]: Hover zones, button edges and interaction modes

pub mod orientation;
pub mod types;
