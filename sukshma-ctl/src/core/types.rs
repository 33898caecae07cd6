//! Interaction vocabulary shared across modules.
//!
//! Key types:
//! - [`HoverZone`]: Region of orientation space that highlights a candidate action
//! - [`ButtonEdge`]: Edge-detected button transition
//! - [`ControlMode`]: Modes that stream control values to the rig
//! - [`InteractionMode`]: State machine node owned by [`crate::interaction::Interaction`]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hover zone selected by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoverZone {
    #[default]
    None,
    Unlock,
    Cancel,
    Zoom,
    Light,
}

impl HoverZone {
    /// Zones that own a hover target on the UI surface
    pub const SELECTABLE: [HoverZone; 4] = [
        HoverZone::Unlock,
        HoverZone::Cancel,
        HoverZone::Zoom,
        HoverZone::Light,
    ];

    /// Control mode entered when this zone is confirmed, if any
    pub fn control_mode(self) -> Option<ControlMode> {
        match self {
            HoverZone::Unlock => Some(ControlMode::Unlock),
            HoverZone::Zoom => Some(ControlMode::Zoom),
            HoverZone::Light => Some(ControlMode::Light),
            HoverZone::Cancel | HoverZone::None => None,
        }
    }
}

/// Button transition reported by the input channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEdge {
    Pressed,
    Released,
}

/// Modes that stream control values over serial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlMode {
    /// Pan/tilt of the microscope head
    Unlock,
    Zoom,
    Light,
}

impl ControlMode {
    pub fn interaction_mode(self) -> InteractionMode {
        match self {
            ControlMode::Unlock => InteractionMode::Unlocked,
            ControlMode::Zoom => InteractionMode::ZoomActive,
            ControlMode::Light => InteractionMode::LightActive,
        }
    }

    /// Zoom and light modes drive a slider on the UI surface
    pub fn has_slider(self) -> bool {
        matches!(self, ControlMode::Zoom | ControlMode::Light)
    }
}

/// Interaction state machine node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    /// Button held, UI container visible, zone tracked every tick
    Hovering(HoverZone),
    Unlocked,
    ZoomActive,
    LightActive,
}

impl InteractionMode {
    pub fn control_mode(self) -> Option<ControlMode> {
        match self {
            InteractionMode::Unlocked => Some(ControlMode::Unlock),
            InteractionMode::ZoomActive => Some(ControlMode::Zoom),
            InteractionMode::LightActive => Some(ControlMode::Light),
            InteractionMode::Idle | InteractionMode::Hovering(_) => None,
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionMode::Idle => write!(f, "Idle"),
            InteractionMode::Hovering(zone) => write!(f, "Hovering({:?})", zone),
            InteractionMode::Unlocked => write!(f, "Unlocked"),
            InteractionMode::ZoomActive => write!(f, "ZoomActive"),
            InteractionMode::LightActive => write!(f, "LightActive"),
        }
    }
}
