//! Control command and its wire encodings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current control values sent to the rig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlCommand {
    /// Pan
    pub x: i32,
    /// Tilt
    pub y: i32,
    /// Zoom
    pub z: i32,
    pub light: i32,
}

impl Default for ControlCommand {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            z: 0,
            light: 5,
        }
    }
}

/// Outbound line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// `X20,Y-5,Z0,L5`
    #[default]
    Compact,
    /// `X:20.00,Y:-5.00,Z:0.00`
    Labeled,
    /// `X:20.00,Y:-5.00,Z:0.00,L:1,B:1`
    LabeledWithFlags,
}

impl ControlCommand {
    /// Encode without the line terminator
    pub fn encode(&self, format: PayloadFormat) -> String {
        match format {
            PayloadFormat::Compact => {
                format!("X{},Y{},Z{},L{}", self.x, self.y, self.z, self.light)
            }
            PayloadFormat::Labeled => self.labeled(),
            PayloadFormat::LabeledWithFlags => {
                let light_on = u8::from(self.light > 0);
                format!("{},L:{},B:1", self.labeled(), light_on)
            }
        }
    }

    fn labeled(&self) -> String {
        format!(
            "X:{:.2},Y:{:.2},Z:{:.2}",
            self.x as f32, self.y as f32, self.z as f32
        )
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode(PayloadFormat::Compact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_values() {
        let cmd = ControlCommand::default();
        assert_eq!(cmd.encode(PayloadFormat::Compact), "X0,Y0,Z0,L5");
    }

    #[test]
    fn test_compact_negative() {
        let cmd = ControlCommand {
            x: -45,
            y: 70,
            z: -35,
            light: 0,
        };
        assert_eq!(cmd.encode(PayloadFormat::Compact), "X-45,Y70,Z-35,L0");
        assert_eq!(cmd.to_string(), "X-45,Y70,Z-35,L0");
    }

    #[test]
    fn test_labeled() {
        let cmd = ControlCommand {
            x: 20,
            y: -5,
            z: 0,
            light: 0,
        };
        assert_eq!(cmd.encode(PayloadFormat::Labeled), "X:20.00,Y:-5.00,Z:0.00");
        assert_eq!(
            cmd.encode(PayloadFormat::LabeledWithFlags),
            "X:20.00,Y:-5.00,Z:0.00,L:0,B:1"
        );

        let lit = ControlCommand { light: 3, ..cmd };
        assert!(lit.encode(PayloadFormat::LabeledWithFlags).ends_with(",L:1,B:1"));
    }
}
