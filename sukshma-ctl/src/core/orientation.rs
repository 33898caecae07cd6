//! Orientation samples and Euler conversion.
//!
//! # Axis Convention
//!
//! The hand-worn sensor reports a right-handed quaternion `(w, x, y, z)`. The
//! rendering engine on the other end of the rig is left-handed, so the sample is
//! adapted as `(x, -y, -z, w)` before any other processing. This sign flip is a
//! hardware contract and is not configurable.
//!
//! Euler angles follow the engine convention: rotation order Z, then X, then Y
//! (`q = qy * qx * qz`), reported in degrees wrapped into `[0, 360)`.

use glam::Quat;
use serde::{Deserialize, Serialize};

/// Raw quaternion assembled from the two orientation CAN frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSample {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl OrientationSample {
    pub fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// Engine-space quaternion `(x, -y, -z, w)`.
    pub fn to_engine_quat(&self) -> Quat {
        Quat::from_xyzw(self.x, -self.y, -self.z, self.w)
    }
}

/// Euler axis selector used by zone rules and control mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EulerAxis {
    X,
    Y,
    Z,
}

/// Euler angles in degrees, each wrapped into `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Above this |sin(pitch)| the X rotation is treated as ±90° and roll is folded into yaw.
const GIMBAL_LOCK_THRESHOLD: f32 = 0.999_999;

impl EulerAngles {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: wrap_degrees(x),
            y: wrap_degrees(y),
            z: wrap_degrees(z),
        }
    }

    /// Decompose a rotation using the engine's Z-X-Y order.
    pub fn from_quat(q: Quat) -> Self {
        let q = if q.length_squared() > f32::EPSILON {
            q.normalize()
        } else {
            Quat::IDENTITY
        };

        let sin_x = (2.0 * (q.w * q.x - q.y * q.z)).clamp(-1.0, 1.0);
        let x = sin_x.asin();

        let (y, z) = if sin_x.abs() >= GIMBAL_LOCK_THRESHOLD {
            (2.0 * q.y.atan2(q.w), 0.0)
        } else {
            let y = (2.0 * (q.w * q.y + q.x * q.z)).atan2(1.0 - 2.0 * (q.x * q.x + q.y * q.y));
            let z = (2.0 * (q.w * q.z + q.x * q.y)).atan2(1.0 - 2.0 * (q.x * q.x + q.z * q.z));
            (y, z)
        };

        Self::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    }

    /// Angle about the given axis.
    #[inline]
    pub fn axis(&self, axis: EulerAxis) -> f32 {
        match axis {
            EulerAxis::X => self.x,
            EulerAxis::Y => self.y,
            EulerAxis::Z => self.z,
        }
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
#[inline]
pub fn wrap_degrees(deg: f32) -> f32 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}
