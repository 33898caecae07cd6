//! Zero-reference calibration of the orientation stream.
//!
//! The first sample after arming becomes the reference pose: its inverse is
//! stored and every later sample is rotated by it, so the reference pose reads
//! as identity. `reset_imu` re-arms the latch; the next sample becomes the new
//! reference. There is deliberately no smoothing or outlier rejection.

use crate::core::orientation::OrientationSample;
use glam::Quat;

#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    offset: Option<Quat>,
    calibrated: Option<Quat>,
}

impl Calibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calibrate a raw sample (engine axes are applied here)
    pub fn apply(&mut self, sample: &OrientationSample) -> Quat {
        self.apply_quat(sample.to_engine_quat())
    }

    /// Calibrate an engine-space quaternion
    pub fn apply_quat(&mut self, raw: Quat) -> Quat {
        // The sensor does not guarantee unit length
        let raw = if raw.length_squared() > f32::EPSILON {
            raw.normalize()
        } else {
            Quat::IDENTITY
        };
        let offset = *self.offset.get_or_insert_with(|| {
            log::info!("Calibration reference captured");
            raw.inverse()
        });
        let calibrated = offset * raw;
        self.calibrated = Some(calibrated);
        calibrated
    }

    /// Forget the reference; the next sample becomes the new zero pose
    pub fn reset_imu(&mut self) {
        log::info!("IMU calibration reset");
        self.offset = None;
    }

    pub fn is_offset_set(&self) -> bool {
        self.offset.is_some()
    }

    /// Latest calibrated orientation, identity before the first sample
    pub fn calibrated(&self) -> Quat {
        self.calibrated.unwrap_or(Quat::IDENTITY)
    }
}
