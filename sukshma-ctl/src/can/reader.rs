//! Orientation sample assembly from CAN frames

use super::{CanBus, CanFrame, ORIENTATION_ID_WX, ORIENTATION_ID_YZ};
use crate::core::orientation::OrientationSample;
use crate::error::Error;

/// Polls a CAN adapter and pairs the two orientation frames into samples.
///
/// Each half of the quaternion is latched as it arrives. A sample is produced
/// only once both halves have been seen since the previous sample, after which
/// both latches are cleared. A reader without a bus (adapter failed to open) is
/// disabled and never produces samples.
pub struct OrientationReader {
    bus: Option<Box<dyn CanBus>>,
    wx: Option<(f32, f32)>,
    yz: Option<(f32, f32)>,
    poll_every_n_ticks: u32,
    max_frames_per_poll: usize,
    tick: u64,
}

impl OrientationReader {
    pub fn new(bus: Box<dyn CanBus>, poll_every_n_ticks: u32, max_frames_per_poll: usize) -> Self {
        Self {
            bus: Some(bus),
            wx: None,
            yz: None,
            poll_every_n_ticks: poll_every_n_ticks.max(1),
            max_frames_per_poll: max_frames_per_poll.max(1),
            tick: 0,
        }
    }

    /// Reader with no adapter; used when CAN initialization failed
    pub fn disabled() -> Self {
        Self {
            bus: None,
            wx: None,
            yz: None,
            poll_every_n_ticks: 1,
            max_frames_per_poll: 1,
            tick: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.bus.is_some()
    }

    /// Called once per main-loop tick.
    ///
    /// Returns the most recent sample completed during this poll, if any.
    pub fn poll(&mut self) -> Option<OrientationSample> {
        let tick = self.tick;
        self.tick = self.tick.wrapping_add(1);
        if tick % u64::from(self.poll_every_n_ticks) != 0 {
            return None;
        }

        let mut latest = None;
        for _ in 0..self.max_frames_per_poll {
            let bus = self.bus.as_mut()?;
            match bus.read_frame() {
                Ok(Some(frame)) => {
                    if let Some(sample) = self.ingest(&frame) {
                        latest = Some(sample);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    log::warn!("CAN read failed, skipping tick: {}", e);
                    break;
                }
            }
        }
        latest
    }

    /// Feed one frame through the half-latches
    pub fn ingest(&mut self, frame: &CanFrame) -> Option<OrientationSample> {
        if frame.id != ORIENTATION_ID_WX && frame.id != ORIENTATION_ID_YZ {
            return None;
        }

        let Some(pair) = frame.f32_pair() else {
            log::debug!(
                "Dropping short orientation frame 0x{:03X} ({} bytes)",
                frame.id,
                frame.payload().len()
            );
            return None;
        };

        if frame.id == ORIENTATION_ID_WX {
            self.wx = Some(pair);
        } else {
            self.yz = Some(pair);
        }

        match (self.wx, self.yz) {
            (Some((w, x)), Some((y, z))) => {
                self.wx = None;
                self.yz = None;
                Some(OrientationSample::new(w, x, y, z))
            }
            _ => None,
        }
    }

    /// Take the adapter off the bus; the reader is disabled afterwards
    pub fn close(&mut self) {
        if let Some(mut bus) = self.bus.take() {
            match bus.close() {
                Ok(()) => log::info!("CAN adapter released"),
                Err(Error::Can(msg)) => log::warn!("CAN adapter close reported: {}", msg),
                Err(e) => log::error!("Failed to release CAN adapter: {}", e),
            }
        }
    }
}

impl Drop for OrientationReader {
    fn drop(&mut self) {
        self.close();
    }
}
