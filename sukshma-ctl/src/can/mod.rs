//! CAN bus access for the orientation sensor.
//!
//! The sensor publishes its quaternion as two fixed-ID frames at 125 kbit/s:
//!
//! | ID      | Bytes 0-3 (LE f32) | Bytes 4-7 (LE f32) |
//! |---------|--------------------|--------------------|
//! | `0x514` | w                  | x                  |
//! | `0x515` | y                  | z                  |
//!
//! - [`CanBus`]: Trait implemented by CAN adapters
//! - [`slcan::SlcanBus`]: Serial-line CAN adapter (Lawicel ASCII protocol)
//! - [`mock::MockCanBus`]: Scripted bus for tests and hardware-free runs
//! - [`reader::OrientationReader`]: Frame-pair assembly into orientation samples

pub mod mock;
pub mod reader;
pub mod slcan;

use crate::error::Result;

/// Frame carrying the (w, x) half of the orientation quaternion
pub const ORIENTATION_ID_WX: u32 = 0x514;
/// Frame carrying the (y, z) half of the orientation quaternion
pub const ORIENTATION_ID_YZ: u32 = 0x515;
/// Bus bitrate used by the orientation sensor
pub const ORIENTATION_BITRATE: u32 = 125_000;

/// Classic CAN data frame (up to 8 data bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFrame {
    pub id: u32,
    len: u8,
    data: [u8; 8],
}

impl CanFrame {
    /// Build a frame; payload beyond 8 bytes is truncated
    pub fn new(id: u32, payload: &[u8]) -> Self {
        let len = payload.len().min(8);
        let mut data = [0u8; 8];
        data[..len].copy_from_slice(&payload[..len]);
        Self {
            id,
            len: len as u8,
            data,
        }
    }

    /// Frame with two little-endian f32 values (the orientation frame layout)
    pub fn from_f32_pair(id: u32, first: f32, second: f32) -> Self {
        let mut payload = [0u8; 8];
        payload[..4].copy_from_slice(&first.to_le_bytes());
        payload[4..].copy_from_slice(&second.to_le_bytes());
        Self::new(id, &payload)
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// Decode bytes 0-3 and 4-7 as little-endian f32
    pub fn f32_pair(&self) -> Option<(f32, f32)> {
        if self.len < 8 {
            return None;
        }
        let first = f32::from_le_bytes([self.data[0], self.data[1], self.data[2], self.data[3]]);
        let second = f32::from_le_bytes([self.data[4], self.data[5], self.data[6], self.data[7]]);
        Some((first, second))
    }
}

/// CAN adapter trait
pub trait CanBus: Send {
    /// Read the next received frame
    ///
    /// Returns `Ok(None)` when the receive queue is empty; that is the normal
    /// steady state, not an error. Any other adapter status is an `Err`.
    fn read_frame(&mut self) -> Result<Option<CanFrame>>;

    /// Release the adapter (take the channel off the bus)
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
