//! Serial-line CAN (SLCAN / Lawicel) adapter
//!
//! USB-CAN dongles that speak the Lawicel ASCII protocol show up as a plain
//! serial port. Commands and received frames are `\r`-terminated lines:
//!
//! | Line             | Meaning                                   |
//! |------------------|-------------------------------------------|
//! | `S4`             | Select 125 kbit/s (see [`bitrate_command`]) |
//! | `O` / `C`        | Open / close the CAN channel              |
//! | `tIIILDD..`      | Standard frame: 3 hex ID, DLC, data bytes |
//! | `TIIIIIIIILDD..` | Extended frame: 8 hex ID, DLC, data bytes |
//! | `\x07` (BEL)     | Adapter error status                      |
//!
//! An optional 4-hex-digit timestamp after the data is tolerated and ignored.

use super::{CanBus, CanFrame};
use crate::error::{Error, Result};
use crate::transport::{SerialTransport, Transport};
use std::collections::VecDeque;
use std::time::Duration;

const CR: u8 = b'\r';
const BEL: u8 = 0x07;

/// Longest valid line: `T` + 8 ID + DLC + 16 data + 4 timestamp
const MAX_LINE_LEN: usize = 30;

/// Bounded number of reads per fill so a chatty bus cannot stall the tick
const MAX_READS_PER_FILL: usize = 4;

/// Time the adapter gets to answer the close/bitrate commands
const SETUP_SETTLE: Duration = Duration::from_millis(10);

/// Setup command for a CAN bitrate
pub fn bitrate_command(bitrate: u32) -> Result<&'static str> {
    let cmd = match bitrate {
        10_000 => "S0\r",
        20_000 => "S1\r",
        50_000 => "S2\r",
        100_000 => "S3\r",
        125_000 => "S4\r",
        250_000 => "S5\r",
        500_000 => "S6\r",
        800_000 => "S7\r",
        1_000_000 => "S8\r",
        other => return Err(Error::UnsupportedBitrate(other)),
    };
    Ok(cmd)
}

/// SLCAN adapter over any [`Transport`]
pub struct SlcanBus<T: Transport> {
    transport: T,
    line: Vec<u8>,
    frames: VecDeque<CanFrame>,
    adapter_errors: usize,
    open: bool,
}

impl SlcanBus<SerialTransport> {
    /// Open an SLCAN dongle on a serial device and bring the channel up
    pub fn open_serial(path: &str, baud_rate: u32, bitrate: u32) -> Result<Self> {
        let transport = SerialTransport::open(path, baud_rate, Duration::from_millis(1))?;
        Self::open(transport, bitrate)
    }
}

impl<T: Transport> SlcanBus<T> {
    /// Configure the bitrate and open the channel
    pub fn open(mut transport: T, bitrate: u32) -> Result<Self> {
        let setup = bitrate_command(bitrate)?;

        // Close first in case a previous session left the channel open
        transport.write_all(b"C\r")?;
        transport.write_all(setup.as_bytes())?;
        transport.flush()?;

        // A channel that was already closed answers `C` with BEL
        std::thread::sleep(SETUP_SETTLE);
        let discarded = drain_replies(&mut transport)?;
        if discarded > 0 {
            log::debug!("SLCAN: discarded {} bytes of setup replies", discarded);
        }

        transport.write_all(b"O\r")?;
        transport.flush()?;

        log::info!("SLCAN channel open at {} bit/s", bitrate);

        Ok(Self {
            transport,
            line: Vec::with_capacity(MAX_LINE_LEN),
            frames: VecDeque::new(),
            adapter_errors: 0,
            open: true,
        })
    }

    fn fill(&mut self) -> Result<()> {
        let mut buf = [0u8; 256];
        for _ in 0..MAX_READS_PER_FILL {
            let n = self.transport.read(&mut buf)?;
            if n == 0 {
                break;
            }
            self.push_bytes(&buf[..n]);
            if n < buf.len() {
                break;
            }
        }
        Ok(())
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            match b {
                BEL => {
                    self.adapter_errors += 1;
                    self.line.clear();
                }
                CR | b'\n' => {
                    if !self.line.is_empty() {
                        match parse_frame(&self.line) {
                            Some(frame) => self.frames.push_back(frame),
                            None => log::trace!(
                                "SLCAN: ignoring line {:?}",
                                String::from_utf8_lossy(&self.line)
                            ),
                        }
                        self.line.clear();
                    }
                }
                _ => {
                    if self.line.len() < MAX_LINE_LEN {
                        self.line.push(b);
                    } else {
                        log::warn!("SLCAN: line overflow, resynchronizing");
                        self.line.clear();
                    }
                }
            }
        }
    }
}

impl<T: Transport> CanBus for SlcanBus<T> {
    fn read_frame(&mut self) -> Result<Option<CanFrame>> {
        if !self.open {
            return Err(Error::Can("channel closed".to_string()));
        }
        if self.frames.is_empty() {
            self.fill()?;
        }
        if self.adapter_errors > 0 {
            self.adapter_errors -= 1;
            return Err(Error::Can("adapter reported error status".to_string()));
        }
        Ok(self.frames.pop_front())
    }

    fn close(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.transport.write_all(b"C\r")?;
        self.transport.flush()?;
        log::info!("SLCAN channel closed");
        Ok(())
    }
}

/// Read and drop whatever the adapter has queued; returns the byte count
fn drain_replies<T: Transport>(transport: &mut T) -> Result<usize> {
    let mut buf = [0u8; 64];
    let mut total = 0;
    for _ in 0..MAX_READS_PER_FILL {
        let n = transport.read(&mut buf)?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

/// Parse one received SLCAN line (without the terminating `\r`)
pub fn parse_frame(line: &[u8]) -> Option<CanFrame> {
    let (&kind, rest) = line.split_first()?;
    let id_len = match kind {
        b't' => 3,
        b'T' => 8,
        _ => return None,
    };
    if rest.len() < id_len + 1 {
        return None;
    }

    let id = parse_hex(&rest[..id_len])?;
    let dlc = parse_hex(&rest[id_len..id_len + 1])? as usize;
    if dlc > 8 {
        return None;
    }

    let data_hex = &rest[id_len + 1..];
    if data_hex.len() < dlc * 2 {
        return None;
    }

    let mut data = [0u8; 8];
    for (i, byte) in data.iter_mut().take(dlc).enumerate() {
        *byte = parse_hex(&data_hex[i * 2..i * 2 + 2])? as u8;
    }

    Some(CanFrame::new(id, &data[..dlc]))
}

fn parse_hex(digits: &[u8]) -> Option<u32> {
    if !digits.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let s = std::str::from_utf8(digits).ok()?;
    u32::from_str_radix(s, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::can::{ORIENTATION_ID_WX, ORIENTATION_ID_YZ};
    use crate::transport::MockTransport;

    fn encode(frame: &CanFrame) -> String {
        let mut line = format!("t{:03X}{}", frame.id, frame.payload().len());
        for b in frame.payload() {
            line.push_str(&format!("{:02X}", b));
        }
        line.push('\r');
        line
    }

    #[test]
    fn test_open_sends_setup_sequence() {
        let mock = MockTransport::new();
        let _bus = SlcanBus::open(mock.clone(), 125_000).unwrap();
        assert_eq!(mock.get_written(), b"C\rS4\rO\r");
    }

    #[test]
    fn test_unsupported_bitrate() {
        let result = SlcanBus::open(MockTransport::new(), 123_456);
        assert!(matches!(result, Err(Error::UnsupportedBitrate(123_456))));
    }

    #[test]
    fn test_reads_orientation_frames() {
        let mock = MockTransport::new();
        let mut bus = SlcanBus::open(mock.clone(), 125_000).unwrap();

        let wx = CanFrame::from_f32_pair(ORIENTATION_ID_WX, 1.0, 0.0);
        let yz = CanFrame::from_f32_pair(ORIENTATION_ID_YZ, 0.5, -0.5);
        // Acks for the setup commands arrive first as empty lines
        mock.inject_read(b"\r\r\r");
        mock.inject_read(encode(&wx).as_bytes());
        mock.inject_read(encode(&yz).as_bytes());

        assert_eq!(bus.read_frame().unwrap(), Some(wx));
        assert_eq!(bus.read_frame().unwrap(), Some(yz));
        assert_eq!(bus.read_frame().unwrap(), None);
    }

    #[test]
    fn test_frame_split_across_reads() {
        let mock = MockTransport::new();
        let mut bus = SlcanBus::open(mock.clone(), 125_000).unwrap();

        let frame = CanFrame::from_f32_pair(ORIENTATION_ID_YZ, 0.25, 0.75);
        let text = encode(&frame);
        let (a, b) = text.split_at(7);

        mock.inject_read(a.as_bytes());
        assert_eq!(bus.read_frame().unwrap(), None);
        mock.inject_read(b.as_bytes());
        assert_eq!(bus.read_frame().unwrap(), Some(frame));
    }

    #[test]
    fn test_bell_is_error_status() {
        let mock = MockTransport::new();
        let mut bus = SlcanBus::open(mock.clone(), 125_000).unwrap();
        mock.inject_read(&[BEL]);
        assert!(matches!(bus.read_frame(), Err(Error::Can(_))));
        assert_eq!(bus.read_frame().unwrap(), None);
    }

    #[test]
    fn test_setup_replies_are_not_errors() {
        let mock = MockTransport::new();
        // BEL for closing an already-closed channel, ack for the bitrate
        mock.inject_read(&[BEL, CR]);
        let mut bus = SlcanBus::open(mock.clone(), 125_000).unwrap();
        assert_eq!(bus.read_frame().unwrap(), None);

        let frame = CanFrame::from_f32_pair(ORIENTATION_ID_WX, 1.0, 0.0);
        mock.inject_read(encode(&frame).as_bytes());
        assert_eq!(bus.read_frame().unwrap(), Some(frame));
    }

    #[test]
    fn test_parse_extended_and_timestamp() {
        let frame = parse_frame(b"T000005152AABB").unwrap();
        assert_eq!(frame.id, 0x515);
        assert_eq!(frame.payload(), &[0xAA, 0xBB]);

        let frame = parse_frame(b"t5141FF1234").unwrap();
        assert_eq!(frame.id, 0x514);
        assert_eq!(frame.payload(), &[0xFF]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_frame(b"z").is_none());
        assert!(parse_frame(b"t51").is_none());
        assert!(parse_frame(b"t5149").is_none());
        assert!(parse_frame(b"t5142AB").is_none());
        assert!(parse_frame(b"t51G1AA").is_none());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mock = MockTransport::new();
        let mut bus = SlcanBus::open(mock.clone(), 125_000).unwrap();
        mock.clear_written();
        bus.close().unwrap();
        bus.close().unwrap();
        assert_eq!(mock.get_written(), b"C\r");
        assert!(bus.read_frame().is_err());
    }
}
