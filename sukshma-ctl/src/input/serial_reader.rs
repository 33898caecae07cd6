//! Background thread reading button lines from the serial port

use super::slot::PendingLine;
use crate::error::{Error, Result};
use crate::transport::Transport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Lines longer than this are garbage (the device sends single characters)
const MAX_LINE_LEN: usize = 64;

/// Splits a byte stream into trimmed, non-empty lines
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8], mut on_line: impl FnMut(String)) {
        for &b in bytes {
            if b == b'\n' || b == b'\r' {
                let line = String::from_utf8_lossy(&self.buf).trim().to_string();
                self.buf.clear();
                if !line.is_empty() {
                    on_line(line);
                }
            } else if self.buf.len() < MAX_LINE_LEN {
                self.buf.push(b);
            } else {
                log::warn!("Serial line too long, discarding");
                self.buf.clear();
            }
        }
    }
}

/// Owns the reader thread; stopping joins it
pub struct SerialLineReader {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SerialLineReader {
    pub fn spawn<T: Transport + 'static>(transport: T, pending: PendingLine) -> Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = Arc::clone(&shutdown);
        let handle = thread::Builder::new()
            .name("button-reader".to_string())
            .spawn(move || reader_loop(transport, pending, thread_shutdown))
            .map_err(|e| Error::Other(format!("Failed to spawn button reader thread: {}", e)))?;

        log::info!("Button reader started");
        Ok(Self {
            shutdown,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Signal the thread and wait for it to exit
    pub fn stop(&mut self) -> Result<()> {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| Error::ThreadPanic)?;
            log::info!("Button reader stopped");
        }
        Ok(())
    }
}

impl Drop for SerialLineReader {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn reader_loop<T: Transport>(mut transport: T, pending: PendingLine, shutdown: Arc<AtomicBool>) {
    let mut assembler = LineAssembler::new();
    let mut buf = [0u8; 64];

    while !shutdown.load(Ordering::Relaxed) {
        match transport.read(&mut buf) {
            Ok(0) => {
                // Timeout or nothing buffered
                thread::sleep(Duration::from_millis(2));
            }
            Ok(n) => {
                let mut closed = false;
                assembler.push(&buf[..n], |line| {
                    log::trace!("Button line: {}", line);
                    if pending.publish(line).is_err() {
                        closed = true;
                    }
                });
                if closed {
                    log::warn!("Button consumer gone, reader exiting");
                    break;
                }
            }
            Err(e) => {
                log::error!("Button serial read error: {}", e);
                thread::sleep(Duration::from_millis(10));
            }
        }
    }

    log::debug!("Button reader thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::slot::line_slot;
    use crate::transport::MockTransport;
    use std::time::Instant;

    fn wait_for(slot: &crate::input::slot::LineSlot) -> Option<String> {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if let Some(line) = slot.take() {
                return Some(line);
            }
            thread::sleep(Duration::from_millis(1));
        }
        None
    }

    #[test]
    fn test_assembler_trims_and_splits() {
        let mut asm = LineAssembler::new();
        let mut lines = Vec::new();
        asm.push(b" 1\r\n0", |l| lines.push(l));
        assert_eq!(lines, vec!["1"]);
        asm.push(b"\n\n", |l| lines.push(l));
        assert_eq!(lines, vec!["1", "0"]);
    }

    #[test]
    fn test_reader_publishes_lines() {
        let mock = MockTransport::new();
        let (pending, slot) = line_slot();
        let mut reader = SerialLineReader::spawn(mock.clone(), pending).unwrap();

        mock.inject_read(b"1\n");
        assert_eq!(wait_for(&slot).as_deref(), Some("1"));

        reader.stop().unwrap();
        assert!(!reader.is_running());
    }

    #[test]
    fn test_reader_survives_errors() {
        let mock = MockTransport::new();
        mock.fail_next_reads(3);
        let (pending, slot) = line_slot();
        let mut reader = SerialLineReader::spawn(mock.clone(), pending).unwrap();

        mock.inject_read(b"0\n");
        assert_eq!(wait_for(&slot).as_deref(), Some("0"));
        reader.stop().unwrap();
    }
}
