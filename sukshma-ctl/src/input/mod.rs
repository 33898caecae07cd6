//! Button input channel.
//!
//! - [`slot`]: Single-slot line hand-off (last write wins)
//! - [`serial_reader`]: Background thread reading `"0"`/`"1"` lines
//! - [`keyboard`]: stdin operator console and keyboard fallback
//! - [`edge`]: Turns line values into press/release edges

pub mod edge;
pub mod keyboard;
pub mod serial_reader;
pub mod slot;

use crate::core::types::ButtonEdge;
use crate::error::Result;
use crate::transport::Transport;
use edge::EdgeDetector;
use keyboard::ConsoleEvent;
use serial_reader::SerialLineReader;
use slot::{line_slot, LineSlot, PendingLine};

/// Where button values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSource {
    Serial,
    /// Serial port unavailable; the console press/release keys drive the button
    Keyboard,
}

/// Edge-detected button state fed from serial or the keyboard fallback
pub struct ButtonChannel {
    source: ButtonSource,
    slot: LineSlot,
    /// Producer for keyboard-injected lines
    local: Option<PendingLine>,
    reader: Option<SerialLineReader>,
    edges: EdgeDetector,
}

impl ButtonChannel {
    /// Read the button from a serial transport on a background thread
    pub fn serial<T: Transport + 'static>(transport: T) -> Result<Self> {
        let (pending, slot) = line_slot();
        let reader = SerialLineReader::spawn(transport, pending)?;
        Ok(Self {
            source: ButtonSource::Serial,
            slot,
            local: None,
            reader: Some(reader),
            edges: EdgeDetector::new(),
        })
    }

    pub fn keyboard() -> Self {
        let (pending, slot) = line_slot();
        log::warn!("Button input: keyboard fallback");
        Self {
            source: ButtonSource::Keyboard,
            slot,
            local: Some(pending),
            reader: None,
            edges: EdgeDetector::new(),
        }
    }

    pub fn source(&self) -> ButtonSource {
        self.source
    }

    /// Latest pending line as an edge, if it changes the button state
    pub fn poll(&mut self) -> Option<ButtonEdge> {
        let line = self.slot.take()?;
        self.edges.feed(&line)
    }

    /// Forward a console key; press/release only count in keyboard fallback
    pub fn submit_key(&mut self, event: ConsoleEvent) {
        let Some(pending) = &self.local else {
            log::debug!("Ignoring console {:?}: serial button active", event);
            return;
        };
        let line = match event {
            ConsoleEvent::Press => "1",
            ConsoleEvent::Release => "0",
            ConsoleEvent::ResetImu => return,
        };
        if let Err(e) = pending.publish(line.to_string()) {
            log::warn!("Keyboard button dropped: {}", e);
        }
    }

    /// Stop and join the serial reader thread
    pub fn shutdown(&mut self) -> Result<()> {
        if let Some(mut reader) = self.reader.take() {
            reader.stop()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use std::time::{Duration, Instant};

    #[test]
    fn test_keyboard_fallback_edges() {
        let mut ch = ButtonChannel::keyboard();
        assert_eq!(ch.source(), ButtonSource::Keyboard);
        assert_eq!(ch.poll(), None);

        ch.submit_key(ConsoleEvent::Press);
        assert_eq!(ch.poll(), Some(ButtonEdge::Pressed));
        ch.submit_key(ConsoleEvent::Press);
        assert_eq!(ch.poll(), None);
        ch.submit_key(ConsoleEvent::Release);
        assert_eq!(ch.poll(), Some(ButtonEdge::Released));
        ch.submit_key(ConsoleEvent::ResetImu);
        assert_eq!(ch.poll(), None);
    }

    #[test]
    fn test_serial_ignores_console_keys() {
        let mock = MockTransport::new();
        let mut ch = ButtonChannel::serial(mock.clone()).unwrap();
        ch.submit_key(ConsoleEvent::Press);
        assert_eq!(ch.poll(), None);

        mock.inject_read(b"1\n");
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut edge = None;
        while edge.is_none() && Instant::now() < deadline {
            edge = ch.poll();
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(edge, Some(ButtonEdge::Pressed));
        ch.shutdown().unwrap();
    }
}
