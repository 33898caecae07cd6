//! Outbound command line writer

use crate::transport::Transport;

/// Writes one `\n`-terminated line per emission.
///
/// Write failures are logged and the line dropped; the stream keeps going.
/// Without a transport (serial unavailable) lines are only logged.
pub struct SerialEmitter {
    transport: Option<Box<dyn Transport>>,
    sent: u64,
    failed: u64,
}

impl SerialEmitter {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport: Some(transport),
            sent: 0,
            failed: 0,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            transport: None,
            sent: 0,
            failed: 0,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Returns whether the line reached the transport
    pub fn emit(&mut self, line: &str) -> bool {
        let Some(transport) = self.transport.as_mut() else {
            log::debug!("Serial unavailable, dropping: {}", line);
            return false;
        };

        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');

        match transport.write_all(&bytes).and_then(|_| transport.flush()) {
            Ok(()) => {
                self.sent += 1;
                log::trace!("Sent: {}", line);
                true
            }
            Err(e) => {
                self.failed += 1;
                log::warn!("Serial write failed, dropping line: {}", e);
                false
            }
        }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Flush and release the port
    pub fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.flush() {
                log::warn!("Serial flush on close failed: {}", e);
            }
            log::info!(
                "Serial output closed ({} lines sent, {} failed)",
                self.sent,
                self.failed
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_emit_appends_newline() {
        let mock = MockTransport::new();
        let mut emitter = SerialEmitter::new(Box::new(mock.clone()));
        assert!(emitter.emit("X0,Y0,Z0,L5"));
        assert_eq!(mock.get_written(), b"X0,Y0,Z0,L5\n");
        assert_eq!(emitter.sent(), 1);
    }

    #[test]
    fn test_write_failure_is_dropped() {
        let mock = MockTransport::new();
        let mut emitter = SerialEmitter::new(Box::new(mock.clone()));
        mock.set_fail_writes(true);
        assert!(!emitter.emit("X1,Y1,Z1,L1"));
        assert_eq!(emitter.failed(), 1);

        mock.set_fail_writes(false);
        assert!(emitter.emit("X2,Y2,Z2,L2"));
        assert_eq!(mock.written_lines(), vec!["X2,Y2,Z2,L2"]);
    }

    #[test]
    fn test_disconnected_and_closed() {
        let mut emitter = SerialEmitter::disconnected();
        assert!(!emitter.is_connected());
        assert!(!emitter.emit("X0,Y0,Z0,L5"));

        let mut emitter = SerialEmitter::new(Box::new(MockTransport::new()));
        emitter.close();
        assert!(!emitter.is_connected());
        assert!(!emitter.emit("X0,Y0,Z0,L5"));
    }
}
