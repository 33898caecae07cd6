//! Single-slot, last-write-wins line hand-off between threads.
//!
//! The button reader thread only ever needs to tell the tick loop about the
//! most recent line. A `bounded(1)` channel holds it; when the slot is full the
//! producer evicts the stale value through its own receiver handle before
//! sending, so it never blocks and the consumer never sees an old line.
//!
//! That eviction handle keeps the channel connected, so consumer liveness is
//! tracked with a separate flag cleared when the [`LineSlot`] is dropped.

use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Producer side
pub struct PendingLine {
    tx: Sender<String>,
    evict: Receiver<String>,
    consumer_alive: Arc<AtomicBool>,
}

/// Consumer side
pub struct LineSlot {
    rx: Receiver<String>,
    alive: Arc<AtomicBool>,
}

pub fn line_slot() -> (PendingLine, LineSlot) {
    let (tx, rx) = bounded(1);
    let alive = Arc::new(AtomicBool::new(true));
    (
        PendingLine {
            tx,
            evict: rx.clone(),
            consumer_alive: Arc::clone(&alive),
        },
        LineSlot { rx, alive },
    )
}

impl PendingLine {
    /// Replace whatever is pending with `line`
    pub fn publish(&self, line: String) -> Result<()> {
        if !self.consumer_alive.load(Ordering::Acquire) {
            return Err(Error::ChannelClosed);
        }
        let mut line = line;
        loop {
            match self.tx.try_send(line) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(back)) => {
                    let _ = self.evict.try_recv();
                    line = back;
                }
                Err(TrySendError::Disconnected(_)) => return Err(Error::ChannelClosed),
            }
        }
    }
}

impl LineSlot {
    /// Take the pending line, if any
    pub fn take(&self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}

impl Drop for LineSlot {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}
