//! Mock CAN bus for testing and hardware-free runs

use super::{CanBus, CanFrame, ORIENTATION_ID_WX, ORIENTATION_ID_YZ};
use crate::core::orientation::OrientationSample;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

enum MockEntry {
    Frame(CanFrame),
    Error(String),
}

/// Scripted CAN bus; clones share the same receive queue
#[derive(Clone, Default)]
pub struct MockCanBus {
    inner: Arc<Mutex<MockCanInner>>,
}

#[derive(Default)]
struct MockCanInner {
    queue: VecDeque<MockEntry>,
    closed: bool,
}

impl MockCanBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame for reception
    pub fn inject_frame(&self, frame: CanFrame) {
        let mut inner = self.inner.lock().unwrap();
        inner.queue.push_back(MockEntry::Frame(frame));
    }

    /// Queue a non-OK adapter status
    pub fn inject_error(&self, message: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.queue.push_back(MockEntry::Error(message.to_string()));
    }

    /// Queue both orientation frames for a sensor-space sample
    pub fn inject_sample(&self, sample: OrientationSample) {
        self.inject_frame(CanFrame::from_f32_pair(ORIENTATION_ID_WX, sample.w, sample.x));
        self.inject_frame(CanFrame::from_f32_pair(ORIENTATION_ID_YZ, sample.y, sample.z));
    }

    /// Frames and errors not yet read
    pub fn pending(&self) -> usize {
        self.inner.lock().unwrap().queue.len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }
}

impl CanBus for MockCanBus {
    fn read_frame(&mut self) -> Result<Option<CanFrame>> {
        let mut inner = self.inner.lock().unwrap();
        match inner.queue.pop_front() {
            Some(MockEntry::Frame(frame)) => Ok(Some(frame)),
            Some(MockEntry::Error(message)) => Err(Error::Can(message)),
            None => Ok(None),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.inner.lock().unwrap().closed = true;
        Ok(())
    }
}
