//! Mock serial link for testing controllers without hardware
//!
//! The mock records every write and replays scripted replies. Handles are
//! cheap clones sharing the same buffers, so a test can keep a probe handle
//! after moving the link into a controller.

use async_trait::async_trait;
use gemctl_core::{GemError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::serial_link::SerialLink;

/// Scripted outcome for one `read_up_to` call
#[derive(Debug, Clone)]
enum MockReply {
    /// Bytes waiting on the line
    Bytes(Vec<u8>),
    /// The read window elapses with nothing on the line
    Silence,
    /// Transport-level read failure
    ReadError,
}

/// Mock transport recording writes and replaying queued replies
#[derive(Clone, Default)]
pub struct MockLink {
    written: Arc<Mutex<Vec<Vec<u8>>>>,
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes to be returned by the next read
    pub fn queue_reply(&self, bytes: &[u8]) {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Bytes(bytes.to_vec()));
    }

    /// Queue an empty read (quiet line)
    pub fn queue_silence(&self) {
        self.replies.lock().unwrap().push_back(MockReply::Silence);
    }

    /// Queue a transport-level read failure
    pub fn queue_read_error(&self) {
        self.replies.lock().unwrap().push_back(MockReply::ReadError);
    }

    /// Make every subsequent write fail
    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    /// Every frame written so far, oldest first
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl SerialLink for MockLink {
    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(GemError::Serial("simulated write failure".to_string()));
        }
        self.written.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }

    async fn read_up_to(
        &mut self,
        max_len: usize,
        _first_byte_timeout: Duration,
    ) -> Result<Vec<u8>> {
        match self.replies.lock().unwrap().pop_front() {
            None | Some(MockReply::Silence) => Ok(Vec::new()),
            Some(MockReply::Bytes(mut bytes)) => {
                bytes.truncate(max_len);
                Ok(bytes)
            }
            Some(MockReply::ReadError) => {
                Err(GemError::Serial("simulated read failure".to_string()))
            }
        }
    }

    fn clear_input_buffer(&mut self) -> Result<()> {
        Ok(())
    }

    fn port_path(&self) -> Option<&str> {
        Some("mock")
    }
}
