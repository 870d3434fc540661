//! Test doubles shared by session and dispatcher unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use chzzk_chat_core::error::{ChatError, Result};

use crate::session::writer::FrameSink;

/// Records every outbound frame; optionally fails every write.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl FrameSink for RecordingSink {
    async fn send_text(&self, text: String) -> Result<()> {
        if self.fail {
            return Err(ChatError::Write("broken pipe".into()));
        }
        self.sent.lock().unwrap().push(text);
        Ok(())
    }
}
