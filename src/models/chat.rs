use chrono::Utc;
use serde::{ Serialize, Deserialize };
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{ BufWriter, Write };
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// Ordered chat transcript. Only grows, except for rolling back a failed request.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.messages.truncate(len);
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn save_json(&self, path: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
        let file = File::create(path).map_err(|e|
            format!("Failed to create transcript file '{}': {}", path.display(), e)
        )?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

/// A request on its way to the worker. `snapshot_length` is the conversation
/// length before the pending user message, used for rollback.
#[derive(Debug)]
pub struct RequestJob {
    pub payload: Vec<u8>,
    pub payload_length: usize,
    pub snapshot_length: usize,
}

impl RequestJob {
    pub fn new(payload: Vec<u8>, snapshot_length: usize) -> Self {
        let payload_length = payload.len();
        Self { payload, payload_length, snapshot_length }
    }
}
