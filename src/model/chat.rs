//! Chat list state (pure Rust, no FFI).
//!
//! The log is owned by the main thread. Whether it holds any message decides
//! the overlay footprint: empty means collapsed, anything else expanded.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// One chat entry, as exchanged with the application layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    /// Seconds since the Unix epoch.
    #[serde(default = "now_secs")]
    pub timestamp: f64,
}

impl ChatMessage {
    pub fn new(id: impl Into<String>, text: impl Into<String>, is_user: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_user,
            timestamp: now_secs(),
        }
    }

    /// A message typed locally, with a fresh random id.
    pub fn from_user(text: impl Into<String>) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), text, true)
    }
}

/// Current wall-clock time in seconds since the Unix epoch.
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Ordered chat history shown in the overlay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole history (used for `historyUpdated` and fetched
    /// recent messages).
    pub fn replace(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Append a locally typed message and return a copy of it.
    pub fn push_user(&mut self, text: &str) -> ChatMessage {
        let message = ChatMessage::from_user(text);
        self.messages.push(message.clone());
        message
    }

    /// Append a reply from the application layer. Replies without an id get
    /// a generated one.
    pub fn push_reply(&mut self, text: &str, id: Option<String>) -> ChatMessage {
        let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let message = ChatMessage::new(id, text, false);
        self.messages.push(message.clone());
        message
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

    /// True when the overlay should show the history pane.
    pub fn is_expanded(&self) -> bool {
        !self.messages.is_empty()
    }
}
