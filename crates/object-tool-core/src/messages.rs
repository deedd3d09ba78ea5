//! One-time notification messages.
//!
//! Tool handlers record user-facing notifications ("3 users updated",
//! "success!") that the surrounding page renders once and discards.
//! [`MessageStorage`] holds them for the duration of a request; reading
//! drains the store.

use serde::{Deserialize, Serialize};

/// The severity level of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageLevel {
    /// Debug-level message, typically hidden in production.
    Debug = 10,
    /// Informational message.
    Info = 20,
    /// Success notification.
    Success = 25,
    /// Warning that requires attention.
    Warning = 30,
    /// Error message indicating a failure.
    Error = 40,
}

impl MessageLevel {
    /// Returns the CSS tag class for this level.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A single notification with a level and text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// The severity level.
    pub level: MessageLevel,
    /// The message text.
    pub text: String,
}

impl Message {
    /// Creates a new message.
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Per-request storage for one-time messages.
///
/// # Examples
///
/// ```
/// use object_tool_core::messages::MessageStorage;
///
/// let mut storage = MessageStorage::new();
/// storage.success("Item saved.");
///
/// let messages = storage.drain();
/// assert_eq!(messages.len(), 1);
/// assert!(storage.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageStorage {
    messages: Vec<Message>,
}

impl MessageStorage {
    /// Creates a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message with the given level and text.
    pub fn add(&mut self, level: MessageLevel, text: &str) {
        self.messages.push(Message::new(level, text));
    }

    /// Drains and returns all stored messages, leaving the storage empty.
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    /// Returns the stored messages without consuming them.
    pub fn peek(&self) -> &[Message] {
        &self.messages
    }

    /// Adds a debug-level message.
    pub fn debug(&mut self, text: &str) {
        self.add(MessageLevel::Debug, text);
    }

    /// Adds an info-level message.
    pub fn info(&mut self, text: &str) {
        self.add(MessageLevel::Info, text);
    }

    /// Adds a success-level message.
    pub fn success(&mut self, text: &str) {
        self.add(MessageLevel::Success, text);
    }

    /// Adds a warning-level message.
    pub fn warning(&mut self, text: &str) {
        self.add(MessageLevel::Warning, text);
    }

    /// Adds an error-level message.
    pub fn error(&mut self, text: &str) {
        self.add(MessageLevel::Error, text);
    }

    /// Returns the number of stored messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if no messages are stored.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
