//! Page messages shown to the user after a request
//!
//! A [`PageMessages`] value lives for one request. Validators and the language
//! indexer push into it; the API layer serializes it into the response.

use serde::{Deserialize, Serialize};

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Error,
    Warning,
    Info,
    Success,
}

/// A single human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMessage {
    pub level: MessageLevel,
    pub text: String,
}

/// Accumulating message sink
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PageMessages {
    messages: Vec<PageMessage>,
}

impl PageMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: MessageLevel, text: impl Into<String>) {
        self.messages.push(PageMessage {
            level,
            text: text.into(),
        });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(MessageLevel::Error, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(MessageLevel::Warning, text);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(MessageLevel::Success, text);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageMessage> {
        self.messages.iter()
    }

    /// Messages of the given level
    pub fn of_level(&self, level: MessageLevel) -> impl Iterator<Item = &PageMessage> {
        self.messages.iter().filter(move |m| m.level == level)
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.level == MessageLevel::Error)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Move all messages from `other` to the end of this sink
    pub fn append(&mut self, other: &mut PageMessages) {
        self.messages.append(&mut other.messages);
    }
}
