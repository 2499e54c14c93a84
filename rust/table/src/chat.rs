use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Longest chat line the table accepts.
pub const MAX_CHAT_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub username: String,
    pub message: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
}

impl ChatMessage {
    /// Local wall-clock time of the message as `HH:MM`.
    pub fn time_label(&self) -> String {
        match Local.timestamp_millis_opt(self.timestamp).single() {
            Some(t) => t.format("%H:%M").to_string(),
            None => "--:--".to_string(),
        }
    }
}

/// Cleans an outbound line; `None` when nothing is left to send.
pub fn prepare_outbound(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_CHAT_CHARS).collect())
}

/// Inbound chat history. Unbounded unless a cap is given.
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    entries: VecDeque<ChatMessage>,
    limit: Option<usize>,
}

impl ChatLog {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.entries.push_back(message);
        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.entries.pop_front();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.entries.back()
    }
}
