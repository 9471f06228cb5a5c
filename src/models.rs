//! Transient records returned by the messaging API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::chat::ChatLabel;

/// The authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// A dialog as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    pub id: i64,
    pub label: ChatLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub text: String,
}

/// A global search result with its owning conversation.
///
/// `chat` is `None` when the owner could not be resolved; `chat_id` is the
/// marked dialog id of the owner and is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub date: DateTime<Utc>,
    pub text: String,
    pub chat_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat: Option<ChatLabel>,
}

impl SearchHit {
    /// Label of the owning conversation, or the marked id when the
    /// owner is unknown or has no displayable name.
    pub fn chat_label(&self) -> String {
        self.chat
            .as_ref()
            .and_then(|label| label.display())
            .map(str::to_string)
            .unwrap_or_else(|| self.chat_id.to_string())
    }
}
