//! Telegram read/search tools
//!
//! This library provides:
//! - Credential loading from a fixed secret env file
//! - Interactive login with two-step verification
//! - Listing dialogs, tailing a chat and global keyword search
//! - A [`MessagingApi`] seam over the grammers MTProto client

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod output;
pub mod session;

// Re-export common types
pub use api::MessagingApi;
pub use chat::{ChatEntity, ChatLabel};
pub use config::{Config, Credentials};
pub use error::{requires_second_factor, Error, Result};
pub use models::{Account, Conversation, MessageRecord, SearchHit};
pub use output::OutputFormat;
pub use session::{GrammersApi, SessionLock};

// Commands module uses re-exported types, so it must be declared after the re-exports
pub mod commands;
