//! The seam between command handlers and the Telegram client library.
//!
//! Commands are written against [`MessagingApi`] so the dispatcher can be
//! exercised without a network connection; [`crate::session::GrammersApi`]
//! is the production implementation.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Account, Conversation, MessageRecord, SearchHit};

#[async_trait(?Send)]
pub trait MessagingApi {
    /// Resolved chat handle used between `resolve_chat` and `recent_messages`.
    type Chat;

    async fn is_authorized(&self) -> Result<bool>;

    /// Ask the service to send a one-time login code to `phone`.
    async fn request_login_code(&self, phone: &str) -> Result<()>;

    /// Sign in with the code from the last `request_login_code`.
    ///
    /// Fails with [`crate::Error::PasswordRequired`] when the account has
    /// two-step verification enabled.
    async fn sign_in(&self, code: &str) -> Result<Account>;

    /// Complete a sign-in that required the 2FA password.
    async fn check_password(&self, password: &str) -> Result<Account>;

    async fn me(&self) -> Result<Account>;

    /// Up to `limit` most recent dialogs, in service order.
    async fn dialogs(&self, limit: usize) -> Result<Vec<Conversation>>;

    /// Resolve an id, username or link to a chat.
    async fn resolve_chat(&self, reference: &str) -> Result<Self::Chat>;

    /// Up to `limit` most recent messages of `chat`, newest first.
    async fn recent_messages(&self, chat: &Self::Chat, limit: usize)
        -> Result<Vec<MessageRecord>>;

    /// Global keyword search across all accessible chats.
    async fn search_messages(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}
