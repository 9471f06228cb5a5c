//! Session management for the Telegram client
//!
//! Provides:
//! - File-based session locking to prevent parallel execution
//! - Client creation bound to the session database
//! - [`GrammersApi`], the production [`MessagingApi`]

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use fs2::FileExt;
use grammers_client::client::updates::UpdatesLike;
use grammers_client::types::peer::Peer;
use grammers_client::types::{LoginToken, PasswordToken, User};
use grammers_client::{Client, SignInError};
use grammers_mtsender::{SenderPool, SenderPoolHandle};
use grammers_session::storages::SqliteSession;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::api::MessagingApi;
use crate::chat::{peer_label, peer_marked_id, resolve_chat, ChatEntity};
use crate::config::{Config, Credentials};
use crate::error::{Error, Result};
use crate::models::{Account, Conversation, MessageRecord, SearchHit};

/// Session lock guard that ensures exclusive access to the Telegram session.
///
/// The lock file stays on disk after release; unlinking it would let two
/// processes lock different inodes at the same path.
pub struct SessionLock {
    lock_file: Option<File>,
}

impl SessionLock {
    /// Acquire an exclusive lock, failing fast if another process holds it.
    pub fn acquire(path: &Path) -> Result<Self> {
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| Error::LockError(format!("Failed to open lock file: {}", e)))?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                lock_file: Some(lock_file),
            }),
            Err(_) => Err(Error::SessionLocked),
        }
    }

    /// Release the lock manually
    pub fn release(&mut self) {
        if let Some(file) = self.lock_file.take() {
            let _ = file.unlock();
        }
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        self.release();
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Open (or create) the session database at `path`.
pub fn open_session(path: &Path) -> Result<Arc<SqliteSession>> {
    ensure_parent_dir(path)?;
    let session_file = path.to_string_lossy().into_owned();
    let session = SqliteSession::open(&session_file)
        .map_err(|e| Error::Session(format!("Failed to open {}: {}", session_file, e)))?;
    Ok(Arc::new(session))
}

/// Holder for SenderPool components and Client
pub struct TelegramClient {
    pub client: Client,
    pub handle: SenderPoolHandle,
    _updates: mpsc::UnboundedReceiver<UpdatesLike>,
    runner: tokio::task::JoinHandle<()>,
}

impl TelegramClient {
    /// Create a new TelegramClient from session
    pub fn connect(session: Arc<SqliteSession>, credentials: &Credentials) -> Self {
        let pool = SenderPool::new(session, credentials.api_id);

        // Create client from pool (need reference to whole pool)
        let client = Client::new(&pool);

        let SenderPool {
            runner,
            updates,
            handle,
        } = pool;

        let runner = tokio::spawn(async move {
            runner.run().await;
        });

        Self {
            client,
            handle,
            _updates: updates,
            runner,
        }
    }

    /// Stop the sender pool and wait for its runner to finish.
    pub async fn close(mut self) {
        self.runner.abort();
        let _ = (&mut self.runner).await;
        debug!("Telegram connection closed");
    }
}

impl Drop for TelegramClient {
    fn drop(&mut self) {
        self.runner.abort();
    }
}

impl std::ops::Deref for TelegramClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

/// [`MessagingApi`] backed by a connected grammers client.
///
/// Login and password tokens are kept between the steps of the login
/// dialogue.
pub struct GrammersApi {
    client: TelegramClient,
    api_hash: String,
    login_token: Mutex<Option<LoginToken>>,
    password_token: Mutex<Option<PasswordToken>>,
}

impl GrammersApi {
    pub fn new(client: TelegramClient, credentials: &Credentials) -> Self {
        Self {
            client,
            api_hash: credentials.api_hash.clone(),
            login_token: Mutex::new(None),
            password_token: Mutex::new(None),
        }
    }

    pub async fn close(self) {
        self.client.close().await;
    }
}

fn account_from_user(user: &User) -> Account {
    Account {
        id: user.raw.id(),
        username: user.username().map(str::to_string),
    }
}

#[async_trait(?Send)]
impl MessagingApi for GrammersApi {
    type Chat = Peer;

    async fn is_authorized(&self) -> Result<bool> {
        Ok(self.client.is_authorized().await?)
    }

    async fn request_login_code(&self, phone: &str) -> Result<()> {
        let token = self
            .client
            .request_login_code(phone, &self.api_hash)
            .await
            .map_err(|e| Error::Authorization(format!("Failed to request code: {}", e)))?;
        *self.login_token.lock().await = Some(token);
        info!("Login code requested");
        Ok(())
    }

    async fn sign_in(&self, code: &str) -> Result<Account> {
        let token = self
            .login_token
            .lock()
            .await
            .take()
            .ok_or_else(|| Error::Authorization("No login code was requested".to_string()))?;

        match self.client.sign_in(&token, code).await {
            Ok(user) => Ok(account_from_user(&user)),
            Err(SignInError::PasswordRequired(password_token)) => {
                *self.password_token.lock().await = Some(password_token);
                Err(Error::PasswordRequired)
            }
            Err(err) => Err(Error::Authorization(err.to_string())),
        }
    }

    async fn check_password(&self, password: &str) -> Result<Account> {
        let token = self.password_token.lock().await.take().ok_or_else(|| {
            Error::Authorization("Sign-in did not ask for a 2FA password".to_string())
        })?;

        let user = self
            .client
            .check_password(token, password)
            .await
            .map_err(|e| Error::Authorization(e.to_string()))?;
        Ok(account_from_user(&user))
    }

    async fn me(&self) -> Result<Account> {
        let user = self.client.get_me().await?;
        Ok(account_from_user(&user))
    }

    async fn dialogs(&self, limit: usize) -> Result<Vec<Conversation>> {
        let mut conversations = Vec::new();
        if limit == 0 {
            return Ok(conversations);
        }

        let mut dialogs = self.client.iter_dialogs();
        while let Some(dialog) = dialogs.next().await? {
            conversations.push(Conversation {
                id: peer_marked_id(&dialog.peer),
                label: peer_label(&dialog.peer),
            });
            if conversations.len() >= limit {
                break;
            }
        }

        debug!(count = conversations.len(), "Fetched dialogs");
        Ok(conversations)
    }

    async fn resolve_chat(&self, reference: &str) -> Result<Peer> {
        let entity = ChatEntity::parse(reference)?;
        debug!(?entity, "Resolving chat");
        resolve_chat(&self.client, &entity).await
    }

    async fn recent_messages(&self, chat: &Peer, limit: usize) -> Result<Vec<MessageRecord>> {
        let mut messages = Vec::new();
        if limit == 0 {
            return Ok(messages);
        }

        let mut iter = self.client.iter_messages(chat);
        while let Some(msg) = iter.next().await? {
            messages.push(MessageRecord {
                id: msg.id(),
                date: msg.date(),
                text: msg.text().to_string(),
            });
            if messages.len() >= limit {
                break;
            }
        }

        Ok(messages)
    }

    async fn search_messages(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let mut hits = Vec::new();
        if limit == 0 {
            return Ok(hits);
        }

        let mut iter = self.client.search_all_messages().query(query);
        while let Some(msg) = iter.next().await? {
            hits.push(SearchHit {
                date: msg.date(),
                text: msg.text().to_string(),
                chat_id: msg.peer_id().bot_api_dialog_id(),
                chat: msg.peer().ok().map(peer_label),
            });
            if hits.len() >= limit {
                break;
            }
        }

        debug!(count = hits.len(), "Global search finished");
        Ok(hits)
    }
}

/// Load credentials, lock the session and connect.
///
/// Credentials are checked first so that a broken configuration never
/// reaches the network.
pub async fn connect(config: &Config) -> Result<(SessionLock, GrammersApi)> {
    let credentials = config.credentials()?;
    ensure_parent_dir(&config.session_path)?;
    let lock = SessionLock::acquire(&config.lock_path())?;
    let session = open_session(&config.session_path)?;
    let client = TelegramClient::connect(session, &credentials);
    info!(session = %config.session_path.display(), "Connected to Telegram");
    Ok((lock, GrammersApi::new(client, &credentials)))
}
