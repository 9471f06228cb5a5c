//! Configuration: fixed secret paths and Telegram API credentials
//!
//! Credentials are read from a dotenv-style file into an explicit
//! [`Credentials`] value; the process environment is consulted but never
//! modified.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Directory holding the secret env file and the session database.
pub const SECRET_DIR: &str = "/opt/openclaw/secret";
/// Env file with `TG_API_ID` / `TG_API_HASH`.
pub const ENV_PATH: &str = "/opt/openclaw/secret/tg.env";
/// Session storage managed by the client library.
pub const SESSION_PATH: &str = "/opt/openclaw/secret/telethon.session";

pub const API_ID_KEY: &str = "TG_API_ID";
pub const API_HASH_KEY: &str = "TG_API_HASH";

pub const DEFAULT_DIALOGS_LIMIT: usize = 30;
pub const DEFAULT_TAIL_LIMIT: usize = 50;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Telegram application credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_id: i32,
    pub api_hash: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Load credentials from `env_file`, letting process environment
    /// variables of the same name take precedence.
    pub fn load(env_file: &Path) -> Result<Self> {
        let file_values = read_env_file(env_file)?;
        Self::resolve(env_file, &file_values, |key| std::env::var(key).ok())
    }

    /// Build credentials from already-read file values and an environment
    /// lookup. Both keys must be present and non-blank.
    pub fn resolve<F>(source: &Path, file_values: &HashMap<String, String>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| -> Option<String> {
            env(key)
                .or_else(|| file_values.get(key).cloned())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let (Some(api_id), Some(api_hash)) = (lookup(API_ID_KEY), lookup(API_HASH_KEY)) else {
            return Err(Error::MissingCredentials(source.display().to_string()));
        };

        let api_id = api_id.parse::<i32>().map_err(|e| {
            Error::InvalidConfig(format!("{} must be an integer: {}", API_ID_KEY, e))
        })?;

        Ok(Self { api_id, api_hash })
    }
}

/// Read a dotenv file into a map. A missing file yields an empty map so the
/// missing-credentials check reports it.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        debug!(path = %path.display(), "Env file not found");
        return Ok(HashMap::new());
    }

    let iter = dotenvy::from_path_iter(path)
        .map_err(|e| Error::InvalidConfig(format!("Failed to read {}: {}", path.display(), e)))?;

    let mut values = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| {
            Error::InvalidConfig(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        values.insert(key, value);
    }
    Ok(values)
}

/// Paths used by one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub env_file: PathBuf,
    pub session_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            env_file: PathBuf::from(ENV_PATH),
            session_path: PathBuf::from(SESSION_PATH),
        }
    }

    /// Override the defaults with explicitly supplied paths.
    pub fn with_paths(env_file: Option<PathBuf>, session_path: Option<PathBuf>) -> Self {
        let defaults = Self::new();
        Self {
            env_file: env_file.unwrap_or(defaults.env_file),
            session_path: session_path.unwrap_or(defaults.session_path),
        }
    }

    /// Lock file guarding the session against parallel use.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.session_path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::load(&self.env_file)
    }
}
