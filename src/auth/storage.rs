//! Persisted session state
//!
//! Tokens survive restarts in a small JSON file, the terminal counterpart of
//! the browser storage the hosted identity SDKs use.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::models::AuthTokens;

enum Backend {
    File(PathBuf),
    Memory(Mutex<Option<AuthTokens>>),
}

pub struct TokenStore {
    backend: Backend,
}

impl TokenStore {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::File(path.into()),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Mutex::new(None)),
        }
    }

    /// Read the stored tokens. A missing or corrupt file reads as empty.
    pub async fn load(&self) -> Option<AuthTokens> {
        match &self.backend {
            Backend::Memory(slot) => slot.lock().await.clone(),
            Backend::File(path) => match read_tokens(path).await {
                Ok(tokens) => tokens,
                Err(e) => {
                    warn!("Ignoring unreadable session file {}: {:#}", path.display(), e);
                    None
                }
            },
        }
    }

    pub async fn save(&self, tokens: &AuthTokens) -> Result<()> {
        match &self.backend {
            Backend::Memory(slot) => {
                *slot.lock().await = Some(tokens.clone());
                Ok(())
            }
            Backend::File(path) => write_tokens(path, tokens).await,
        }
    }

    /// Remove stored tokens; succeeds when nothing is stored.
    pub async fn clear(&self) -> Result<()> {
        match &self.backend {
            Backend::Memory(slot) => {
                slot.lock().await.take();
                Ok(())
            }
            Backend::File(path) => match fs::remove_file(path).await {
                Ok(()) => {
                    debug!("Removed session file {}", path.display());
                    Ok(())
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
            },
        }
    }
}

async fn read_tokens(path: &Path) -> Result<Option<AuthTokens>> {
    let raw = match fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).context("Failed to read session file"),
    };
    let tokens = serde_json::from_slice(&raw).context("Failed to parse session file")?;
    Ok(Some(tokens))
}

async fn write_tokens(path: &Path, tokens: &AuthTokens) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let raw = serde_json::to_vec_pretty(tokens).context("Failed to encode session")?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options
        .open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;

    // `mode` only applies on creation; narrow a file left by an older run
    // before any token bytes reach it.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await
            .context("Failed to restrict session file permissions")?;
    }

    file.write_all(&raw)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.flush().await.context("Failed to flush session file")?;
    Ok(())
}
