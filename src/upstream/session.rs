//! Process-wide client lifecycle: resume a saved session or log in once.
//!
//! The saved settings file is reused across restarts. A file that no longer
//! validates is removed before falling back to a fresh login, and the new
//! settings are written back atomically (temp file + rename).

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};

use super::gate::GatedClient;
use super::UpstreamClient;
use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::logging::expand_path;

/// Creates authenticated clients. Implemented by the embedding service on top
/// of whatever protocol library it uses.
#[async_trait]
pub trait Authenticator: Send + Sync {
    type Client: UpstreamClient + 'static;

    /// Rebuilds a client from previously exported settings.
    async fn resume(&self, settings: &Value) -> AppResult<Self::Client>;

    async fn login(&self, username: &str, password: &SecretString) -> AppResult<Self::Client>;

    /// Settings to persist so the next start can [`Authenticator::resume`].
    fn export_settings(&self, client: &Self::Client) -> AppResult<Value>;
}

pub struct SessionManager<A: Authenticator> {
    authenticator: A,
    session_file: PathBuf,
    username: String,
    password: SecretString,
    spacing: (Duration, Duration),
    client: OnceCell<Arc<GatedClient<A::Client>>>,
    write_lock: Mutex<()>,
}

impl<A: Authenticator> SessionManager<A> {
    pub fn new(authenticator: A, session_file: impl Into<PathBuf>, username: &str, password: SecretString) -> Self {
        Self {
            authenticator,
            session_file: session_file.into(),
            username: username.to_string(),
            password,
            spacing: config::client::delay_range(),
            client: OnceCell::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Credentials and session path from INSTAGRAM_* environment variables.
    pub fn from_env(authenticator: A) -> Self {
        Self::new(
            authenticator,
            expand_path(&config::INSTAGRAM_SESSION_FILE),
            &config::INSTAGRAM_USERNAME,
            SecretString::from(config::INSTAGRAM_PASSWORD.expose_secret().to_string()),
        )
    }

    /// Overrides the random spacing between outbound calls.
    #[must_use]
    pub fn with_call_spacing(mut self, min: Duration, max: Duration) -> Self {
        self.spacing = (min, max);
        self
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    pub fn is_initialized(&self) -> bool {
        self.client.initialized()
    }

    /// Returns the shared client, resuming or logging in on first use.
    /// Concurrent callers wait for the same initialization.
    pub async fn acquire(&self) -> AppResult<Arc<GatedClient<A::Client>>> {
        self.client.get_or_try_init(|| self.initialize()).await.cloned()
    }

    async fn initialize(&self) -> AppResult<Arc<GatedClient<A::Client>>> {
        let client = match self.try_resume().await {
            Some(client) => client,
            None => self.login_and_persist().await?,
        };
        Ok(Arc::new(GatedClient::new(client, self.spacing.0, self.spacing.1)))
    }

    async fn try_resume(&self) -> Option<A::Client> {
        let raw = match tokio::fs::read_to_string(&self.session_file).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("SessionManager: no saved session at {}", self.session_file.display());
                return None;
            }
            Err(e) => {
                log::warn!("SessionManager: cannot read {}: {}", self.session_file.display(), e);
                return None;
            }
        };

        match self.resume_from(&raw).await {
            Ok(client) => {
                log::info!("SessionManager: resumed saved session");
                Some(client)
            }
            Err(e) => {
                log::warn!("SessionManager: saved session is unusable ({}), removing it", e);
                if let Err(e) = tokio::fs::remove_file(&self.session_file).await {
                    log::warn!("SessionManager: failed to remove stale session: {}", e);
                }
                None
            }
        }
    }

    async fn resume_from(&self, raw: &str) -> AppResult<A::Client> {
        let settings: Value = serde_json::from_str(raw)?;
        let client = self.authenticator.resume(&settings).await?;
        // A resumed client only counts once upstream accepts it
        client.account_id().await?;
        Ok(client)
    }

    async fn login_and_persist(&self) -> AppResult<A::Client> {
        if self.username.is_empty() || self.password.expose_secret().is_empty() {
            return Err(AppError::Session(
                "no saved session and INSTAGRAM_USERNAME/INSTAGRAM_PASSWORD not set".to_string(),
            ));
        }

        log::info!("SessionManager: logging in as {}", self.username);
        let client = self.authenticator.login(&self.username, &self.password).await?;

        match self.authenticator.export_settings(&client) {
            Ok(settings) => {
                if let Err(e) = self.persist(&settings).await {
                    log::warn!("SessionManager: could not save session: {}", e);
                }
            }
            Err(e) => log::warn!("SessionManager: could not export session settings: {}", e),
        }

        Ok(client)
    }

    async fn persist(&self, settings: &Value) -> AppResult<()> {
        let _lock = self.write_lock.lock().await;

        if let Some(parent) = self.session_file.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let body = serde_json::to_vec_pretty(settings)?;
        let temp_path = format!("{}.tmp.{}", self.session_file.display(), std::process::id());

        tokio::fs::write(&temp_path, &body).await?;
        tokio::fs::rename(&temp_path, &self.session_file).await.map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            AppError::Session(format!("failed to rename session file: {}", e))
        })?;

        log::info!("SessionManager: session saved to {}", self.session_file.display());
        Ok(())
    }
}
