//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Session/credential configuration diagnostics at startup

use anyhow::Result;
use secrecy::ExposeSecret;
use simplelog::*;
use std::fs::File;
use std::path::Path;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger was already installed
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Expands `~` in a configured path.
pub fn expand_path(path: &str) -> String {
    if Path::new(path).is_absolute() {
        path.to_string()
    } else {
        shellexpand::tilde(path).to_string()
    }
}

/// Logs how the upstream session will be obtained at startup
///
/// Reports:
/// - INSTAGRAM_SESSION_FILE and whether a saved session exists
/// - whether login credentials are available as a fallback
///
/// The password itself is never printed.
pub fn log_session_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🔑 Upstream Session Configuration Check");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let session_path = expand_path(&config::INSTAGRAM_SESSION_FILE);
    let has_session = Path::new(&session_path).exists();
    if has_session {
        log::info!("✅ INSTAGRAM_SESSION_FILE: {} (will try to resume)", session_path);
    } else {
        log::warn!("⚠️  INSTAGRAM_SESSION_FILE: {} (not found, a login will be needed)", session_path);
    }

    let username = config::INSTAGRAM_USERNAME.as_str();
    let has_password = !config::INSTAGRAM_PASSWORD.expose_secret().is_empty();
    if !username.is_empty() && has_password {
        log::info!("✅ INSTAGRAM_USERNAME: {}", username);
        log::info!("   Password is set");
    } else if !username.is_empty() {
        log::warn!("⚠️  INSTAGRAM_USERNAME: {} (INSTAGRAM_PASSWORD not set)", username);
    } else {
        log::warn!("⚠️  INSTAGRAM_USERNAME: not set");
    }

    if !has_session && (username.is_empty() || !has_password) {
        log::error!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        log::error!("❌ No saved session and no credentials - profile lookups will FAIL!");
        log::error!("   Set INSTAGRAM_USERNAME and INSTAGRAM_PASSWORD, or provide INSTAGRAM_SESSION_FILE");
        log::error!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }
}
