use once_cell::sync::Lazy;
use secrecy::SecretString;
use std::env;
use std::time::Duration;

/// Reads a numeric environment variable, falling back to `default` when it is
/// missing or unparsable.
fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Account used to log in when no saved session can be resumed
/// Read from INSTAGRAM_USERNAME environment variable
pub static INSTAGRAM_USERNAME: Lazy<String> =
    Lazy::new(|| env::var("INSTAGRAM_USERNAME").unwrap_or_else(|_| String::new()));

/// Password for INSTAGRAM_USERNAME
/// Read from INSTAGRAM_PASSWORD environment variable, never logged
pub static INSTAGRAM_PASSWORD: Lazy<SecretString> = Lazy::new(|| {
    SecretString::from(env::var("INSTAGRAM_PASSWORD").unwrap_or_else(|_| String::new()))
});

/// Saved client settings (cookies, device ids) reused across restarts
/// Read from INSTAGRAM_SESSION_FILE environment variable
/// Supports tilde (~) expansion
/// Default: session.json
pub static INSTAGRAM_SESSION_FILE: Lazy<String> =
    Lazy::new(|| env::var("INSTAGRAM_SESSION_FILE").unwrap_or_else(|_| "session.json".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: instascope.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "instascope.log".to_string()));

/// Media download configuration
pub mod media {
    use super::{env_u64, Duration, Lazy};

    /// Default per-download timeout (in seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

    /// Per-download timeout, overridable with MEDIA_TIMEOUT_SECS
    pub static TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| env_u64("MEDIA_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS));

    /// Desktop browser User-Agent sent with every media request
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

    pub const ACCEPT: &str = "*/*";
    pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
    pub const ACCEPT_ENCODING: &str = "gzip, deflate, br";

    /// Media download timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(*TIMEOUT_SECS)
    }
}

/// Display time configuration
pub mod display {
    use super::{env, Lazy};

    /// Asia/Kolkata, UTC+05:30
    pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

    /// Offset of the display zone from UTC, overridable with DISPLAY_UTC_OFFSET_MINUTES
    pub static UTC_OFFSET_MINUTES: Lazy<i32> = Lazy::new(|| {
        env::var("DISPLAY_UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_UTC_OFFSET_MINUTES)
    });
}

/// Pagination configuration
pub mod paging {
    use super::{env_u64, Duration, Lazy};

    /// Hard cap on records requested per page, whatever the caller asks for
    pub const PAGE_SIZE_CAP: usize = 6;

    /// Pause after each normalized item (milliseconds)
    pub static ITEM_MIN_MS: Lazy<u64> = Lazy::new(|| env_u64("PACING_ITEM_MIN_MS", 1000));
    pub static ITEM_MAX_MS: Lazy<u64> = Lazy::new(|| env_u64("PACING_ITEM_MAX_MS", 3000));

    /// Pause after each carousel slide (milliseconds)
    pub static SLIDE_MIN_MS: Lazy<u64> = Lazy::new(|| env_u64("PACING_SLIDE_MIN_MS", 1000));
    pub static SLIDE_MAX_MS: Lazy<u64> = Lazy::new(|| env_u64("PACING_SLIDE_MAX_MS", 2000));

    pub fn item_range() -> (Duration, Duration) {
        (Duration::from_millis(*ITEM_MIN_MS), Duration::from_millis(*ITEM_MAX_MS))
    }

    pub fn slide_range() -> (Duration, Duration) {
        (Duration::from_millis(*SLIDE_MIN_MS), Duration::from_millis(*SLIDE_MAX_MS))
    }
}

/// Outbound call spacing for the shared upstream client
pub mod client {
    use super::{env_u64, Duration, Lazy};

    pub static DELAY_MIN_MS: Lazy<u64> = Lazy::new(|| env_u64("CLIENT_DELAY_MIN_MS", 3000));
    pub static DELAY_MAX_MS: Lazy<u64> = Lazy::new(|| env_u64("CLIENT_DELAY_MAX_MS", 8000));

    pub fn delay_range() -> (Duration, Duration) {
        (Duration::from_millis(*DELAY_MIN_MS), Duration::from_millis(*DELAY_MAX_MS))
    }
}

/// Story configuration
pub mod stories {
    /// Stories disappear 24 hours after capture
    pub const EXPIRY_SECS: i64 = 86_400;

    /// Maximum viewers listed per story for the owner's own profile
    pub const VIEWER_LIMIT: usize = 50;
}
