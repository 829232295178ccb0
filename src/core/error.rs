use thiserror::Error;

/// Centralized error types for the crate
///
/// Upstream failures are mapped onto the first five variants by the injected
/// client; the rest are raised by local plumbing (session file, JSON, HTTP).
///
/// # Example
///
/// ```no_run
/// use instascope::core::error::AppError;
///
/// fn report(err: &AppError) {
///     log::error!("[{}] {}", err.category(), err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Profile, media or highlight does not exist upstream
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream rejected the session or the credentials
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    /// Upstream is throttling this client
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Network or protocol level failure while talking to upstream
    #[error("Transport error: {0}")]
    Transport(String),

    /// Upstream answered with a record we could not interpret
    #[error("Unexpected response shape: {0}")]
    ShapeMismatch(String),

    /// Session manager could not load, create or persist a session
    #[error("Session error: {0}")]
    Session(String),

    /// HTTP/Fetch errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Stable label for logs.
    pub fn category(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::AuthFailure(_) => "auth_failure",
            AppError::RateLimited(_) => "rate_limited",
            AppError::Transport(_) | AppError::Http(_) => "transport",
            AppError::ShapeMismatch(_) | AppError::Json(_) => "shape_mismatch",
            AppError::Session(_) => "session",
            AppError::Io(_) => "io",
            AppError::Url(_) | AppError::Validation(_) => "validation",
        }
    }

    /// True when the failure means the current session can no longer be used.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AppError::AuthFailure(_))
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Transport(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Transport(err.to_string())
    }
}
