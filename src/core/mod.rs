pub mod config;
pub mod error;
pub mod logging;
pub mod time;
pub mod utils;

pub use error::{AppError, AppResult};
pub use logging::{init_logger, log_session_configuration};
pub use time::{DisplayTime, TimeNormalizer};
pub use utils::{format_count, jittered, media_code_from_reference, reference_slug};
