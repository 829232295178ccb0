//! Provider timestamps to display strings in a fixed zone.
//!
//! Upstream hands out Unix seconds. The front end wants a long human form and a
//! sortable date, both in one configured zone (UTC+05:30 unless overridden),
//! independent of the host's locale or timezone.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::core::config;

const DISPLAY_FORMAT: &str = "%d %B %Y %I:%M %p %A";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A timestamp rendered for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayTime {
    /// e.g. `05 March 2024 09:15 PM Tuesday`
    pub display: String,
    /// e.g. `2024-03-05`
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeNormalizer {
    offset: FixedOffset,
}

impl Default for TimeNormalizer {
    fn default() -> Self {
        Self::new(config::display::DEFAULT_UTC_OFFSET_MINUTES)
    }
}

impl TimeNormalizer {
    /// Offsets outside +-24h are rejected by chrono; UTC is used then.
    pub fn new(offset_minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(offset_minutes.saturating_mul(60)).unwrap_or_else(|| {
            log::warn!("TimeNormalizer: invalid UTC offset {} min, using UTC", offset_minutes);
            Utc.fix()
        });
        Self { offset }
    }

    pub fn from_env() -> Self {
        Self::new(*config::display::UTC_OFFSET_MINUTES)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Converts Unix seconds into the display zone.
    pub fn localize(&self, unix_seconds: i64) -> Option<DateTime<FixedOffset>> {
        DateTime::from_timestamp(unix_seconds, 0).map(|utc| utc.with_timezone(&self.offset))
    }

    /// Renders Unix seconds. Timestamps chrono cannot represent render empty.
    pub fn normalize(&self, unix_seconds: i64) -> DisplayTime {
        match self.localize(unix_seconds) {
            Some(local) => DisplayTime {
                display: local.format(DISPLAY_FORMAT).to_string(),
                date: local.format(DATE_FORMAT).to_string(),
            },
            None => {
                log::warn!("TimeNormalizer: timestamp {} out of range", unix_seconds);
                DisplayTime::default()
            }
        }
    }

    /// When a story captured at `taken_at` disappears.
    pub fn expiry(&self, taken_at: i64) -> DisplayTime {
        self.normalize(taken_at.saturating_add(config::stories::EXPIRY_SECS))
    }
}
