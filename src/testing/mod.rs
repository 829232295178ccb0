//! Test doubles for the upstream client and media downloads
//!
//! Used by unit tests and by the integration tests under `tests/`:
//!
//! ```rust
//! use instascope::testing::{profile_record, MockClient, StubFetcher};
//!
//! let client = MockClient::new().with_profile("jane", profile_record("42", "jane"));
//! let fetcher = StubFetcher::new().with("https://cdn.test/jane/avatar.jpg", b"jpg");
//! ```

pub mod fixtures;
pub mod mocks;

pub use fixtures::{highlight_record, media_record, profile_record, resource_record, story_record};
pub use mocks::{MockAuthenticator, MockClient, RecordingPacer, StubFetcher};
