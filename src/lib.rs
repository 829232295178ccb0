//! Instascope - profile content fetch and paced pagination
//!
//! Turns a profile handle into normalized stories, posts, reels and highlights
//! using an injected, authenticated private-API client.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, time and formatting helpers
//! - `download`: media byte retrieval
//! - `upstream`: client port, session lifecycle and call gating
//! - `profile`: normalization, pagination and per-profile sessions
//! - `testing`: scripted doubles for tests

#![allow(clippy::too_many_arguments)]

pub mod core;
pub mod download;
pub mod profile;
pub mod testing;
pub mod upstream;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use download::{HttpMediaFetcher, MediaFetch};
pub use profile::{ContentItem, PageResult, ProfileSession, SessionState};
pub use upstream::{Authenticator, SessionManager, UpstreamClient};
