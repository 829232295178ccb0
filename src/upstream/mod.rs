//! Port to the authenticated private-API client.
//!
//! The protocol itself lives outside this crate. An implementation of
//! [`UpstreamClient`] is handed in by the embedding service; this module only
//! owns its lifecycle ([`session::SessionManager`]) and call pacing
//! ([`gate::GatedClient`]).

pub mod gate;
pub mod records;
pub mod session;

use async_trait::async_trait;

use crate::core::error::AppResult;

pub use gate::GatedClient;
pub use records::{
    CoverMedia, CoverRecord, HighlightDetail, HighlightRecord, ImageCandidates, ImageVersion, MediaPage, MediaRecord,
    OwnerRecord, ProfileRecord, RawStory, ResourceRecord, StoryRecord, ViewerRecord,
};
pub use session::{Authenticator, SessionManager};

/// Authenticated retrieval of profile content.
///
/// Any call may fail with `NotFound`, `AuthFailure`, `RateLimited`,
/// `Transport` or `ShapeMismatch`.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn resolve_profile(&self, handle: &str) -> AppResult<ProfileRecord>;

    /// Primary story listing.
    async fn list_stories(&self, user_id: &str) -> AppResult<Vec<RawStory>>;

    /// Reel-feed listing, used when the primary path fails.
    async fn list_stories_fallback(&self, user_id: &str) -> AppResult<Vec<RawStory>>;

    async fn list_posts(&self, user_id: &str, page_size: usize, cursor: Option<&str>) -> AppResult<MediaPage>;

    async fn list_reels(&self, user_id: &str, page_size: usize, cursor: Option<&str>) -> AppResult<MediaPage>;

    async fn list_highlights(&self, user_id: &str) -> AppResult<Vec<HighlightRecord>>;

    async fn highlight_detail(&self, highlight_id: &str) -> AppResult<HighlightDetail>;

    async fn story_viewers(&self, story_id: &str, limit: usize) -> AppResult<Vec<ViewerRecord>>;

    /// Id of the account the client is logged in as.
    async fn account_id(&self) -> AppResult<String>;

    /// Single post or reel by shortcode.
    async fn media_by_code(&self, code: &str) -> AppResult<MediaRecord>;
}
