//! Profile content: normalization, pagination and per-profile sessions

pub mod model;
pub mod normalizer;
pub mod paginator;
pub mod session;

pub use model::{
    ContentItem, ContentKind, CountsDisplay, Engagement, HighlightItem, Identity, MediaAsset, MediaEntry, MediaRef,
    PageResult, PostDetail, ProfileOverview, ProfileSummary, Reply, Viewer,
};
pub use normalizer::{highlight_cover_url, story_fields, ContentNormalizer, StoryFields};
pub use paginator::{NoPacing, PacedPaginator, Pacer, PageKind, PauseKind, RandomPacer};
pub use session::{ProfileSession, SessionState};
