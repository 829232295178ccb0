//! Raw records as the injected client hands them over.
//!
//! Field names follow the private API's own vocabulary so a client can
//! deserialize responses straight into these types. Everything optional
//! upstream is optional here; the normalizer decides what is usable.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Media-type codes used by upstream.
pub mod media_type {
    pub const PHOTO: u8 = 1;
    pub const VIDEO: u8 = 2;
    pub const CAROUSEL: u8 = 8;
}

/// `product_type` of a media record that is a reel.
pub const PRODUCT_TYPE_CLIPS: &str = "clips";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub pk: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub media_count: u64,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_verified: bool,
    /// Highest resolution avatar available
    #[serde(default)]
    pub profile_pic_url: Option<String>,
}

/// Story or highlight item in the typed shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub pk: String,
    #[serde(default)]
    pub media_type: u8,
    /// Unix seconds
    #[serde(default)]
    pub taken_at: i64,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub caption_text: Option<String>,
}

/// A story as returned by either listing path.
///
/// The primary listing yields typed records; the reel-feed fallback yields the
/// untyped JSON mapping (`image_versions2.candidates`, `video_versions`,
/// `caption.text`, `pk` or `id`).
#[derive(Debug, Clone, PartialEq)]
pub enum RawStory {
    Typed(StoryRecord),
    Mapping(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub pk: String,
    #[serde(default)]
    pub media_type: u8,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRecord {
    pub username: String,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
}

/// Post, carousel or reel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub pk: String,
    /// Shortcode used in permalinks
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub media_type: u8,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub taken_at: i64,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub caption_text: Option<String>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub play_count: Option<u64>,
    #[serde(default)]
    pub view_count: Option<u64>,
    /// Carousel slides, empty otherwise
    #[serde(default)]
    pub resources: Vec<ResourceRecord>,
    #[serde(default)]
    pub owner: Option<OwnerRecord>,
}

/// One page of posts or reels plus the cursor for the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaPage {
    pub records: Vec<MediaRecord>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVersion {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCandidates {
    #[serde(default)]
    pub candidates: Vec<ImageVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverRecord {
    #[serde(default)]
    pub cropped_image_version: Option<ImageVersion>,
    #[serde(default)]
    pub image_versions2: Option<ImageCandidates>,
}

/// Highlight cover media, typed or as a raw mapping depending on the endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverMedia {
    Typed(CoverRecord),
    Mapping(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightRecord {
    pub id: String,
    pub title: String,
    pub cover_media: Option<CoverMedia>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightDetail {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub items: Vec<StoryRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerRecord {
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
}
