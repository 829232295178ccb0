//! Normalized output types.
//!
//! Everything here serializes to the plain JSON the front end consumes. Binary
//! content is carried as [`Bytes`] and rendered as base64 on the way out.

use base64::engine::general_purpose;
use base64::Engine as _;
use bytes::Bytes;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::core::error::AppResult;
use crate::core::time::DisplayTime;
use crate::core::utils::{format_count, reference_slug};
use crate::download::media::{mime_for, Fetched, MediaFetch};
use crate::upstream::records::ProfileRecord;

const PROFILE_BASE_URL: &str = "https://www.instagram.com";

/// The profile a session is bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    handle: String,
    resolved_id: Option<String>,
}

impl Identity {
    /// Accepts a bare handle or any profile URL.
    pub fn from_reference(raw: &str) -> Self {
        Self {
            handle: reference_slug(raw),
            resolved_id: None,
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn resolved_id(&self) -> Option<&str> {
        self.resolved_id.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_id.is_some()
    }

    pub(crate) fn resolve(&mut self, id: impl Into<String>) {
        self.resolved_id = Some(id.into());
    }
}

/// Which listing an item came from; also the token used in filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Story,
    Post,
    Reel,
    Highlight,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Story => "story",
            ContentKind::Post => "post",
            ContentKind::Reel => "reel",
            ContentKind::Highlight => "highlight",
        }
    }
}

/// `{handle}_{kind}_{pk}.{mp4|jpg}`
pub fn media_filename(handle: &str, kind: ContentKind, pk: &str, is_video: bool) -> String {
    let ext = if is_video { "mp4" } else { "jpg" };
    format!("{}_{}_{}.{}", handle, kind.as_str(), pk, ext)
}

pub fn stories_url(handle: &str) -> String {
    format!("{}/stories/{}/", PROFILE_BASE_URL, handle)
}

pub fn story_permalink(handle: &str, pk: &str) -> String {
    format!("{}/stories/{}/{}/", PROFILE_BASE_URL, handle, pk)
}

pub fn post_permalink(code: &str) -> String {
    format!("{}/p/{}/", PROFILE_BASE_URL, code)
}

/// Downloaded content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaAsset {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl MediaAsset {
    /// `None` for an empty download.
    pub fn from_fetched(fetched: Fetched) -> Option<Self> {
        if fetched.is_empty() {
            return None;
        }
        Some(Self {
            bytes: fetched.bytes,
            mime_type: fetched.mime_type,
        })
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }
}

impl Serialize for MediaAsset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MediaAsset", 2)?;
        state.serialize_field("content", &self.to_base64())?;
        state.serialize_field("media_type", &self.mime_type)?;
        state.end()
    }
}

/// Content that has been located but not downloaded yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaRef {
    pub url: String,
    pub is_video: bool,
    pub filename: String,
}

impl MediaRef {
    pub fn new(url: impl Into<String>, is_video: bool, filename: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_video,
            filename: filename.into(),
        }
    }

    /// Mime type the full content will have once resolved.
    pub fn mime_type(&self) -> &'static str {
        mime_for(self.is_video)
    }

    /// Downloads the full content. `None` when the download came back empty.
    pub async fn resolve(&self, fetcher: &dyn MediaFetch) -> Option<MediaAsset> {
        MediaAsset::from_fetched(fetcher.fetch(&self.url, self.is_video).await)
    }
}

/// A lazily-resolvable media element with its already-downloaded preview image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaEntry {
    #[serde(flatten)]
    pub reference: MediaRef,
    pub preview: MediaAsset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Engagement {
    pub likes: u64,
    pub comments: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plays: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
}

/// Fields shared by every item kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentCommon {
    pub id: String,
    /// Shortcode for posts and reels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Unix seconds, 0 when upstream gave none
    pub taken_at: i64,
    pub timestamp: DisplayTime,
    pub caption: String,
    pub preview: MediaAsset,
    pub media: Vec<MediaEntry>,
    pub engagement: Engagement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Viewer {
    pub handle: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryExtras {
    pub viewers: Vec<Viewer>,
    pub viewer_count: usize,
    pub expires_at: DisplayTime,
    pub permalink: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentItem {
    Story {
        #[serde(flatten)]
        common: ContentCommon,
        #[serde(flatten)]
        story: StoryExtras,
    },
    Post {
        #[serde(flatten)]
        common: ContentCommon,
    },
    Reel {
        #[serde(flatten)]
        common: ContentCommon,
    },
    HighlightCover {
        #[serde(flatten)]
        common: ContentCommon,
        title: String,
    },
}

impl ContentItem {
    pub fn common(&self) -> &ContentCommon {
        match self {
            ContentItem::Story { common, .. }
            | ContentItem::Post { common }
            | ContentItem::Reel { common }
            | ContentItem::HighlightCover { common, .. } => common,
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentItem::Story { .. } => ContentKind::Story,
            ContentItem::Post { .. } => ContentKind::Post,
            ContentItem::Reel { .. } => ContentKind::Reel,
            ContentItem::HighlightCover { .. } => ContentKind::Highlight,
        }
    }

    pub fn id(&self) -> &str {
        &self.common().id
    }

    pub fn preview(&self) -> &MediaAsset {
        &self.common().preview
    }

    pub fn media(&self) -> &[MediaEntry] {
        &self.common().media
    }
}

/// One fully downloaded highlight item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightItem {
    pub id: String,
    pub filename: String,
    pub timestamp: DisplayTime,
    #[serde(flatten)]
    pub asset: MediaAsset,
}

/// Profile snapshot taken at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub handle: String,
    pub resolved_id: String,
    pub display_name: String,
    pub post_count: u64,
    pub follower_count: u64,
    pub following_count: u64,
    pub bio: String,
    pub external_url: String,
    pub category: String,
    pub is_private: bool,
    pub is_verified: bool,
    pub avatar_ref: MediaRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountsDisplay {
    pub posts: String,
    pub followers: String,
    pub following: String,
}

impl ProfileSummary {
    pub fn from_record(handle: &str, record: &ProfileRecord) -> Self {
        let display_name = record
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(handle)
            .to_string();

        Self {
            handle: handle.to_string(),
            resolved_id: record.pk.clone(),
            display_name,
            post_count: record.media_count,
            follower_count: record.follower_count,
            following_count: record.following_count,
            bio: record.biography.clone().unwrap_or_default(),
            external_url: record.external_url.clone().unwrap_or_default(),
            category: record.category.clone().unwrap_or_default(),
            is_private: record.is_private,
            is_verified: record.is_verified,
            avatar_ref: MediaRef::new(
                record.profile_pic_url.clone().unwrap_or_default(),
                false,
                format!("{}_profile_pic.jpg", handle),
            ),
        }
    }

    pub fn counts_display(&self) -> CountsDisplay {
        CountsDisplay {
            posts: format_count(self.post_count),
            followers: format_count(self.follower_count),
            following: format_count(self.following_count),
        }
    }
}

/// A page of items. `continuation` is `None` at the end, never `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub continuation: Option<String>,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, continuation: Option<String>) -> Self {
        Self {
            items,
            continuation: continuation.filter(|c| !c.trim().is_empty()),
        }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            continuation: None,
        }
    }

    pub fn is_last(&self) -> bool {
        self.continuation.is_none()
    }
}

/// Profile card plus current stories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileOverview {
    pub profile: ProfileSummary,
    pub counts: CountsDisplay,
    pub avatar: Option<MediaAsset>,
    pub stories_url: String,
    pub stories: Vec<ContentItem>,
}

/// A single post or reel looked up by URL or shortcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    pub owner_handle: String,
    pub owner_avatar: Option<MediaAsset>,
    pub permalink: String,
    pub item: ContentItem,
}

/// Boundary shape: the value itself, or `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply<T> {
    Ok(T),
    Error { error: String },
}

impl<T> From<AppResult<T>> for Reply<T> {
    fn from(result: AppResult<T>) -> Self {
        match result {
            Ok(value) => Reply::Ok(value),
            Err(e) => Reply::Error { error: e.to_string() },
        }
    }
}
