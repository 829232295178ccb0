//! Heterogeneous upstream records to [`ContentItem`]s.
//!
//! Two things vary upstream: record shape (typed structs from the primary
//! endpoints, raw JSON mappings from the reel feed and some highlight payloads)
//! and media kind (photo, video, carousel). Shape is resolved first by a
//! per-shape adapter into a common field set; kind is resolved while building
//! media entries. An item whose preview cannot be downloaded is dropped.

use serde_json::Value;
use std::sync::Arc;

use super::model::{
    media_filename, story_permalink, ContentCommon, ContentItem, ContentKind, Engagement, HighlightItem, MediaAsset,
    MediaEntry, MediaRef, StoryExtras, Viewer,
};
use super::paginator::{Pacer, PauseKind};
use crate::core::time::TimeNormalizer;
use crate::download::media::MediaFetch;
use crate::upstream::records::{
    media_type, CoverMedia, HighlightRecord, MediaRecord, RawStory, StoryRecord, PRODUCT_TYPE_CLIPS,
};

/// Story fields after shape dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryFields {
    pub pk: String,
    pub is_video: bool,
    /// Always an image
    pub preview_url: String,
    /// Video URL for videos, the preview URL otherwise
    pub media_url: String,
    pub taken_at: i64,
    pub caption: String,
}

impl StoryFields {
    fn from_typed(story: &StoryRecord) -> Self {
        let is_video = story.media_type == media_type::VIDEO;
        let preview_url = story.thumbnail_url.clone().unwrap_or_default();
        let media_url = if is_video {
            story.video_url.clone().unwrap_or_default()
        } else {
            preview_url.clone()
        };

        Self {
            pk: story.pk.clone(),
            is_video,
            preview_url,
            media_url,
            taken_at: story.taken_at,
            caption: story.caption_text.clone().unwrap_or_default(),
        }
    }

    /// `None` when the mapping carries neither `pk` nor `id`.
    fn from_mapping(story: &Value) -> Option<Self> {
        let pk = scalar_string(story.get("pk")).or_else(|| scalar_string(story.get("id")))?;
        let is_video = story.get("media_type").and_then(Value::as_u64) == Some(u64::from(media_type::VIDEO));
        let preview_url = first_candidate_url(story.get("image_versions2")).unwrap_or_default();
        let media_url = if is_video {
            story
                .get("video_versions")
                .and_then(Value::as_array)
                .and_then(|versions| versions.first())
                .and_then(|v| v.get("url"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        } else {
            preview_url.clone()
        };
        let taken_at = story
            .get("taken_at")
            .and_then(|t| t.as_i64().or_else(|| t.as_f64().map(|f| f as i64)))
            .unwrap_or_default();
        let caption = story
            .get("caption")
            .and_then(|c| c.get("text"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Some(Self {
            pk,
            is_video,
            preview_url,
            media_url,
            taken_at,
            caption,
        })
    }
}

/// Shape dispatch for stories.
pub fn story_fields(raw: &RawStory) -> Option<StoryFields> {
    match raw {
        RawStory::Typed(story) => Some(StoryFields::from_typed(story)),
        RawStory::Mapping(value) => StoryFields::from_mapping(value),
    }
}

/// Cover URL for a highlight. Tried in order: cropped version, then the first
/// full-size candidate, in both shapes. First non-empty wins.
pub fn highlight_cover_url(cover: Option<&CoverMedia>) -> Option<String> {
    let url = match cover? {
        CoverMedia::Typed(record) => record
            .cropped_image_version
            .as_ref()
            .map(|v| v.url.clone())
            .filter(|u| !u.is_empty())
            .or_else(|| {
                record
                    .image_versions2
                    .as_ref()
                    .and_then(|versions| versions.candidates.first())
                    .map(|c| c.url.clone())
            }),
        CoverMedia::Mapping(value) => value
            .get("cropped_image_version")
            .and_then(|v| v.get("url"))
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .or_else(|| first_candidate_url(value.get("image_versions2"))),
    };
    url.filter(|u| !u.is_empty())
}

fn first_candidate_url(versions: Option<&Value>) -> Option<String> {
    versions?
        .get("candidates")?
        .as_array()?
        .first()?
        .get("url")?
        .as_str()
        .map(str::to_string)
}

fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Clone)]
pub struct ContentNormalizer {
    fetcher: Arc<dyn MediaFetch>,
    time: TimeNormalizer,
}

impl ContentNormalizer {
    pub fn new(fetcher: Arc<dyn MediaFetch>, time: TimeNormalizer) -> Self {
        Self { fetcher, time }
    }

    #[must_use]
    pub fn with_time(mut self, time: TimeNormalizer) -> Self {
        self.time = time;
        self
    }

    pub fn fetcher(&self) -> &dyn MediaFetch {
        self.fetcher.as_ref()
    }

    pub fn time(&self) -> &TimeNormalizer {
        &self.time
    }

    /// Previews are always requested as images.
    async fn preview(&self, url: &str) -> Option<MediaAsset> {
        if url.trim().is_empty() {
            return None;
        }
        MediaAsset::from_fetched(self.fetcher.fetch(url, false).await)
    }

    fn common(
        &self,
        id: &str,
        code: Option<String>,
        taken_at: i64,
        caption: String,
        preview: MediaAsset,
        media: Vec<MediaEntry>,
        engagement: Engagement,
    ) -> ContentCommon {
        ContentCommon {
            id: id.to_string(),
            code,
            taken_at,
            timestamp: self.time.normalize(taken_at),
            caption,
            preview,
            media,
            engagement,
        }
    }

    pub async fn story(&self, handle: &str, fields: StoryFields, viewers: Vec<Viewer>) -> Option<ContentItem> {
        let Some(preview) = self.preview(&fields.preview_url).await else {
            log::warn!("ContentNormalizer: story {} has no usable preview, skipping", fields.pk);
            return None;
        };

        let entry = MediaEntry {
            reference: MediaRef::new(
                fields.media_url.clone(),
                fields.is_video,
                media_filename(handle, ContentKind::Story, &fields.pk, fields.is_video),
            ),
            preview: preview.clone(),
        };

        let story = StoryExtras {
            viewer_count: viewers.len(),
            viewers,
            expires_at: self.time.expiry(fields.taken_at),
            permalink: story_permalink(handle, &fields.pk),
        };
        let common = self.common(
            &fields.pk,
            None,
            fields.taken_at,
            fields.caption,
            preview,
            vec![entry],
            Engagement::default(),
        );

        Some(ContentItem::Story { common, story })
    }

    /// Builds a media entry, downloading only the preview image.
    async fn entry(
        &self,
        handle: &str,
        kind: ContentKind,
        pk: &str,
        type_code: u8,
        thumbnail: Option<&str>,
        video: Option<&str>,
    ) -> Option<MediaEntry> {
        let is_video = type_code == media_type::VIDEO;
        let preview_url = thumbnail.unwrap_or_default();
        let media_url = if is_video { video.unwrap_or_default() } else { preview_url };

        let preview = self.preview(preview_url).await?;
        Some(MediaEntry {
            reference: MediaRef::new(media_url, is_video, media_filename(handle, kind, pk, is_video)),
            preview,
        })
    }

    /// Photo, video or carousel post. Carousel slides are normalized one by
    /// one with a pause after each slide that produced an entry.
    pub async fn post(&self, handle: &str, record: &MediaRecord, pacer: &dyn Pacer) -> Option<ContentItem> {
        let is_carousel = record.media_type == media_type::CAROUSEL || !record.resources.is_empty();

        let mut media = Vec::new();
        if is_carousel {
            for resource in &record.resources {
                if let Some(entry) = self
                    .entry(
                        handle,
                        ContentKind::Post,
                        &resource.pk,
                        resource.media_type,
                        resource.thumbnail_url.as_deref(),
                        resource.video_url.as_deref(),
                    )
                    .await
                {
                    media.push(entry);
                    pacer.pause(PauseKind::CarouselSlide).await;
                }
            }
        } else if let Some(entry) = self
            .entry(
                handle,
                ContentKind::Post,
                &record.pk,
                record.media_type,
                record.thumbnail_url.as_deref(),
                record.video_url.as_deref(),
            )
            .await
        {
            media.push(entry);
        }

        let Some(preview) = media.first().map(|e| e.preview.clone()) else {
            log::warn!("ContentNormalizer: post {} has no usable preview, skipping", record.pk);
            return None;
        };

        let engagement = Engagement {
            likes: record.like_count,
            comments: record.comment_count,
            plays: None,
            views: None,
        };
        let common = self.common(
            &record.pk,
            record.code.clone(),
            record.taken_at,
            record.caption_text.clone().unwrap_or_default(),
            preview,
            media,
            engagement,
        );

        Some(ContentItem::Post { common })
    }

    /// Reels need a video URL; the preview is the thumbnail.
    pub async fn reel(&self, handle: &str, record: &MediaRecord) -> Option<ContentItem> {
        let video_url = record.video_url.as_deref().filter(|u| !u.trim().is_empty())?;

        let Some(preview) = self.preview(record.thumbnail_url.as_deref().unwrap_or_default()).await else {
            log::warn!("ContentNormalizer: reel {} has no usable preview, skipping", record.pk);
            return None;
        };

        let entry = MediaEntry {
            reference: MediaRef::new(video_url, true, media_filename(handle, ContentKind::Reel, &record.pk, true)),
            preview: preview.clone(),
        };
        let engagement = Engagement {
            likes: record.like_count,
            comments: record.comment_count,
            plays: Some(record.play_count.unwrap_or_default()),
            views: Some(record.view_count.unwrap_or_default()),
        };
        let common = self.common(
            &record.pk,
            record.code.clone(),
            record.taken_at,
            record.caption_text.clone().unwrap_or_default(),
            preview,
            vec![entry],
            engagement,
        );

        Some(ContentItem::Reel { common })
    }

    /// Single media looked up directly: clips become reels, everything else a post.
    pub async fn single_media(&self, handle: &str, record: &MediaRecord, pacer: &dyn Pacer) -> Option<ContentItem> {
        if record.product_type.as_deref() == Some(PRODUCT_TYPE_CLIPS) {
            if let Some(item) = self.reel(handle, record).await {
                return Some(item);
            }
        }
        self.post(handle, record, pacer).await
    }

    pub async fn highlight_cover(&self, record: &HighlightRecord) -> Option<ContentItem> {
        let Some(cover_url) = highlight_cover_url(record.cover_media.as_ref()) else {
            log::warn!("ContentNormalizer: highlight {} has no cover URL, skipping", record.id);
            return None;
        };
        let Some(preview) = self.preview(&cover_url).await else {
            log::warn!("ContentNormalizer: failed to download cover for highlight {}", record.id);
            return None;
        };

        let common = ContentCommon {
            id: record.id.clone(),
            code: None,
            taken_at: 0,
            timestamp: Default::default(),
            caption: String::new(),
            preview,
            media: Vec::new(),
            engagement: Engagement::default(),
        };

        Some(ContentItem::HighlightCover {
            common,
            title: record.title.clone(),
        })
    }

    /// Downloads the full content of one highlight item.
    pub async fn highlight_item(&self, handle: &str, record: &StoryRecord) -> Option<HighlightItem> {
        let fields = StoryFields::from_typed(record);
        let reference = MediaRef::new(
            fields.media_url,
            fields.is_video,
            media_filename(handle, ContentKind::Highlight, &fields.pk, fields.is_video),
        );
        if reference.url.trim().is_empty() {
            return None;
        }

        let asset = reference.resolve(self.fetcher.as_ref()).await?;
        Some(HighlightItem {
            id: fields.pk,
            filename: reference.filename,
            timestamp: self.time.normalize(fields.taken_at),
            asset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{media_record, resource_record, story_record, StubFetcher};
    use crate::profile::paginator::NoPacing;
    use crate::upstream::records::{CoverRecord, ImageCandidates, ImageVersion};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn normalizer(fetcher: StubFetcher) -> (ContentNormalizer, Arc<StubFetcher>) {
        let fetcher = Arc::new(fetcher);
        (ContentNormalizer::new(fetcher.clone(), TimeNormalizer::default()), fetcher)
    }

    #[test]
    fn test_story_shapes_decode_identically() {
        let typed = RawStory::Typed(StoryRecord {
            pk: "3001".into(),
            media_type: 2,
            taken_at: 1_700_000_000,
            thumbnail_url: Some("https://cdn/s.jpg".into()),
            video_url: Some("https://cdn/s.mp4".into()),
            caption_text: Some("hi".into()),
        });
        let mapping = RawStory::Mapping(json!({
            "pk": 3001,
            "media_type": 2,
            "taken_at": 1_700_000_000,
            "image_versions2": {"candidates": [{"url": "https://cdn/s.jpg"}]},
            "video_versions": [{"url": "https://cdn/s.mp4"}],
            "caption": {"text": "hi"}
        }));

        assert_eq!(story_fields(&typed), story_fields(&mapping));
    }

    #[test]
    fn test_mapping_story_uses_id_and_tolerates_missing_caption() {
        let raw = RawStory::Mapping(json!({
            "id": "abc_1",
            "media_type": 1,
            "image_versions2": {"candidates": [{"url": "https://cdn/p.jpg"}]},
            "caption": null
        }));

        let fields = story_fields(&raw).unwrap();

        assert_eq!(fields.pk, "abc_1");
        assert!(!fields.is_video);
        assert_eq!(fields.media_url, "https://cdn/p.jpg");
        assert_eq!(fields.caption, "");
        assert_eq!(fields.taken_at, 0);
    }

    #[test]
    fn test_mapping_story_without_id_is_unusable() {
        assert_eq!(story_fields(&RawStory::Mapping(json!({"media_type": 1}))), None);
    }

    #[test]
    fn test_highlight_cover_paths_in_order() {
        let cropped = CoverMedia::Typed(CoverRecord {
            cropped_image_version: Some(ImageVersion { url: "https://cdn/crop.jpg".into() }),
            image_versions2: Some(ImageCandidates {
                candidates: vec![ImageVersion { url: "https://cdn/full.jpg".into() }],
            }),
        });
        assert_eq!(highlight_cover_url(Some(&cropped)).as_deref(), Some("https://cdn/crop.jpg"));

        let mapping = CoverMedia::Mapping(json!({"cropped_image_version": {"url": "https://cdn/m.jpg"}}));
        assert_eq!(highlight_cover_url(Some(&mapping)).as_deref(), Some("https://cdn/m.jpg"));

        let typed_fallback = CoverMedia::Typed(CoverRecord {
            cropped_image_version: Some(ImageVersion { url: String::new() }),
            image_versions2: Some(ImageCandidates {
                candidates: vec![ImageVersion { url: "https://cdn/full.jpg".into() }],
            }),
        });
        assert_eq!(highlight_cover_url(Some(&typed_fallback)).as_deref(), Some("https://cdn/full.jpg"));

        let mapping_fallback = CoverMedia::Mapping(json!({"image_versions2": {"candidates": [{"url": "https://cdn/mf.jpg"}]}}));
        assert_eq!(highlight_cover_url(Some(&mapping_fallback)).as_deref(), Some("https://cdn/mf.jpg"));

        assert_eq!(highlight_cover_url(Some(&CoverMedia::Mapping(json!({})))), None);
        assert_eq!(highlight_cover_url(None), None);
    }

    #[tokio::test]
    async fn test_story_item_fields() {
        let (n, _) = normalizer(StubFetcher::new().with("https://cdn/s.jpg", b"jpg"));
        let fields = story_fields(&RawStory::Typed(story_record("3001", 2, "https://cdn/s.jpg", Some("https://cdn/s.mp4")))).unwrap();
        let viewers = vec![Viewer {
            handle: "fan".into(),
            display_name: "Fan".into(),
        }];

        let item = n.story("jane", fields, viewers).await.unwrap();

        let ContentItem::Story { common, story } = &item else {
            panic!("expected story, got {:?}", item.kind());
        };
        assert_eq!(common.id, "3001");
        assert_eq!(common.media.len(), 1);
        assert_eq!(common.media[0].reference.filename, "jane_story_3001.mp4");
        assert_eq!(common.media[0].reference.url, "https://cdn/s.mp4");
        assert_eq!(common.preview.mime_type, "image/jpeg");
        assert_eq!(story.viewer_count, 1);
        assert_eq!(story.permalink, "https://www.instagram.com/stories/jane/3001/");
        assert_eq!(story.expires_at, n.time().expiry(common.taken_at));
    }

    #[tokio::test]
    async fn test_story_without_preview_is_dropped() {
        let (n, _) = normalizer(StubFetcher::new());
        let fields = story_fields(&RawStory::Typed(story_record("1", 1, "https://cdn/missing.jpg", None))).unwrap();

        assert!(n.story("jane", fields, vec![]).await.is_none());
    }

    #[tokio::test]
    async fn test_carousel_keeps_previews_and_defers_full_content() {
        let (n, fetcher) = normalizer(
            StubFetcher::new()
                .with("https://cdn/a.jpg", b"a")
                .with("https://cdn/b.jpg", b"b")
                .with("https://cdn/c.jpg", b"c"),
        );
        let mut record = media_record("500", 8);
        record.resources = vec![
            resource_record("501", 1, "https://cdn/a.jpg", None),
            resource_record("502", 1, "https://cdn/b.jpg", None),
            resource_record("503", 2, "https://cdn/c.jpg", Some("https://cdn/c.mp4")),
        ];

        let item = n.post("jane", &record, &NoPacing).await.unwrap();

        assert_eq!(item.kind(), ContentKind::Post);
        assert_eq!(item.media().len(), 3);
        assert!(item.media().iter().all(|e| !e.preview.bytes.is_empty()));
        assert_eq!(item.media()[2].reference.url, "https://cdn/c.mp4");
        assert!(item.media()[2].reference.is_video);
        assert_eq!(item.media()[2].reference.filename, "jane_post_503.mp4");
        assert_eq!(item.preview().bytes.as_ref(), b"a");
        assert_eq!(fetcher.calls_for("https://cdn/c.mp4"), 0);
    }

    #[tokio::test]
    async fn test_carousel_skips_slides_without_preview() {
        let (n, _) = normalizer(StubFetcher::new().with("https://cdn/a.jpg", b"a"));
        let mut record = media_record("500", 8);
        record.resources = vec![
            resource_record("501", 1, "https://cdn/a.jpg", None),
            resource_record("502", 1, "https://cdn/broken.jpg", None),
        ];

        let item = n.post("jane", &record, &NoPacing).await.unwrap();

        assert_eq!(item.media().len(), 1);
    }

    #[tokio::test]
    async fn test_reel_requires_video_url() {
        let (n, _) = normalizer(StubFetcher::new().with("https://cdn/r.jpg", b"r"));
        let mut record = media_record("900", 2);
        record.thumbnail_url = Some("https://cdn/r.jpg".into());

        assert!(n.reel("jane", &record).await.is_none());

        record.video_url = Some("https://cdn/r.mp4".into());
        record.play_count = Some(1200);
        let item = n.reel("jane", &record).await.unwrap();
        assert_eq!(item.common().engagement.plays, Some(1200));
        assert_eq!(item.common().engagement.views, Some(0));
        assert_eq!(item.media()[0].reference.filename, "jane_reel_900.mp4");
    }

    #[tokio::test]
    async fn test_single_media_clips_become_reels() {
        let (n, _) = normalizer(StubFetcher::new().with("https://cdn/r.jpg", b"r"));
        let mut record = media_record("901", 2);
        record.product_type = Some("clips".into());
        record.thumbnail_url = Some("https://cdn/r.jpg".into());
        record.video_url = Some("https://cdn/r.mp4".into());

        let item = n.single_media("jane", &record, &NoPacing).await.unwrap();
        assert_eq!(item.kind(), ContentKind::Reel);

        record.product_type = Some("feed".into());
        let item = n.single_media("jane", &record, &NoPacing).await.unwrap();
        assert_eq!(item.kind(), ContentKind::Post);
        assert_eq!(item.media()[0].reference.filename, "jane_post_901.mp4");
    }

    #[tokio::test]
    async fn test_highlight_item_downloads_full_content() {
        let (n, _) = normalizer(StubFetcher::new().with("https://cdn/h.mp4", b"video"));
        let record = story_record("77", 2, "https://cdn/h.jpg", Some("https://cdn/h.mp4"));

        let item = n.highlight_item("jane", &record).await.unwrap();

        assert_eq!(item.filename, "jane_highlight_77.mp4");
        assert_eq!(item.asset.mime_type, "video/mp4");
        assert_eq!(item.asset.bytes.as_ref(), b"video");
    }
}
