//! Cursor pagination over posts and reels with inter-item pacing.
//!
//! Upstream hands out opaque cursors; callers get them back as the
//! `continuation` of a [`PageResult`]. Records are processed one at a time and
//! the [`Pacer`] is awaited after each, so a page of six items takes several
//! seconds in production and no time at all under [`NoPacing`].

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::model::{ContentItem, Identity, PageResult};
use super::normalizer::ContentNormalizer;
use crate::core::config;
use crate::core::utils::jittered;
use crate::upstream::records::{media_type, MediaRecord};
use crate::upstream::UpstreamClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseKind {
    /// After each item of a listing
    Item,
    /// After each slide of a carousel
    CarouselSlide,
}

/// Delay policy between sequential steps.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, kind: PauseKind);
}

/// Random pause drawn from a per-kind range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomPacer {
    item: (Duration, Duration),
    slide: (Duration, Duration),
}

impl Default for RandomPacer {
    /// 1–3 s per item, 1–2 s per carousel slide.
    fn default() -> Self {
        Self::new(
            (Duration::from_secs(1), Duration::from_secs(3)),
            (Duration::from_secs(1), Duration::from_secs(2)),
        )
    }
}

impl RandomPacer {
    pub fn new(item: (Duration, Duration), slide: (Duration, Duration)) -> Self {
        Self { item, slide }
    }

    /// Ranges from PACING_* environment variables.
    pub fn from_env() -> Self {
        Self::new(config::paging::item_range(), config::paging::slide_range())
    }

    pub fn range(&self, kind: PauseKind) -> (Duration, Duration) {
        match kind {
            PauseKind::Item => self.item,
            PauseKind::CarouselSlide => self.slide,
        }
    }
}

#[async_trait]
impl Pacer for RandomPacer {
    async fn pause(&self, kind: PauseKind) {
        let (min, max) = self.range(kind);
        tokio::time::sleep(jittered(min, max)).await;
    }
}

/// Zero-delay policy for tests and batch tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn pause(&self, _kind: PauseKind) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Posts,
    Reels,
}

impl PageKind {
    fn label(&self) -> &'static str {
        match self {
            PageKind::Posts => "posts",
            PageKind::Reels => "reels",
        }
    }

    /// Posts keep photos and carousels; reels need something to play.
    fn accepts(&self, record: &MediaRecord) -> bool {
        match self {
            PageKind::Posts => matches!(record.media_type, media_type::PHOTO | media_type::CAROUSEL),
            PageKind::Reels => record.video_url.as_deref().is_some_and(|u| !u.trim().is_empty()),
        }
    }
}

pub struct PacedPaginator {
    client: Arc<dyn UpstreamClient>,
    normalizer: ContentNormalizer,
    pacer: Arc<dyn Pacer>,
}

impl PacedPaginator {
    pub fn new(client: Arc<dyn UpstreamClient>, normalizer: ContentNormalizer, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            client,
            normalizer,
            pacer,
        }
    }

    /// Fetches and normalizes one page.
    ///
    /// `page_size` is capped at `config::paging::PAGE_SIZE_CAP`. An unresolved
    /// identity or an upstream failure yields an empty page with no
    /// continuation. A cursor equal to the one just used also ends pagination.
    pub async fn page(
        &self,
        identity: &Identity,
        continuation: Option<&str>,
        page_size: usize,
        kind: PageKind,
    ) -> PageResult<ContentItem> {
        self.try_page(identity, continuation, page_size, kind)
            .await
            .unwrap_or_else(PageResult::empty)
    }

    /// Like [`PacedPaginator::page`], but `None` when the identity is
    /// unresolved or the upstream listing failed. A successful listing with
    /// nothing in it is `Some` of an empty page.
    pub async fn try_page(
        &self,
        identity: &Identity,
        continuation: Option<&str>,
        page_size: usize,
        kind: PageKind,
    ) -> Option<PageResult<ContentItem>> {
        let user_id = identity.resolved_id()?;
        let page_size = page_size.clamp(1, config::paging::PAGE_SIZE_CAP);
        let cursor = continuation.filter(|c| !c.trim().is_empty());

        let listing = match kind {
            PageKind::Posts => self.client.list_posts(user_id, page_size, cursor).await,
            PageKind::Reels => self.client.list_reels(user_id, page_size, cursor).await,
        };
        let page = match listing {
            Ok(page) => page,
            Err(e) => {
                log::error!("PacedPaginator: failed to list {} for {}: {}", kind.label(), identity.handle(), e);
                return None;
            }
        };

        let handle = identity.handle();
        let mut items = Vec::new();
        for record in page.records.iter().filter(|r| kind.accepts(r)).take(page_size) {
            let item = match kind {
                PageKind::Posts => self.normalizer.post(handle, record, self.pacer.as_ref()).await,
                PageKind::Reels => self.normalizer.reel(handle, record).await,
            };
            if let Some(item) = item {
                items.push(item);
            }
            self.pacer.pause(PauseKind::Item).await;
        }

        let next = page.next_cursor.filter(|next| Some(next.as_str()) != cursor);
        log::info!(
            "PacedPaginator: {} page for {} -> {} items, more: {}",
            kind.label(),
            handle,
            items.len(),
            next.is_some()
        );

        Some(PageResult::new(items, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::core::time::TimeNormalizer;
    use crate::testing::{media_record, MockClient, RecordingPacer, StubFetcher};
    use crate::upstream::records::MediaPage;
    use pretty_assertions::assert_eq;

    fn photo(pk: &str) -> MediaRecord {
        let mut r = media_record(pk, 1);
        r.thumbnail_url = Some(format!("https://cdn/{}.jpg", pk));
        r
    }

    fn reel(pk: &str, with_video: bool) -> MediaRecord {
        let mut r = media_record(pk, 2);
        r.thumbnail_url = Some(format!("https://cdn/{}.jpg", pk));
        if with_video {
            r.video_url = Some(format!("https://cdn/{}.mp4", pk));
        }
        r
    }

    fn fetcher_for(pks: &[&str]) -> StubFetcher {
        pks.iter()
            .fold(StubFetcher::new(), |f, pk| f.with(&format!("https://cdn/{}.jpg", pk), b"img"))
    }

    fn resolved(id: &str) -> Identity {
        let mut identity = Identity::from_reference("jane");
        identity.resolve(id);
        identity
    }

    fn paginator(client: MockClient, fetcher: StubFetcher, pacer: Arc<dyn Pacer>) -> PacedPaginator {
        PacedPaginator::new(
            Arc::new(client),
            ContentNormalizer::new(Arc::new(fetcher), TimeNormalizer::default()),
            pacer,
        )
    }

    #[tokio::test]
    async fn test_unresolved_identity_is_empty() {
        let client = MockClient::new().with_posts(None, MediaPage::default());
        let p = paginator(client, StubFetcher::new(), Arc::new(NoPacing));

        let page = p.page(&Identity::from_reference("jane"), None, 6, PageKind::Posts).await;

        assert_eq!(page, PageResult::empty());
    }

    #[tokio::test]
    async fn test_posts_filter_and_cursor() {
        let client = MockClient::new().with_posts(
            None,
            MediaPage {
                records: vec![photo("1"), reel("2", true), photo("3")],
                next_cursor: Some("c2".into()),
            },
        );
        let p = paginator(client, fetcher_for(&["1", "2", "3"]), Arc::new(NoPacing));

        let page = p.page(&resolved("42"), None, 6, PageKind::Posts).await;

        let ids: Vec<_> = page.items.iter().map(|i| i.id().to_string()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(page.continuation.as_deref(), Some("c2"));
    }

    #[tokio::test]
    async fn test_page_size_is_capped() {
        let client = MockClient::new().with_posts(
            None,
            MediaPage {
                records: (1..=9).map(|i| photo(&i.to_string())).collect(),
                next_cursor: None,
            },
        );
        let pks: Vec<String> = (1..=9).map(|i| i.to_string()).collect();
        let pk_refs: Vec<&str> = pks.iter().map(String::as_str).collect();
        let client_handle = Arc::new(client);
        let p = PacedPaginator::new(
            client_handle.clone(),
            ContentNormalizer::new(Arc::new(fetcher_for(&pk_refs)), TimeNormalizer::default()),
            Arc::new(NoPacing),
        );

        let page = p.page(&resolved("42"), None, 50, PageKind::Posts).await;

        assert_eq!(page.items.len(), 6);
        assert_eq!(client_handle.last_page_size(), Some(6));
    }

    #[tokio::test]
    async fn test_reels_drop_records_without_video() {
        let client = MockClient::new().with_reels(
            None,
            MediaPage {
                records: vec![reel("10", true), reel("11", false), reel("12", true)],
                next_cursor: Some(String::new()),
            },
        );
        let p = paginator(client, fetcher_for(&["10", "11", "12"]), Arc::new(NoPacing));

        let page = p.page(&resolved("42"), None, 6, PageKind::Reels).await;

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.continuation, None);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_empty_page() {
        let client = MockClient::new().fail_posts(AppError::RateLimited("wait".into()));
        let p = paginator(client, StubFetcher::new(), Arc::new(NoPacing));

        let page = p.page(&resolved("42"), Some("c1"), 6, PageKind::Posts).await;

        assert!(page.items.is_empty());
        assert!(page.is_last());
    }

    #[tokio::test]
    async fn test_try_page_tells_empty_listing_from_failure() {
        let empty = paginator(MockClient::new(), StubFetcher::new(), Arc::new(NoPacing));
        let failing = paginator(
            MockClient::new().fail_posts(AppError::Transport("reset".into())),
            StubFetcher::new(),
            Arc::new(NoPacing),
        );

        let listed = empty.try_page(&resolved("42"), None, 6, PageKind::Posts).await;
        let failed = failing.try_page(&resolved("42"), None, 6, PageKind::Posts).await;
        let unresolved = empty
            .try_page(&Identity::from_reference("jane"), None, 6, PageKind::Posts)
            .await;

        assert_eq!(listed, Some(PageResult::empty()));
        assert_eq!(failed, None);
        assert_eq!(unresolved, None);
    }

    #[tokio::test]
    async fn test_repeated_cursor_ends_pagination() {
        let client = MockClient::new().with_posts(
            Some("c1"),
            MediaPage {
                records: vec![photo("1")],
                next_cursor: Some("c1".into()),
            },
        );
        let p = paginator(client, fetcher_for(&["1"]), Arc::new(NoPacing));

        let page = p.page(&resolved("42"), Some("c1"), 6, PageKind::Posts).await;

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.continuation, None);
    }

    #[tokio::test]
    async fn test_pacer_called_per_item_and_slide() {
        let mut carousel = media_record("5", 8);
        carousel.resources = vec![
            crate::testing::resource_record("5a", 1, "https://cdn/5a.jpg", None),
            crate::testing::resource_record("5b", 1, "https://cdn/5b.jpg", None),
        ];
        let client = MockClient::new().with_posts(
            None,
            MediaPage {
                records: vec![photo("1"), carousel],
                next_cursor: None,
            },
        );
        let pacer = Arc::new(RecordingPacer::default());
        let p = paginator(client, fetcher_for(&["1", "5a", "5b"]), pacer.clone());

        p.page(&resolved("42"), None, 6, PageKind::Posts).await;

        assert_eq!(
            pacer.pauses(),
            vec![
                PauseKind::Item,
                PauseKind::CarouselSlide,
                PauseKind::CarouselSlide,
                PauseKind::Item
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_random_pacer_waits_within_range() {
        let pacer = RandomPacer::default();
        let started = tokio::time::Instant::now();

        pacer.pause(PauseKind::Item).await;

        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(1) && waited <= Duration::from_secs(3) + Duration::from_millis(5));
    }
}
