//! Per-profile orchestration.
//!
//! A [`ProfileSession`] is bound to one resolved identity and walks through
//! `Uninitialized -> ProfileResolved -> ContentReady`. Only profile resolution
//! (and the single-post lookup) can fail; every content listing degrades to an
//! empty or partial result and logs what went wrong.

use std::sync::Arc;

use super::model::{
    post_permalink, stories_url, ContentItem, HighlightItem, Identity, MediaAsset, MediaRef, PageResult,
    PostDetail, ProfileOverview, ProfileSummary, Viewer,
};
use super::normalizer::{story_fields, ContentNormalizer};
use super::paginator::{PacedPaginator, Pacer, PageKind, PauseKind, RandomPacer};
use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::time::TimeNormalizer;
use crate::core::utils::media_code_from_reference;
use crate::download::media::MediaFetch;
use crate::upstream::records::RawStory;
use crate::upstream::UpstreamClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    Uninitialized,
    ProfileResolved,
    ContentReady,
}

pub struct ProfileSession {
    client: Arc<dyn UpstreamClient>,
    normalizer: ContentNormalizer,
    pacer: Arc<dyn Pacer>,
    identity: Identity,
    summary: Option<ProfileSummary>,
    state: SessionState,
    page_size: usize,
}

impl ProfileSession {
    /// Production defaults: random pacing and display zone from the environment.
    pub fn new(client: Arc<dyn UpstreamClient>, fetcher: Arc<dyn MediaFetch>) -> Self {
        Self {
            client,
            normalizer: ContentNormalizer::new(fetcher, TimeNormalizer::from_env()),
            pacer: Arc::new(RandomPacer::from_env()),
            identity: Identity::default(),
            summary: None,
            state: SessionState::Uninitialized,
            page_size: config::paging::PAGE_SIZE_CAP,
        }
    }

    #[must_use]
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    #[must_use]
    pub fn with_time_normalizer(mut self, time: TimeNormalizer) -> Self {
        self.normalizer = self.normalizer.with_time(time);
        self
    }

    /// Page size for posts and reels, still capped by the paginator.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn summary(&self) -> Option<&ProfileSummary> {
        self.summary.as_ref()
    }

    fn mark_content_ready(&mut self) {
        if self.state == SessionState::ProfileResolved {
            self.state = SessionState::ContentReady;
        }
    }

    fn paginator(&self) -> PacedPaginator {
        PacedPaginator::new(Arc::clone(&self.client), self.normalizer.clone(), Arc::clone(&self.pacer))
    }

    /// Resolves a handle or profile URL and binds the session to it.
    ///
    /// On failure the previous identity and state are kept.
    pub async fn fetch_profile(&mut self, reference: &str) -> AppResult<ProfileSummary> {
        let mut identity = Identity::from_reference(reference);
        if identity.handle().is_empty() {
            return Err(AppError::Validation("Username is missing".to_string()));
        }

        let record = self.client.resolve_profile(identity.handle()).await.map_err(|e| {
            log::error!("ProfileSession: failed to fetch profile {}: {}", identity.handle(), e);
            e
        })?;
        if record.pk.trim().is_empty() {
            return Err(AppError::ShapeMismatch(format!(
                "profile {} came back without an id",
                identity.handle()
            )));
        }

        let summary = ProfileSummary::from_record(identity.handle(), &record);
        let same_profile = self.identity.resolved_id() == Some(record.pk.as_str());
        identity.resolve(record.pk.clone());

        log::info!(
            "ProfileSession: resolved {} (id {}, {} posts)",
            identity.handle(),
            record.pk,
            record.media_count
        );

        self.identity = identity;
        self.summary = Some(summary.clone());
        if !same_profile || self.state == SessionState::Uninitialized {
            self.state = SessionState::ProfileResolved;
        }

        Ok(summary)
    }

    /// Current stories. Falls back to the reel feed when the primary listing
    /// fails; empty when both fail.
    pub async fn fetch_stories(&mut self) -> Vec<ContentItem> {
        let Some(user_id) = self.identity.resolved_id().map(str::to_string) else {
            return Vec::new();
        };
        let handle = self.identity.handle().to_string();

        let raw = match self.client.list_stories(&user_id).await {
            Ok(stories) => {
                log::info!("ProfileSession: found {} stories for {}", stories.len(), handle);
                stories
            }
            Err(e) => {
                log::warn!("ProfileSession: story listing failed for {} ({}), trying reel feed", handle, e);
                match self.client.list_stories_fallback(&user_id).await {
                    Ok(stories) => {
                        log::info!("ProfileSession: found {} stories via reel feed for {}", stories.len(), handle);
                        stories
                    }
                    Err(e) => {
                        log::error!("ProfileSession: reel feed failed for {}: {}", handle, e);
                        return Vec::new();
                    }
                }
            }
        };
        self.mark_content_ready();

        let owns_profile = !raw.is_empty() && self.owns_profile(&user_id).await;
        let mut items = Vec::new();
        for story in &raw {
            if let Some(item) = self.story_item(&handle, story, owns_profile).await {
                items.push(item);
            }
            self.pacer.pause(PauseKind::Item).await;
        }
        items
    }

    async fn owns_profile(&self, user_id: &str) -> bool {
        match self.client.account_id().await {
            Ok(account_id) => account_id == user_id,
            Err(e) => {
                log::warn!("ProfileSession: could not determine logged-in account: {}", e);
                false
            }
        }
    }

    async fn story_item(&self, handle: &str, story: &RawStory, owns_profile: bool) -> Option<ContentItem> {
        let Some(fields) = story_fields(story) else {
            log::warn!("ProfileSession: story record without an id, skipping");
            return None;
        };
        let viewers = if owns_profile {
            self.story_viewers(&fields.pk).await
        } else {
            Vec::new()
        };
        self.normalizer.story(handle, fields, viewers).await
    }

    async fn story_viewers(&self, story_id: &str) -> Vec<Viewer> {
        match self
            .client
            .story_viewers(story_id, config::stories::VIEWER_LIMIT)
            .await
        {
            Ok(viewers) => viewers
                .into_iter()
                .take(config::stories::VIEWER_LIMIT)
                .map(|v| Viewer {
                    display_name: v.full_name.unwrap_or_default(),
                    handle: v.username,
                })
                .collect(),
            Err(e) => {
                log::warn!("ProfileSession: could not list viewers for story {}: {}", story_id, e);
                Vec::new()
            }
        }
    }

    pub async fn fetch_posts(&mut self, continuation: Option<&str>) -> PageResult<ContentItem> {
        self.fetch_page(continuation, PageKind::Posts).await
    }

    pub async fn fetch_reels(&mut self, continuation: Option<&str>) -> PageResult<ContentItem> {
        self.fetch_page(continuation, PageKind::Reels).await
    }

    async fn fetch_page(&mut self, continuation: Option<&str>, kind: PageKind) -> PageResult<ContentItem> {
        if !self.identity.is_resolved() {
            return PageResult::empty();
        }
        let Some(page) = self
            .paginator()
            .try_page(&self.identity, continuation, self.page_size, kind)
            .await
        else {
            return PageResult::empty();
        };
        self.mark_content_ready();
        page
    }

    /// Highlight covers only; items are fetched per highlight on demand.
    pub async fn fetch_highlights(&mut self) -> Vec<ContentItem> {
        let Some(user_id) = self.identity.resolved_id().map(str::to_string) else {
            return Vec::new();
        };

        let highlights = match self.client.list_highlights(&user_id).await {
            Ok(highlights) => highlights,
            Err(e) => {
                log::error!("ProfileSession: failed to list highlights for {}: {}", self.identity.handle(), e);
                return Vec::new();
            }
        };
        log::info!(
            "ProfileSession: found {} highlights for {}",
            highlights.len(),
            self.identity.handle()
        );
        self.mark_content_ready();

        let mut items = Vec::new();
        for highlight in &highlights {
            if let Some(item) = self.normalizer.highlight_cover(highlight).await {
                items.push(item);
            }
            self.pacer.pause(PauseKind::Item).await;
        }
        items
    }

    /// Every item of one highlight, fully downloaded.
    pub async fn fetch_highlight_items(&mut self, highlight_id: &str) -> Vec<HighlightItem> {
        if !self.identity.is_resolved() || highlight_id.trim().is_empty() {
            return Vec::new();
        }

        let detail = match self.client.highlight_detail(highlight_id).await {
            Ok(detail) => detail,
            Err(e) => {
                log::error!("ProfileSession: failed to fetch highlight {}: {}", highlight_id, e);
                return Vec::new();
            }
        };
        self.mark_content_ready();
        if detail.items.is_empty() {
            log::info!("ProfileSession: no items found for highlight {}", highlight_id);
            return Vec::new();
        }

        let handle = self.identity.handle().to_string();
        let mut items = Vec::new();
        for record in &detail.items {
            if let Some(item) = self.normalizer.highlight_item(&handle, record).await {
                items.push(item);
            }
            self.pacer.pause(PauseKind::Item).await;
        }
        log::info!(
            "ProfileSession: processed {} of {} items for highlight {}",
            items.len(),
            detail.items.len(),
            highlight_id
        );
        items
    }

    /// Resolves a reference handed out earlier. `None` when the download fails.
    pub async fn download_full(&self, media: &MediaRef) -> Option<MediaAsset> {
        media.resolve(self.normalizer.fetcher()).await
    }

    pub async fn fetch_avatar(&self) -> Option<MediaAsset> {
        let summary = self.summary.as_ref()?;
        self.download_full(&summary.avatar_ref).await
    }

    /// Profile card, avatar and stories in one call.
    pub async fn fetch_overview(&mut self, reference: &str) -> AppResult<ProfileOverview> {
        let profile = self.fetch_profile(reference).await?;
        let avatar = self.fetch_avatar().await;
        let stories = self.fetch_stories().await;

        Ok(ProfileOverview {
            counts: profile.counts_display(),
            stories_url: stories_url(&profile.handle),
            profile,
            avatar,
            stories,
        })
    }

    /// Looks up a single post or reel by URL or shortcode. Independent of the
    /// bound identity.
    pub async fn fetch_post(&self, reference: &str) -> AppResult<PostDetail> {
        let code = media_code_from_reference(reference)
            .ok_or_else(|| AppError::Validation("Post ID is missing".to_string()))?;

        let record = self.client.media_by_code(&code).await.map_err(|e| {
            log::error!("ProfileSession: failed to fetch media {}: {}", code, e);
            e
        })?;

        let owner = record.owner.clone().unwrap_or_default();
        let owner_handle = if owner.username.is_empty() {
            "unknown".to_string()
        } else {
            owner.username
        };
        let owner_avatar = match owner.profile_pic_url.as_deref() {
            Some(url) => MediaAsset::from_fetched(self.normalizer.fetcher().fetch(url, false).await),
            None => None,
        };

        let item = self
            .normalizer
            .single_media(&owner_handle, &record, self.pacer.as_ref())
            .await
            .ok_or_else(|| AppError::NotFound(format!("media {} has no downloadable preview", code)))?;

        Ok(PostDetail {
            permalink: post_permalink(record.code.as_deref().unwrap_or(&code)),
            owner_handle,
            owner_avatar,
            item,
        })
    }
}
