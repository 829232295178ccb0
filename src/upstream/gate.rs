//! One-at-a-time access to the shared upstream client.
//!
//! All sessions in the process share a single authenticated client. Calls are
//! serialized through an async mutex and spaced by a random delay drawn from the
//! configured range (3–8 s by default) so the account does not trip upstream
//! throttling.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::records::{HighlightDetail, HighlightRecord, MediaPage, MediaRecord, ProfileRecord, RawStory, ViewerRecord};
use super::UpstreamClient;
use crate::core::config;
use crate::core::error::AppResult;
use crate::core::utils::jittered;

pub struct GatedClient<C> {
    inner: C,
    last_call: Mutex<Option<Instant>>,
    spacing: (Duration, Duration),
}

impl<C: UpstreamClient> GatedClient<C> {
    pub fn new(inner: C, min_spacing: Duration, max_spacing: Duration) -> Self {
        Self {
            inner,
            last_call: Mutex::new(None),
            spacing: (min_spacing, max_spacing),
        }
    }

    /// Spacing from CLIENT_DELAY_MIN_MS / CLIENT_DELAY_MAX_MS.
    pub fn from_env(inner: C) -> Self {
        let (min, max) = config::client::delay_range();
        Self::new(inner, min, max)
    }

    /// Serialized but without spacing.
    pub fn unpaced(inner: C) -> Self {
        Self::new(inner, Duration::ZERO, Duration::ZERO)
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    async fn gated<'a, T, F, Fut>(&'a self, op: &str, call: F) -> AppResult<T>
    where
        F: FnOnce(&'a C) -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
    {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let wait = jittered(self.spacing.0, self.spacing.1);
            let elapsed = prev.elapsed();
            if elapsed < wait {
                log::debug!("GatedClient: waiting {:?} before {}", wait - elapsed, op);
                tokio::time::sleep(wait - elapsed).await;
            }
        }

        let result = call(&self.inner).await;
        *last = Some(Instant::now());
        if let Err(ref e) = result {
            log::warn!("GatedClient: {} failed [{}]: {}", op, e.category(), e);
        }
        result
    }
}

#[async_trait]
impl<C: UpstreamClient> UpstreamClient for GatedClient<C> {
    async fn resolve_profile(&self, handle: &str) -> AppResult<ProfileRecord> {
        self.gated("resolve_profile", |c| c.resolve_profile(handle)).await
    }

    async fn list_stories(&self, user_id: &str) -> AppResult<Vec<RawStory>> {
        self.gated("list_stories", |c| c.list_stories(user_id)).await
    }

    async fn list_stories_fallback(&self, user_id: &str) -> AppResult<Vec<RawStory>> {
        self.gated("list_stories_fallback", |c| c.list_stories_fallback(user_id))
            .await
    }

    async fn list_posts(&self, user_id: &str, page_size: usize, cursor: Option<&str>) -> AppResult<MediaPage> {
        self.gated("list_posts", |c| c.list_posts(user_id, page_size, cursor))
            .await
    }

    async fn list_reels(&self, user_id: &str, page_size: usize, cursor: Option<&str>) -> AppResult<MediaPage> {
        self.gated("list_reels", |c| c.list_reels(user_id, page_size, cursor))
            .await
    }

    async fn list_highlights(&self, user_id: &str) -> AppResult<Vec<HighlightRecord>> {
        self.gated("list_highlights", |c| c.list_highlights(user_id)).await
    }

    async fn highlight_detail(&self, highlight_id: &str) -> AppResult<HighlightDetail> {
        self.gated("highlight_detail", |c| c.highlight_detail(highlight_id))
            .await
    }

    async fn story_viewers(&self, story_id: &str, limit: usize) -> AppResult<Vec<ViewerRecord>> {
        self.gated("story_viewers", |c| c.story_viewers(story_id, limit)).await
    }

    async fn account_id(&self) -> AppResult<String> {
        self.gated("account_id", |c| c.account_id()).await
    }

    async fn media_by_code(&self, code: &str) -> AppResult<MediaRecord> {
        self.gated("media_by_code", |c| c.media_by_code(code)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::testing::MockClient;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_is_immediate() {
        let gate = GatedClient::new(MockClient::new(), Duration::from_secs(3), Duration::from_secs(3));
        let started = Instant::now();

        gate.account_id().await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_calls_are_spaced() {
        let gate = GatedClient::new(MockClient::new(), Duration::from_secs(3), Duration::from_secs(3));
        let started = Instant::now();

        gate.account_id().await.unwrap();
        gate.account_id().await.unwrap();
        gate.account_id().await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_are_serialized() {
        let gate = Arc::new(GatedClient::new(
            MockClient::new(),
            Duration::from_secs(2),
            Duration::from_secs(2),
        ));
        let started = Instant::now();

        let a = tokio::spawn({
            let gate = Arc::clone(&gate);
            async move { gate.account_id().await }
        });
        let b = tokio::spawn({
            let gate = Arc::clone(&gate);
            async move { gate.account_id().await }
        });
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(gate.inner().call_count("account_id"), 2);
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let gate = GatedClient::unpaced(MockClient::new().fail_profile(AppError::NotFound("ghost".into())));

        let err = gate.resolve_profile("ghost").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
