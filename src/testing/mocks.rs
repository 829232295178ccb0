//! Scripted stand-ins for the upstream client, the authenticator, the media
//! fetcher and the pacer.

use async_trait::async_trait;
use bytes::Bytes;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::error::{AppError, AppResult};
use crate::download::media::{Fetched, MediaFetch};
use crate::profile::paginator::{Pacer, PauseKind};
use crate::upstream::records::{
    HighlightDetail, HighlightRecord, MediaPage, MediaRecord, ProfileRecord, RawStory, ViewerRecord,
};
use crate::upstream::session::Authenticator;
use crate::upstream::UpstreamClient;

/// `AppError` is not `Clone`; scripted failures are replayed by variant.
fn replay(err: &AppError) -> AppError {
    match err {
        AppError::NotFound(m) => AppError::NotFound(m.clone()),
        AppError::AuthFailure(m) => AppError::AuthFailure(m.clone()),
        AppError::RateLimited(m) => AppError::RateLimited(m.clone()),
        AppError::ShapeMismatch(m) => AppError::ShapeMismatch(m.clone()),
        AppError::Session(m) => AppError::Session(m.clone()),
        AppError::Validation(m) => AppError::Validation(m.clone()),
        other => AppError::Transport(other.to_string()),
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// A scripted response: a value or a failure to replay on every call.
enum Scripted<T> {
    Value(T),
    Fail(AppError),
}

impl<T: Clone> Scripted<T> {
    fn get(&self) -> AppResult<T> {
        match self {
            Scripted::Value(v) => Ok(v.clone()),
            Scripted::Fail(e) => Err(replay(e)),
        }
    }
}

#[derive(Default)]
struct MockState {
    profiles: HashMap<String, Scripted<ProfileRecord>>,
    profile_failure: Option<AppError>,
    stories: Option<Scripted<Vec<RawStory>>>,
    fallback_stories: Option<Scripted<Vec<RawStory>>>,
    posts: HashMap<Option<String>, MediaPage>,
    posts_failure: Option<AppError>,
    reels: HashMap<Option<String>, MediaPage>,
    reels_failure: Option<AppError>,
    highlights: Option<Scripted<Vec<HighlightRecord>>>,
    highlight_details: HashMap<String, HighlightDetail>,
    viewers: HashMap<String, Vec<ViewerRecord>>,
    viewers_failure: Option<AppError>,
    account_id: Option<String>,
    media: HashMap<String, MediaRecord>,
    calls: Vec<String>,
    last_page_size: Option<usize>,
}

/// Upstream client driven by a script. Unscripted listings return empty
/// results; unscripted lookups return `NotFound`. Clones share state.
#[derive(Clone, Default)]
pub struct MockClient {
    state: Arc<Mutex<MockState>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn edit(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut lock(&self.state));
        self
    }

    pub fn with_profile(self, handle: &str, record: ProfileRecord) -> Self {
        self.edit(|s| {
            s.profiles.insert(handle.to_string(), Scripted::Value(record));
        })
    }

    /// Every profile lookup fails with `err`.
    pub fn fail_profile(self, err: AppError) -> Self {
        self.edit(|s| s.profile_failure = Some(err))
    }

    pub fn with_stories(self, stories: Vec<RawStory>) -> Self {
        self.edit(|s| s.stories = Some(Scripted::Value(stories)))
    }

    pub fn fail_stories(self, err: AppError) -> Self {
        self.edit(|s| s.stories = Some(Scripted::Fail(err)))
    }

    pub fn with_fallback_stories(self, stories: Vec<RawStory>) -> Self {
        self.edit(|s| s.fallback_stories = Some(Scripted::Value(stories)))
    }

    pub fn fail_fallback_stories(self, err: AppError) -> Self {
        self.edit(|s| s.fallback_stories = Some(Scripted::Fail(err)))
    }

    /// Page served when `list_posts` is called with `cursor`.
    pub fn with_posts(self, cursor: Option<&str>, page: MediaPage) -> Self {
        self.edit(|s| {
            s.posts.insert(cursor.map(str::to_string), page);
        })
    }

    pub fn fail_posts(self, err: AppError) -> Self {
        self.edit(|s| s.posts_failure = Some(err))
    }

    pub fn with_reels(self, cursor: Option<&str>, page: MediaPage) -> Self {
        self.edit(|s| {
            s.reels.insert(cursor.map(str::to_string), page);
        })
    }

    pub fn fail_reels(self, err: AppError) -> Self {
        self.edit(|s| s.reels_failure = Some(err))
    }

    pub fn with_highlights(self, highlights: Vec<HighlightRecord>) -> Self {
        self.edit(|s| s.highlights = Some(Scripted::Value(highlights)))
    }

    pub fn fail_highlights(self, err: AppError) -> Self {
        self.edit(|s| s.highlights = Some(Scripted::Fail(err)))
    }

    pub fn with_highlight_detail(self, detail: HighlightDetail) -> Self {
        self.edit(|s| {
            s.highlight_details.insert(detail.id.clone(), detail);
        })
    }

    pub fn with_viewers(self, story_id: &str, viewers: Vec<ViewerRecord>) -> Self {
        self.edit(|s| {
            s.viewers.insert(story_id.to_string(), viewers);
        })
    }

    pub fn fail_viewers(self, err: AppError) -> Self {
        self.edit(|s| s.viewers_failure = Some(err))
    }

    /// Id reported by `account_id`; defaults to `"0"`.
    pub fn logged_in_as(self, account_id: &str) -> Self {
        self.edit(|s| s.account_id = Some(account_id.to_string()))
    }

    pub fn with_media(self, code: &str, record: MediaRecord) -> Self {
        self.edit(|s| {
            s.media.insert(code.to_string(), record);
        })
    }

    /// Names of the trait methods called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.state).calls.clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        lock(&self.state).calls.iter().filter(|c| c.as_str() == op).count()
    }

    /// `page_size` passed to the most recent posts/reels listing.
    pub fn last_page_size(&self) -> Option<usize> {
        lock(&self.state).last_page_size
    }

    fn record(&self, op: &str) -> MutexGuard<'_, MockState> {
        let mut state = lock(&self.state);
        state.calls.push(op.to_string());
        state
    }
}

#[async_trait]
impl UpstreamClient for MockClient {
    async fn resolve_profile(&self, handle: &str) -> AppResult<ProfileRecord> {
        let state = self.record("resolve_profile");
        if let Some(err) = &state.profile_failure {
            return Err(replay(err));
        }
        match state.profiles.get(handle) {
            Some(scripted) => scripted.get(),
            None => Err(AppError::NotFound(format!("user {}", handle))),
        }
    }

    async fn list_stories(&self, _user_id: &str) -> AppResult<Vec<RawStory>> {
        let state = self.record("list_stories");
        state.stories.as_ref().map_or(Ok(Vec::new()), Scripted::get)
    }

    async fn list_stories_fallback(&self, _user_id: &str) -> AppResult<Vec<RawStory>> {
        let state = self.record("list_stories_fallback");
        state.fallback_stories.as_ref().map_or(Ok(Vec::new()), Scripted::get)
    }

    async fn list_posts(&self, _user_id: &str, page_size: usize, cursor: Option<&str>) -> AppResult<MediaPage> {
        let mut state = self.record("list_posts");
        state.last_page_size = Some(page_size);
        if let Some(err) = &state.posts_failure {
            return Err(replay(err));
        }
        Ok(state.posts.get(&cursor.map(str::to_string)).cloned().unwrap_or_default())
    }

    async fn list_reels(&self, _user_id: &str, page_size: usize, cursor: Option<&str>) -> AppResult<MediaPage> {
        let mut state = self.record("list_reels");
        state.last_page_size = Some(page_size);
        if let Some(err) = &state.reels_failure {
            return Err(replay(err));
        }
        Ok(state.reels.get(&cursor.map(str::to_string)).cloned().unwrap_or_default())
    }

    async fn list_highlights(&self, _user_id: &str) -> AppResult<Vec<HighlightRecord>> {
        let state = self.record("list_highlights");
        state.highlights.as_ref().map_or(Ok(Vec::new()), Scripted::get)
    }

    async fn highlight_detail(&self, highlight_id: &str) -> AppResult<HighlightDetail> {
        let state = self.record("highlight_detail");
        state
            .highlight_details
            .get(highlight_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("highlight {}", highlight_id)))
    }

    async fn story_viewers(&self, story_id: &str, limit: usize) -> AppResult<Vec<ViewerRecord>> {
        let state = self.record("story_viewers");
        if let Some(err) = &state.viewers_failure {
            return Err(replay(err));
        }
        Ok(state
            .viewers
            .get(story_id)
            .map(|v| v.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn account_id(&self) -> AppResult<String> {
        let state = self.record("account_id");
        Ok(state.account_id.clone().unwrap_or_else(|| "0".to_string()))
    }

    async fn media_by_code(&self, code: &str) -> AppResult<MediaRecord> {
        let state = self.record("media_by_code");
        state
            .media
            .get(code)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("media {}", code)))
    }
}

/// Hands out clones of one [`MockClient`] and counts resume/login calls.
#[derive(Clone)]
pub struct MockAuthenticator {
    client: MockClient,
    reject_resume: bool,
    resumes: Arc<AtomicUsize>,
    logins: Arc<AtomicUsize>,
}

impl MockAuthenticator {
    pub fn new(client: MockClient) -> Self {
        Self {
            client,
            reject_resume: false,
            resumes: Arc::new(AtomicUsize::new(0)),
            logins: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every `resume` fails as if the saved session had expired.
    pub fn reject_resume(mut self) -> Self {
        self.reject_resume = true;
        self
    }

    /// Settings produced by `export_settings`.
    pub fn settings() -> Value {
        json!({"uuids": {"phone_id": "mock-phone"}, "authorization_data": {"ds_user_id": "0"}})
    }

    pub fn resume_count(&self) -> usize {
        self.resumes.load(Ordering::SeqCst)
    }

    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    type Client = MockClient;

    async fn resume(&self, _settings: &Value) -> AppResult<MockClient> {
        self.resumes.fetch_add(1, Ordering::SeqCst);
        if self.reject_resume {
            return Err(AppError::AuthFailure("login_required".to_string()));
        }
        Ok(self.client.clone())
    }

    async fn login(&self, _username: &str, _password: &SecretString) -> AppResult<MockClient> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        // Give concurrent acquirers a chance to pile up on the same init
        tokio::task::yield_now().await;
        Ok(self.client.clone())
    }

    fn export_settings(&self, _client: &MockClient) -> AppResult<Value> {
        Ok(Self::settings())
    }
}

/// Media fetcher serving fixed bytes per URL and logging every request.
#[derive(Default)]
pub struct StubFetcher {
    bodies: HashMap<String, Bytes>,
    calls: Mutex<Vec<(String, bool)>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), Bytes::copy_from_slice(body));
        self
    }

    /// `(url, expect_video)` for each request made with a non-empty URL.
    pub fn calls(&self) -> Vec<(String, bool)> {
        lock(&self.calls).clone()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        lock(&self.calls).iter().filter(|(u, _)| u == url).count()
    }
}

#[async_trait]
impl MediaFetch for StubFetcher {
    async fn fetch(&self, url: &str, expect_video: bool) -> Fetched {
        if url.trim().is_empty() {
            return Fetched::empty();
        }
        lock(&self.calls).push((url.to_string(), expect_video));
        match self.bodies.get(url) {
            Some(body) => Fetched::new(body.clone(), expect_video),
            None => Fetched::empty(),
        }
    }
}

/// Pacer that only records what it was asked to wait for.
#[derive(Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<PauseKind>>,
}

impl RecordingPacer {
    pub fn pauses(&self) -> Vec<PauseKind> {
        lock(&self.pauses).clone()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, kind: PauseKind) {
        lock(&self.pauses).push(kind);
    }
}
