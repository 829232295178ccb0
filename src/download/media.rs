//! Media byte retrieval with a desktop-browser request profile.
//!
//! CDN links handed out by upstream are plain HTTPS URLs that reject obvious
//! bots, so every request carries the same browser-like header set. Failures
//! never propagate: callers get an empty [`Fetched`] and decide to drop the item.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::core::config;
use crate::core::error::{AppError, AppResult};

pub const MIME_VIDEO: &str = "video/mp4";
pub const MIME_IMAGE: &str = "image/jpeg";

/// Content type is decided by what the caller expects, not by response headers.
pub fn mime_for(expect_video: bool) -> &'static str {
    if expect_video {
        MIME_VIDEO
    } else {
        MIME_IMAGE
    }
}

/// Raw bytes of one download plus the mime type they were requested as.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fetched {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl Fetched {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(bytes: impl Into<Bytes>, expect_video: bool) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_for(expect_video).to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Anything that can turn a media URL into bytes.
#[async_trait]
pub trait MediaFetch: Send + Sync {
    /// Returns [`Fetched::empty`] on an empty URL or any failure.
    async fn fetch(&self, url: &str, expect_video: bool) -> Fetched;
}

/// reqwest-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpMediaFetcher {
    client: Client,
}

impl HttpMediaFetcher {
    /// Builds a fetcher with the configured timeout (MEDIA_TIMEOUT_SECS, 15s by default).
    pub fn new() -> AppResult<Self> {
        Self::with_timeout(config::media::timeout())
    }

    pub fn with_timeout(timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(config::media::USER_AGENT)
            .default_headers(browser_headers())
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    async fn try_fetch(&self, url: &str) -> AppResult<Bytes> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::Transport(format!("unexpected status {}", status)));
        }
        Ok(response.bytes().await?)
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(config::media::ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(config::media::ACCEPT_LANGUAGE));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(config::media::ACCEPT_ENCODING));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}

#[async_trait]
impl MediaFetch for HttpMediaFetcher {
    async fn fetch(&self, url: &str, expect_video: bool) -> Fetched {
        let url = url.trim();
        if url.is_empty() {
            return Fetched::empty();
        }

        match self.try_fetch(url).await {
            Ok(bytes) if !bytes.is_empty() => Fetched::new(bytes, expect_video),
            Ok(_) => {
                log::warn!("MediaFetcher: empty body from {}", url);
                Fetched::empty()
            }
            Err(e) => {
                log::warn!("MediaFetcher: download failed for {}: {}", url, e);
                Fetched::empty()
            }
        }
    }
}
