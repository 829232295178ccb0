//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use std::sync::Arc;

use instascope::core::TimeNormalizer;
use instascope::profile::{NoPacing, ProfileSession};
use instascope::testing::{media_record, resource_record, MockClient, StubFetcher};
use instascope::upstream::MediaRecord;

pub const HANDLE: &str = "jane";
pub const USER_ID: &str = "42";
pub const AVATAR_URL: &str = "https://cdn.test/jane/avatar.jpg";

/// Session over `client` and `fetcher` with no pacing and the default
/// display zone.
pub fn session(client: &MockClient, fetcher: &Arc<StubFetcher>) -> ProfileSession {
    ProfileSession::new(Arc::new(client.clone()), fetcher.clone())
        .with_pacer(Arc::new(NoPacing))
        .with_time_normalizer(TimeNormalizer::default())
}

pub fn thumb(pk: &str) -> String {
    format!("https://cdn.test/{}.jpg", pk)
}

pub fn video(pk: &str) -> String {
    format!("https://cdn.test/{}.mp4", pk)
}

pub fn photo(pk: &str) -> MediaRecord {
    let mut record = media_record(pk, 1);
    record.thumbnail_url = Some(thumb(pk));
    record
}

pub fn reel(pk: &str) -> MediaRecord {
    let mut record = media_record(pk, 2);
    record.product_type = Some("clips".to_string());
    record.thumbnail_url = Some(thumb(pk));
    record.video_url = Some(video(pk));
    record.play_count = Some(1200);
    record
}

/// Carousel with a photo, a video and another photo.
pub fn carousel(pk: &str) -> MediaRecord {
    let mut record = media_record(pk, 8);
    record.resources = vec![
        resource_record(&format!("{}a", pk), 1, &thumb(&format!("{}a", pk)), None),
        resource_record(
            &format!("{}b", pk),
            2,
            &thumb(&format!("{}b", pk)),
            Some(&video(&format!("{}b", pk))),
        ),
        resource_record(&format!("{}c", pk), 1, &thumb(&format!("{}c", pk)), None),
    ];
    record
}

/// Fetcher that serves a small body for every preview and video URL the
/// given pks can produce, plus the profile avatar.
pub fn fetcher_for(pks: &[&str]) -> StubFetcher {
    let mut fetcher = StubFetcher::new().with(AVATAR_URL, b"avatar");
    for pk in pks {
        fetcher = fetcher
            .with(&thumb(pk), format!("jpg:{}", pk).as_bytes())
            .with(&video(pk), format!("mp4:{}", pk).as_bytes());
    }
    fetcher
}
