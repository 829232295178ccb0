//! Record builders with just enough fields set to be useful.

use crate::upstream::records::{
    CoverMedia, CoverRecord, HighlightRecord, ImageVersion, MediaRecord, ProfileRecord, ResourceRecord, StoryRecord,
};

pub fn profile_record(pk: &str, username: &str) -> ProfileRecord {
    ProfileRecord {
        pk: pk.to_string(),
        username: username.to_string(),
        full_name: Some(format!("{} (full name)", username)),
        media_count: 12,
        follower_count: 1_500_000,
        following_count: 950,
        biography: Some("bio".to_string()),
        profile_pic_url: Some(format!("https://cdn.test/{}/avatar.jpg", username)),
        ..Default::default()
    }
}

/// Story item taken at 2023-11-14 22:13:20 UTC.
pub fn story_record(pk: &str, media_type: u8, thumbnail_url: &str, video_url: Option<&str>) -> StoryRecord {
    StoryRecord {
        pk: pk.to_string(),
        media_type,
        taken_at: 1_700_000_000,
        thumbnail_url: Some(thumbnail_url.to_string()),
        video_url: video_url.map(str::to_string),
        caption_text: None,
    }
}

pub fn media_record(pk: &str, media_type: u8) -> MediaRecord {
    MediaRecord {
        pk: pk.to_string(),
        code: Some(format!("C{}", pk)),
        media_type,
        taken_at: 1_700_000_000,
        like_count: 10,
        comment_count: 2,
        ..Default::default()
    }
}

pub fn resource_record(pk: &str, media_type: u8, thumbnail_url: &str, video_url: Option<&str>) -> ResourceRecord {
    ResourceRecord {
        pk: pk.to_string(),
        media_type,
        thumbnail_url: Some(thumbnail_url.to_string()),
        video_url: video_url.map(str::to_string),
    }
}

/// Highlight whose cover is the typed cropped version at `cover_url`.
pub fn highlight_record(id: &str, title: &str, cover_url: &str) -> HighlightRecord {
    HighlightRecord {
        id: id.to_string(),
        title: title.to_string(),
        cover_media: Some(CoverMedia::Typed(CoverRecord {
            cropped_image_version: Some(ImageVersion {
                url: cover_url.to_string(),
            }),
            image_versions2: None,
        })),
    }
}
