//! Media download

pub mod media;

pub use media::{mime_for, Fetched, HttpMediaFetcher, MediaFetch, MIME_IMAGE, MIME_VIDEO};
