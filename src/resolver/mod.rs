//! Playable stream resolution.
//!
//! A [`StreamResolver`] turns a `(site, key)` pair into the encodings the
//! hosting site offers. [`SiteRouter`] is the production entry point: it sends
//! YouTube keys to the extraction service, recognises Vimeo without
//! supporting it, and ignores every other site. [`select_encoding`] then
//! applies the bitrate ceiling.

pub mod extractor;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trailerforge_common::Result;

pub use extractor::ExtractorClient;

/// One encoding of a hosted video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encoding {
    pub bitrate: u32,
    pub url: String,
}

/// The encoding chosen for playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackResolution {
    pub url: String,
    pub bitrate: u32,
}

/// Resolves hosted videos to their available encodings.
#[async_trait]
pub trait StreamResolver: Send + Sync {
    /// Encodings of `key` on `site`.
    ///
    /// `Ok(None)` means the video cannot be played (unsupported site or
    /// unknown video) and is not an error. `Err` means the resolver itself
    /// failed.
    async fn resolve(&self, site: &str, key: &str) -> Result<Option<Vec<Encoding>>>;
}

/// Hosting sites the router knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    YouTube,
    Vimeo,
    Other,
}

impl Site {
    /// Case-insensitive site name match.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("youtube") {
            Site::YouTube
        } else if name.eq_ignore_ascii_case("vimeo") {
            Site::Vimeo
        } else {
            Site::Other
        }
    }
}

/// Dispatches resolution by hosting site.
pub struct SiteRouter {
    youtube: Option<Arc<dyn StreamResolver>>,
}

impl SiteRouter {
    /// Route YouTube videos to `youtube`. Without a backend nothing resolves.
    pub fn new(youtube: Option<Arc<dyn StreamResolver>>) -> Self {
        Self { youtube }
    }
}

#[async_trait]
impl StreamResolver for SiteRouter {
    async fn resolve(&self, site: &str, key: &str) -> Result<Option<Vec<Encoding>>> {
        match Site::parse(site) {
            Site::YouTube => match &self.youtube {
                Some(backend) => backend.resolve(site, key).await,
                None => {
                    debug!(site, key, "No YouTube backend configured");
                    Ok(None)
                }
            },
            Site::Vimeo => {
                debug!(site, key, "Site is not implemented");
                Ok(None)
            }
            Site::Other => {
                debug!(site, key, "Unsupported site");
                Ok(None)
            }
        }
    }
}

/// Pick the highest-bitrate encoding strictly below `max_bitrate`.
///
/// An unset ceiling accepts every encoding. Equal bitrates keep the first
/// listed encoding.
pub fn select_encoding(formats: &[Encoding], max_bitrate: Option<u32>) -> Option<PlaybackResolution> {
    let mut best: Option<&Encoding> = None;
    for encoding in formats {
        if max_bitrate.is_some_and(|max| encoding.bitrate >= max) {
            continue;
        }
        if best.map_or(true, |b| encoding.bitrate > b.bitrate) {
            best = Some(encoding);
        }
    }
    best.map(|e| PlaybackResolution {
        url: e.url.clone(),
        bitrate: e.bitrate,
    })
}
