//! Video filtering, playback resolution and item construction.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use trailerforge_common::{
    BrowseItem, Category, ExtraType, MediaProtocol, MediaSource, MovieId, Result, VideoItem,
    TMDB_PROVIDER_KEY,
};

use crate::cache::{CacheKey, CacheValue, WriteBatch};
use crate::cancel::cancellable;
use crate::resolver::{select_encoding, PlaybackResolution, StreamResolver};

/// Which videos of a movie become items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Only the first resolvable trailer, decorated as a movie trailer.
    TrailerOnly,
    /// Every resolvable video regardless of type.
    AllVideos,
}

/// Builds playable [`BrowseItem`]s from catalog videos.
pub struct ItemBuilder {
    resolver: Arc<dyn StreamResolver>,
    max_bitrate: Option<u32>,
}

impl ItemBuilder {
    pub fn new(resolver: Arc<dyn StreamResolver>, max_bitrate: Option<u32>) -> Self {
        Self {
            resolver,
            max_bitrate,
        }
    }

    /// Resolve the encoding `video` plays with, if any qualifies.
    pub async fn resolve_playback(
        &self,
        video: &VideoItem,
        cancel: &CancellationToken,
    ) -> Result<Option<PlaybackResolution>> {
        let formats = cancellable(cancel, self.resolver.resolve(&video.site, &video.key)).await?;
        Ok(formats.and_then(|formats| select_encoding(&formats, self.max_bitrate)))
    }

    /// Turn `videos` of `movie` into items, in video order.
    ///
    /// Unresolvable videos are skipped. Every considered video is staged in
    /// `batch` so playback can later be resolved by video id alone. Poster and
    /// trailer classification are read through `batch`; a movie without a
    /// cached classification falls back to `source`'s, then to archive.
    pub async fn build_items(
        &self,
        movie: MovieId,
        source: Option<Category>,
        videos: &[VideoItem],
        mode: BuildMode,
        batch: &WriteBatch<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<BrowseItem>> {
        let poster = batch.poster(movie);
        let mut items = Vec::new();

        for video in videos {
            if mode == BuildMode::TrailerOnly && !video.is_trailer() {
                continue;
            }

            batch.stage(CacheKey::Video(video.id.clone()), CacheValue::Video(video.clone()));

            let Some(resolution) = self.resolve_playback(video, cancel).await? else {
                debug!(
                    movie_id = %movie,
                    video_id = %video.id,
                    site = %video.site,
                    "No playable encoding, skipping video"
                );
                continue;
            };

            let mut item = BrowseItem::media(video);
            item.image_url = poster.clone();
            item.media_sources.push(media_source(video, &resolution));

            if mode == BuildMode::TrailerOnly {
                let trailer_type = batch
                    .trailer_type(movie)
                    .or_else(|| source.map(Category::trailer_type))
                    .unwrap_or_default();
                item.extra_type = Some(ExtraType::Trailer);
                item.trailer_types = vec![trailer_type];
                item.provider_ids
                    .insert(TMDB_PROVIDER_KEY.to_string(), movie.to_string());
                items.push(item);
                break;
            }

            items.push(item);
        }

        Ok(items)
    }
}

/// Remote HTTP source playing `video` at `resolution`.
pub fn media_source(video: &VideoItem, resolution: &PlaybackResolution) -> MediaSource {
    MediaSource {
        id: video.id.to_string(),
        name: video.name.clone(),
        path: resolution.url.clone(),
        bitrate: resolution.bitrate,
        protocol: MediaProtocol::Http,
        is_remote: true,
    }
}
