//! Category listings and the flattened trailer aggregate.
//!
//! [`CategoryOrchestrator::list_category`] turns one category into movie
//! folders. [`CategoryOrchestrator::list_all`] walks every enabled category,
//! looks up each movie's videos with the configured [`LookupStrategy`] and
//! keeps one trailer per movie. Results follow submission order regardless
//! of which lookup finishes first.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use trailerforge_common::{
    BrowseItem, BrowseResult, Category, MovieId, MovieSummary, Result, VideoItem,
};

use crate::aggregator::PaginationAggregator;
use crate::cache::{CacheKey, CacheValue, ResponseCache, WriteBatch};
use crate::cancel::cancellable;
use crate::catalog::{poster_url, CatalogClient, LanguageContext};
use crate::config::Config;
use crate::items::{BuildMode, ItemBuilder};

/// How per-movie video lookups are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    /// One lookup at a time.
    Sequential,
    /// Up to `max_in_flight` lookups at once.
    Concurrent { max_in_flight: usize },
}

impl LookupStrategy {
    /// `Sequential` for a width of 0 or 1, `Concurrent` otherwise.
    pub fn from_concurrency(width: usize) -> Self {
        if width <= 1 {
            LookupStrategy::Sequential
        } else {
            LookupStrategy::Concurrent {
                max_in_flight: width,
            }
        }
    }

    pub fn max_in_flight(self) -> usize {
        match self {
            LookupStrategy::Sequential => 1,
            LookupStrategy::Concurrent { max_in_flight } => max_in_flight.max(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Categories included in the aggregate, in listing order.
    pub categories: Vec<Category>,
    /// Per-category movie cap.
    pub limit: usize,
    pub strategy: LookupStrategy,
    /// Drop movies whose video lookup or playback resolution fails instead
    /// of failing the aggregate.
    pub isolate_failures: bool,
}

impl OrchestratorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            categories: config.categories.enabled(),
            limit: config.categories.limit,
            strategy: LookupStrategy::from_concurrency(config.refresh.concurrency),
            isolate_failures: config.refresh.isolate_failures,
        }
    }
}

pub struct CategoryOrchestrator {
    catalog: Arc<dyn CatalogClient>,
    aggregator: PaginationAggregator,
    items: ItemBuilder,
    cache: Arc<ResponseCache>,
    settings: OrchestratorSettings,
}

impl CategoryOrchestrator {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        context: LanguageContext,
        items: ItemBuilder,
        cache: Arc<ResponseCache>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            aggregator: PaginationAggregator::new(catalog.clone(), context),
            catalog,
            items,
            cache,
            settings,
        }
    }

    pub fn items(&self) -> &ItemBuilder {
        &self.items
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// One folder per movie of `category`, starting at remote page
    /// `start_page`. Poster and trailer classification of every movie are
    /// staged in `batch`.
    pub async fn list_category(
        &self,
        category: Category,
        start_page: u32,
        batch: &WriteBatch<'_>,
        cancel: &CancellationToken,
    ) -> Result<BrowseResult> {
        let movies = self
            .aggregator
            .fetch_category(category, start_page, self.settings.limit, cancel)
            .await?;

        let items = movies
            .iter()
            .map(|movie| {
                let poster = stage_movie(batch, movie, category);
                BrowseItem::movie_folder(movie, poster)
            })
            .collect();

        Ok(BrowseResult::from_items(items))
    }

    /// Videos of `movie`, straight from the catalog.
    pub async fn fetch_videos(
        &self,
        movie: MovieId,
        cancel: &CancellationToken,
    ) -> Result<Vec<VideoItem>> {
        let videos = cancellable(cancel, self.catalog.list_videos(movie)).await?;
        Ok(videos.results)
    }

    /// One trailer per movie across every enabled category.
    ///
    /// Without `force_refresh` a cached aggregate is returned as is. A
    /// rebuilt aggregate and every cache write made while building it are
    /// published together, and only when the whole run succeeds.
    pub async fn list_all(
        &self,
        force_refresh: bool,
        cancel: &CancellationToken,
    ) -> Result<Arc<BrowseResult>> {
        if !force_refresh {
            if let Some(cached) = self.cache.listing(&CacheKey::Aggregate) {
                debug!(count = cached.total_record_count, "Aggregate cache hit");
                return Ok(cached);
            }
        }

        debug!(
            force_refresh,
            categories = ?self.settings.categories,
            "Building trailer aggregate"
        );

        let batch = self.cache.batch();
        let mut movies: Vec<(Category, MovieSummary)> = Vec::new();
        let mut seen = HashSet::new();

        for &category in &self.settings.categories {
            let listed = self
                .aggregator
                .fetch_category(category, 0, self.settings.limit, cancel)
                .await?;
            for movie in listed {
                // A movie listed by several categories keeps its first one.
                if !seen.insert(movie.id) {
                    continue;
                }
                stage_movie(&batch, &movie, category);
                movies.push((category, movie));
            }
        }

        let lookups: Vec<_> = movies
            .iter()
            .map(|(category, movie)| self.movie_trailer(*category, movie.id, &batch, cancel))
            .collect();
        let per_movie: Vec<Vec<BrowseItem>> = stream::iter(lookups)
            .buffered(self.settings.strategy.max_in_flight())
        .try_collect()
        .await?;

        let result = Arc::new(BrowseResult::from_items(
            per_movie.into_iter().flatten().collect(),
        ));
        batch.stage(CacheKey::Aggregate, CacheValue::Listing(result.clone()));
        let writes = batch.commit();

        info!(
            movies = movies.len(),
            trailers = result.total_record_count,
            cache_writes = writes,
            "Trailer aggregate built"
        );
        Ok(result)
    }

    /// Trailer of one movie. With failure isolation a remote failure drops
    /// the movie instead of failing the aggregate.
    async fn movie_trailer(
        &self,
        category: Category,
        movie: MovieId,
        batch: &WriteBatch<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<BrowseItem>> {
        match self.lookup_trailer(category, movie, batch, cancel).await {
            Err(e) if self.settings.isolate_failures && !e.is_cancelled() => {
                warn!(
                    movie_id = %movie,
                    catalog = self.catalog.name(),
                    error = %e,
                    "Trailer lookup failed, skipping movie"
                );
                Ok(Vec::new())
            }
            result => result,
        }
    }

    async fn lookup_trailer(
        &self,
        category: Category,
        movie: MovieId,
        batch: &WriteBatch<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<BrowseItem>> {
        let videos = Arc::new(self.fetch_videos(movie, cancel).await?);
        batch.stage(CacheKey::Videos(movie), CacheValue::Videos(videos.clone()));
        self.items
            .build_items(
                movie,
                Some(category),
                &videos,
                BuildMode::TrailerOnly,
                batch,
                cancel,
            )
            .await
    }
}

/// Stage poster URL and trailer classification of `movie`, returning the
/// poster URL.
fn stage_movie(batch: &WriteBatch<'_>, movie: &MovieSummary, category: Category) -> Option<String> {
    let poster = poster_url(movie.poster_path.as_deref());
    batch.stage(CacheKey::Poster(movie.id), CacheValue::Poster(poster.clone()));
    batch.stage(
        CacheKey::TrailerType(movie.id),
        CacheValue::TrailerType(category.trailer_type()),
    );
    poster
}
