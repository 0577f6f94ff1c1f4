//! Remote movie catalog.
//!
//! This module defines the [`CatalogClient`] trait through which the
//! aggregator and orchestrator reach the remote catalog, together with the
//! page and video-list shapes it returns. The production implementation is
//! [`tmdb::TmdbCatalog`].

pub mod tmdb;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trailerforge_common::{Category, MovieId, MovieSummary, Result, VideoItem};

pub use tmdb::TmdbCatalog;

/// Base URL of full-size poster images.
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/original";

/// Number of movies the remote catalog returns per page.
pub const REMOTE_PAGE_SIZE: usize = 20;

/// Language and release region sent with every listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageContext {
    /// Language tag such as `en-US`.
    pub language: String,
    /// Uppercase ISO 3166-1 region such as `US`.
    pub region: Option<String>,
}

impl LanguageContext {
    pub fn new(language: impl Into<String>, region: Option<String>) -> Self {
        Self {
            language: language.into(),
            region,
        }
    }
}

/// One page of a category listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoviePage {
    /// Movies in response order. Empty once the listing is exhausted.
    pub results: Vec<MovieSummary>,
    /// Total number of movies the remote listing reports.
    pub total_results: u64,
}

/// Videos attached to one movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieVideos {
    pub id: MovieId,
    pub results: Vec<VideoItem>,
}

/// Async access to the remote movie catalog.
///
/// Implementations perform exactly one remote call per method invocation and
/// never retry; failures surface as [`Error::Remote`] or
/// [`Error::Malformed`].
///
/// [`Error::Remote`]: trailerforge_common::Error::Remote
/// [`Error::Malformed`]: trailerforge_common::Error::Malformed
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Short, lowercase identifier for this catalog (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Fetch one page of `category`. `page` is zero-based.
    async fn list_by_category(
        &self,
        category: Category,
        context: &LanguageContext,
        page: u32,
    ) -> Result<MoviePage>;

    /// Fetch every video attached to `movie`, in catalog order.
    async fn list_videos(&self, movie: MovieId) -> Result<MovieVideos>;
}

/// Full poster URL for a catalog poster path.
///
/// Returns `None` for a missing or blank path.
pub fn poster_url(poster_path: Option<&str>) -> Option<String> {
    let path = poster_path?.trim().trim_start_matches('/');
    if path.is_empty() {
        return None;
    }
    Some(format!("{POSTER_BASE_URL}/{path}"))
}
