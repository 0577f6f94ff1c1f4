//! TMDB (The Movie Database) catalog client.
//!
//! Implements [`CatalogClient`] on top of the TMDB v3 REST API:
//!
//! - `GET /movie/{upcoming,now_playing,popular,top_rated}` for category pages
//! - `GET /movie/{id}/videos` for a movie's videos
//!
//! Requests are throttled with a [`governor`] token bucket. There is no retry:
//! a non-success status becomes [`Error::Remote`] and an undecodable body
//! becomes [`Error::Malformed`].

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error};
use trailerforge_common::{Category, Error, MovieId, MovieSummary, Result, VideoId, VideoItem};

use super::{CatalogClient, LanguageContext, MoviePage, MovieVideos};
use crate::config::TmdbConfig;

const SERVICE: &str = "tmdb";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbListResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
    #[serde(default)]
    total_results: u64,
}

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbVideosResponse {
    id: u64,
    #[serde(default)]
    results: Vec<TmdbVideo>,
}

#[derive(Debug, Deserialize)]
struct TmdbVideo {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    site: String,
    #[serde(default)]
    key: String,
    #[serde(rename = "type", default)]
    video_type: String,
}

impl From<TmdbMovie> for MovieSummary {
    fn from(movie: TmdbMovie) -> Self {
        MovieSummary {
            id: MovieId::new(movie.id),
            title: movie.title.unwrap_or_default(),
            poster_path: movie.poster_path,
        }
    }
}

impl From<TmdbVideo> for VideoItem {
    fn from(video: TmdbVideo) -> Self {
        VideoItem {
            id: VideoId::new(video.id),
            name: video.name,
            site: video.site,
            key: video.key,
            video_type: video.video_type,
        }
    }
}

/// API path of a category listing.
fn category_path(category: Category) -> &'static str {
    match category {
        Category::Upcoming => "/movie/upcoming",
        Category::NowPlaying => "/movie/now_playing",
        Category::Popular => "/movie/popular",
        Category::TopRated => "/movie/top_rated",
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// TMDB-backed [`CatalogClient`].
pub struct TmdbCatalog {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbCatalog {
    /// Build a client from the `[tmdb]` configuration section.
    pub fn new(config: &TmdbConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build TMDB client: {e}")))?;

        let per_second = NonZeroU32::new(config.requests_per_second).ok_or_else(|| {
            Error::Validation("TMDB requests_per_second must be greater than 0".into())
        })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, extra_params: &[(&str, &str)]) -> Result<T> {
        self.limiter.until_ready().await;

        let url = format!("{}{path}", self.base_url);
        let mut params: Vec<(&str, &str)> = vec![("api_key", &self.api_key)];
        params.extend_from_slice(extra_params);

        debug!(url = %url, "TMDB request");

        let resp = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::remote(SERVICE, format!("request to {path} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::remote(SERVICE, format!("{path} returned {status}: {body}")));
        }

        resp.json::<T>()
            .await
            .map_err(|e| Error::malformed(SERVICE, format!("{path}: {e}")))
    }
}

#[async_trait]
impl CatalogClient for TmdbCatalog {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn list_by_category(
        &self,
        category: Category,
        context: &LanguageContext,
        page: u32,
    ) -> Result<MoviePage> {
        // TMDB pages are one-based.
        let page_param = page.saturating_add(1).to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("language", &context.language),
            ("page", &page_param),
        ];
        if let Some(region) = context.region.as_deref() {
            params.push(("region", region));
        }

        let response: TmdbListResponse = self
            .get(category_path(category), &params)
            .await
            .inspect_err(|e| error!(category = %category, page, error = %e, "Category listing failed"))?;

        debug!(
            category = %category,
            page,
            count = response.results.len(),
            total = response.total_results,
            "Fetched category page"
        );

        Ok(MoviePage {
            results: response.results.into_iter().map(Into::into).collect(),
            total_results: response.total_results,
        })
    }

    async fn list_videos(&self, movie: MovieId) -> Result<MovieVideos> {
        let response: TmdbVideosResponse = self
            .get(&format!("/movie/{movie}/videos"), &[])
            .await
            .inspect_err(|e| error!(movie_id = %movie, error = %e, "Video listing failed"))?;

        debug!(movie_id = %movie, count = response.results.len(), "Fetched movie videos");

        Ok(MovieVideos {
            id: MovieId::new(response.id),
            results: response.results.into_iter().map(Into::into).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_paths() {
        assert_eq!(category_path(Category::Upcoming), "/movie/upcoming");
        assert_eq!(category_path(Category::NowPlaying), "/movie/now_playing");
        assert_eq!(category_path(Category::Popular), "/movie/popular");
        assert_eq!(category_path(Category::TopRated), "/movie/top_rated");
    }

    #[test]
    fn list_response_tolerates_missing_fields() {
        let json = r#"{"page":3,"results":[{"id":7,"title":"Seven","adult":false},{"id":8,"poster_path":"/p.jpg"}]}"#;
        let parsed: TmdbListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.total_results, 0);

        let movies: Vec<MovieSummary> = parsed.results.into_iter().map(Into::into).collect();
        assert_eq!(movies[0].title, "Seven");
        assert_eq!(movies[0].poster_path, None);
        assert_eq!(movies[1].id, MovieId::new(8));
        assert_eq!(movies[1].poster_path.as_deref(), Some("/p.jpg"));
    }

    #[test]
    fn zero_rate_is_rejected() {
        let config = TmdbConfig {
            requests_per_second: 0,
            ..TmdbConfig::default()
        };
        assert!(matches!(TmdbCatalog::new(&config), Err(Error::Validation(_))));
    }
}
