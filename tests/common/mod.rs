//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires the full service graph over a
//! [`StubCatalog`] and [`StubResolver`]. The [`TestHarness::with_server`]
//! constructor starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use trailerforge::catalog::{CatalogClient, LanguageContext, MoviePage, MovieVideos};
use trailerforge::config::Config;
use trailerforge::resolver::{Encoding, StreamResolver};
use trailerforge::server::{create_router, AppContext};
use trailerforge::services::Services;
use trailerforge_common::{Category, Error, MovieId, MovieSummary, Result, VideoId, VideoItem};

pub fn movie(id: u64) -> MovieSummary {
    MovieSummary {
        id: MovieId::new(id),
        title: format!("Movie {id}"),
        poster_path: Some(format!("/poster{id}.jpg")),
    }
}

pub fn video(id: &str, video_type: &str) -> VideoItem {
    VideoItem {
        id: VideoId::from(id),
        name: format!("{video_type} {id}"),
        site: "YouTube".into(),
        key: format!("yt-{id}"),
        video_type: video_type.into(),
    }
}

/// In-memory catalog with call counters.
#[derive(Default)]
pub struct StubCatalog {
    pub pages: HashMap<Category, Vec<Vec<MovieSummary>>>,
    pub videos: HashMap<MovieId, Vec<VideoItem>>,
    pub failing_pages: HashSet<Category>,
    pub page_calls: AtomicUsize,
    pub video_calls: AtomicUsize,
}

impl StubCatalog {
    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn video_calls(&self) -> usize {
        self.video_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogClient for StubCatalog {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn list_by_category(
        &self,
        category: Category,
        _context: &LanguageContext,
        page: u32,
    ) -> Result<MoviePage> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_pages.contains(&category) {
            return Err(Error::remote("stub", "503 Service Unavailable"));
        }
        let results = self
            .pages
            .get(&category)
            .and_then(|pages| pages.get(page as usize))
            .cloned()
            .unwrap_or_default();
        Ok(MoviePage {
            total_results: results.len() as u64,
            results,
        })
    }

    async fn list_videos(&self, movie: MovieId) -> Result<MovieVideos> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        Ok(MovieVideos {
            id: movie,
            results: self.videos.get(&movie).cloned().unwrap_or_default(),
        })
    }
}

/// Resolves every key listed in `bitrates`; other keys are unplayable.
#[derive(Default)]
pub struct StubResolver {
    pub bitrates: HashMap<String, Vec<u32>>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl StreamResolver for StubResolver {
    async fn resolve(&self, _site: &str, key: &str) -> Result<Option<Vec<Encoding>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bitrates.get(key).map(|bitrates| {
            bitrates
                .iter()
                .map(|b| Encoding {
                    bitrate: *b,
                    url: format!("https://cdn.test/{key}/{b}.mp4"),
                })
                .collect()
        }))
    }
}

/// Upcoming lists movies 1 and 2, popular lists movie 3.
/// Movie 1 has a featurette and a trailer, movie 2 only an unplayable
/// trailer, movie 3 a single trailer.
pub fn sample_catalog() -> (StubCatalog, StubResolver) {
    let mut catalog = StubCatalog::default();
    catalog
        .pages
        .insert(Category::Upcoming, vec![vec![movie(1), movie(2)]]);
    catalog.pages.insert(Category::Popular, vec![vec![movie(3)]]);
    catalog.videos.insert(
        MovieId::new(1),
        vec![video("feat1", "Featurette"), video("trl1", "Trailer")],
    );
    catalog
        .videos
        .insert(MovieId::new(2), vec![video("trl2", "Trailer")]);
    catalog
        .videos
        .insert(MovieId::new(3), vec![video("trl3", "Trailer")]);

    let mut resolver = StubResolver::default();
    resolver.bitrates.insert("yt-feat1".into(), vec![128_000, 480_000]);
    resolver.bitrates.insert("yt-trl1".into(), vec![96_000, 1_200_000]);
    resolver.bitrates.insert("yt-trl3".into(), vec![256_000]);

    (catalog, resolver)
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.tmdb.api_key = "test-key".into();
    config.channels.extras = true;
    config.categories.popular = true;
    config.refresh.on_startup = false;
    config
}

/// Test harness wrapping the full service graph over stub backends.
pub struct TestHarness {
    pub services: Services,
    pub catalog: Arc<StubCatalog>,
    pub resolver: Arc<StubResolver>,
}

impl TestHarness {
    /// Create a harness over [`sample_catalog`] with [`test_config`].
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let (catalog, resolver) = sample_catalog();
        Self::with_backends(config, catalog, resolver)
    }

    pub fn with_backends(config: Config, catalog: StubCatalog, resolver: StubResolver) -> Self {
        let catalog = Arc::new(catalog);
        let resolver = Arc::new(resolver);
        let services = Services::with_backends(config, catalog.clone(), resolver.clone());
        Self {
            services,
            catalog,
            resolver,
        }
    }

    pub fn context(&self) -> AppContext {
        AppContext::new(self.services.clone(), CancellationToken::new())
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::new().serve().await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        Self::with_config(config).serve().await
    }

    pub async fn serve(self) -> (Self, SocketAddr) {
        let app = create_router(self.context());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (self, addr)
    }
}
