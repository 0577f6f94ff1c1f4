//! Stub catalog and resolver shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use trailerforge_common::{Category, Error, MovieId, MovieSummary, Result, VideoId, VideoItem};

use crate::catalog::{CatalogClient, LanguageContext, MoviePage, MovieVideos};
use crate::resolver::{Encoding, StreamResolver};

pub fn movie(id: u64) -> MovieSummary {
    MovieSummary {
        id: MovieId::new(id),
        title: format!("Movie {id}"),
        poster_path: Some(format!("/{id}.jpg")),
    }
}

/// Movies `first..first + count`.
pub fn movies(first: u64, count: u64) -> Vec<MovieSummary> {
    (first..first + count).map(movie).collect()
}

pub fn video(id: &str, video_type: &str) -> VideoItem {
    VideoItem {
        id: VideoId::from(id),
        name: format!("{video_type} {id}"),
        site: "YouTube".into(),
        key: format!("key-{id}"),
        video_type: video_type.into(),
    }
}

#[derive(Default)]
pub struct StubCatalog {
    pages: HashMap<Category, Vec<Vec<MovieSummary>>>,
    videos: HashMap<MovieId, Vec<VideoItem>>,
    failing: HashSet<MovieId>,
    delays: HashMap<MovieId, Duration>,
    pub page_calls: AtomicUsize,
    pub video_calls: AtomicUsize,
    pub requested_pages: parking_lot::Mutex<Vec<(Category, u32)>>,
}

impl StubCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `pages` for `category`; pages past the end are empty.
    pub fn with_pages(mut self, category: Category, pages: Vec<Vec<MovieSummary>>) -> Self {
        self.pages.insert(category, pages);
        self
    }

    pub fn with_videos(mut self, movie: u64, videos: Vec<VideoItem>) -> Self {
        self.videos.insert(MovieId::new(movie), videos);
        self
    }

    pub fn failing_videos(mut self, movie: u64) -> Self {
        self.failing.insert(MovieId::new(movie));
        self
    }

    pub fn delayed_videos(mut self, movie: u64, delay: Duration) -> Self {
        self.delays.insert(MovieId::new(movie), delay);
        self
    }

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
        self.requested_pages.lock().push((category, page));
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
        if let Some(delay) = self.delays.get(&movie) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&movie) {
            return Err(Error::remote("stub", format!("videos of {movie} unavailable")));
        }
        Ok(MovieVideos {
            id: movie,
            results: self.videos.get(&movie).cloned().unwrap_or_default(),
        })
    }
}

/// Resolves keys to fixed encodings; unknown keys are unplayable.
#[derive(Default)]
pub struct StubResolver {
    encodings: HashMap<String, Vec<Encoding>>,
    failing: HashSet<String>,
    pub calls: AtomicUsize,
}

impl StubResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, bitrates: &[u32]) -> Self {
        let encodings = bitrates
            .iter()
            .map(|b| Encoding {
                bitrate: *b,
                url: format!("https://stream.test/{key}/{b}"),
            })
            .collect();
        self.encodings.insert(key.to_string(), encodings);
        self
    }

    pub fn failing(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamResolver for StubResolver {
    async fn resolve(&self, _site: &str, key: &str) -> Result<Option<Vec<Encoding>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(key) {
            return Err(Error::remote("stub", format!("resolver down for {key}")));
        }
        Ok(self.encodings.get(key).cloned())
    }
}
