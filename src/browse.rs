//! Folder navigation and playback lookup consumed by the host.
//!
//! The extras channel is navigated by folder id:
//!
//! | folder id                  | listing                                   |
//! |----------------------------|-------------------------------------------|
//! | empty / absent             | the four category folders                 |
//! | category keyword           | one folder per movie of the category      |
//! | [`ALL_VIDEOS_FOLDER`]      | the trailer aggregate                     |
//! | movie id                   | every playable video of the movie         |
//! | anything else              | empty listing                             |
//!
//! Category and movie listings are cached per folder and remote page, so a
//! repeated request within the cache lifetime makes no remote call.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use trailerforge_common::{
    BrowseItem, BrowseResult, Category, ChannelInfo, MediaSource, MovieId, Result, VideoId,
};

use crate::aggregator::{page_for_index, PAGE_SIZE};
use crate::cache::{CacheKey, CacheValue, ResponseCache, WriteBatch};
use crate::config::ChannelsConfig;
use crate::items::{media_source, BuildMode};
use crate::orchestrator::CategoryOrchestrator;

/// Folder id of the trailer aggregate.
pub const ALL_VIDEOS_FOLDER: &str = "all";

/// Channels exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Flat list of one trailer per movie.
    Trailers,
    /// Category and movie folders with every video.
    Extras,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Trailers, Channel::Extras];

    pub fn id(self) -> &'static str {
        match self {
            Channel::Trailers => "trailers",
            Channel::Extras => "extras",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Channel::Trailers => "TMDb Trailers",
            Channel::Extras => "TMDb Extras",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.id().eq_ignore_ascii_case(id.trim()))
    }

    pub fn is_enabled(self, config: &ChannelsConfig) -> bool {
        match self {
            Channel::Trailers => config.trailers,
            Channel::Extras => config.extras,
        }
    }

    /// Descriptor with a fresh data version.
    pub fn info(self) -> ChannelInfo {
        ChannelInfo::movie_extras(self.id(), self.display_name(), Some(PAGE_SIZE as u32))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Where a folder id leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderRoute {
    Root,
    Category(Category),
    AllVideos,
    Movie(MovieId),
    Unknown,
}

impl FolderRoute {
    pub fn parse(folder_id: Option<&str>) -> Self {
        let id = folder_id.map(str::trim).unwrap_or_default();
        if id.is_empty() {
            return FolderRoute::Root;
        }
        if let Some(category) = Category::from_keyword(id) {
            return FolderRoute::Category(category);
        }
        if id.eq_ignore_ascii_case(ALL_VIDEOS_FOLDER) {
            return FolderRoute::AllVideos;
        }
        match id.parse::<MovieId>() {
            Ok(movie) => FolderRoute::Movie(movie),
            Err(_) => FolderRoute::Unknown,
        }
    }
}

/// A browse request from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseQuery {
    pub folder_id: Option<String>,
    /// Offset of the first requested item.
    pub start_index: usize,
    /// Requested page size. Advisory only: the remote page size is fixed.
    pub page_size_hint: Option<usize>,
}

impl BrowseQuery {
    pub fn folder(folder_id: impl Into<String>) -> Self {
        Self {
            folder_id: Some(folder_id.into()),
            ..Self::default()
        }
    }
}

/// The four category folders at the root of the extras channel.
pub fn root_listing() -> BrowseResult {
    BrowseResult::from_items(
        Category::ALL
            .into_iter()
            .map(BrowseItem::category_folder)
            .collect(),
    )
}

pub struct BrowseService {
    orchestrator: Arc<CategoryOrchestrator>,
    cache: Arc<ResponseCache>,
    channels: ChannelsConfig,
}

impl BrowseService {
    pub fn new(
        orchestrator: Arc<CategoryOrchestrator>,
        cache: Arc<ResponseCache>,
        channels: ChannelsConfig,
    ) -> Self {
        Self {
            orchestrator,
            cache,
            channels,
        }
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Descriptors of the enabled channels.
    pub fn channels(&self) -> Vec<ChannelInfo> {
        Channel::ALL
            .into_iter()
            .filter(|c| c.is_enabled(&self.channels))
            .map(Channel::info)
            .collect()
    }

    /// Resolve an enabled channel by id.
    pub fn channel(&self, id: &str) -> Option<Channel> {
        Channel::from_id(id).filter(|c| c.is_enabled(&self.channels))
    }

    /// Listing of the folder named by `query`.
    pub async fn get_items(
        &self,
        query: &BrowseQuery,
        cancel: &CancellationToken,
    ) -> Result<Arc<BrowseResult>> {
        let route = FolderRoute::parse(query.folder_id.as_deref());
        debug!(
            folder_id = ?query.folder_id,
            start_index = query.start_index,
            page_size_hint = ?query.page_size_hint,
            route = ?route,
            "Browse request"
        );

        let (key, page) = match route {
            FolderRoute::Root => return Ok(Arc::new(root_listing())),
            FolderRoute::AllVideos => return self.orchestrator.list_all(false, cancel).await,
            FolderRoute::Unknown => return Ok(Arc::new(BrowseResult::empty())),
            FolderRoute::Category(category) => {
                let page = page_for_index(query.start_index);
                (CacheKey::page(category.keyword(), page), page)
            }
            FolderRoute::Movie(movie) => (CacheKey::page(&movie.to_string(), 0), 0),
        };

        if let Some(cached) = self.cache.listing(&key) {
            debug!(key = %key, "Listing cache hit");
            return Ok(cached);
        }

        let batch = self.cache.batch();
        let result = match route {
            FolderRoute::Category(category) => {
                self.orchestrator
                    .list_category(category, page, &batch, cancel)
                    .await?
            }
            FolderRoute::Movie(movie) => self.movie_items(movie, &batch, cancel).await?,
            _ => BrowseResult::empty(),
        };

        let result = Arc::new(result);
        batch.stage(key, CacheValue::Listing(result.clone()));
        batch.commit();
        Ok(result)
    }

    /// Flat trailer listing of the trailers channel.
    pub async fn trailers(&self, cancel: &CancellationToken) -> Result<Arc<BrowseResult>> {
        self.orchestrator.list_all(false, cancel).await
    }

    /// Playable sources of a previously listed video.
    ///
    /// A video that was never listed, or no longer resolves, has no sources.
    pub async fn media_sources(
        &self,
        video_id: &VideoId,
        cancel: &CancellationToken,
    ) -> Result<Vec<MediaSource>> {
        let Some(video) = self.cache.video(video_id) else {
            debug!(video_id = %video_id, "Video not cached, no media sources");
            return Ok(Vec::new());
        };

        let resolution = self.orchestrator.items().resolve_playback(&video, cancel).await?;
        Ok(resolution
            .map(|r| vec![media_source(&video, &r)])
            .unwrap_or_default())
    }

    /// Purge expired cache entries and rebuild the trailer aggregate,
    /// returning its item count.
    pub async fn refresh(&self, cancel: &CancellationToken) -> Result<usize> {
        let purged = self.cache.cleanup_expired();
        debug!(purged, "Expired cache entries purged");
        let result = self.orchestrator.list_all(true, cancel).await?;
        Ok(result.total_record_count)
    }

    async fn movie_items(
        &self,
        movie: MovieId,
        batch: &WriteBatch<'_>,
        cancel: &CancellationToken,
    ) -> Result<BrowseResult> {
        let videos = match self.cache.videos(movie) {
            Some(videos) => videos,
            None => {
                debug!(movie_id = %movie, "Videos not cached, fetching");
                let videos = Arc::new(self.orchestrator.fetch_videos(movie, cancel).await?);
                batch.stage(CacheKey::Videos(movie), CacheValue::Videos(videos.clone()));
                videos
            }
        };

        let items = self
            .orchestrator
            .items()
            .build_items(movie, None, &videos, BuildMode::AllVideos, batch, cancel)
            .await?;
        Ok(BrowseResult::from_items(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LanguageContext;
    use crate::items::ItemBuilder;
    use crate::orchestrator::{LookupStrategy, OrchestratorSettings};
    use crate::testing::{movies, video, StubCatalog, StubResolver};
    use assert_matches::assert_matches;
    use trailerforge_common::{Error, ItemType};

    struct Fixture {
        browse: BrowseService,
        catalog: Arc<StubCatalog>,
        resolver: Arc<StubResolver>,
    }

    fn fixture(catalog: StubCatalog, resolver: StubResolver) -> Fixture {
        let catalog = Arc::new(catalog);
        let resolver = Arc::new(resolver);
        let cache = Arc::new(ResponseCache::default());
        let orchestrator = Arc::new(CategoryOrchestrator::new(
            catalog.clone(),
            LanguageContext::new("en-US", None),
            ItemBuilder::new(resolver.clone(), None),
            cache.clone(),
            OrchestratorSettings {
                categories: vec![Category::Upcoming],
                limit: 20,
                strategy: LookupStrategy::Sequential,
                isolate_failures: true,
            },
        ));
        let channels = ChannelsConfig {
            trailers: true,
            extras: true,
        };
        Fixture {
            browse: BrowseService::new(orchestrator, cache, channels),
            catalog,
            resolver,
        }
    }

    fn standard() -> Fixture {
        fixture(
            StubCatalog::new()
                .with_pages(Category::Upcoming, vec![movies(1, 20), movies(21, 5)])
                .with_videos(
                    3,
                    vec![video("a", "Trailer"), video("b", "Featurette"), video("c", "Clip")],
                ),
            StubResolver::new().with("key-a", &[900]).with("key-b", &[400]),
        )
    }

    #[test]
    fn folder_routes() {
        assert_eq!(FolderRoute::parse(None), FolderRoute::Root);
        assert_eq!(FolderRoute::parse(Some("  ")), FolderRoute::Root);
        assert_eq!(
            FolderRoute::parse(Some("nowplaying")),
            FolderRoute::Category(Category::NowPlaying)
        );
        assert_eq!(
            FolderRoute::parse(Some("Top-Rated")),
            FolderRoute::Category(Category::TopRated)
        );
        assert_eq!(FolderRoute::parse(Some("all")), FolderRoute::AllVideos);
        assert_eq!(
            FolderRoute::parse(Some("603")),
            FolderRoute::Movie(MovieId::new(603))
        );
        assert_eq!(FolderRoute::parse(Some("nope")), FolderRoute::Unknown);
    }

    #[test]
    fn channel_lookup_respects_switches() {
        assert_eq!(Channel::from_id("Extras"), Some(Channel::Extras));
        assert_eq!(Channel::from_id("intros"), None);
        let config = ChannelsConfig::default();
        assert!(Channel::Trailers.is_enabled(&config));
        assert!(!Channel::Extras.is_enabled(&config));
        assert_eq!(Channel::Extras.info().max_page_size, Some(20));
    }

    #[tokio::test]
    async fn root_lists_four_categories() {
        let f = standard();
        let result = f
            .browse
            .get_items(&BrowseQuery::default(), &CancellationToken::new())
            .await
            .unwrap();

        let names: Vec<_> = result.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Upcoming", "Now Playing", "Popular", "Top Rated"]);
        assert_eq!(result.total_record_count, 4);
        assert_eq!(f.catalog.page_calls(), 0);
    }

    #[tokio::test]
    async fn repeated_category_browse_hits_cache() {
        let f = standard();
        let cancel = CancellationToken::new();
        let query = BrowseQuery::folder("upcoming");

        let first = f.browse.get_items(&query, &cancel).await.unwrap();
        let calls = f.catalog.page_calls();
        let second = f.browse.get_items(&query, &cancel).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.total_record_count, 20);
        assert_eq!(f.catalog.page_calls(), calls);
    }

    #[tokio::test]
    async fn start_index_selects_remote_page() {
        let f = standard();
        let query = BrowseQuery {
            folder_id: Some("upcoming".into()),
            start_index: 20,
            page_size_hint: Some(20),
        };

        let result = f
            .browse
            .get_items(&query, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.items[0].id, "21");
        assert_eq!(result.total_record_count, 5);
    }

    #[tokio::test]
    async fn movie_folder_lists_every_playable_video() {
        let f = standard();
        let cancel = CancellationToken::new();

        let result = f
            .browse
            .get_items(&BrowseQuery::folder("3"), &cancel)
            .await
            .unwrap();

        let ids: Vec<_> = result.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert!(result.items.iter().all(|i| i.item_type == ItemType::Media));

        let resolves = f.resolver.calls();
        f.browse
            .get_items(&BrowseQuery::folder("3"), &cancel)
            .await
            .unwrap();
        assert_eq!(f.resolver.calls(), resolves);
        assert_eq!(f.catalog.video_calls(), 1);
    }

    #[tokio::test]
    async fn movie_folder_reuses_aggregated_videos() {
        let f = standard();
        let cancel = CancellationToken::new();
        f.browse.refresh(&cancel).await.unwrap();
        let video_calls = f.catalog.video_calls();

        let result = f
            .browse
            .get_items(&BrowseQuery::folder("3"), &cancel)
            .await
            .unwrap();

        assert_eq!(result.total_record_count, 2);
        assert_eq!(f.catalog.video_calls(), video_calls);
        assert_eq!(
            result.items[0].image_url.as_deref(),
            Some("https://image.tmdb.org/t/p/original/3.jpg")
        );
    }

    #[tokio::test]
    async fn unknown_folder_is_empty() {
        let f = standard();
        let result = f
            .browse
            .get_items(&BrowseQuery::folder("bogus"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(*result, BrowseResult::empty());
    }

    #[tokio::test]
    async fn all_folder_serves_aggregate() {
        let f = standard();
        let result = f
            .browse
            .get_items(&BrowseQuery::folder("all"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.total_record_count, 1);
        assert_eq!(result.items[0].id, "a");
    }

    #[tokio::test]
    async fn media_sources_resolve_listed_videos() {
        let f = standard();
        let cancel = CancellationToken::new();
        assert!(f
            .browse
            .media_sources(&VideoId::from("a"), &cancel)
            .await
            .unwrap()
            .is_empty());

        f.browse
            .get_items(&BrowseQuery::folder("3"), &cancel)
            .await
            .unwrap();
        let sources = f
            .browse
            .media_sources(&VideoId::from("a"), &cancel)
            .await
            .unwrap();

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].bitrate, 900);
        assert_eq!(sources[0].path, "https://stream.test/key-a/900");
    }

    #[tokio::test]
    async fn failed_browse_caches_nothing() {
        let f = fixture(
            StubCatalog::new().failing_videos(9),
            StubResolver::new(),
        );
        let result = f
            .browse
            .get_items(&BrowseQuery::folder("9"), &CancellationToken::new())
            .await;

        assert_matches!(result, Err(Error::Remote { .. }));
        assert!(f.browse.cache().is_empty());
    }
}
