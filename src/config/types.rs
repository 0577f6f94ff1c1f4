use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use trailerforge_common::Category;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub channels: ChannelsConfig,

    #[serde(default)]
    pub categories: CategoriesConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8096
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// API key used to authenticate with TMDB
    #[serde(default)]
    pub api_key: String,

    /// ISO 639-1 language tag for translated fields (e.g. "en-US")
    #[serde(default = "default_language")]
    pub language: String,

    /// ISO 3166-1 region used to filter release dates. Must be uppercase.
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_language() -> String {
    "en-US".to_string()
}
fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}
fn default_requests_per_second() -> u32 {
    20
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_language(),
            region: None,
            base_url: default_tmdb_base_url(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Base URL of the stream extraction service. Without it no video resolves.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Encodings at or above this bitrate are never selected (unbounded if unset)
    #[serde(default)]
    pub max_bitrate: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelsConfig {
    /// Flat trailer channel: one trailer per movie across enabled categories
    #[serde(default = "default_true")]
    pub trailers: bool,

    /// Folder channel: categories -> movies -> every video
    #[serde(default)]
    pub extras: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            trailers: true,
            extras: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoriesConfig {
    #[serde(default = "default_true")]
    pub upcoming: bool,

    #[serde(default = "default_true")]
    pub now_playing: bool,

    #[serde(default)]
    pub popular: bool,

    #[serde(default)]
    pub top_rated: bool,

    /// Maximum number of movies listed per category
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            upcoming: true,
            now_playing: true,
            popular: false,
            top_rated: false,
            limit: default_limit(),
        }
    }
}

impl CategoriesConfig {
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Upcoming => self.upcoming,
            Category::NowPlaying => self.now_playing,
            Category::Popular => self.popular,
            Category::TopRated => self.top_rated,
        }
    }

    /// Enabled categories in root folder order.
    pub fn enabled(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.is_enabled(*c))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Lifetime of cached listings, posters and video records
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    24 * 60 * 60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    /// Run a forced refresh as soon as the server starts
    #[serde(default = "default_true")]
    pub on_startup: bool,

    /// Local time of day ("HH:MM") of the daily forced refresh
    #[serde(default = "default_time_of_day")]
    pub time_of_day: String,

    /// Maximum number of concurrent per-movie lookups (1 = sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Skip movies whose video lookup or stream resolution fails instead of failing the whole refresh
    #[serde(default = "default_true")]
    pub isolate_failures: bool,
}

fn default_time_of_day() -> String {
    "04:00".to_string()
}
fn default_concurrency() -> usize {
    8
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            on_startup: true,
            time_of_day: default_time_of_day(),
            concurrency: default_concurrency(),
            isolate_failures: true,
        }
    }
}

impl RefreshConfig {
    /// Parse [`time_of_day`](Self::time_of_day) as `HH:MM` or `HH:MM:SS`.
    pub fn time_of_day(&self) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(&self.time_of_day, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&self.time_of_day, "%H:%M:%S"))
    }
}
