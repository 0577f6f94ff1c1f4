//! Catalog records and the host-facing browse representation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{MovieId, VideoId};
use crate::types::{
    Category, ContentType, ExtraType, FolderType, ItemType, MediaProtocol, MediaType, TrailerType,
};

/// Provider id key linking a trailer back to its movie.
pub const TMDB_PROVIDER_KEY: &str = "Tmdb";

// ---------------------------------------------------------------------------
// Catalog records
// ---------------------------------------------------------------------------

/// One movie from a remote category listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Remote catalog id.
    pub id: MovieId,
    /// Localised title.
    pub title: String,
    /// Poster path fragment as returned by the catalog (e.g. `/abc.jpg`).
    pub poster_path: Option<String>,
}

/// A video attached to a movie (trailer, teaser, featurette, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoItem {
    /// Remote catalog id of the video.
    pub id: VideoId,
    /// Display name.
    pub name: String,
    /// Hosting site (e.g. `YouTube`, `Vimeo`).
    pub site: String,
    /// Key of the video on the hosting site.
    pub key: String,
    /// Declared type, e.g. `Trailer` or `Featurette`.
    #[serde(rename = "type")]
    pub video_type: String,
}

impl VideoItem {
    /// `true` when the declared type is `trailer`, ignoring case.
    pub fn is_trailer(&self) -> bool {
        self.video_type.eq_ignore_ascii_case("trailer")
    }
}

// ---------------------------------------------------------------------------
// Browse representation
// ---------------------------------------------------------------------------

/// A playable stream of a media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    /// Id of the video this source plays.
    pub id: String,
    /// Display name of the video.
    pub name: String,
    /// Direct stream URL.
    pub path: String,
    /// Bitrate of the selected encoding.
    pub bitrate: u32,
    /// Transport used for `path`.
    pub protocol: MediaProtocol,
    /// Always `true`: streams are served by the hosting site.
    pub is_remote: bool,
}

/// A single entry of a browse listing: a folder or a playable video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseItem {
    /// Folder id to navigate into, or the video id for media items.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Folder or media.
    pub item_type: ItemType,
    /// Media kind; always video.
    pub media_type: MediaType,
    /// Folder flavour, set for folders only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_type: Option<FolderType>,
    /// Original title, set for media items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    /// Poster image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Extra classification (trailer channel only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_type: Option<ExtraType>,
    /// Trailer classifications (trailer channel only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trailer_types: Vec<TrailerType>,
    /// External ids keyed by provider name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub provider_ids: BTreeMap<String, String>,
    /// Resolved streams, in preference order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media_sources: Vec<MediaSource>,
}

impl BrowseItem {
    /// A navigable container folder.
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            item_type: ItemType::Folder,
            media_type: MediaType::Video,
            folder_type: Some(FolderType::Container),
            original_title: None,
            image_url: None,
            extra_type: None,
            trailer_types: Vec::new(),
            provider_ids: BTreeMap::new(),
            media_sources: Vec::new(),
        }
    }

    /// Root folder of a category.
    pub fn category_folder(category: Category) -> Self {
        Self::folder(category.keyword(), category.display_name())
    }

    /// Folder of a single movie, navigable into its videos.
    pub fn movie_folder(movie: &MovieSummary, poster_url: Option<String>) -> Self {
        let mut item = Self::folder(movie.id.to_string(), movie.title.clone());
        item.image_url = poster_url;
        item
    }

    /// A playable video item without any stream attached yet.
    pub fn media(video: &VideoItem) -> Self {
        Self {
            id: video.id.to_string(),
            name: video.name.clone(),
            item_type: ItemType::Media,
            media_type: MediaType::Video,
            folder_type: None,
            original_title: Some(video.name.clone()),
            image_url: None,
            extra_type: None,
            trailer_types: Vec::new(),
            provider_ids: BTreeMap::new(),
            media_sources: Vec::new(),
        }
    }

    /// `true` for folder items.
    pub fn is_folder(&self) -> bool {
        self.item_type == ItemType::Folder
    }
}

/// One page of a browse listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseResult {
    /// Items in display order.
    pub items: Vec<BrowseItem>,
    /// Number of items the listing holds.
    pub total_record_count: usize,
}

impl BrowseResult {
    /// Wrap a list of items, counting them.
    pub fn from_items(items: Vec<BrowseItem>) -> Self {
        let total_record_count = items.len();
        Self {
            items,
            total_record_count,
        }
    }

    /// An empty listing.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Capabilities a channel advertises to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Stable channel id used in routes.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Content classifications.
    pub content_types: Vec<ContentType>,
    /// Media kinds served.
    pub media_types: Vec<MediaType>,
    /// Largest page the channel returns per request, if bounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_page_size: Option<u32>,
    /// Random per-call version so the host never treats a listing as final.
    pub data_version: String,
}

impl ChannelInfo {
    /// Describe a movie extras channel.
    pub fn movie_extras(
        id: impl Into<String>,
        name: impl Into<String>,
        max_page_size: Option<u32>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: "Watch movie trailers and extras.".to_string(),
            content_types: vec![ContentType::MovieExtra],
            media_types: vec![MediaType::Video],
            max_page_size,
            data_version: Uuid::new_v4().simple().to_string(),
        }
    }
}
