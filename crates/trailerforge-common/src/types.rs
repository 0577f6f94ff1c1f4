//! Core type definitions for browse categories and channel items.
//!
//! Enums are serialized in snake_case so the JSON surface reads the same as
//! the configuration file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote movie list a browse folder is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Movies about to be released.
    Upcoming,
    /// Movies currently in theaters.
    NowPlaying,
    /// Currently popular movies.
    Popular,
    /// Highest rated movies of all time.
    TopRated,
}

impl Category {
    /// Every category, in root folder order.
    pub const ALL: [Category; 4] = [
        Category::Upcoming,
        Category::NowPlaying,
        Category::Popular,
        Category::TopRated,
    ];

    /// Folder keyword used as the browse folder id.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::NowPlaying => "now-playing",
            Self::Popular => "popular",
            Self::TopRated => "top-rated",
        }
    }

    /// Human readable folder name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::NowPlaying => "Now Playing",
            Self::Popular => "Popular",
            Self::TopRated => "Top Rated",
        }
    }

    /// Resolve a folder keyword, ignoring case. The separator-less spellings
    /// (`nowplaying`, `toprated`) are accepted as aliases.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim().to_ascii_lowercase();
        match keyword.as_str() {
            "upcoming" => Some(Self::Upcoming),
            "now-playing" | "nowplaying" | "now_playing" => Some(Self::NowPlaying),
            "popular" => Some(Self::Popular),
            "top-rated" | "toprated" | "top_rated" => Some(Self::TopRated),
            _ => None,
        }
    }

    /// Trailer classification attached to movies listed in this category.
    pub fn trailer_type(self) -> TrailerType {
        match self {
            Self::Upcoming | Self::NowPlaying => TrailerType::ComingSoonToTheaters,
            Self::Popular | Self::TopRated => TrailerType::Archive,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Trailer classification reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailerType {
    /// Trailer for a movie that is upcoming or in theaters.
    ComingSoonToTheaters,
    /// Trailer for an already released movie.
    #[default]
    Archive,
}

/// Whether a browse item can be navigated into or played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// A navigable folder (category or movie).
    Folder,
    /// A playable video.
    Media,
}

/// Folder flavour for [`ItemType::Folder`] items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderType {
    /// Generic container of other items.
    Container,
}

/// Media kind of a channel or item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// Video content.
    Video,
}

/// Content classification reported by a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Extras attached to movies (trailers, featurettes, clips).
    MovieExtra,
}

/// Extra classification of a playable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraType {
    /// A movie trailer.
    Trailer,
}

/// Transport used to fetch a media source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaProtocol {
    /// Plain HTTP(S) download.
    Http,
}
