//! Trailerforge-Common: Shared types, identifiers, and errors.
//!
//! This crate provides the vocabulary shared by every part of trailerforge:
//!
//! - **Typed IDs**: [`MovieId`] and [`VideoId`] wrappers so catalog identifiers
//!   cannot be confused with one another.
//! - **Core Types**: Browse categories, trailer classifications and the enums
//!   describing channel items.
//! - **Models**: Catalog records ([`MovieSummary`], [`VideoItem`]) and the
//!   host-facing browse representation ([`BrowseItem`], [`BrowseResult`]).
//! - **Error Handling**: The unified [`Error`] type and [`Result`] alias.
//!
//! # Examples
//!
//! ```
//! use trailerforge_common::{Category, MovieId, TrailerType};
//!
//! let category = Category::from_keyword("Now-Playing").unwrap();
//! assert_eq!(category, Category::NowPlaying);
//! assert_eq!(category.trailer_type(), TrailerType::ComingSoonToTheaters);
//!
//! let id: MovieId = "550".parse().unwrap();
//! assert_eq!(id.get(), 550);
//! ```

pub mod error;
pub mod ids;
pub mod models;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use models::*;
pub use types::*;
