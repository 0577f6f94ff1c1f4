//! Trailerforge - TMDB trailer aggregation and caching
//!
//! This library crate exposes the browse pipeline for the binary and for
//! integration testing.

pub mod aggregator;
pub mod browse;
pub mod cache;
pub mod cancel;
pub mod catalog;
pub mod config;
pub mod items;
pub mod orchestrator;
pub mod refresh;
pub mod resolver;
pub mod server;
pub mod services;

#[cfg(test)]
mod testing;
