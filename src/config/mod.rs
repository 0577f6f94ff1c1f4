mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./trailerforge.toml",
        "./config.toml",
        "~/.config/trailerforge/config.toml",
        "/etc/trailerforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    let any_channel = config.channels.trailers || config.channels.extras;
    if any_channel && config.tmdb.api_key.trim().is_empty() {
        anyhow::bail!("A channel is enabled but no TMDB API key is configured");
    }

    if config.tmdb.requests_per_second == 0 {
        anyhow::bail!("TMDB requests_per_second must be greater than 0");
    }

    if let Some(region) = &config.tmdb.region {
        if region.chars().any(|c| c.is_ascii_lowercase()) {
            tracing::warn!("TMDB region should be uppercase: {:?}", region);
        }
    }

    if config.categories.limit == 0 {
        anyhow::bail!("Per-category limit must be greater than 0");
    }

    if config.refresh.concurrency == 0 {
        anyhow::bail!("Refresh concurrency must be greater than 0");
    }

    config.refresh.time_of_day().with_context(|| {
        format!(
            "Invalid refresh time_of_day {:?} (expected HH:MM)",
            config.refresh.time_of_day
        )
    })?;

    if config.resolver.base_url.is_none() {
        tracing::warn!("No stream resolver configured; videos will not be playable");
    }

    Ok(())
}
