mod cli;

use trailerforge::{
    browse::BrowseQuery,
    config, server,
    services::Services,
};
use trailerforge_common::{BrowseResult, VideoId};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use tokio_util::sync::CancellationToken;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting Trailerforge server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let services = Services::from_config(config).context("Failed to initialise services")?;
    server::start_server(services).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "trailerforge=trace,tower_http=debug".to_string()
        } else {
            "trailerforge=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, config_path))
        }
        Commands::Refresh => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(refresh(config_path))
        }
        Commands::Browse {
            folder_id,
            start_index,
            json,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(browse(config_path, folder_id, start_index, json))
        }
        Commands::Playback { video_id, movie } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(playback(config_path, video_id, movie))
        }
        Commands::Validate {
            config: validate_path,
        } => validate_config(validate_path.as_deref().or(config_path)),
        Commands::Version => {
            println!("trailerforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn services(config_path: Option<&Path>) -> Result<Services> {
    let config = config::load_config_or_default(config_path)?;
    config::validate_config(&config)?;
    Services::from_config(config).context("Failed to initialise services")
}

async fn refresh(config_path: Option<&Path>) -> Result<()> {
    let services = services(config_path)?;
    let count = services.browse.refresh(&CancellationToken::new()).await?;
    println!("Refreshed {} trailers", count);
    Ok(())
}

async fn browse(
    config_path: Option<&Path>,
    folder_id: Option<String>,
    start_index: usize,
    json: bool,
) -> Result<()> {
    let services = services(config_path)?;
    let query = BrowseQuery {
        folder_id,
        start_index,
        page_size_hint: None,
    };
    let result = services
        .browse
        .get_items(&query, &CancellationToken::new())
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(result.as_ref())?);
    } else {
        print_listing(&result);
    }
    Ok(())
}

fn print_listing(result: &BrowseResult) {
    println!("{} items", result.total_record_count);
    for item in &result.items {
        if item.is_folder() {
            println!("  [{}] {}/", item.id, item.name);
            continue;
        }
        print!("  [{}] {}", item.id, item.name);
        if let Some(source) = item.media_sources.first() {
            print!(" ({} kbps)", source.bitrate / 1000);
        }
        println!();
    }
}

async fn playback(config_path: Option<&Path>, video_id: String, movie: Option<String>) -> Result<()> {
    let services = services(config_path)?;
    let cancel = CancellationToken::new();

    if let Some(movie) = movie {
        services
            .browse
            .get_items(&BrowseQuery::folder(movie), &cancel)
            .await?;
    }

    let sources = services
        .browse
        .media_sources(&VideoId::new(video_id.clone()), &cancel)
        .await?;

    if sources.is_empty() {
        println!("No playable source for video {}", video_id);
    }
    for source in sources {
        println!("{} {} bps", source.path, source.bitrate);
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!(
                "  Channels: trailers={} extras={}",
                config.channels.trailers, config.channels.extras
            );
            println!("  Categories: {:?}", config.categories.enabled());
            println!("  Limit per category: {}", config.categories.limit);
            println!(
                "  Max bitrate: {}",
                config
                    .resolver
                    .max_bitrate
                    .map_or_else(|| "unbounded".to_string(), |b| b.to_string())
            );
            println!("  Daily refresh at: {}", config.refresh.time_of_day);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
