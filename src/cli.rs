use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trailerforge")]
#[command(author, version, about = "TMDB trailer channel server")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the channel server and the daily refresh
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Rebuild the trailer listing once and print its size
    Refresh,

    /// List a folder of the extras channel
    Browse {
        /// Folder to list: category keyword, "all" or a movie id (root if omitted)
        folder_id: Option<String>,

        /// Offset of the first item
        #[arg(long, default_value_t = 0)]
        start_index: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve playback sources of a video listed in the same run
    Playback {
        /// Video id
        video_id: String,

        /// Movie folder to list first so the video is known
        #[arg(long)]
        movie: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
