//! CLI module for Spilliste.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Args, Parser, Subcommand};

/// Spilliste - YouTube playlist exporter
///
/// Exports playlist metadata, transcripts, and AI-generated summaries to CSV
/// and text files. The name comes from the Norwegian word for "playlist."
#[derive(Parser, Debug)]
#[command(name = "spilliste")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a playlist or single video and export the results
    Process {
        /// Playlist/video URL or bare ID
        input: String,

        #[command(flatten)]
        args: ProcessArgs,
    },

    /// Start the HTTP control API for interactive runs
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// YouTube Data API key
        #[arg(short = 'k', long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// OpenAI API key
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        openai_key: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for a batch processing run. Unset options fall back to the
/// configuration file.
#[derive(Args, Debug, Clone)]
pub struct ProcessArgs {
    /// YouTube Data API key
    #[arg(short = 'k', long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// OpenAI API key (used with --summaries)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_key: Option<String>,

    /// Output CSV path (default: playlist_videos_YYYYMMDD.csv)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Sort oldest first instead of newest first
    #[arg(long)]
    pub ascending: bool,

    /// Fetch captions for each video
    #[arg(short = 't', long)]
    pub transcripts: bool,

    /// Directory for transcript files
    #[arg(long)]
    pub transcript_dir: Option<String>,

    /// Preferred caption language code
    #[arg(short, long)]
    pub language: Option<String>,

    /// Include transcript text in the CSV
    #[arg(long)]
    pub csv_transcripts: bool,

    /// Generate AI summaries (implies --transcripts)
    #[arg(short = 's', long)]
    pub summaries: bool,

    /// Directory for summary files
    #[arg(long)]
    pub summary_dir: Option<String>,

    /// Chat model for summaries
    #[arg(short, long)]
    pub model: Option<String>,

    /// Target language for the summary text
    #[arg(long)]
    pub summary_language: Option<String>,

    /// Include summary text in the CSV
    #[arg(long)]
    pub csv_summaries: bool,

    /// Replace the description column with the text between the snippet
    /// markers
    #[arg(long)]
    pub snippet: bool,

    /// Snippet start marker (overrides config)
    #[arg(long)]
    pub snippet_start: Option<String>,

    /// Snippet end marker (overrides config)
    #[arg(long)]
    pub snippet_end: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "youtube.language")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
