//! Spilliste - YouTube Playlist Exporter
//!
//! A CLI tool that exports YouTube playlist metadata, video transcripts, and
//! AI-generated summaries to CSV and text files.
//!
//! The name "Spilliste" comes from the Norwegian word for "playlist."
//!
//! # Overview
//!
//! Spilliste allows you to:
//! - Fetch all videos of a playlist (or a single video) via the YouTube Data API
//! - Download captions with a configurable language and English fallback
//! - Summarize transcripts with an OpenAI chat model
//! - Export everything to a BOM-prefixed, spreadsheet-friendly CSV
//! - Drive runs interactively (pause/resume/stop/navigate) over a small HTTP API
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `youtube` - Playlist/video metadata and caption clients
//! - `snippet` - Marker-based description snippet extraction
//! - `summary` - Transcript summarization
//! - `persist` - Text files and CSV export
//! - `control` - Run control flags and the interactive process manager
//! - `pipeline` - Per-video processing loop
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use spilliste::control::RunControl;
//! use spilliste::pipeline::{NullObserver, Pipeline, RunOptions};
//! use spilliste::youtube::{CaptionClient, PlaylistClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new(
//!         Arc::new(PlaylistClient::new("api-key")),
//!         Arc::new(CaptionClient::new()),
//!         None,
//!     );
//!
//!     let report = pipeline
//!         .run(
//!             "https://www.youtube.com/playlist?list=PLxxxxxxxxxxx",
//!             &RunOptions::default(),
//!             &RunControl::new(),
//!             &NullObserver,
//!         )
//!         .await?;
//!     println!("Processed {} videos", report.videos.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod control;
pub mod error;
pub mod openai;
pub mod persist;
pub mod pipeline;
pub mod snippet;
pub mod summary;
pub mod youtube;

pub use error::{Result, SpillisteError};
