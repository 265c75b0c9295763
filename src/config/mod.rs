//! Configuration module for Spilliste.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    ExportSettings, GeneralSettings, Settings, SnippetSettings, SummarySettings,
    TranscriptSettings, YoutubeSettings,
};
