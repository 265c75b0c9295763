//! Configuration settings for Spilliste.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub youtube: YoutubeSettings,
    pub transcripts: TranscriptSettings,
    pub summaries: SummarySettings,
    pub snippet: SnippetSettings,
    pub export: ExportSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// YouTube Data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// API key. The `YOUTUBE_API_KEY` environment variable or the
    /// `--api-key` flag take precedence.
    pub api_key: Option<String>,
    /// Preferred caption language code.
    pub language: String,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            language: "ko".to_string(),
        }
    }
}

/// Transcript fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Fetch captions during runs.
    pub enabled: bool,
    /// Directory for per-video transcript files.
    pub dir: String,
    /// Include transcript text in the CSV export.
    pub include_in_csv: bool,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: "transcripts".to_string(),
            include_in_csv: false,
        }
    }
}

/// Summary generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Generate summaries for videos with a transcript.
    pub enabled: bool,
    /// Directory for per-video summary files.
    pub dir: String,
    /// Chat model used for summarization.
    pub model: String,
    /// Target language for the summary text. None lets the model answer in
    /// English.
    pub language: Option<String>,
    /// Include summary text in the CSV export.
    pub include_in_csv: bool,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: "summaries".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            language: None,
            include_in_csv: false,
        }
    }
}

/// Description snippet extraction settings.
///
/// Disabled by default; when enabled, the CSV description column carries the
/// text between the two markers instead of the raw description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnippetSettings {
    pub enabled: bool,
    pub start_marker: String,
    pub end_marker: String,
}

impl Default for SnippetSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            start_marker: "영상 속 소식 모아보기".to_string(),
            end_marker: "목차".to_string(),
        }
    }
}

/// CSV export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory for CSV files produced by interactive runs.
    pub output_dir: String,
    /// Sort oldest first instead of newest first.
    pub sort_ascending: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            sort_ascending: false,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SpillisteError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("spilliste")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded transcript directory path.
    pub fn transcript_dir(&self) -> PathBuf {
        Self::expand_path(&self.transcripts.dir)
    }

    /// Get the expanded summary directory path.
    pub fn summary_dir(&self) -> PathBuf {
        Self::expand_path(&self.summaries.dir)
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.export.output_dir)
    }
}
