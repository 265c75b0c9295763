//! Caption retrieval with single-language fallback.
//!
//! Captions come from the timedtext endpoint as timed fragments. Videos with
//! captions disabled or without a track in the requested language are an
//! expected absence, not an error.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::error::{Result, SpillisteError};

/// Language tried when the preferred language has no captions.
pub const FALLBACK_LANGUAGE: &str = "en";

const DEFAULT_BASE_URL: &str = "https://www.youtube.com/api/timedtext";

/// A single timed caption fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionFragment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Trait for caption providers.
///
/// `Ok(None)` means captions are disabled or not available in the requested
/// language; errors are reserved for unexpected failures.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn fetch_captions(&self, video_id: &str, language: &str) -> Result<Option<String>>;
}

/// Fetch captions with the single-language fallback.
///
/// If the preferred language is unavailable and is not already the fallback,
/// English is tried once. Unexpected errors are logged and flattened to
/// absence so one bad video never aborts the run.
pub async fn fetch_with_fallback(
    source: &dyn CaptionSource,
    video_id: &str,
    language: &str,
) -> Option<String> {
    match source.fetch_captions(video_id, language).await {
        Ok(Some(text)) => Some(text),
        Ok(None) if language != FALLBACK_LANGUAGE => {
            match source.fetch_captions(video_id, FALLBACK_LANGUAGE).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Fallback caption fetch failed for {}: {}", video_id, e);
                    None
                }
            }
        }
        Ok(None) => None,
        Err(e) => {
            warn!("Caption fetch failed for {}: {}", video_id, e);
            None
        }
    }
}

/// Join fragments into one transcript string, original order, single spaces.
pub fn join_fragments(fragments: &[CaptionFragment]) -> String {
    fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

// === timedtext json3 wire types ===

#[derive(Debug, Deserialize)]
struct TimedTextResponse {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSegment>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSegment {
    #[serde(default)]
    utf8: String,
}

/// Parse a timedtext json3 body into fragments. `None` when the body carries
/// no caption events (no track for that language).
pub fn parse_json3(body: &str) -> Result<Option<Vec<CaptionFragment>>> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    let parsed: TimedTextResponse = serde_json::from_str(body)?;

    let fragments: Vec<CaptionFragment> = parsed
        .events
        .into_iter()
        .filter_map(|event| {
            let text = event
                .segs
                .iter()
                .map(|s| s.utf8.as_str())
                .collect::<String>()
                .replace('\n', " ")
                .trim()
                .to_string();

            if text.is_empty() {
                return None;
            }

            Some(CaptionFragment {
                text,
                start: event.start_ms as f64 / 1000.0,
                duration: event.duration_ms as f64 / 1000.0,
            })
        })
        .collect();

    if fragments.is_empty() {
        Ok(None)
    } else {
        Ok(Some(fragments))
    }
}

/// Caption client against the timedtext endpoint.
pub struct CaptionClient {
    http: reqwest::Client,
    base_url: String,
}

impl CaptionClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (for testing).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }
}

impl Default for CaptionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptionSource for CaptionClient {
    async fn fetch_captions(&self, video_id: &str, language: &str) -> Result<Option<String>> {
        let query = [("v", video_id), ("lang", language), ("fmt", "json3")];

        let response = self.http.get(&self.base_url).query(&query).send().await?;
        let status = response.status();

        // Disabled captions surface as 404; no track surfaces as an empty
        // 200 body. Both are expected absence.
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SpillisteError::Captions(format!(
                "timedtext returned {} for {}",
                status, video_id
            )));
        }

        let body = response.text().await?;
        Ok(parse_json3(&body)?.map(|fragments| join_fragments(&fragments)))
    }
}
