//! Playlist and video metadata via the YouTube Data API v3.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::VideoRecord;
use crate::error::{Result, SpillisteError};

/// Items requested per page, the Data API maximum.
pub const PAGE_SIZE: u32 = 50;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// One page of playlist results.
#[derive(Debug, Clone)]
pub struct PlaylistPage {
    pub videos: Vec<VideoRecord>,
    pub next_page_token: Option<String>,
}

/// Trait for playlist and video metadata providers.
///
/// The pipeline depends on this seam rather than on a concrete HTTP client,
/// so tests can drive it with fakes.
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Fetch one page of playlist items.
    async fn fetch_page(&self, playlist_id: &str, page_token: Option<&str>)
        -> Result<PlaylistPage>;

    /// Fetch metadata for a single video. `None` when the API returns no
    /// matching item.
    async fn fetch_video(&self, video_id: &str) -> Result<Option<VideoRecord>>;
}

/// Fetch all videos of a playlist, following pagination tokens until
/// exhausted. Source order is preserved.
pub async fn fetch_playlist_videos(
    source: &dyn PlaylistSource,
    playlist_id: &str,
) -> Result<Vec<VideoRecord>> {
    let mut videos = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = source.fetch_page(playlist_id, page_token.as_deref()).await?;
        debug!(
            "Fetched page with {} items (more: {})",
            page.videos.len(),
            page.next_page_token.is_some()
        );
        videos.extend(page.videos);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(videos)
}

// === Data API wire types ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: Option<String>,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

/// YouTube Data API client.
pub struct PlaylistClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl PlaylistClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (for testing).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Turn a non-success response into an `Upstream` error, preferring the
    /// message the API embeds in its error body.
    async fn upstream_error(context: &str, response: reqwest::Response) -> SpillisteError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        SpillisteError::Upstream(format!("{} ({}): {}", context, status, message))
    }
}

#[async_trait]
impl PlaylistSource for PlaylistClient {
    async fn fetch_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage> {
        let url = format!("{}/playlistItems", self.base_url);
        let max_results = PAGE_SIZE.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", &max_results),
            ("key", &self.api_key),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self.http.get(&url).query(&query).send().await?;
        if !response.status().is_success() {
            return Err(Self::upstream_error("playlist lookup failed", response).await);
        }

        let parsed: PlaylistItemsResponse = response.json().await?;
        let videos = parsed
            .items
            .into_iter()
            .map(|item| VideoRecord {
                title: item.snippet.title,
                video_id: item.snippet.resource_id.video_id,
                description: item.snippet.description,
                published_at: parse_timestamp(item.snippet.published_at.as_deref()),
            })
            .collect();

        Ok(PlaylistPage {
            videos,
            next_page_token: parsed.next_page_token,
        })
    }

    async fn fetch_video(&self, video_id: &str) -> Result<Option<VideoRecord>> {
        let url = format!("{}/videos", self.base_url);
        let query = [
            ("part", "snippet"),
            ("id", video_id),
            ("key", &self.api_key),
        ];

        let response = self.http.get(&url).query(&query).send().await?;
        if !response.status().is_success() {
            return Err(Self::upstream_error("video lookup failed", response).await);
        }

        let parsed: VideoListResponse = response.json().await?;
        Ok(parsed.items.into_iter().next().map(|item| VideoRecord {
            title: item.snippet.title,
            video_id: item.id,
            description: item.snippet.description,
            published_at: parse_timestamp(item.snippet.published_at.as_deref()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fake source serving `total` numbered videos in pages of `PAGE_SIZE`.
    struct FakePlaylist {
        total: usize,
        requests: AtomicUsize,
    }

    impl FakePlaylist {
        fn new(total: usize) -> Self {
            Self {
                total,
                requests: AtomicUsize::new(0),
            }
        }

        fn record(n: usize) -> VideoRecord {
            VideoRecord {
                title: format!("Video {}", n),
                video_id: format!("vid{:08}", n),
                description: String::new(),
                published_at: None,
            }
        }
    }

    #[async_trait]
    impl PlaylistSource for FakePlaylist {
        async fn fetch_page(
            &self,
            _playlist_id: &str,
            page_token: Option<&str>,
        ) -> Result<PlaylistPage> {
            self.requests.fetch_add(1, Ordering::SeqCst);

            let start: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
            let end = (start + PAGE_SIZE as usize).min(self.total);
            let videos = (start..end).map(Self::record).collect();
            let next_page_token = (end < self.total).then(|| end.to_string());

            Ok(PlaylistPage {
                videos,
                next_page_token,
            })
        }

        async fn fetch_video(&self, _video_id: &str) -> Result<Option<VideoRecord>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_pagination_fetches_all_pages_in_order() {
        let source = FakePlaylist::new(125);
        let videos = fetch_playlist_videos(&source, "PLtest").await.unwrap();

        assert_eq!(videos.len(), 125);
        // ceil(125 / 50) = 3 page requests.
        assert_eq!(source.requests.load(Ordering::SeqCst), 3);
        // Source order preserved.
        for (i, video) in videos.iter().enumerate() {
            assert_eq!(video.title, format!("Video {}", i));
        }
    }

    #[tokio::test]
    async fn test_pagination_single_page() {
        let source = FakePlaylist::new(7);
        let videos = fetch_playlist_videos(&source, "PLtest").await.unwrap();

        assert_eq!(videos.len(), 7);
        assert_eq!(source.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pagination_empty_playlist() {
        let source = FakePlaylist::new(0);
        let videos = fetch_playlist_videos(&source, "PLtest").await.unwrap();

        assert!(videos.is_empty());
        assert_eq!(source.requests.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parse_timestamp() {
        let parsed = parse_timestamp(Some("2023-01-15T10:00:00Z")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2023-01-15T10:00:00+00:00");
        assert!(parse_timestamp(Some("not a date")).is_none());
        assert!(parse_timestamp(None).is_none());
    }
}
