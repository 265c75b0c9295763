//! YouTube data access for Spilliste.
//!
//! Provides video metadata types, URL parsing, and clients for the Data API
//! (playlists, video details) and the caption endpoint.

pub mod captions;
pub mod playlist;

pub use captions::{fetch_with_fallback, CaptionClient, CaptionFragment, CaptionSource};
pub use playlist::{fetch_playlist_videos, PlaylistClient, PlaylistPage, PlaylistSource};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpillisteError};

/// Metadata for a single video, as returned by the playlist or video
/// endpoints. Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Video title.
    pub title: String,
    /// 11-character video identifier.
    pub video_id: String,
    /// Full description text.
    pub description: String,
    /// Publication timestamp, if the API returned a parseable one.
    pub published_at: Option<DateTime<Utc>>,
}

impl VideoRecord {
    /// Canonical watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

/// What a user-supplied URL or identifier resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunTarget {
    Playlist(String),
    Video(String),
}

/// Extract a video ID from a YouTube URL or bare 11-character ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    // Matches watch/embed/shorts/youtu.be URLs and bare IDs.
    let re = Regex::new(
        r"(?x)
        (?:
            (?:https?://)?
            (?:www\.|m\.)?
            (?:youtube\.com/watch\?.*v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/|youtube\.com/v/)
            ([a-zA-Z0-9_-]{11})
        )
        |
        ^([a-zA-Z0-9_-]{11})$
    ",
    )
    .expect("Invalid regex");

    let caps = re.captures(input)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Extract a playlist ID from a YouTube URL or bare ID.
pub fn extract_playlist_id(input: &str) -> Option<String> {
    let input = input.trim();

    // URL form: any youtube URL carrying a `list` query parameter.
    if let Ok(url) = url::Url::parse(input) {
        if let Some((_, id)) = url.query_pairs().find(|(k, _)| k == "list") {
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
    }

    // Bare playlist IDs start with a known prefix and are longer than a
    // video ID, so the two never collide.
    let re = Regex::new(r"^(?:PL|UU|FL|OL|RD)[a-zA-Z0-9_-]{10,}$").expect("Invalid regex");
    if re.is_match(input) {
        return Some(input.to_string());
    }

    None
}

/// Resolve user input to a playlist or single video target.
///
/// Playlists take precedence: a watch URL carrying a `list` parameter is
/// treated as a playlist, matching how YouTube itself presents it.
pub fn resolve_input(input: &str) -> Result<RunTarget> {
    if let Some(playlist_id) = extract_playlist_id(input) {
        return Ok(RunTarget::Playlist(playlist_id));
    }

    if let Some(video_id) = extract_video_id(input) {
        return Ok(RunTarget::Video(video_id));
    }

    Err(SpillisteError::InvalidInput(format!(
        "Not a recognizable YouTube video or playlist: {}",
        input
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );

        assert_eq!(extract_video_id("not-a-video-id"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_extract_playlist_id() {
        assert_eq!(
            extract_playlist_id("https://www.youtube.com/playlist?list=PLU9-uwewPMe2ACTcry7ChkTbujexZnjlN"),
            Some("PLU9-uwewPMe2ACTcry7ChkTbujexZnjlN".to_string())
        );
        assert_eq!(
            extract_playlist_id("PLU9-uwewPMe2ACTcry7ChkTbujexZnjlN"),
            Some("PLU9-uwewPMe2ACTcry7ChkTbujexZnjlN".to_string())
        );
        assert_eq!(extract_playlist_id("dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_resolve_input_prefers_playlist() {
        let target =
            resolve_input("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLU9-uwewPMe2ACT")
                .unwrap();
        assert_eq!(target, RunTarget::Playlist("PLU9-uwewPMe2ACT".to_string()));
    }

    #[test]
    fn test_resolve_input_video() {
        let target = resolve_input("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(target, RunTarget::Video("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_resolve_input_invalid() {
        assert!(resolve_input("https://example.com/nothing").is_err());
        assert!(resolve_input("garbage").is_err());
    }
}
