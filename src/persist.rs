//! File persistence: per-video text files and the CSV export.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::control::ProcessedVideo;
use crate::error::Result;

/// Maximum length of a sanitized title in characters.
const MAX_TITLE_CHARS: usize = 100;

/// UTF-8 byte order mark, so spreadsheet tools pick the right encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Sanitize a video title for use in a filename.
///
/// Keeps alphanumeric characters, spaces, and `._-`; trims surrounding
/// whitespace and truncates to 100 characters. Idempotent.
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '_' | '-'))
        .collect();

    let truncated: String = cleaned.trim().chars().take(MAX_TITLE_CHARS).collect();
    truncated.trim().to_string()
}

fn save_text(dir: &Path, video_id: &str, title: &str, text: &str, suffix: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let filename = format!("{}_{}{}.txt", sanitize_title(title), video_id, suffix);
    let path = dir.join(filename);
    std::fs::write(&path, text)?;

    Ok(path)
}

/// Write transcript text to `{sanitized_title}_{video_id}.txt`, overwriting
/// any existing file.
pub fn save_transcript(dir: &Path, video_id: &str, title: &str, text: &str) -> Result<PathBuf> {
    save_text(dir, video_id, title, text, "")
}

/// Write summary text to `{sanitized_title}_{video_id}_summary.txt`,
/// overwriting any existing file.
pub fn save_summary(dir: &Path, video_id: &str, title: &str, text: &str) -> Result<PathBuf> {
    save_text(dir, video_id, title, text, "_summary")
}

/// Column and ordering options for the CSV export.
#[derive(Debug, Clone, Default)]
pub struct CsvOptions {
    /// Include transcript text and a has_transcript column.
    pub include_transcripts: bool,
    /// Include summary text and a has_summary column.
    pub include_summaries: bool,
    /// Sort oldest first instead of newest first.
    pub sort_ascending: bool,
}

/// Export processed videos to a BOM-prefixed UTF-8 CSV with a header row,
/// sorted by publication date (newest first unless `sort_ascending`).
pub fn export_csv(videos: &[ProcessedVideo], path: &Path, options: &CsvOptions) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut sorted: Vec<&ProcessedVideo> = videos.iter().collect();
    // Records without a timestamp sort as oldest.
    sorted.sort_by_key(|v| v.record.published_at);
    if !options.sort_ascending {
        sorted.reverse();
    }

    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header = vec!["title", "description", "video_id", "published_at"];
    if options.include_transcripts {
        header.extend(["transcript", "has_transcript"]);
    }
    if options.include_summaries {
        header.extend(["summary", "has_summary"]);
    }
    header.push("url");
    writer.write_record(&header)?;

    for video in sorted {
        let description = video
            .snippet
            .as_deref()
            .unwrap_or(&video.record.description);
        let published_at = video
            .record
            .published_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();

        let mut row = vec![
            video.record.title.clone(),
            description.to_string(),
            video.record.video_id.clone(),
            published_at,
        ];
        if options.include_transcripts {
            row.push(video.transcript.clone().unwrap_or_default());
            row.push(video.transcript.is_some().to_string());
        }
        if options.include_summaries {
            row.push(video.summary.clone().unwrap_or_default());
            row.push(video.summary.is_some().to_string());
        }
        row.push(video.record.watch_url());

        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::VideoRecord;
    use chrono::{TimeZone, Utc};

    fn processed(title: &str, video_id: &str, day: u32) -> ProcessedVideo {
        ProcessedVideo {
            record: VideoRecord {
                title: title.to_string(),
                video_id: video_id.to_string(),
                description: format!("description of {}", title),
                published_at: Some(Utc.with_ymd_and_hms(2023, 1, day, 12, 0, 0).unwrap()),
            },
            snippet: None,
            transcript: None,
            summary: None,
        }
    }

    #[test]
    fn test_sanitize_keeps_allowed_characters() {
        assert_eq!(
            sanitize_title("My Video: Part 1 / Episode_2.final"),
            "My Video Part 1  Episode_2.final"
        );
        assert_eq!(sanitize_title("한국어 제목 !!"), "한국어 제목");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "a".repeat(250);
        assert_eq!(sanitize_title(&long).chars().count(), 100);
    }

    #[test]
    fn test_sanitize_idempotent() {
        for title in [
            "Some <Title> with / bad * chars?",
            &("word ".repeat(30)),
            "   padded   ",
        ] {
            let once = sanitize_title(title);
            assert_eq!(sanitize_title(&once), once);
        }
    }

    #[test]
    fn test_sanitize_charset() {
        let out = sanitize_title("a!@#$%^&*()b c_d-e.f");
        assert!(out
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '_' | '-')));
    }

    #[test]
    fn test_save_transcript_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("nested");

        let path = save_transcript(&base, "abc12345678", "My: Video", "the transcript").unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "My Video_abc12345678.txt"
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "the transcript");

        let path = save_summary(&base, "abc12345678", "My: Video", "the summary").unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "My Video_abc12345678_summary.txt"
        );

        // Overwrite semantics.
        let path = save_transcript(&base, "abc12345678", "My: Video", "replaced").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "replaced");
    }

    fn read_rows(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
        let raw = std::fs::read_to_string(path).unwrap();
        let stripped = raw.strip_prefix('\u{feff}').expect("missing BOM");

        let mut reader = csv::Reader::from_reader(stripped.as_bytes());
        let header = reader
            .headers()
            .unwrap()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(|s| s.to_string()).collect())
            .collect();
        (header, rows)
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let videos = vec![
            processed("First, with comma", "aaa11111111", 1),
            processed("두번째 영상", "bbb22222222", 2),
        ];
        export_csv(&videos, &path, &CsvOptions::default()).unwrap();

        let (header, rows) = read_rows(&path);
        assert_eq!(
            header,
            vec!["title", "description", "video_id", "published_at", "url"]
        );
        assert_eq!(rows.len(), 2);

        // Newest first by default; non-ASCII and commas survive.
        assert_eq!(rows[0][0], "두번째 영상");
        assert_eq!(rows[0][2], "bbb22222222");
        assert_eq!(rows[1][0], "First, with comma");
        assert_eq!(rows[1][2], "aaa11111111");
        assert_eq!(
            rows[1][3],
            videos[0].record.published_at.unwrap().to_rfc3339()
        );
    }

    #[test]
    fn test_csv_sort_ascending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let videos = vec![processed("newer", "aaa11111111", 9), processed("older", "bbb22222222", 3)];
        let options = CsvOptions {
            sort_ascending: true,
            ..Default::default()
        };
        export_csv(&videos, &path, &options).unwrap();

        let (_, rows) = read_rows(&path);
        assert_eq!(rows[0][0], "older");
        assert_eq!(rows[1][0], "newer");
    }

    #[test]
    fn test_csv_optional_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut video = processed("with extras", "aaa11111111", 1);
        video.snippet = Some("extracted bit".to_string());
        video.transcript = Some("transcript text".to_string());
        video.summary = None;

        let options = CsvOptions {
            include_transcripts: true,
            include_summaries: true,
            sort_ascending: false,
        };
        export_csv(&[video], &path, &options).unwrap();

        let (header, rows) = read_rows(&path);
        assert_eq!(
            header,
            vec![
                "title",
                "description",
                "video_id",
                "published_at",
                "transcript",
                "has_transcript",
                "summary",
                "has_summary",
                "url"
            ]
        );
        // Snippet replaces the raw description.
        assert_eq!(rows[0][1], "extracted bit");
        assert_eq!(rows[0][4], "transcript text");
        assert_eq!(rows[0][5], "true");
        assert_eq!(rows[0][6], "");
        assert_eq!(rows[0][7], "false");
        assert_eq!(rows[0][8], "https://www.youtube.com/watch?v=aaa11111111");
    }
}
