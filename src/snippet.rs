//! Description snippet extraction.
//!
//! Video descriptions often embed a useful block of text between two fixed
//! marker phrases (for example a news digest between a heading and the table
//! of contents). This module pulls that block out.

/// Extract the text strictly between the first occurrence of `start_marker`
/// and the first occurrence of `end_marker` after it, trimmed of surrounding
/// whitespace.
///
/// Returns an empty string when either marker is missing in the required
/// order.
pub fn extract_between(description: &str, start_marker: &str, end_marker: &str) -> String {
    let Some(start_pos) = description.find(start_marker) else {
        return String::new();
    };
    let after = start_pos + start_marker.len();

    let Some(end_offset) = description[after..].find(end_marker) else {
        return String::new();
    };

    description[after..after + end_offset].trim().to_string()
}

/// Marker pair used for snippet extraction.
#[derive(Debug, Clone)]
pub struct SnippetMarkers {
    pub start: String,
    pub end: String,
}

impl SnippetMarkers {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Apply the markers to a description.
    pub fn extract(&self, description: &str) -> String {
        extract_between(description, &self.start, &self.end)
    }
}
