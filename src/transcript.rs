/// Per-video transcript artifact: a short header block, an 80 column `=`
/// separator, then the raw transcript text.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::youtube::Transcript;

pub const SEPARATOR_WIDTH: usize = 80;

/// Header lines examined when recovering metadata
const HEADER_SCAN_LINES: usize = 10;

pub fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

/// A successfully fetched transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptRecord {
    pub video_id: String,
    pub url: String,
    pub language: String,
    pub method: String,
    pub text: String,
}

impl TranscriptRecord {
    pub fn new(video_id: &str, url: &str, transcript: Transcript) -> Self {
        Self {
            video_id: video_id.to_string(),
            url: url.to_string(),
            language: transcript.language,
            method: transcript.method,
            text: transcript.text,
        }
    }

    /// Artifact file name inside the transcripts directory
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.video_id)
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Render the artifact body
    pub fn render(&self) -> String {
        format!(
            "Video ID: {}\nURL: {}\nLanguage: {}\nMethod: {}\n\n{}\n\n{}",
            self.video_id,
            self.url,
            self.language,
            self.method,
            separator(),
            self.text
        )
    }

    pub async fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        tokio::fs::write(&path, self.render()).await?;
        debug!("Wrote transcript artifact {}", path.display());
        Ok(path)
    }
}

/// An artifact read back from disk for scoring
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptArtifact {
    pub video_id: String,
    pub url: String,
    pub filename: String,
    /// Lowercased text from the separator line onwards
    pub body: String,
}

impl TranscriptArtifact {
    pub fn parse(filename: &str, content: &str) -> Self {
        let separator = separator();
        let mut video_id = String::new();
        let mut url = String::new();

        for line in content.lines().take(HEADER_SCAN_LINES) {
            if line.starts_with(&separator) {
                break;
            }
            if let Some(rest) = line.strip_prefix("Video ID:") {
                video_id = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix("URL:") {
                url = rest.trim().to_string();
            }
        }

        let body = match content.find(&separator) {
            Some(idx) => content[idx..].to_lowercase(),
            None => content.to_lowercase(),
        };

        Self {
            video_id,
            url,
            filename: filename.to_string(),
            body,
        }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::parse(&filename, &content))
    }

    /// Artifacts produced by the transcript batch always carry a video id
    pub fn has_header(&self) -> bool {
        !self.video_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(text: &str) -> TranscriptRecord {
        TranscriptRecord::new(
            "abc123",
            "https://www.youtube.com/watch?v=abc123",
            Transcript {
                text: text.to_string(),
                language: "en".to_string(),
                method: "yt-dlp".to_string(),
            },
        )
    }

    #[test]
    fn test_render_layout() {
        let rendered = record("Hello there").render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "Video ID: abc123");
        assert_eq!(lines[1], "URL: https://www.youtube.com/watch?v=abc123");
        assert_eq!(lines[2], "Language: en");
        assert_eq!(lines[3], "Method: yt-dlp");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5].len(), 80);
        assert!(lines[5].chars().all(|c| c == '='));
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "Hello there");
    }

    #[test]
    fn test_parse_recovers_header_and_lowercases_body() {
        let artifact = TranscriptArtifact::parse("abc123.txt", &record("Squat DEEP").render());

        assert_eq!(artifact.video_id, "abc123");
        assert_eq!(artifact.url, "https://www.youtube.com/watch?v=abc123");
        assert!(artifact.body.starts_with(&separator()));
        assert!(artifact.body.ends_with("squat deep"));
        assert!(!artifact.body.contains("video id"));
        assert!(artifact.has_header());
    }

    #[test]
    fn test_parse_without_separator_uses_whole_file() {
        let artifact = TranscriptArtifact::parse("notes.txt", "Some Notes About Squats");
        assert!(!artifact.has_header());
        assert_eq!(artifact.body, "some notes about squats");
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = record("text").write_to_dir(dir.path()).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "abc123.txt");

        let artifact = TranscriptArtifact::load(&path).await.unwrap();
        assert_eq!(artifact.filename, "abc123.txt");
        assert_eq!(artifact.video_id, "abc123");
    }
}
