/// YouTube-facing side of the pipeline
///
/// URL scraping from free text, channel enumeration and subtitle retrieval
/// through the external `yt-dlp` tool.

pub mod urls;
pub mod ytdlp;
pub mod channel;
pub mod subtitles;

// Re-export main types
pub use urls::{UrlExtractor, UrlPattern, extract_video_id, channel_handle};
pub use ytdlp::{ToolRunner, ToolOutput, YtDlp};
pub use channel::ChannelLister;
pub use subtitles::{SubtitleFetcher, Transcript};

use serde::{Deserialize, Serialize};

/// Canonical watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// A single video discovered on a channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRecord {
    #[serde(rename = "video_id")]
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub channel_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub channel_url: Option<String>,
}

impl VideoRecord {
    /// Create a record whose URL is derived from the id
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            url: watch_url(&id),
            id,
            title: title.into(),
            channel_name: None,
            channel_url: None,
        }
    }

    /// Tag the record with its source channel
    pub fn with_channel(mut self, name: &str, url: &str) -> Self {
        self.channel_name = Some(name.to_string());
        self.channel_url = Some(url.to_string());
        self
    }
}

/// Outcome of listing one channel; either `videos` or `error` is meaningful
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelResult {
    pub channel_url: String,
    pub video_count: usize,
    /// Absent on failure; present (possibly empty) on success
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub videos: Option<Vec<VideoRecord>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl ChannelResult {
    pub fn success(channel_url: &str, videos: Vec<VideoRecord>) -> Self {
        Self {
            channel_url: channel_url.to_string(),
            video_count: videos.len(),
            videos: Some(videos),
            error: None,
        }
    }

    pub fn failure(channel_url: &str, error: String) -> Self {
        Self {
            channel_url: channel_url.to_string(),
            video_count: 0,
            videos: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn videos(&self) -> &[VideoRecord] {
        self.videos.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_url_is_derived_from_id() {
        let record = VideoRecord::new("abc123", "My Title");
        assert_eq!(record.url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(record.channel_name, None);
    }

    #[test]
    fn test_record_json_shape() {
        let record = VideoRecord::new("abc123", "My Title")
            .with_channel("coach", "https://www.youtube.com/@coach");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["video_id"], "abc123");
        assert_eq!(value["channel_name"], "coach");

        let untagged = serde_json::to_value(VideoRecord::new("x", "y")).unwrap();
        assert!(untagged.get("channel_name").is_none());
    }

    #[test]
    fn test_channel_result_states_are_exclusive() {
        let ok = ChannelResult::success("https://www.youtube.com/@a", vec![VideoRecord::new("1", "t")]);
        assert!(ok.is_success());
        assert_eq!(ok.video_count, 1);

        let failed = ChannelResult::failure("https://www.youtube.com/@b", "Timeout".to_string());
        assert!(!failed.is_success());
        assert_eq!(failed.video_count, 0);
        assert!(failed.videos().is_empty());

        let value = serde_json::to_value(&failed).unwrap();
        assert!(value.get("videos").is_none());
        assert_eq!(value["error"], "Timeout");
    }

    #[test]
    fn test_empty_channel_keeps_videos_key() {
        let empty = ChannelResult::success("https://www.youtube.com/@quiet", Vec::new());
        let value = serde_json::to_value(&empty).unwrap();

        assert_eq!(value["videos"], serde_json::json!([]));
        assert_eq!(value["video_count"], 0);
        assert!(value.get("error").is_none());
    }
}
