use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::{ToolRunner, VideoRecord};
use crate::error::{PipelineError, Result};

/// Print template requested from yt-dlp; parsed back by [`parse_listing`]
pub const LISTING_TEMPLATE: &str = "%(id)s|%(title)s";

/// Lists a channel's uploads through flat playlist enumeration
#[derive(Clone)]
pub struct ChannelLister {
    runner: Arc<dyn ToolRunner>,
    timeout: Duration,
}

impl ChannelLister {
    pub fn new(runner: Arc<dyn ToolRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// Arguments for listing `channel_url`, optionally capped at `max_videos`
    pub fn build_args(channel_url: &str, max_videos: Option<usize>) -> Vec<String> {
        let mut args = vec![
            "--flat-playlist".to_string(),
            "--print".to_string(),
            LISTING_TEMPLATE.to_string(),
            "--no-warnings".to_string(),
            "--quiet".to_string(),
            format!("{}/videos", channel_url.trim_end_matches('/')),
        ];

        if let Some(max) = max_videos {
            args.push("--playlist-end".to_string());
            args.push(max.to_string());
        }

        args
    }

    /// List the videos of one channel in upload-list order
    pub async fn list_videos(
        &self,
        channel_url: &str,
        max_videos: Option<usize>,
    ) -> Result<Vec<VideoRecord>> {
        let args = Self::build_args(channel_url, max_videos);
        let output = self.runner.run(&args, self.timeout).await?;

        if !output.success {
            return Err(PipelineError::ToolFailed {
                code: output.status_code,
                stderr: output.stderr,
            });
        }

        let videos = parse_listing(&output.stdout);
        info!("📺 {} videos listed for {}", videos.len(), channel_url);
        Ok(videos)
    }
}

/// Parse `id|title` lines; lines without a separator are skipped
pub fn parse_listing(stdout: &str) -> Vec<VideoRecord> {
    stdout
        .trim()
        .lines()
        .filter_map(|line| match line.split_once('|') {
            Some((id, title)) => Some(VideoRecord::new(id.trim(), title.trim())),
            None => {
                if !line.trim().is_empty() {
                    debug!("Skipping unparseable listing line: {}", line);
                }
                None
            }
        })
        .collect()
}
