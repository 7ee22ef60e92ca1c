use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::ToolRunner;
use crate::config::YtDlpConfig;
use crate::error::{PipelineError, Result};

/// Method tag recorded for transcripts obtained through yt-dlp subtitles
pub const METHOD_YTDLP: &str = "yt-dlp";

/// Transcript text recovered from a subtitle track
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub language: String,
    pub method: String,
}

/// yt-dlp `json3` subtitle document; only the fields we read
#[derive(Debug, Deserialize)]
struct Json3Document {
    events: Option<Vec<Json3Event>>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    segs: Option<Vec<Json3Segment>>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    utf8: Option<String>,
}

/// Downloads English subtitles for a video and flattens them to plain text
#[derive(Clone)]
pub struct SubtitleFetcher {
    runner: Arc<dyn ToolRunner>,
    timeout: Duration,
    temp_dir: PathBuf,
    language: String,
    /// Locale suffixes in priority order: plain English before regional variants
    candidates: Vec<String>,
    format: String,
}

impl SubtitleFetcher {
    pub fn new(runner: Arc<dyn ToolRunner>, config: &YtDlpConfig) -> Self {
        Self {
            runner,
            timeout: config.subtitle_timeout(),
            temp_dir: config.temp_dir.clone(),
            language: config.subtitle_language.clone(),
            candidates: config.subtitle_candidates.clone(),
            format: config.subtitle_format.clone(),
        }
    }

    fn output_stem(&self, video_id: &str) -> PathBuf {
        self.temp_dir.join(format!("yt_transcript_{}", video_id))
    }

    /// Files yt-dlp may have produced for `video_id`, highest priority first
    pub fn candidate_paths(&self, video_id: &str) -> Vec<PathBuf> {
        self.candidates
            .iter()
            .map(|suffix| {
                self.temp_dir
                    .join(format!("yt_transcript_{}.{}.{}", video_id, suffix, self.format))
            })
            .collect()
    }

    pub fn build_args(&self, video_id: &str, url: &str) -> Vec<String> {
        vec![
            "--write-auto-sub".to_string(),
            "--write-sub".to_string(),
            "--sub-lang".to_string(),
            self.language.clone(),
            "--skip-download".to_string(),
            "--sub-format".to_string(),
            self.format.clone(),
            "--output".to_string(),
            self.output_stem(video_id).to_string_lossy().into_owned(),
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            url.to_string(),
        ]
    }

    /// Fetch the transcript for one video
    ///
    /// The exit status is only logged: yt-dlp can fail on one track and still
    /// write another, so the presence of a candidate file decides the outcome.
    pub async fn fetch(&self, video_id: &str, url: &str) -> Result<Transcript> {
        let args = self.build_args(video_id, url);
        let output = self.runner.run(&args, self.timeout).await?;

        if !output.success {
            debug!(
                "yt-dlp exited with {:?} for {}: {}",
                output.status_code,
                video_id,
                output.stderr.trim()
            );
        }

        for path in self.candidate_paths(video_id) {
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                continue;
            }

            let content = tokio::fs::read_to_string(&path).await;
            remove_best_effort(&path).await;

            match parse_json3(&content?)? {
                Some(text) => {
                    return Ok(Transcript {
                        text,
                        language: self.language.clone(),
                        method: METHOD_YTDLP.to_string(),
                    });
                }
                None => debug!("No events in {}, trying next candidate", path.display()),
            }
        }

        Err(PipelineError::NoSubtitles)
    }
}

async fn remove_best_effort(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Could not remove {}: {}", path.display(), e);
    }
}

/// Flatten a json3 body into text; `None` when it has no `events`
pub fn parse_json3(content: &str) -> Result<Option<String>> {
    let document: Json3Document =
        serde_json::from_str(content).map_err(|e| PipelineError::Parse(e.to_string()))?;

    Ok(document.events.map(|events| {
        let fragments: Vec<String> = events
            .into_iter()
            .filter_map(|event| event.segs)
            .flatten()
            .filter_map(|seg| seg.utf8)
            .collect();
        fragments.join(" ").trim().to_string()
    }))
}
