use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::transcript::{separator, TranscriptRecord};
use crate::youtube::{channel_handle, extract_video_id, ChannelLister, ChannelResult, SubtitleFetcher, VideoRecord};

/// Throttling applied between consecutive batch items
///
/// Called once between each pair of items and never after the last one.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn pause(&self);
}

/// Unconditional fixed sleep between items
#[derive(Debug, Clone)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl RateLimiter for FixedDelay {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            debug!("Sleeping {:.2}s before next item", self.delay.as_secs_f64());
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// One failed batch item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailureRecord {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub video_id: Option<String>,
    pub error: String,
}

/// A kind of work the batch runner can drive
#[async_trait]
pub trait BatchJob: Send + Sync {
    type Output: Send + Sync;

    /// Identifier for an item, `None` when the item is not a usable URL
    fn resolve(&self, item: &str) -> Option<String>;

    /// Call the external tool for one resolved item
    async fn process(&self, key: &str, item: &str) -> Result<Self::Output>;

    /// Write the per-item artifact; errors here abort the batch
    async fn persist(&self, key: &str, output: &Self::Output) -> Result<()>;

    /// Short success note for the progress log
    fn describe(&self, output: &Self::Output) -> String;

    /// Video id to record on a failure, if the key is one
    fn failure_video_id(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Outcome of a single item, in input order
#[derive(Debug, Clone)]
pub struct ItemOutcome<T> {
    pub item: String,
    pub key: Option<String>,
    pub result: std::result::Result<T, FailureRecord>,
}

/// Overall batch results
#[derive(Debug, Clone)]
pub struct BatchOutcome<T> {
    pub items: Vec<ItemOutcome<T>>,
    pub total_time: Duration,
}

impl<T> BatchOutcome<T> {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn successes(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter_map(|item| item.result.as_ref().ok())
    }

    pub fn failures(&self) -> Vec<&FailureRecord> {
        self.items
            .iter()
            .filter_map(|item| item.result.as_ref().err())
            .collect()
    }

    pub fn successful(&self) -> usize {
        self.successes().count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.successful()
    }

    pub fn success_rate(&self) -> f64 {
        if self.total() > 0 {
            self.successful() as f64 / self.total() as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn log_summary(&self, label: &str) {
        info!("🎉 {} batch completed in {:.2}s", label, self.total_time.as_secs_f64());
        info!("📊 Total: {}", self.total());
        info!("✅ Successful: {}", self.successful());
        info!("❌ Failed: {}", self.failed());
        info!("📈 Success rate: {:.1}%", self.success_rate());
    }
}

/// Sequential batch runner: one item at a time, a failure never stops the batch
#[derive(Clone)]
pub struct BatchProcessor {
    limiter: Arc<dyn RateLimiter>,
}

impl BatchProcessor {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self { limiter }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self::new(Arc::new(FixedDelay::new(delay)))
    }

    pub async fn run<J: BatchJob>(&self, job: &J, items: &[String]) -> Result<BatchOutcome<J::Output>> {
        let start_time = Instant::now();
        let total = items.len();
        let mut outcomes = Vec::with_capacity(total);

        info!("🚀 Processing {} items...", total);

        for (index, item) in items.iter().enumerate() {
            let position = format!("[{}/{}]", index + 1, total);
            outcomes.push(self.run_item(job, item, &position).await?);

            if index + 1 < total {
                self.limiter.pause().await;
            }
        }

        Ok(BatchOutcome {
            items: outcomes,
            total_time: start_time.elapsed(),
        })
    }

    async fn run_item<J: BatchJob>(
        &self,
        job: &J,
        item: &str,
        position: &str,
    ) -> Result<ItemOutcome<J::Output>> {
        let key = match job.resolve(item) {
            Some(key) => key,
            None => {
                let error = PipelineError::InvalidInput(item.to_string());
                warn!("{} ✗ {}: {}", position, error, item);
                return Ok(ItemOutcome {
                    item: item.to_string(),
                    key: None,
                    result: Err(FailureRecord {
                        url: item.to_string(),
                        video_id: None,
                        error: error.to_string(),
                    }),
                });
            }
        };

        info!("{} Processing: {}", position, key);

        let result = match job.process(&key, item).await {
            Ok(output) => {
                job.persist(&key, &output).await?;
                info!("{} ✓ {}", position, job.describe(&output));
                Ok(output)
            }
            Err(e) => {
                if e.is_expected_absence() {
                    info!("{} ✗ {}", position, e);
                } else {
                    warn!("{} ✗ {}", position, e);
                }
                Err(FailureRecord {
                    url: item.to_string(),
                    video_id: job.failure_video_id(&key),
                    error: e.to_string(),
                })
            }
        };

        Ok(ItemOutcome {
            item: item.to_string(),
            key: Some(key),
            result,
        })
    }
}

/// Read a one-URL-per-line list, ignoring blank lines
pub async fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

async fn write_lines<'a>(path: &Path, lines: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    tokio::fs::write(path, content).await?;
    Ok(())
}

fn generated_at() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

async fn write_failures(dir: &Path, failures: &[&FailureRecord]) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    let path = dir.join("failed.json");
    write_json(&path, failures).await?;
    info!("📝 Failed items logged to: {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Transcripts
// ---------------------------------------------------------------------------

/// Fetches subtitles for video URLs and stores one artifact per video
pub struct TranscriptJob {
    fetcher: SubtitleFetcher,
    output_dir: PathBuf,
}

impl TranscriptJob {
    pub fn new(fetcher: SubtitleFetcher, output_dir: PathBuf) -> Self {
        Self { fetcher, output_dir }
    }
}

#[async_trait]
impl BatchJob for TranscriptJob {
    type Output = TranscriptRecord;

    fn resolve(&self, item: &str) -> Option<String> {
        extract_video_id(item)
    }

    async fn process(&self, key: &str, item: &str) -> Result<TranscriptRecord> {
        let transcript = self.fetcher.fetch(key, item).await?;
        Ok(TranscriptRecord::new(key, item, transcript))
    }

    async fn persist(&self, _key: &str, output: &TranscriptRecord) -> Result<()> {
        output.write_to_dir(&self.output_dir).await?;
        Ok(())
    }

    fn describe(&self, output: &TranscriptRecord) -> String {
        format!("Saved {} ({} chars)", output.video_id, output.char_count())
    }

    fn failure_video_id(&self, key: &str) -> Option<String> {
        Some(key.to_string())
    }
}

/// Write the aggregate transcript outputs next to the per-video artifacts
pub async fn finalize_transcripts(outcome: &BatchOutcome<TranscriptRecord>, dir: &Path) -> Result<()> {
    let records: Vec<&TranscriptRecord> = outcome.successes().collect();

    write_json(&dir.join("transcripts.json"), &records).await?;
    write_lines(
        &dir.join("transcribed_urls.txt"),
        records.iter().map(|r| r.url.as_str()),
    )
    .await?;
    write_failures(dir, &outcome.failures()).await?;

    let report_path = dir.join("transcript_report.txt");
    tokio::fs::write(&report_path, render_transcript_report(outcome)).await?;
    info!("📝 Transcripts saved to: {}", dir.display());
    Ok(())
}

pub fn render_transcript_report(outcome: &BatchOutcome<TranscriptRecord>) -> String {
    let rule = separator();
    let mut report = format!(
        "{rule}\nTRANSCRIPT FETCH REPORT\n{rule}\n\n\
         Generated: {}\n\
         Total Videos: {}\nSuccessful: {}\nFailed: {}\nSuccess Rate: {:.1}%\n\n\
         {rule}\nPER-VIDEO STATUS\n{rule}\n\n",
        generated_at(),
        outcome.total(),
        outcome.successful(),
        outcome.failed(),
        outcome.success_rate(),
    );

    let mut rows: Vec<&ItemOutcome<TranscriptRecord>> = outcome.items.iter().collect();
    rows.sort_by_key(|row| {
        std::cmp::Reverse(row.result.as_ref().map(|r| r.char_count()).unwrap_or(0))
    });

    for row in rows {
        report.push_str(&format!("{}\n", row.key.as_deref().unwrap_or("(unresolved)")));
        report.push_str(&format!("  URL: {}\n", row.item));
        match &row.result {
            Ok(record) => report.push_str(&format!("  Status: OK - {} chars\n\n", record.char_count())),
            Err(failure) => report.push_str(&format!("  Status: ERROR - {}\n\n", failure.error)),
        }
    }

    report
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

/// Videos listed for one channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelListing {
    pub channel_name: String,
    pub result: ChannelResult,
}

/// Enumerates channel uploads and stores one video list per channel
pub struct ChannelJob {
    lister: ChannelLister,
    output_dir: PathBuf,
    max_videos: Option<usize>,
}

impl ChannelJob {
    pub fn new(lister: ChannelLister, output_dir: PathBuf, max_videos: Option<usize>) -> Self {
        Self {
            lister,
            output_dir,
            max_videos,
        }
    }
}

#[async_trait]
impl BatchJob for ChannelJob {
    type Output = ChannelListing;

    fn resolve(&self, item: &str) -> Option<String> {
        channel_handle(item)
    }

    async fn process(&self, key: &str, item: &str) -> Result<ChannelListing> {
        let videos = self
            .lister
            .list_videos(item, self.max_videos)
            .await?
            .into_iter()
            .map(|video| video.with_channel(key, item))
            .collect();

        Ok(ChannelListing {
            channel_name: key.to_string(),
            result: ChannelResult::success(item, videos),
        })
    }

    async fn persist(&self, key: &str, output: &ChannelListing) -> Result<()> {
        let path = self.output_dir.join(format!("{}_videos.json", key));
        write_json(&path, output.result.videos()).await?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn describe(&self, output: &ChannelListing) -> String {
        format!("@{}: {} videos", output.channel_name, output.result.video_count)
    }
}

/// Per-channel results in input order, failures included
pub fn channel_stats(outcome: &BatchOutcome<ChannelListing>) -> Vec<(String, ChannelResult)> {
    outcome
        .items
        .iter()
        .map(|row| match &row.result {
            Ok(listing) => (listing.channel_name.clone(), listing.result.clone()),
            Err(failure) => (
                row.key.clone().unwrap_or_else(|| row.item.clone()),
                ChannelResult::failure(&row.item, failure.error.clone()),
            ),
        })
        .collect()
}

/// Write the aggregate channel outputs
pub async fn finalize_channels(outcome: &BatchOutcome<ChannelListing>, dir: &Path) -> Result<()> {
    let all_videos: Vec<&VideoRecord> = outcome
        .successes()
        .flat_map(|listing| listing.result.videos().iter())
        .collect();

    info!("🎬 Total videos extracted: {}", all_videos.len());

    let all_videos_path = dir.join("all_videos.json");
    write_json(&all_videos_path, &all_videos).await?;
    info!("💾 Saved all videos: {}", all_videos_path.display());

    let urls_path = dir.join("all_video_urls.txt");
    write_lines(&urls_path, all_videos.iter().map(|v| v.url.as_str())).await?;
    info!("💾 Saved URL list: {}", urls_path.display());

    let stats = channel_stats(outcome);
    let stats_map: BTreeMap<&str, &ChannelResult> =
        stats.iter().map(|(name, result)| (name.as_str(), result)).collect();
    write_json(&dir.join("channel_stats.json"), &stats_map).await?;

    write_failures(dir, &outcome.failures()).await?;

    let report_path = dir.join("channel_report.txt");
    tokio::fs::write(&report_path, render_channel_report(&stats, all_videos.len())).await?;
    info!("📝 Saved report: {}", report_path.display());
    Ok(())
}

pub fn render_channel_report(stats: &[(String, ChannelResult)], total_videos: usize) -> String {
    let rule = separator();
    let mut report = format!(
        "{rule}\nCHANNEL VIDEO EXTRACTION REPORT\n{rule}\n\n\
         Generated: {}\n\
         Total Channels: {}\nTotal Videos: {}\n\n\
         {rule}\nPER-CHANNEL BREAKDOWN\n{rule}\n\n",
        generated_at(),
        stats.len(),
        total_videos,
    );

    let mut sorted: Vec<&(String, ChannelResult)> = stats.iter().collect();
    sorted.sort_by_key(|(_, result)| std::cmp::Reverse(result.video_count));

    for (name, result) in sorted {
        report.push_str(&format!("@{}\n", name));
        report.push_str(&format!("  URL: {}\n", result.channel_url));
        match &result.error {
            Some(error) => report.push_str(&format!("  Status: ERROR - {}\n", error)),
            None => report.push_str(&format!("  Videos: {}\n", result.video_count)),
        }
        report.push('\n');
    }

    report
}
