/// YouTube Fitness Analyzer
///
/// Scrapes channel and video links from text, lists channel uploads and
/// downloads English subtitles through `yt-dlp`, then ranks the stored
/// transcripts by how much fitness vocabulary they contain.

pub mod error;
pub mod config;
pub mod youtube;
pub mod transcript;
pub mod processing;
pub mod fitness;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{PipelineError, Result};
pub use crate::fitness::{FitnessScoreEntry, FitnessVocabulary, KeywordScorer, TranscriptScanner};
pub use crate::processing::{BatchOutcome, BatchProcessor, FailureRecord, FixedDelay, RateLimiter};
pub use crate::transcript::{TranscriptArtifact, TranscriptRecord};
pub use crate::youtube::{ChannelLister, ChannelResult, SubtitleFetcher, UrlExtractor, VideoRecord, YtDlp};
