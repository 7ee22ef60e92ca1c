use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the fitness transcript analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// External downloader settings
    pub ytdlp: YtDlpConfig,

    /// Batch runner settings
    pub batch: BatchConfig,

    /// Keyword scoring settings
    pub scoring: ScoringConfig,

    /// Output and storage settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YtDlpConfig {
    /// Path or name of the yt-dlp executable
    pub binary: PathBuf,

    /// Bounded wait for channel listing (seconds)
    pub listing_timeout_secs: u64,

    /// Bounded wait for a subtitle download (seconds)
    pub subtitle_timeout_secs: u64,

    /// Where subtitle files are written before being read back
    pub temp_dir: PathBuf,

    /// Language filter passed to `--sub-lang`
    pub subtitle_language: String,

    /// Locale suffixes probed after download, highest priority first
    pub subtitle_candidates: Vec<String>,

    /// Subtitle format passed to `--sub-format`
    pub subtitle_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Pause between transcript fetches (seconds)
    pub transcript_delay_secs: f64,

    /// Pause between channel listings (seconds)
    pub channel_delay_secs: f64,

    /// Optional cap on videos listed per channel
    pub max_videos_per_channel: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Minimum total keyword count for a transcript to qualify
    pub min_score: usize,

    /// Keywords retained per qualifying transcript
    pub top_keywords: usize,

    /// Keywords shown per entry in the text report
    pub report_keywords: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Per-video transcript artifacts
    pub transcripts_dir: PathBuf,

    /// Channel listing outputs
    pub channels_dir: PathBuf,

    /// Scorer outputs
    pub results_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl YtDlpConfig {
    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub fn subtitle_timeout(&self) -> Duration {
        Duration::from_secs(self.subtitle_timeout_secs)
    }
}

impl BatchConfig {
    pub fn transcript_delay(&self) -> Duration {
        Duration::from_secs_f64(self.transcript_delay_secs)
    }

    pub fn channel_delay(&self) -> Duration {
        Duration::from_secs_f64(self.channel_delay_secs)
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            Path::new("yt-fitness-analyzer.toml"),
            Path::new("config/yt-fitness-analyzer.toml"),
        ];

        if let Some(config) = Self::load_first(&config_paths)? {
            return Ok(config);
        }

        if Self::has_env_overrides() {
            return Self::from_env();
        }

        Err(anyhow!("No configuration file found"))
    }

    /// First existing file among `paths`; a file that exists but does not
    /// parse is an error rather than a silent skip
    fn load_first(paths: &[&Path]) -> Result<Option<Self>> {
        for path in paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                let config = toml::from_str(&config_str)
                    .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
                tracing::info!("📄 Loaded configuration from: {}", path.display());
                return Ok(Some(config));
            }
        }
        Ok(None)
    }

    /// Load configuration from an explicit file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config {}: {}", path.display(), e))?;
        let config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    fn has_env_overrides() -> bool {
        [
            "YT_FITNESS_YTDLP",
            "YT_FITNESS_DELAY",
            "YT_FITNESS_MIN_SCORE",
            "YT_FITNESS_TRANSCRIPTS_DIR",
            "YT_FITNESS_LOG_LEVEL",
        ]
        .iter()
        .any(|key| std::env::var(key).is_ok())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(binary) = std::env::var("YT_FITNESS_YTDLP") {
            config.ytdlp.binary = PathBuf::from(binary);
        }

        if let Ok(delay) = std::env::var("YT_FITNESS_DELAY") {
            config.batch.transcript_delay_secs = delay
                .parse()
                .map_err(|e| anyhow!("Invalid YT_FITNESS_DELAY '{}': {}", delay, e))?;
        }

        if let Ok(min_score) = std::env::var("YT_FITNESS_MIN_SCORE") {
            config.scoring.min_score = min_score
                .parse()
                .map_err(|e| anyhow!("Invalid YT_FITNESS_MIN_SCORE '{}': {}", min_score, e))?;
        }

        if let Ok(dir) = std::env::var("YT_FITNESS_TRANSCRIPTS_DIR") {
            config.output.transcripts_dir = PathBuf::from(dir);
        }

        if let Ok(log_level) = std::env::var("YT_FITNESS_LOG_LEVEL") {
            config.output.log_level = log_level;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.ytdlp.listing_timeout_secs == 0 || self.ytdlp.subtitle_timeout_secs == 0 {
            return Err(anyhow!("yt-dlp timeouts must be greater than 0"));
        }

        if self.ytdlp.subtitle_candidates.is_empty() {
            return Err(anyhow!("at least one subtitle candidate suffix is required"));
        }

        for delay in [self.batch.transcript_delay_secs, self.batch.channel_delay_secs] {
            if Duration::try_from_secs_f64(delay).is_err() {
                return Err(anyhow!("batch delays must be non-negative seconds in range, got {}", delay));
            }
        }

        if self.scoring.top_keywords == 0 {
            return Err(anyhow!("top_keywords must be greater than 0"));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Analyzer Configuration:\n\
            - yt-dlp: {}\n\
            - Timeouts: listing {}s, subtitles {}s\n\
            - Subtitle candidates: {}\n\
            - Transcript delay: {}s\n\
            - Minimum fitness score: {}\n\
            - Transcripts directory: {}",
            self.ytdlp.binary.display(),
            self.ytdlp.listing_timeout_secs,
            self.ytdlp.subtitle_timeout_secs,
            self.ytdlp.subtitle_candidates.join(", "),
            self.batch.transcript_delay_secs,
            self.scoring.min_score,
            self.output.transcripts_dir.display(),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ytdlp: YtDlpConfig {
                binary: PathBuf::from("yt-dlp"),
                listing_timeout_secs: 120,
                subtitle_timeout_secs: 30,
                temp_dir: std::env::temp_dir(),
                subtitle_language: "en".to_string(),
                subtitle_candidates: vec![
                    "en".to_string(),
                    "en-US".to_string(),
                    "en-GB".to_string(),
                ],
                subtitle_format: "json3".to_string(),
            },
            batch: BatchConfig {
                transcript_delay_secs: 1.0,
                channel_delay_secs: 0.0,
                max_videos_per_channel: None,
            },
            scoring: ScoringConfig {
                min_score: 5,
                top_keywords: 10,
                report_keywords: 5,
            },
            output: OutputConfig {
                transcripts_dir: PathBuf::from("transcripts"),
                channels_dir: PathBuf::from("channel_videos"),
                results_dir: PathBuf::from("."),
                log_level: "info".to_string(),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_ytdlp_binary(mut self, binary: PathBuf) -> Self {
        self.config.ytdlp.binary = binary;
        self
    }

    pub fn with_temp_dir(mut self, dir: PathBuf) -> Self {
        self.config.ytdlp.temp_dir = dir;
        self
    }

    pub fn with_transcript_delay(mut self, secs: f64) -> Self {
        self.config.batch.transcript_delay_secs = secs;
        self
    }

    pub fn with_max_videos(mut self, max_videos: Option<usize>) -> Self {
        self.config.batch.max_videos_per_channel = max_videos;
        self
    }

    pub fn with_min_score(mut self, min_score: usize) -> Self {
        self.config.scoring.min_score = min_score;
        self
    }

    pub fn with_transcripts_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.transcripts_dir = dir;
        self
    }

    pub fn with_channels_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.channels_dir = dir;
        self
    }

    pub fn with_results_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.results_dir = dir;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ytdlp.listing_timeout_secs, 120);
        assert_eq!(config.ytdlp.subtitle_timeout_secs, 30);
        assert_eq!(config.ytdlp.subtitle_candidates, vec!["en", "en-US", "en-GB"]);
        assert_eq!(config.scoring.min_score, 5);
        assert_eq!(config.batch.transcript_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_transcript_delay(0.0)
            .with_max_videos(Some(25))
            .with_min_score(8)
            .build();

        assert_eq!(config.batch.transcript_delay(), Duration::ZERO);
        assert_eq!(config.batch.max_videos_per_channel, Some(25));
        assert_eq!(config.scoring.min_score, 8);
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.batch.transcript_delay_secs = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.ytdlp.subtitle_candidates.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_keeps_candidate_order() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.ytdlp.subtitle_candidates, config.ytdlp.subtitle_candidates);
    }

    #[test]
    fn test_save_then_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("analyzer.toml");

        let config = ConfigBuilder::new().with_min_score(12).build();
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.scoring.min_score, 12);
        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_validation_rejects_out_of_range_delay() {
        let config = ConfigBuilder::new().with_transcript_delay(1e30).build();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.batch.channel_delay_secs = f64::NAN;
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new().with_transcript_delay(86_400.0).build();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch.transcript_delay(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_broken_config_file_reports_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let broken = dir.path().join("broken.toml");
        let valid = dir.path().join("valid.toml");
        std::fs::write(&broken, "[scoring\nmin_score = ").unwrap();
        Config::default().save(valid.to_str().unwrap()).unwrap();

        let err = Config::load_first(&[broken.as_path(), valid.as_path()]).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
        assert!(err.to_string().contains("broken.toml"));

        let missing = dir.path().join("missing.toml");
        assert!(Config::load_first(&[missing.as_path()]).unwrap().is_none());
        let loaded = Config::load_first(&[missing.as_path(), valid.as_path()]).unwrap();
        assert_eq!(loaded.unwrap().scoring.min_score, 5);
    }

    #[test]
    fn test_from_env_overrides() {
        std::env::set_var("YT_FITNESS_MIN_SCORE", "9");
        std::env::set_var("YT_FITNESS_DELAY", "2.5");
        std::env::set_var("YT_FITNESS_TRANSCRIPTS_DIR", "/data/transcripts");

        let config = Config::from_env().unwrap();
        assert_eq!(config.scoring.min_score, 9);
        assert_eq!(config.batch.transcript_delay(), Duration::from_millis(2500));
        assert_eq!(config.output.transcripts_dir, PathBuf::from("/data/transcripts"));
        assert!(Config::has_env_overrides());

        std::env::set_var("YT_FITNESS_DELAY", "soon");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("YT_FITNESS_DELAY"));

        std::env::set_var("YT_FITNESS_DELAY", "1");
        std::env::set_var("YT_FITNESS_MIN_SCORE", "-3");
        assert!(Config::from_env().is_err());

        for key in ["YT_FITNESS_MIN_SCORE", "YT_FITNESS_DELAY", "YT_FITNESS_TRANSCRIPTS_DIR"] {
            std::env::remove_var(key);
        }
    }
}
