use std::path::PathBuf;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error types raised while enumerating channels, fetching transcripts or scoring them.
///
/// The `Display` text of each variant is what ends up in `failed.json`, so it is
/// kept short and stable.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// URL or identifier could not be resolved; no external call was made
    #[error("Invalid URL")]
    InvalidInput(String),

    #[error("Timeout after {secs}s waiting for {tool}")]
    Timeout { tool: String, secs: u64 },

    /// Non-zero exit; carries the tool's stderr verbatim
    #[error("{stderr}")]
    ToolFailed { code: Option<i32>, stderr: String },

    /// Expected outcome for videos without English captions
    #[error("No subtitles found")]
    NoSubtitles,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Whether the failure is the normal "nothing to fetch" case rather than a tool problem
    pub fn is_expected_absence(&self) -> bool {
        matches!(self, PipelineError::NoSubtitles)
    }
}
