use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

/// Captured result of one external tool invocation
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub success: bool,
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Seam between the pipeline and the external downloader process
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run the tool with `args`, giving up once `timeout` has elapsed
    async fn run(&self, args: &[String], timeout: Duration) -> Result<ToolOutput>;
}

/// Runs the real `yt-dlp` executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Report the installed version, failing if the binary cannot be run
    pub async fn check_availability(&self) -> Result<String> {
        let output = self
            .run(&["--version".to_string()], Duration::from_secs(10))
            .await?;

        if !output.success {
            return Err(PipelineError::ToolFailed {
                code: output.status_code,
                stderr: output.stderr,
            });
        }
        Ok(format!("{} {}", self.binary.display(), output.stdout.trim()))
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait]
impl ToolRunner for YtDlp {
    async fn run(&self, args: &[String], timeout: Duration) -> Result<ToolOutput> {
        debug!("Running {} {}", self.binary.display(), args.join(" "));
        let start_time = Instant::now();

        let child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                warn!(
                    "⏰ {} timed out after {:.1}s",
                    self.binary.display(),
                    start_time.elapsed().as_secs_f64()
                );
                return Err(PipelineError::Timeout {
                    tool: self.binary.display().to_string(),
                    secs: timeout.as_secs(),
                });
            }
        };

        debug!(
            "{} exited with {} in {:.2}s",
            self.binary.display(),
            output.status,
            start_time.elapsed().as_secs_f64()
        );

        Ok(ToolOutput {
            success: output.status.success(),
            status_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_io_error() {
        let tool = YtDlp::new("definitely-not-a-real-yt-dlp-binary");
        let result = tool.run(&[], Duration::from_secs(1)).await;
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_exit_status_and_output() {
        let tool = YtDlp::new("sh");
        let args = vec!["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()];
        let output = tool.run(&args, Duration::from_secs(5)).await.unwrap();

        assert!(!output.success);
        assert_eq!(output.status_code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        let tool = YtDlp::new("sleep");
        let result = tool.run(&["5".to_string()], Duration::from_millis(100)).await;
        assert!(matches!(result, Err(PipelineError::Timeout { .. })));
    }
}
