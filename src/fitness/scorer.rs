use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::FitnessVocabulary;
use crate::error::{PipelineError, Result};
use crate::transcript::{separator, TranscriptArtifact};

/// Per-keyword counts for one text; keywords with no match are absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordMatches {
    pub total: usize,
    pub matches: BTreeMap<String, usize>,
}

impl KeywordMatches {
    /// The `n` most frequent keywords; equal counts keep alphabetical order
    pub fn top(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self
            .matches
            .iter()
            .map(|(keyword, count)| (keyword.clone(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

/// A transcript that reached the score threshold
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FitnessScoreEntry {
    pub video_id: String,
    pub url: String,
    pub filename: String,
    pub fitness_score: usize,
    pub top_keywords: Vec<(String, usize)>,
}

/// Counts whole-word, case-insensitive keyword occurrences
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    patterns: Vec<(String, Regex)>,
}

impl KeywordScorer {
    pub fn new(vocabulary: &FitnessVocabulary) -> Result<Self> {
        let patterns = vocabulary
            .keywords()
            .into_iter()
            .map(|keyword| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(&keyword));
                Regex::new(&pattern)
                    .map(|re| (keyword, re))
                    .map_err(|e| PipelineError::Parse(format!("keyword pattern: {}", e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn keyword_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn score(&self, text: &str) -> KeywordMatches {
        let mut result = KeywordMatches::default();
        for (keyword, re) in &self.patterns {
            let count = re.find_iter(text).count();
            if count > 0 {
                result.matches.insert(keyword.clone(), count);
                result.total += count;
            }
        }
        result
    }
}

/// Result of scanning a transcripts directory
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Transcript artifacts that were scored
    pub scanned: usize,
    /// Qualifying transcripts, highest score first
    pub entries: Vec<FitnessScoreEntry>,
}

impl ScanOutcome {
    pub fn qualifying_rate(&self) -> f64 {
        if self.scanned > 0 {
            self.entries.len() as f64 / self.scanned as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Scores every transcript artifact in a directory against the vocabulary
#[derive(Debug, Clone)]
pub struct TranscriptScanner {
    scorer: KeywordScorer,
    top_keywords: usize,
}

impl TranscriptScanner {
    pub fn new(scorer: KeywordScorer, top_keywords: usize) -> Self {
        Self { scorer, top_keywords }
    }

    /// Transcript files directly inside `dir`, in file-name order
    fn transcript_files(dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().map_or(false, |ext| ext == "txt"))
            .collect()
    }

    pub async fn scan_directory(&self, dir: &Path, min_score: usize) -> Result<ScanOutcome> {
        if !dir.is_dir() {
            return Err(PipelineError::DirectoryNotFound(dir.to_path_buf()));
        }

        info!("🔍 Scanning {} (minimum fitness score {})", dir.display(), min_score);

        let files = Self::transcript_files(dir);
        if files.is_empty() {
            warn!("No transcript files found in {}", dir.display());
            return Ok(ScanOutcome::default());
        }

        let mut outcome = ScanOutcome::default();
        for path in files {
            let artifact = match TranscriptArtifact::load(&path).await {
                Ok(artifact) => artifact,
                Err(e) => {
                    warn!("Error loading {}: {}", path.display(), e);
                    continue;
                }
            };

            if !artifact.has_header() {
                debug!("Skipping {}: no transcript header", path.display());
                continue;
            }
            outcome.scanned += 1;

            if let Some(entry) = self.score_artifact(&artifact, min_score) {
                outcome.entries.push(entry);
            }
        }

        // Stable: equal scores keep file-name order
        outcome.entries.sort_by(|a, b| b.fitness_score.cmp(&a.fitness_score));

        info!(
            "🏋️ {} of {} transcripts reached the threshold",
            outcome.entries.len(),
            outcome.scanned
        );
        Ok(outcome)
    }

    /// Score one artifact; `None` when it stays below `min_score`
    pub fn score_artifact(
        &self,
        artifact: &TranscriptArtifact,
        min_score: usize,
    ) -> Option<FitnessScoreEntry> {
        let matches = self.scorer.score(&artifact.body);
        if matches.total < min_score {
            return None;
        }

        Some(FitnessScoreEntry {
            video_id: artifact.video_id.clone(),
            url: artifact.url.clone(),
            filename: artifact.filename.clone(),
            fitness_score: matches.total,
            top_keywords: matches.top(self.top_keywords),
        })
    }

    pub fn scorer(&self) -> &KeywordScorer {
        &self.scorer
    }
}

pub fn format_keywords(keywords: &[(String, usize)], limit: usize) -> String {
    keywords
        .iter()
        .take(limit)
        .map(|(keyword, count)| format!("{}({})", keyword, count))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Save ranked entries as pretty JSON
pub async fn save_results(entries: &[FitnessScoreEntry], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)?;
    tokio::fs::write(path, json).await?;
    info!("💾 Results saved to: {}", path.display());
    Ok(())
}

pub fn render_report(entries: &[FitnessScoreEntry], report_keywords: usize) -> String {
    let rule = separator();
    let mut report = format!("{}\nFITNESS VIDEOS FOUND: {}\n{}\n\n", rule, entries.len(), rule);

    for (rank, entry) in entries.iter().enumerate() {
        report.push_str(&format!("{}. VIDEO ID: {}\n", rank + 1, entry.video_id));
        report.push_str(&format!("   URL: {}\n", entry.url));
        report.push_str(&format!("   Fitness Score: {}\n", entry.fitness_score));
        report.push_str(&format!(
            "   Top Keywords: {}\n\n",
            format_keywords(&entry.top_keywords, report_keywords)
        ));
    }

    report
}

pub async fn write_report(
    entries: &[FitnessScoreEntry],
    path: &Path,
    report_keywords: usize,
) -> Result<()> {
    tokio::fs::write(path, render_report(entries, report_keywords)).await?;
    info!("📝 Readable report saved to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptRecord;
    use crate::youtube::Transcript;
    use tempfile::TempDir;

    fn scorer(terms: &[&str]) -> KeywordScorer {
        KeywordScorer::new(&FitnessVocabulary::from_terms(terms)).unwrap()
    }

    fn artifact(text: &str) -> TranscriptArtifact {
        TranscriptArtifact::parse("vid.txt", &format!("Video ID: vid\nURL: u\n\n{}\n\n{}", separator(), text))
    }

    async fn write_transcript(dir: &Path, id: &str, text: &str) {
        let record = TranscriptRecord::new(
            id,
            &crate::youtube::watch_url(id),
            Transcript {
                text: text.to_string(),
                language: "en".to_string(),
                method: "yt-dlp".to_string(),
            },
        );
        record.write_to_dir(dir).await.unwrap();
    }

    #[test]
    fn test_word_boundaries_and_case() {
        let scorer = scorer(&["squat"]);

        assert_eq!(scorer.score("squatting all day").total, 0);
        assert_eq!(scorer.score("Squat, then SQUAT again").total, 2);
    }

    #[test]
    fn test_multi_word_keywords() {
        let scorer = scorer(&["bench press", "press"]);
        let matches = scorer.score("bench press then overhead press");

        assert_eq!(matches.matches.get("bench press"), Some(&1));
        assert_eq!(matches.matches.get("press"), Some(&2));
        assert_eq!(matches.total, 3);
    }

    #[test]
    fn test_zero_count_keywords_are_absent() {
        let matches = scorer(&["squat", "yoga"]).score("squat");
        assert!(!matches.matches.contains_key("yoga"));
    }

    #[test]
    fn test_threshold() {
        let scanner = TranscriptScanner::new(scorer(&["squat", "deadlift"]), 10);
        let artifact = artifact("squat squat squat and deadlift deadlift");

        let entry = scanner.score_artifact(&artifact, 5).unwrap();
        assert_eq!(entry.fitness_score, 5);
        assert_eq!(
            entry.top_keywords,
            vec![("squat".to_string(), 3), ("deadlift".to_string(), 2)]
        );
        assert!(scanner.score_artifact(&artifact, 6).is_none());
    }

    #[test]
    fn test_top_keywords_limited() {
        let terms: Vec<String> = (0..15).map(|i| format!("kw{}", i)).collect();
        let scorer = KeywordScorer::new(&FitnessVocabulary::from_terms(&terms)).unwrap();
        let text = terms.join(" ");

        let matches = scorer.score(&text);
        assert_eq!(matches.total, 15);
        assert_eq!(matches.top(10).len(), 10);
    }

    #[tokio::test]
    async fn test_scan_directory_ranks_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        write_transcript(dir.path(), "low", "squat squat squat squat squat").await;
        write_transcript(dir.path(), "high", "squat deadlift squat deadlift squat deadlift").await;
        write_transcript(dir.path(), "none", "a cooking show about bread").await;
        tokio::fs::write(dir.path().join("notes.txt"), "squat squat squat squat squat squat")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("failed.json"), "[]").await.unwrap();

        let scanner = TranscriptScanner::new(scorer(&["squat", "deadlift"]), 10);
        let first = scanner.scan_directory(dir.path(), 5).await.unwrap();

        assert_eq!(first.scanned, 3);
        let ids: Vec<&str> = first.entries.iter().map(|e| e.video_id.as_str()).collect();
        assert_eq!(ids, vec!["high", "low"]);
        assert_eq!(first.entries[0].filename, "high.txt");
        assert_eq!(first.entries[0].url, "https://www.youtube.com/watch?v=high");

        let second = scanner.scan_directory(dir.path(), 5).await.unwrap();
        assert_eq!(first.entries, second.entries);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let scanner = TranscriptScanner::new(scorer(&["squat"]), 10);
        let result = scanner.scan_directory(&dir.path().join("missing"), 5).await;
        assert!(matches!(result, Err(PipelineError::DirectoryNotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_directory_is_empty_result() {
        let dir = TempDir::new().unwrap();
        let scanner = TranscriptScanner::new(scorer(&["squat"]), 10);

        let outcome = scanner.scan_directory(dir.path(), 5).await.unwrap();
        assert_eq!(outcome.scanned, 0);
        assert!(outcome.entries.is_empty());
        assert_eq!(outcome.qualifying_rate(), 0.0);
    }

    #[tokio::test]
    async fn test_only_headerless_files_scans_nothing() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(
            dir.path().join("transcript_report.txt"),
            "squat squat squat squat squat squat\nStatus: OK - 36 chars\n",
        )
        .await
        .unwrap();

        let scanner = TranscriptScanner::new(scorer(&["squat"]), 10);
        let outcome = scanner.scan_directory(dir.path(), 5).await.unwrap();
        assert_eq!(outcome.scanned, 0);
        assert!(outcome.entries.is_empty());
    }

    #[test]
    fn test_report_lists_top_five_keywords() {
        let entry = FitnessScoreEntry {
            video_id: "abc".to_string(),
            url: "https://www.youtube.com/watch?v=abc".to_string(),
            filename: "abc.txt".to_string(),
            fitness_score: 21,
            top_keywords: (1..=6).rev().map(|n| (format!("k{}", n), n)).collect(),
        };

        let report = render_report(&[entry], 5);
        assert!(report.contains("FITNESS VIDEOS FOUND: 1"));
        assert!(report.contains("1. VIDEO ID: abc"));
        assert!(report.contains("   Fitness Score: 21"));
        assert!(report.contains("Top Keywords: k6(6), k5(5), k4(4), k3(3), k2(2)\n"));
        assert!(!report.contains("k1(1)"));
    }
}
