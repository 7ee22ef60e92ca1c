use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tracing::info;
use yt_fitness_analyzer::fitness::scorer::format_keywords;
use yt_fitness_analyzer::{Config, FitnessVocabulary, KeywordScorer, TranscriptArtifact, YtDlp};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("yt_fitness_analyzer=info,score_transcript=info")
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("usage: score-transcript <TRANSCRIPT.txt>"))?;

    let config = Config::load().unwrap_or_default();

    // yt-dlp is only needed for fetching, but report it so setup problems surface early
    match YtDlp::new(config.ytdlp.binary.clone()).check_availability().await {
        Ok(version) => info!("✅ {}", version),
        Err(e) => info!("⚠️ yt-dlp not usable ({}); scoring only", e),
    }

    let vocabulary = FitnessVocabulary::new();
    let scorer = KeywordScorer::new(&vocabulary)?;
    info!("📚 {} fitness keywords loaded", scorer.keyword_count());

    let artifact = TranscriptArtifact::load(&path).await?;
    let matches = scorer.score(&artifact.body);

    info!("🎬 {} ({})", artifact.video_id, artifact.url);
    info!("🏋️ Fitness score: {}", matches.total);
    info!(
        "   Qualifies at threshold {}: {}",
        config.scoring.min_score,
        matches.total >= config.scoring.min_score
    );
    info!(
        "   Top keywords: {}",
        format_keywords(&matches.top(config.scoring.top_keywords), config.scoring.top_keywords)
    );

    Ok(())
}
