use anyhow::{anyhow, bail, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use yt_fitness_analyzer::fitness::scorer::{format_keywords, save_results, write_report};
use yt_fitness_analyzer::processing::{
    finalize_channels, finalize_transcripts, read_url_list, ChannelJob, TranscriptJob,
};
use yt_fitness_analyzer::{
    BatchProcessor, ChannelLister, Config, FitnessVocabulary, KeywordScorer, SubtitleFetcher,
    TranscriptScanner, UrlExtractor, YtDlp,
};

fn cli() -> Command {
    Command::new("YouTube Fitness Analyzer")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Collect YouTube transcripts and rank them by fitness content")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("extract-urls")
                .about("Extract unique video URLs from a bookmark list")
                .arg(
                    Arg::new("input")
                        .value_name("FILE")
                        .default_value("Long bookmark list.txt")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .default_value("youtube_videos_only.txt")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("extract-channels")
                .about("List unique channel URLs found in a text file")
                .arg(
                    Arg::new("input")
                        .value_name("FILE")
                        .default_value("youtube channels.md")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Also write the channel URLs to this file")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("channels")
                .about("List every video of the channels mentioned in a text file")
                .arg(
                    Arg::new("input")
                        .value_name("FILE")
                        .default_value("youtube channels.md")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("max-videos")
                        .short('m')
                        .long("max-videos")
                        .value_name("NUM")
                        .help("Limit videos per channel (for testing)")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("delay")
                        .long("delay")
                        .value_name("SECONDS")
                        .help("Pause between channels")
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("output-dir")
                        .short('o')
                        .long("output-dir")
                        .value_name("DIR")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("transcripts")
                .about("Fetch English transcripts for a list of video URLs")
                .arg(
                    Arg::new("input")
                        .value_name("FILE")
                        .default_value("youtube_videos_only.txt")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("delay")
                        .short('d')
                        .long("delay")
                        .value_name("SECONDS")
                        .help("Pause between videos to avoid rate limiting")
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("output-dir")
                        .short('o')
                        .long("output-dir")
                        .value_name("DIR")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("score")
                .about("Rank downloaded transcripts by fitness keyword score")
                .arg(
                    Arg::new("transcripts-dir")
                        .value_name("DIR")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("min-score")
                        .short('s')
                        .long("min-score")
                        .value_name("NUM")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("output-dir")
                        .short('o')
                        .long("output-dir")
                        .value_name("DIR")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
}

fn path_arg(matches: &ArgMatches, name: &str) -> Result<PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .cloned()
        .ok_or_else(|| anyhow!("missing argument: {}", name))
}

/// Config plus the reason defaults were used, logged once tracing is up
fn load_config(matches: &ArgMatches) -> Result<(Config, Option<String>)> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => Ok((Config::from_file(path)?, None)),
        None => match Config::load() {
            Ok(config) => Ok((config, None)),
            Err(e) => Ok((Config::default(), Some(e.to_string()))),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let (mut config, fallback) = load_config(&matches)?;

    if matches.get_flag("verbose") {
        tracing_subscriber::fmt()
            .with_target(true)
            .with_env_filter("yt_fitness_analyzer=debug,info")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_target(false)
            .with_env_filter(format!("yt_fitness_analyzer={},warn", config.output.log_level))
            .init();
    }

    if let Some(reason) = fallback {
        warn!("Failed to load config, using defaults: {}", reason);
    }
    debug!("{}", config.summary());

    match matches.subcommand() {
        Some(("extract-urls", sub)) => extract_urls(sub).await,
        Some(("extract-channels", sub)) => extract_channels(sub).await,
        Some(("channels", sub)) => {
            if let Some(max) = sub.get_one::<usize>("max-videos") {
                config.batch.max_videos_per_channel = Some(*max);
            }
            if let Some(delay) = sub.get_one::<f64>("delay") {
                config.batch.channel_delay_secs = *delay;
            }
            if let Some(dir) = sub.get_one::<PathBuf>("output-dir") {
                config.output.channels_dir = dir.clone();
            }
            config.validate()?;
            run_channels(&config, &path_arg(sub, "input")?).await
        }
        Some(("transcripts", sub)) => {
            if let Some(delay) = sub.get_one::<f64>("delay") {
                config.batch.transcript_delay_secs = *delay;
            }
            if let Some(dir) = sub.get_one::<PathBuf>("output-dir") {
                config.output.transcripts_dir = dir.clone();
            }
            config.validate()?;
            run_transcripts(&config, &path_arg(sub, "input")?).await
        }
        Some(("score", sub)) => {
            if let Some(dir) = sub.get_one::<PathBuf>("transcripts-dir") {
                config.output.transcripts_dir = dir.clone();
            }
            if let Some(min_score) = sub.get_one::<usize>("min-score") {
                config.scoring.min_score = *min_score;
            }
            if let Some(dir) = sub.get_one::<PathBuf>("output-dir") {
                config.output.results_dir = dir.clone();
            }
            config.validate()?;
            run_score(&config).await
        }
        _ => bail!("no subcommand given"),
    }
}

async fn extract_urls(matches: &ArgMatches) -> Result<()> {
    let input = path_arg(matches, "input")?;
    let output = path_arg(matches, "output")?;

    let content = tokio::fs::read_to_string(&input).await?;
    let urls = UrlExtractor::videos().extract(&content);

    let mut listing = urls.join("\n");
    if !urls.is_empty() {
        listing.push('\n');
    }
    tokio::fs::write(&output, listing).await?;

    info!("✅ Extracted {} unique YouTube video URLs", urls.len());
    info!("💾 Saved to: {}", output.display());
    for url in urls.iter().take(5) {
        info!("   - {}", url);
    }
    Ok(())
}

async fn extract_channels(matches: &ArgMatches) -> Result<()> {
    let input = path_arg(matches, "input")?;
    let content = tokio::fs::read_to_string(&input).await?;
    let channels = UrlExtractor::channels().extract(&content);

    info!("📺 Found {} unique channels", channels.len());
    for channel in &channels {
        info!("   - {}", channel);
    }

    if let Some(output) = matches.get_one::<PathBuf>("output") {
        let listing: String = channels.iter().map(|c| format!("{}\n", c)).collect();
        tokio::fs::write(output, listing).await?;
        info!("💾 Saved to: {}", output.display());
    }
    Ok(())
}

async fn run_channels(config: &Config, input: &Path) -> Result<()> {
    let output_dir = &config.output.channels_dir;
    tokio::fs::create_dir_all(output_dir).await?;

    let content = tokio::fs::read_to_string(input).await?;
    let channels = UrlExtractor::channels().extract(&content);
    info!("📺 Found {} unique channels in {}", channels.len(), input.display());
    if let Some(max) = config.batch.max_videos_per_channel {
        info!("NOTE: Limiting to {} videos per channel", max);
    }

    let runner = Arc::new(YtDlp::new(config.ytdlp.binary.clone()));
    let lister = ChannelLister::new(runner, config.ytdlp.listing_timeout());
    let job = ChannelJob::new(
        lister,
        output_dir.clone(),
        config.batch.max_videos_per_channel,
    );

    let processor = BatchProcessor::with_delay(config.batch.channel_delay());
    let outcome = processor.run(&job, &channels).await?;
    finalize_channels(&outcome, output_dir).await?;
    outcome.log_summary("Channel");

    info!("💡 Next: fetch transcripts with");
    info!(
        "   yt-fitness-analyzer transcripts {}",
        output_dir.join("all_video_urls.txt").display()
    );
    Ok(())
}

async fn run_transcripts(config: &Config, input: &Path) -> Result<()> {
    let output_dir = &config.output.transcripts_dir;
    tokio::fs::create_dir_all(output_dir).await?;

    let urls = read_url_list(input).await?;
    info!("🎬 Processing {} videos using {}", urls.len(), config.ytdlp.binary.display());
    info!(
        "⏱️ Adding {}s delay between requests to avoid rate limiting",
        config.batch.transcript_delay_secs
    );

    let runner = Arc::new(YtDlp::new(config.ytdlp.binary.clone()));
    let fetcher = SubtitleFetcher::new(runner, &config.ytdlp);
    let job = TranscriptJob::new(fetcher, output_dir.clone());

    let processor = BatchProcessor::with_delay(config.batch.transcript_delay());
    let outcome = processor.run(&job, &urls).await?;
    finalize_transcripts(&outcome, output_dir).await?;
    outcome.log_summary("Transcript");
    Ok(())
}

async fn run_score(config: &Config) -> Result<()> {
    let transcripts_dir = &config.output.transcripts_dir;
    let scorer = KeywordScorer::new(&FitnessVocabulary::new())?;
    info!("📚 Fitness vocabulary loaded: {} keywords", scorer.keyword_count());

    let scanner = TranscriptScanner::new(scorer, config.scoring.top_keywords);
    let outcome = match scanner
        .scan_directory(transcripts_dir, config.scoring.min_score)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    if outcome.entries.is_empty() {
        info!("No fitness videos found!");
    } else {
        info!("🏆 Found {} fitness videos. Top 10 by fitness score:", outcome.entries.len());
        for (rank, entry) in outcome.entries.iter().take(10).enumerate() {
            info!("{}. Score: {:3} | {}", rank + 1, entry.fitness_score, entry.url);
            info!(
                "   Keywords: {}",
                format_keywords(&entry.top_keywords, config.scoring.report_keywords)
            );
        }
    }

    // Outputs are rewritten on every run, even when nothing qualifies

    let results_dir = &config.output.results_dir;
    tokio::fs::create_dir_all(results_dir).await?;
    save_results(&outcome.entries, &results_dir.join("fitness_videos.json")).await?;
    write_report(
        &outcome.entries,
        &results_dir.join("fitness_videos_report.txt"),
        config.scoring.report_keywords,
    )
    .await?;

    info!(
        "📊 Total fitness videos: {} out of {} total ({:.1}%)",
        outcome.entries.len(),
        outcome.scanned,
        outcome.qualifying_rate()
    );
    Ok(())
}
