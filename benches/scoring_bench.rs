use criterion::{black_box, criterion_group, criterion_main, Criterion};
use yt_fitness_analyzer::fitness::scorer::render_report;
use yt_fitness_analyzer::transcript::separator;
use yt_fitness_analyzer::{FitnessVocabulary, KeywordScorer, TranscriptArtifact, UrlExtractor};

fn sample_transcript(words: usize) -> String {
    let filler = [
        "today", "we", "squat", "with", "a", "barbell", "then", "some", "deadlift", "sets",
        "and", "finish", "with", "a", "plank", "for", "core", "strength", "bench", "press",
    ];
    (0..words).map(|i| filler[i % filler.len()]).collect::<Vec<_>>().join(" ")
}

fn bench_vocabulary(c: &mut Criterion) {
    c.bench_function("vocabulary_creation", |b| {
        b.iter(|| black_box(FitnessVocabulary::new()))
    });

    let vocabulary = FitnessVocabulary::new();
    c.bench_function("scorer_compilation", |b| {
        b.iter(|| black_box(KeywordScorer::new(&vocabulary).unwrap()))
    });
}

fn bench_scoring(c: &mut Criterion) {
    let scorer = KeywordScorer::new(&FitnessVocabulary::new()).unwrap();
    let short = sample_transcript(500);
    let long = sample_transcript(20_000);

    c.bench_function("score_short_transcript", |b| {
        b.iter(|| black_box(scorer.score(black_box(&short))))
    });

    c.bench_function("score_long_transcript", |b| {
        b.iter(|| black_box(scorer.score(black_box(&long))))
    });

    let file = format!(
        "Video ID: abc\nURL: https://www.youtube.com/watch?v=abc\nLanguage: en\nMethod: yt-dlp\n\n{}\n\n{}",
        separator(),
        long
    );
    c.bench_function("parse_artifact", |b| {
        b.iter(|| black_box(TranscriptArtifact::parse("abc.txt", black_box(&file))))
    });

    let matches = scorer.score(&long);
    let entries: Vec<_> = (0..200)
        .map(|i| yt_fitness_analyzer::FitnessScoreEntry {
            video_id: format!("vid{}", i),
            url: format!("https://www.youtube.com/watch?v=vid{}", i),
            filename: format!("vid{}.txt", i),
            fitness_score: matches.total,
            top_keywords: matches.top(10),
        })
        .collect();
    c.bench_function("render_report", |b| {
        b.iter(|| black_box(render_report(black_box(&entries), 5)))
    });
}

fn bench_url_extraction(c: &mut Criterion) {
    let text: String = (0..1000)
        .map(|i| format!("- bookmark {} https://www.youtube.com/watch?v=id{}&ab_channel=x\n", i, i % 300))
        .collect();
    let extractor = UrlExtractor::videos();

    c.bench_function("extract_video_urls", |b| {
        b.iter(|| black_box(extractor.extract(black_box(&text))))
    });
}

criterion_group!(benches, bench_vocabulary, bench_scoring, bench_url_extraction);
criterion_main!(benches);
