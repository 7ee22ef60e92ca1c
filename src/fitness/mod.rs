/// Fitness keyword scoring over downloaded transcripts

pub mod dictionary;
pub mod scorer;

// Re-export main types
pub use dictionary::{FitnessTermCategory, FitnessVocabulary};
pub use scorer::{FitnessScoreEntry, KeywordMatches, KeywordScorer, ScanOutcome, TranscriptScanner};
