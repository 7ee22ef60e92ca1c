use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Keyword categories for the fitness vocabulary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FitnessTermCategory {
    ExerciseTypes,
    BodyParts,
    Movements,
    Equipment,
    TrainingConcepts,
    BodyComposition,
    Disciplines,
    HealthPerformance,
    Custom,
}

/// Immutable keyword vocabulary used by the scorer
///
/// Keywords are stored lowercased; multi-word phrases are allowed. A keyword
/// listed under several categories is scored once.
#[derive(Debug, Clone)]
pub struct FitnessVocabulary {
    terms: BTreeMap<FitnessTermCategory, Vec<String>>,
}

impl FitnessVocabulary {
    /// The built-in fitness vocabulary
    pub fn new() -> Self {
        let mut terms = BTreeMap::new();

        terms.insert(
            FitnessTermCategory::ExerciseTypes,
            vec!["workout", "exercise", "training", "fitness", "gym"],
        );
        terms.insert(
            FitnessTermCategory::BodyParts,
            vec![
                "muscle", "chest", "back", "legs", "arms", "shoulders", "biceps", "triceps",
                "abs", "core", "glutes", "hamstrings", "quadriceps", "calves", "lats", "delts",
                "pecs",
            ],
        );
        terms.insert(
            FitnessTermCategory::Movements,
            vec![
                "squat", "deadlift", "bench press", "push up", "pull up", "curl", "press",
                "row", "lunge", "plank", "crunch", "burpee", "jump", "sprint", "cardio", "hiit",
            ],
        );
        terms.insert(
            FitnessTermCategory::Equipment,
            vec![
                "dumbbell", "barbell", "kettlebell", "weight", "resistance", "cable", "machine",
                "bodyweight", "calisthenics",
            ],
        );
        terms.insert(
            FitnessTermCategory::TrainingConcepts,
            vec![
                "reps", "sets", "repetitions", "strength", "hypertrophy", "endurance",
                "conditioning", "mobility", "flexibility", "stretching", "recovery", "rest day",
                "progressive overload",
            ],
        );
        terms.insert(
            FitnessTermCategory::BodyComposition,
            vec![
                "muscle gain", "fat loss", "cutting", "bulking", "lean", "body composition",
                "physique", "shredded", "jacked",
            ],
        );
        terms.insert(
            FitnessTermCategory::Disciplines,
            vec![
                "powerlifting", "bodybuilding", "crossfit", "olympic lifting", "martial arts",
                "boxing", "mma", "wrestling", "jiu jitsu", "yoga", "pilates", "running",
                "cycling", "swimming",
            ],
        );
        terms.insert(
            FitnessTermCategory::HealthPerformance,
            vec![
                "nutrition", "protein", "calories", "diet", "supplements", "performance",
                "athletic", "athlete", "sports",
            ],
        );

        Self {
            terms: terms
                .into_iter()
                .map(|(category, words)| {
                    (category, words.into_iter().map(String::from).collect())
                })
                .collect(),
        }
    }

    /// A vocabulary made of arbitrary terms, filed under `Custom`
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        let mut map = BTreeMap::new();
        map.insert(FitnessTermCategory::Custom, words);
        Self { terms: map }
    }

    /// Terms in one category
    pub fn get_terms(&self, category: FitnessTermCategory) -> &[String] {
        self.terms.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every distinct keyword, sorted
    pub fn keywords(&self) -> Vec<String> {
        self.terms
            .values()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.terms.values().flatten().any(|t| *t == term)
    }

    pub fn len(&self) -> usize {
        self.keywords().len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.values().all(Vec::is_empty)
    }
}

impl Default for FitnessVocabulary {
    fn default() -> Self {
        Self::new()
    }
}
