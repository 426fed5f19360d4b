//! On-disk interview question bank.
//!
//! One JSON file per technical domain (`python.json`, `java.json`, ...),
//! each mapping a level name to an array of question records. The whole
//! bank is loaded at startup; lookups never touch the filesystem.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use mockmate_models::{Question, QuestionLevel};
use rand::seq::IndexedRandom;
use thiserror::Error;
use tracing::info;

/// Startup loading failures.
#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("failed to read question bank: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid question file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown question level {level:?} in {path}")]
    UnknownLevelName { path: String, level: String },
}

/// Request-time lookup failures. The display strings are the response
/// bodies the interview client already matches on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionLookupError {
    #[error("There is no such question category")]
    UnknownDomain,

    #[error("There is no such question level!!")]
    UnknownLevel,
}

#[derive(Debug)]
pub struct QuestionBank {
    domains: HashMap<String, HashMap<QuestionLevel, Vec<Question>>>,
}

impl QuestionBank {
    /// Load every `*.json` file under `dir`; the file stem is the domain
    /// name. Malformed files fail the whole load.
    pub fn load(dir: &Path) -> Result<Self, QuestionBankError> {
        let mut domains = HashMap::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(domain) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let raw = fs::read_to_string(&path)?;
            let by_level: HashMap<String, Vec<Question>> =
                serde_json::from_str(&raw).map_err(|source| QuestionBankError::Parse {
                    path: path.display().to_string(),
                    source,
                })?;

            let mut levels = HashMap::new();
            let mut total = 0;
            for (name, questions) in by_level {
                let level: QuestionLevel =
                    name.parse()
                        .map_err(|_| QuestionBankError::UnknownLevelName {
                            path: path.display().to_string(),
                            level: name.clone(),
                        })?;
                total += questions.len();
                levels.insert(level, questions);
            }

            info!("Loaded {} questions for domain {}", total, domain);
            domains.insert(domain.to_lowercase(), levels);
        }

        Ok(Self { domains })
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    /// Draw up to `count` questions for `domain`/`level`, uniformly and
    /// without replacement. A pool smaller than `count` is returned whole.
    pub fn sample(
        &self,
        domain: &str,
        level: &str,
        count: usize,
    ) -> Result<Vec<Question>, QuestionLookupError> {
        let levels = self
            .domains
            .get(&domain.to_lowercase())
            .ok_or(QuestionLookupError::UnknownDomain)?;

        let level: QuestionLevel = level.parse().map_err(|_| QuestionLookupError::UnknownLevel)?;
        let pool = levels.get(&level).ok_or(QuestionLookupError::UnknownLevel)?;

        let mut rng = rand::rng();
        Ok(pool
            .choose_multiple(&mut rng, count.min(pool.len()))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn write_python_bank(dir: &Path) {
        let body = r#"{
            "beginner": [
                {"question_id": 1, "question_level": "beginner", "question": "What is a list", "keypoints": ["ordered", "mutable"], "possible_answers": []},
                {"question_id": 2, "question_level": "beginner", "question": "What is a dict", "keypoints": ["mapping"], "possible_answers": []},
                {"question_id": 3, "question_level": "beginner", "question": "What is a tuple", "keypoints": ["immutable"], "possible_answers": []}
            ],
            "intermediate": [
                {"question_id": 4, "question_level": "intermediate", "question": "Explain decorators", "keypoints": ["wrapper", "function"], "possible_answers": []}
            ],
            "advanced": []
        }"#;
        fs::write(dir.join("python.json"), body).unwrap();
    }

    #[test]
    fn test_sample_draws_without_replacement() {
        let dir = tempfile::tempdir().unwrap();
        write_python_bank(dir.path());
        let bank = QuestionBank::load(dir.path()).unwrap();

        let drawn = bank.sample("python", "beginner", 2).unwrap();
        assert_eq!(drawn.len(), 2);
        let ids: HashSet<u32> = drawn.iter().map(|q| q.question_id).collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_small_pool_is_returned_whole() {
        let dir = tempfile::tempdir().unwrap();
        write_python_bank(dir.path());
        let bank = QuestionBank::load(dir.path()).unwrap();

        let drawn = bank.sample("python", "intermediate", 50).unwrap();
        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].question_id, 4);
    }

    #[test]
    fn test_domain_lookup_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        write_python_bank(dir.path());
        let bank = QuestionBank::load(dir.path()).unwrap();

        assert!(bank.sample("Python", "beginner", 1).is_ok());
    }

    #[test]
    fn test_unknown_domain_error_text() {
        let dir = tempfile::tempdir().unwrap();
        write_python_bank(dir.path());
        let bank = QuestionBank::load(dir.path()).unwrap();

        let err = bank.sample("golf", "beginner", 1).unwrap_err();
        assert_eq!(err.to_string(), "There is no such question category");
    }

    #[test]
    fn test_unknown_level_error_text() {
        let dir = tempfile::tempdir().unwrap();
        write_python_bank(dir.path());
        let bank = QuestionBank::load(dir.path()).unwrap();

        let err = bank.sample("python", "expert", 1).unwrap_err();
        assert_eq!(err.to_string(), "There is no such question level!!");
    }

    #[test]
    fn test_malformed_file_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("java.json"), "{not json").unwrap();

        let err = QuestionBank::load(dir.path()).unwrap_err();
        assert!(matches!(err, QuestionBankError::Parse { .. }));
    }

    #[test]
    fn test_non_json_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_python_bank(dir.path());
        fs::write(dir.path().join("README.md"), "notes").unwrap();

        let bank = QuestionBank::load(dir.path()).unwrap();
        assert_eq!(bank.domain_count(), 1);
    }
}
