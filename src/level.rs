use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::cipher;

static LEVELS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/levels");

/// Name of the catalog shipped with the binary
pub const BUILTIN_CATALOG: &str = "forensics";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog not found: {0}")]
    NotFound(String),
    #[error("unable to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog has no levels")]
    Empty,
    #[error("level {level}: {reason}")]
    Invalid { level: u32, reason: String },
}

/// Points and seconds charged the moment a hint is revealed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HintCost {
    pub points: u32,
    pub time_secs: u32,
}

/// One authored puzzle. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleLevel {
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub scenario: String,
    pub ciphertext: String,
    pub answer: String,
    #[serde(default)]
    pub hints: Vec<String>,
    pub time_limit_secs: u32,
    pub base_points: u32,
    #[serde(default)]
    pub hint_cost: HintCost,
    pub max_attempts: u32,
}

impl PuzzleLevel {
    /// Case-insensitive, whitespace-trimmed comparison against the answer
    pub fn is_correct(&self, guess: &str) -> bool {
        guess.trim().to_uppercase() == self.answer
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub name: String,
    /// Decoy characters sprinkled into ciphertexts
    #[serde(default)]
    pub fillers: Vec<char>,
    pub levels: Vec<PuzzleLevel>,
}

impl Catalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::embedded(BUILTIN_CATALOG)
    }

    pub fn embedded(name: &str) -> Result<Self, CatalogError> {
        let file_name = format!("{name}.json");
        let contents = LEVELS_DIR
            .get_file(&file_name)
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| CatalogError::NotFound(file_name.clone()))?;
        Self::from_json(contents)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json(&contents)?;
        log::info!(
            "[CATALOG] loaded {} ({} levels) from {}",
            catalog.name,
            catalog.levels.len(),
            path.as_ref().display()
        );
        // still playable, the engine only compares guesses with answers
        for id in catalog.unreachable_levels() {
            log::warn!("[CATALOG] level {id}: answer not reachable by a single shift");
        }
        Ok(catalog)
    }

    pub fn from_json(contents: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(contents)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Structural checks only. Whether an answer is actually reachable from
    /// its ciphertext is left to [`Catalog::solvable_shift`].
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.levels.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (idx, level) in self.levels.iter().enumerate() {
            let invalid = |reason: &str| CatalogError::Invalid {
                level: level.id,
                reason: reason.to_string(),
            };
            if level.id as usize != idx + 1 {
                return Err(invalid("ids must run 1, 2, 3... in order"));
            }
            if level.time_limit_secs == 0 {
                return Err(invalid("time limit must be positive"));
            }
            if level.max_attempts == 0 {
                return Err(invalid("max attempts must be positive"));
            }
            if level.answer.trim().is_empty() {
                return Err(invalid("answer is empty"));
            }
            if level.answer != level.answer.to_uppercase() {
                return Err(invalid("answer must be upper-case"));
            }
        }

        Ok(())
    }

    /// The shift that turns a level's ciphertext into its answer, if the
    /// level is a plain Caesar shift once fillers are dropped
    pub fn solvable_shift(&self, level: &PuzzleLevel) -> Option<u8> {
        cipher::detect_shift(&level.ciphertext, &level.answer, &self.fillers)
    }

    /// Ids of levels no single shift of the ciphertext turns into the answer
    pub fn unreachable_levels(&self) -> Vec<u32> {
        self.levels
            .iter()
            .filter(|level| self.solvable_shift(level).is_none())
            .map(|level| level.id)
            .collect()
    }

    pub fn max_score(&self) -> u32 {
        self.levels.iter().map(|l| l.base_points).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn level_json(id: u32, answer: &str) -> String {
        format!(
            r#"{{"id": {id}, "ciphertext": "KHOOR", "answer": "{answer}",
                "time_limit_secs": 60, "base_points": 10, "max_attempts": 5}}"#
        )
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.name, "forensics");
        assert_eq!(catalog.levels.len(), 10);
        assert_eq!(catalog.levels[0].ciphertext, "KHOOR ZRUOG");
        assert_eq!(catalog.levels[0].hint_cost, HintCost { points: 3, time_secs: 10 });
        assert_eq!(catalog.max_score(), 258);
    }

    #[test]
    fn test_builtin_levels_are_shift_three() {
        let catalog = Catalog::builtin().unwrap();
        for level in &catalog.levels {
            // file 9 has letters knocked out on purpose
            if level.id == 9 {
                assert_eq!(catalog.solvable_shift(level), None);
                continue;
            }
            assert_eq!(catalog.solvable_shift(level), Some(3), "level {}", level.id);
        }
    }

    #[test]
    fn test_unknown_embedded_catalog() {
        let err = Catalog::embedded("nope").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn test_is_correct_trims_and_uppercases() {
        let catalog = Catalog::builtin().unwrap();
        let level = &catalog.levels[0];
        assert!(level.is_correct("hello world "));
        assert!(level.is_correct("  Hello World"));
        assert!(!level.is_correct("hello  world"));
        assert!(!level.is_correct("hello"));
    }

    #[test]
    fn test_minimal_level_defaults() {
        let json = format!(r#"{{"name": "t", "levels": [{}]}}"#, level_json(1, "HELLO"));
        let catalog = Catalog::from_json(&json).unwrap();
        let level = &catalog.levels[0];
        assert!(level.hints.is_empty());
        assert_eq!(level.hint_cost, HintCost::default());
        assert!(catalog.fillers.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_catalogs() {
        let empty = r#"{"name": "t", "levels": []}"#;
        assert!(matches!(Catalog::from_json(empty), Err(CatalogError::Empty)));

        let out_of_order = format!(r#"{{"name": "t", "levels": [{}]}}"#, level_json(2, "HELLO"));
        assert!(matches!(
            Catalog::from_json(&out_of_order),
            Err(CatalogError::Invalid { level: 2, .. })
        ));

        let lower = format!(r#"{{"name": "t", "levels": [{}]}}"#, level_json(1, "hello"));
        assert!(matches!(
            Catalog::from_json(&lower),
            Err(CatalogError::Invalid { level: 1, .. })
        ));

        assert!(matches!(Catalog::from_json("{"), Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.json");
        let json = format!(r#"{{"name": "custom", "levels": [{}]}}"#, level_json(1, "HELLO"));
        std::fs::write(&path, json).unwrap();

        let catalog = Catalog::from_path(&path).unwrap();
        assert_eq!(catalog.name, "custom");

        let missing = Catalog::from_path(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(CatalogError::Io(_))));
    }

    #[test]
    fn test_unreachable_answer_still_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        let json = r#"{"name": "broken", "levels": [
            {"id": 1, "ciphertext": "ZZZZ", "answer": "HELLO",
             "time_limit_secs": 60, "base_points": 10, "max_attempts": 5},
            {"id": 2, "ciphertext": "KHOOR", "answer": "HELLO",
             "time_limit_secs": 60, "base_points": 10, "max_attempts": 5}
        ]}"#;
        std::fs::write(&path, json).unwrap();

        let catalog = Catalog::from_path(&path).unwrap();
        assert_eq!(catalog.levels.len(), 2);
        assert_eq!(catalog.unreachable_levels(), vec![1]);
        assert_eq!(catalog.solvable_shift(&catalog.levels[1]), Some(3));
    }

    #[test]
    fn test_builtin_unreachable_is_only_the_damaged_file() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.unreachable_levels(), vec![9]);
    }
}
