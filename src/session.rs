use serde::{Deserialize, Serialize};

use crate::level::PuzzleLevel;

/// How a level concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutcomeKind {
    Success,
    Failed,
    #[serde(rename = "timeout")]
    #[strum(serialize = "timeout")]
    TimedOut,
    Skipped,
}

/// Appended exactly once per level, at the moment the level locks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelResult {
    #[serde(rename = "level")]
    pub level_id: u32,
    #[serde(rename = "points")]
    pub points_awarded: u32,
    pub time_taken: u32,
    pub hints_used: u32,
    #[serde(rename = "attempts")]
    pub attempts_made: u32,
    #[serde(rename = "status")]
    pub outcome: OutcomeKind,
    pub correct_answer: String,
}

/// What gets persisted once a session completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub score: i64,
    pub results: Vec<LevelResult>,
    pub total_levels: u32,
}

impl SessionSummary {
    pub fn successes(&self) -> u32 {
        self.count(OutcomeKind::Success)
    }

    pub fn count(&self, kind: OutcomeKind) -> u32 {
        self.results.iter().filter(|r| r.outcome == kind).count() as u32
    }

    pub fn total_time_secs(&self) -> u32 {
        self.results.iter().map(|r| r.time_taken).sum()
    }

    pub fn hints_used(&self) -> u32 {
        self.results.iter().map(|r| r.hints_used).sum()
    }

    pub fn progress(&self) -> ProgressRecord {
        ProgressRecord {
            completed: self.successes(),
            total: self.total_levels,
        }
    }
}

/// Dashboard widget data derived from a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub completed: u32,
    pub total: u32,
}

impl ProgressRecord {
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            ((self.completed as f64 / self.total as f64) * 100.0).round() as u32
        }
    }
}

/// Mutable per-play-through state, owned by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub current_level_index: usize,
    pub score: i64,
    pub time_remaining: u32,
    pub attempts_used: u32,
    pub hints_revealed: u32,
    pub locked: bool,
    pub level_outcomes: Vec<LevelResult>,
}

impl SessionState {
    pub fn new(first: Option<&PuzzleLevel>) -> Self {
        let mut state = Self {
            current_level_index: 0,
            score: 0,
            time_remaining: 0,
            attempts_used: 0,
            hints_revealed: 0,
            locked: false,
            level_outcomes: Vec::new(),
        };
        if let Some(level) = first {
            state.enter_level(level);
        }
        state
    }

    /// Reset the per-level counters for `level`
    pub fn enter_level(&mut self, level: &PuzzleLevel) {
        self.time_remaining = level.time_limit_secs;
        self.attempts_used = 0;
        self.hints_revealed = 0;
        self.locked = false;
    }

    pub fn elapsed_in_level(&self, level: &PuzzleLevel) -> u32 {
        level.time_limit_secs.saturating_sub(self.time_remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(level_id: u32, outcome: OutcomeKind, points: u32, time_taken: u32) -> LevelResult {
        LevelResult {
            level_id,
            points_awarded: points,
            time_taken,
            hints_used: 1,
            attempts_made: 1,
            outcome,
            correct_answer: "HELLO".into(),
        }
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(OutcomeKind::Success.to_string(), "success");
        assert_eq!(OutcomeKind::TimedOut.to_string(), "timeout");
        assert_eq!(OutcomeKind::Skipped.to_string(), "skipped");
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = SessionSummary {
            score: 10,
            results: vec![result(1, OutcomeKind::TimedOut, 0, 60)],
            total_levels: 10,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            json!({
                "score": 10,
                "totalLevels": 10,
                "results": [{
                    "level": 1,
                    "points": 0,
                    "timeTaken": 60,
                    "hintsUsed": 1,
                    "attempts": 1,
                    "status": "timeout",
                    "correctAnswer": "HELLO"
                }]
            })
        );
        let back: SessionSummary = serde_json::from_value(value).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn test_summary_aggregates() {
        let summary = SessionSummary {
            score: 22,
            results: vec![
                result(1, OutcomeKind::Success, 10, 12),
                result(2, OutcomeKind::Failed, 0, 40),
                result(3, OutcomeKind::Success, 12, 8),
            ],
            total_levels: 3,
        };
        assert_eq!(summary.successes(), 2);
        assert_eq!(summary.count(OutcomeKind::Failed), 1);
        assert_eq!(summary.total_time_secs(), 60);
        assert_eq!(summary.hints_used(), 3);
        assert_eq!(summary.progress(), ProgressRecord { completed: 2, total: 3 });
        assert_eq!(summary.progress().percent(), 67);
    }

    #[test]
    fn test_progress_percent_empty() {
        assert_eq!(ProgressRecord { completed: 0, total: 0 }.percent(), 0);
    }
}
