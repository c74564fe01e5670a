//! Turn-based puzzle session.
//!
//! Every player action and every clock tick goes through [`CipherEngine::handle`].
//! A level concludes in exactly one place, [`CipherEngine::conclude`], which
//! flips the lock before recording the result, so a late tick can never
//! append a second result for a level that has already been answered.

use serde::{Deserialize, Serialize};

use crate::level::PuzzleLevel;
use crate::session::{LevelResult, OutcomeKind, SessionState, SessionSummary};

/// What hint penalties may do to the running score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorePolicy {
    /// Penalties saturate at zero
    #[default]
    FloorAtZero,
    /// Penalties are plain subtraction
    AllowNegative,
}

impl ScorePolicy {
    fn apply(self, score: i64, penalty: u32) -> i64 {
        let next = score - penalty as i64;
        match self {
            ScorePolicy::FloorAtZero => next.max(0),
            ScorePolicy::AllowNegative => next,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Locked,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Submit(String),
    RevealHint(usize),
    Skip,
    Tick,
    Advance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// The action made no sense in the current phase; nothing changed
    Ignored,
    Ticked { remaining: u32 },
    Incorrect { attempts_left: u32 },
    HintRevealed { index: usize, text: String },
    /// The level locked with this result
    Concluded(LevelResult),
    Advanced { level_index: usize },
    Completed(SessionSummary),
}

impl Feedback {
    /// Player-facing line for the feedback panel
    pub fn message(&self) -> Option<String> {
        match self {
            Feedback::Ignored | Feedback::Ticked { .. } | Feedback::Advanced { .. } => None,
            Feedback::Incorrect { attempts_left } => Some(format!(
                "Incorrect. Check shift, case, and any special characters. Attempts left: {attempts_left}"
            )),
            Feedback::HintRevealed { index, text } => Some(format!("Hint {}: {text}", index + 1)),
            Feedback::Concluded(result) => Some(match result.outcome {
                OutcomeKind::Success => format!(
                    "Correct! The message reads: {}. Evidence logged for incident report.",
                    result.correct_answer
                ),
                OutcomeKind::Failed => format!(
                    "Maximum attempts reached. The correct answer was: {}",
                    result.correct_answer
                ),
                OutcomeKind::TimedOut => format!(
                    "Time's up! The correct answer was: {}",
                    result.correct_answer
                ),
                OutcomeKind::Skipped => {
                    format!("Skipped. The correct answer was: {}", result.correct_answer)
                }
            }),
            Feedback::Completed(summary) => Some(format!(
                "Investigation complete. Final score: {}",
                summary.score
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CipherEngine {
    levels: Vec<PuzzleLevel>,
    state: SessionState,
    policy: ScorePolicy,
}

impl CipherEngine {
    pub fn new(levels: Vec<PuzzleLevel>, policy: ScorePolicy) -> Self {
        let state = SessionState::new(levels.first());
        log::debug!("[ENGINE] session started with {} levels", levels.len());
        Self {
            levels,
            state,
            policy,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.state.current_level_index >= self.levels.len() {
            Phase::Complete
        } else if self.state.locked {
            Phase::Locked
        } else {
            Phase::Active
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase() == Phase::Active
    }

    pub fn is_complete(&self) -> bool {
        self.phase() == Phase::Complete
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn levels(&self) -> &[PuzzleLevel] {
        &self.levels
    }

    pub fn current_level(&self) -> Option<&PuzzleLevel> {
        self.levels.get(self.state.current_level_index)
    }

    pub fn score(&self) -> i64 {
        self.state.score
    }

    pub fn policy(&self) -> ScorePolicy {
        self.policy
    }

    /// Hints revealed so far on the current level, in order
    pub fn revealed_hints(&self) -> &[String] {
        match self.current_level() {
            Some(level) => {
                let n = (self.state.hints_revealed as usize).min(level.hints.len());
                &level.hints[..n]
            }
            None => &[],
        }
    }

    /// The answer is only shown once the level can no longer be played
    pub fn revealed_answer(&self) -> Option<&str> {
        match self.phase() {
            Phase::Locked => self.current_level().map(|l| l.answer.as_str()),
            _ => None,
        }
    }

    pub fn attempts_left(&self) -> u32 {
        self.current_level()
            .map(|l| l.max_attempts.saturating_sub(self.state.attempts_used))
            .unwrap_or(0)
    }

    /// One-based position and level count, for the progress bar
    pub fn progress(&self) -> (usize, usize) {
        let total = self.levels.len();
        ((self.state.current_level_index + 1).min(total), total)
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        self.is_complete().then(|| self.build_summary())
    }

    pub fn handle(&mut self, action: Action) -> Feedback {
        match action {
            Action::Tick => self.on_tick(),
            Action::Submit(guess) => self.on_submit(&guess),
            Action::RevealHint(index) => self.on_hint(index),
            Action::Skip => self.on_skip(),
            Action::Advance => self.on_advance(),
        }
    }

    fn on_tick(&mut self) -> Feedback {
        if !self.is_active() {
            return Feedback::Ignored;
        }
        if self.state.time_remaining > 0 {
            self.state.time_remaining -= 1;
        }
        if self.state.time_remaining > 0 {
            return Feedback::Ticked {
                remaining: self.state.time_remaining,
            };
        }

        let (time_taken, attempts) = match self.current_level() {
            Some(level) => (level.time_limit_secs, self.state.attempts_used),
            None => return Feedback::Ignored,
        };
        self.conclude(OutcomeKind::TimedOut, 0, time_taken, attempts)
    }

    fn on_submit(&mut self, guess: &str) -> Feedback {
        if !self.is_active() || guess.trim().is_empty() {
            return Feedback::Ignored;
        }
        let Some(level) = self.current_level() else {
            return Feedback::Ignored;
        };
        let correct = level.is_correct(guess);
        let base_points = level.base_points;
        let max_attempts = level.max_attempts;
        let elapsed = self.state.elapsed_in_level(level);

        if correct {
            self.state.score += base_points as i64;
            let attempts = self.state.attempts_used + 1;
            return self.conclude(OutcomeKind::Success, base_points, elapsed, attempts);
        }

        self.state.attempts_used += 1;
        if self.state.attempts_used >= max_attempts {
            let attempts = self.state.attempts_used;
            return self.conclude(OutcomeKind::Failed, 0, elapsed, attempts);
        }

        Feedback::Incorrect {
            attempts_left: max_attempts - self.state.attempts_used,
        }
    }

    fn on_hint(&mut self, index: usize) -> Feedback {
        if !self.is_active() || index != self.state.hints_revealed as usize {
            return Feedback::Ignored;
        }
        let Some(level) = self.current_level() else {
            return Feedback::Ignored;
        };
        let Some(text) = level.hints.get(index).cloned() else {
            return Feedback::Ignored;
        };
        let cost = level.hint_cost;

        self.state.score = self.policy.apply(self.state.score, cost.points);
        self.state.time_remaining = self.state.time_remaining.saturating_sub(cost.time_secs);
        self.state.hints_revealed += 1;
        log::debug!(
            "[ENGINE] hint {} revealed, score {} time {}",
            index + 1,
            self.state.score,
            self.state.time_remaining
        );

        Feedback::HintRevealed { index, text }
    }

    fn on_skip(&mut self) -> Feedback {
        if !self.is_active() {
            return Feedback::Ignored;
        }
        let Some(level) = self.current_level() else {
            return Feedback::Ignored;
        };
        let elapsed = self.state.elapsed_in_level(level);
        let attempts = self.state.attempts_used;
        self.conclude(OutcomeKind::Skipped, 0, elapsed, attempts)
    }

    fn on_advance(&mut self) -> Feedback {
        if self.phase() != Phase::Locked {
            return Feedback::Ignored;
        }

        let next = self.state.current_level_index + 1;
        self.state.current_level_index = next;
        match self.levels.get(next) {
            Some(level) => {
                self.state.enter_level(level);
                log::debug!("[ENGINE] entering level {}", level.id);
                Feedback::Advanced { level_index: next }
            }
            None => {
                let summary = self.build_summary();
                log::info!(
                    "[ENGINE] session complete score:{} solved:{}/{}",
                    summary.score,
                    summary.successes(),
                    summary.total_levels
                );
                Feedback::Completed(summary)
            }
        }
    }

    /// The single point where a level locks and its result is recorded
    fn conclude(
        &mut self,
        outcome: OutcomeKind,
        points_awarded: u32,
        time_taken: u32,
        attempts_made: u32,
    ) -> Feedback {
        if self.state.locked {
            return Feedback::Ignored;
        }
        self.state.locked = true;

        let Some(level) = self.current_level() else {
            return Feedback::Ignored;
        };
        let result = LevelResult {
            level_id: level.id,
            points_awarded,
            time_taken,
            hints_used: self.state.hints_revealed,
            attempts_made,
            outcome,
            correct_answer: level.answer.clone(),
        };
        log::debug!("[ENGINE] level {} concluded: {}", result.level_id, outcome);
        self.state.level_outcomes.push(result.clone());

        Feedback::Concluded(result)
    }

    fn build_summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.state.score,
            results: self.state.level_outcomes.clone(),
            total_levels: self.levels.len() as u32,
        }
    }
}
