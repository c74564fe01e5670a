use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::PathBuf;
use std::time::Duration;

use crate::cipher;
use crate::config::Config;
use crate::engine::{Action, CipherEngine, Feedback, Phase};
use crate::history::{HistoryLog, HistoryRow};
use crate::level::Catalog;
use crate::results::{self, ResultsReport};
use crate::runtime::Clock;
use crate::session::{OutcomeKind, SessionSummary};
use crate::store::KeyValueStore;

pub const REPORT_FILE_NAME: &str = "forensic-analysis-report.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Playing,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App {
    pub catalog: Catalog,
    pub config: Config,
    pub engine: CipherEngine,
    pub state: AppState,
    /// Text typed into the decryption box
    pub input: String,
    pub feedback: Option<String>,
    pub explorer_shift: i32,
    pub report: Option<ResultsReport>,
    pub report_dir: PathBuf,
    store: Box<dyn KeyValueStore>,
    history: Option<HistoryLog>,
    level_clock: Clock,
    advance_clock: Clock,
    locked_secs: u32,
    /// Delay picked for the level currently locked
    advance_delay: u32,
}

impl App {
    pub fn new(
        catalog: Catalog,
        config: Config,
        store: Box<dyn KeyValueStore>,
        history: Option<HistoryLog>,
    ) -> Self {
        let engine = CipherEngine::new(catalog.levels.clone(), config.score_policy);
        let mut app = Self {
            catalog,
            config,
            engine,
            state: AppState::Playing,
            input: String::new(),
            feedback: None,
            explorer_shift: 0,
            report: None,
            report_dir: PathBuf::from("."),
            store,
            history,
            level_clock: Clock::new(),
            advance_clock: Clock::new(),
            locked_secs: 0,
            advance_delay: 0,
        };
        if let Some(summary) = app.engine.summary() {
            app.finish(summary);
        }
        app
    }

    /// Start a fresh play-through of the same catalog
    pub fn restart(&mut self) {
        self.engine = CipherEngine::new(self.catalog.levels.clone(), self.config.score_policy);
        self.state = AppState::Playing;
        self.report = None;
        self.reset_level_ui();
        if let Some(summary) = self.engine.summary() {
            self.finish(summary);
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Seconds until a locked level moves on by itself
    pub fn auto_advance_in(&self) -> Option<u32> {
        if self.engine.phase() != Phase::Locked || self.advance_delay == 0 {
            return None;
        }
        Some(self.advance_delay.saturating_sub(self.locked_secs))
    }

    pub fn explorer_preview(&self) -> Option<String> {
        self.engine
            .current_level()
            .map(|level| cipher::decrypt(&level.ciphertext, self.explorer_shift))
    }

    /// Feed wall-clock time from the runner's redraw ticks
    pub fn on_tick(&mut self, elapsed: Duration) {
        if self.state != AppState::Playing {
            return;
        }

        // time that ran the level clock down never counts toward leaving it
        let was_locked = self.engine.phase() == Phase::Locked;

        let active = self.engine.is_active();
        for _ in 0..self.level_clock.advance(elapsed, active) {
            let fb = self.engine.handle(Action::Tick);
            self.apply(fb);
            if !self.engine.is_active() {
                break;
            }
        }

        let locked = was_locked && self.advance_delay > 0;
        self.locked_secs += self.advance_clock.advance(elapsed, locked);
        if locked && self.locked_secs >= self.advance_delay {
            self.dispatch(Action::Advance);
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
            return Control::Quit;
        }

        match self.state {
            AppState::Playing => self.on_playing_key(key, ctrl),
            AppState::Results => return self.on_results_key(key),
        }
        Control::Continue
    }

    fn on_playing_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Enter => match self.engine.phase() {
                Phase::Active => {
                    let guess = self.input.clone();
                    self.dispatch(Action::Submit(guess));
                }
                Phase::Locked => self.dispatch(Action::Advance),
                Phase::Complete => {}
            },
            KeyCode::Tab => {
                let next = self.engine.state().hints_revealed as usize;
                self.dispatch(Action::RevealHint(next));
            }
            KeyCode::Char('n') if ctrl => self.dispatch(Action::Skip),
            KeyCode::Up => self.explorer_shift = cipher::normalize_shift(self.explorer_shift + 1) as i32,
            KeyCode::Down => self.explorer_shift = cipher::normalize_shift(self.explorer_shift - 1) as i32,
            KeyCode::Backspace => {
                if self.engine.is_active() {
                    self.input.pop();
                }
            }
            KeyCode::Char(c) if !ctrl => {
                if self.engine.is_active() {
                    self.input.push(c);
                }
            }
            _ => {}
        }
    }

    fn on_results_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Char('q') => return Control::Quit,
            KeyCode::Char('r') => self.restart(),
            KeyCode::Char('e') => self.export_report(),
            _ => {}
        }
        Control::Continue
    }

    pub fn export_report(&mut self) {
        let Some(report) = &self.report else {
            return;
        };
        let path = self.report_dir.join(REPORT_FILE_NAME);
        self.feedback = Some(match report.export(&path) {
            Ok(()) => format!("Report written to {}", path.display()),
            Err(e) => {
                log::warn!("report export to {} failed: {e}", path.display());
                format!("Could not write report: {e}")
            }
        });
    }

    /// Send an action to the engine and react to what it says
    pub fn dispatch(&mut self, action: Action) {
        let fb = self.engine.handle(action);
        self.apply(fb);
    }

    fn apply(&mut self, fb: Feedback) {
        if let Some(message) = fb.message() {
            self.feedback = Some(message);
        }
        match fb {
            Feedback::Concluded(result) => {
                self.advance_delay = match result.outcome {
                    OutcomeKind::Skipped => self.config.skip_advance_secs,
                    _ => self.config.auto_advance_secs,
                };
                self.input.clear();
                self.locked_secs = 0;
                self.advance_clock.reset();
            }
            Feedback::Advanced { .. } => self.reset_level_ui(),
            Feedback::Completed(summary) => self.finish(summary),
            Feedback::Ignored
            | Feedback::Ticked { .. }
            | Feedback::Incorrect { .. }
            | Feedback::HintRevealed { .. } => {}
        }
    }

    fn reset_level_ui(&mut self) {
        self.input.clear();
        self.feedback = None;
        self.explorer_shift = 0;
        self.locked_secs = 0;
        self.level_clock.reset();
        self.advance_clock.reset();
    }

    fn finish(&mut self, summary: SessionSummary) {
        if let Err(e) = results::save_session(self.store.as_ref(), &summary) {
            log::error!("[STORE] unable to save session: {e}");
            self.feedback = Some(format!("Results could not be saved: {e}"));
        }
        if let Some(history) = &self.history {
            if let Err(e) = history.append(&HistoryRow::from_summary(&self.catalog.name, &summary)) {
                log::warn!("unable to append history: {e}");
            }
        }
        self.report = Some(ResultsReport::new(summary, &self.config));
        self.state = AppState::Results;
    }
}
