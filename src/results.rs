use std::fs;
use std::path::Path;

use itertools::Itertools;

use crate::config::Config;
use crate::session::{LevelResult, OutcomeKind, ProgressRecord, SessionSummary};
use crate::store::{KeyValueStore, StoreError};

pub const RESULTS_KEY: &str = "encryption-results";
pub const PROGRESS_KEY: &str = "encryption-progress";

/// Persist a completed session plus the dashboard progress derived from it
pub fn save_session(store: &dyn KeyValueStore, summary: &SessionSummary) -> Result<(), StoreError> {
    store.save(RESULTS_KEY, &serde_json::to_value(summary)?)?;
    store.save(PROGRESS_KEY, &serde_json::to_value(summary.progress())?)?;
    log::info!(
        "[STORE] saved session score:{} solved:{}/{}",
        summary.score,
        summary.successes(),
        summary.total_levels
    );
    Ok(())
}

/// Last saved session, or `None` when nothing usable is stored
pub fn load_summary(store: &dyn KeyValueStore) -> Option<SessionSummary> {
    let value = store.load(RESULTS_KEY)?;
    match serde_json::from_value(value) {
        Ok(summary) => Some(summary),
        Err(e) => {
            log::warn!("[STORE] ignoring malformed {RESULTS_KEY}: {e}");
            None
        }
    }
}

pub fn load_progress(store: &dyn KeyValueStore) -> Option<ProgressRecord> {
    serde_json::from_value(store.load(PROGRESS_KEY)?).ok()
}

/// Everything the results screen shows about a finished session
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsReport {
    pub summary: SessionSummary,
    pub rank: String,
}

impl ResultsReport {
    pub fn new(summary: SessionSummary, config: &Config) -> Self {
        let rank = config.rank_for(summary.score).to_string();
        Self { summary, rank }
    }

    pub fn load(store: &dyn KeyValueStore, config: &Config) -> Option<Self> {
        load_summary(store).map(|summary| Self::new(summary, config))
    }

    pub fn evidence(&self) -> Vec<&str> {
        self.summary
            .results
            .iter()
            .filter(|r| r.outcome == OutcomeKind::Success)
            .map(|r| r.correct_answer.as_str())
            .collect()
    }

    /// Plain-text incident report built from the recovered evidence
    pub fn incident_report(&self) -> String {
        let evidence = self.evidence();
        let mut report = String::from("INCIDENT ANALYSIS REPORT\n\n");
        report.push_str("Based on decrypted evidence from the suspect's device:\n\n");

        if evidence.is_empty() {
            report.push_str("INSUFFICIENT EVIDENCE:\n");
            report.push_str("Critical files could not be decrypted, weakening the case. ");
            report.push_str("Additional forensic analysis may be required.\n\n");
        } else {
            report.push_str("RECOVERED EVIDENCE:\n");
            let numbered = evidence
                .iter()
                .enumerate()
                .map(|(idx, item)| format!("{}. {item}", idx + 1))
                .join("\n");
            report.push_str(&numbered);
            report.push('\n');

            report.push_str("\nTIMELINE RECONSTRUCTION:\n");
            report.push_str(
                "The attacker planned a coordinated operation targeting financial institutions. ",
            );
            report.push_str(
                "Evidence suggests the use of insider knowledge and systematic reconnaissance. ",
            );
            report.push_str("The encryption methods indicate intermediate technical capability.\n\n");

            report.push_str("THREAT ASSESSMENT:\n");
            report.push_str("High-risk operation with potential for significant financial damage. ");
            report.push_str(
                "The suspect demonstrates knowledge of social engineering and technical exploitation.\n\n",
            );
        }

        report.push_str("SESSION:\n");
        report.push_str(&format!(
            "Score {} | Rank {} | Decrypted {}/{} | Time {}s\n\n",
            self.summary.score,
            self.rank,
            self.summary.successes(),
            self.summary.total_levels,
            self.summary.total_time_secs()
        ));

        report.push_str("RECOMMENDATION:\n");
        report.push_str("Immediate containment measures and enhanced monitoring protocols advised.");
        report
    }

    pub fn export<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.incident_report())
    }
}

/// Short status label for a per-level row
pub fn outcome_label(result: &LevelResult) -> &'static str {
    match result.outcome {
        OutcomeKind::Success => "DECRYPTED",
        OutcomeKind::Failed => "FAILED",
        OutcomeKind::TimedOut => "TIMED OUT",
        OutcomeKind::Skipped => "SKIPPED",
    }
}
