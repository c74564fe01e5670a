use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::engine::ScorePolicy;

/// Score needed for a rank title on the results screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankThreshold {
    pub min_score: i64,
    pub title: String,
}

impl RankThreshold {
    fn new(min_score: i64, title: &str) -> Self {
        Self {
            min_score,
            title: title.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub score_policy: ScorePolicy,
    /// Seconds a concluded level stays on screen; 0 waits for Enter
    pub auto_advance_secs: u32,
    /// Same, for a level the player skipped
    pub skip_advance_secs: u32,
    pub rank_thresholds: Vec<RankThreshold>,
    /// Title for scores below every threshold
    pub fallback_rank: String,
    pub show_shift_explorer: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            score_policy: ScorePolicy::FloorAtZero,
            auto_advance_secs: 3,
            skip_advance_secs: 2,
            rank_thresholds: vec![
                RankThreshold::new(300, "Encryption Expert"),
                RankThreshold::new(200, "Forensics Specialist"),
                RankThreshold::new(100, "Investigator in Training"),
            ],
            fallback_rank: "Needs More Practice".to_string(),
            show_shift_explorer: true,
        }
    }
}

impl Config {
    /// Highest threshold the score reaches, regardless of listing order
    pub fn rank_for(&self, score: i64) -> &str {
        self.rank_thresholds
            .iter()
            .filter(|t| score >= t.min_score)
            .max_by_key(|t| t.min_score)
            .map(|t| t.title.as_str())
            .unwrap_or(&self.fallback_rank)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("cipher_lab_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => log::warn!("ignoring unreadable config {}: {e}", self.path.display()),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            score_policy: ScorePolicy::AllowNegative,
            auto_advance_secs: 0,
            skip_advance_secs: 5,
            rank_thresholds: vec![RankThreshold::new(50, "Rookie")],
            fallback_rank: "Trainee".into(),
            show_shift_explorer: false,
        };
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn missing_or_corrupt_config_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        std::fs::write(&path, b"{ nope").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, br#"{"score_policy": "allow_negative"}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.score_policy, ScorePolicy::AllowNegative);
        assert_eq!(cfg.auto_advance_secs, 3);
        assert_eq!(cfg.skip_advance_secs, 2);
        assert_eq!(cfg.rank_thresholds.len(), 3);
    }

    #[test]
    fn rank_titles() {
        let cfg = Config::default();
        assert_eq!(cfg.rank_for(300), "Encryption Expert");
        assert_eq!(cfg.rank_for(250), "Forensics Specialist");
        assert_eq!(cfg.rank_for(100), "Investigator in Training");
        assert_eq!(cfg.rank_for(99), "Needs More Practice");
        assert_eq!(cfg.rank_for(-5), "Needs More Practice");
    }
}
