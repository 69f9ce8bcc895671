//! Engine configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::builder::MissingKeyPolicy;
use crate::controller::ExamController;
use crate::persistence::FileStore;
use crate::scoring::{Scorer, ScoringPolicy};
use crate::session::{SessionStore, DEFAULT_SESSION_KEY};
use crate::timer::{self, TickerHandle};

/// Overrides `storage_dir`.
pub const STORAGE_DIR_ENV: &str = "MOCKTEST_STORAGE_DIR";

/// Runtime knobs for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding persisted session state.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// Key the session is saved under.
    #[serde(default = "default_session_key")]
    pub session_key: String,
    /// Seconds of tick time between periodic saves.
    #[serde(default = "default_autosave_secs")]
    pub autosave_interval_secs: u64,
    /// Tick period for hosts driving the timer, at most one second.
    #[serde(default = "default_tick_ms")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub scoring: ScoringPolicy,
    #[serde(default)]
    pub missing_key_policy: MissingKeyPolicy,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".mocktest")
}
fn default_session_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}
fn default_autosave_secs() -> u64 {
    10
}
fn default_tick_ms() -> u64 {
    1000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            session_key: default_session_key(),
            autosave_interval_secs: default_autosave_secs(),
            tick_interval_ms: default_tick_ms(),
            scoring: ScoringPolicy::default(),
            missing_key_policy: MissingKeyPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Reject settings the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !(1..=1000).contains(&self.tick_interval_ms) {
            anyhow::bail!(
                "tick_interval_ms must be between 1 and 1000, got {}",
                self.tick_interval_ms
            );
        }
        if self.session_key.trim().is_empty() {
            anyhow::bail!("session_key must not be empty");
        }
        let tolerance = self.scoring.numerical_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            anyhow::bail!("numerical_tolerance must be a non-negative number, got {tolerance}");
        }
        Ok(())
    }

    /// A file-backed session store per this configuration.
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(Box::new(FileStore::new(&self.storage_dir)))
            .with_key(self.session_key.clone())
            .with_autosave_interval(self.autosave_interval())
    }

    pub fn scorer(&self) -> Scorer {
        Scorer::new(self.scoring)
    }

    /// Controller over a file-backed session.
    pub fn controller(&self) -> ExamController {
        ExamController::new(self.session_store(), self.scorer())
    }

    /// Start the background ticker at `tick_interval`. Must be called inside
    /// a tokio runtime.
    pub fn spawn_ticker(&self, controller: Arc<Mutex<ExamController>>) -> TickerHandle {
        timer::spawn_ticker(controller, self.tick_interval())
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `mocktest.toml` in the current directory
/// 2. `~/.config/mocktest/config.toml`
///
/// `MOCKTEST_STORAGE_DIR` overrides the storage directory.
pub fn load_config() -> Result<EngineConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<EngineConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("mocktest.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<EngineConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => EngineConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    config.validate()?;
    Ok(config)
}

fn apply_env_overrides(config: &mut EngineConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(dir) = lookup(STORAGE_DIR_ENV).filter(|d| !d.trim().is_empty()) {
        config.storage_dir = PathBuf::from(dir);
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mocktest"))
}
