//! quizrun configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Top-level quizrun configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizrunConfig {
    /// Directory scanned for `.json` question banks.
    #[serde(default = "default_database_dir")]
    pub database_dir: PathBuf,
    /// Fixed seed for every random choice; `None` draws from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Print the correct answer after a wrong submission.
    #[serde(default = "default_true")]
    pub show_feedback_answer: bool,
}

fn default_database_dir() -> PathBuf {
    PathBuf::from("database")
}

fn default_true() -> bool {
    true
}

impl Default for QuizrunConfig {
    fn default() -> Self {
        Self {
            database_dir: default_database_dir(),
            seed: None,
            show_feedback_answer: true,
        }
    }
}

impl QuizrunConfig {
    /// Apply command-line overrides.
    pub fn with_overrides(mut self, database_dir: Option<PathBuf>, seed: Option<u64>) -> Self {
        if let Some(dir) = database_dir {
            self.database_dir = dir;
        }
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }

    /// The random source for a run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `quizrun.toml` in the current directory
/// 2. `~/.config/quizrun/config.toml`
pub fn load_config_from(path: Option<&Path>) -> Result<QuizrunConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizrun.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizrunConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))
        }
        None => Ok(QuizrunConfig::default()),
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizrun"))
}
