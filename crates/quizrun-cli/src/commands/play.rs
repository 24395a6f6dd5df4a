//! The `quizrun play` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use quizrun_core::traits::SystemClock;
use quizrun_core::QuizApp;

use crate::config::load_config_from;
use crate::terminal::{Sources, Terminal};

pub fn execute(
    database: Option<PathBuf>,
    bank: Option<PathBuf>,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?.with_overrides(database, seed);
    tracing::debug!(?config, "starting interactive quiz");

    let sources = match bank {
        Some(path) => Sources::Fixed(path),
        None => Sources::Directory(config.database_dir.clone()),
    };

    let mut app = QuizApp::new(config.rng(), Arc::new(SystemClock));
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut terminal = Terminal::new(stdin.lock(), stdout.lock(), config.show_feedback_answer);
    terminal.run(&mut app, &sources)
}
