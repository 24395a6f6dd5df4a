//! Line-oriented terminal front end for `QuizApp`.
//!
//! Renders each screen, reads one line per decision, and forwards it to the
//! app. End of input at any prompt ends the run.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use quizrun_core::catalog;
use quizrun_core::selector::{parse_count, RangeSpec};
use quizrun_core::{QuestionKind, QuizApp, ScreenKind, SessionRequest};

/// Typed at the answer prompt to abandon the session.
const MENU_COMMAND: &str = ":menu";

/// Where question banks come from.
#[derive(Debug, Clone)]
pub enum Sources {
    /// Offer every bank in a directory.
    Directory(PathBuf),
    /// Use one bank; leaving its mode menu ends the run.
    Fixed(PathBuf),
}

struct ModeEntry {
    label: &'static str,
    kind: Option<QuestionKind>,
    ordered: bool,
}

const MODES: [ModeEntry; 6] = [
    ModeEntry {
        label: "Ordered mode",
        kind: None,
        ordered: true,
    },
    ModeEntry {
        label: "Shuffle mode",
        kind: None,
        ordered: false,
    },
    ModeEntry {
        label: "Multiple choice only (ordered)",
        kind: Some(QuestionKind::MultipleSelect),
        ordered: true,
    },
    ModeEntry {
        label: "Multiple choice only (shuffle)",
        kind: Some(QuestionKind::MultipleSelect),
        ordered: false,
    },
    ModeEntry {
        label: "Fill in the blank only (ordered)",
        kind: Some(QuestionKind::FreeText),
        ordered: true,
    },
    ModeEntry {
        label: "Fill in the blank only (shuffle)",
        kind: Some(QuestionKind::FreeText),
        ordered: false,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Terminal presentation adapter.
pub struct Terminal<R, W> {
    input: R,
    output: W,
    show_feedback_answer: bool,
    fixed_loaded: bool,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W, show_feedback_answer: bool) -> Self {
        Self {
            input,
            output,
            show_feedback_answer,
            fixed_loaded: false,
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Drive `app` until the user quits or input ends.
    pub fn run(&mut self, app: &mut QuizApp, sources: &Sources) -> Result<()> {
        loop {
            let flow = match app.screen() {
                ScreenKind::SourceSelect => self.source_screen(app, sources)?,
                ScreenKind::ModeSelect => self.mode_screen(app)?,
                ScreenKind::InSession => self.question_screen(app)?,
                ScreenKind::SessionSummary => self.summary_screen(app)?,
            };
            if flow == Flow::Quit {
                writeln!(self.output, "\nGoodbye!")?;
                self.output.flush()?;
                return Ok(());
            }
        }
    }

    fn source_screen(&mut self, app: &mut QuizApp, sources: &Sources) -> Result<Flow> {
        let dir = match sources {
            Sources::Fixed(path) => {
                if self.fixed_loaded {
                    return Ok(Flow::Quit);
                }
                app.select_source(path)
                    .with_context(|| format!("could not load {}", path.display()))?;
                self.fixed_loaded = true;
                return Ok(Flow::Continue);
            }
            Sources::Directory(dir) => dir,
        };

        let entries = catalog::list_sources(dir)?;
        if entries.is_empty() {
            writeln!(
                self.output,
                "No JSON files found in the '{}' folder!",
                dir.display()
            )?;
            return Ok(Flow::Quit);
        }

        writeln!(self.output, "\nSelect the database to use:")?;
        for (i, entry) in entries.iter().enumerate() {
            writeln!(self.output, "  {}. {}", i + 1, entry.name)?;
        }
        writeln!(self.output, "  q. Exit")?;

        let Some(choice) = self.prompt("> ")? else {
            return Ok(Flow::Quit);
        };
        let choice = choice.trim();
        if choice.eq_ignore_ascii_case("q") {
            return Ok(Flow::Quit);
        }

        match pick(choice, entries.len()) {
            Some(i) => {
                let entry = &entries[i];
                if let Err(e) = app.select_source(&entry.path) {
                    if !e.is_user_facing() {
                        return Err(e.into());
                    }
                    tracing::warn!("failed to load {}: {e}", entry.path.display());
                    writeln!(self.output, "Could not load {}: {e}", entry.name)?;
                }
            }
            None => writeln!(
                self.output,
                "Please choose 1-{} or q.",
                entries.len()
            )?,
        }
        Ok(Flow::Continue)
    }

    fn mode_screen(&mut self, app: &mut QuizApp) -> Result<Flow> {
        let name = app.bank().map(|b| b.name().to_string()).unwrap_or_default();
        writeln!(self.output, "\n== {name} ==")?;
        for (i, mode) in MODES.iter().enumerate() {
            writeln!(self.output, "  {}. {}", i + 1, mode.label)?;
        }
        writeln!(self.output, "  b. Back")?;

        let Some(choice) = self.prompt("> ")? else {
            return Ok(Flow::Quit);
        };
        let choice = choice.trim();
        if choice.eq_ignore_ascii_case("b") {
            app.back_to_sources()?;
            return Ok(Flow::Continue);
        }
        let Some(index) = pick(choice, MODES.len()) else {
            writeln!(self.output, "Please choose 1-{} or b.", MODES.len())?;
            return Ok(Flow::Continue);
        };

        let mode = &MODES[index];
        let available = app.available(mode.kind)?;
        let what = match mode.kind {
            None => "questions",
            Some(QuestionKind::MultipleSelect) => "multiple choice questions",
            Some(QuestionKind::FreeText) => "fill-in-the-blank questions",
        };

        let request = if mode.ordered {
            writeln!(
                self.output,
                "There are {available} {what} in the database.\n\
                 Enter the desired range (e.g., 1-30, or leave empty for all):"
            )?;
            let Some(input) = self.prompt("> ")? else {
                return Ok(Flow::Quit);
            };
            SessionRequest::ordered(mode.kind, RangeSpec::parse(&input))
        } else {
            writeln!(
                self.output,
                "There are {available} {what} in the database. How many do you want to do?"
            )?;
            let Some(input) = self.prompt("> ")? else {
                return Ok(Flow::Quit);
            };
            SessionRequest::shuffled(mode.kind, parse_count(&input))
        };

        app.start_session(request)?;
        Ok(Flow::Continue)
    }

    fn question_screen(&mut self, app: &mut QuizApp) -> Result<Flow> {
        let question = app.question_view()?;
        let progress = app.progress_view()?;

        writeln!(self.output, "\n{}", question.heading())?;
        for option in &question.options {
            writeln!(self.output, "  {}: {}", option.letter, option.text)?;
        }
        writeln!(self.output, "{}", progress.summary_line())?;
        writeln!(self.output, "Elapsed time: {}", progress.elapsed)?;

        let prompt = match question.kind {
            QuestionKind::FreeText => "Your answer (:menu to go back): ",
            QuestionKind::MultipleSelect => "Select letters, e.g. A,C (:menu to go back): ",
        };
        let Some(input) = self.prompt(prompt)? else {
            return Ok(Flow::Quit);
        };
        if input.trim() == MENU_COMMAND {
            app.back_to_menu()?;
            return Ok(Flow::Continue);
        }

        let verdict = app.submit_answer(&input)?;
        if verdict.correct {
            writeln!(self.output, "Correct!")?;
        } else if self.show_feedback_answer {
            writeln!(self.output, "Incorrect. Correct answer: {}", verdict.expected)?;
        } else {
            writeln!(self.output, "Incorrect.")?;
        }

        if self.prompt("Press Enter for the next question...")?.is_none() {
            return Ok(Flow::Quit);
        }
        app.advance()?;
        Ok(Flow::Continue)
    }

    fn summary_screen(&mut self, app: &mut QuizApp) -> Result<Flow> {
        let outcome = app.outcome_view()?;
        writeln!(self.output, "\n{}", outcome.message())?;

        let options = app.retry_options()?;
        for (i, decision) in options.iter().enumerate() {
            writeln!(self.output, "  {}. {decision}", i + 1)?;
        }

        let Some(choice) = self.prompt("> ")? else {
            return Ok(Flow::Quit);
        };
        match pick(choice.trim(), options.len()) {
            Some(i) => {
                app.choose_retry(options[i])?;
            }
            None => writeln!(self.output, "Please choose 1-{}.", options.len())?,
        }
        Ok(Flow::Continue)
    }

    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Parse a 1-based menu choice into an index.
fn pick(choice: &str, len: usize) -> Option<usize> {
    choice
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use quizrun_core::parser::parse_bank_str;
    use quizrun_core::traits::SystemClock;

    use super::*;

    const BANK: &str = r#"[
        {"id": 1, "question": "Capital of Italy?", "type": "dariempire", "answer": "Rome"},
        {"id": 2, "question": "Capital of France?", "type": "dariempire", "answer": "Paris"}
    ]"#;

    fn run_script(script: &str, show_feedback_answer: bool) -> String {
        let mut app = QuizApp::new(StdRng::seed_from_u64(1), Arc::new(SystemClock));
        app.select_bank(parse_bank_str(BANK, "capitals").unwrap())
            .unwrap();

        let mut terminal = Terminal::new(
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
            show_feedback_answer,
        );
        terminal
            .run(&mut app, &Sources::Directory(PathBuf::from("unused")))
            .unwrap();
        String::from_utf8(terminal.into_output()).unwrap()
    }

    #[test]
    fn pick_bounds() {
        assert_eq!(pick("1", 3), Some(0));
        assert_eq!(pick("3", 3), Some(2));
        assert_eq!(pick("0", 3), None);
        assert_eq!(pick("4", 3), None);
        assert_eq!(pick("x", 3), None);
    }

    #[test]
    fn full_round_with_error_retry() {
        let script = "1\n\nrome\n\nLyon\n\n1\n paris \n\n2\n";
        let out = run_script(script, true);

        assert!(out.contains("== capitals =="));
        assert!(out.contains("There are 2 questions in the database."));
        assert!(out.contains("1. Capital of Italy?"));
        assert!(out.contains("Question 1 of 2 | Score: 0"));
        assert!(out.contains("Correct!"));
        assert!(out.contains("Incorrect. Correct answer: Paris"));
        assert!(out.contains("You scored 1/2."));
        assert!(out.contains("You made 1 mistake."));
        assert!(out.contains("1. Retry only wrong answers"));
        assert!(out.contains("Question 1 of 1 | Score: 0"));
        assert!(out.contains("You scored 1/1."));
        assert!(out.contains("All answers are correct!"));
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[test]
    fn feedback_answer_can_be_hidden() {
        let out = run_script("5\n1\nMilan\n\n", false);
        assert!(out.contains("There are 2 fill-in-the-blank questions in the database."));
        assert!(out.contains("Incorrect.\n"));
        assert!(!out.contains("Correct answer: Rome"));
    }

    #[test]
    fn menu_command_abandons_session() {
        let out = run_script("2\n\n:menu\n", true);
        assert!(out.contains("How many do you want to do?"));
        // back on the mode menu after abandoning
        assert_eq!(out.matches("== capitals ==").count(), 2);
    }

    #[test]
    fn invalid_menu_choice_is_reported() {
        let out = run_script("9\n", true);
        assert!(out.contains("Please choose 1-6 or b."));
    }

    #[test]
    fn directory_sources_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("capitals.json"), BANK).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{}").unwrap();

        let mut app = QuizApp::new(StdRng::seed_from_u64(1), Arc::new(SystemClock));
        let mut terminal = Terminal::new(Cursor::new(b"1\n2\nq\n".to_vec()), Vec::new(), true);
        terminal
            .run(&mut app, &Sources::Directory(dir.path().to_path_buf()))
            .unwrap();
        let out = String::from_utf8(terminal.into_output()).unwrap();

        assert!(out.contains("  1. broken\n  2. capitals"));
        assert!(out.contains("Could not load broken: malformed question source broken"));
        assert!(out.contains("== capitals =="));
        assert_eq!(app.screen(), ScreenKind::ModeSelect);
    }
}
