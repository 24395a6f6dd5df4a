//! View models handed to the presentation layer.

use std::time::Duration;

use serde::Serialize;

use crate::model::{QuestionBody, QuestionKind};
use crate::session::{CurrentQuestion, Outcome, Session};

/// One option as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub letter: char,
    pub text: String,
}

/// The question on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    /// Source id, shown in ordered modes only.
    pub number: Option<u32>,
    pub prompt: String,
    pub kind: QuestionKind,
    /// Empty for free-text questions.
    pub options: Vec<OptionView>,
}

impl QuestionView {
    pub fn new(current: CurrentQuestion<'_>, show_number: bool) -> Self {
        let question = current.question;
        let options = match (&question.body, current.letters) {
            (QuestionBody::MultipleSelect { options, .. }, Some(letters)) => letters
                .entries()
                .filter_map(|(letter, key)| {
                    options.get(key).map(|text| OptionView {
                        letter,
                        text: text.clone(),
                    })
                })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            number: show_number.then_some(question.id),
            prompt: question.text.clone(),
            kind: question.kind(),
            options,
        }
    }

    /// Prompt line as shown: `"12. text"` when numbered.
    pub fn heading(&self) -> String {
        match self.number {
            Some(n) => format!("{n}. {}", self.prompt),
            None => self.prompt.clone(),
        }
    }
}

/// Progress line shown under the question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressView {
    /// 1-based number of the current question.
    pub number: usize,
    pub total: usize,
    pub score: usize,
    pub elapsed: String,
}

impl ProgressView {
    pub fn new(session: &Session) -> Self {
        Self {
            number: (session.position() + 1).min(session.total()),
            total: session.total(),
            score: session.score(),
            elapsed: format_elapsed(session.elapsed()),
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Question {} of {} | Score: {}",
            self.number, self.total, self.score
        )
    }
}

/// End-of-quiz summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeView {
    pub score: usize,
    pub total: usize,
    pub mistakes: usize,
    pub elapsed: String,
    pub has_errors: bool,
}

impl From<&Outcome> for OutcomeView {
    fn from(outcome: &Outcome) -> Self {
        Self {
            score: outcome.score,
            total: outcome.total,
            mistakes: outcome.mistakes(),
            elapsed: format_elapsed(outcome.elapsed),
            has_errors: outcome.has_errors(),
        }
    }
}

impl OutcomeView {
    /// Multi-line summary text.
    pub fn message(&self) -> String {
        let mut msg = format!(
            "Quiz finished!\nYou scored {}/{}.\nTotal time: {}\n",
            self.score, self.total, self.elapsed
        );
        if self.has_errors {
            let plural = if self.mistakes == 1 { "" } else { "s" };
            msg.push_str(&format!("You made {} mistake{plural}.", self.mistakes));
        } else {
            msg.push_str("All answers are correct!");
        }
        msg
    }
}

/// `"{m}m {s}s"`, or `"{s}s"` under a minute.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (m, s) = (secs / 60, secs % 60);
    if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}
