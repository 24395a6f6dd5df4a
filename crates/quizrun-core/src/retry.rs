//! What happens after a session finishes.

use std::fmt;

use rand::seq::SliceRandom;

use crate::error::QuizError;
use crate::session::{Outcome, Session};

/// The user's choice on the summary screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryDecision {
    /// Replay only the missed questions, in the order they were missed.
    RetryErrors,
    /// Replay the same working set in a new random order.
    ReshuffleAll,
    /// Drop the session and go back to mode selection.
    ExitToMenu,
}

impl fmt::Display for RetryDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryDecision::RetryErrors => write!(f, "Retry only wrong answers"),
            RetryDecision::ReshuffleAll => write!(f, "Retry all questions (shuffle)"),
            RetryDecision::ExitToMenu => write!(f, "Back to menu"),
        }
    }
}

/// Decisions offered for `outcome`; a perfect score has no error retry.
pub fn available_decisions(outcome: &Outcome) -> Vec<RetryDecision> {
    let mut decisions = Vec::with_capacity(3);
    if outcome.has_errors() {
        decisions.push(RetryDecision::RetryErrors);
    }
    decisions.push(RetryDecision::ReshuffleAll);
    decisions.push(RetryDecision::ExitToMenu);
    decisions
}

/// Result of a retry decision.
#[derive(Debug)]
pub enum NextStep {
    /// A fresh session with zeroed counters.
    Session(Session),
    /// Discard all session state and return to mode selection.
    ExitToMenu,
}

/// Build the next step from a finished session.
///
/// The previous session is left untouched apart from drawing on its random
/// stream.
pub fn choose(previous: &mut Session, decision: RetryDecision) -> Result<NextStep, QuizError> {
    let outcome = previous.finish()?;

    let next = match decision {
        RetryDecision::RetryErrors => {
            if !outcome.has_errors() {
                return Err(QuizError::invalid_state(
                    "retrying errors",
                    "every answer was correct",
                ));
            }
            previous.follow_up(outcome.missed)
        }
        RetryDecision::ReshuffleAll => {
            let mut questions = previous.questions().to_vec();
            questions.shuffle(previous.rng_mut());
            previous.follow_up(questions)
        }
        RetryDecision::ExitToMenu => {
            tracing::debug!(session = %outcome.session_id, "leaving summary for the menu");
            return Ok(NextStep::ExitToMenu);
        }
    };

    tracing::debug!(
        previous = %outcome.session_id,
        next = %next.id(),
        ?decision,
        "retry session created"
    );
    Ok(NextStep::Session(next))
}
