//! Application state machine driven by the presentation layer.
//!
//! Screens follow `SourceSelect -> ModeSelect -> InSession -> SessionSummary`
//! and back. Every operation checks the current screen and reports
//! `InvalidState` without changing anything when called on the wrong one.

use std::path::Path;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::QuizError;
use crate::model::{QuestionBank, QuestionBody, QuestionKind};
use crate::parser;
use crate::retry::{self, NextStep, RetryDecision};
use crate::selector::{self, RangeSpec, Selection};
use crate::session::{Answer, Outcome, Session, SessionState, Verdict};
use crate::traits::Clock;
use crate::view::{OutcomeView, ProgressView, QuestionView};

/// How to build a session from the selected bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRequest {
    /// Restrict to one kind of question.
    pub kind: Option<QuestionKind>,
    pub selection: Selection,
}

impl SessionRequest {
    pub fn ordered(kind: Option<QuestionKind>, range: RangeSpec) -> Self {
        Self {
            kind,
            selection: Selection::Ordered(range),
        }
    }

    pub fn shuffled(kind: Option<QuestionKind>, count: Option<usize>) -> Self {
        Self {
            kind,
            selection: Selection::Shuffled { count },
        }
    }
}

/// Which screen the app is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    SourceSelect,
    ModeSelect,
    InSession,
    SessionSummary,
}

enum Screen {
    SourceSelect,
    ModeSelect {
        bank: QuestionBank,
    },
    InSession {
        bank: QuestionBank,
        session: Session,
        numbered: bool,
    },
    SessionSummary {
        bank: QuestionBank,
        session: Session,
        outcome: Outcome,
        numbered: bool,
    },
}

impl Screen {
    fn kind(&self) -> ScreenKind {
        match self {
            Screen::SourceSelect => ScreenKind::SourceSelect,
            Screen::ModeSelect { .. } => ScreenKind::ModeSelect,
            Screen::InSession { .. } => ScreenKind::InSession,
            Screen::SessionSummary { .. } => ScreenKind::SessionSummary,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Screen::SourceSelect => "choosing a question source",
            Screen::ModeSelect { .. } => "choosing a mode",
            Screen::InSession { .. } => "a session is in progress",
            Screen::SessionSummary { .. } => "showing the session summary",
        }
    }

    fn bank(&self) -> Option<&QuestionBank> {
        match self {
            Screen::SourceSelect => None,
            Screen::ModeSelect { bank }
            | Screen::InSession { bank, .. }
            | Screen::SessionSummary { bank, .. } => Some(bank),
        }
    }
}

/// The quiz runner as seen by a presentation adapter.
pub struct QuizApp {
    screen: Screen,
    rng: StdRng,
    clock: Arc<dyn Clock>,
}

impl QuizApp {
    pub fn new(rng: StdRng, clock: Arc<dyn Clock>) -> Self {
        Self {
            screen: Screen::SourceSelect,
            rng,
            clock,
        }
    }

    pub fn screen(&self) -> ScreenKind {
        self.screen.kind()
    }

    /// The selected bank, if any.
    pub fn bank(&self) -> Option<&QuestionBank> {
        self.screen.bank()
    }

    /// The running or just-finished session.
    pub fn session(&self) -> Option<&Session> {
        match &self.screen {
            Screen::InSession { session, .. } | Screen::SessionSummary { session, .. } => {
                Some(session)
            }
            _ => None,
        }
    }

    /// Load a bank from disk and move to mode selection.
    ///
    /// A source that fails to load leaves the app on source selection.
    pub fn select_source(&mut self, path: &Path) -> Result<(), QuizError> {
        self.expect(ScreenKind::SourceSelect, "select_source")?;
        let bank = parser::load_bank(path)?;
        self.screen = Screen::ModeSelect { bank };
        Ok(())
    }

    /// Use an already loaded bank.
    pub fn select_bank(&mut self, bank: QuestionBank) -> Result<(), QuizError> {
        self.expect(ScreenKind::SourceSelect, "select_bank")?;
        self.screen = Screen::ModeSelect { bank };
        Ok(())
    }

    /// Drop the bank and return to source selection.
    pub fn back_to_sources(&mut self) -> Result<(), QuizError> {
        self.expect(ScreenKind::ModeSelect, "back_to_sources")?;
        self.screen = Screen::SourceSelect;
        Ok(())
    }

    /// Number of questions a request with this kind filter can draw from.
    pub fn available(&self, kind: Option<QuestionKind>) -> Result<usize, QuizError> {
        match &self.screen {
            Screen::ModeSelect { bank } => Ok(match kind {
                Some(kind) => bank.count_kind(kind),
                None => bank.len(),
            }),
            other => Err(QuizError::invalid_state("available", other.describe())),
        }
    }

    /// Build a working set and start a session on it.
    ///
    /// An empty working set goes straight to the summary.
    pub fn start_session(&mut self, request: SessionRequest) -> Result<ScreenKind, QuizError> {
        let bank = match &self.screen {
            Screen::ModeSelect { bank } => bank.clone(),
            other => return Err(QuizError::invalid_state("start_session", other.describe())),
        };

        let questions = selector::select(
            bank.questions(),
            request.kind,
            request.selection,
            &mut self.rng,
        );
        tracing::debug!(
            bank = bank.name(),
            ?request,
            selected = questions.len(),
            "working set selected"
        );

        let session = Session::new(
            questions,
            StdRng::from_rng(&mut self.rng),
            Arc::clone(&self.clock),
        );
        self.enter_session(bank, session, request.selection.is_ordered());
        Ok(self.screen())
    }

    pub fn question_view(&mut self) -> Result<QuestionView, QuizError> {
        match &mut self.screen {
            Screen::InSession {
                session, numbered, ..
            } => {
                let numbered = *numbered;
                Ok(QuestionView::new(session.current_question()?, numbered))
            }
            other => Err(QuizError::invalid_state("question_view", other.describe())),
        }
    }

    pub fn progress_view(&self) -> Result<ProgressView, QuizError> {
        match &self.screen {
            Screen::InSession { session, .. } => Ok(ProgressView::new(session)),
            other => Err(QuizError::invalid_state("progress_view", other.describe())),
        }
    }

    /// Grade raw input against the current question.
    ///
    /// Input for a multiple-select question is read as option letters.
    pub fn submit_answer(&mut self, raw: &str) -> Result<Verdict, QuizError> {
        let session = self.session_mut("submit_answer")?;
        let answer = match &session.current_question()?.question.body {
            QuestionBody::FreeText { .. } => Answer::Text(raw.to_string()),
            QuestionBody::MultipleSelect { .. } => Answer::Choices(Answer::parse_choices(raw)),
        };
        session.submit_answer(answer)
    }

    /// Move past the current question; the last one leads to the summary.
    pub fn advance(&mut self) -> Result<ScreenKind, QuizError> {
        let state = self.session_mut("advance")?.advance();
        if state == SessionState::Finished {
            if let Screen::InSession {
                bank,
                session,
                numbered,
            } = std::mem::replace(&mut self.screen, Screen::SourceSelect)
            {
                self.enter_session(bank, session, numbered);
            }
        }
        Ok(self.screen())
    }

    /// Abandon the running session and return to mode selection.
    pub fn back_to_menu(&mut self) -> Result<(), QuizError> {
        let session = self.session_mut("back_to_menu")?;
        tracing::info!(
            session = %session.id(),
            position = session.position(),
            total = session.total(),
            "session abandoned"
        );
        if let Screen::InSession { bank, .. } =
            std::mem::replace(&mut self.screen, Screen::SourceSelect)
        {
            self.screen = Screen::ModeSelect { bank };
        }
        Ok(())
    }

    pub fn outcome(&self) -> Result<&Outcome, QuizError> {
        match &self.screen {
            Screen::SessionSummary { outcome, .. } => Ok(outcome),
            other => Err(QuizError::invalid_state("outcome", other.describe())),
        }
    }

    pub fn outcome_view(&self) -> Result<OutcomeView, QuizError> {
        self.outcome().map(OutcomeView::from)
    }

    /// Decisions to offer on the summary screen.
    pub fn retry_options(&self) -> Result<Vec<RetryDecision>, QuizError> {
        self.outcome().map(retry::available_decisions)
    }

    /// Act on the user's summary-screen choice.
    pub fn choose_retry(&mut self, decision: RetryDecision) -> Result<ScreenKind, QuizError> {
        match std::mem::replace(&mut self.screen, Screen::SourceSelect) {
            Screen::SessionSummary {
                bank,
                mut session,
                outcome,
                numbered,
            } => match retry::choose(&mut session, decision) {
                Ok(NextStep::Session(next)) => self.enter_session(bank, next, numbered),
                Ok(NextStep::ExitToMenu) => self.screen = Screen::ModeSelect { bank },
                Err(e) => {
                    self.screen = Screen::SessionSummary {
                        bank,
                        session,
                        outcome,
                        numbered,
                    };
                    return Err(e);
                }
            },
            other => {
                let err = QuizError::invalid_state("choose_retry", other.describe());
                self.screen = other;
                return Err(err);
            }
        }
        Ok(self.screen())
    }

    fn enter_session(&mut self, bank: QuestionBank, session: Session, numbered: bool) {
        self.screen = match session.finish() {
            Ok(outcome) => Screen::SessionSummary {
                bank,
                session,
                outcome,
                numbered,
            },
            Err(_) => Screen::InSession {
                bank,
                session,
                numbered,
            },
        };
    }

    fn session_mut(&mut self, operation: &'static str) -> Result<&mut Session, QuizError> {
        match &mut self.screen {
            Screen::InSession { session, .. } => Ok(session),
            other => Err(QuizError::invalid_state(operation, other.describe())),
        }
    }

    fn expect(&self, kind: ScreenKind, operation: &'static str) -> Result<(), QuizError> {
        if self.screen.kind() == kind {
            Ok(())
        } else {
            Err(QuizError::invalid_state(operation, self.screen.describe()))
        }
    }
}
