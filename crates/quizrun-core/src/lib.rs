//! quizrun-core: question banks, selection, and the quiz session engine.
//!
//! This crate holds every rule of a quiz run: how banks are parsed, how a
//! working set is chosen, how answers are graded and how retries are built.
//! It performs no terminal I/O; a presentation adapter drives [`app::QuizApp`].

pub mod app;
pub mod catalog;
pub mod error;
pub mod labels;
pub mod model;
pub mod parser;
pub mod retry;
pub mod selector;
pub mod session;
pub mod traits;
pub mod view;

pub use app::{QuizApp, ScreenKind, SessionRequest};
pub use error::QuizError;
pub use model::{Question, QuestionBank, QuestionBody, QuestionKind};
pub use retry::RetryDecision;
pub use session::{Answer, Outcome, Session, Verdict};
