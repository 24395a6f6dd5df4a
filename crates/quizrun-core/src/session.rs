//! The quiz session engine.
//!
//! A `Session` walks a fixed working set one question at a time. Each
//! position is first awaiting an answer, then answered (a verdict is shown),
//! and `advance` moves to the next position. When the last position is left
//! the session is finished and its `Outcome` is frozen.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use uuid::Uuid;

use crate::error::QuizError;
use crate::labels::LetterMap;
use crate::model::{Question, QuestionBody};
use crate::traits::Clock;

/// A user's answer to the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Free text as typed.
    Text(String),
    /// Display letters of the chosen options.
    Choices(BTreeSet<char>),
}

impl Answer {
    /// Pick the option letters out of raw input such as `"A, c"` or `"bd"`.
    pub fn parse_choices(raw: &str) -> BTreeSet<char> {
        raw.chars()
            .filter(char::is_ascii_alphabetic)
            .map(|c| c.to_ascii_uppercase())
            .collect()
    }
}

/// Result of grading one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub correct: bool,
    /// The canonical answer, or the correct display letters joined by `,`.
    pub expected: String,
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// The current question has not been answered yet.
    AwaitingAnswer,
    /// The current question was graded; waiting for `advance`.
    Answered,
    /// Every position has been left.
    Finished,
}

impl SessionState {
    fn describe(self) -> &'static str {
        match self {
            SessionState::AwaitingAnswer => "awaiting an answer",
            SessionState::Answered => "the answer is already graded",
            SessionState::Finished => "the session is finished",
        }
    }
}

/// Immutable end-of-session summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub session_id: Uuid,
    pub score: usize,
    pub total: usize,
    /// Questions answered incorrectly or skipped, in the order they were missed.
    pub missed: Vec<Question>,
    pub elapsed: Duration,
}

impl Outcome {
    pub fn mistakes(&self) -> usize {
        self.missed.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.missed.is_empty()
    }
}

/// The question currently on display.
#[derive(Debug, Clone, Copy)]
pub struct CurrentQuestion<'a> {
    pub question: &'a Question,
    /// Present for multiple-select questions.
    pub letters: Option<&'a LetterMap>,
}

/// Mutable run state for one pass over a working set.
pub struct Session {
    id: Uuid,
    questions: Vec<Question>,
    position: usize,
    score: usize,
    missed: Vec<Question>,
    answered: bool,
    letters: Option<LetterMap>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    rng: StdRng,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("total", &self.questions.len())
            .field("score", &self.score)
            .field("missed", &self.missed.len())
            .field("state", &self.state())
            .finish()
    }
}

impl Session {
    /// Start a session over `questions`.
    ///
    /// An empty working set produces a session that is already finished.
    pub fn new(questions: Vec<Question>, rng: StdRng, clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.now();
        let finished_at = questions.is_empty().then_some(started_at);
        let session = Self {
            id: Uuid::new_v4(),
            questions,
            position: 0,
            score: 0,
            missed: Vec::new(),
            answered: false,
            letters: None,
            started_at,
            finished_at,
            rng,
            clock,
        };
        tracing::info!(
            session = %session.id,
            total = session.questions.len(),
            "session started"
        );
        session
    }

    /// Start a follow-up session that continues this one's random stream.
    pub(crate) fn follow_up(&mut self, questions: Vec<Question>) -> Session {
        let rng = StdRng::from_rng(&mut self.rng);
        Session::new(questions, rng, Arc::clone(&self.clock))
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        if self.finished_at.is_some() {
            SessionState::Finished
        } else if self.answered {
            SessionState::Answered
        } else {
            SessionState::AwaitingAnswer
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// 0-based index of the current question.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn missed(&self) -> &[Question] {
        &self.missed
    }

    /// The working set, in presentation order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Time since the session started; frozen once it finishes.
    pub fn elapsed(&self) -> Duration {
        let end = self.finished_at.unwrap_or_else(|| self.clock.now());
        (end - self.started_at).to_std().unwrap_or_default()
    }

    /// The question at the current position.
    ///
    /// Multiple-select options are relabelled the first time a position is
    /// shown; later calls for the same position return the same letters.
    pub fn current_question(&mut self) -> Result<CurrentQuestion<'_>, QuizError> {
        self.ensure_in_progress("current_question")?;
        self.ensure_letters();
        Ok(CurrentQuestion {
            question: &self.questions[self.position],
            letters: self.letters.as_ref(),
        })
    }

    /// Grade `answer` against the current question.
    pub fn submit_answer(&mut self, answer: Answer) -> Result<Verdict, QuizError> {
        self.ensure_in_progress("submit_answer")?;
        if self.answered {
            return Err(QuizError::invalid_state(
                "submit_answer",
                SessionState::Answered.describe(),
            ));
        }
        self.ensure_letters();

        let question = &self.questions[self.position];
        let verdict = match (&question.body, answer) {
            (QuestionBody::FreeText { answer: expected }, Answer::Text(given)) => Verdict {
                correct: normalize(&given) == normalize(expected),
                expected: expected.trim().to_string(),
            },
            (QuestionBody::FreeText { .. }, Answer::Choices(_)) => {
                return Err(QuizError::invalid_state(
                    "submitting option letters",
                    "a free-text question is shown",
                ));
            }
            (QuestionBody::MultipleSelect { correct_keys, .. }, answer) => {
                let chosen = match answer {
                    Answer::Choices(letters) => letters,
                    Answer::Text(raw) => Answer::parse_choices(&raw),
                };
                let letters = self
                    .letters
                    .as_ref()
                    .ok_or_else(|| QuizError::invalid_state("submit_answer", "no options shown"))?;
                let correct = letters
                    .translate(&chosen)
                    .is_some_and(|keys| &keys == correct_keys);
                let expected = letters
                    .letters_for(correct_keys)
                    .iter()
                    .map(char::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                Verdict { correct, expected }
            }
        };

        if verdict.correct {
            self.score += 1;
        } else {
            self.missed.push(question.clone());
        }
        self.answered = true;

        tracing::debug!(
            session = %self.id,
            position = self.position,
            question = question.id,
            correct = verdict.correct,
            "answer graded"
        );
        Ok(verdict)
    }

    /// Move to the next position.
    ///
    /// Leaving a position that was never answered counts it as missed.
    /// Advancing a finished session does nothing.
    pub fn advance(&mut self) -> SessionState {
        if self.is_finished() {
            tracing::debug!(session = %self.id, "advance on finished session ignored");
            return SessionState::Finished;
        }

        if !self.answered {
            let skipped = self.questions[self.position].clone();
            tracing::debug!(session = %self.id, question = skipped.id, "question skipped");
            self.missed.push(skipped);
        }

        self.position += 1;
        self.answered = false;
        self.letters = None;

        if self.position == self.questions.len() {
            self.finished_at = Some(self.clock.now());
            tracing::info!(
                session = %self.id,
                score = self.score,
                total = self.questions.len(),
                "session finished"
            );
        }
        self.state()
    }

    /// The frozen summary of a finished session.
    pub fn finish(&self) -> Result<Outcome, QuizError> {
        if !self.is_finished() {
            return Err(QuizError::invalid_state("finish", self.state().describe()));
        }
        Ok(Outcome {
            session_id: self.id,
            score: self.score,
            total: self.questions.len(),
            missed: self.missed.clone(),
            elapsed: self.elapsed(),
        })
    }

    fn ensure_in_progress(&self, operation: &'static str) -> Result<(), QuizError> {
        if self.is_finished() {
            return Err(QuizError::invalid_state(
                operation,
                SessionState::Finished.describe(),
            ));
        }
        Ok(())
    }

    fn ensure_letters(&mut self) {
        if self.letters.is_some() {
            return;
        }
        if let QuestionBody::MultipleSelect { options, .. } = &self.questions[self.position].body {
            self.letters = Some(LetterMap::shuffled(options, &mut self.rng));
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::traits::testing::ManualClock;

    fn free(id: u32, answer: &str) -> Question {
        Question {
            id,
            text: format!("question {id}"),
            body: QuestionBody::FreeText {
                answer: answer.into(),
            },
        }
    }

    fn multi(id: u32, correct: &[&str]) -> Question {
        Question {
            id,
            text: format!("question {id}"),
            body: QuestionBody::MultipleSelect {
                options: BTreeMap::from([
                    ("a".into(), "first".into()),
                    ("b".into(), "second".into()),
                    ("c".into(), "third".into()),
                    ("d".into(), "fourth".into()),
                ]),
                correct_keys: correct.iter().map(|k| k.to_string()).collect(),
            },
        }
    }

    fn session_with(questions: Vec<Question>) -> (Arc<ManualClock>, Session) {
        let clock = Arc::new(ManualClock::new());
        let session = Session::new(questions, StdRng::seed_from_u64(17), clock.clone());
        (clock, session)
    }

    /// Letters currently assigned to `keys`.
    fn letters_of(session: &mut Session, keys: &[&str]) -> BTreeSet<char> {
        let current = session.current_question().unwrap();
        let map = current.letters.unwrap();
        keys.iter().map(|k| map.letter_for(k).unwrap()).collect()
    }

    #[test]
    fn free_text_is_case_and_whitespace_insensitive() {
        for input in ["Paris", " paris ", "PARIS", "\tParis\n"] {
            let (_, mut s) = session_with(vec![free(1, "Paris")]);
            let verdict = s.submit_answer(Answer::Text(input.into())).unwrap();
            assert!(verdict.correct, "{input:?} should match");
            assert_eq!(verdict.expected, "Paris");
        }
        let (_, mut s) = session_with(vec![free(1, "Paris")]);
        assert!(!s.submit_answer(Answer::Text("Lyon".into())).unwrap().correct);
    }

    #[test]
    fn free_text_answer_is_trimmed_too() {
        let (_, mut s) = session_with(vec![free(1, "  Rome ")]);
        assert!(s.submit_answer(Answer::Text("rome".into())).unwrap().correct);
    }

    #[test]
    fn multiple_select_exact_match_only() {
        let q = multi(1, &["a", "c"]);

        let (_, mut s) = session_with(vec![q.clone()]);
        let exact = letters_of(&mut s, &["a", "c"]);
        let verdict = s.submit_answer(Answer::Choices(exact.clone())).unwrap();
        assert!(verdict.correct);
        let expected: Vec<String> = exact.iter().map(char::to_string).collect();
        assert_eq!(verdict.expected, expected.join(","));

        let (_, mut s) = session_with(vec![q.clone()]);
        let superset = letters_of(&mut s, &["a", "b", "c"]);
        assert!(!s.submit_answer(Answer::Choices(superset)).unwrap().correct);

        let (_, mut s) = session_with(vec![q.clone()]);
        let subset = letters_of(&mut s, &["a"]);
        assert!(!s.submit_answer(Answer::Choices(subset)).unwrap().correct);

        let (_, mut s) = session_with(vec![q]);
        assert!(!s
            .submit_answer(Answer::Choices(BTreeSet::from(['Z'])))
            .unwrap()
            .correct);
    }

    #[test]
    fn multiple_select_accepts_raw_text() {
        let (_, mut s) = session_with(vec![multi(1, &["b", "d"])]);
        let letters = letters_of(&mut s, &["b", "d"]);
        let raw: String = letters
            .iter()
            .map(|l| l.to_ascii_lowercase().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        assert!(s.submit_answer(Answer::Text(raw)).unwrap().correct);
    }

    #[test]
    fn letters_are_stable_within_a_position() {
        let (_, mut s) = session_with(vec![multi(1, &["a"])]);
        let first = s.current_question().unwrap().letters.cloned();
        let second = s.current_question().unwrap().letters.cloned();
        assert_eq!(first, second);
    }

    #[test]
    fn free_text_has_no_letters() {
        let (_, mut s) = session_with(vec![free(1, "x")]);
        assert!(s.current_question().unwrap().letters.is_none());
    }

    #[test]
    fn choices_for_free_text_are_rejected() {
        let (_, mut s) = session_with(vec![free(1, "x")]);
        let err = s
            .submit_answer(Answer::Choices(BTreeSet::from(['A'])))
            .unwrap_err();
        assert!(matches!(err, QuizError::InvalidState { .. }));
        assert_eq!(s.state(), SessionState::AwaitingAnswer);
    }

    #[test]
    fn resubmission_is_rejected() {
        let (_, mut s) = session_with(vec![free(1, "x"), free(2, "y")]);
        s.submit_answer(Answer::Text("x".into())).unwrap();
        assert_eq!(s.state(), SessionState::Answered);
        let err = s.submit_answer(Answer::Text("x".into())).unwrap_err();
        assert!(matches!(err, QuizError::InvalidState { .. }));
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn accounting_holds_at_every_step() {
        let questions: Vec<Question> = (1..=6).map(|i| free(i, "yes")).collect();
        let (_, mut s) = session_with(questions);
        let inputs = ["yes", "no", "", "YES", "nope", "yes"];
        for (i, input) in inputs.iter().enumerate() {
            assert_eq!(s.score() + s.missed().len(), s.position());
            if i == 2 {
                // leave this one unanswered
            } else {
                s.submit_answer(Answer::Text((*input).into())).unwrap();
                assert_eq!(s.score() + s.missed().len(), s.position() + 1);
            }
            s.advance();
        }
        assert_eq!(s.score() + s.missed().len(), s.position());
        assert_eq!(s.position(), 6);
        assert_eq!(s.score(), 3);
        let missed: Vec<u32> = s.missed().iter().map(|q| q.id).collect();
        assert_eq!(missed, vec![2, 3, 5]);
    }

    #[test]
    fn finished_session_rejects_questions() {
        let (_, mut s) = session_with(vec![free(1, "x")]);
        s.submit_answer(Answer::Text("x".into())).unwrap();
        assert_eq!(s.advance(), SessionState::Finished);

        assert!(matches!(
            s.current_question().unwrap_err(),
            QuizError::InvalidState { .. }
        ));
        assert!(matches!(
            s.submit_answer(Answer::Text("x".into())).unwrap_err(),
            QuizError::InvalidState { .. }
        ));
        assert_eq!(s.advance(), SessionState::Finished);
        assert_eq!(s.position(), 1);
    }

    #[test]
    fn finish_requires_finished_state() {
        let (_, s) = session_with(vec![free(1, "x")]);
        assert!(matches!(
            s.finish().unwrap_err(),
            QuizError::InvalidState { .. }
        ));
    }

    #[test]
    fn finish_is_idempotent_and_elapsed_frozen() {
        let (clock, mut s) = session_with(vec![free(1, "x"), free(2, "y")]);
        clock.advance_secs(30);
        s.submit_answer(Answer::Text("x".into())).unwrap();
        s.advance();
        clock.advance_secs(45);
        s.submit_answer(Answer::Text("wrong".into())).unwrap();
        s.advance();

        let first = s.finish().unwrap();
        clock.advance_secs(600);
        let second = s.finish().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.elapsed, Duration::from_secs(75));
        assert_eq!(first.score, 1);
        assert_eq!(first.total, 2);
        assert_eq!(first.mistakes(), 1);
        assert_eq!(first.session_id, s.id());
    }

    #[test]
    fn elapsed_runs_while_in_progress() {
        let (clock, s) = session_with(vec![free(1, "x")]);
        assert_eq!(s.elapsed(), Duration::ZERO);
        clock.advance_secs(12);
        assert_eq!(s.elapsed(), Duration::from_secs(12));
    }

    #[test]
    fn empty_working_set_is_finished_immediately() {
        let (_, s) = session_with(vec![]);
        assert_eq!(s.state(), SessionState::Finished);
        let outcome = s.finish().unwrap();
        assert_eq!(outcome.total, 0);
        assert!(!outcome.has_errors());
    }

    #[test]
    fn parse_choices_extracts_letters() {
        assert_eq!(Answer::parse_choices("a, C"), BTreeSet::from(['A', 'C']));
        assert_eq!(Answer::parse_choices("bd"), BTreeSet::from(['B', 'D']));
        assert_eq!(Answer::parse_choices(" 1, ; "), BTreeSet::new());
        assert_eq!(Answer::parse_choices("A,a"), BTreeSet::from(['A']));
    }

    #[test]
    fn outcome_serializes_for_reporting() {
        let (clock, mut s) = session_with(vec![free(1, "x"), free(2, "y")]);
        s.submit_answer(Answer::Text("x".into())).unwrap();
        s.advance();
        s.advance();
        clock.advance_secs(5);

        let json = serde_json::to_value(s.finish().unwrap()).unwrap();
        assert_eq!(json["session_id"], s.id().to_string());
        assert_eq!(json["score"], 1);
        assert_eq!(json["total"], 2);
        assert_eq!(json["missed"][0]["id"], 2);
        assert_eq!(
            serde_json::to_value(SessionState::AwaitingAnswer).unwrap(),
            "awaiting_answer"
        );
    }
}
