//! Core data model types for quizrun.
//!
//! A `QuestionBank` is loaded once per source and shared read-only by every
//! session derived from it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One quiz item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Sequence number as stored in the source.
    pub id: u32,
    /// The prompt shown to the user.
    pub text: String,
    /// How the question is answered and graded.
    pub body: QuestionBody,
}

/// Grading data for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionBody {
    /// Fill-in-the-blank, graded by trimmed case-insensitive equality.
    FreeText { answer: String },
    /// Several labelled options, graded by exact set match.
    MultipleSelect {
        options: BTreeMap<String, String>,
        correct_keys: BTreeSet<String>,
    },
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        match self.body {
            QuestionBody::FreeText { .. } => QuestionKind::FreeText,
            QuestionBody::MultipleSelect { .. } => QuestionKind::MultipleSelect,
        }
    }
}

/// The two kinds of question a bank can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    FreeText,
    MultipleSelect,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::FreeText => write!(f, "free text"),
            QuestionKind::MultipleSelect => write!(f, "multiple select"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free_text" | "free-text" | "freetext" | "dariempire" => Ok(QuestionKind::FreeText),
            "multiple_select" | "multiple-select" | "multipleselect" | "crocette" => {
                Ok(QuestionKind::MultipleSelect)
            }
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// An immutable, ordered collection of questions from one source.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    name: String,
    questions: Arc<[Question]>,
}

impl QuestionBank {
    pub fn new(name: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            name: name.into(),
            questions: questions.into(),
        }
    }

    /// Display name of the source (the file stem for file-backed banks).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Number of questions of the given kind.
    pub fn count_kind(&self, kind: QuestionKind) -> usize {
        self.questions.iter().filter(|q| q.kind() == kind).count()
    }
}
