//! Derivation of a session's working set from a bank.
//!
//! All functions here are pure with respect to their input slice: they copy
//! the questions they select and never touch the bank.

use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{Question, QuestionKind};

/// Which part of an ordered sequence to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeSpec {
    /// Keep everything.
    #[default]
    All,
    /// Keep the first `n` questions.
    First(usize),
    /// Keep questions `start..=end`, 1-based.
    Between(usize, usize),
}

impl RangeSpec {
    /// Parse user input leniently.
    ///
    /// `""` selects everything, `"n"` the first `n`, `"a-b"` an inclusive
    /// 1-based range. Input that does not parse selects everything.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return RangeSpec::All;
        }

        let parsed = match input.split_once('-') {
            Some((start, end)) => start
                .trim()
                .parse::<usize>()
                .ok()
                .zip(end.trim().parse::<usize>().ok())
                .map(|(s, e)| RangeSpec::Between(s, e)),
            None => input.parse::<usize>().ok().map(RangeSpec::First),
        };

        parsed.unwrap_or_else(|| {
            tracing::debug!(input, "unparsable range, selecting everything");
            RangeSpec::All
        })
    }
}

impl FromStr for RangeSpec {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RangeSpec::parse(s))
    }
}

/// Parse a shuffle-mode count leniently: blank, unparsable or zero means all.
pub fn parse_count(input: &str) -> Option<usize> {
    input.trim().parse::<usize>().ok().filter(|&n| n > 0)
}

/// How the working set is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Keep source order, optionally restricted to a range.
    Ordered(RangeSpec),
    /// Random sample without replacement; `None` takes every question.
    Shuffled { count: Option<usize> },
}

impl Selection {
    pub fn is_ordered(&self) -> bool {
        matches!(self, Selection::Ordered(_))
    }
}

/// Questions of one kind, in their original order.
pub fn filter_by_kind(questions: &[Question], kind: QuestionKind) -> Vec<Question> {
    questions
        .iter()
        .filter(|q| q.kind() == kind)
        .cloned()
        .collect()
}

/// Select a contiguous part of `questions` per `range`.
///
/// `Between` is clamped to `1..=len`; if the clamped range is inverted the
/// whole sequence is returned.
pub fn select_ordered(questions: &[Question], range: RangeSpec) -> Vec<Question> {
    match range {
        RangeSpec::All => questions.to_vec(),
        RangeSpec::First(n) => questions[..n.min(questions.len())].to_vec(),
        RangeSpec::Between(start, end) => {
            let start = start.max(1);
            let end = end.min(questions.len());
            if start <= end {
                questions[start - 1..end].to_vec()
            } else {
                questions.to_vec()
            }
        }
    }
}

/// Shuffle a copy of `questions` and keep the first `count`.
pub fn select_shuffled<R: Rng + ?Sized>(
    questions: &[Question],
    count: Option<usize>,
    rng: &mut R,
) -> Vec<Question> {
    let mut shuffled = questions.to_vec();
    shuffled.shuffle(rng);
    if let Some(n) = count {
        shuffled.truncate(n);
    }
    shuffled
}

/// Build a working set from `questions` with an optional kind filter.
pub fn select<R: Rng + ?Sized>(
    questions: &[Question],
    kind: Option<QuestionKind>,
    selection: Selection,
    rng: &mut R,
) -> Vec<Question> {
    let pool = match kind {
        Some(kind) => filter_by_kind(questions, kind),
        None => questions.to_vec(),
    };
    match selection {
        Selection::Ordered(range) => select_ordered(&pool, range),
        Selection::Shuffled { count } => select_shuffled(&pool, count, rng),
    }
}
