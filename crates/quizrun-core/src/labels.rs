//! Randomised relabelling of multiple-select options.
//!
//! Each time a multiple-select question is shown its options are shuffled and
//! relabelled `A`, `B`, `C`, ... so the position of the correct option cannot
//! be learned from the storage order.

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::SliceRandom;
use rand::Rng;

/// A bijection between display letters and option keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterMap {
    /// `(letter, option key)` in display order.
    entries: Vec<(char, String)>,
}

impl LetterMap {
    /// Shuffle the option keys and assign consecutive letters from `A`.
    ///
    /// Covers at most [`MAX_OPTIONS`](crate::parser::MAX_OPTIONS) keys;
    /// the parser rejects larger option sets.
    pub fn shuffled<R: Rng + ?Sized>(options: &BTreeMap<String, String>, rng: &mut R) -> Self {
        let mut keys: Vec<&String> = options.keys().collect();
        keys.shuffle(rng);
        let entries = ('A'..='Z')
            .zip(keys)
            .map(|(letter, key)| (letter, key.clone()))
            .collect();
        Self { entries }
    }

    /// Letters in display order, each with its option key.
    pub fn entries(&self) -> impl Iterator<Item = (char, &str)> {
        self.entries.iter().map(|(l, k)| (*l, k.as_str()))
    }

    /// The option key behind a display letter.
    pub fn key_for(&self, letter: char) -> Option<&str> {
        let letter = letter.to_ascii_uppercase();
        self.entries
            .iter()
            .find(|(l, _)| *l == letter)
            .map(|(_, k)| k.as_str())
    }

    /// The display letter for an option key.
    pub fn letter_for(&self, key: &str) -> Option<char> {
        self.entries.iter().find(|(_, k)| k == key).map(|(l, _)| *l)
    }

    /// Translate chosen letters to option keys.
    ///
    /// Returns `None` if any letter is not on display, since a selection
    /// naming an option that does not exist can never be exactly right.
    pub fn translate(&self, letters: &BTreeSet<char>) -> Option<BTreeSet<String>> {
        letters
            .iter()
            .map(|&l| self.key_for(l).map(str::to_string))
            .collect()
    }

    /// Display letters of `keys`, sorted.
    pub fn letters_for(&self, keys: &BTreeSet<String>) -> Vec<char> {
        let mut letters: Vec<char> = keys.iter().filter_map(|k| self.letter_for(k)).collect();
        letters.sort_unstable();
        letters
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
