//! The collection of summaries produced by a reduction run.
//!
//! Entries are kept as an append-only log plus an index from word count to
//! the live log position. Keys are measured, never supplied: [`SummarySet::insert`]
//! counts the words itself. When a new summary lands on a word count that is
//! already present it **replaces** the visible entry; the superseded text stays
//! in the log (see [`SummarySet::history`]) but lookups no longer see it.

use crate::pipeline::chunk::word_count;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key under which the one-word label is stored.
pub const LABEL_KEY: usize = 1;

/// One logged summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub word_count: usize,
    pub text: String,
    /// Reduction round that produced it: 0 for the source text, `None` for
    /// the label.
    pub round: Option<usize>,
}

/// Summaries keyed by word count, read in ascending key order.
///
/// Serialized as its log. Deserializing replays the log through the same
/// path as [`SummarySet::insert`], so keys are re-measured from the text and
/// a stored `word_count` is never trusted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<SummaryEntry>", into = "Vec<SummaryEntry>")]
pub struct SummarySet {
    log: Vec<SummaryEntry>,
    index: BTreeMap<usize, usize>,
}

/// What [`SummarySet::insert`] did with the new text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Added { word_count: usize },
    /// Same word count already present; the old text was replaced.
    Replaced { word_count: usize, previous: String },
}

impl InsertOutcome {
    pub fn word_count(&self) -> usize {
        match self {
            InsertOutcome::Added { word_count } | InsertOutcome::Replaced { word_count, .. } => {
                *word_count
            }
        }
    }
}

impl SummarySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `text` under its measured word count.
    pub fn insert(&mut self, text: impl Into<String>, round: usize) -> InsertOutcome {
        let text = text.into();
        let key = word_count(&text);
        self.push(key, text, Some(round))
    }

    /// Record the one-word label under [`LABEL_KEY`], whatever its length.
    pub fn insert_label(&mut self, label: impl Into<String>) -> InsertOutcome {
        self.push(LABEL_KEY, label.into(), None)
    }

    fn push(&mut self, key: usize, text: String, round: Option<usize>) -> InsertOutcome {
        self.log.push(SummaryEntry {
            word_count: key,
            text,
            round,
        });
        let position = self.log.len() - 1;
        match self.index.insert(key, position) {
            None => InsertOutcome::Added { word_count: key },
            Some(old) => InsertOutcome::Replaced {
                word_count: key,
                previous: self.log[old].text.clone(),
            },
        }
    }

    pub fn get(&self, word_count: usize) -> Option<&str> {
        self.index
            .get(&word_count)
            .map(|&pos| self.log[pos].text.as_str())
    }

    /// Smallest word count present.
    pub fn min_key(&self) -> Option<usize> {
        self.index.keys().next().copied()
    }

    /// Entry with the smallest word count.
    pub fn shortest(&self) -> Option<&SummaryEntry> {
        self.index.values().next().map(|&pos| &self.log[pos])
    }

    /// Shortest entry whose word count is strictly greater than `words`.
    pub fn shortest_above(&self, words: usize) -> Option<&SummaryEntry> {
        self.index
            .range(words.saturating_add(1)..)
            .next()
            .map(|(_, &pos)| &self.log[pos])
    }

    /// Visible entries in ascending word-count order.
    pub fn iter(&self) -> impl Iterator<Item = &SummaryEntry> + '_ {
        self.index.values().map(|&pos| &self.log[pos])
    }

    /// Every entry ever recorded, in insertion order, including replaced ones.
    pub fn history(&self) -> &[SummaryEntry] {
        &self.log
    }

    /// Number of visible entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl From<Vec<SummaryEntry>> for SummarySet {
    fn from(log: Vec<SummaryEntry>) -> Self {
        let mut set = SummarySet::new();
        for entry in log {
            match entry.round {
                Some(round) => set.insert(entry.text, round),
                None => set.insert_label(entry.text),
            };
        }
        set
    }
}

impl From<SummarySet> for Vec<SummaryEntry> {
    fn from(set: SummarySet) -> Self {
        set.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_measured_word_count() {
        let mut set = SummarySet::new();
        let outcome = set.insert("one two three", 0);
        assert_eq!(outcome, InsertOutcome::Added { word_count: 3 });
        assert_eq!(set.get(3), Some("one two three"));
    }

    #[test]
    fn collision_replaces_visible_entry_and_keeps_history() {
        let mut set = SummarySet::new();
        set.insert("alpha beta", 1);
        let outcome = set.insert("gamma delta", 2);

        assert_eq!(
            outcome,
            InsertOutcome::Replaced {
                word_count: 2,
                previous: "alpha beta".into()
            }
        );
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(2), Some("gamma delta"));
        assert_eq!(set.history().len(), 2);
        assert_eq!(set.history()[0].text, "alpha beta");
    }

    #[test]
    fn iterates_ascending_regardless_of_insert_order() {
        let mut set = SummarySet::new();
        set.insert("a b c d e", 0);
        set.insert("a", 2);
        set.insert("a b c", 1);
        let keys: Vec<usize> = set.iter().map(|e| e.word_count).collect();
        assert_eq!(keys, vec![1, 3, 5]);
        assert_eq!(set.min_key(), Some(1));
        assert_eq!(set.shortest().map(|e| e.text.as_str()), Some("a"));
    }

    #[test]
    fn shortest_above_is_strict() {
        let mut set = SummarySet::new();
        set.insert("w ".repeat(250), 1);
        set.insert("w ".repeat(400), 0);
        set.insert("w ".repeat(90), 2);
        assert_eq!(set.shortest_above(250).map(|e| e.word_count), Some(400));
        assert_eq!(set.shortest_above(89).map(|e| e.word_count), Some(90));
        assert!(set.shortest_above(400).is_none());
    }

    #[test]
    fn label_goes_under_key_one() {
        let mut set = SummarySet::new();
        set.insert("long text here", 0);
        set.insert_label("Honey pot");
        assert_eq!(set.get(LABEL_KEY), Some("Honey pot"));
        assert_eq!(set.shortest().and_then(|e| e.round), None);
    }

    #[test]
    fn empty_set() {
        let set = SummarySet::new();
        assert!(set.is_empty());
        assert_eq!(set.min_key(), None);
        assert!(set.shortest().is_none());
    }

    #[test]
    fn deserialize_remeasures_keys() {
        let json = r#"[{"word_count":7,"text":"two words","round":0}]"#;
        let set: SummarySet = serde_json::from_str(json).unwrap();
        assert_eq!(set.get(2), Some("two words"));
        assert_eq!(set.get(7), None);
        assert_eq!(set.history()[0].word_count, 2);
    }

    #[test]
    fn deserialized_label_stays_under_key_one() {
        let json = r#"[
            {"word_count":3,"text":"one two three","round":0},
            {"word_count":40,"text":"Honey pot","round":null}
        ]"#;
        let set: SummarySet = serde_json::from_str(json).unwrap();
        assert_eq!(set.get(LABEL_KEY), Some("Honey pot"));
        assert_eq!(set.get(3), Some("one two three"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn json_keeps_visible_entries_and_history() {
        let mut set = SummarySet::new();
        set.insert("alpha beta", 1);
        set.insert("gamma delta", 2);
        set.insert("a b c d e", 0);
        set.insert_label("Greek");

        let json = serde_json::to_string(&set).unwrap();
        let back: SummarySet = serde_json::from_str(&json).unwrap();

        assert_eq!(back.history(), set.history());
        assert_eq!(back.iter().collect::<Vec<_>>(), set.iter().collect::<Vec<_>>());
        assert_eq!(back.get(2), Some("gamma delta"));
    }
}
