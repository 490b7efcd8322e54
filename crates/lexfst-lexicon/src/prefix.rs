// Prefix table: every prefix of every inserted spelling, flagged with
// whether it is itself a complete word.

use hashbrown::HashMap;
use lexfst::Label;

/// Insertion-ordered map from label sequences to "is a complete word".
///
/// Invariants: the empty prefix is always present and marked as a word
/// (the start state is final); every prefix of a recorded word is present;
/// a `true` flag is never downgraded.
#[derive(Debug, Clone)]
pub struct PrefixTable<L: Label> {
    entries: Vec<(Vec<L>, bool)>,
    index: HashMap<Vec<L>, usize>,
}

impl<L: Label> Default for PrefixTable<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Label> PrefixTable<L> {
    pub fn new() -> Self {
        let mut table = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        table.mark(&[], true);
        table
    }

    /// Record `spelling` as a word and all of its shorter prefixes.
    pub fn insert_word(&mut self, spelling: &[L]) {
        for end in 0..spelling.len() {
            self.mark(&spelling[..end], false);
        }
        self.mark(spelling, true);
    }

    /// Add `prefix` if absent; upgrade it to a word if `is_word`.
    pub fn mark(&mut self, prefix: &[L], is_word: bool) {
        match self.index.get(prefix) {
            Some(&i) => self.entries[i].1 |= is_word,
            None => {
                self.index.insert(prefix.to_vec(), self.entries.len());
                self.entries.push((prefix.to_vec(), is_word));
            }
        }
    }

    /// `Some(is_word)` for recorded prefixes.
    pub fn get(&self, prefix: &[L]) -> Option<bool> {
        self.index.get(prefix).map(|&i| self.entries[i].1)
    }

    pub fn contains(&self, prefix: &[L]) -> bool {
        self.index.contains_key(prefix)
    }

    pub fn is_word(&self, prefix: &[L]) -> bool {
        self.get(prefix).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: the empty prefix is always recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&[L], bool)> {
        self.entries
            .iter()
            .map(|(prefix, is_word)| (prefix.as_slice(), *is_word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prefix_is_a_word() {
        let table: PrefixTable<char> = PrefixTable::new();
        assert_eq!(table.get(&[]), Some(true));
        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
    }

    #[test]
    fn all_prefixes_recorded() {
        let mut table = PrefixTable::new();
        table.insert_word(&['c', 'a', 't']);
        assert_eq!(table.get(&['c']), Some(false));
        assert_eq!(table.get(&['c', 'a']), Some(false));
        assert_eq!(table.get(&['c', 'a', 't']), Some(true));
        assert_eq!(table.get(&['a']), None);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn word_flag_is_sticky() {
        let mut table = PrefixTable::new();
        table.insert_word(&['a']);
        table.insert_word(&['a', 'b']);
        assert!(table.is_word(&['a']));

        let mut table = PrefixTable::new();
        table.insert_word(&['a', 'b']);
        assert!(!table.is_word(&['a']));
        table.insert_word(&['a']);
        assert!(table.is_word(&['a']));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut table = PrefixTable::new();
        table.insert_word(&["b", "a"]);
        table.insert_word(&["a"]);
        let keys: Vec<Vec<&str>> = table.iter().map(|(p, _)| p.to_vec()).collect();
        assert_eq!(keys, vec![vec![], vec!["b"], vec!["b", "a"], vec!["a"]]);
    }
}
