// Linear lexicon: word insertion with prefix bookkeeping, and the character
// model accepting symbol sequences that are not spelled out by any word.

use std::str::FromStr;

use lexfst::{Label, StateId};

use crate::base::{Lexicon, ReservedSymbols};
use crate::prefix::PrefixTable;
use crate::{InsertionMode, LexiconError, WordLexicon};

/// Construction strategy for the character model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharacterModelMode {
    /// Any sequence over the alphabet, words included.
    Flat,
    /// Prefix table inserted as a shared echoing trie.
    #[default]
    Trie,
    /// Prefix table inserted as independent echoing chains.
    Linear,
    /// Mirror of the word region. Only exact over a trie-shaped word
    /// region; after linear insertion the trie model is built instead.
    Copy,
}

impl FromStr for CharacterModelMode {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(CharacterModelMode::Flat),
            "trie" => Ok(CharacterModelMode::Trie),
            "linear" => Ok(CharacterModelMode::Linear),
            "copy" => Ok(CharacterModelMode::Copy),
            _ => Err(LexiconError::UnknownMode {
                kind: "character model",
                value: s.to_string(),
            }),
        }
    }
}

/// Default lexicon variant.
///
/// Words are inserted as linear chains (or a trie on request) while every
/// prefix of every spelling is recorded, so that a character model for
/// out-of-vocabulary spans can be derived afterwards.
#[derive(Debug, Clone)]
pub struct Linear<L: Label> {
    lexicon: Lexicon<L>,
    prefixes: PrefixTable<L>,
    /// Some word was inserted as a linear chain.
    has_linear_words: bool,
}

impl<L: Label> Linear<L> {
    pub fn new(symbols: ReservedSymbols<L>) -> Self {
        Self {
            lexicon: Lexicon::new(symbols),
            prefixes: PrefixTable::new(),
            has_linear_words: false,
        }
    }

    pub fn prefixes(&self) -> &PrefixTable<L> {
        &self.prefixes
    }

    /// Add the character model over the alphabet `labels`.
    ///
    /// Must run after all words are inserted: the trie, linear and copy
    /// modes read the finished prefix table or word region. `sow` is an
    /// optional start-of-word label, only used in flat mode. Returns the
    /// character-loop state.
    ///
    /// Copy mode mirrors the word region, and a linear chain only knows its
    /// own continuation: mirrored over linear words it would accept spelled
    /// out words as character runs. If any word was inserted linearly, copy
    /// mode logs a warning and builds the trie model, which accepts the
    /// same language.
    pub fn build_character_model(
        &mut self,
        labels: &[L],
        mode: CharacterModelMode,
        sow: Option<L>,
    ) -> Result<StateId, LexiconError> {
        if let Some(reserved) = labels
            .iter()
            .find(|label| self.lexicon.symbols().is_terminator(label))
        {
            tracing::warn!(
                label = %reserved,
                "alphabet contains a terminator label; its arcs will be indistinguishable from word ends"
            );
        }

        let mode = if mode == CharacterModelMode::Copy && self.has_linear_words {
            tracing::warn!(
                "copy character model requires trie word insertion; building the trie model instead"
            );
            CharacterModelMode::Trie
        } else {
            mode
        };

        let states_before = self.lexicon.fst().num_states();
        let loop_state = self.lexicon.add_characters_loop(labels);

        match mode {
            CharacterModelMode::Flat => self.add_flat_model(labels, loop_state, sow),
            CharacterModelMode::Copy => self
                .lexicon
                .build_character_model_from_word_model(labels, loop_state)?,
            CharacterModelMode::Trie | CharacterModelMode::Linear => {
                self.add_prefix_model(labels, loop_state, mode)
            }
        }

        tracing::debug!(
            ?mode,
            alphabet = labels.len(),
            new_states = self.lexicon.fst().num_states() - states_before,
            "built character model"
        );
        Ok(loop_state)
    }

    fn add_flat_model(&mut self, labels: &[L], loop_state: StateId, sow: Option<L>) {
        let start = self.lexicon.start_state();
        let entry = match sow {
            Some(sow) => {
                let entry = self.lexicon.fst_mut().add_state();
                self.lexicon
                    .fst_mut()
                    .add_arc(start, entry, sow.clone(), sow);
                entry
            }
            None => start,
        };
        for label in labels {
            self.lexicon
                .fst_mut()
                .add_arc(entry, loop_state, label.clone(), label.clone());
        }
    }

    /// Every prefix becomes an echoing path. Non-word prefixes may end with
    /// `eoc`; a label that leaves the prefix table falls into the loop.
    fn add_prefix_model(&mut self, labels: &[L], loop_state: StateId, mode: CharacterModelMode) {
        let start = self.lexicon.start_state();
        let eoc = self.lexicon.symbols().eoc.clone();
        for (prefix, is_word) in self.prefixes.iter() {
            let end = if mode == CharacterModelMode::Trie {
                self.lexicon.add_character_sequence_trie(prefix)
            } else {
                self.lexicon.add_character_sequence_linear(prefix)
            };

            if !is_word {
                self.lexicon
                    .fst_mut()
                    .add_arc(end, start, eoc.clone(), eoc.clone());
            }

            let mut extended = prefix.to_vec();
            for label in labels {
                extended.push(label.clone());
                if !self.prefixes.contains(&extended) {
                    self.lexicon
                        .fst_mut()
                        .add_arc(end, loop_state, label.clone(), label.clone());
                }
                extended.pop();
            }
        }
    }
}

impl<L: Label> WordLexicon<L> for Linear<L> {
    fn lexicon(&self) -> &Lexicon<L> {
        &self.lexicon
    }

    fn lexicon_mut(&mut self) -> &mut Lexicon<L> {
        &mut self.lexicon
    }

    fn add_word(&mut self, word: &L, spelling: &[L], mode: InsertionMode) {
        self.prefixes.insert_word(spelling);
        match mode {
            InsertionMode::Linear => {
                self.has_linear_words = true;
                self.lexicon.add_word_linear(word, spelling, true, None)
            }
            InsertionMode::Trie => self.lexicon.add_word_trie(word, spelling, true, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon(words: &[(&'static str, &[&'static str])], mode: InsertionMode) -> Linear<&'static str> {
        let mut lex = Linear::new(ReservedSymbols::new("<eps>", "#eow").with_eoc("#eoc"));
        for (word, spelling) in words {
            lex.add_word(word, spelling, mode);
        }
        lex
    }

    const A_AB: &[(&str, &[&str])] = &[("A", &["a"]), ("AB", &["a", "b"])];

    #[test]
    fn add_word_records_prefixes() {
        let lex = lexicon(&[("CAT", &["c", "a", "t"])], InsertionMode::Linear);
        let prefixes = lex.prefixes();
        assert_eq!(prefixes.get(&[]), Some(true));
        assert_eq!(prefixes.get(&["c"]), Some(false));
        assert_eq!(prefixes.get(&["c", "a"]), Some(false));
        assert_eq!(prefixes.get(&["c", "a", "t"]), Some(true));
    }

    #[test]
    fn trie_scenario_shares_first_state() {
        let lex = lexicon(A_AB, InsertionMode::Trie);
        let fst = lex.lexicon().fst();
        // One state per distinct non-empty prefix: "a" and "ab".
        assert_eq!(fst.num_states(), 3);
        let a = fst.find_arc(0, &"a").unwrap();
        assert_eq!(fst.arcs(0).len(), 1);
        assert_eq!(fst.find_arc(a.dst, &"#eow").unwrap().olabel, "A");
        let b = fst.find_arc(a.dst, &"b").unwrap();
        assert_eq!(fst.find_arc(b.dst, &"#eow").unwrap().olabel, "AB");
    }

    #[test]
    fn linear_round_trip_outputs_word_once() {
        let lex = lexicon(&[("CAT", &["c", "a", "t"])], InsertionMode::Linear);
        let fst = lex.lexicon().fst();
        let mut state = 0;
        let mut outputs = Vec::new();
        for symbol in ["c", "a", "t", "#eow"] {
            let arc = fst.find_arc(state, &symbol).unwrap();
            if arc.olabel != "<eps>" {
                outputs.push(arc.olabel);
            }
            state = arc.dst;
        }
        assert_eq!(state, 0);
        assert_eq!(outputs, ["CAT"]);
    }

    #[test]
    fn flat_model_accepts_words_too() {
        let mut lex = lexicon(A_AB, InsertionMode::Trie);
        let loop_state = lex
            .build_character_model(&["a", "b"], CharacterModelMode::Flat, None)
            .unwrap();
        let fst = lex.lexicon().fst();
        assert_eq!(fst.find_arc_with_output(0, &"a", &"a").unwrap().dst, loop_state);
        assert!(fst.accepts(&["a", "#eoc"]));
        assert!(fst.accepts(&["b", "a", "a", "#eoc"]));
        assert!(!fst.accepts(&["#eoc"]));
    }

    #[test]
    fn flat_model_with_start_of_word_label() {
        let mut lex = lexicon(A_AB, InsertionMode::Trie);
        lex.build_character_model(&["a", "b"], CharacterModelMode::Flat, Some("<w>"))
            .unwrap();
        let fst = lex.lexicon().fst();
        assert!(fst.accepts(&["<w>", "b", "#eoc"]));
        assert!(!fst.accepts(&["b", "#eoc"]));
    }

    #[test]
    fn trie_model_terminates_non_word_prefixes() {
        let mut lex = lexicon(&[("CAT", &["c", "a", "t"])], InsertionMode::Trie);
        lex.build_character_model(&["a", "c", "t"], CharacterModelMode::Trie, None)
            .unwrap();
        let fst = lex.lexicon().fst();
        assert!(fst.accepts(&["c", "#eoc"]));
        assert!(fst.accepts(&["c", "a", "#eoc"]));
        assert!(!fst.accepts(&["c", "a", "t", "#eoc"]));
        assert!(fst.accepts(&["c", "a", "t", "#eow"]));
        assert!(fst.accepts(&["c", "a", "t", "t", "#eoc"]));
        assert!(fst.accepts(&["a", "#eoc"]));
        assert!(!fst.accepts(&["#eoc"]));
    }

    #[test]
    fn copy_model_mirrors_word_states() {
        let mut lex = lexicon(A_AB, InsertionMode::Trie);
        let loop_state = lex
            .build_character_model(&["a", "b"], CharacterModelMode::Copy, None)
            .unwrap();
        let fst = lex.lexicon().fst();
        assert_eq!(loop_state, 3);
        // Twins of states 1 and 2.
        assert_eq!(fst.num_states(), 6);
        assert_eq!(fst.find_arc_with_output(0, &"a", &"a").unwrap().dst, 4);
        assert_eq!(fst.find_arc_with_output(0, &"b", &"b").unwrap().dst, loop_state);
        assert_eq!(fst.find_arc(4, &"b").unwrap().dst, 5);
        assert_eq!(fst.find_arc(4, &"a").unwrap().dst, loop_state);
        // Both prefixes are words: no eoc exits.
        assert!(fst.find_arc(4, &"#eoc").is_none());
        assert!(fst.find_arc(5, &"#eoc").is_none());
    }

    #[test]
    fn copy_after_other_states_is_rejected_not_corrupted() {
        let mut lex = lexicon(A_AB, InsertionMode::Trie);
        lex.build_character_model(&["a", "b"], CharacterModelMode::Copy, None)
            .unwrap();
        let loop_state = lex.lexicon_mut().add_characters_loop(&["a"]);
        lex.lexicon_mut().fst_mut().add_state();
        assert!(matches!(
            lex.lexicon_mut()
                .build_character_model_from_word_model(&["a"], loop_state),
            Err(LexiconError::NonContiguousCopy { .. })
        ));
    }

    #[test]
    fn character_model_mode_parsing() {
        for (text, mode) in [
            ("flat", CharacterModelMode::Flat),
            ("trie", CharacterModelMode::Trie),
            ("linear", CharacterModelMode::Linear),
            ("copy", CharacterModelMode::Copy),
        ] {
            assert_eq!(text.parse::<CharacterModelMode>().unwrap(), mode);
        }
        assert!("tree".parse::<CharacterModelMode>().is_err());
    }

    #[test]
    fn copy_over_linear_words_builds_trie_model() {
        let mut copy = lexicon(A_AB, InsertionMode::Linear);
        let loop_state = copy
            .build_character_model(&["a", "b"], CharacterModelMode::Copy, None)
            .unwrap();
        let mut trie = lexicon(A_AB, InsertionMode::Linear);
        trie.build_character_model(&["a", "b"], CharacterModelMode::Trie, None)
            .unwrap();

        // Same automaton as the trie model, no offset mirror.
        assert_eq!(copy.lexicon().get_txt(), trie.lexicon().get_txt());
        assert_eq!(loop_state, 4);
        let fst = copy.lexicon().fst();
        assert!(!fst.accepts(&["a", "#eoc"]));
        assert!(!fst.accepts(&["a", "b", "#eoc"]));
        assert!(fst.accepts(&["b", "#eoc"]));
    }
}
