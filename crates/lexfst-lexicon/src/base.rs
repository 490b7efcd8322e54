// Lexicon base: reserved symbols and the insertion primitives every lexicon
// variant builds on.

use std::path::Path;

use lexfst::{CompileOptions, FstError, Label, SimpleFst, StateId};

use crate::LexiconError;

/// Labels with structural meaning in the lexicon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedSymbols<L> {
    /// No input / no output.
    pub eps: L,
    /// Closes a word's spelling on the arc back to the start state.
    pub eow: L,
    /// Closes a character run of the character model.
    pub eoc: L,
    /// Optional pause that may also close a word.
    pub sil: Option<L>,
}

impl<L: Label> ReservedSymbols<L> {
    /// `eoc` defaults to `eow`, no silence.
    pub fn new(eps: L, eow: L) -> Self {
        Self {
            eps,
            eoc: eow.clone(),
            eow,
            sil: None,
        }
    }

    pub fn with_eoc(mut self, eoc: L) -> Self {
        self.eoc = eoc;
        self
    }

    pub fn with_sil(mut self, sil: L) -> Self {
        self.sil = Some(sil);
        self
    }

    /// True for the terminators and silence, the labels that must not double
    /// as alphabet symbols.
    pub fn is_terminator(&self, label: &L) -> bool {
        *label == self.eow || *label == self.eoc || self.sil.as_ref() == Some(label)
    }
}

/// Lexicon transducer under construction.
///
/// Owns the automaton and its single start state, which is also final so
/// that the lexicon accepts any concatenation of complete words. All
/// insertion primitives start from and return to that state.
#[derive(Debug, Clone)]
pub struct Lexicon<L: Label> {
    fst: SimpleFst<L>,
    start: StateId,
    symbols: ReservedSymbols<L>,
}

impl<L: Label> Lexicon<L> {
    pub fn new(symbols: ReservedSymbols<L>) -> Self {
        let mut fst = SimpleFst::new(symbols.eps.clone());
        let start = fst.add_start_state(true);
        Self {
            fst,
            start,
            symbols,
        }
    }

    pub fn fst(&self) -> &SimpleFst<L> {
        &self.fst
    }

    /// Raw access for lexicon variants that add their own structure.
    pub fn fst_mut(&mut self) -> &mut SimpleFst<L> {
        &mut self.fst
    }

    pub fn start_state(&self) -> StateId {
        self.start
    }

    pub fn symbols(&self) -> &ReservedSymbols<L> {
        &self.symbols
    }

    /// Let `label` pass through the lexicon at every position: adds a
    /// `label:label` loop on each emitting state. Typically used for the
    /// back-off label of the language model. Returns the number of loops.
    pub fn add_self_loops(&mut self, label: L) -> usize {
        let added = self.fst.add_self_loops(label.clone(), label);
        tracing::debug!(loops = added, "added self loops");
        added
    }

    /// Map `eos_word` to the input `[eos_label, eow_label]`.
    ///
    /// `eow_label` defaults to epsilon. No silence arc is added: the end of
    /// a sentence is never optional.
    pub fn add_eos(&mut self, eos_label: L, eos_word: L, eow_label: Option<L>) {
        let eow = eow_label.unwrap_or_else(|| self.symbols.eps.clone());
        self.add_word_linear(&eos_word, &[eos_label], false, Some(&eow));
    }

    pub fn get_txt(&self) -> String {
        self.fst.get_txt()
    }

    pub fn write_txt(&self, path: impl AsRef<Path>) -> Result<(), FstError> {
        self.fst.write_txt(path)
    }

    pub fn write_fst(&self, path: impl AsRef<Path>, options: &CompileOptions) -> Result<(), FstError> {
        self.fst.write_fst(path, options)
    }

    /// Insert a word as a chain of fresh states.
    ///
    /// The word identity goes on the first arc so that composition with a
    /// word-level language model can resolve it early; later arcs emit
    /// epsilon. The chain returns to the start state on `eow` (or the
    /// override), plus on `sil` when silence is configured and `add_sil` is
    /// set. An empty spelling only adds the return arcs on the start state.
    pub fn add_word_linear(&mut self, word: &L, spelling: &[L], add_sil: bool, eow: Option<&L>) {
        let eps = &self.symbols.eps;
        let mut current = self.start;
        for (i, symbol) in spelling.iter().enumerate() {
            let next = self.fst.add_state();
            let output = if i == 0 { word } else { eps };
            self.fst.add_arc(current, next, symbol.clone(), output.clone());
            current = next;
        }

        let eow = eow.unwrap_or(&self.symbols.eow);
        self.fst
            .add_arc(current, self.start, eow.clone(), eps.clone());
        if add_sil {
            if let Some(sil) = &self.symbols.sil {
                self.fst
                    .add_arc(current, self.start, sil.clone(), eps.clone());
            }
        }
    }

    /// Insert a word following existing `symbol:eps` arcs, building a trie.
    ///
    /// The identity is only known once the whole shared path is consumed, so
    /// it is emitted on the `eow` arc back to start (and on the `sil` arc
    /// when silence is configured and `add_sil` is set).
    pub fn add_word_trie(&mut self, word: &L, spelling: &[L], add_sil: bool, eow: Option<&L>) {
        let eps = &self.symbols.eps;
        let mut current = self.start;
        for symbol in spelling {
            current = match self.fst.find_arc_with_output(current, symbol, eps) {
                Some(arc) => arc.dst,
                None => {
                    let next = self.fst.add_state();
                    self.fst
                        .add_arc(current, next, symbol.clone(), eps.clone());
                    next
                }
            };
        }

        let eow = eow.unwrap_or(&self.symbols.eow);
        self.fst
            .add_arc(current, self.start, eow.clone(), word.clone());
        if add_sil {
            if let Some(sil) = &self.symbols.sil {
                self.fst
                    .add_arc(current, self.start, sil.clone(), word.clone());
            }
        }
    }

    /// New state looping on every label in `labels` (echoing it) with one
    /// `eoc:eoc` arc back to start.
    pub fn add_characters_loop(&mut self, labels: &[L]) -> StateId {
        let loop_state = self.fst.add_state();
        let eoc = self.symbols.eoc.clone();
        self.fst.add_arc(loop_state, self.start, eoc.clone(), eoc);
        for label in labels {
            self.fst
                .add_arc(loop_state, loop_state, label.clone(), label.clone());
        }
        loop_state
    }

    /// Echo `sequence` on a fresh chain from start; returns its last state.
    pub fn add_character_sequence_linear(&mut self, sequence: &[L]) -> StateId {
        let mut current = self.start;
        for symbol in sequence {
            let next = self.fst.add_state();
            self.fst
                .add_arc(current, next, symbol.clone(), symbol.clone());
            current = next;
        }
        current
    }

    /// Echo `sequence` following existing `symbol:symbol` arcs; returns the
    /// last state.
    pub fn add_character_sequence_trie(&mut self, sequence: &[L]) -> StateId {
        let mut current = self.start;
        for symbol in sequence {
            current = match self.fst.find_arc_with_output(current, symbol, symbol) {
                Some(arc) => arc.dst,
                None => {
                    let next = self.fst.add_state();
                    self.fst
                        .add_arc(current, next, symbol.clone(), symbol.clone());
                    next
                }
            };
        }
        current
    }

    /// Mirror the word region into a character model.
    ///
    /// Word state `s` (for `s` in `1..loop_state`) gets a twin `loop_state + s`
    /// that echoes its input. Twins copy every non-terminating arc of their
    /// original, fall into `loop_state` on each label the original cannot
    /// continue with, and close with `eoc:eoc` when the original is not the
    /// end of a word. The start state's copies lead into the twins directly.
    ///
    /// `loop_state` must be the last allocated state, sitting right after the
    /// word region.
    pub fn build_character_model_from_word_model(
        &mut self,
        labels: &[L],
        loop_state: StateId,
    ) -> Result<(), LexiconError> {
        let expected = self.fst.num_states() as StateId - 1;
        if loop_state != expected || self.start != 0 {
            return Err(LexiconError::NonContiguousCopy {
                expected,
                actual: loop_state,
            });
        }

        let start = self.start;
        self.fst.add_states(loop_state as usize - 1);

        let first_symbols: Vec<(StateId, L)> = self
            .fst
            .arcs(start)
            .iter()
            .filter(|arc| arc.dst != start && arc.dst < loop_state)
            .map(|arc| (arc.dst, arc.ilabel.clone()))
            .collect();
        for (dst, ilabel) in first_symbols {
            self.fst
                .add_arc(start, loop_state + dst, ilabel.clone(), ilabel);
        }
        for label in labels {
            if self.fst.find_arc(start, label).is_none() {
                self.fst
                    .add_arc(start, loop_state, label.clone(), label.clone());
            }
        }

        let eow = self.symbols.eow.clone();
        let eoc = self.symbols.eoc.clone();
        for state in 1..loop_state {
            let twin = loop_state + state;
            let continuations: Vec<(StateId, L)> = self
                .fst
                .arcs(state)
                .iter()
                .filter(|arc| arc.ilabel != eow && self.symbols.sil.as_ref() != Some(&arc.ilabel))
                .map(|arc| (arc.dst, arc.ilabel.clone()))
                .collect();
            for (dst, ilabel) in continuations {
                self.fst
                    .add_arc(twin, loop_state + dst, ilabel.clone(), ilabel);
            }
            for label in labels {
                if self.fst.find_arc(state, label).is_none() {
                    self.fst
                        .add_arc(twin, loop_state, label.clone(), label.clone());
                }
            }
            if self.fst.find_arc(state, &eow).is_none() {
                self.fst.add_arc(twin, start, eoc.clone(), eoc.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols() -> ReservedSymbols<&'static str> {
        ReservedSymbols::new("<eps>", "#eow").with_eoc("#eoc")
    }

    #[test]
    fn start_state_is_start_and_final() {
        let lex = Lexicon::new(symbols());
        assert_eq!(lex.fst().start(), Some(lex.start_state()));
        assert!(lex.fst().is_final(lex.start_state()));
        assert!(lex.fst().accepts(&[]));
        assert_eq!(lex.fst().num_states(), 1);
    }

    #[test]
    fn eoc_defaults_to_eow() {
        let s = ReservedSymbols::new(0u32, 1);
        assert_eq!(s.eoc, 1);
        assert_eq!(s.sil, None);
        let s = s.with_eoc(2).with_sil(3);
        assert!(s.is_terminator(&1) && s.is_terminator(&2) && s.is_terminator(&3));
        assert!(!s.is_terminator(&0));
    }

    #[test]
    fn linear_word_emits_identity_on_first_arc() {
        let mut lex = Lexicon::new(symbols());
        lex.add_word_linear(&"CAT", &["c", "a", "t"], true, None);
        let fst = lex.fst();

        let first = fst.find_arc(0, &"c").unwrap();
        assert_eq!(first.olabel, "CAT");
        let second = fst.find_arc(first.dst, &"a").unwrap();
        assert_eq!(second.olabel, "<eps>");
        let third = fst.find_arc(second.dst, &"t").unwrap();
        assert_eq!(third.olabel, "<eps>");
        let back = fst.find_arc(third.dst, &"#eow").unwrap();
        assert_eq!((back.dst, back.olabel), (0, "<eps>"));
        // No silence configured.
        assert_eq!(fst.arcs(third.dst).len(), 1);
        assert!(fst.accepts(&["c", "a", "t", "#eow"]));
    }

    #[test]
    fn linear_words_never_share_states() {
        let mut lex = Lexicon::new(symbols());
        lex.add_word_linear(&"A", &["a"], true, None);
        lex.add_word_linear(&"AB", &["a", "b"], true, None);
        assert_eq!(lex.fst().num_states(), 4);
        assert_eq!(lex.fst().arcs(0).len(), 2);
    }

    #[test]
    fn silence_adds_parallel_return_arc() {
        let mut lex = Lexicon::new(symbols().with_sil("<sil>"));
        lex.add_word_linear(&"A", &["a"], true, None);
        lex.add_word_trie(&"B", &["b"], true, None);
        lex.add_word_linear(&"C", &["c"], false, None);

        let a = lex.fst().find_arc(0, &"a").unwrap().dst;
        let sil = lex.fst().find_arc(a, &"<sil>").unwrap();
        assert_eq!((sil.dst, sil.olabel), (0, "<eps>"));

        let b = lex.fst().find_arc(0, &"b").unwrap().dst;
        let sil = lex.fst().find_arc(b, &"<sil>").unwrap();
        assert_eq!((sil.dst, sil.olabel), (0, "B"));

        let c = lex.fst().find_arc(0, &"c").unwrap().dst;
        assert!(lex.fst().find_arc(c, &"<sil>").is_none());
    }

    #[test]
    fn trie_shares_prefix_states() {
        let mut lex = Lexicon::new(symbols());
        lex.add_word_trie(&"CAT", &["c", "a", "t"], true, None);
        let before = lex.fst().num_states();
        lex.add_word_trie(&"CAR", &["c", "a", "r"], true, None);
        // Shared prefix of two symbols: only one new state.
        assert_eq!(lex.fst().num_states() - before, 1);

        let c = lex.fst().find_arc(0, &"c").unwrap();
        assert_eq!(c.olabel, "<eps>");
        let a = lex.fst().find_arc(c.dst, &"a").unwrap().dst;
        let r = lex.fst().find_arc(a, &"r").unwrap().dst;
        let back = lex.fst().find_arc(r, &"#eow").unwrap();
        assert_eq!((back.dst, back.olabel), (0, "CAR"));
    }

    #[test]
    fn eow_override_is_used() {
        let mut lex = Lexicon::new(symbols());
        lex.add_word_trie(&"A", &["a"], true, Some(&"#alt"));
        let a = lex.fst().find_arc(0, &"a").unwrap().dst;
        assert!(lex.fst().find_arc(a, &"#alt").is_some());
        assert!(lex.fst().find_arc(a, &"#eow").is_none());
    }

    #[test]
    fn eos_maps_single_label_with_epsilon_return() {
        let mut lex = Lexicon::new(symbols().with_sil("<sil>"));
        lex.add_eos("</s>", "EOS", None);
        let first = lex.fst().find_arc(0, &"</s>").unwrap();
        assert_eq!(first.olabel, "EOS");
        let arcs = lex.fst().arcs(first.dst);
        assert_eq!(arcs.len(), 1);
        assert_eq!((arcs[0].dst, arcs[0].ilabel, arcs[0].olabel), (0, "<eps>", "<eps>"));
        assert!(lex.fst().accepts(&["</s>"]));
    }

    #[test]
    fn eos_with_explicit_eow_label() {
        let mut lex = Lexicon::new(symbols());
        lex.add_eos("</s>", "EOS", Some("#eow"));
        assert!(lex.fst().accepts(&["</s>", "#eow"]));
        assert!(!lex.fst().accepts(&["</s>"]));
    }

    #[test]
    fn self_loops_on_two_emitting_states() {
        // Word "ab" closed by epsilon: states 1 and 2 are entered on
        // non-epsilon input, the start state only on epsilon.
        let mut lex = Lexicon::new(symbols());
        lex.add_word_linear(&"AB", &["a", "b"], false, Some(&"<eps>"));
        let states = lex.fst().num_states();
        let arcs = lex.fst().num_arcs();

        assert_eq!(lex.add_self_loops("UNK"), 2);
        assert_eq!(lex.fst().num_states(), states);
        assert_eq!(lex.fst().num_arcs(), arcs + 2);
        for state in [1, 2] {
            let arc = lex.fst().find_arc(state, &"UNK").unwrap();
            assert_eq!((arc.src, arc.dst, arc.ilabel, arc.olabel), (state, state, "UNK", "UNK"));
        }
    }

    #[test]
    fn characters_loop_echoes_and_terminates() {
        let mut lex = Lexicon::new(symbols());
        let loop_state = lex.add_characters_loop(&["a", "b"]);
        let back = lex.fst().find_arc(loop_state, &"#eoc").unwrap();
        assert_eq!((back.dst, back.olabel), (0, "#eoc"));
        for label in ["a", "b"] {
            let arc = lex.fst().find_arc(loop_state, &label).unwrap();
            assert_eq!((arc.dst, arc.olabel), (loop_state, label));
        }
    }

    #[test]
    fn character_sequences_trie_vs_linear() {
        let mut lex = Lexicon::new(symbols());
        let end = lex.add_character_sequence_trie(&["a", "b"]);
        assert_eq!(lex.add_character_sequence_trie(&["a", "b"]), end);
        assert_eq!(lex.add_character_sequence_trie(&[]), 0);
        let states = lex.fst().num_states();
        let fresh = lex.add_character_sequence_linear(&["a", "b"]);
        assert_ne!(fresh, end);
        assert_eq!(lex.fst().num_states(), states + 2);
        assert_eq!(lex.add_character_sequence_linear(&[]), 0);
    }

    #[test]
    fn copy_rejects_non_contiguous_loop_state() {
        let mut lex = Lexicon::new(symbols());
        lex.add_word_trie(&"A", &["a"], true, None);
        let loop_state = lex.add_characters_loop(&["a"]);
        lex.add_word_trie(&"B", &["b"], true, None);
        let err = lex
            .build_character_model_from_word_model(&["a", "b"], loop_state)
            .unwrap_err();
        assert!(matches!(
            err,
            LexiconError::NonContiguousCopy { expected: 3, actual: 2 }
        ));
    }
}
