//! Lexicon transducer construction.
//!
//! Builds a transducer mapping sub-word symbol sequences (characters or
//! phonemes) to word identities, plus an optional character model that
//! accepts exactly the symbol sequences no known word spells out. The result
//! is meant to be composed with a language model by the OpenFst toolchain.
//!
//! # Architecture
//!
//! - [`base`] -- Reserved symbols and insertion primitives (`Lexicon`)
//! - [`prefix`] -- Prefix table of inserted spellings
//! - [`linear`] -- The linear lexicon and its character models
//! - [`assembly`] -- Dictionary-driven construction
//! - [`dictionary`] -- Word/spelling dictionaries from text or JSON

pub mod assembly;
pub mod base;
pub mod dictionary;
pub mod linear;
pub mod prefix;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use lexfst::{CompileOptions, FstError, Label, StateId};

pub use assembly::{AssemblyOptions, build_fst_for_lexicon};
pub use base::{Lexicon, ReservedSymbols};
pub use dictionary::{Dictionary, DictionaryEntry};
pub use linear::{CharacterModelMode, Linear};
pub use prefix::PrefixTable;

/// Error type for lexicon construction, dictionary loading and output.
#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    /// The character-loop state is not the state right after the word
    /// region, so the mirrored copy would collide with existing states.
    #[error("character loop state {actual} does not follow the word states (expected {expected})")]
    NonContiguousCopy { expected: StateId, actual: StateId },

    #[error(transparent)]
    Fst(#[from] FstError),

    #[error("dictionary line {line}: {message}")]
    Dictionary { line: usize, message: String },

    #[error("invalid JSON dictionary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown {kind} mode: {value}")]
    UnknownMode { kind: &'static str, value: String },
}

/// How a word's spelling is laid out in the word region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertionMode {
    /// Fresh chain per word, word identity on the first arc.
    #[default]
    Linear,
    /// Shared prefixes, word identity on the closing end-of-word arc.
    Trie,
}

impl FromStr for InsertionMode {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(InsertionMode::Linear),
            "trie" => Ok(InsertionMode::Trie),
            _ => Err(LexiconError::UnknownMode {
                kind: "insertion",
                value: s.to_string(),
            }),
        }
    }
}

/// Capabilities shared by lexicon variants: word insertion and
/// serialization over a [`Lexicon`] base.
pub trait WordLexicon<L: Label> {
    fn lexicon(&self) -> &Lexicon<L>;

    fn lexicon_mut(&mut self) -> &mut Lexicon<L>;

    /// Insert one word entry.
    fn add_word(&mut self, word: &L, spelling: &[L], mode: InsertionMode);

    /// See [`Lexicon::add_self_loops`].
    fn add_self_loops(&mut self, label: L) -> usize {
        self.lexicon_mut().add_self_loops(label)
    }

    /// See [`Lexicon::add_eos`].
    fn add_eos(&mut self, eos_label: L, eos_word: L, eow_label: Option<L>) {
        self.lexicon_mut().add_eos(eos_label, eos_word, eow_label);
    }

    fn get_txt(&self) -> String {
        self.lexicon().get_txt()
    }

    fn write_txt(&self, path: &Path) -> Result<(), LexiconError> {
        Ok(self.lexicon().write_txt(path)?)
    }

    /// Compile to an OpenFst binary. `CompileOptions::default()` keeps the
    /// automaton undeterminized and unminimized with output-label arc sort.
    fn write_fst(&self, path: &Path, options: &CompileOptions) -> Result<(), LexiconError> {
        Ok(self.lexicon().write_fst(path, options)?)
    }
}
