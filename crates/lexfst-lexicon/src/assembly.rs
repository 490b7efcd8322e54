// Dictionary-driven lexicon construction: insert all words, then build the
// character model.

use hashbrown::HashSet;
use lexfst::Label;

use crate::base::ReservedSymbols;
use crate::linear::{CharacterModelMode, Linear};
use crate::{InsertionMode, LexiconError, WordLexicon};

/// Options for [`build_fst_for_lexicon`].
#[derive(Debug, Clone)]
pub struct AssemblyOptions<L> {
    pub build_character_model: bool,
    pub mode: CharacterModelMode,
    /// Character-model alphabet. Empty means every symbol used by the
    /// dictionary, in first-seen order.
    pub labels: Vec<L>,
    /// Start-of-word label for the flat character model.
    pub sow: Option<L>,
    pub insertion: InsertionMode,
}

impl<L> Default for AssemblyOptions<L> {
    fn default() -> Self {
        Self {
            build_character_model: false,
            mode: CharacterModelMode::default(),
            labels: Vec::new(),
            sow: None,
            insertion: InsertionMode::default(),
        }
    }
}

/// Build a [`Linear`] lexicon for `dictionary`.
///
/// Every entry is inserted before the character model is built, since the
/// trie, linear and copy models read the finished prefix table and word
/// region.
pub fn build_fst_for_lexicon<L, I, S>(
    dictionary: I,
    symbols: ReservedSymbols<L>,
    options: &AssemblyOptions<L>,
) -> Result<Linear<L>, LexiconError>
where
    L: Label,
    I: IntoIterator<Item = (L, S)>,
    S: AsRef<[L]>,
{
    let mut lexicon = Linear::new(symbols);
    let derive_alphabet = options.build_character_model && options.labels.is_empty();
    let mut alphabet = Vec::new();
    let mut seen = HashSet::new();

    let mut words = 0usize;
    for (word, spelling) in dictionary {
        let spelling = spelling.as_ref();
        if derive_alphabet {
            for symbol in spelling {
                if seen.insert(symbol.clone()) {
                    alphabet.push(symbol.clone());
                }
            }
        }
        lexicon.add_word(&word, spelling, options.insertion);
        words += 1;
    }
    tracing::info!(
        words,
        states = lexicon.lexicon().fst().num_states(),
        insertion = ?options.insertion,
        "inserted dictionary"
    );

    if options.build_character_model {
        let labels = if derive_alphabet {
            &alphabet
        } else {
            &options.labels
        };
        lexicon.build_character_model(labels, options.mode, options.sow.clone())?;
        tracing::info!(
            mode = ?options.mode,
            states = lexicon.lexicon().fst().num_states(),
            arcs = lexicon.lexicon().fst().num_arcs(),
            "built character model"
        );
    }

    Ok(lexicon)
}
