// Symbol table: label-to-index and index-to-string mapping in OpenFst
// symbol-table text format.

use std::fs;
use std::path::Path;

use hashbrown::HashMap;

use crate::simple::SimpleFst;
use crate::{FstError, Label};

/// Integer ids for string labels, as consumed by
/// `fstcompile --isymbols=... --osymbols=...`.
///
/// The epsilon symbol is always index 0; every other symbol gets the next
/// free index on first insertion.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    /// Maps symbol index to its string representation.
    symbol_strings: Vec<String>,
    /// Maps a symbol string to its index.
    string_to_index: HashMap<String, u32>,
}

impl SymbolTable {
    pub fn new(epsilon: impl Into<String>) -> Self {
        let epsilon = epsilon.into();
        let mut string_to_index = HashMap::new();
        string_to_index.insert(epsilon.clone(), 0);
        Self {
            symbol_strings: vec![epsilon],
            string_to_index,
        }
    }

    /// Collect every label of `fst` (inputs and outputs) in arc order.
    ///
    /// The transducer's epsilon becomes index 0.
    pub fn from_fst<L: Label>(fst: &SimpleFst<L>) -> Self {
        let mut table = Self::new(fst.epsilon().to_string());
        for state in fst.state_ids() {
            for arc in fst.arcs(state) {
                table.add_symbol(arc.ilabel.to_string());
                table.add_symbol(arc.olabel.to_string());
            }
        }
        table
    }

    /// Index of `symbol`, inserting it if unseen.
    pub fn add_symbol(&mut self, symbol: impl Into<String>) -> u32 {
        let symbol = symbol.into();
        if let Some(&index) = self.string_to_index.get(&symbol) {
            return index;
        }
        let index = self.symbol_strings.len() as u32;
        self.string_to_index.insert(symbol.clone(), index);
        self.symbol_strings.push(symbol);
        index
    }

    pub fn get_label(&self, symbol: &str) -> Option<u32> {
        self.string_to_index.get(symbol).copied()
    }

    pub fn get_symbol(&self, index: u32) -> Option<&str> {
        self.symbol_strings.get(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbol_strings.len()
    }

    /// Always false: the epsilon entry is present from construction.
    pub fn is_empty(&self) -> bool {
        self.symbol_strings.is_empty()
    }

    /// `symbol\tindex` lines in index order.
    pub fn to_text(&self) -> String {
        self.symbol_strings
            .iter()
            .enumerate()
            .map(|(index, symbol)| format!("{symbol}\t{index}\n"))
            .collect()
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), FstError> {
        let path = path.as_ref();
        fs::write(path, self.to_text()).map_err(|source| FstError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
