// Word dictionaries: ordered word -> symbol sequence entries.
//
// Two on-disk formats are read:
//   text  one entry per line, `WORD s1 s2 ...`, whitespace separated
//   JSON  an array of `{"word": "...", "symbols": ["...", ...]}` objects, or
//         an object `{"WORD": ["s1", ...], ...}` read in document order

use std::fmt;
use std::fs;
use std::path::Path;

use hashbrown::HashSet;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::LexiconError;

/// One word and its spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub word: String,
    pub symbols: Vec<String>,
}

/// Entries in file order. The same word may appear with several spellings
/// (pronunciation variants); exact duplicates are dropped.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    seen: HashSet<DictionaryEntry>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; returns `false` if the exact entry was already present.
    pub fn insert(&mut self, word: impl Into<String>, symbols: Vec<String>) -> bool {
        let entry = DictionaryEntry {
            word: word.into(),
            symbols,
        };
        if !self.seen.insert(entry.clone()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct spelling symbols in first-seen order.
    pub fn alphabet(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .flat_map(|entry| entry.symbols.iter())
            .filter(|symbol| seen.insert(symbol.as_str()))
            .cloned()
            .collect()
    }

    /// Parse the whitespace-separated text format. Blank lines are skipped;
    /// a word without symbols is an error.
    pub fn parse_text(text: &str) -> Result<Self, LexiconError> {
        let mut dictionary = Self::new();
        for (i, line) in text.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let symbols: Vec<String> = fields.map(str::to_string).collect();
            if symbols.is_empty() {
                return Err(LexiconError::Dictionary {
                    line: i + 1,
                    message: format!("word {word:?} has no symbols"),
                });
            }
            dictionary.insert(word, symbols);
        }
        Ok(dictionary)
    }

    /// Parse either JSON layout: an entry array or a word object.
    pub fn parse_json(text: &str) -> Result<Self, LexiconError> {
        let entries = match serde_json::from_str(text)? {
            JsonDictionary::Entries(entries) => entries,
            JsonDictionary::Words(WordObject(entries)) => entries,
        };
        let mut dictionary = Self::new();
        for entry in entries {
            dictionary.insert(entry.word, entry.symbols);
        }
        Ok(dictionary)
    }

    /// Load from `path`; files ending in `.json` are read as JSON, anything
    /// else as text.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dictionary = if path.extension().is_some_and(|ext| ext == "json") {
            Self::parse_json(&text)?
        } else {
            Self::parse_text(&text)?
        };
        tracing::debug!(path = %path.display(), entries = dictionary.len(), "loaded dictionary");
        Ok(dictionary)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDictionary {
    Entries(Vec<DictionaryEntry>),
    Words(WordObject),
}

/// `{"WORD": [symbols]}` kept in document order.
struct WordObject(Vec<DictionaryEntry>);

impl<'de> Deserialize<'de> for WordObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WordObjectVisitor;

        impl<'de> Visitor<'de> for WordObjectVisitor {
            type Value = WordObject;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping words to symbol lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<WordObject, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((word, symbols)) = map.next_entry::<String, Vec<String>>()? {
                    entries.push(DictionaryEntry { word, symbols });
                }
                Ok(WordObject(entries))
            }
        }

        deserializer.deserialize_map(WordObjectVisitor)
    }
}

impl IntoIterator for Dictionary {
    type Item = (String, Vec<String>);
    type IntoIter = std::iter::Map<
        std::vec::IntoIter<DictionaryEntry>,
        fn(DictionaryEntry) -> (String, Vec<String>),
    >;

    fn into_iter(self) -> Self::IntoIter {
        fn pair(entry: DictionaryEntry) -> (String, Vec<String>) {
            (entry.word, entry.symbols)
        }
        self.entries
            .into_iter()
            .map(pair as fn(DictionaryEntry) -> (String, Vec<String>))
    }
}
