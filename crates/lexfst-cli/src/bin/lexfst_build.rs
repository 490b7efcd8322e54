// lexfst-build: Build a lexicon transducer from a word dictionary.
//
// Reads a Kaldi-style lexicon.txt (`WORD s1 s2 ...` per line) or a JSON
// array of {"word", "symbols"} entries and writes the lexicon in AT&T text
// format. With --fst the text is also compiled by the OpenFst tools, found
// through OPENFST_BIN or KALDI_ROOT, next to a generated symbol table.
//
// Usage:
//   lexfst-build [OPTIONS] DICTIONARY OUTPUT

const USAGE: &str = "\
lexfst-build: Build a lexicon transducer from a word dictionary.

Usage: lexfst-build [OPTIONS] DICTIONARY OUTPUT

DICTIONARY is a lexicon.txt (WORD s1 s2 ...) or a .json entry array.
OUTPUT receives the AT&T text; --fst adds OUTPUT.fst and OUTPUT.syms.

Options:
  --eps LABEL               Epsilon symbol (default <eps>)
  --eow LABEL               End-of-word symbol (default #1)
  --eoc LABEL               End-of-characters symbol (default: same as --eow)
  --sil LABEL               Optional silence symbol closing words
  -c, --character-model M   Add a character model: flat, trie, linear or copy
  --labels A,B,...          Character model alphabet (default: dictionary symbols)
  --sow LABEL               Start-of-word symbol for the flat character model
  --insertion MODE          Word layout: linear (default) or trie
  --eos LABEL:WORD          Map end-of-sentence LABEL to WORD
  --self-loop LABEL         Pass LABEL through every emitting state (repeatable)
  --fst                     Also compile with the OpenFst tools
  --determinize             Determinize the compiled FST
  --minimize                Minimize the compiled FST
  -h, --help                Print this help

Logging goes to stderr; set RUST_LOG (e.g. RUST_LOG=info) for progress.";

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if lexfst_cli::wants_help(&args) {
        println!("{USAGE}");
        return;
    }

    lexfst_cli::init_logging();

    let build_args = lexfst_cli::parse_build_args(&args).unwrap_or_else(|e| lexfst_cli::fatal(&e));
    let lexicon =
        lexfst_cli::build_lexicon(&build_args).unwrap_or_else(|e| lexfst_cli::fatal(&e.to_string()));
    lexfst_cli::write_outputs(&lexicon, &build_args)
        .unwrap_or_else(|e| lexfst_cli::fatal(&e.to_string()));
}
