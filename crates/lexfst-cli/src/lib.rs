// lexfst-cli: argument parsing and the build pipeline behind `lexfst-build`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process;

use lexfst::{CompileOptions, SymbolTable};
use lexfst_lexicon::{
    AssemblyOptions, CharacterModelMode, Dictionary, InsertionMode, Linear, LexiconError,
    ReservedSymbols, WordLexicon, build_fst_for_lexicon,
};
use tracing_subscriber::EnvFilter;

/// Default epsilon symbol, matching OpenFst symbol table conventions.
pub const DEFAULT_EPS: &str = "<eps>";

/// Default end-of-word disambiguation symbol.
pub const DEFAULT_EOW: &str = "#1";

/// Options of one `lexfst-build` run.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildArgs {
    pub dictionary: PathBuf,
    pub output: PathBuf,
    pub eps: String,
    pub eow: String,
    pub eoc: Option<String>,
    pub sil: Option<String>,
    pub sow: Option<String>,
    /// `None` means words only.
    pub character_model: Option<CharacterModelMode>,
    /// Empty means the dictionary's own alphabet.
    pub labels: Vec<String>,
    pub insertion: InsertionMode,
    pub self_loops: Vec<String>,
    /// `(input label, word)` for the end-of-sentence entry.
    pub eos: Option<(String, String)>,
    pub fst: bool,
    pub determinize: bool,
    pub minimize: bool,
}

impl BuildArgs {
    fn new(dictionary: PathBuf, output: PathBuf) -> Self {
        Self {
            dictionary,
            output,
            eps: DEFAULT_EPS.to_string(),
            eow: DEFAULT_EOW.to_string(),
            eoc: None,
            sil: None,
            sow: None,
            character_model: None,
            labels: Vec::new(),
            insertion: InsertionMode::default(),
            self_loops: Vec::new(),
            eos: None,
            fst: false,
            determinize: false,
            minimize: false,
        }
    }

    fn symbols(&self) -> ReservedSymbols<String> {
        let mut symbols = ReservedSymbols::new(self.eps.clone(), self.eow.clone());
        if let Some(eoc) = &self.eoc {
            symbols = symbols.with_eoc(eoc.clone());
        }
        if let Some(sil) = &self.sil {
            symbols = symbols.with_sil(sil.clone());
        }
        symbols
    }

    fn assembly_options(&self) -> AssemblyOptions<String> {
        AssemblyOptions {
            build_character_model: self.character_model.is_some(),
            mode: self.character_model.unwrap_or_default(),
            labels: self.labels.clone(),
            sow: self.sow.clone(),
            insertion: self.insertion,
        }
    }

    /// Path of the compiled binary written with `--fst`.
    pub fn fst_path(&self) -> PathBuf {
        with_suffix(&self.output, ".fst")
    }

    /// Path of the symbol table written with `--fst`.
    pub fn symbols_path(&self) -> PathBuf {
        with_suffix(&self.output, ".syms")
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Parse `lexfst-build` arguments (without the program name).
///
/// Flags take their value either as the next argument or after `=`.
pub fn parse_build_args(args: &[String]) -> Result<BuildArgs, String> {
    let mut positional = Vec::new();
    let mut eps = None;
    let mut eow = None;
    let mut eoc = None;
    let mut sil = None;
    let mut sow = None;
    let mut character_model: Option<CharacterModelMode> = None;
    let mut labels = Vec::new();
    let mut insertion = InsertionMode::default();
    let mut self_loops = Vec::new();
    let mut eos = None;
    let mut fst = false;
    let mut determinize = false;
    let mut minimize = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value.to_string())),
            _ => (arg.as_str(), None),
        };
        let mut value = || -> Result<String, String> {
            match &inline {
                Some(value) => Ok(value.clone()),
                None => iter
                    .next()
                    .cloned()
                    .ok_or_else(|| format!("{flag} requires a value")),
            }
        };

        match flag {
            "--eps" => eps = Some(value()?),
            "--eow" => eow = Some(value()?),
            "--eoc" => eoc = Some(value()?),
            "--sil" => sil = Some(value()?),
            "--sow" => sow = Some(value()?),
            "--character-model" | "-c" => {
                character_model = Some(value()?.parse::<CharacterModelMode>().map_err(|e: LexiconError| e.to_string())?)
            }
            "--labels" => {
                labels = value()?
                    .split(',')
                    .filter(|label| !label.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            "--insertion" => {
                insertion = value()?.parse::<InsertionMode>().map_err(|e: LexiconError| e.to_string())?
            }
            "--self-loop" => self_loops.push(value()?),
            "--eos" => {
                let entry = value()?;
                let (label, word) = entry
                    .split_once(':')
                    .filter(|(label, word)| !label.is_empty() && !word.is_empty())
                    .ok_or_else(|| format!("--eos expects LABEL:WORD, got {entry:?}"))?;
                eos = Some((label.to_string(), word.to_string()));
            }
            "--fst" => fst = true,
            "--determinize" => determinize = true,
            "--minimize" => minimize = true,
            _ if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("unknown option: {arg}"));
            }
            _ => positional.push(arg.clone()),
        }
    }

    let [dictionary, output]: [String; 2] = positional.try_into().map_err(|positional: Vec<String>| {
        format!("expected DICTIONARY and OUTPUT, got {} positional arguments", positional.len())
    })?;

    let mut parsed = BuildArgs::new(PathBuf::from(dictionary), PathBuf::from(output));
    if let Some(eps) = eps {
        parsed.eps = eps;
    }
    if let Some(eow) = eow {
        parsed.eow = eow;
    }
    parsed.eoc = eoc;
    parsed.sil = sil;
    parsed.sow = sow;
    parsed.character_model = character_model;
    parsed.labels = labels;
    parsed.insertion = insertion;
    parsed.self_loops = self_loops;
    parsed.eos = eos;
    parsed.fst = fst;
    parsed.determinize = determinize;
    parsed.minimize = minimize;
    Ok(parsed)
}

/// Load the dictionary and assemble the lexicon, including the
/// end-of-sentence entry and self-loops.
///
/// Self-loops go in last so the character model states receive them too.
pub fn build_lexicon(args: &BuildArgs) -> Result<Linear<String>, LexiconError> {
    let dictionary = Dictionary::load(&args.dictionary)?;
    let mut lexicon = build_fst_for_lexicon(dictionary, args.symbols(), &args.assembly_options())?;

    if let Some((label, word)) = &args.eos {
        lexicon.add_eos(label.clone(), word.clone(), Some(args.eow.clone()));
    }
    for label in &args.self_loops {
        lexicon.add_self_loops(label.clone());
    }
    Ok(lexicon)
}

/// Write the AT&T text to `output`; with `--fst` also the symbol table and
/// the compiled binary.
pub fn write_outputs(lexicon: &Linear<String>, args: &BuildArgs) -> Result<(), LexiconError> {
    lexicon.write_txt(&args.output)?;
    tracing::info!(path = %args.output.display(), "wrote text lexicon");

    if args.fst {
        let symbols_path = args.symbols_path();
        SymbolTable::from_fst(lexicon.lexicon().fst()).write(&symbols_path)?;
        let options = CompileOptions {
            determinize: args.determinize,
            minimize: args.minimize,
            isymbols: Some(symbols_path.clone()),
            osymbols: Some(symbols_path),
            ..CompileOptions::default()
        };
        lexicon.write_fst(&args.fst_path(), &options)?;
        tracing::info!(path = %args.fst_path().display(), "wrote compiled lexicon");
    }
    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the `warn`
/// default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}
