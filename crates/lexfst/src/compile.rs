// Binary serialization through the OpenFst command line tools.
//
// The text form is piped through `fstcompile` and, depending on the options,
// `fstdeterminize`, `fstminimize` and `fstarcsort`. Each stage runs as a
// child process with `LC_ALL=C`; a failing stage is reported with its
// command line and stderr.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use crate::simple::SimpleFst;
use crate::{FstError, Label};

/// Arc ordering applied by `fstarcsort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcSortType {
    Ilabel,
    Olabel,
}

impl ArcSortType {
    pub fn as_str(self) -> &'static str {
        match self {
            ArcSortType::Ilabel => "ilabel",
            ArcSortType::Olabel => "olabel",
        }
    }
}

/// Options for [`SimpleFst::write_fst`].
///
/// The default leaves the automaton unoptimized (no determinization, no
/// minimization) and sorts arcs by output label, which is what composition
/// with a language model on the right expects.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub determinize: bool,
    pub minimize: bool,
    /// `None` skips `fstarcsort` entirely.
    pub sort_type: Option<ArcSortType>,
    /// Symbol tables for string labels; without them labels must be integers.
    pub isymbols: Option<PathBuf>,
    pub osymbols: Option<PathBuf>,
    pub toolchain: Toolchain,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            determinize: false,
            minimize: false,
            sort_type: Some(ArcSortType::Olabel),
            isymbols: None,
            osymbols: None,
            toolchain: Toolchain::from_env(),
        }
    }
}

impl CompileOptions {
    /// The tool invocations `write_fst` will chain, in order.
    pub fn pipeline(&self) -> Vec<ToolInvocation> {
        let mut compile = ToolInvocation::new("fstcompile");
        if let Some(isymbols) = &self.isymbols {
            compile
                .args
                .push(format!("--isymbols={}", isymbols.display()));
            compile.args.push("--keep_isymbols".to_string());
        }
        if let Some(osymbols) = &self.osymbols {
            compile
                .args
                .push(format!("--osymbols={}", osymbols.display()));
            compile.args.push("--keep_osymbols".to_string());
        }

        let mut stages = vec![compile];
        if self.determinize {
            stages.push(ToolInvocation::new("fstdeterminize"));
        }
        if self.minimize {
            stages.push(ToolInvocation::new("fstminimize"));
        }
        if let Some(sort_type) = self.sort_type {
            let mut sort = ToolInvocation::new("fstarcsort");
            sort.args.push(format!("--sort_type={}", sort_type.as_str()));
            stages.push(sort);
        }
        stages
    }
}

/// One OpenFst binary plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub tool: &'static str,
    pub args: Vec<String>,
}

impl ToolInvocation {
    fn new(tool: &'static str) -> Self {
        Self {
            tool,
            args: Vec::new(),
        }
    }

    fn command_line(&self, program: &Path) -> String {
        std::iter::once(program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Where to find the OpenFst binaries.
///
/// Search order:
/// 1. `OPENFST_BIN` environment variable
/// 2. `$KALDI_ROOT/tools/openfst/bin`
/// 3. `$KALDI_ROOT/src/fstbin`
/// 4. `PATH` (the bare tool name is executed)
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
    bin_dirs: Vec<PathBuf>,
}

impl Toolchain {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("OPENFST_BIN").ok().as_deref(),
            std::env::var("KALDI_ROOT").ok().as_deref(),
        )
    }

    /// Build the search list from explicit variable values.
    pub fn from_vars(openfst_bin: Option<&str>, kaldi_root: Option<&str>) -> Self {
        let mut bin_dirs = Vec::new();
        if let Some(dir) = openfst_bin {
            bin_dirs.push(PathBuf::from(dir));
        }
        if let Some(root) = kaldi_root {
            let root = PathBuf::from(root);
            bin_dirs.push(root.join("tools").join("openfst").join("bin"));
            bin_dirs.push(root.join("src").join("fstbin"));
        }
        Self { bin_dirs }
    }

    pub fn with_bin_dirs(bin_dirs: Vec<PathBuf>) -> Self {
        Self { bin_dirs }
    }

    pub fn bin_dirs(&self) -> &[PathBuf] {
        &self.bin_dirs
    }

    /// Full path of `tool` in the first directory that has it, or the bare
    /// name so that `PATH` lookup applies.
    pub fn resolve(&self, tool: &str) -> PathBuf {
        self.bin_dirs
            .iter()
            .map(|dir| dir.join(tool))
            .find(|path| path.is_file())
            .unwrap_or_else(|| PathBuf::from(tool))
    }

    /// Run one stage, feeding `input` on stdin and returning its stdout.
    pub fn run(&self, invocation: &ToolInvocation, input: Vec<u8>) -> Result<Vec<u8>, FstError> {
        let program = self.resolve(invocation.tool);
        tracing::debug!(command = %invocation.command_line(&program), "running OpenFst tool");

        let mut child = Command::new(&program)
            .args(&invocation.args)
            .env("LC_ALL", "C")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FstError::ToolSpawn {
                tool: invocation.tool.to_string(),
                source,
            })?;

        // Stdin is fed from a separate thread while stdout is drained here.
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || -> std::io::Result<()> {
                stdin.write_all(&input)?;
                Ok(())
            })
        });

        let output = child.wait_with_output().map_err(|source| FstError::ToolSpawn {
            tool: invocation.tool.to_string(),
            source,
        })?;
        let written = writer.map(|writer| writer.join());

        // A failing tool may stop reading early; its exit status is the
        // error to report, not the resulting broken pipe.
        if !output.status.success() {
            return Err(FstError::ToolFailed {
                command: invocation.command_line(&program),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        match written {
            None | Some(Ok(Ok(()))) => {}
            Some(Ok(Err(source))) => {
                return Err(FstError::ToolSpawn {
                    tool: invocation.tool.to_string(),
                    source,
                });
            }
            Some(Err(_)) => {
                return Err(FstError::ToolSpawn {
                    tool: invocation.tool.to_string(),
                    source: std::io::Error::other("stdin writer thread panicked"),
                });
            }
        }

        Ok(output.stdout)
    }
}

impl<L: Label> SimpleFst<L> {
    /// Compile the transducer to an OpenFst binary file at `path`.
    ///
    /// Labels must print as integers unless `options` names symbol tables.
    pub fn write_fst(&self, path: impl AsRef<Path>, options: &CompileOptions) -> Result<(), FstError> {
        let path = path.as_ref();
        if self.start().is_none() {
            return Err(FstError::NoStartState);
        }

        let mut data = self.get_txt().into_bytes();
        for invocation in options.pipeline() {
            data = options.toolchain.run(&invocation, data)?;
        }

        fs::write(path, &data).map_err(|source| FstError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "wrote binary transducer");
        Ok(())
    }
}
