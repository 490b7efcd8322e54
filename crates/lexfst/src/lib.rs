//! Unweighted transducer store for lexicon construction.
//!
//! This crate holds the automaton that lexicon builders write into: an arena
//! of states with labeled arcs, plus the serializers that hand the result to
//! the OpenFst toolchain. It performs no optimization of its own;
//! determinization, minimization and arc sorting are delegated to the
//! OpenFst binaries.
//!
//! # Architecture
//!
//! - [`arc`] -- Arc struct and state identifiers
//! - [`simple`] -- Arena store (`SimpleFst`) with hashed arc lookup
//! - [`text`] -- AT&T text serialization
//! - [`symbols`] -- OpenFst symbol tables for string-labeled transducers
//! - [`compile`] -- Binary output through the OpenFst command line tools

pub mod arc;
pub mod compile;
pub mod simple;
pub mod symbols;
pub mod text;

use std::fmt;
use std::hash::Hash;
use std::path::PathBuf;

pub use arc::{Arc, StateId};
pub use compile::{ArcSortType, CompileOptions, ToolInvocation, Toolchain};
pub use simple::SimpleFst;
pub use symbols::SymbolTable;

/// Error type for transducer serialization and toolchain invocation.
#[derive(Debug, thiserror::Error)]
pub enum FstError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to run {tool}: {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command `{command}` exited with {status}: {stderr}")]
    ToolFailed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("transducer has no start state")]
    NoStartState,
    #[error("state {0} has not been allocated")]
    UnknownState(StateId),
}

/// Arc label.
///
/// Anything hashable and printable can label an arc: integer ids, `char`s or
/// `String`s. `Display` is what ends up in the text serialization, so labels
/// fed to `fstcompile` without symbol tables must print as integers.
pub trait Label: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

impl<T> Label for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display {}
