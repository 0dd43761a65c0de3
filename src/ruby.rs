//! Ruby ecosystem support
//!
//! Handles:
//! - Gemfile.lock parsing into a dependency graph
//! - Line/column diagnostics for malformed lockfiles
//!
//! The parser is split the way it runs: [`peg`] is the backtracking matcher,
//! [`grammar`] builds a plain parse tree with it, [`builder`] turns an
//! accepted tree into a [`Lockfile`], and [`diagnostics`] explains failures.

pub mod builder;
pub mod diagnostics;
pub mod grammar;
mod lockfile;
pub mod peg;

pub use diagnostics::{ParseError, SyntaxError};
pub use lockfile::{
    GemRef, Lockfile, LockfileError, Source, SourceKind, Spec, find_lockfile_path, load_lockfile,
    parse_lockfile, parse_lockfile_bytes,
};
