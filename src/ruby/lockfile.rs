//! Lockfile parsing for Ruby ecosystem
//!
//! Gemfile.lock uses a custom format (not YAML or TOML):
//! ```text
//! GEM
//!   remote: https://rubygems.org/
//!   specs:
//!     rails (7.1.0)
//!       actionpack (= 7.1.0)
//!     actionpack (7.1.0)
//!       rack
//!
//! PLATFORMS
//!   ruby
//!
//! DEPENDENCIES
//!   rails
//! ```
//!
//! [`parse_lockfile`] is pure: it takes the file contents and never touches
//! the filesystem. [`load_lockfile`] and [`find_lockfile_path`] are the
//! file-level helpers used by the CLI.

use super::builder;
use super::diagnostics::{ParseError, SyntaxError};
use super::grammar;
use crate::lockfile::find_nearest_file;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LockfileError {
    #[error("No Gemfile.lock found")]
    NotFound,

    #[error("Gem '{package}' not found in lockfile")]
    GemNotFound { package: String },

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: ParseError },
}

/// A parsed Gemfile.lock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Lockfile {
    pub sources: Vec<Source>,
    pub platforms: Vec<String>,
    pub dependencies: Vec<GemRef>,
}

/// Where a block of specs was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    RubyGems,
    Git,
    Svn,
    Path,
}

impl SourceKind {
    /// The section keyword that opens this kind of block.
    pub fn keyword(self) -> &'static str {
        match self {
            SourceKind::RubyGems => "GEM",
            SourceKind::Git => "GIT",
            SourceKind::Svn => "SVN",
            SourceKind::Path => "PATH",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One GEM, GIT, SVN or PATH block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub kind: SourceKind,
    /// `key: value` lines of the block (`remote`, `revision`, `branch`, ...).
    pub options: BTreeMap<String, String>,
    pub specs: Vec<Spec>,
}

impl Source {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            options: BTreeMap::new(),
            specs: Vec::new(),
        }
    }

    pub fn remote(&self) -> Option<&str> {
        self.options.get("remote").map(String::as_str)
    }
}

/// A resolved gem listed under `specs:`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spec {
    pub name: String,
    /// Raw parenthesized version text, e.g. `(4.1.7)`.
    pub version: String,
    pub dependencies: Vec<GemRef>,
}

impl Spec {
    pub fn new(name: String) -> Self {
        Self {
            name,
            version: String::new(),
            dependencies: Vec::new(),
        }
    }

    /// The pinned version without parentheses: `(4.1.7)` -> `4.1.7`.
    pub fn resolved_version(&self) -> &str {
        strip_parens(&self.version)
    }
}

/// A gem name with an optional version requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GemRef {
    pub name: String,
    /// Raw parenthesized constraint text, e.g. `(>= 1.16, < 3)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl GemRef {
    pub fn new(name: String) -> Self {
        Self {
            name,
            version: None,
        }
    }

    /// Individual constraint clauses: `(>= 1.16, < 3)` -> `[">= 1.16", "< 3"]`.
    pub fn constraints(&self) -> Vec<&str> {
        match &self.version {
            Some(version) => strip_parens(version).split(", ").collect(),
            None => Vec::new(),
        }
    }
}

fn strip_parens(version: &str) -> &str {
    version
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .unwrap_or(version)
}

/// Gem names are compared case-insensitively.
fn normalize_gem_name(name: &str) -> String {
    name.to_lowercase()
}

impl Lockfile {
    /// Every spec of every source, in file order.
    pub fn specs(&self) -> impl Iterator<Item = &Spec> {
        self.sources.iter().flat_map(|source| source.specs.iter())
    }

    /// First spec named `name`, across all sources.
    pub fn find_spec(&self, name: &str) -> Option<&Spec> {
        self.find_spec_with_source(name).map(|(_, spec)| spec)
    }

    /// Like [`find_spec`](Self::find_spec), also returning the block the
    /// spec was resolved from.
    pub fn find_spec_with_source(&self, name: &str) -> Option<(&Source, &Spec)> {
        let wanted = normalize_gem_name(name);
        self.sources.iter().find_map(|source| {
            source
                .specs
                .iter()
                .find(|spec| normalize_gem_name(&spec.name) == wanted)
                .map(|spec| (source, spec))
        })
    }

    /// Names from the DEPENDENCIES section, sorted and de-duplicated.
    ///
    /// The trailing `!` that marks a gem pinned to a non-default source is
    /// dropped.
    pub fn direct_dependencies(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .dependencies
            .iter()
            .map(|dep| normalize_gem_name(dep.name.trim_end_matches('!')))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Specs that list `name` among their own dependencies, with the
    /// requirement they place on it.
    pub fn dependents_of(&self, name: &str) -> Vec<(&Spec, &GemRef)> {
        let wanted = normalize_gem_name(name);
        self.specs()
            .filter_map(|spec| {
                spec.dependencies
                    .iter()
                    .find(|dep| normalize_gem_name(&dep.name) == wanted)
                    .map(|dep| (spec, dep))
            })
            .collect()
    }
}

/// Parse the text of a Gemfile.lock.
///
/// Deterministic and free of I/O; the whole input is rejected on the first
/// syntax error.
pub fn parse_lockfile(content: &str) -> Result<Lockfile, ParseError> {
    if content.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    debug!(bytes = content.len(), "parsing Gemfile.lock");

    let tree = grammar::parse_tree(content).map_err(|failure| {
        ParseError::Syntax(SyntaxError::new(content, failure.offset, &failure.expected))
    })?;

    let lockfile = builder::build(&tree, content).map_err(|err| {
        ParseError::Syntax(SyntaxError::new(content, err.offset, &[err.missing]))
    })?;

    debug!(
        sources = lockfile.sources.len(),
        specs = lockfile.specs().count(),
        dependencies = lockfile.dependencies.len(),
        "parsed Gemfile.lock"
    );

    Ok(lockfile)
}

/// Parse raw file bytes, rejecting invalid UTF-8 with its position.
pub fn parse_lockfile_bytes(content: &[u8]) -> Result<Lockfile, ParseError> {
    let text = std::str::from_utf8(content).map_err(|err| ParseError::invalid_utf8(content, err))?;
    parse_lockfile(text)
}

/// Find the nearest lockfile by walking up from the current directory.
///
/// `names` are tried in order at each level.
pub fn find_lockfile_path(names: &[String]) -> Result<PathBuf, LockfileError> {
    find_nearest_file(names).ok_or(LockfileError::NotFound)
}

/// Read and parse the lockfile at `path`.
pub fn load_lockfile(path: &Path) -> Result<Lockfile, LockfileError> {
    let content = fs::read(path).map_err(|source| LockfileError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_lockfile_bytes(&content).map_err(|source| LockfileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
