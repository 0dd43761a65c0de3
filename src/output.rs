//! Output formatting for JSON and text modes
//!
//! Provides types for structured output that can be serialized to JSON
//! for machine-readable output, or displayed as text for human consumption.

use crate::ruby::{GemRef, Lockfile, LockfileError, Spec};
use serde::Serialize;
use std::path::Path;

/// Result of a parse operation
#[derive(Debug, Serialize)]
pub struct ParseOutput<'a> {
    pub path: String,
    pub lockfile: &'a Lockfile,
}

/// Result of a find operation
#[derive(Debug, Serialize)]
pub struct FindResult {
    pub gem: String,
    pub version: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
}

/// Result of a deps operation
#[derive(Debug, Serialize)]
pub struct DepsResult {
    pub path: String,
    pub dependencies: Vec<String>,
}

/// Result of a uses operation
#[derive(Debug, Serialize)]
pub struct UsesResult {
    pub gem: String,
    pub dependents: Vec<UsesEntry>,
}

/// A spec that depends on the queried gem
#[derive(Debug, Serialize)]
pub struct UsesEntry {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,
}

/// Result of a check operation
#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub files: Vec<CheckEntry>,
    pub failed: usize,
}

/// Outcome for a single checked lockfile
#[derive(Debug, Serialize)]
pub struct CheckEntry {
    pub path: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl UsesEntry {
    pub fn new(spec: &Spec, dep: &GemRef) -> Self {
        Self {
            name: spec.name.clone(),
            version: spec.resolved_version().to_string(),
            requirement: dep.version.clone(),
        }
    }
}

impl CheckEntry {
    pub fn ok(path: &Path, lockfile: &Lockfile) -> Self {
        Self {
            path: path.display().to_string(),
            ok: true,
            specs: Some(lockfile.specs().count()),
            error: None,
            line: None,
            column: None,
        }
    }

    pub fn failed(path: &Path, err: &LockfileError) -> Self {
        let (error, position) = match err {
            LockfileError::Parse { source, .. } => (source.to_string(), source.position()),
            other => (other.to_string(), None),
        };
        Self {
            path: path.display().to_string(),
            ok: false,
            specs: None,
            error: Some(error),
            line: position.map(|(line, _)| line),
            column: position.map(|(_, column)| column),
        }
    }
}

/// Print JSON output to stdout
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    }
}
