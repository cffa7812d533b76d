//! Source and declaration file discovery.
//!
//! Both walks use `ignore`'s parallel-safe directory walker with gitignore
//! handling turned off: exclusions come only from the fixed defaults and the
//! caller's patterns, applied as override globs. Hidden entries are skipped
//! and results are sorted by file name per directory, so discovery order is
//! stable across platforms.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;
use tracing::trace;

use crate::error::ConvertError;
use crate::parser::DialectRegistry;

/// Always excluded from source discovery.
pub const DEFAULT_SOURCE_EXCLUDES: &[&str] = &["node_modules/", "dist/", "*.min.js", "*.d.ts"];

/// Always excluded from declaration discovery.
pub const DEFAULT_DECLARATION_EXCLUDES: &[&str] = &["node_modules/", "dist/"];

const DECLARATION_SUFFIX: &str = ".d.ts";

/// Convertible sources under `root`, minus default and user exclusions.
///
/// `skip` is a directory (the output root) that is never descended into.
pub fn source_files(
    root: &Path,
    ignore: &[String],
    skip: Option<&Path>,
    registry: &DialectRegistry,
) -> Result<Vec<PathBuf>, ConvertError> {
    let patterns: Vec<&str> = DEFAULT_SOURCE_EXCLUDES
        .iter()
        .copied()
        .chain(ignore.iter().map(String::as_str))
        .collect();
    walk(root, &patterns, skip, |path| registry.dialect_for(path).is_some())
}

/// Every `.d.ts` file under `root`.
pub fn declaration_files(root: &Path, skip: Option<&Path>) -> Result<Vec<PathBuf>, ConvertError> {
    walk(root, DEFAULT_DECLARATION_EXCLUDES, skip, is_declaration_file)
}

pub fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(DECLARATION_SUFFIX))
}

fn walk(
    root: &Path,
    excludes: &[&str],
    skip: Option<&Path>,
    keep: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>, ConvertError> {
    let overrides = exclusions(root, excludes)?;
    let skip = skip.and_then(|p| p.canonicalize().ok());

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .parents(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .overrides(overrides)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && skip.is_some() && entry.path().canonicalize().ok() == skip)
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| discovery_error(root, e))?;
        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        if is_file && keep(entry.path()) {
            trace!(path = %entry.path().display(), "discovered");
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Build ignore-only override globs (every pattern is negated).
fn exclusions(root: &Path, patterns: &[&str]) -> Result<Override, ConvertError> {
    let mut builder = OverrideBuilder::new(root);
    for pattern in patterns {
        let glob = if pattern.starts_with('!') {
            pattern.to_string()
        } else {
            format!("!{pattern}")
        };
        builder.add(&glob).map_err(|e| discovery_error(root, e))?;
    }
    builder.build().map_err(|e| discovery_error(root, e))
}

fn discovery_error(root: &Path, err: impl Display) -> ConvertError {
    ConvertError::Discovery {
        root: root.to_path_buf(),
        message: err.to_string(),
    }
}
