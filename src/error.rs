//! Error types for a conversion run.
//!
//! Two tiers:
//! - [`ConvertError`] aborts the whole run (bad input path, unreadable or
//!   unparsable declaration files, failed discovery).
//! - [`FileError`] is caught at the file boundary and recorded in that file's
//!   [`TransformationResult`](crate::convert::TransformationResult).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::syntax::emit::EmitError;

/// Failure to turn source text into a usable tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The bundled grammar does not match the linked tree-sitter runtime.
    #[error("incompatible grammar: {0}")]
    Grammar(String),

    /// tree-sitter gave up without producing a tree.
    #[error("parser produced no tree")]
    NoTree,

    /// The tree contains an ERROR or MISSING node (1-based position).
    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
}

/// Run-fatal errors. The caller must fix the environment before retrying.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("input path does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("failed to parse declaration file {}: {source}", path.display())]
    DeclarationParse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("failed to discover files under {}: {message}", root.display())]
    Discovery { root: PathBuf, message: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Per-file errors. Their `Display` text is what ends up in the result list.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to {action}: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

impl FileError {
    pub(crate) fn io(action: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| FileError::Io { action, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_error_messages_are_readable() {
        let err = FileError::from(ParseError::Syntax { line: 3, column: 7 });
        assert_eq!(err.to_string(), "syntax error at line 3, column 7");

        let err = FileError::io("read source")(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "failed to read source: gone");
    }

    #[test]
    fn declaration_error_names_the_file() {
        let err = ConvertError::DeclarationParse {
            path: PathBuf::from("types/user.d.ts"),
            source: ParseError::Syntax { line: 1, column: 2 },
        };
        assert_eq!(
            err.to_string(),
            "failed to parse declaration file types/user.d.ts: syntax error at line 1, column 2"
        );
    }
}
