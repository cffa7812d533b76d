pub mod declarations;
pub mod source;

use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::ParseError;

/// Which tree-sitter-typescript grammar to parse with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// Plain TypeScript, used for `.d.ts` declaration files.
    TypeScript,
    /// TypeScript + JSX. JavaScript sources (with or without JSX, class
    /// fields, spread) parse cleanly under it.
    Tsx,
}

impl Grammar {
    fn language(self) -> Language {
        match self {
            Grammar::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Grammar::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Parse `source` and reject trees that contain syntax errors.
pub fn parse(grammar: Grammar, source: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&grammar.language())
        .map_err(|e| ParseError::Grammar(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or(ParseError::NoTree)?;

    if let Some(node) = first_error(tree.root_node()) {
        let pos = node.start_position();
        return Err(ParseError::Syntax {
            line: pos.row + 1,
            column: pos.column + 1,
        });
    }

    Ok(tree)
}

/// Depth-first search for the first ERROR or MISSING node.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    found.or(Some(node))
}

/// A convertible source flavour: input extension, output extension, grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    pub extension: &'static str,
    pub output_extension: &'static str,
    pub grammar: Grammar,
}

/// Fallback for explicitly named inputs with an unregistered extension.
pub const JAVASCRIPT: Dialect = Dialect {
    extension: "js",
    output_extension: "ts",
    grammar: Grammar::Tsx,
};

/// Registry of convertible source dialects.
#[derive(Debug, Clone)]
pub struct DialectRegistry {
    dialects: Vec<Dialect>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            dialects: Vec::new(),
        };
        registry.register(JAVASCRIPT);
        registry.register(Dialect {
            extension: "jsx",
            output_extension: "tsx",
            grammar: Grammar::Tsx,
        });
        registry.register(Dialect {
            extension: "mjs",
            output_extension: "mts",
            grammar: Grammar::Tsx,
        });
        registry.register(Dialect {
            extension: "cjs",
            output_extension: "cts",
            grammar: Grammar::Tsx,
        });
        registry
    }

    pub fn register(&mut self, dialect: Dialect) {
        self.dialects.push(dialect);
    }

    /// Find the dialect for a path based on its extension.
    pub fn dialect_for(&self, path: &Path) -> Option<&Dialect> {
        let ext = path.extension()?.to_str()?;
        self.dialects.iter().find(|d| d.extension == ext)
    }

    /// Like [`dialect_for`](Self::dialect_for), falling back to plain JavaScript.
    pub fn dialect_or_default(&self, path: &Path) -> &Dialect {
        self.dialect_for(path).unwrap_or(&JAVASCRIPT)
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_lookup_by_extension() {
        let registry = DialectRegistry::new();
        assert_eq!(registry.dialect_for(Path::new("a/b.js")).map(|d| d.output_extension), Some("ts"));
        assert_eq!(registry.dialect_for(Path::new("App.jsx")).map(|d| d.output_extension), Some("tsx"));
        assert_eq!(registry.dialect_for(Path::new("m.mjs")).map(|d| d.output_extension), Some("mts"));
        assert_eq!(registry.dialect_for(Path::new("c.cjs")).map(|d| d.output_extension), Some("cts"));
        assert!(registry.dialect_for(Path::new("types.ts")).is_none());
        assert!(registry.dialect_for(Path::new("Makefile")).is_none());
    }

    #[test]
    fn cloned_registry_keeps_registrations() {
        let mut registry = DialectRegistry::new();
        registry.register(Dialect {
            extension: "es6",
            output_extension: "ts",
            grammar: Grammar::Tsx,
        });
        let cloned = registry.clone();
        assert!(cloned.dialect_for(Path::new("legacy.es6")).is_some());
    }

    #[test]
    fn unknown_extension_falls_back_to_javascript() {
        let registry = DialectRegistry::new();
        assert_eq!(registry.dialect_or_default(Path::new("legacy.es6")), &JAVASCRIPT);
    }

    #[test]
    fn parse_accepts_javascript_under_tsx() {
        let source = "const el = <div className=\"x\">{items.map(i => i)}</div>;\nclass A { count = 0; }\nconst b = { ...a };";
        assert!(parse(Grammar::Tsx, source).is_ok());
    }

    #[test]
    fn parse_reports_first_error_position() {
        let err = parse(Grammar::Tsx, "const ok = 1;\nfunction (").unwrap_err();
        match err {
            ParseError::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
