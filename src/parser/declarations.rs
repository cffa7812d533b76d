//! Declaration-file symbol extractor using tree-sitter.
//!
//! Parses `.d.ts` files and records every named declaration in a
//! [`SymbolTable`], keyed by the declared name.
//!
//! ## How it works
//!
//! 1. Each file is parsed with the tree-sitter-typescript grammar. A tree
//!    with syntax errors fails the whole extraction: a partial symbol table
//!    would silently change what gets annotated.
//! 2. [`visit`] walks the entire tree pre-order, so declarations nested in
//!    `namespace` and `declare module` blocks are found too.
//! 3. Each recognized node is rendered to a canonical signature (see
//!    [`crate::symbols::render`]) and inserted. Files are processed in the
//!    order given, so the last declaration of a name wins.
//!
//! ## Recognized constructs
//!
//! | Node kind                                   | Kind        |
//! |---------------------------------------------|-------------|
//! | `interface_declaration`                     | `Interface` |
//! | `type_alias_declaration`                    | `TypeAlias` |
//! | `enum_declaration`                          | `Enum`      |
//! | `function_declaration`, `function_signature`| `Function`  |
//! | `generator_function_declaration`            | `Function`  |
//! | `class_declaration`, `abstract_class_...`   | `Class`     |
//!
//! Declarations without a name are skipped.

use std::ops::Range;
use std::path::{Path, PathBuf};

use tracing::trace;
use tree_sitter::Node;

use crate::error::{ConvertError, ParseError};
use crate::symbols::render::{collapse_whitespace, reindent, strip_ranges};
use crate::symbols::{SymbolEntry, SymbolKind, SymbolTable};

use super::{parse, Grammar};

/// Builds a [`SymbolTable`] from declaration files.
pub struct DeclarationExtractor {
    _private: (),
}

impl DeclarationExtractor {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Read and extract every file in order into one table.
    pub fn extract_paths(&self, paths: &[PathBuf]) -> Result<SymbolTable, ConvertError> {
        let mut table = SymbolTable::new();
        for path in paths {
            let source = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
            self.extract_source(path, &source, &mut table)
                .map_err(|source| ConvertError::DeclarationParse {
                    path: path.clone(),
                    source,
                })?;
        }
        Ok(table)
    }

    /// Extract one file's declarations into `table`. Returns how many were recorded.
    pub fn extract_source(
        &self,
        path: &Path,
        source: &str,
        table: &mut SymbolTable,
    ) -> Result<usize, ParseError> {
        let tree = parse(Grammar::TypeScript, source)?;
        let mut count = 0;
        visit(tree.root_node(), source, path, table, &mut count);
        Ok(count)
    }
}

impl Default for DeclarationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn declaration_kind(kind: &str) -> Option<SymbolKind> {
    match kind {
        "interface_declaration" => Some(SymbolKind::Interface),
        "type_alias_declaration" => Some(SymbolKind::TypeAlias),
        "enum_declaration" => Some(SymbolKind::Enum),
        "function_declaration" | "generator_function_declaration" | "function_signature" => {
            Some(SymbolKind::Function)
        }
        "class_declaration" | "abstract_class_declaration" => Some(SymbolKind::Class),
        _ => None,
    }
}

fn visit(node: Node, source: &str, path: &Path, table: &mut SymbolTable, count: &mut usize) {
    if let Some(kind) = declaration_kind(node.kind()) {
        if let Some(name) = child_name(&node, source) {
            trace!(%name, %kind, file = %path.display(), "declaration");
            table.insert(SymbolEntry {
                raw_signature: render_declaration(&node, source, kind),
                name,
                source_file: path.to_path_buf(),
                kind,
            });
            *count += 1;
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, source, path, table, count);
    }
}

/// Canonical text of a declaration node.
///
/// Comments are dropped, `declare ` is restored when the node sits inside an
/// ambient declaration, function signatures are collapsed onto one line and
/// everything else is re-indented.
fn render_declaration(node: &Node, source: &str, kind: SymbolKind) -> String {
    let base = node.start_byte();
    let mut comments = Vec::new();
    collect_comments(node, &mut comments);
    let relative: Vec<Range<usize>> = comments
        .into_iter()
        .map(|r| r.start - base..r.end - base)
        .collect();

    let text = strip_ranges(&source[node.byte_range()], &relative);
    let in_ambient = node
        .parent()
        .is_some_and(|parent| parent.kind() == "ambient_declaration");
    let text = if in_ambient { format!("declare {text}") } else { text };

    match kind {
        SymbolKind::Function => collapse_whitespace(&text),
        _ => reindent(&text),
    }
}

fn collect_comments(node: &Node, out: &mut Vec<Range<usize>>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "comment" {
            out.push(child.byte_range());
        } else {
            collect_comments(&child, out);
        }
    }
}

/// Extract the declared name.
///
/// Tries the `name` field first, then the first direct `identifier` or
/// `type_identifier` child.
fn child_name(node: &Node, source: &str) -> Option<String> {
    if let Some(name_node) = node.child_by_field_name("name") {
        return Some(source[name_node.byte_range()].to_string());
    }
    let mut cursor = node.walk();
    let result = node
        .children(&mut cursor)
        .find(|c| c.kind() == "identifier" || c.kind() == "type_identifier")
        .map(|c| source[c.byte_range()].to_string());
    result
}
