//! Owned, annotatable view of one JavaScript source file.
//!
//! The concrete tree-sitter tree is lowered once (see
//! [`crate::parser::source`]) into a small closed set of node kinds: the only
//! places the annotator ever looks at. Every other construct is transparent;
//! its interesting descendants hang off the nearest interesting ancestor.
//!
//! Annotations are recorded in [`TypeSlot`]s and turned back into text by
//! [`emit`], which splices them into the untouched original source.

use std::ops::Range;

use crate::types::TypeNode;

pub mod emit;

/// A source file after lowering. Owned by one annotate/emit pass.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) source: String,
    /// Byte offset where documentation markers are emitted: after a `#!`
    /// line and leading directives, before everything else.
    pub prologue_offset: usize,
    pub markers: Vec<DocMarker>,
    pub body: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub fn source(&self) -> &str {
        &self.source
    }
}

#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// `const name = ...` with a plain identifier name.
    Binding(Binding),
    /// Any function-like node.
    Function(Function),
    /// Class field with a plain identifier key.
    ClassProperty(ClassProperty),
    /// `require("specifier")`.
    Require(RequireCall),
    /// `module.exports = ...`.
    ModuleExports(Range<usize>),
}

/// Where a type annotation goes and what, if anything, has been put there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSlot {
    /// Empty range: insertion point. Non-empty: an existing annotation
    /// (including its colon) that gets replaced.
    pub anchor: Range<usize>,
    pub annotation: Option<TypeNode>,
}

impl TypeSlot {
    pub fn insert_at(offset: usize) -> Self {
        Self {
            anchor: offset..offset,
            annotation: None,
        }
    }

    pub fn replacing(range: Range<usize>) -> Self {
        Self {
            anchor: range,
            annotation: None,
        }
    }

    pub fn set(&mut self, ty: TypeNode) {
        self.annotation = Some(ty);
    }

    pub fn is_annotated(&self) -> bool {
        self.annotation.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub slot: TypeSlot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// `function f() {}` (also generators).
    Declaration,
    /// `function () {}` in expression position.
    Expression,
    Arrow,
    /// Class or object-literal method.
    Method,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub kind: FunctionKind,
    pub name: Option<String>,
    /// Bare identifier parameters only.
    pub params: Vec<Param>,
    pub return_slot: TypeSlot,
    /// `x => ...`: the unparenthesized parameter, which needs parentheses
    /// once anything is annotated.
    pub bare_param: Option<Range<usize>>,
}

impl Function {
    pub fn is_declaration(&self) -> bool {
        self.kind == FunctionKind::Declaration
    }

    pub fn is_annotated(&self) -> bool {
        self.return_slot.is_annotated() || self.params.iter().any(|p| p.slot.is_annotated())
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub slot: TypeSlot,
}

#[derive(Debug, Clone)]
pub struct ClassProperty {
    pub name: String,
    pub slot: TypeSlot,
}

#[derive(Debug, Clone)]
pub struct RequireCall {
    pub specifier: String,
    /// Result is assigned (`const x = require(...)` or `x = require(...)`).
    pub bound: bool,
    pub range: Range<usize>,
}

/// Comment-only statement recording an interface from a declaration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocMarker {
    pub name: String,
    pub signature: String,
}

impl DocMarker {
    /// `/* ... */;` block documenting the interface.
    pub fn render(&self) -> String {
        let mut out = String::from("/*\n");
        out.push_str(&format!(" * {} interface (imported from .d.ts)\n", self.name));
        for line in self.signature.lines() {
            out.push_str(" * ");
            out.push_str(&line.replace("*/", "*\\/"));
            out.push('\n');
        }
        out.push_str(" */;\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_renders_block_comment_statement() {
        let marker = DocMarker {
            name: "User".to_string(),
            signature: "interface User {\n    name: string;\n}".to_string(),
        };
        assert_eq!(
            marker.render(),
            "/*\n * User interface (imported from .d.ts)\n * interface User {\n *     name: string;\n * }\n */;\n"
        );
    }

    #[test]
    fn marker_escapes_comment_terminator() {
        let marker = DocMarker {
            name: "Glob".to_string(),
            signature: "interface Glob { pattern: \"**/*.js\"; }".to_string(),
        };
        let rendered = marker.render();
        assert!(rendered.contains("\"**\\/*.js\""));
        assert_eq!(rendered.matches("*/").count(), 1);
    }

    #[test]
    fn slot_constructors() {
        let slot = TypeSlot::insert_at(4);
        assert_eq!(slot.anchor, 4..4);
        assert!(!slot.is_annotated());

        let mut slot = TypeSlot::replacing(3..11);
        slot.set(TypeNode::String);
        assert!(slot.is_annotated());
    }
}
