//! Serialize an annotated [`SyntaxTree`] back to source text.
//!
//! Every filled [`TypeSlot`] becomes a text edit against the original
//! source; documentation markers become one insertion at the prologue
//! offset. Edits are applied in a single forward pass, so everything not
//! touched by an edit (layout, comments, line numbers of untouched lines) is
//! reproduced byte-for-byte.

use std::ops::Range;

use thiserror::Error;

use super::{Function, NodeKind, SyntaxNode, SyntaxTree, TypeSlot};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("overlapping edits at byte {offset}")]
    Overlap { offset: usize },

    #[error("edit at byte {offset} is outside the source ({len} bytes)")]
    OutOfBounds { offset: usize, len: usize },
}

/// A single text edit: replace `range` with `text` (empty range = insert).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    range: Range<usize>,
    text: String,
}

impl Edit {
    fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            range: offset..offset,
            text: text.into(),
        }
    }
}

/// Render the tree, with all recorded annotations and markers, as source text.
pub fn emit(tree: &SyntaxTree) -> Result<String, EmitError> {
    let mut edits = Vec::new();

    if !tree.markers.is_empty() {
        let offset = tree.prologue_offset;
        let mut block = String::new();
        if offset > 0 && !tree.source[..offset].ends_with('\n') {
            block.push('\n');
        }
        for marker in &tree.markers {
            block.push_str(&marker.render());
        }
        edits.push(Edit::insert(offset, block));
    }

    for node in &tree.body {
        collect(node, &mut edits);
    }

    apply(&tree.source, edits)
}

fn collect(node: &SyntaxNode, edits: &mut Vec<Edit>) {
    match &node.kind {
        NodeKind::Binding(binding) => push_slot(&binding.slot, edits),
        NodeKind::Function(function) => collect_function(function, edits),
        NodeKind::ClassProperty(property) => push_slot(&property.slot, edits),
        NodeKind::Require(_) | NodeKind::ModuleExports(_) => {}
    }
    for child in &node.children {
        collect(child, edits);
    }
}

/// Parameters, then the closing paren of a wrapped bare parameter, then the
/// return type: edits at the same offset keep this order.
fn collect_function(function: &Function, edits: &mut Vec<Edit>) {
    let wrap = function
        .bare_param
        .clone()
        .filter(|_| function.is_annotated());

    if let Some(range) = &wrap {
        edits.push(Edit::insert(range.start, "("));
    }
    for param in &function.params {
        push_slot(&param.slot, edits);
    }
    if let Some(range) = wrap {
        edits.push(Edit::insert(range.end, ")"));
    }
    push_slot(&function.return_slot, edits);
}

fn push_slot(slot: &TypeSlot, edits: &mut Vec<Edit>) {
    if let Some(ty) = &slot.annotation {
        edits.push(Edit {
            range: slot.anchor.clone(),
            text: format!(": {ty}"),
        });
    }
}

fn apply(source: &str, mut edits: Vec<Edit>) -> Result<String, EmitError> {
    // Stable: edits at the same offset keep collection order.
    edits.sort_by_key(|edit| edit.range.start);

    let extra: usize = edits.iter().map(|e| e.text.len()).sum();
    let mut out = String::with_capacity(source.len() + extra);
    let mut cursor = 0;

    for edit in edits {
        if edit.range.end > source.len() || !source.is_char_boundary(edit.range.start) {
            return Err(EmitError::OutOfBounds {
                offset: edit.range.start,
                len: source.len(),
            });
        }
        if edit.range.start < cursor {
            return Err(EmitError::Overlap {
                offset: edit.range.start,
            });
        }
        out.push_str(&source[cursor..edit.range.start]);
        out.push_str(&edit.text);
        cursor = edit.range.end;
    }

    out.push_str(&source[cursor..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Binding, DocMarker, FunctionKind, Param};
    use crate::types::TypeNode;

    fn tree(source: &str, body: Vec<SyntaxNode>) -> SyntaxTree {
        SyntaxTree {
            source: source.to_string(),
            prologue_offset: 0,
            markers: Vec::new(),
            body,
        }
    }

    fn binding(name: &str, slot: TypeSlot) -> SyntaxNode {
        SyntaxNode::new(NodeKind::Binding(Binding {
            name: name.to_string(),
            slot,
        }))
    }

    #[test]
    fn untouched_tree_round_trips_exactly() {
        let source = "// header\nconst a = 1;\n\n\nfunction f(x) { return x; }\n";
        let t = tree(source, vec![binding("a", TypeSlot::insert_at(7))]);
        assert_eq!(emit(&t).unwrap(), source);
    }

    #[test]
    fn inserts_annotation_after_name() {
        let source = "const profile = load();";
        let mut slot = TypeSlot::insert_at(13);
        slot.set(TypeNode::reference("Profile"));
        let t = tree(source, vec![binding("profile", slot)]);
        assert_eq!(emit(&t).unwrap(), "const profile: Profile = load();");
    }

    #[test]
    fn replaces_existing_annotation() {
        let source = "let n: any = 1;";
        let mut slot = TypeSlot::replacing(5..10);
        slot.set(TypeNode::Number);
        let t = tree(source, vec![binding("n", slot)]);
        assert_eq!(emit(&t).unwrap(), "let n: number = 1;");
    }

    #[test]
    fn bare_arrow_param_gets_parenthesized() {
        let source = "const f = user => user.id;";
        let mut slot = TypeSlot::insert_at(14);
        slot.set(TypeNode::reference("User"));
        let function = Function {
            kind: FunctionKind::Arrow,
            name: None,
            params: vec![Param {
                name: "user".to_string(),
                slot,
            }],
            return_slot: TypeSlot::insert_at(14),
            bare_param: Some(10..14),
        };
        let t = tree(source, vec![SyntaxNode::new(NodeKind::Function(function))]);
        assert_eq!(emit(&t).unwrap(), "const f = (user: User) => user.id;");
    }

    #[test]
    fn unannotated_bare_param_is_left_alone() {
        let source = "xs.map(x => x);";
        let function = Function {
            kind: FunctionKind::Arrow,
            name: None,
            params: vec![Param {
                name: "x".to_string(),
                slot: TypeSlot::insert_at(8),
            }],
            return_slot: TypeSlot::insert_at(8),
            bare_param: Some(7..8),
        };
        let t = tree(source, vec![SyntaxNode::new(NodeKind::Function(function))]);
        assert_eq!(emit(&t).unwrap(), source);
    }

    #[test]
    fn markers_go_at_prologue_offset() {
        let source = "#!/usr/bin/env node\nrun();\n";
        let mut t = tree(source, Vec::new());
        t.prologue_offset = 20;
        t.markers.push(DocMarker {
            name: "A".to_string(),
            signature: "interface A {}".to_string(),
        });
        assert_eq!(
            emit(&t).unwrap(),
            "#!/usr/bin/env node\n/*\n * A interface (imported from .d.ts)\n * interface A {}\n */;\nrun();\n"
        );
    }

    #[test]
    fn marker_after_unterminated_line_starts_new_line() {
        let source = "\"use strict\";";
        let mut t = tree(source, Vec::new());
        t.prologue_offset = source.len();
        t.markers.push(DocMarker {
            name: "A".to_string(),
            signature: "interface A {}".to_string(),
        });
        assert!(emit(&t).unwrap().starts_with("\"use strict\";\n/*\n"));
    }

    #[test]
    fn overlapping_edits_are_rejected() {
        let source = "let n: any = 1;";
        let mut outer = TypeSlot::replacing(5..10);
        outer.set(TypeNode::Number);
        let mut inner = TypeSlot::insert_at(7);
        inner.set(TypeNode::String);
        let t = tree(source, vec![binding("n", outer), binding("n", inner)]);
        assert_eq!(emit(&t), Err(EmitError::Overlap { offset: 7 }));
    }

    #[test]
    fn out_of_bounds_edit_is_rejected() {
        let mut slot = TypeSlot::insert_at(99);
        slot.set(TypeNode::Any);
        let t = tree("x", vec![binding("x", slot)]);
        assert!(matches!(emit(&t), Err(EmitError::OutOfBounds { .. })));
    }
}
