//! Lowering of JavaScript sources into an annotatable [`SyntaxTree`].
//!
//! The source is parsed with tree-sitter and walked once. Each recognized
//! node kind is dispatched to a lowering function; everything else is
//! transparent and only its named children are visited.
//!
//! | CST node                                         | Lowered to       |
//! |--------------------------------------------------|------------------|
//! | `variable_declarator` (identifier name)          | `Binding`        |
//! | `function_declaration`, generator declaration    | `Function`       |
//! | `function_expression`, `generator_function`      | `Function`       |
//! | `arrow_function`                                 | `Function`       |
//! | `method_definition`                              | `Function`       |
//! | `public_field_definition` (identifier key)       | `ClassProperty`  |
//! | `require("x")`                                   | `Require`        |
//! | `module.exports = ...`                           | `ModuleExports`  |

use tree_sitter::Node;

use crate::error::ParseError;
use crate::syntax::{
    Binding, ClassProperty, Function, FunctionKind, NodeKind, Param, RequireCall, SyntaxNode,
    SyntaxTree, TypeSlot,
};

use super::{parse, Grammar};

/// Parse and lower one source file.
pub fn parse_source(source: impl Into<String>, grammar: Grammar) -> Result<SyntaxTree, ParseError> {
    let source = source.into();
    let tree = parse(grammar, &source)?;
    let root = tree.root_node();

    let mut body = Vec::new();
    lower_children(root, &source, &mut body);
    let prologue_offset = prologue_offset(root, &source);

    Ok(SyntaxTree {
        source,
        prologue_offset,
        markers: Vec::new(),
        body,
    })
}

fn lower_node(node: Node, src: &str, out: &mut Vec<SyntaxNode>) {
    match node.kind() {
        "variable_declarator" => lower_declarator(node, src, out),
        "function_declaration" | "generator_function_declaration" => {
            lower_function(node, FunctionKind::Declaration, src, out)
        }
        "function_expression" | "function" | "generator_function" => {
            lower_function(node, FunctionKind::Expression, src, out)
        }
        "arrow_function" => lower_function(node, FunctionKind::Arrow, src, out),
        "method_definition" => lower_function(node, FunctionKind::Method, src, out),
        "public_field_definition" => lower_field(node, src, out),
        "call_expression" => lower_call(node, src, out),
        "assignment_expression" => lower_assignment(node, src, out),
        _ => lower_children(node, src, out),
    }
}

fn lower_children(node: Node, src: &str, out: &mut Vec<SyntaxNode>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        lower_node(child, src, out);
    }
}

/// `const name = value`. Destructuring declarators stay transparent.
fn lower_declarator(node: Node, src: &str, out: &mut Vec<SyntaxNode>) {
    let name = match node.child_by_field_name("name") {
        Some(n) if n.kind() == "identifier" => n,
        _ => return lower_children(node, src, out),
    };

    let slot = slot_after(&node, name.end_byte());
    let mut lowered = SyntaxNode::new(NodeKind::Binding(Binding {
        name: text(&name, src),
        slot,
    }));
    if let Some(value) = node.child_by_field_name("value") {
        lower_node(value, src, &mut lowered.children);
    }
    out.push(lowered);
}

fn lower_function(node: Node, kind: FunctionKind, src: &str, out: &mut Vec<SyntaxNode>) {
    let mut children = Vec::new();
    let mut params = Vec::new();
    let mut bare_param = None;

    let params_end = if let Some(parameters) = node.child_by_field_name("parameters") {
        lower_params(parameters, src, &mut params, &mut children);
        parameters.end_byte()
    } else if let Some(param) = node.child_by_field_name("parameter") {
        if param.kind() == "identifier" {
            params.push(Param {
                name: text(&param, src),
                slot: TypeSlot::insert_at(param.end_byte()),
            });
            bare_param = Some(param.byte_range());
        } else {
            lower_node(param, src, &mut children);
        }
        param.end_byte()
    } else {
        return lower_children(node, src, out);
    };

    let return_slot = match node.child_by_field_name("return_type") {
        Some(existing) => TypeSlot::replacing(existing.byte_range()),
        None => TypeSlot::insert_at(params_end),
    };

    if let Some(body) = node.child_by_field_name("body") {
        lower_node(body, src, &mut children);
    }

    out.push(SyntaxNode {
        kind: NodeKind::Function(Function {
            kind,
            name: node.child_by_field_name("name").map(|n| text(&n, src)),
            params,
            return_slot,
            bare_param,
        }),
        children,
    });
}

/// Collect annotatable parameters: plain identifiers without a default.
/// Defaults and destructuring patterns are still lowered for nested functions.
fn lower_params(parameters: Node, src: &str, params: &mut Vec<Param>, children: &mut Vec<SyntaxNode>) {
    let mut cursor = parameters.walk();
    for child in parameters.named_children(&mut cursor) {
        if child.kind() != "required_parameter" {
            lower_node(child, src, children);
            continue;
        }

        let pattern = child.child_by_field_name("pattern");
        let value = child.child_by_field_name("value");

        match (pattern, value) {
            (Some(p), None) if p.kind() == "identifier" => params.push(Param {
                name: text(&p, src),
                slot: slot_after(&child, p.end_byte()),
            }),
            (Some(p), _) if p.kind() != "identifier" => lower_node(p, src, children),
            _ => {}
        }
        if let Some(v) = value {
            lower_node(v, src, children);
        }
    }
}

/// Class field `name = value` with a plain identifier key.
fn lower_field(node: Node, src: &str, out: &mut Vec<SyntaxNode>) {
    let name = match node.child_by_field_name("name") {
        Some(n) if n.kind() == "property_identifier" => n,
        _ => return lower_children(node, src, out),
    };

    // `name?` / `name!` annotate after the marker.
    let mut anchor = name.end_byte();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if matches!(child.kind(), "?" | "!") && child.start_byte() == anchor {
            anchor = child.end_byte();
        }
    }

    let mut lowered = SyntaxNode::new(NodeKind::ClassProperty(ClassProperty {
        name: text(&name, src),
        slot: slot_after(&node, anchor),
    }));
    if let Some(value) = node.child_by_field_name("value") {
        lower_node(value, src, &mut lowered.children);
    }
    out.push(lowered);
}

/// `require("specifier")` with exactly one string argument.
fn lower_call(node: Node, src: &str, out: &mut Vec<SyntaxNode>) {
    if let Some(specifier) = require_specifier(&node, src) {
        let bound = node
            .parent()
            .is_some_and(|p| matches!(p.kind(), "variable_declarator" | "assignment_expression"));
        out.push(SyntaxNode::new(NodeKind::Require(RequireCall {
            specifier,
            bound,
            range: node.byte_range(),
        })));
        return;
    }
    lower_children(node, src, out);
}

fn require_specifier(node: &Node, src: &str) -> Option<String> {
    let function = node.child_by_field_name("function")?;
    if function.kind() != "identifier" || text(&function, src) != "require" {
        return None;
    }
    let arguments = node.child_by_field_name("arguments")?;
    if arguments.named_child_count() != 1 {
        return None;
    }
    let arg = arguments.named_child(0)?;
    if arg.kind() != "string" {
        return None;
    }
    let raw = text(&arg, src);
    Some(raw.trim_matches(|c| c == '"' || c == '\'').to_string())
}

/// `module.exports = value`.
fn lower_assignment(node: Node, src: &str, out: &mut Vec<SyntaxNode>) {
    let is_exports = node
        .child_by_field_name("left")
        .is_some_and(|left| is_module_exports(&left, src));
    if !is_exports {
        return lower_children(node, src, out);
    }

    let mut lowered = SyntaxNode::new(NodeKind::ModuleExports(node.byte_range()));
    if let Some(right) = node.child_by_field_name("right") {
        lower_node(right, src, &mut lowered.children);
    }
    out.push(lowered);
}

fn is_module_exports(node: &Node, src: &str) -> bool {
    if node.kind() != "member_expression" {
        return false;
    }
    let object = node.child_by_field_name("object");
    let property = node.child_by_field_name("property");
    match (object, property) {
        (Some(o), Some(p)) => {
            o.kind() == "identifier" && text(&o, src) == "module" && text(&p, src) == "exports"
        }
        _ => false,
    }
}

/// Slot that replaces the node's existing `type` annotation, or inserts at `offset`.
fn slot_after(node: &Node, offset: usize) -> TypeSlot {
    match node.child_by_field_name("type") {
        Some(existing) => TypeSlot::replacing(existing.byte_range()),
        None => TypeSlot::insert_at(offset),
    }
}

/// Offset after a `#!` line and the directive prologue, before everything else.
///
/// Comments do not end the prologue: a directive after a header comment still
/// counts. Without a hashbang or directive this is the start of the first child.
fn prologue_offset(root: Node, src: &str) -> usize {
    let mut prologue_end = None;
    let mut first_start = None;
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "hash_bang_line" => prologue_end = Some(child.end_byte()),
            "expression_statement" if is_directive(&child) => prologue_end = Some(child.end_byte()),
            "comment" => {
                first_start.get_or_insert(child.start_byte());
            }
            _ => {
                first_start.get_or_insert(child.start_byte());
                break;
            }
        }
    }
    match prologue_end {
        Some(end) => skip_line_break(src, end),
        None => first_start.unwrap_or(0),
    }
}

fn skip_line_break(src: &str, offset: usize) -> usize {
    let rest = &src[offset..];
    if rest.starts_with("\r\n") {
        offset + 2
    } else if rest.starts_with('\n') {
        offset + 1
    } else {
        offset
    }
}

fn is_directive(node: &Node) -> bool {
    node.named_child_count() == 1 && node.named_child(0).is_some_and(|c| c.kind() == "string")
}

fn text(node: &Node, src: &str) -> String {
    src[node.byte_range()].to_string()
}
