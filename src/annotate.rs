//! Attach types from the symbol table to a lowered [`SyntaxTree`].
//!
//! One pass over the tree, dispatching on [`NodeKind`]:
//!
//! - bindings named after an interface, type alias or enum get a reference
//!   to it;
//! - function declarations named after a declared function get parameter and
//!   return types from its signature;
//! - every other function gets the two fixed parameter-name heuristics
//!   (`user` and `email`);
//! - class fields named after any declared symbol get a reference to it.
//!
//! Interfaces are additionally recorded as documentation markers at the top
//! of the file. Absence of a match is never an error.

use tracing::trace;

use crate::symbols::SymbolTable;
use crate::syntax::{
    Binding, ClassProperty, DocMarker, Function, NodeKind, RequireCall, SyntaxNode, SyntaxTree,
};
use crate::types::{ParsedSignature, TypeNode};

/// Parameter name that gets a `User` reference when `User` is declared.
const USER_PARAM: &str = "user";
const USER_TYPE: &str = "User";
/// Parameter name that is always a string.
const EMAIL_PARAM: &str = "email";

/// Read-only view of the run's symbols, applied to one tree at a time.
pub struct Annotator<'a> {
    symbols: &'a SymbolTable,
}

impl<'a> Annotator<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self { symbols }
    }

    /// Annotate `tree` in place.
    pub fn annotate(&self, tree: &mut SyntaxTree) {
        tree.markers = self
            .symbols
            .interfaces()
            .map(|entry| DocMarker {
                name: entry.name.clone(),
                signature: entry.raw_signature.clone(),
            })
            .collect();

        for node in &mut tree.body {
            self.visit(node);
        }
    }

    fn visit(&self, node: &mut SyntaxNode) {
        match &mut node.kind {
            NodeKind::Binding(binding) => self.binding(binding),
            NodeKind::Function(function) if function.is_declaration() => self.declaration(function),
            NodeKind::Function(function) => self.heuristics(function),
            NodeKind::ClassProperty(property) => self.class_property(property),
            NodeKind::Require(call) => self.require(call),
            NodeKind::ModuleExports(_) => {}
        }
        for child in &mut node.children {
            self.visit(child);
        }
    }

    fn binding(&self, binding: &mut Binding) {
        let Some(entry) = self.symbols.get(&binding.name) else {
            return;
        };
        if entry.kind.is_type_like() {
            trace!(name = %binding.name, kind = %entry.kind, "binding");
            binding.slot.set(TypeNode::reference(&entry.name));
        }
    }

    fn declaration(&self, function: &mut Function) {
        let Some(name) = function.name.as_deref() else {
            return;
        };
        let Some(signature) = self.symbols.get(name).and_then(ParsedSignature::from_entry) else {
            return;
        };
        trace!(%name, return_type = %signature.return_type, "function signature");

        function.return_slot.set(TypeNode::parse(&signature.return_type));
        for param in &mut function.params {
            if let Some(ty) = signature.param_type(&param.name) {
                param.slot.set(TypeNode::parse(ty));
            }
        }
    }

    fn heuristics(&self, function: &mut Function) {
        for param in &mut function.params {
            let ty = match param.name.as_str() {
                USER_PARAM if self.symbols.contains(USER_TYPE) => TypeNode::reference(USER_TYPE),
                EMAIL_PARAM => TypeNode::String,
                _ => continue,
            };
            trace!(param = %param.name, %ty, "heuristic");
            param.slot.set(ty);
        }
    }

    fn class_property(&self, property: &mut ClassProperty) {
        if let Some(entry) = self.symbols.get(&property.name) {
            trace!(name = %property.name, "class property");
            property.slot.set(TypeNode::reference(&entry.name));
        }
    }

    /// Recognised only; module syntax is left as written.
    fn require(&self, call: &RequireCall) {
        trace!(specifier = %call.specifier, bound = call.bound, "require");
    }
}
