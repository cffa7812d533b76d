//! Best-effort reading of function signatures recorded in the symbol table.
//!
//! The input is always text produced by the declaration extractor, so this is
//! a textual scan rather than a grammar: the parameter list is everything
//! between the first `(` and the next `)`, split on commas. Nested
//! parentheses, generic arguments containing commas and rest parameters are
//! not understood and get mis-split.

use std::collections::HashMap;

use crate::symbols::{SymbolEntry, SymbolKind};

/// Return type used when none can be read from the signature.
pub const ANY_TYPE: &str = "any";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSignature {
    /// Parameter name to its type string.
    pub params: HashMap<String, String>,
    pub return_type: String,
}

impl ParsedSignature {
    /// Parse the signature of a function entry. Non-function entries yield `None`.
    pub fn from_entry(entry: &SymbolEntry) -> Option<Self> {
        (entry.kind == SymbolKind::Function).then(|| Self::parse(&entry.raw_signature))
    }

    pub fn parse(signature: &str) -> Self {
        Self {
            params: parse_params(signature),
            return_type: parse_return_type(signature),
        }
    }

    pub fn param_type(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

fn parse_params(signature: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    let Some(open) = signature.find('(') else {
        return params;
    };
    let rest = &signature[open + 1..];
    let Some(close) = rest.find(')') else {
        return params;
    };

    for fragment in rest[..close].split(',') {
        let Some((name, ty)) = fragment.split_once(':') else {
            continue;
        };
        let (name, ty) = (name.trim(), ty.trim());
        if !name.is_empty() && !ty.is_empty() {
            params.insert(name.to_string(), ty.to_string());
        }
    }

    params
}

fn parse_return_type(signature: &str) -> String {
    let Some(pos) = signature.find("):") else {
        return ANY_TYPE.to_string();
    };
    let tail = &signature[pos + 2..];
    let end = tail.find(|c: char| c == ';' || c == '{').unwrap_or(tail.len());
    let return_type = tail[..end].trim();

    if return_type.is_empty() {
        ANY_TYPE.to_string()
    } else {
        return_type.to_string()
    }
}
