//! Type annotations that can be grafted onto the syntax tree.

use std::fmt;

pub mod signature;

pub use signature::ParsedSignature;

/// A type in annotation position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    String,
    Number,
    Boolean,
    Any,
    Void,
    Null,
    Undefined,
    /// A named type, printed verbatim (`User`, `Date`, `Promise<User>`).
    Reference(String),
    /// Members in source order.
    Union(Vec<TypeNode>),
}

impl TypeNode {
    pub fn reference(name: impl Into<String>) -> Self {
        TypeNode::Reference(name.into())
    }

    /// Map one atomic type name to a node.
    ///
    /// The primitive names match case-insensitively; anything else becomes a
    /// reference with the name kept exactly as written.
    pub fn atomic(name: &str) -> Self {
        let name = name.trim();
        primitive(name).unwrap_or_else(|| TypeNode::reference(name))
    }

    /// Parse a possibly-compound type string such as `"User | null"`.
    ///
    /// Each `|` member goes through [`TypeNode::atomic`]. A single member is
    /// returned as-is; several produce a union in the order written.
    pub fn parse(type_string: &str) -> Self {
        let mut members: Vec<TypeNode> = split_union(type_string)
            .into_iter()
            .map(TypeNode::atomic)
            .collect();

        match members.len() {
            0 => TypeNode::Any,
            1 => members.remove(0),
            _ => TypeNode::Union(members),
        }
    }
}

/// The fixed primitive table. `None` means the name is a type reference.
pub fn primitive(name: &str) -> Option<TypeNode> {
    let node = match name.to_ascii_lowercase().as_str() {
        "string" => TypeNode::String,
        "number" => TypeNode::Number,
        "boolean" => TypeNode::Boolean,
        "any" => TypeNode::Any,
        "void" => TypeNode::Void,
        "null" => TypeNode::Null,
        "undefined" => TypeNode::Undefined,
        "date" => TypeNode::reference("Date"),
        _ => return None,
    };
    Some(node)
}

/// Split a type string on `|`, trimming members and dropping empty ones
/// (a leading `|` is legal TypeScript).
pub fn split_union(type_string: &str) -> Vec<&str> {
    type_string
        .split('|')
        .map(str::trim)
        .filter(|member| !member.is_empty())
        .collect()
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::String => write!(f, "string"),
            TypeNode::Number => write!(f, "number"),
            TypeNode::Boolean => write!(f, "boolean"),
            TypeNode::Any => write!(f, "any"),
            TypeNode::Void => write!(f, "void"),
            TypeNode::Null => write!(f, "null"),
            TypeNode::Undefined => write!(f, "undefined"),
            TypeNode::Reference(name) => write!(f, "{name}"),
            TypeNode::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIMITIVES: [&str; 8] = [
        "string", "number", "boolean", "any", "void", "null", "undefined", "date",
    ];

    #[test]
    fn every_primitive_hits_the_table_in_any_case() {
        for name in PRIMITIVES {
            assert!(primitive(name).is_some(), "{name}");
            assert!(primitive(&name.to_uppercase()).is_some(), "{name}");
            let mixed: String = name
                .chars()
                .enumerate()
                .map(|(i, c)| if i % 2 == 0 { c.to_ascii_uppercase() } else { c })
                .collect();
            assert_eq!(primitive(&mixed), primitive(name));
        }
    }

    #[test]
    fn date_maps_to_date_reference_not_verbatim() {
        assert_eq!(TypeNode::atomic("DATE"), TypeNode::reference("Date"));
        assert_eq!(TypeNode::atomic("date"), TypeNode::reference("Date"));
    }

    #[test]
    fn unknown_names_keep_their_case() {
        assert_eq!(TypeNode::atomic("User"), TypeNode::reference("User"));
        assert_eq!(TypeNode::atomic("user"), TypeNode::reference("user"));
        assert_eq!(TypeNode::atomic("  Promise<User> "), TypeNode::reference("Promise<User>"));
    }

    #[test]
    fn union_members_in_written_order() {
        assert_eq!(split_union("string | null"), vec!["string", "null"]);
        assert_eq!(
            TypeNode::parse("User | null"),
            TypeNode::Union(vec![TypeNode::reference("User"), TypeNode::Null])
        );
        assert_eq!(
            TypeNode::parse("null | User"),
            TypeNode::Union(vec![TypeNode::Null, TypeNode::reference("User")])
        );
    }

    #[test]
    fn single_member_is_not_a_union() {
        assert_eq!(TypeNode::parse(" number "), TypeNode::Number);
        assert_eq!(TypeNode::parse("| string"), TypeNode::String);
    }

    #[test]
    fn empty_type_string_is_any() {
        assert_eq!(TypeNode::parse(""), TypeNode::Any);
        assert_eq!(TypeNode::parse(" | "), TypeNode::Any);
    }

    #[test]
    fn display_prints_typescript_syntax() {
        assert_eq!(TypeNode::parse("string | undefined | Date").to_string(), "string | undefined | Date");
        assert_eq!(TypeNode::Boolean.to_string(), "boolean");
    }
}
