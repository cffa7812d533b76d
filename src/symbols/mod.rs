use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

pub mod render;

/// What kind of declaration a [`SymbolEntry`] was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Interface,
    TypeAlias,
    Enum,
    Class,
    Function,
}

impl SymbolKind {
    /// Kinds that a plain variable binding may be annotated with.
    pub fn is_type_like(self) -> bool {
        matches!(self, SymbolKind::Interface | SymbolKind::TypeAlias | SymbolKind::Enum)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Interface => write!(f, "interface"),
            SymbolKind::TypeAlias => write!(f, "type"),
            SymbolKind::Enum => write!(f, "enum"),
            SymbolKind::Class => write!(f, "class"),
            SymbolKind::Function => write!(f, "function"),
        }
    }
}

/// One named declaration pulled out of a `.d.ts` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: String,
    /// Canonical source text of the declaration (see [`render`]).
    pub raw_signature: String,
    pub source_file: PathBuf,
    pub kind: SymbolKind,
}

/// Project-wide, name-indexed view of every declaration found for one run.
///
/// Built once before any source file is touched and then only read. A later
/// declaration with the same name replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: BTreeMap<String, SymbolEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the one it replaced.
    pub fn insert(&mut self, entry: SymbolEntry) -> Option<SymbolEntry> {
        self.entries.insert(entry.name.clone(), entry)
    }

    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.values()
    }

    /// Interface entries in name order.
    pub fn interfaces(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.iter().filter(|e| e.kind == SymbolKind::Interface)
    }
}
