//! Symbol Identifiers
//!
//! Inside the engine a symbol is a compact [`SymbolId`]. Names only exist
//! at the boundary: configuration documents, audit records and logs go
//! through a [`SymbolTable`] to translate.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Deserialize};

/// Maximum number of distinct symbols a game may define.
pub const MAX_SYMBOLS: usize = u8::MAX as usize + 1;

/// Compact symbol identifier (index into the game's symbol table).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u8);

impl SymbolId {
    /// Table index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bidirectional name <-> id lookup.
///
/// Ids are assigned in name order so the same document always yields
/// the same ids.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    names: Vec<String>,
    ids: BTreeMap<String, SymbolId>,
}

impl SymbolTable {
    /// Build a table from symbol names.
    ///
    /// Returns `None` if there are more than [`MAX_SYMBOLS`] names.
    /// Duplicate names collapse to one id.
    pub fn from_names<I, S>(names: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sorted: Vec<String> = names.into_iter().map(Into::into).collect();
        sorted.sort();
        sorted.dedup();
        if sorted.len() > MAX_SYMBOLS {
            return None;
        }

        let ids = sorted
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), SymbolId(i as u8)))
            .collect();

        Some(Self { names: sorted, ids })
    }

    /// Look up the id for a name.
    #[inline]
    pub fn id(&self, name: &str) -> Option<SymbolId> {
        self.ids.get(name).copied()
    }

    /// Look up the name for an id.
    #[inline]
    pub fn name(&self, id: SymbolId) -> &str {
        self.names.get(id.index()).map(String::as_str).unwrap_or("?")
    }

    /// Does this id belong to the table?
    #[inline]
    pub fn contains(&self, id: SymbolId) -> bool {
        id.index() < self.names.len()
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(id, name)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (SymbolId(i as u8), name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_name_ordered() {
        let table = SymbolTable::from_names(["WILD", "ACE", "KING"]).unwrap();
        assert_eq!(table.id("ACE"), Some(SymbolId(0)));
        assert_eq!(table.id("KING"), Some(SymbolId(1)));
        assert_eq!(table.id("WILD"), Some(SymbolId(2)));
        assert_eq!(table.name(SymbolId(1)), "KING");
        assert_eq!(table.id("QUEEN"), None);
    }

    #[test]
    fn test_duplicates_collapse() {
        let table = SymbolTable::from_names(["A", "A", "B"]).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_too_many_symbols() {
        let names: Vec<String> = (0..=MAX_SYMBOLS).map(|i| format!("S{i}")).collect();
        assert!(SymbolTable::from_names(names).is_none());
    }

    #[test]
    fn test_unknown_id_name() {
        let table = SymbolTable::from_names(["A"]).unwrap();
        assert!(!table.contains(SymbolId(3)));
        assert_eq!(table.name(SymbolId(3)), "?");
    }
}
