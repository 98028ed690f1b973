//! Dense integer ids for tokens.
//!
//! Mutual information only depends on which positions hold equal symbols, so any
//! bijection from tokens to ids leaves every curve unchanged. Interning once up
//! front means each shuffled copy is a `Vec<u32>` and every hash is over four bytes.

use std::collections::HashMap;
use std::hash::Hash;

use crate::{Error, Result};

/// Interned symbol id.
pub type SymbolId = u32;

/// Bidirectional token <-> id map. Ids are assigned in first-seen order from 0.
#[derive(Debug, Clone)]
pub struct SymbolTable<T> {
    ids: HashMap<T, SymbolId>,
    symbols: Vec<T>,
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        Self {
            ids: HashMap::new(),
            symbols: Vec::new(),
        }
    }
}

impl<T: Hash + Eq + Clone> SymbolTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `token`, assigning the next free id if it is new.
    ///
    /// # Errors
    ///
    /// [`Error::VocabularyOverflow`] once every `u32` id is taken.
    pub fn intern(&mut self, token: &T) -> Result<SymbolId> {
        if let Some(&id) = self.ids.get(token) {
            return Ok(id);
        }
        let id = SymbolId::try_from(self.symbols.len()).map_err(|_| Error::VocabularyOverflow)?;
        self.ids.insert(token.clone(), id);
        self.symbols.push(token.clone());
        Ok(id)
    }

    /// Intern a whole sequence, returning the table and the id sequence.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lagmi::SymbolTable;
    ///
    /// let (table, ids) = SymbolTable::intern_sequence(&["to", "be", "or", "not", "to", "be"]).unwrap();
    /// assert_eq!(ids, vec![0, 1, 2, 3, 0, 1]);
    /// assert_eq!(table.len(), 4);
    /// assert_eq!(table.symbol(2), Some(&"or"));
    /// ```
    pub fn intern_sequence(tokens: &[T]) -> Result<(Self, Vec<SymbolId>)> {
        let mut table = Self::new();
        let ids = tokens
            .iter()
            .map(|t| table.intern(t))
            .collect::<Result<Vec<_>>>()?;
        Ok((table, ids))
    }

    /// Id of an already interned token.
    pub fn id(&self, token: &T) -> Option<SymbolId> {
        self.ids.get(token).copied()
    }
}

impl<T> SymbolTable<T> {
    pub fn symbol(&self, id: SymbolId) -> Option<&T> {
        self.symbols.get(id as usize)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::mutual_information_curve;

    #[test]
    fn ids_follow_first_appearance() {
        let tokens: Vec<String> = "b a b c a".split_whitespace().map(String::from).collect();
        let (table, ids) = SymbolTable::intern_sequence(&tokens).unwrap();
        assert_eq!(ids, vec![0, 1, 0, 2, 1]);
        assert_eq!(table.id(&"c".to_string()), Some(2));
        assert_eq!(table.id(&"z".to_string()), None);
        assert_eq!(table.symbol(0).map(String::as_str), Some("b"));
        assert_eq!(table.symbol(3), None);
    }

    #[test]
    fn interning_preserves_the_curve() {
        let text = "the cat sat on the mat and the dog sat on the rug while the cat ran";
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let (_, ids) = SymbolTable::intern_sequence(&tokens).unwrap();

        let direct = mutual_information_curve(&tokens, 6).unwrap();
        let interned = mutual_information_curve(&ids, 6).unwrap();
        for (a, b) in direct.iter().zip(&interned) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_table() {
        let table: SymbolTable<String> = SymbolTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }
}
