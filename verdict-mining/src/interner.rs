//! Action-identifier interning.
//!
//! Mining runs over `u32` symbols instead of strings; the interner maps
//! back to action IDs when patterns are materialized.

use std::collections::HashMap;

/// Bidirectional string ↔ symbol table.
#[derive(Debug, Default)]
pub struct Interner {
    ids: HashMap<String, u32>,
    names: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern an action identifier, returning its symbol.
    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        self.ids.insert(name.to_string(), id);
        self.names.push(name.to_string());
        id
    }

    /// Intern a whole sequence of action identifiers.
    pub fn intern_all(&mut self, actions: &[String]) -> Vec<u32> {
        actions.iter().map(|a| self.intern(a)).collect()
    }

    /// Resolve a symbol back to its action identifier.
    pub fn resolve(&self, id: u32) -> &str {
        &self.names[id as usize]
    }

    /// Resolve a symbol sequence back to action identifiers.
    pub fn resolve_all(&self, ids: &[u32]) -> Vec<String> {
        ids.iter().map(|&id| self.resolve(id).to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
