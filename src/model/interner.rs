//! Path interning
//!
//! Maps repository paths to u32 IDs so touches and lifecycles carry a
//! `Copy` key instead of a `String`.

use rustc_hash::FxHashMap;

use super::PathId;

/// Path interner; IDs are dense and assigned in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct PathInterner {
    map: FxHashMap<String, u32>,
    vec: Vec<String>,
}

impl PathInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a path and return its ID
    pub fn intern(&mut self, path: &str) -> PathId {
        if let Some(&id) = self.map.get(path) {
            return PathId(id);
        }
        let id = self.vec.len() as u32;
        self.map.insert(path.to_string(), id);
        self.vec.push(path.to_string());
        PathId(id)
    }

    /// Look up an already interned path
    pub fn get(&self, path: &str) -> Option<PathId> {
        self.map.get(path).map(|&id| PathId(id))
    }

    pub fn resolve(&self, id: PathId) -> &str {
        &self.vec[id.index()]
    }

    pub fn len(&self) -> usize {
        self.vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }
}
