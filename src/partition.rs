//! Union-Find (disjoint set) over an open vocabulary of ids.
//!
//! Ids are registered lazily on first use: an unseen id is its own
//! representative. Ids are mapped to compact indices and the forest is a
//! single parent-index array.
//!
//! # Reference
//! Tarjan (1975), "Efficiency of a Good But Not Linear Set Union Algorithm"

use std::collections::HashMap;
use std::hash::Hash;

/// Disjoint-set forest keyed by arbitrary ids.
///
/// `union(a, b)` makes `b`'s representative point at `a`'s, so the
/// first argument's representative survives a merge.
#[derive(Debug, Clone)]
pub struct UnionFind<K> {
    index: HashMap<K, usize>,
    keys: Vec<K>,
    parent: Vec<usize>,
}

impl<K: Eq + Hash + Clone> UnionFind<K> {
    /// Creates an empty forest.
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            keys: Vec::new(),
            parent: Vec::new(),
        }
    }

    /// Returns the representative of `x`'s component.
    ///
    /// Registers `x` as a singleton if it has not been seen before.
    pub fn find(&mut self, x: &K) -> K {
        let slot = self.slot(x);
        let root = self.find_slot(slot);
        self.keys[root].clone()
    }

    /// Merges the components of `a` and `b`. No-op if already unified.
    pub fn union(&mut self, a: &K, b: &K) {
        let sa = self.slot(a);
        let sb = self.slot(b);
        let ra = self.find_slot(sa);
        let rb = self.find_slot(sb);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }

    fn slot(&mut self, key: &K) -> usize {
        if let Some(&slot) = self.index.get(key) {
            return slot;
        }
        let slot = self.parent.len();
        self.index.insert(key.clone(), slot);
        self.keys.push(key.clone());
        self.parent.push(slot);
        slot
    }

    fn find_slot(&mut self, slot: usize) -> usize {
        let mut root = slot;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Second pass: point every node on the path straight at the root.
        let mut node = slot;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }
}

impl<K: Eq + Hash + Clone> Default for UnionFind<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_is_own_representative() {
        let mut uf: UnionFind<String> = UnionFind::new();
        assert_eq!(uf.find(&"A".to_string()), "A");
        assert_eq!(uf.find(&"B".to_string()), "B");
    }

    #[test]
    fn test_union_keeps_first_representative() {
        let mut uf = UnionFind::new();
        uf.union(&"A", &"B");
        assert_eq!(uf.find(&"A"), "A");
        assert_eq!(uf.find(&"B"), "A");
    }

    #[test]
    fn test_transitive_and_idempotent() {
        let mut uf = UnionFind::new();
        uf.union(&1, &2);
        uf.union(&3, &4);
        uf.union(&2, &3);
        uf.union(&4, &1);
        let root = uf.find(&1);
        for x in [2, 3, 4] {
            assert_eq!(uf.find(&x), root);
        }
        assert_ne!(uf.find(&5), root);
    }

    #[test]
    fn test_path_compression_flattens_chain() {
        let mut uf = UnionFind::new();
        // Chain: 0 <- 1 <- 2 <- ... <- 9 (each new root points at the older one)
        for i in 1..10 {
            uf.union(&i, &(i - 1));
        }
        let root = uf.find(&0);
        assert_eq!(root, 9);
        for i in 0..10 {
            assert_eq!(uf.find(&i), root);
        }
        assert!(uf.parent.iter().all(|&p| p == uf.index[&9]));
    }
}
