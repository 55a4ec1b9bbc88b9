//! The apply/memoization cache.
//!
//! Keyed by an operator tag plus up to three operand edges, with an optional
//! extra numeric discriminant (used by substitution-like operators that key
//! on a generation id rather than another edge), the way complement-edge
//! BDD apply caches are commonly keyed.

use rustc_hash::FxHashMap;

use crate::edge::Edge;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct CacheKey {
    op: u8,
    operands: [Option<Edge>; 3],
    numeric: Option<u32>,
}

/// The manager's apply cache: an operator tag plus operands maps to a
/// previously computed result edge.
#[derive(Default)]
pub struct ApplyCache {
    map: FxHashMap<CacheKey, Edge>,
}

impl ApplyCache {
    pub(crate) fn new() -> ApplyCache {
        ApplyCache {
            map: FxHashMap::default(),
        }
    }

    fn key(op: u8, operands: &[Edge], numeric: Option<u32>) -> CacheKey {
        let mut ops = [None; 3];
        for (slot, e) in ops.iter_mut().zip(operands.iter()) {
            *slot = Some(*e);
        }
        CacheKey {
            op,
            operands: ops,
            numeric,
        }
    }

    pub fn get(&self, op: u8, operands: &[Edge]) -> Option<Edge> {
        self.map.get(&Self::key(op, operands, None)).copied()
    }

    pub fn insert(&mut self, op: u8, operands: &[Edge], result: Edge) {
        self.map.insert(Self::key(op, operands, None), result);
    }

    pub fn get_with_numeric(&self, op: u8, operands: &[Edge], numeric: u32) -> Option<Edge> {
        self.map
            .get(&Self::key(op, operands, Some(numeric)))
            .copied()
    }

    pub fn insert_with_numeric(&mut self, op: u8, operands: &[Edge], numeric: u32, result: Edge) {
        self.map
            .insert(Self::key(op, operands, Some(numeric)), result);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}
