//! The concrete node arena, unique table, apply cache, `MAXREF` marking,
//! level permutation, and the reorder/timeout simulation that
//! `tribdd-rules`'s algorithms are built against.
//!
//! This plays the role a generic `Manager`/`Edge`/`InnerNode` trait family
//! plays in other decision-diagram libraries, but concretely: there is only
//! ever one kind of diagram here (a three-valued complement-edge BDD), so
//! the extra indirection of a trait generic over diagram kind buys nothing.
//! Closer in spirit to a from-scratch manager such as OBDDimal's
//! `DDManager`.

use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use crate::cache::ApplyCache;
use crate::edge::{Edge, EdgeTag, NodeId};
use crate::error::{AllocResult, Error};
use crate::node::{terminal_of, InnerNodeData, LevelNo, Node, Terminal, VarIndex, UNKNOWN_LEVEL};

/// Resource limits a [`Manager`] enforces.
#[derive(Clone, Copy, Debug)]
pub struct Limits {
    /// Hard cap on the number of internal nodes the arena may hold. Once
    /// reached, [`Manager::unique_inter`] returns [`Error::OutOfMemory`]
    /// (or [`Error::Reordered`] if [`Manager::request_reorder`] was called
    /// first, simulating a reorder triggered by table growth).
    pub max_nodes: Option<usize>,
    /// Wall-clock deadline for a single top-level operation.
    pub timeout: Option<Duration>,
}

impl Default for Limits {
    fn default() -> Limits {
        Limits {
            max_nodes: None,
            timeout: None,
        }
    }
}

/// The manager: owns every internal node, the unique table, the apply
/// cache, `MAXREF` marks, and the variable order.
///
/// Deliberately `!Sync`/`!Send`-friendly in spirit: the scheduling model is
/// single-threaded cooperative, so callers are expected to wrap a
/// `Manager` in `Rc<RefCell<_>>`, not `Arc<Mutex<_>>`.
pub struct Manager {
    nodes: Vec<InnerNodeData>,
    maxref: Vec<bool>,
    unique: FxHashMap<(VarIndex, Edge, Edge), NodeId>,
    apply_cache: ApplyCache,
    var_to_level: Vec<LevelNo>,
    level_to_var: Vec<VarIndex>,
    limits: Limits,
    reorder_pending: bool,
    deadline: Option<Instant>,
    timeout_fired: bool,
    rng: StdRng,
}

impl Manager {
    /// New manager, seeded from OS entropy.
    pub fn new(limits: Limits) -> Manager {
        Self::with_rng(limits, StdRng::from_entropy())
    }

    /// New manager with a fixed seed, for reproducible heuristic
    /// tie-breaking in tests.
    pub fn with_seed(limits: Limits, seed: u64) -> Manager {
        Self::with_rng(limits, StdRng::seed_from_u64(seed))
    }

    fn with_rng(limits: Limits, rng: StdRng) -> Manager {
        Manager {
            nodes: Vec::new(),
            maxref: Vec::new(),
            unique: FxHashMap::default(),
            apply_cache: ApplyCache::new(),
            var_to_level: Vec::new(),
            level_to_var: Vec::new(),
            limits,
            reorder_pending: false,
            deadline: None,
            timeout_fired: false,
            rng,
        }
    }

    // --- Terminals & variables -----------------------------------------

    #[inline]
    pub fn one(&self) -> Edge {
        Edge::one()
    }

    #[inline]
    pub fn zero(&self) -> Edge {
        Edge::zero()
    }

    #[inline]
    pub fn unknown(&self) -> Edge {
        Edge::unknown()
    }

    /// Ensure `var` has an assigned level, appending it at the bottom of the
    /// current order (just above the terminals) if it is new.
    pub fn ensure_var(&mut self, var: VarIndex) {
        let idx = var as usize;
        if idx < self.var_to_level.len() {
            return;
        }
        self.var_to_level.resize(idx + 1, 0);
        for v in self.level_to_var.len() as u32..=var {
            let level = self.level_to_var.len() as LevelNo;
            self.var_to_level[v as usize] = level;
            self.level_to_var.push(v);
        }
    }

    pub fn num_vars(&self) -> usize {
        self.level_to_var.len()
    }

    /// The positive literal of `var`, creating it (and assigning it a level)
    /// if necessary.
    pub fn var(&mut self, var: VarIndex) -> AllocResult<Edge> {
        self.ensure_var(var);
        self.unique_inter(var, self.one(), self.zero())
    }

    // --- Level / node access ---------------------------------------------

    /// `perm[var_index] -> level`. Constants answer `UNKNOWN_LEVEL`, which
    /// keeps the invariant that terminals are always deeper than any
    /// internal node.
    #[inline]
    pub fn level_of(&self, e: Edge) -> LevelNo {
        match self.get_node(e) {
            Node::Terminal(_) => UNKNOWN_LEVEL,
            Node::Inner(n) => self.var_to_level[n.var as usize],
        }
    }

    #[inline]
    pub fn get_node(&self, e: Edge) -> Node<'_> {
        if let Some(t) = terminal_of(e) {
            Node::Terminal(t)
        } else {
            Node::Inner(&self.nodes[e.node().inner_index().unwrap()])
        }
    }

    /// Cofactor an edge at `level`: if the node is at `level`, return its
    /// actual two children (respecting the incoming polarity); otherwise the
    /// edge does not depend on `level` and both cofactors are the edge
    /// itself.
    pub fn cofactors(&self, e: Edge, level: LevelNo) -> (Edge, Edge) {
        match self.get_node(e) {
            Node::Terminal(_) => (e, e),
            Node::Inner(n) if self.var_to_level[n.var as usize] == level => {
                if e.is_complemented() {
                    (n.then_edge.not(), n.else_edge.not())
                } else {
                    (n.then_edge, n.else_edge)
                }
            }
            Node::Inner(_) => (e, e),
        }
    }

    /// The variable currently assigned to `level` (the inverse of
    /// `level_of` for internal-node levels).
    #[inline]
    pub fn var_at_level(&self, level: LevelNo) -> VarIndex {
        self.level_to_var[level as usize]
    }

    pub fn var_of(&self, e: Edge) -> Option<VarIndex> {
        match self.get_node(e) {
            Node::Terminal(_) => None,
            Node::Inner(n) => Some(n.var),
        }
    }

    // --- Canonical construction --------------------------------------------

    /// Build the internal node `(var, then_edge, else_edge)` in canonical
    /// form, performing the unique-table lookup atomically with the
    /// canonicalization rewrite.
    pub fn unique_inter(&mut self, var: VarIndex, then_edge: Edge, else_edge: Edge) -> AllocResult<Edge> {
        if then_edge == else_edge {
            return Ok(then_edge);
        }

        let (then_edge, else_edge, incoming) = if then_edge.is_complemented() {
            (then_edge.not(), else_edge.not(), EdgeTag::Complemented)
        } else if then_edge.is_unknown() && else_edge.is_complemented() {
            (then_edge, else_edge.not(), EdgeTag::Complemented)
        } else {
            (then_edge, else_edge, EdgeTag::None)
        };

        // Invariant 3 (the stored else_edge is never a complement edge
        // except when it points to ⊥) is an inductive property of how
        // `tribdd-rules` calls this function — callers only ever combine
        // cofactors pulled from the same incoming polarity at a shared
        // pivot variable, or terminals handled before reaching this point.
        // It is not checked here because it is not a local property of
        // arbitrary (then_edge, else_edge) pairs, only of well-formed ones.
        debug_assert_ne!(then_edge, else_edge, "canonicalization must not reintroduce then==else");

        let key = (var, then_edge, else_edge);
        if let Some(&id) = self.unique.get(&key) {
            return Ok(Edge::new(id, incoming));
        }

        if self.reorder_pending {
            warn!("unique_inter({var}): reorder pending, asking caller to retry");
            return Err(Error::Reordered);
        }
        if let Some(max) = self.limits.max_nodes {
            if self.nodes.len() >= max {
                debug!("unique_inter({var}): node arena at capacity ({max})");
                return Err(Error::OutOfMemory);
            }
        }

        let id = NodeId::from_inner_index(self.nodes.len());
        self.nodes.push(InnerNodeData {
            var,
            then_edge,
            else_edge,
        });
        self.maxref.push(false);
        self.unique.insert(key, id);
        trace!("unique_inter({var}): created node {id:?}", id = id);
        Ok(Edge::new(id, incoming))
    }

    // --- MAXREF mark bit ----------------------------------------------------

    #[inline]
    pub fn is_maxref(&self, e: Edge) -> bool {
        match e.node().inner_index() {
            Some(idx) => self.maxref[idx],
            None => false,
        }
    }

    #[inline]
    pub fn set_maxref(&mut self, e: Edge) {
        if let Some(idx) = e.node().inner_index() {
            self.maxref[idx] = true;
        }
    }

    /// Clear `MAXREF` on the single node `e` points to, if any. Callers that
    /// keep their own ledger of exactly which nodes they billed (as
    /// `tribdd-rules`'s C3/C4 do) use this instead of the reachability sweep
    /// below, since a budget-exhausted branch can bill a node that never
    /// makes it into the final result.
    #[inline]
    pub fn clear_maxref(&mut self, e: Edge) {
        if let Some(idx) = e.node().inner_index() {
            self.maxref[idx] = false;
        }
    }

    /// Clear `MAXREF` on every node reachable from `e`. Useful when the
    /// caller doesn't keep its own billed-node ledger and knows every marked
    /// node is reachable from the final result (true for simple descents
    /// with no discarded branches).
    pub fn clear_maxref_reachable(&mut self, e: Edge) {
        let Some(idx) = e.node().inner_index() else {
            return;
        };
        if !self.maxref[idx] {
            return;
        }
        self.maxref[idx] = false;
        let node = self.nodes[idx];
        self.clear_maxref_reachable(node.then_edge);
        self.clear_maxref_reachable(node.else_edge);
    }

    // --- Apply cache ---------------------------------------------------------

    #[inline]
    pub fn cache_lookup(&self, op: u8, operands: &[Edge]) -> Option<Edge> {
        self.apply_cache.get(op, operands)
    }

    #[inline]
    pub fn cache_insert(&mut self, op: u8, operands: &[Edge], result: Edge) {
        self.apply_cache.insert(op, operands, result)
    }

    #[inline]
    pub fn cache_lookup_numeric(&self, op: u8, operands: &[Edge], numeric: u32) -> Option<Edge> {
        self.apply_cache.get_with_numeric(op, operands, numeric)
    }

    #[inline]
    pub fn cache_insert_numeric(&mut self, op: u8, operands: &[Edge], numeric: u32, result: Edge) {
        self.apply_cache
            .insert_with_numeric(op, operands, numeric, result)
    }

    pub fn apply_cache_len(&self) -> usize {
        self.apply_cache.len()
    }

    // --- Reorder / timeout simulation ---------------------------------------

    /// Mark a reorder as pending. The next [`Manager::unique_inter`] call
    /// that would otherwise create a node instead fails with
    /// [`Error::Reordered`]; the caller is expected to clear `MAXREF` marks
    /// and retry the whole top-level operation.
    pub fn request_reorder(&mut self) {
        self.reorder_pending = true;
    }

    /// Consume the pending-reorder flag, reporting whether one was pending.
    pub fn take_reorder_hint(&mut self) -> bool {
        std::mem::replace(&mut self.reorder_pending, false)
    }

    pub fn set_deadline(&mut self, timeout: Option<Duration>) {
        self.deadline = timeout.map(|d| Instant::now() + d);
        self.timeout_fired = false;
    }

    /// `true` once and only once the deadline has passed; also latches
    /// `timeout_fired` so [`Manager::fire_timeout_handler`] runs at most
    /// once per top-level call.
    pub fn check_timeout(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.timeout_fired = true;
                true
            }
            _ => false,
        }
    }

    pub fn fire_timeout_handler<F: FnOnce()>(&mut self, handler: F) {
        if self.timeout_fired {
            handler();
        }
    }

    // --- Randomness ----------------------------------------------------------

    /// A random sign, used by the `Random` traversal heuristic.
    pub fn random_sign(&mut self) -> i32 {
        if self.rng.gen::<bool>() {
            -1
        } else {
            1
        }
    }

    // --- Introspection ---------------------------------------------------------

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }
}
