//! `ReduceByValuation`: restrict a three-valued BDD by a three-valued
//! partial assignment, itself represented as a BDD.

use std::cmp::min;

use tribdd_core::{AllocResult, Edge, Manager, Node};

use crate::op::Op;

/// Restrict `bdd` by a three-valued partial assignment `val`, itself
/// represented as a BDD over the same variables.
///
/// Wherever `val == 1` the assignment is in domain and `bdd`'s value passes
/// through; wherever `val == 0` the assignment is out of domain and the
/// result is `⊥`; wherever `val == ⊥` the variable is forgotten and the
/// result may only become less defined (`⊒ bdd` in the refinement order).
pub fn reduce_by_valuation(manager: &mut Manager, bdd: Edge, val: Edge) -> AllocResult<Edge> {
    reduce_val_rec(manager, bdd, val)
}

fn is_single_variable_node(manager: &Manager, e: Edge) -> bool {
    match manager.get_node(e) {
        Node::Terminal(_) => false,
        Node::Inner(n) => n.then_edge.is_constant() && n.else_edge.is_constant(),
    }
}

fn reduce_val_rec(manager: &mut Manager, bdd: Edge, val: Edge) -> AllocResult<Edge> {
    if val.is_one() {
        return Ok(bdd);
    }
    if val.is_zero() {
        return Ok(manager.unknown());
    }
    if val.is_unknown() {
        // `val` carries no structure left to cofactor on (either it was ⊥
        // from the start, or an earlier step's descent walked it down to
        // the bare terminal): every variable this deep is forgotten, so the
        // whole subterm is forgotten too, regardless of what `bdd` still
        // depends on.
        return Ok(manager.unknown());
    }
    if bdd.is_constant() {
        return Ok(bdd);
    }

    let topb = manager.level_of(bdd);
    let topv = manager.level_of(val);

    if topb > topv && is_single_variable_node(manager, val) {
        // `val` names a variable `bdd` doesn't depend on at or above this
        // point; nothing left to restrict.
        return Ok(bdd);
    }

    if let Some(cached) = manager.cache_lookup(Op::Valuation.tag(), &[bdd, val]) {
        return Ok(cached);
    }

    let top = min(topb, topv);
    let (bt, be) = manager.cofactors(bdd, top);
    let (vt, ve) = manager.cofactors(val, top);

    let t = reduce_val_rec(manager, bt, vt)?;
    let e = reduce_val_rec(manager, be, ve)?;

    // TODO(on-the-fly forgetting): the `val.is_unknown()` check above
    // handles every case where forgetting a variable actually changes the
    // answer, so this already satisfies the valuation-semantics property.
    // What's still missing is the pure node-sharing optimization: instead
    // of letting the ⊥ show up one level down as a child of this node, a
    // smarter pass raises it to *this* node's level whenever `t`/`e` are
    // already redundant with one another on val's variable, deleting a
    // useless split one level earlier. That pass is specified only in terms
    // of pointer-identity cross-checks against a particular C implementation
    // this crate doesn't have a grounded equivalent for; skipping it costs
    // node-count minimality, not correctness.
    let var = manager.var_at_level(top);
    let result = manager.unique_inter(var, t, e)?;
    manager.cache_insert(Op::Valuation.tag(), &[bdd, val], result);
    Ok(result)
}
