//! `ReduceByNodeLimit`: collapse an existing three-valued BDD to fit a
//! shared-node budget, refining towards `⊥` where the budget runs out.

use tribdd_core::{AllocResult, Edge, Manager};

use crate::heuristic::Heuristic;

/// `ReduceByNodeLimit(f, H, L)`.
///
/// Returns the refined edge and whether the budget was actually exhausted
/// anywhere during the descent (`reduced_flag`).
pub fn reduce_by_node_limit(
    manager: &mut Manager,
    f: Edge,
    heuristic: &Heuristic,
    limit: usize,
) -> AllocResult<(Edge, bool)> {
    let mut reduced = false;
    let mut billed = Vec::new();
    let (result, _) = reduce_rec(manager, f, heuristic, limit, &mut reduced, &mut billed)?;
    for node in billed {
        manager.clear_maxref(node);
    }
    Ok((result, reduced))
}

/// Returns `(result_edge, nodes_newly_billed_by_this_call)`. Every node this
/// call (or one of its recursive children) marks `MAXREF` on is pushed onto
/// `billed`, so the top-level wrapper can clear marks unconditionally even
/// when a node billed deep in the recursion never reaches the final result.
///
/// `pub(crate)` so `apply.rs`'s terminal rules that fall back to plain
/// node-limit reduction (e.g. `AndReduced(f,f) = ReduceByNodeLimit(f)`) can
/// thread the same billed-node ledger and `reduced` flag their own top-level
/// call is already tracking, instead of opening a second nested sweep.
pub(crate) fn reduce_rec(
    manager: &mut Manager,
    f: Edge,
    heuristic: &Heuristic,
    limit: usize,
    reduced: &mut bool,
    billed: &mut Vec<Edge>,
) -> AllocResult<(Edge, usize)> {
    if f.is_constant() {
        return Ok((f, 0));
    }
    if manager.is_maxref(f) {
        return Ok((f, 0));
    }
    if limit == 0 {
        *reduced = true;
        return Ok((manager.unknown(), 0));
    }

    let top = manager.level_of(f);
    let var = manager
        .var_of(f)
        .expect("non-constant, non-maxref edge must name a variable");
    let (then_cof, else_cof) = manager.cofactors(f, top);

    let then_first = heuristic.choose(manager, f, None, None, top) == std::cmp::Ordering::Less;

    let ((then_edge, then_billed), (else_edge, else_billed)) = if then_first {
        let first = reduce_rec(manager, then_cof, heuristic, limit - 1, reduced, billed)?;
        let remaining = (limit - 1).saturating_sub(first.1);
        let second = reduce_rec(manager, else_cof, heuristic, remaining, reduced, billed)?;
        (first, second)
    } else {
        let first = reduce_rec(manager, else_cof, heuristic, limit - 1, reduced, billed)?;
        let remaining = (limit - 1).saturating_sub(first.1);
        let second = reduce_rec(manager, then_cof, heuristic, remaining, reduced, billed)?;
        (second, first)
    };

    let result = manager.unique_inter(var, then_edge, else_edge)?;
    let new_bill = if !result.is_constant() && !manager.is_maxref(result) {
        manager.set_maxref(result);
        billed.push(result);
        1
    } else {
        0
    };

    Ok((result, then_billed + else_billed + new_bill))
}
