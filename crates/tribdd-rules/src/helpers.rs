//! Tiny derived helpers: one-line compositions over the bounded apply
//! engine.

use tribdd_core::{Edge, Error, Manager};

use crate::apply::{and_reduced, or_reduced};
use crate::heuristic::Heuristic;

/// `ForgetZeros(f) = Or(f, ⊥)`.
pub fn forget_zeros(
    manager: &mut Manager,
    f: Edge,
    heuristic: &Heuristic,
    limit: usize,
) -> Result<(Edge, bool), Error> {
    let unknown = manager.unknown();
    or_reduced(manager, f, unknown, heuristic, limit)
}

/// `ForgetOnes(f) = And(f, ⊥)`.
pub fn forget_ones(
    manager: &mut Manager,
    f: Edge,
    heuristic: &Heuristic,
    limit: usize,
) -> Result<(Edge, bool), Error> {
    let unknown = manager.unknown();
    and_reduced(manager, f, unknown, heuristic, limit)
}

/// `MergeInterval(under, over) = And(Or(under, ⊥), over)`.
pub fn merge_interval(
    manager: &mut Manager,
    under: Edge,
    over: Edge,
    heuristic: &Heuristic,
    limit: usize,
) -> Result<(Edge, bool), Error> {
    let unknown = manager.unknown();
    let (relaxed_under, reduced_1) = or_reduced(manager, under, unknown, heuristic, limit)?;
    let (result, reduced_2) = and_reduced(manager, relaxed_under, over, heuristic, limit)?;
    Ok((result, reduced_1 || reduced_2))
}
