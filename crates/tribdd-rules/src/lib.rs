//! Bounded-cost operations on three-valued binary decision diagrams,
//! layered on the [`tribdd_core`] substrate: traversal heuristics,
//! node-budget reduction, the bounded apply engine, the valuation
//! restrictor, their tiny derived helpers, and the public [`Bdd`]
//! handle that ties them together for end users.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]

mod apply;
mod bdd;
mod heuristic;
mod helpers;
mod limit;
mod op;
mod stat;
mod valuation;

pub use apply::{
    and_reduced, ite_reduced, nand_reduced, nor_reduced, or_reduced, xnor_reduced, xor_reduced,
};
pub use bdd::Bdd;
pub use heuristic::{Choice, Heuristic};
pub use helpers::{forget_ones, forget_zeros, merge_interval};
pub use limit::reduce_by_node_limit;
pub use stat::print_stats;
pub use valuation::reduce_by_valuation;

pub use tribdd_core::{AllocResult, Edge, Error, Limits, Manager, VarIndex};
