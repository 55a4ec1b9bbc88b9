//! Manager substrate for three-valued binary decision diagrams.
//!
//! This crate provides the concrete node arena, unique table, apply cache,
//! `MAXREF` marking and level bookkeeping that `tribdd-rules` builds its
//! operations on top of: unique table, memoization cache, mark bits,
//! level permutation, reorder/timeout simulation. It does not
//! know about AND/OR/ITE or node-budgeted reduction; those live in
//! `tribdd-rules`, layered purely on the operations exposed here.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]

mod cache;
mod edge;
mod error;
mod manager;
mod node;

pub use cache::ApplyCache;
pub use edge::{not_if_not_unknown, Edge, EdgeTag, NodeId};
pub use error::{AllocResult, Error};
pub use manager::{Limits, Manager};
pub use node::{InnerNodeData, LevelNo, Node, Terminal, VarIndex, UNKNOWN_LEVEL};
