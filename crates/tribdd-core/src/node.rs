//! The three-valued node model.

use crate::edge::{Edge, NodeId};

/// Index of a variable, independent of its position in the current order.
pub type VarIndex = u32;

/// Depth in the current variable order; smaller is closer to the root.
pub type LevelNo = u32;

/// Pseudo-level assigned to the `⊥` terminal so that it is always deeper
/// than any internal node.
pub const UNKNOWN_LEVEL: LevelNo = LevelNo::MAX;

/// An internal node: `(var_index, then_edge, else_edge)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct InnerNodeData {
    pub var: VarIndex,
    pub then_edge: Edge,
    pub else_edge: Edge,
}

impl InnerNodeData {
    #[inline]
    pub fn child(&self, which: usize) -> Edge {
        match which {
            0 => self.then_edge,
            1 => self.else_edge,
            _ => panic!("binary node has only two children"),
        }
    }
}

/// One of the three terminal values.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Terminal {
    /// `1`
    One,
    /// `0`, the complement of `1`
    Zero,
    /// `⊥`, unknown
    Unknown,
}

/// A dereferenced node: either one of the three terminals, or a reference to
/// an internal node stored in the manager's arena.
#[derive(Clone, Copy, Debug)]
pub enum Node<'a> {
    Terminal(Terminal),
    Inner(&'a InnerNodeData),
}

impl<'a> Node<'a> {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Node::Terminal(_))
    }

    #[inline]
    pub fn unwrap_inner(&self) -> &'a InnerNodeData {
        match self {
            Node::Inner(n) => n,
            Node::Terminal(_) => panic!("expected an internal node, found a terminal"),
        }
    }
}

/// Classify the terminal an edge points to, taking its polarity into
/// account. Returns `None` if the edge points to an internal node.
#[inline]
pub fn terminal_of(e: Edge) -> Option<Terminal> {
    if e.is_unknown() {
        Some(Terminal::Unknown)
    } else if e.node() == NodeId::ONE {
        Some(if e.is_complemented() {
            Terminal::Zero
        } else {
            Terminal::One
        })
    } else {
        None
    }
}
