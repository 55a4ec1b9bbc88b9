//! Property-based tests for the invariants and guarantees.

use proptest::prelude::*;

use tribdd_core::{Limits, Manager, Node, Terminal, VarIndex};
use tribdd_rules::{and_reduced, Bdd, Heuristic};

const VARS: VarIndex = 3;

fn eval(manager: &Manager, e: tribdd_core::Edge, assignment: &[bool]) -> Option<bool> {
    match manager.get_node(e) {
        Node::Terminal(Terminal::One) => Some(true),
        Node::Terminal(Terminal::Zero) => Some(false),
        Node::Terminal(Terminal::Unknown) => None,
        Node::Inner(_) => {
            let regular = e.regular();
            let Node::Inner(n) = manager.get_node(regular) else {
                unreachable!()
            };
            let child = if assignment[n.var as usize] {
                n.then_edge
            } else {
                n.else_edge
            };
            let inner = eval(manager, child, assignment);
            if e.is_complemented() {
                inner.map(|b| !b)
            } else {
                inner
            }
        }
    }
}

/// A tiny boolean-expression AST used to build random BDDs and, separately,
/// as an independent ground-truth evaluator for three-valued semantics.
#[derive(Clone, Debug)]
enum Expr {
    Var(VarIndex),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Xor(Box<Expr>, Box<Expr>),
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = (0..VARS).prop_map(Expr::Var);
    leaf.prop_recursive(4, 16, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| Expr::Not(Box::new(e))),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Expr::And(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Or(Box::new(a), Box::new(b))),
            (inner.clone(), inner).prop_map(|(a, b)| Expr::Xor(Box::new(a), Box::new(b))),
        ]
    })
}

fn classical_eval(expr: &Expr, assignment: &[bool]) -> Option<bool> {
    match expr {
        Expr::Var(v) => Some(assignment[*v as usize]),
        Expr::Not(e) => classical_eval(e, assignment).map(|b| !b),
        Expr::And(a, b) => match (classical_eval(a, assignment), classical_eval(b, assignment)) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        Expr::Or(a, b) => match (classical_eval(a, assignment), classical_eval(b, assignment)) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
        Expr::Xor(a, b) => match (classical_eval(a, assignment), classical_eval(b, assignment)) {
            (Some(x), Some(y)) => Some(x != y),
            _ => None,
        },
    }
}

fn build(manager: &std::rc::Rc<std::cell::RefCell<Manager>>, expr: &Expr) -> Bdd {
    let heuristic = Heuristic::GreedyOneStep;
    match expr {
        Expr::Var(v) => Bdd::var(manager, *v).unwrap(),
        Expr::Not(e) => build(manager, e).not(),
        Expr::And(a, b) => {
            let (a, b) = (build(manager, a), build(manager, b));
            a.and(&b, &heuristic, usize::MAX).unwrap().0
        }
        Expr::Or(a, b) => {
            let (a, b) = (build(manager, a), build(manager, b));
            a.or(&b, &heuristic, usize::MAX).unwrap().0
        }
        Expr::Xor(a, b) => {
            let (a, b) = (build(manager, a), build(manager, b));
            a.xor(&b, &heuristic, usize::MAX).unwrap().0
        }
    }
}

fn all_assignments() -> Vec<[bool; VARS as usize]> {
    let mut out = Vec::new();
    for mask in 0..(1u32 << VARS) {
        let mut a = [false; VARS as usize];
        for (i, slot) in a.iter_mut().enumerate() {
            *slot = mask & (1 << i) != 0;
        }
        out.push(a);
    }
    out
}

proptest! {
    /// P4 Exact apply, exercised transitively through arbitrary expressions:
    /// with an unbounded budget, every expression built from AND/OR/XOR/NOT
    /// matches the plain ternary truth table on every assignment.
    #[test]
    fn exact_apply_matches_classical_semantics(expr in arb_expr()) {
        let manager = Bdd::new_manager(Limits::default());
        let bdd = build(&manager, &expr);
        let m = manager.borrow();
        for assignment in all_assignments() {
            prop_assert_eq!(
                eval(&m, bdd.edge(), &assignment),
                classical_eval(&expr, &assignment)
            );
        }
    }

    /// P1(a)/(b) Canonicity of constructed nodes: no node has equal children,
    /// and no node's own else branch carries a complement tag unless it
    /// points to ⊥.
    #[test]
    fn constructed_nodes_stay_reduced_and_else_uncomplemented(expr in arb_expr()) {
        let manager = Bdd::new_manager(Limits::default());
        let bdd = build(&manager, &expr);
        let m = manager.borrow();

        fn walk(
            manager: &Manager,
            e: tribdd_core::Edge,
            seen: &mut std::collections::HashSet<tribdd_core::Edge>,
        ) {
            let regular = e.regular();
            if !seen.insert(regular) {
                return;
            }
            if let Node::Inner(n) = manager.get_node(regular) {
                assert_ne!(n.then_edge, n.else_edge);
                assert!(!n.else_edge.is_complemented() || n.else_edge.is_unknown());
                walk(manager, n.then_edge, seen);
                walk(manager, n.else_edge, seen);
            }
        }
        let mut seen = std::collections::HashSet::new();
        walk(&m, bdd.edge(), &mut seen);
    }

    /// P8 Commutativity: AndReduced(f, g) == AndReduced(g, f) for a
    /// deterministic heuristic.
    #[test]
    fn and_is_commutative(a in arb_expr(), b in arb_expr()) {
        let manager = Bdd::new_manager(Limits::default());
        let (f, g) = (build(&manager, &a), build(&manager, &b));
        let heuristic = Heuristic::GreedyOneStep;
        let mut m = manager.borrow_mut();
        let (fg, _) = and_reduced(&mut m, f.edge(), g.edge(), &heuristic, usize::MAX).unwrap();
        let (gf, _) = and_reduced(&mut m, g.edge(), f.edge(), &heuristic, usize::MAX).unwrap();
        prop_assert_eq!(fg, gf);
    }

    /// P5 Mark hygiene: after a top-level call, no node reachable from
    /// either the input or the result carries MAXREF.
    #[test]
    fn node_limit_reduction_leaves_no_maxref_set(expr in arb_expr(), limit in 0usize..12) {
        let manager = Bdd::new_manager(Limits::default());
        let bdd = build(&manager, &expr);
        let heuristic = Heuristic::GreedyOneStep;
        let (result, _) = bdd.reduce_by_node_limit(&heuristic, limit).unwrap();

        let m = manager.borrow();
        fn walk(
            manager: &Manager,
            e: tribdd_core::Edge,
            seen: &mut std::collections::HashSet<tribdd_core::Edge>,
        ) {
            let regular = e.regular();
            if !seen.insert(regular) {
                return;
            }
            assert!(!manager.is_maxref(regular));
            if let Node::Inner(n) = manager.get_node(regular) {
                walk(manager, n.then_edge, seen);
                walk(manager, n.else_edge, seen);
            }
        }
        let mut seen = std::collections::HashSet::new();
        walk(&m, bdd.edge(), &mut seen);
        walk(&m, result.edge(), &mut seen);
    }

    /// P2 / P3 Refinement and budget bound: the reduced edge agrees with the
    /// original wherever both are concrete, and never introduces more than
    /// `limit` newly billed nodes.
    #[test]
    fn node_limit_reduction_refines_and_stays_in_budget(expr in arb_expr(), limit in 0usize..10) {
        let manager = Bdd::new_manager(Limits::default());
        let bdd = build(&manager, &expr);
        let heuristic = Heuristic::GreedyOneStep;
        let before = manager.borrow().node_count();
        let (reduced_bdd, _reduced_flag) = bdd.reduce_by_node_limit(&heuristic, limit).unwrap();
        let after = manager.borrow().node_count();
        // No garbage collection, so every node created while answering this
        // call is still present: the delta is exactly what got billed.
        prop_assert!(after - before <= limit);

        let m = manager.borrow();
        for assignment in all_assignments() {
            let original = eval(&m, bdd.edge(), &assignment);
            let reduced = eval(&m, reduced_bdd.edge(), &assignment);
            if let (Some(o), Some(r)) = (original, reduced) {
                prop_assert_eq!(o, r);
            }
        }
    }
}

#[test]
fn forget_zeros_is_idempotent() {
    let manager = Bdd::new_manager(Limits::default());
    let x0 = Bdd::var(&manager, 0).unwrap();
    let x1 = Bdd::var(&manager, 1).unwrap();
    let heuristic = Heuristic::GreedyOneStep;
    let (f, _) = x0.xor(&x1, &heuristic, 1024).unwrap();

    let (once, _) = f.forget_zeros(&heuristic, 1024).unwrap();
    let (twice, _) = once.forget_zeros(&heuristic, 1024).unwrap();
    assert_eq!(once.edge(), twice.edge());
}

#[test]
fn merge_interval_is_bracketed_by_its_endpoints() {
    let manager = Bdd::new_manager(Limits::default());
    let x0 = Bdd::var(&manager, 0).unwrap();
    let x1 = Bdd::var(&manager, 1).unwrap();
    let heuristic = Heuristic::GreedyOneStep;
    let (under, _) = x0.and(&x1, &heuristic, 1024).unwrap();
    let (over, _) = x0.or(&x1, &heuristic, 1024).unwrap();
    let (merged, _) = under.merge_interval(&over, &heuristic, 1024).unwrap();

    let m = manager.borrow();
    for assignment in all_assignments()[..4].iter() {
        let u = eval(&m, under.edge(), assignment);
        let o = eval(&m, over.edge(), assignment);
        let w = eval(&m, merged.edge(), assignment);
        // `u ⊑ w` and `w ⊑ o` in the three-valued order: agreement wherever
        // both sides are concrete.
        if let (Some(uv), Some(wv)) = (u, w) {
            assert_eq!(uv, wv);
        }
        if let (Some(wv), Some(ov)) = (w, o) {
            assert_eq!(wv, ov);
        }
    }
}

#[test]
fn valuation_semantics_on_a_concrete_assignment() {
    let manager = Bdd::new_manager(Limits::default());
    let x0 = Bdd::var(&manager, 0).unwrap();
    let x1 = Bdd::var(&manager, 1).unwrap();
    let heuristic = Heuristic::GreedyOneStep;
    let (bdd, _) = x0.xor(&x1, &heuristic, 1024).unwrap();

    // val = x0 (1 when x0 is true, 0 otherwise): in-domain only for x0=true.
    let restricted = bdd.reduce_by_valuation(&x0).unwrap();

    let m = manager.borrow();
    assert_eq!(eval(&m, restricted.edge(), &[true, false]), Some(true));
    assert_eq!(eval(&m, restricted.edge(), &[true, true]), Some(false));
    assert_eq!(eval(&m, restricted.edge(), &[false, false]), None);
    assert_eq!(eval(&m, restricted.edge(), &[false, true]), None);
}
