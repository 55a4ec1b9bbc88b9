//! The six concrete scenarios from the design's testable-properties section.

use tribdd_core::{Limits, Manager, Node, Terminal};
use tribdd_rules::{
    and_reduced, forget_ones, forget_zeros, merge_interval, reduce_by_node_limit,
    reduce_by_valuation, Bdd, Heuristic,
};

/// Evaluate `e` under a total boolean assignment indexed by variable id.
/// `None` means the function is `⊥` on this assignment.
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

#[test]
fn forget_zeros_of_a_literal() {
    let manager = Bdd::new_manager(Limits::default());
    let x0 = Bdd::var(&manager, 0).unwrap();
    let (r, reduced) = x0.forget_zeros(&Heuristic::Random, 1024).unwrap();
    assert!(!reduced);

    let m = manager.borrow();
    assert_eq!(eval(&m, r.edge(), &[false]), None);
    assert_eq!(eval(&m, r.edge(), &[true]), Some(true));
}

#[test]
fn forget_ones_of_a_conjunction() {
    let manager = Bdd::new_manager(Limits::default());
    let x0 = Bdd::var(&manager, 0).unwrap();
    let x1 = Bdd::var(&manager, 1).unwrap();
    let (f, _) = x0.and(&x1, &Heuristic::GreedyOneStep, 1024).unwrap();
    let (r, reduced) = f.forget_ones(&Heuristic::GreedyOneStep, 1024).unwrap();
    assert!(!reduced);

    let m = manager.borrow();
    let expect = [
        ([false, false], Some(false)),
        ([true, false], Some(false)),
        ([false, true], Some(false)),
        ([true, true], None),
    ];
    for (assignment, want) in expect {
        assert_eq!(eval(&m, r.edge(), &assignment), want, "{assignment:?}");
    }
}

#[test]
fn merge_interval_recovers_both_ends() {
    let manager = Bdd::new_manager(Limits::default());
    let x0 = Bdd::var(&manager, 0).unwrap();
    let x1 = Bdd::var(&manager, 1).unwrap();
    let heuristic = Heuristic::GreedyOneStep;
    let (under, _) = x0.and(&x1, &heuristic, 1024).unwrap();
    let (over, _) = x0.or(&x1, &heuristic, 1024).unwrap();
    let (r, reduced) = under.merge_interval(&over, &heuristic, 1024).unwrap();
    assert!(!reduced);

    let m = manager.borrow();
    let expect = [
        ([false, false], Some(false)),
        ([true, false], None),
        ([false, true], None),
        ([true, true], Some(true)),
    ];
    for (assignment, want) in expect {
        assert_eq!(eval(&m, r.edge(), &assignment), want, "{assignment:?}");
    }
}

#[test]
fn budget_zero_reduction_is_unknown() {
    let manager = Bdd::new_manager(Limits::default());
    let x0 = Bdd::var(&manager, 0).unwrap();
    let x1 = Bdd::var(&manager, 1).unwrap();
    let heuristic = Heuristic::GreedyOneStep;
    let (f, _) = x0.and(&x1, &heuristic, 1024).unwrap();

    let mut m = manager.borrow_mut();
    let (r, reduced) = reduce_by_node_limit(&mut m, f.edge(), &heuristic, 0).unwrap();
    assert!(reduced);
    assert!(r.is_unknown());
}

#[test]
fn apply_with_ample_budget_matches_exact_and() {
    let manager = Bdd::new_manager(Limits::default());
    let x0 = Bdd::var(&manager, 0).unwrap();
    let x1 = Bdd::var(&manager, 1).unwrap();
    let x2 = Bdd::var(&manager, 2).unwrap();
    let heuristic = Heuristic::Random;
    let (f, _) = x0.or(&x1, &heuristic, 1024).unwrap();
    let (g, _) = x1.xor(&x2, &heuristic, 1024).unwrap();

    let (classical, classical_reduced) = {
        let mut m = manager.borrow_mut();
        and_reduced(&mut m, f.edge(), g.edge(), &heuristic, usize::MAX).unwrap()
    };
    assert!(!classical_reduced);

    let (bounded, bounded_reduced) = f.and(&g, &heuristic, 1024).unwrap();
    assert!(!bounded_reduced);

    let m = manager.borrow();
    for a in [false, true] {
        for b in [false, true] {
            for c in [false, true] {
                let assignment = [a, b, c];
                assert_eq!(
                    eval(&m, classical, &assignment),
                    eval(&m, bounded.edge(), &assignment)
                );
            }
        }
    }
}

#[test]
fn valuation_with_undefined_variable_forgets() {
    let manager = Bdd::new_manager(Limits::default());
    let x0 = Bdd::var(&manager, 0).unwrap();
    let x1 = Bdd::var(&manager, 1).unwrap();
    let heuristic = Heuristic::GreedyOneStep;
    let (bdd, _) = x0.xor(&x1, &heuristic, 1024).unwrap();

    // A node with both branches ⊥ is forbidden (it must canonicalize to the
    // shared ⊥ terminal), so "forget x0 entirely" is indistinguishable from
    // the bare ⊥ edge itself.
    let val = Bdd::unknown(&manager);

    let result = bdd.reduce_by_valuation(&val).unwrap();
    assert!(result.edge().is_unknown());
}
