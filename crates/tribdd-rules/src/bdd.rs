//! The public `Bdd` handle: a thin, ref-counted wrapper around a manager
//! edge, in the shape of the function-wrapper types decision-diagram
//! libraries expose to end users — concretely rather than generically,
//! since this crate only ever has one diagram kind.

use std::cell::RefCell;
use std::rc::Rc;

use tribdd_core::{AllocResult, Edge, Error, Limits, Manager, VarIndex};

use crate::apply::{
    and_reduced, ite_reduced, nand_reduced, nor_reduced, or_reduced, xnor_reduced, xor_reduced,
};
use crate::heuristic::Heuristic;
use crate::helpers::{forget_ones, forget_zeros, merge_interval};
use crate::limit::reduce_by_node_limit;
use crate::valuation::reduce_by_valuation;

/// A BDD function: a manager handle plus the edge denoting this particular
/// function. Cloning is cheap (an `Rc` bump and a `Copy` of the edge).
#[derive(Clone)]
pub struct Bdd {
    manager: Rc<RefCell<Manager>>,
    edge: Edge,
}

impl Bdd {
    /// Create a fresh, empty manager behind the shared handle every `Bdd`
    /// in a computation is built from.
    pub fn new_manager(limits: Limits) -> Rc<RefCell<Manager>> {
        Rc::new(RefCell::new(Manager::new(limits)))
    }

    /// Like [`Bdd::new_manager`], but with a fixed RNG seed so heuristic
    /// tie-breaking (and the `Random` heuristic itself) is reproducible.
    pub fn new_manager_with_seed(limits: Limits, seed: u64) -> Rc<RefCell<Manager>> {
        Rc::new(RefCell::new(Manager::with_seed(limits, seed)))
    }

    pub fn one(manager: &Rc<RefCell<Manager>>) -> Bdd {
        let edge = manager.borrow().one();
        Bdd { manager: manager.clone(), edge }
    }

    pub fn zero(manager: &Rc<RefCell<Manager>>) -> Bdd {
        let edge = manager.borrow().zero();
        Bdd { manager: manager.clone(), edge }
    }

    pub fn unknown(manager: &Rc<RefCell<Manager>>) -> Bdd {
        let edge = manager.borrow().unknown();
        Bdd { manager: manager.clone(), edge }
    }

    /// The positive literal of `var`, creating the variable if necessary.
    pub fn var(manager: &Rc<RefCell<Manager>>, var: VarIndex) -> AllocResult<Bdd> {
        let edge = manager.borrow_mut().var(var)?;
        Ok(Bdd { manager: manager.clone(), edge })
    }

    /// The underlying manager edge, for callers that need to drop down to
    /// `tribdd-core`/`tribdd-rules`'s free functions directly.
    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn manager(&self) -> &Rc<RefCell<Manager>> {
        &self.manager
    }

    fn wrap(&self, edge: Edge) -> Bdd {
        Bdd { manager: self.manager.clone(), edge }
    }

    fn assert_same_manager(&self, other: &Bdd) {
        debug_assert!(
            Rc::ptr_eq(&self.manager, &other.manager),
            "combined two Bdd handles from different managers"
        );
    }

    pub fn not(&self) -> Bdd {
        self.wrap(self.edge.not())
    }

    pub fn and(&self, g: &Bdd, heuristic: &Heuristic, limit: usize) -> Result<(Bdd, bool), Error> {
        self.assert_same_manager(g);
        let (edge, reduced) =
            and_reduced(&mut self.manager.borrow_mut(), self.edge, g.edge, heuristic, limit)?;
        Ok((self.wrap(edge), reduced))
    }

    pub fn or(&self, g: &Bdd, heuristic: &Heuristic, limit: usize) -> Result<(Bdd, bool), Error> {
        self.assert_same_manager(g);
        let (edge, reduced) =
            or_reduced(&mut self.manager.borrow_mut(), self.edge, g.edge, heuristic, limit)?;
        Ok((self.wrap(edge), reduced))
    }

    pub fn xor(&self, g: &Bdd, heuristic: &Heuristic, limit: usize) -> Result<(Bdd, bool), Error> {
        self.assert_same_manager(g);
        let (edge, reduced) =
            xor_reduced(&mut self.manager.borrow_mut(), self.edge, g.edge, heuristic, limit)?;
        Ok((self.wrap(edge), reduced))
    }

    pub fn nand(&self, g: &Bdd, heuristic: &Heuristic, limit: usize) -> Result<(Bdd, bool), Error> {
        self.assert_same_manager(g);
        let (edge, reduced) =
            nand_reduced(&mut self.manager.borrow_mut(), self.edge, g.edge, heuristic, limit)?;
        Ok((self.wrap(edge), reduced))
    }

    pub fn nor(&self, g: &Bdd, heuristic: &Heuristic, limit: usize) -> Result<(Bdd, bool), Error> {
        self.assert_same_manager(g);
        let (edge, reduced) =
            nor_reduced(&mut self.manager.borrow_mut(), self.edge, g.edge, heuristic, limit)?;
        Ok((self.wrap(edge), reduced))
    }

    pub fn xnor(&self, g: &Bdd, heuristic: &Heuristic, limit: usize) -> Result<(Bdd, bool), Error> {
        self.assert_same_manager(g);
        let (edge, reduced) =
            xnor_reduced(&mut self.manager.borrow_mut(), self.edge, g.edge, heuristic, limit)?;
        Ok((self.wrap(edge), reduced))
    }

    pub fn ite(
        &self,
        g: &Bdd,
        h: &Bdd,
        heuristic: &Heuristic,
        limit: usize,
    ) -> Result<(Bdd, bool), Error> {
        self.assert_same_manager(g);
        self.assert_same_manager(h);
        let (edge, reduced) = ite_reduced(
            &mut self.manager.borrow_mut(),
            self.edge,
            g.edge,
            h.edge,
            heuristic,
            limit,
        )?;
        Ok((self.wrap(edge), reduced))
    }

    pub fn reduce_by_node_limit(
        &self,
        heuristic: &Heuristic,
        limit: usize,
    ) -> Result<(Bdd, bool), Error> {
        let (edge, reduced) =
            reduce_by_node_limit(&mut self.manager.borrow_mut(), self.edge, heuristic, limit)?;
        Ok((self.wrap(edge), reduced))
    }

    pub fn reduce_by_valuation(&self, val: &Bdd) -> AllocResult<Bdd> {
        self.assert_same_manager(val);
        let edge =
            reduce_by_valuation(&mut self.manager.borrow_mut(), self.edge, val.edge)?;
        Ok(self.wrap(edge))
    }

    pub fn forget_zeros(&self, heuristic: &Heuristic, limit: usize) -> Result<(Bdd, bool), Error> {
        let (edge, reduced) =
            forget_zeros(&mut self.manager.borrow_mut(), self.edge, heuristic, limit)?;
        Ok((self.wrap(edge), reduced))
    }

    pub fn forget_ones(&self, heuristic: &Heuristic, limit: usize) -> Result<(Bdd, bool), Error> {
        let (edge, reduced) =
            forget_ones(&mut self.manager.borrow_mut(), self.edge, heuristic, limit)?;
        Ok((self.wrap(edge), reduced))
    }

    pub fn merge_interval(
        &self,
        over: &Bdd,
        heuristic: &Heuristic,
        limit: usize,
    ) -> Result<(Bdd, bool), Error> {
        self.assert_same_manager(over);
        let (edge, reduced) = merge_interval(
            &mut self.manager.borrow_mut(),
            self.edge,
            over.edge,
            heuristic,
            limit,
        )?;
        Ok((self.wrap(edge), reduced))
    }
}
