//! Traversal heuristics for the bounded apply engine.
//!
//! A heuristic looks at up to three operand edges meeting at a common top
//! variable and decides which cofactor — then or else — the recursive apply
//! engine should explore first. Tagged-variant dispatch is used in
//! preference to a trait object, mirroring the Design Notes' guidance that
//! "a single first-class function pointer" is enough and inheritance would
//! be overkill for three fixed policies plus the occasional custom closure.

use std::cmp::Ordering;

use tribdd_core::{Edge, LevelNo, Manager};

/// `Ordering::Less` means "recurse into the then-cofactor first";
/// `Ordering::Greater`/`Ordering::Equal` mean "else first".
pub type Choice = Ordering;

/// One of the three built-in traversal policies, or a user-supplied closure.
#[derive(Clone)]
pub enum Heuristic {
    /// Flip a coin, using the manager's own seeded RNG so results stay
    /// reproducible for a given seed.
    Random,
    /// Prefer the side with more terminal cofactors at the shared top
    /// variable; ties broken by smaller accumulated level (deeper variable
    /// first), remaining ties broken randomly.
    GreedyOneStep,
    /// Same scoring as `GreedyOneStep`, but looking one Shannon step deeper:
    /// a cofactor that is itself a terminal contributes a bonus of 8 to the
    /// const accumulator instead of scoring its (nonexistent) children.
    GreedyTwoStep,
    /// A caller-supplied policy, for anything the three built-ins don't
    /// cover. `Rc`, not `Arc`, matching this crate's single-threaded
    /// concurrency model.
    Custom(std::rc::Rc<dyn Fn(&Manager, Edge, Option<Edge>, Option<Edge>, LevelNo) -> Choice>),
}

impl std::fmt::Debug for Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Heuristic::Random => write!(f, "Heuristic::Random"),
            Heuristic::GreedyOneStep => write!(f, "Heuristic::GreedyOneStep"),
            Heuristic::GreedyTwoStep => write!(f, "Heuristic::GreedyTwoStep"),
            Heuristic::Custom(_) => write!(f, "Heuristic::Custom(..)"),
        }
    }
}

impl Heuristic {
    /// Decide recursion order for operands `f`, `g`, `h` (the latter two
    /// optional) that share top variable `top`.
    pub fn choose(
        &self,
        manager: &mut Manager,
        f: Edge,
        g: Option<Edge>,
        h: Option<Edge>,
        top: LevelNo,
    ) -> Choice {
        match self {
            Heuristic::Random => {
                if manager.random_sign() < 0 {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            Heuristic::GreedyOneStep => greedy(manager, f, g, h, top, false),
            Heuristic::GreedyTwoStep => greedy(manager, f, g, h, top, true),
            Heuristic::Custom(f_ptr) => f_ptr(manager, f, g, h, top),
        }
    }
}

/// `(const_count, score)` contributed by a single cofactor.
fn score_cofactor(manager: &Manager, cof: Edge, two_step: bool) -> (u32, u32) {
    if cof.is_constant() {
        return (if two_step { 8 } else { 1 }, 0);
    }
    if !two_step {
        return (0, manager.level_of(cof));
    }
    let lvl = manager.level_of(cof);
    let (grand_then, grand_else) = manager.cofactors(cof, lvl);
    let mut const_acc = 0;
    let mut score_acc = 0;
    for grand in [grand_then, grand_else] {
        if grand.is_constant() {
            const_acc += 1;
        } else {
            score_acc += manager.level_of(grand);
        }
    }
    (const_acc, score_acc)
}

fn greedy(
    manager: &mut Manager,
    f: Edge,
    g: Option<Edge>,
    h: Option<Edge>,
    top: LevelNo,
    two_step: bool,
) -> Choice {
    let (mut then_const, mut then_score) = (0u32, 0u32);
    let (mut else_const, mut else_score) = (0u32, 0u32);

    for operand in [Some(f), g, h].into_iter().flatten() {
        if manager.level_of(operand) != top {
            continue;
        }
        let (then_cof, else_cof) = manager.cofactors(operand, top);
        let (c, s) = score_cofactor(manager, then_cof, two_step);
        then_const += c;
        then_score += s;
        let (c, s) = score_cofactor(manager, else_cof, two_step);
        else_const += c;
        else_score += s;
    }

    match then_const.cmp(&else_const) {
        Ordering::Greater => Ordering::Less,
        Ordering::Less => Ordering::Greater,
        Ordering::Equal => match then_score.cmp(&else_score) {
            Ordering::Equal => {
                if manager.random_sign() < 0 {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            smaller_wins => smaller_wins,
        },
    }
}
