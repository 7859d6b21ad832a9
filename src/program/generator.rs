//! Random tree synthesis.

use rand::Rng;

use crate::memory::TOTAL_CELLS;

use super::algorithm::{Algorithm, ProgramKind};
use super::function_kind::{FunctionKind, ALL_FUNCTION_KINDS};
use super::node::Node;
use super::variable::{VariableId, ALL_PROVIDED_VARS};

/// Trees are forced to a variable leaf at this depth regardless of `f_bias`.
pub const MAX_DEPTH: usize = 3;

/// Dynamic cells start at this index; `write` targets land at or above it.
const DYNAMIC_START: usize = crate::memory::STATIC_CELLS;

/// What kind of node sits at the parent position, used to bias the
/// function-vs-variable draw at the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    None,
    Function,
    Variable,
}

fn f_bias(parent: Parent) -> f64 {
    match parent {
        Parent::None => 1.0,
        Parent::Function => 0.4,
        Parent::Variable => 0.6,
    }
}

/// Builds a complete, randomly synthesized algorithm of the given kind.
pub fn generate_algorithm(rng: &mut impl Rng, kind: ProgramKind) -> Algorithm {
    Algorithm::new(kind, generate_node(rng, kind, Parent::None, 0))
}

/// Generates a single node at `depth`, given the kind of node at its parent
/// position (`Parent::None` for the root).
pub fn generate_node(rng: &mut impl Rng, program_kind: ProgramKind, parent: Parent, depth: usize) -> Node {
    if depth >= MAX_DEPTH {
        return Node::Variable(random_variable(rng, program_kind));
    }

    if rng.gen::<f64>() <= f_bias(parent) {
        generate_function(rng, program_kind, depth)
    } else {
        Node::Variable(random_variable(rng, program_kind))
    }
}

fn random_variable(rng: &mut impl Rng, program_kind: ProgramKind) -> VariableId {
    let allowed: Vec<VariableId> = ALL_PROVIDED_VARS
        .iter()
        .filter(|v| v.allowed_in(program_kind))
        .map(|v| VariableId::Provided(*v))
        .chain((0..TOTAL_CELLS).map(VariableId::Custom))
        .collect();
    allowed[rng.gen_range(0..allowed.len())]
}

fn generate_function(rng: &mut impl Rng, program_kind: ProgramKind, depth: usize) -> Node {
    let kind = ALL_FUNCTION_KINDS[rng.gen_range(0..ALL_FUNCTION_KINDS.len())];
    let child_depth = depth + 1;

    if kind.is_unary() {
        return Node::Unary {
            kind,
            value: Box::new(generate_node(rng, program_kind, Parent::Function, child_depth)),
        };
    }

    if kind.is_binary() {
        return Node::Binary {
            kind,
            left: Box::new(generate_node(rng, program_kind, Parent::Function, child_depth)),
            right: Box::new(generate_node(rng, program_kind, Parent::Function, child_depth)),
        };
    }

    if kind.is_variadic() {
        let count = skewed_child_count(rng);
        let args = (0..count)
            .map(|_| generate_node(rng, program_kind, Parent::Function, child_depth))
            .collect();
        return Node::Variadic { kind, args };
    }

    match kind {
        FunctionKind::If => Node::If {
            condition: Box::new(generate_node(rng, program_kind, Parent::Function, child_depth)),
            then_branch: Box::new(generate_node(rng, program_kind, Parent::Function, child_depth)),
            else_branch: Box::new(generate_node(rng, program_kind, Parent::Function, child_depth)),
        },
        FunctionKind::Write => Node::Write {
            index: rng.gen_range(DYNAMIC_START..TOTAL_CELLS),
            value: Box::new(generate_node(rng, program_kind, Parent::Function, child_depth)),
        },
        _ => unreachable!("every FunctionKind is unary, binary, variadic, If, or Write"),
    }
}

/// A right-skewed distribution over `2..=8`, peaked at 2, for `min`/`max`
/// arity — each step is half as likely as the one before it.
fn skewed_child_count(rng: &mut impl Rng) -> usize {
    const WEIGHTS: [f64; 7] = [1.0, 0.5, 0.25, 0.125, 0.0625, 0.03125, 0.015625];
    let total: f64 = WEIGHTS.iter().sum();
    let mut x = rng.gen::<f64>() * total;
    for (i, weight) in WEIGHTS.iter().enumerate() {
        if x < *weight {
            return i + 2;
        }
        x -= *weight;
    }
    8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::walk::max_depth;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn synthesized_trees_never_exceed_max_depth() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let alg = generate_algorithm(&mut rng, ProgramKind::Board);
            assert!(max_depth(&alg.root) <= MAX_DEPTH);
            let alg = generate_algorithm(&mut rng, ProgramKind::Movement);
            assert!(max_depth(&alg.root) <= MAX_DEPTH);
        }
    }

    #[test]
    fn synthesized_trees_only_use_variables_allowed_for_their_kind() {
        let mut rng = StdRng::seed_from_u64(2);
        for kind in [ProgramKind::Board, ProgramKind::Movement] {
            for _ in 0..500 {
                let alg = generate_algorithm(&mut rng, kind);
                crate::program::walk::walk_ref(&alg.root, |node, _| {
                    if let Some(vid) = node.variable_id() {
                        assert!(vid.allowed_in(kind));
                    }
                });
            }
        }
    }

    #[test]
    fn write_nodes_always_target_the_dynamic_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut saw_write = false;
        for _ in 0..2000 {
            let alg = generate_algorithm(&mut rng, ProgramKind::Board);
            crate::program::walk::walk_ref(&alg.root, |node, _| {
                if let Node::Write { index, .. } = node {
                    saw_write = true;
                    assert!(*index >= DYNAMIC_START && *index < TOTAL_CELLS);
                }
            });
        }
        assert!(saw_write, "expected at least one write node across 2000 trials");
    }

    #[test]
    fn skewed_child_count_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..1000 {
            let n = skewed_child_count(&mut rng);
            assert!((2..=8).contains(&n));
        }
    }
}
