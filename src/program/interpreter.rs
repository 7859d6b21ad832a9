//! The tree-walking evaluator. A free function over `&Node` rather than a
//! trait object, since the node shape is closed and this sits in the hot
//! per-square, per-candidate-move evaluation loop.

use crate::chess_adapter::ChessAdapter;
use crate::error::GameError;
use crate::square::Square;
use crate::turn_context::TurnContext;

use super::algorithm::ProgramKind;
use super::function_kind::FunctionKind;
use super::node::Node;
use super::variables;

fn binarize(x: i32) -> i32 {
    if x >= 1 {
        1
    } else {
        0
    }
}

/// Evaluates `node` against `square` and `ctx`. `program_kind` is the kind
/// of program `node` belongs to, used to enforce the allowed-variable
/// subset invariant at each leaf. Evaluation is strict and left-to-right;
/// `write` is the only node with a side effect (on `ctx.agent`'s dynamic
/// memory), everything else is pure.
pub fn eval<A: ChessAdapter>(
    node: &Node,
    program_kind: ProgramKind,
    square: Square,
    ctx: &mut TurnContext<A>,
) -> Result<i32, GameError> {
    match node {
        Node::Variable(id) => {
            if !id.allowed_in(program_kind) {
                return Err(GameError::Structural(format!(
                    "{id:?} is not allowed in a {program_kind:?} program"
                )));
            }
            variables::resolve(*id, square, ctx)
        }

        Node::Unary { kind, value } => {
            let x = eval(value, program_kind, square, ctx)?;
            Ok(match kind {
                FunctionKind::Binary => binarize(x),
                FunctionKind::Invert => {
                    if binarize(x) == 0 {
                        1
                    } else {
                        0
                    }
                }
                FunctionKind::Sqrt => (x.max(0) as f64).sqrt().floor() as i32,
                FunctionKind::Round => x,
                FunctionKind::Floor => x,
                FunctionKind::Ceil => x,
                FunctionKind::Abs => x.abs(),
                other => {
                    return Err(GameError::Structural(format!(
                        "{other:?} is not a unary function kind"
                    )))
                }
            })
        }

        Node::Binary { kind, left, right } => {
            let l = eval(left, program_kind, square, ctx)?;
            let r = eval(right, program_kind, square, ctx)?;
            Ok(match kind {
                FunctionKind::Add => l.wrapping_add(r),
                FunctionKind::Sub => l.wrapping_sub(r),
                FunctionKind::Mul => l.wrapping_mul(r),
                FunctionKind::Div => {
                    if r == 0 {
                        0
                    } else {
                        l / r
                    }
                }
                FunctionKind::Mod => {
                    if r == 0 {
                        0
                    } else {
                        l % r
                    }
                }
                FunctionKind::And => {
                    if binarize(l) == 1 && binarize(r) == 1 {
                        1
                    } else {
                        0
                    }
                }
                FunctionKind::Or => {
                    if binarize(l) == 1 || binarize(r) == 1 {
                        1
                    } else {
                        0
                    }
                }
                FunctionKind::Gt => (l > r) as i32,
                FunctionKind::Gte => (l >= r) as i32,
                FunctionKind::Lt => (l < r) as i32,
                FunctionKind::Lte => (l <= r) as i32,
                FunctionKind::Eq => (l == r) as i32,
                FunctionKind::Neq => (l != r) as i32,
                FunctionKind::Pow => {
                    if r < 0 {
                        0
                    } else {
                        (l as f64).powi(r) as i32
                    }
                }
                other => {
                    return Err(GameError::Structural(format!(
                        "{other:?} is not a binary function kind"
                    )))
                }
            })
        }

        Node::Variadic { kind, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(arg, program_kind, square, ctx)?);
            }
            match kind {
                FunctionKind::Min => Ok(values.into_iter().min().unwrap_or(0)),
                FunctionKind::Max => Ok(values.into_iter().max().unwrap_or(0)),
                other => Err(GameError::Structural(format!(
                    "{other:?} is not a variadic function kind"
                ))),
            }
        }

        Node::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let c = eval(condition, program_kind, square, ctx)?;
            if binarize(c) == 1 {
                eval(then_branch, program_kind, square, ctx)
            } else {
                eval(else_branch, program_kind, square, ctx)
            }
        }

        Node::Write { index, value } => {
            let v = eval(value, program_kind, square, ctx)?;
            if !crate::memory::MemoryBank::is_dynamic(*index) {
                return Err(GameError::Structural(format!(
                    "write targeted non-dynamic cell {index}"
                )));
            }
            ctx.agent.memory.set(*index, v);
            Ok(v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::chess_adapter::EngineAdapter;
    use crate::memory::MemoryBank;
    use crate::program::algorithm::Algorithm;
    use crate::program::variable::{ProvidedVar, VariableId};

    fn fresh_ctx() -> TurnContext<EngineAdapter> {
        let agent = Agent::fresh(
            0,
            Algorithm::new(ProgramKind::Board, Node::Variable(VariableId::Custom(0))),
            Algorithm::new(ProgramKind::Movement, Node::Variable(VariableId::Custom(0))),
            MemoryBank::zeroed(),
        );
        TurnContext::new(agent, EngineAdapter::new(), crate::pieces::Color::White)
    }

    fn a1() -> Square {
        Square::from_algebraic("a1").unwrap()
    }

    #[test]
    fn sqrt_of_negative_is_zero() {
        let mut ctx = fresh_ctx();
        let tree = Node::Unary {
            kind: FunctionKind::Sqrt,
            value: Box::new(Node::Variable(VariableId::Custom(1))),
        };
        ctx.agent.memory.set(1, -3);
        assert_eq!(eval(&tree, ProgramKind::Board, a1(), &mut ctx).unwrap(), 0);
    }

    #[test]
    fn div_by_zero_is_zero() {
        let mut ctx = fresh_ctx();
        let tree = Node::Binary {
            kind: FunctionKind::Div,
            left: Box::new(Node::Variable(VariableId::Custom(0))),
            right: Box::new(Node::Variable(VariableId::Custom(1))),
        };
        ctx.agent.memory.set(0, 9);
        ctx.agent.memory.set(1, 0);
        assert_eq!(eval(&tree, ProgramKind::Board, a1(), &mut ctx).unwrap(), 0);
    }

    #[test]
    fn if_evaluates_exactly_one_branch() {
        let mut ctx = fresh_ctx();
        let tree = Node::If {
            condition: Box::new(Node::Variable(VariableId::Provided(ProvidedVar::IsInCheck))),
            then_branch: Box::new(Node::Variable(VariableId::Custom(1))),
            else_branch: Box::new(Node::Write {
                index: crate::memory::STATIC_CELLS,
                value: Box::new(Node::Variable(VariableId::Custom(2))),
            }),
        };
        ctx.agent.memory.set(1, 1);
        ctx.agent.memory.set(2, 2);
        let result = eval(&tree, ProgramKind::Board, a1(), &mut ctx).unwrap();
        assert_eq!(result, 2);
        assert_eq!(ctx.agent.memory.get(crate::memory::STATIC_CELLS), 2);
    }

    #[test]
    fn min_max_with_two_args_matches_pairwise() {
        let mut ctx = fresh_ctx();
        let min_tree = Node::Variadic {
            kind: FunctionKind::Min,
            args: vec![
                Node::Variable(VariableId::Custom(0)),
                Node::Variable(VariableId::Custom(1)),
            ],
        };
        ctx.agent.memory.set(0, 5);
        ctx.agent.memory.set(1, -2);
        assert_eq!(
            eval(&min_tree, ProgramKind::Board, a1(), &mut ctx).unwrap(),
            -2
        );
    }

    #[test]
    fn min_max_with_eight_args_matches_extremum() {
        let mut ctx = fresh_ctx();
        let args: Vec<Node> = (0..8).map(|i| Node::Variable(VariableId::Custom(i))).collect();
        for i in 0..8 {
            ctx.agent.memory.set(i, (i as i32) * 3 - 10);
        }
        let max_tree = Node::Variadic {
            kind: FunctionKind::Max,
            args,
        };
        assert_eq!(
            eval(&max_tree, ProgramKind::Board, a1(), &mut ctx).unwrap(),
            11
        );
    }

    #[test]
    fn write_returns_and_stores_the_value() {
        let mut ctx = fresh_ctx();
        let idx = crate::memory::STATIC_CELLS + 1;
        let tree = Node::Write {
            index: idx,
            value: Box::new(Node::Variable(VariableId::Custom(0))),
        };
        ctx.agent.memory.set(0, 17);
        let returned = eval(&tree, ProgramKind::Board, a1(), &mut ctx).unwrap();
        assert_eq!(returned, 17);
        assert_eq!(ctx.agent.memory.get(idx), 17);
    }

    #[test]
    fn write_targeting_a_static_cell_is_a_structural_fault() {
        let mut ctx = fresh_ctx();
        let tree = Node::Write {
            index: 0,
            value: Box::new(Node::Variable(VariableId::Custom(0))),
        };
        assert!(matches!(
            eval(&tree, ProgramKind::Board, a1(), &mut ctx),
            Err(GameError::Structural(_))
        ));
    }

    #[test]
    fn movement_only_variable_is_a_structural_fault_in_a_board_program() {
        let mut ctx = fresh_ctx();
        let tree = Node::Variable(VariableId::Provided(ProvidedVar::Depth));
        assert!(matches!(
            eval(&tree, ProgramKind::Board, a1(), &mut ctx),
            Err(GameError::Structural(_))
        ));
    }
}
