//! The fixed set of function-node kinds an expression tree can be built from.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Binary,
    Invert,
    Sqrt,
    Round,
    Floor,
    Ceil,
    Abs,
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Neq,
    Min,
    Max,
    Pow,
    If,
    Write,
}

pub const ALL_FUNCTION_KINDS: [FunctionKind; 25] = [
    FunctionKind::Add,
    FunctionKind::Sub,
    FunctionKind::Mul,
    FunctionKind::Div,
    FunctionKind::Mod,
    FunctionKind::And,
    FunctionKind::Or,
    FunctionKind::Binary,
    FunctionKind::Invert,
    FunctionKind::Sqrt,
    FunctionKind::Round,
    FunctionKind::Floor,
    FunctionKind::Ceil,
    FunctionKind::Abs,
    FunctionKind::Gt,
    FunctionKind::Gte,
    FunctionKind::Lt,
    FunctionKind::Lte,
    FunctionKind::Eq,
    FunctionKind::Neq,
    FunctionKind::Min,
    FunctionKind::Max,
    FunctionKind::Pow,
    FunctionKind::If,
    FunctionKind::Write,
];

impl FunctionKind {
    /// `min`/`max` are the only variadic kinds (2..=8 children); everything
    /// else has a shape fixed by its kind.
    pub fn is_variadic(self) -> bool {
        matches!(self, FunctionKind::Min | FunctionKind::Max)
    }

    pub fn is_unary(self) -> bool {
        matches!(
            self,
            FunctionKind::Binary
                | FunctionKind::Invert
                | FunctionKind::Sqrt
                | FunctionKind::Round
                | FunctionKind::Floor
                | FunctionKind::Ceil
                | FunctionKind::Abs
        )
    }

    pub fn is_binary(self) -> bool {
        matches!(
            self,
            FunctionKind::Add
                | FunctionKind::Sub
                | FunctionKind::Mul
                | FunctionKind::Div
                | FunctionKind::Mod
                | FunctionKind::And
                | FunctionKind::Or
                | FunctionKind::Gt
                | FunctionKind::Gte
                | FunctionKind::Lt
                | FunctionKind::Lte
                | FunctionKind::Eq
                | FunctionKind::Neq
                | FunctionKind::Pow
        )
    }
}
