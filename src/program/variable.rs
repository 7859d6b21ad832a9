//! Variable identifiers: the fixed set of provided, chess-derived variables
//! plus the per-agent custom memory cells.

use serde::{Deserialize, Serialize};

use super::algorithm::ProgramKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProvidedVar {
    IsSelf,
    IsOpponent,
    IsEmpty,
    IsPawn,
    IsKnight,
    IsBishop,
    IsRook,
    IsQueen,
    IsKing,
    IsInCheck,
    IsInCheckmate,
    IsDraw,
    CastledKingSide,
    CastledQueenSide,
    WasCaptured,
    PawnWasCaptured,
    KnightWasCaptured,
    BishopWasCaptured,
    RookWasCaptured,
    QueenWasCaptured,
    PossibleMoves,
    CanCapture,
    CanCapturePawn,
    CanCaptureKnight,
    CanCaptureBishop,
    CanCaptureRook,
    CanCaptureQueen,
    CanMoveHere,
    PawnCanMoveHere,
    KnightCanMoveHere,
    BishopCanMoveHere,
    RookCanMoveHere,
    QueenCanMoveHere,
    KingCanMoveHere,
    Depth,
    FirstIterationPreMoveTotal,
    FirstIterationPostMoveTotal,
    PrevIterationPreMoveTotal,
    PrevIterationPostMoveTotal,
    ThisIterationPreMoveTotal,
    ThisIterationPostMoveTotal,
}

pub const ALL_PROVIDED_VARS: [ProvidedVar; 41] = [
    ProvidedVar::IsSelf,
    ProvidedVar::IsOpponent,
    ProvidedVar::IsEmpty,
    ProvidedVar::IsPawn,
    ProvidedVar::IsKnight,
    ProvidedVar::IsBishop,
    ProvidedVar::IsRook,
    ProvidedVar::IsQueen,
    ProvidedVar::IsKing,
    ProvidedVar::IsInCheck,
    ProvidedVar::IsInCheckmate,
    ProvidedVar::IsDraw,
    ProvidedVar::CastledKingSide,
    ProvidedVar::CastledQueenSide,
    ProvidedVar::WasCaptured,
    ProvidedVar::PawnWasCaptured,
    ProvidedVar::KnightWasCaptured,
    ProvidedVar::BishopWasCaptured,
    ProvidedVar::RookWasCaptured,
    ProvidedVar::QueenWasCaptured,
    ProvidedVar::PossibleMoves,
    ProvidedVar::CanCapture,
    ProvidedVar::CanCapturePawn,
    ProvidedVar::CanCaptureKnight,
    ProvidedVar::CanCaptureBishop,
    ProvidedVar::CanCaptureRook,
    ProvidedVar::CanCaptureQueen,
    ProvidedVar::CanMoveHere,
    ProvidedVar::PawnCanMoveHere,
    ProvidedVar::KnightCanMoveHere,
    ProvidedVar::BishopCanMoveHere,
    ProvidedVar::RookCanMoveHere,
    ProvidedVar::QueenCanMoveHere,
    ProvidedVar::KingCanMoveHere,
    ProvidedVar::Depth,
    ProvidedVar::FirstIterationPreMoveTotal,
    ProvidedVar::FirstIterationPostMoveTotal,
    ProvidedVar::PrevIterationPreMoveTotal,
    ProvidedVar::PrevIterationPostMoveTotal,
    ProvidedVar::ThisIterationPreMoveTotal,
    ProvidedVar::ThisIterationPostMoveTotal,
];

impl ProvidedVar {
    /// Whether this variable is legal within a tree of the given kind, per
    /// the allowed-subsets table.
    pub fn allowed_in(self, kind: ProgramKind) -> bool {
        use ProvidedVar::*;
        match self {
            IsSelf | IsOpponent | IsEmpty | IsPawn | IsKnight | IsBishop | IsRook | IsQueen
            | IsKing | CastledKingSide | CastledQueenSide | WasCaptured | PawnWasCaptured
            | KnightWasCaptured | BishopWasCaptured | RookWasCaptured | QueenWasCaptured
            | PossibleMoves | CanCapture | CanCapturePawn | CanCaptureKnight
            | CanCaptureBishop | CanCaptureRook | CanCaptureQueen | CanMoveHere
            | PawnCanMoveHere | KnightCanMoveHere | BishopCanMoveHere | RookCanMoveHere
            | QueenCanMoveHere | KingCanMoveHere => kind == ProgramKind::Board,

            Depth
            | FirstIterationPreMoveTotal
            | FirstIterationPostMoveTotal
            | PrevIterationPreMoveTotal
            | PrevIterationPostMoveTotal
            | ThisIterationPreMoveTotal
            | ThisIterationPostMoveTotal => kind == ProgramKind::Movement,

            IsInCheck | IsInCheckmate | IsDraw => true,
        }
    }
}

/// Either a provided (chess-derived) variable, or a `custom_i` memory-cell
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableId {
    Provided(ProvidedVar),
    Custom(usize),
}

impl VariableId {
    /// Custom ids are allowed in both program kinds; provided ids defer to
    /// their own subset.
    pub fn allowed_in(self, kind: ProgramKind) -> bool {
        match self {
            VariableId::Provided(provided) => provided.allowed_in(kind),
            VariableId::Custom(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_only_variables_are_rejected_in_movement_trees() {
        assert!(ProvidedVar::IsPawn.allowed_in(ProgramKind::Board));
        assert!(!ProvidedVar::IsPawn.allowed_in(ProgramKind::Movement));
    }

    #[test]
    fn movement_only_variables_are_rejected_in_board_trees() {
        assert!(ProvidedVar::Depth.allowed_in(ProgramKind::Movement));
        assert!(!ProvidedVar::Depth.allowed_in(ProgramKind::Board));
    }

    #[test]
    fn shared_variables_are_allowed_everywhere() {
        for kind in [ProgramKind::Board, ProgramKind::Movement] {
            assert!(ProvidedVar::IsInCheck.allowed_in(kind));
            assert!(ProvidedVar::IsDraw.allowed_in(kind));
        }
    }

    #[test]
    fn custom_variables_are_allowed_everywhere() {
        for kind in [ProgramKind::Board, ProgramKind::Movement] {
            assert!(VariableId::Custom(12).allowed_in(kind));
        }
    }
}
