//! Resolves a `VariableId` against a square and turn context into an
//! integer, per the provided-variable table.

use crate::chess_adapter::ChessAdapter;
use crate::error::GameError;
use crate::pieces::Piece;
use crate::square::Square;
use crate::turn_context::TurnContext;

use super::variable::{ProvidedVar, VariableId};

pub fn resolve<A: ChessAdapter>(
    id: VariableId,
    square: Square,
    ctx: &TurnContext<A>,
) -> Result<i32, GameError> {
    match id {
        VariableId::Custom(index) => Ok(ctx.agent.memory.get(index)),
        VariableId::Provided(provided) => resolve_provided(provided, square, ctx),
    }
}

fn resolve_provided<A: ChessAdapter>(
    var: ProvidedVar,
    square: Square,
    ctx: &TurnContext<A>,
) -> Result<i32, GameError> {
    use ProvidedVar::*;

    let occupant = ctx.board.piece_at(square);

    Ok(match var {
        IsSelf => (matches!(occupant, Some((color, _)) if color == ctx.color)) as i32,
        IsOpponent => (matches!(occupant, Some((color, _)) if color == ctx.color.opposite())) as i32,
        IsEmpty => occupant.is_none() as i32,
        IsPawn => is_piece(occupant, Piece::Pawn),
        IsKnight => is_piece(occupant, Piece::Knight),
        IsBishop => is_piece(occupant, Piece::Bishop),
        IsRook => is_piece(occupant, Piece::Rook),
        IsQueen => is_piece(occupant, Piece::Queen),
        IsKing => is_piece(occupant, Piece::King),

        IsInCheck => ctx.board.in_check() as i32,
        IsInCheckmate => ctx.board.is_checkmate() as i32,
        IsDraw => ctx.board.is_draw() as i32,

        CastledKingSide => last_move_ended_here(ctx, square, |m| m.kingside_castle),
        CastledQueenSide => last_move_ended_here(ctx, square, |m| m.queenside_castle),

        WasCaptured => last_move_ended_here(ctx, square, |m| m.capture),
        PawnWasCaptured => captured_kind_here(ctx, square, Piece::Pawn),
        KnightWasCaptured => captured_kind_here(ctx, square, Piece::Knight),
        BishopWasCaptured => captured_kind_here(ctx, square, Piece::Bishop),
        RookWasCaptured => captured_kind_here(ctx, square, Piece::Rook),
        QueenWasCaptured => captured_kind_here(ctx, square, Piece::Queen),

        PossibleMoves => count_moves(ctx, |m| m.source == square),
        CanCapture => count_moves(ctx, |m| m.source == square && m.capture),
        CanCapturePawn => count_captures_of(ctx, square, Piece::Pawn),
        CanCaptureKnight => count_captures_of(ctx, square, Piece::Knight),
        CanCaptureBishop => count_captures_of(ctx, square, Piece::Bishop),
        CanCaptureRook => count_captures_of(ctx, square, Piece::Rook),
        CanCaptureQueen => count_captures_of(ctx, square, Piece::Queen),

        CanMoveHere => count_moves(ctx, |m| m.target == square),
        PawnCanMoveHere => count_moves(ctx, |m| m.target == square && m.piece == Piece::Pawn),
        KnightCanMoveHere => count_moves(ctx, |m| m.target == square && m.piece == Piece::Knight),
        BishopCanMoveHere => count_moves(ctx, |m| m.target == square && m.piece == Piece::Bishop),
        RookCanMoveHere => count_moves(ctx, |m| m.target == square && m.piece == Piece::Rook),
        QueenCanMoveHere => count_moves(ctx, |m| m.target == square && m.piece == Piece::Queen),
        KingCanMoveHere => count_moves(ctx, |m| m.target == square && m.piece == Piece::King),

        Depth => ctx.depth as i32,
        FirstIterationPreMoveTotal => ctx.outputs.first_pre as i32,
        FirstIterationPostMoveTotal => ctx.outputs.first_post as i32,
        PrevIterationPreMoveTotal => ctx.outputs.prev_pre as i32,
        PrevIterationPostMoveTotal => ctx.outputs.prev_post as i32,
        ThisIterationPreMoveTotal => ctx.outputs.this_pre as i32,
        ThisIterationPostMoveTotal => ctx.outputs.this_post as i32,
    })
}

fn is_piece(occupant: Option<(crate::pieces::Color, Piece)>, kind: Piece) -> i32 {
    matches!(occupant, Some((_, piece)) if piece == kind) as i32
}

fn last_move_ended_here<A: ChessAdapter>(
    ctx: &TurnContext<A>,
    square: Square,
    predicate: impl Fn(&crate::chess_adapter::LegalMove) -> bool,
) -> i32 {
    match ctx.board.last_move() {
        Some(m) if m.target == square && predicate(&m) => 1,
        _ => 0,
    }
}

/// A capture's `{type}_was_captured` fires only when the last move was a
/// capture terminating on `square` *and* the captured piece was of `kind`
/// (reconstructed from the pre-move position via the adapter).
fn captured_kind_here<A: ChessAdapter>(ctx: &TurnContext<A>, square: Square, kind: Piece) -> i32 {
    let Some(last) = ctx.board.last_move() else {
        return 0;
    };
    if last.target != square || !last.capture {
        return 0;
    }
    (ctx.board.captured_piece_kind(square) == Some(kind)) as i32
}

fn count_moves<A: ChessAdapter>(
    ctx: &TurnContext<A>,
    predicate: impl Fn(&crate::chess_adapter::LegalMove) -> bool,
) -> i32 {
    ctx.board
        .legal_moves()
        .iter()
        .filter(|m| predicate(m))
        .count() as i32
}

fn count_captures_of<A: ChessAdapter>(ctx: &TurnContext<A>, square: Square, kind: Piece) -> i32 {
    ctx.board
        .legal_moves()
        .iter()
        .filter(|m| {
            if m.source != square || !m.capture {
                return false;
            }
            if m.en_passant {
                return kind == Piece::Pawn;
            }
            ctx.board.piece_at(m.target).map(|(_, piece)| piece) == Some(kind)
        })
        .count() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::chess_adapter::EngineAdapter;
    use crate::memory::MemoryBank;
    use crate::pieces::Color;
    use crate::program::algorithm::{Algorithm, ProgramKind};
    use crate::program::node::Node;

    fn ctx_at(adapter: EngineAdapter, color: Color) -> TurnContext<EngineAdapter> {
        let agent = Agent::fresh(
            0,
            Algorithm::new(ProgramKind::Board, Node::Variable(VariableId::Custom(0))),
            Algorithm::new(ProgramKind::Movement, Node::Variable(VariableId::Custom(0))),
            MemoryBank::zeroed(),
        );
        TurnContext::new(agent, adapter, color)
    }

    #[test]
    fn is_king_is_one_only_on_both_kings_initial_squares() {
        let ctx = ctx_at(EngineAdapter::new(), Color::White);
        for file in 0..8u8 {
            for rank in 0..8u8 {
                let square = Square::new(file, rank);
                let value = resolve(VariableId::Provided(ProvidedVar::IsKing), square, &ctx).unwrap();
                let expected = (square.to_algebraic() == "e1" || square.to_algebraic() == "e8") as i32;
                assert_eq!(value, expected, "square {:?}", square.to_algebraic());
            }
        }
    }

    #[test]
    fn capture_attribution_matches_fixture_position() {
        use crate::chess_adapter::ChessAdapter;

        let adapter =
            EngineAdapter::from_position("rnb1k1nr/pppp1ppp/3bp3/4N2q/3PP3/2P5/PP2QPPP/RNB1KB1R b KQkq - 4 6")
                .unwrap();
        let mv = adapter
            .legal_moves()
            .into_iter()
            .find(|m| m.source.to_algebraic() == "h5" && m.target.to_algebraic() == "e2")
            .expect("h5-e2 should be legal");
        let next = adapter.apply_move(&mv).unwrap();
        let ctx = ctx_at(next, Color::White);

        let e2 = Square::from_algebraic("e2").unwrap();
        let e1 = Square::from_algebraic("e1").unwrap();

        assert_eq!(
            resolve(VariableId::Provided(ProvidedVar::WasCaptured), e2, &ctx).unwrap(),
            1
        );
        assert_eq!(
            resolve(VariableId::Provided(ProvidedVar::QueenWasCaptured), e2, &ctx).unwrap(),
            1
        );
        assert_eq!(
            resolve(VariableId::Provided(ProvidedVar::WasCaptured), e1, &ctx).unwrap(),
            0
        );
    }

    #[test]
    fn custom_variable_reads_from_agent_memory() {
        let mut ctx = ctx_at(EngineAdapter::new(), Color::White);
        ctx.agent.memory.set(5, -42);
        assert_eq!(resolve(VariableId::Custom(5), Square::new(0, 0), &ctx).unwrap(), -42);
    }
}
