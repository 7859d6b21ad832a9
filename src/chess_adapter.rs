//! The chess rules engine, pinned behind the [`ChessAdapter`] trait per the
//! evolutionary core's external-interface contract. Everything in this
//! module is ordinary chess-engine correctness, not a core invariant: the
//! tournament loop only ever touches a position through the trait.

use crate::boards::Board;
use crate::error::AdapterError;
use crate::game_engine::engine::Engine;
use crate::game_engine::move_evaluation_context::MoveEvaluationContext;
use crate::game_engine::player_move::{CastlingMove, PlayerMove};
use crate::game_engine::utility::{get_color, get_half_turn_boards, get_piece_type};
use crate::pieces::{Color, Piece};
use crate::square::Square;

/// One legal move, with the metadata the variable provider needs without
/// re-deriving it from raw bitboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalMove {
    pub source: Square,
    pub target: Square,
    pub piece: Piece,
    pub capture: bool,
    pub en_passant: bool,
    pub promotion: Option<Piece>,
    pub kingside_castle: bool,
    pub queenside_castle: bool,
}

/// The rules-engine surface the evolutionary core depends on.
///
/// Construction, move application, legal-move enumeration with metadata, the
/// game-over predicates, and last-move reconstruction for capture-kind
/// lookups — nothing else reaches into a position's internals.
pub trait ChessAdapter: Clone {
    fn new() -> Self;

    fn from_position(fen: &str) -> Result<Self, AdapterError>
    where
        Self: Sized;

    fn side_to_move(&self) -> Color;

    fn legal_moves(&self) -> Vec<LegalMove>;

    fn apply_move(&self, mv: &LegalMove) -> Result<Self, AdapterError>
    where
        Self: Sized;

    fn in_check(&self) -> bool;
    fn is_checkmate(&self) -> bool;
    fn is_stalemate(&self) -> bool;
    fn is_threefold_repetition(&self) -> bool;
    fn is_draw(&self) -> bool;
    fn is_game_over(&self) -> bool;

    /// The last move played, if any.
    fn last_move(&self) -> Option<LegalMove>;

    /// The kind of piece that was captured on `square` by the last move, if
    /// the last move was a capture that terminated there. Reconstructed from
    /// the pre-move position, since the board no longer holds the piece.
    fn captured_piece_kind(&self, square: Square) -> Option<Piece>;

    /// The color and kind of piece currently occupying `square`, if any.
    fn piece_at(&self, square: Square) -> Option<(Color, Piece)>;
}

fn square_of(bitboard: u64) -> Square {
    Square::from_bit_index(bitboard.trailing_zeros() as u8)
}

fn castle_squares(color: Color, side: CastlingMove) -> (Square, Square) {
    use crate::pieces::static_positions as sp;

    let king_final = match (color, side) {
        (Color::White, CastlingMove::Short) => sp::WHITE_KING_SHORT_FINAL,
        (Color::White, CastlingMove::Long) => sp::WHITE_KING_LONG_FINAL,
        (Color::Black, CastlingMove::Short) => sp::BLACK_KING_SHORT_FINAL,
        (Color::Black, CastlingMove::Long) => sp::BLACK_KING_LONG_FINAL,
    };
    let king_initial = match color {
        Color::White => sp::WHITE_KING,
        Color::Black => sp::BLACK_KING,
    };
    (square_of(king_initial), square_of(king_final))
}

fn is_en_passant(piece: Piece, target_square: u64, pre_move_board: &Board, mover: Color) -> bool {
    if piece != Piece::Pawn {
        return false;
    }
    let (_, opponent_board) = get_half_turn_boards(pre_move_board, mover);
    opponent_board.en_passant & target_square != 0
}

fn context_to_legal_move(ctx: &MoveEvaluationContext, pre_move_board: &Board) -> LegalMove {
    match ctx.player_move {
        PlayerMove::Normal(normal_move) => {
            let (source, target) = normal_move.squares();
            let en_passant = is_en_passant(ctx.piece, target, pre_move_board, ctx.color);
            LegalMove {
                source: square_of(source),
                target: square_of(target),
                piece: ctx.piece,
                capture: ctx.captured_piece.is_some() || en_passant,
                en_passant,
                promotion: None,
                kingside_castle: false,
                queenside_castle: false,
            }
        }
        PlayerMove::Promotion(promotion_move) => {
            let (source, target) = promotion_move.squares();
            LegalMove {
                source: square_of(source),
                target: square_of(target),
                piece: Piece::Pawn,
                capture: ctx.captured_piece.is_some(),
                en_passant: false,
                promotion: Some(promotion_move.promotion_piece()),
                kingside_castle: false,
                queenside_castle: false,
            }
        }
        PlayerMove::Castling(side) => {
            let (source, target) = castle_squares(ctx.color, side);
            LegalMove {
                source,
                target,
                piece: Piece::King,
                capture: false,
                en_passant: false,
                promotion: None,
                kingside_castle: side == CastlingMove::Short,
                queenside_castle: side == CastlingMove::Long,
            }
        }
    }
}

/// Concrete [`ChessAdapter`] backed by the bitboard [`Engine`].
#[derive(Debug, Clone)]
pub struct EngineAdapter {
    engine: Engine,
}

impl EngineAdapter {
    /// Finds the generated move matching `mv`'s source/target/promotion and
    /// returns the engine state it produces.
    fn find_matching_context(&self, mv: &LegalMove) -> Option<MoveEvaluationContext> {
        let pre_move_board = self.engine.get_board().clone();
        let contexts = self.engine.generate_moves_with_engine_state().ok()?;
        contexts.into_iter().find(|ctx| {
            let candidate = context_to_legal_move(ctx, &pre_move_board);
            candidate.source == mv.source
                && candidate.target == mv.target
                && candidate.promotion == mv.promotion
                && candidate.kingside_castle == mv.kingside_castle
                && candidate.queenside_castle == mv.queenside_castle
        })
    }
}

impl ChessAdapter for EngineAdapter {
    fn new() -> Self {
        EngineAdapter {
            engine: Engine::new(),
        }
    }

    fn from_position(fen: &str) -> Result<Self, AdapterError> {
        Engine::from_fen(fen)
            .map(|engine| EngineAdapter { engine })
            .map_err(AdapterError::InvalidFen)
    }

    fn side_to_move(&self) -> Color {
        get_color(self.engine.white_to_play())
    }

    fn legal_moves(&self) -> Vec<LegalMove> {
        let pre_move_board = self.engine.get_board().clone();
        self.engine
            .generate_moves_with_engine_state()
            .unwrap_or_default()
            .iter()
            .map(|ctx| context_to_legal_move(ctx, &pre_move_board))
            .collect()
    }

    fn apply_move(&self, mv: &LegalMove) -> Result<Self, AdapterError> {
        self.find_matching_context(mv)
            .map(|ctx| EngineAdapter { engine: ctx.engine })
            .ok_or_else(|| AdapterError::IllegalMove(format!("{:?} -> {:?}", mv.source, mv.target)))
    }

    fn in_check(&self) -> bool {
        self.engine.is_current_king_checked()
    }

    fn is_checkmate(&self) -> bool {
        self.engine.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.engine.is_stalemate()
    }

    fn is_threefold_repetition(&self) -> bool {
        self.engine.is_threefold_repetition()
    }

    fn is_draw(&self) -> bool {
        self.engine.is_draw()
    }

    fn is_game_over(&self) -> bool {
        self.engine.is_game_over()
    }

    fn last_move(&self) -> Option<LegalMove> {
        let (player_move, pre_move_board) = self.engine.last_move()?;
        let mover = self.side_to_move().opposite();
        let synthetic_piece = match player_move {
            PlayerMove::Promotion(_) => Piece::Pawn,
            PlayerMove::Castling(_) => Piece::King,
            PlayerMove::Normal(normal_move) => {
                let (source, _) = normal_move.squares();
                let (player_board, _) = get_half_turn_boards(pre_move_board, mover);
                get_piece_type(player_board, source).unwrap_or(Piece::Pawn)
            }
        };
        let ctx = MoveEvaluationContext {
            engine: self.engine.clone(),
            player_move: *player_move,
            piece: synthetic_piece,
            color: mover,
            result: crate::game_engine::move_results::CorrectMoveResults::Ok,
            captured_piece: self.captured_piece_kind_from(pre_move_board, player_move, mover),
        };
        Some(context_to_legal_move(&ctx, pre_move_board))
    }

    fn captured_piece_kind(&self, square: Square) -> Option<Piece> {
        let (player_move, pre_move_board) = self.engine.last_move()?;
        let mover = self.side_to_move().opposite();
        let target = match player_move {
            PlayerMove::Normal(m) => m.squares().1,
            PlayerMove::Promotion(m) => m.squares().1,
            PlayerMove::Castling(_) => return None,
        };
        if square_of(target) != square {
            return None;
        }
        self.captured_piece_kind_from(pre_move_board, player_move, mover)
    }

    fn piece_at(&self, square: Square) -> Option<(Color, Piece)> {
        let bit = 1u64 << square.index();
        let board = self.engine.get_board();
        if let Some(piece) = get_piece_type(&board.white, bit) {
            return Some((Color::White, piece));
        }
        get_piece_type(&board.black, bit).map(|piece| (Color::Black, piece))
    }
}

impl EngineAdapter {
    fn captured_piece_kind_from(
        &self,
        pre_move_board: &Board,
        player_move: &PlayerMove,
        mover: Color,
    ) -> Option<Piece> {
        let (target, piece) = match player_move {
            PlayerMove::Normal(m) => {
                let (source, target) = m.squares();
                let (player_board, _) = get_half_turn_boards(pre_move_board, mover);
                (target, get_piece_type(player_board, source).unwrap_or(Piece::Pawn))
            }
            PlayerMove::Promotion(m) => (m.squares().1, Piece::Pawn),
            PlayerMove::Castling(_) => return None,
        };

        let (_, opponent_board) = get_half_turn_boards(pre_move_board, mover);
        if is_en_passant(piece, target, pre_move_board, mover) {
            return Some(Piece::Pawn);
        }
        get_piece_type(opponent_board, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_position_has_twenty_legal_moves() {
        let adapter = EngineAdapter::new();
        assert_eq!(adapter.legal_moves().len(), 20);
        assert_eq!(adapter.side_to_move(), Color::White);
        assert!(!adapter.is_game_over());
    }

    #[test]
    fn applying_a_pawn_push_flips_side_to_move() {
        let adapter = EngineAdapter::new();
        let e2e4 = adapter
            .legal_moves()
            .into_iter()
            .find(|m| m.source.to_algebraic() == "e2" && m.target.to_algebraic() == "e4")
            .expect("e2e4 should be a legal opening move");

        let next = adapter.apply_move(&e2e4).unwrap();
        assert_eq!(next.side_to_move(), Color::Black);
        assert_eq!(next.last_move().unwrap().target.to_algebraic(), "e4");
    }

    #[test]
    fn piece_at_reports_initial_back_rank() {
        let adapter = EngineAdapter::new();
        assert_eq!(
            adapter.piece_at(Square::from_algebraic("e1").unwrap()),
            Some((Color::White, Piece::King))
        );
        assert_eq!(
            adapter.piece_at(Square::from_algebraic("e8").unwrap()),
            Some((Color::Black, Piece::King))
        );
        assert_eq!(adapter.piece_at(Square::from_algebraic("e4").unwrap()), None);
    }

    #[test]
    fn repeating_a_knight_shuffle_twice_forces_a_threefold_draw() {
        let mut adapter = EngineAdapter::new();
        let shuffle = [("b1", "c3"), ("b8", "c6"), ("c3", "b1"), ("c6", "b8")];
        for _ in 0..2 {
            for (from, to) in shuffle {
                let mv = adapter
                    .legal_moves()
                    .into_iter()
                    .find(|m| m.source.to_algebraic() == from && m.target.to_algebraic() == to)
                    .unwrap_or_else(|| panic!("{from}{to} should be legal"));
                adapter = adapter.apply_move(&mv).unwrap();
            }
        }
        assert!(adapter.is_threefold_repetition());
        assert!(adapter.is_draw());
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut adapter = EngineAdapter::new();
        let moves = [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")];
        for (from, to) in moves {
            let mv = adapter
                .legal_moves()
                .into_iter()
                .find(|m| m.source.to_algebraic() == from && m.target.to_algebraic() == to)
                .unwrap_or_else(|| panic!("{from}{to} should be legal"));
            adapter = adapter.apply_move(&mv).unwrap();
        }
        assert!(adapter.is_checkmate());
        assert!(adapter.is_game_over());
    }
}
