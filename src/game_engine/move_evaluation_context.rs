use super::engine::Engine;
use super::move_results::CorrectMoveResults;
use super::player_move::PlayerMove;
use crate::pieces::{Color, Piece};

/// One fully-applied candidate move, bundled with the resulting engine state.
///
/// Produced by [`Engine::generate_moves_with_engine_state`]: every element
/// here is already legal (the king-safety check has run), so callers can
/// score or pick among these without re-validating anything.
#[derive(Clone)]
pub struct MoveEvaluationContext {
    pub engine: Engine,
    pub player_move: PlayerMove,
    pub piece: Piece,
    pub color: Color,
    pub result: CorrectMoveResults,
    pub captured_piece: Option<Piece>,
}
