use super::fen::{
    apply_castling_field, apply_en_passant_field, fen_board_position, fen_castling,
    fen_en_passant, parse_board_position,
};
use super::move_evaluation_context::MoveEvaluationContext;
use super::move_piece_output::PieceMoveOutput;
use super::move_results::{CorrectMoveResults, IncorrectMoveResults, MoveResult};
use super::player_move::{CastlingMove, NormalMove, PlayerMove, PromotionMove};
use super::utility::{get_color, get_final_castling_positions, get_half_turn_boards};
use super::utility::{get_en_passant_ranks, get_half_turn_boards_mut};
use super::utility::{get_initial_castling_positions, get_piece_type, get_possible_move};
use super::utility::{get_promotion_rank_by_color, get_required_empty_squares, is_king_checked};
use super::utility::{is_promotion_available, iter_into_u64, move_piece};

use crate::boards::zobrist_hash::HASHER;
use crate::boards::Board;
use crate::pieces::piece::PROMOTE_PIECE;
use crate::pieces::Color;
use crate::pieces::Piece;

/// Represents a chess engine that manages game state and move validation.
///
/// The engine handles:
/// - Game state (board position, turn, move counters)
/// - Move validation and execution
/// - Special moves (castling, promotion)
/// - Move generation and validation
/// - Position history for threefold-repetition detection
#[derive(Debug, Clone)]
pub struct Engine {
    // rules
    board: Board,
    white_turn: bool,
    halfmove_clock: u32,
    current_king_checked: bool,
    /// Zobrist hash of the position after each move played so far.
    history: Vec<u64>,
    /// The last move played and the board as it stood immediately before it.
    last_move: Option<(PlayerMove, Board)>,
}

impl Engine {
    /// Creates a new chess engine with the standard starting position.
    pub fn new() -> Self {
        Engine {
            board: Board::new(),
            white_turn: true,
            halfmove_clock: 0,
            current_king_checked: false,
            history: Vec::new(),
            last_move: None,
        }
    }

    /// Creates a copy of the current engine with an other board
    pub fn clone_with_new_board(&self, board: Board) -> Self {
        Engine {
            board,
            white_turn: self.white_turn,
            halfmove_clock: self.halfmove_clock,
            current_king_checked: self.current_king_checked,
            history: self.history.clone(),
            last_move: self.last_move.clone(),
        }
    }

    /// Return true if it is white to play
    pub fn white_to_play(&self) -> bool {
        self.white_turn
    }

    /// Executes a chess move, handling both normal moves and castling and promotion.
    ///
    /// # Arguments
    /// * `chess_move` - The move to execute, either normal move or castling
    ///
    /// # Returns
    /// * `Ok(CorrectMoveResults)` - Move executed successfully
    /// * `Err(IncorrectMoveResults)` - Move validation failed
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * There is no piece at the current position.
    /// * The target position is not a valid move for the piece.
    /// * The move leaves the king in check.
    pub fn play(&mut self, chess_move: PlayerMove) -> MoveResult {
        let pre_move_board = self.board.clone();

        // else we can play normal
        self.board = match chess_move {
            PlayerMove::Normal(normal_move) => {
                // get squares and color
                let (current_square, target_square) = normal_move.squares();
                let new_board = self.perform_move(current_square, target_square)?;

                // here we ensure the piece moved wasn't a pawn on promotion rank
                // if it was, we return an error
                if is_promotion_available(&new_board, target_square, get_color(self.white_turn)) {
                    return Err(IncorrectMoveResults::PromotionExpected);
                }
                new_board
            }
            PlayerMove::Castling(castling_side) => {
                // perform casting
                self.perform_castling(castling_side)?
            }
            PlayerMove::Promotion(promotion_move) => {
                // get squares
                let (current_square, target_square) = promotion_move.squares();
                self.board = self.perform_move(current_square, target_square)?;
                self.promote_pawn(promotion_move.promotion_piece(), target_square)?
            }
        };

        // Finalize the turn
        Ok(self.finalize_turn(chess_move, pre_move_board))
    }

    /// Validates and simulates a move before execution.
    ///
    /// Checks if:
    /// - There is a piece at the starting square
    /// - The move is legal for the piece
    /// - The move doesn't leave the king in check
    fn perform_move(
        &self,
        current_square: u64,
        target_square: u64,
    ) -> Result<Board, IncorrectMoveResults> {
        // get player and opponent board
        let (player_board, opponent_board) =
            get_half_turn_boards(&self.board, get_color(self.white_turn));

        // Get piece type
        let piece_type = get_piece_type(player_board, current_square);

        // Ensure there is a piece at the current square
        if piece_type.is_none() {
            return Err(IncorrectMoveResults::NoPieceAtLocation);
        }

        // Get piece + color
        let piece = match piece_type {
            Some(p) => p,
            None => return Err(IncorrectMoveResults::NoPieceAtLocation),
        };
        let color = get_color(self.white_turn);

        // Get the possible moves for the piece
        let possible_moves = get_possible_move(
            piece,
            current_square,
            player_board.bitboard(),
            opponent_board.bitboard(),
            opponent_board.en_passant,
            color,
        );

        // Check if the target square is a valid move
        if target_square & possible_moves == 0 {
            return Err(IncorrectMoveResults::IllegalMove);
        }

        // Simulate the move and check if the king is in check
        let move_output = self.validate_move_safety(current_square, target_square, piece, color)?;

        Ok(move_output.board)
    }

    /// Simulate and check if the king is in check
    fn validate_move_safety(
        &self,
        current_square: u64,
        target_square: u64,
        piece: Piece,
        color: Color,
    ) -> Result<PieceMoveOutput, IncorrectMoveResults> {
        // Simulate the move
        let mut mv_piece_result = move_piece(
            self.board.clone(),
            current_square,
            target_square,
            color,
            piece,
        );

        // perform en passant squares check
        self.handle_en_passant(&mut mv_piece_result.board, current_square, target_square);

        // Get the simulated player's and opponent's boards
        let (player_board, opponent_board) =
            get_half_turn_boards(&mut mv_piece_result.board, get_color(!self.white_turn));

        // Check if the king is in check in the simulated state
        if is_king_checked(
            opponent_board.king,
            &player_board,
            &opponent_board,
            get_color(!self.white_turn),
        ) {
            return Err(IncorrectMoveResults::KingStillChecked);
        }
        Ok(mv_piece_result)
    }

    /// Finalize the turn after a move: update turn/clock/castling rights, record history.
    fn finalize_turn(&mut self, player_move: PlayerMove, pre_move_board: Board) -> CorrectMoveResults {
        // get the color
        let color = get_color(self.white_turn);

        // Update castling rights directly on the player's board
        self.update_all_castling_rights();

        // get player and opponent board
        let (_, opponent_board) = get_half_turn_boards_mut(&mut self.board, color);

        // reset the en passant squares for the opponent
        opponent_board.en_passant = 0;

        self.halfmove_clock += 1;
        self.white_turn = !self.white_turn;

        // The turn moves and we update if the current king is checked
        self.compute_king_checked();

        self.last_move = Some((player_move, pre_move_board));
        self.history.push(self.compute_board_hash());

        CorrectMoveResults::Ok
    }

    /// Updates castling rights for both players based on current board state
    fn update_all_castling_rights(&mut self) {
        let (initial_white_king, initial_white_short_rook, initial_white_long_rook) =
            get_initial_castling_positions(Color::White);
        let (initial_black_king, initial_black_short_rook, initial_black_long_rook) =
            get_initial_castling_positions(Color::Black);

        // Update white's castling rights
        self.board.white.castling_rights.update_castling_rights(
            self.board.white.king,
            self.board.white.rook,
            initial_white_king,
            initial_white_short_rook,
            initial_white_long_rook,
        );

        // Update black's castling rights
        self.board.black.castling_rights.update_castling_rights(
            self.board.black.king,
            self.board.black.rook,
            initial_black_king,
            initial_black_short_rook,
            initial_black_long_rook,
        );
    }

    /// Handles all en passant-related logic after a move.
    fn handle_en_passant(&self, board: &mut Board, current_square: u64, target_square: u64) {
        let color = get_color(self.white_turn);
        let ep_ranks = get_en_passant_ranks(color);
        let (player_board, opponent_board) = get_half_turn_boards_mut(board, color);

        if player_board.pawn & target_square == 0 {
            return;
        }

        if (ep_ranks & (current_square | target_square)).count_ones() == 2 {
            player_board.en_passant = match color {
                Color::White => target_square >> 8,
                Color::Black => target_square << 8,
            };
        } else if opponent_board.en_passant & target_square != 0 {
            let pawn_position = match color {
                Color::White => target_square >> 8,
                Color::Black => target_square << 8,
            };
            opponent_board.pawn &= !pawn_position
        }
    }

    /// Performs a castling move for the current player.
    fn perform_castling(&self, castling: CastlingMove) -> Result<Board, IncorrectMoveResults> {
        // Discard directly if current king is checked
        if self.is_current_king_checked() {
            return Err(IncorrectMoveResults::CastlingNotAllowed);
        }

        let color = get_color(self.white_turn);
        let (player_board, opponent_board) = get_half_turn_boards(&self.board, color);
        let full_bitboard = self.board.bitboard();
        let required_empty: u64 = get_required_empty_squares(castling, color);

        let (initial_king_pos, initial_short_rook_pos, initial_long_rook_pos) =
            get_initial_castling_positions(color);

        let can_castle = match castling {
            CastlingMove::Long => player_board
                .castling_rights
                .is_long_castling_possible(full_bitboard, required_empty),
            CastlingMove::Short => player_board
                .castling_rights
                .is_short_castling_possible(full_bitboard, required_empty),
        };

        if can_castle && !is_king_checked(player_board.king, player_board, opponent_board, color) {
            let (final_king_pos, final_rook_pos) = get_final_castling_positions(castling, color);

            let initial_rook_pos = match castling {
                CastlingMove::Long => initial_long_rook_pos,
                CastlingMove::Short => initial_short_rook_pos,
            };

            let board_intermediate = move_piece(
                self.board.clone(),
                initial_king_pos,
                final_king_pos,
                color,
                Piece::King,
            )
            .board;

            let simulated_board = move_piece(
                board_intermediate.clone(),
                initial_rook_pos,
                final_rook_pos,
                color,
                Piece::Rook,
            )
            .board;

            let (sim_player_board, sim_opponent_board) =
                get_half_turn_boards(&simulated_board, get_color(!self.white_turn));

            if !is_king_checked(
                sim_opponent_board.king,
                &sim_player_board,
                &sim_opponent_board,
                get_color(!self.white_turn),
            ) {
                return Ok(simulated_board);
            }
        }

        Err(IncorrectMoveResults::CastlingNotAllowed)
    }

    /// Returns all legal moves for a piece at the given square, as a destination bitboard.
    pub fn get_moves(&self, current_square: u64) -> Result<u64, String> {
        let (player_board, opponent_board) =
            get_half_turn_boards(&self.board, get_color(self.white_turn));
        let piece_type = get_piece_type(player_board, current_square);

        if piece_type.is_none() {
            return Err("No piece at this location".to_string());
        }

        let piece = match piece_type {
            Some(p) => p,
            None => return Err("No piece at this location".to_string()),
        };
        let color = get_color(self.white_turn);

        let legal_moves = get_possible_move(
            piece,
            current_square,
            player_board.bitboard(),
            opponent_board.bitboard(),
            opponent_board.en_passant,
            color,
        );

        let mut possible_moves = 0u64;
        let mut moves_to_check = legal_moves;

        while moves_to_check != 0 {
            let target_square = 1u64 << moves_to_check.trailing_zeros();

            if self
                .validate_move_safety(current_square, target_square, piece, color)
                .is_ok()
            {
                possible_moves |= target_square;
            }

            moves_to_check &= !target_square;
        }

        Ok(possible_moves)
    }

    // Utility methods
    pub fn get_board(&self) -> &Board {
        &self.board
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Returns the number of full moves in the game.
    pub fn get_fullmove_number(&self) -> u32 {
        self.halfmove_clock / 2 + 1
    }

    /// Returns the number of halfmoves since the last pawn move or capture.
    pub fn get_halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Update the `current_king_checked` flag based on the current board state
    fn compute_king_checked(&mut self) {
        let color = get_color(self.white_turn);
        let (player_board, opponent_board) = get_half_turn_boards(&self.board, color);
        self.current_king_checked =
            is_king_checked(player_board.king, &opponent_board, &player_board, color);
    }

    /// Returns `true` if the king of the current player is checked
    pub fn is_current_king_checked(&self) -> bool {
        self.current_king_checked
    }

    /// Promotes a pawn that has reached the opposite end of the board.
    fn promote_pawn(
        &self,
        piece: Piece,
        target_square: u64,
    ) -> Result<Board, IncorrectMoveResults> {
        let color = get_color(self.white_turn);
        let mut simulated_board = self.board.clone();
        let (player_board, _) = get_half_turn_boards_mut(&mut simulated_board, color);

        if is_promotion_available(&self.board, target_square, color) {
            player_board.pawn &= !target_square;
            player_board.set_bitboard_by_type(
                piece,
                player_board.get_bitboard_by_type(piece) | target_square,
            );

            Ok(simulated_board)
        } else {
            Err(IncorrectMoveResults::IllegalPromotion)
        }
    }

    /// Returns all possible moves for all pieces of the current player, not filtered for legality.
    pub fn get_all_moves_by_piece(&self) -> Vec<(Piece, PlayerMove)> {
        let color = get_color(self.white_turn);
        let (player_board, _) = get_half_turn_boards(&self.board, color);
        let pieces = player_board.individual_pieces();

        pieces
            .into_iter()
            .map(|it| {
                let unw = self
                    .get_moves(it.0)
                    .expect("Move couldn't be unwrapped, shoudln't even happen");
                (it.1, PlayerMove::Normal(NormalMove::new(it.0, unw)))
            })
            .collect::<Vec<_>>()
    }

    /// Generates all legal moves for the current player, each bundled with the resulting
    /// engine state (king safety already validated, promotion branches expanded).
    pub fn generate_moves_with_engine_state(&self) -> Result<Vec<MoveEvaluationContext>, String> {
        let color = get_color(self.white_turn);
        let (player_board, opponent_board) = get_half_turn_boards(&self.board, color);
        let pieces = player_board.individual_pieces();
        let pre_move_board = self.board.clone();

        let mut result = Vec::new();

        for (current_square, piece) in pieces.into_iter() {
            let pseudo_legal_moves = get_possible_move(
                piece,
                current_square,
                player_board.bitboard(),
                opponent_board.bitboard(),
                opponent_board.en_passant,
                color,
            );

            let promotion_rank = get_promotion_rank_by_color(color);

            for target_index in iter_into_u64(pseudo_legal_moves) {
                let target_square = 1u64 << target_index;

                match self.validate_move_safety(current_square, target_square, piece, color) {
                    Ok(piece_move_output) => {
                        let engine = self.clone_with_new_board(piece_move_output.board);

                        if piece == Piece::Pawn && target_square & promotion_rank != 0 {
                            for promotion_piece in PROMOTE_PIECE {
                                let promotion_engine = engine.clone();
                                let new_board = promotion_engine
                                    .promote_pawn(promotion_piece, target_square)
                                    .expect("promotion target already validated above");
                                let mut final_engine = engine.clone_with_new_board(new_board);
                                let player_move = PlayerMove::Promotion(PromotionMove::new(
                                    current_square,
                                    target_square,
                                    promotion_piece,
                                ));
                                let move_result =
                                    final_engine.finalize_turn(player_move, pre_move_board.clone());

                                result.push(MoveEvaluationContext {
                                    engine: final_engine,
                                    player_move,
                                    piece,
                                    color,
                                    result: move_result,
                                    captured_piece: piece_move_output.captured_piece,
                                })
                            }
                        } else {
                            let mut engine = engine;
                            let player_move =
                                PlayerMove::Normal(NormalMove::new(current_square, target_square));
                            let move_result =
                                engine.finalize_turn(player_move, pre_move_board.clone());

                            result.push(MoveEvaluationContext {
                                engine,
                                player_move,
                                piece,
                                color,
                                result: move_result,
                                captured_piece: piece_move_output.captured_piece,
                            })
                        }
                    }
                    Err(_) => { /* leaves king in check; not a legal move */ }
                }
            }
        }

        if let Ok(board) = self.perform_castling(CastlingMove::Long) {
            let mut engine = self.clone_with_new_board(board);
            let player_move = PlayerMove::Castling(CastlingMove::Long);
            let move_result = engine.finalize_turn(player_move, pre_move_board.clone());

            result.push(MoveEvaluationContext {
                engine,
                player_move,
                piece: Piece::King,
                color,
                result: move_result,
                captured_piece: None,
            })
        }

        if let Ok(board) = self.perform_castling(CastlingMove::Short) {
            let mut engine = self.clone_with_new_board(board);
            let player_move = PlayerMove::Castling(CastlingMove::Short);
            let move_result = engine.finalize_turn(player_move, pre_move_board.clone());

            result.push(MoveEvaluationContext {
                engine,
                player_move,
                piece: Piece::King,
                color,
                result: move_result,
                captured_piece: None,
            })
        }

        Ok(result)
    }

    /// `true` if the current player has at least one legal move.
    pub fn has_legal_moves(&self) -> bool {
        self.generate_moves_with_engine_state()
            .map(|moves| !moves.is_empty())
            .unwrap_or(false)
    }

    /// Checkmate: the side to move is in check and has no legal move.
    pub fn is_checkmate(&self) -> bool {
        self.current_king_checked && !self.has_legal_moves()
    }

    /// Stalemate: the side to move is not in check but has no legal move.
    pub fn is_stalemate(&self) -> bool {
        !self.current_king_checked && !self.has_legal_moves()
    }

    /// `true` if the current position has occurred three or more times in this game.
    pub fn is_threefold_repetition(&self) -> bool {
        match self.history.last() {
            Some(current) => self.history.iter().filter(|h| *h == current).count() >= 3,
            None => false,
        }
    }

    /// `true` if the game is drawn: stalemate, threefold repetition, or the 50-move rule.
    pub fn is_draw(&self) -> bool {
        self.is_stalemate() || self.is_threefold_repetition() || self.halfmove_clock >= 100
    }

    /// `true` if the game has ended, by checkmate or by any drawing condition.
    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    /// The last move played, and the board exactly as it stood before that move.
    pub fn last_move(&self) -> Option<&(PlayerMove, Board)> {
        self.last_move.as_ref()
    }

    /// Return a **fen** representation (Forsyth-Edwards Notation) of the current engine
    pub fn to_string(&self) -> String {
        let mut fen = String::new();

        fen.push_str(&fen_board_position(&self.board));

        fen.push(' ');
        fen.push(if self.white_to_play() { 'w' } else { 'b' });

        fen.push(' ');
        fen.push_str(&fen_castling(&self.board));

        fen.push(' ');
        fen.push_str(&fen_en_passant(&self.board));

        fen.push_str(&format!(
            " {} {}",
            self.halfmove_clock,
            self.get_fullmove_number()
        ));

        fen
    }

    /// Build a new Engine from a FEN string
    pub fn from_fen(fen: &str) -> Result<Engine, String> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(format!("expected 6 fields, found {}", parts.len()));
        }

        let mut board = parse_board_position(parts[0])?;

        let white_turn = match parts[1] {
            "w" => true,
            "b" => false,
            other => return Err(format!("invalid active color '{}'", other)),
        };

        apply_castling_field(&mut board, parts[2])?;
        apply_en_passant_field(&mut board, parts[3], white_turn)?;

        let halfmove_clock: u32 = parts[4]
            .parse()
            .map_err(|_| format!("invalid halfmove clock '{}'", parts[4]))?;
        let fullmove_number: u32 = parts[5]
            .parse()
            .map_err(|_| format!("invalid fullmove number '{}'", parts[5]))?;
        if fullmove_number == 0 {
            return Err("fullmove number must be at least 1".to_string());
        }

        let mut engine = Engine {
            board,
            white_turn,
            halfmove_clock,
            current_king_checked: false,
            history: Vec::new(),
            last_move: None,
        };
        engine.compute_king_checked();
        Ok(engine)
    }

    /// Computes the Zobrist hash of the current position, folding in the side to move.
    pub fn compute_board_hash(&self) -> u64 {
        HASHER.compute_hash(&self.board, self.white_to_play())
    }
}
