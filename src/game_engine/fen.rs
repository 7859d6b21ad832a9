//! Forsyth-Edwards Notation encode/decode for [`super::engine::Engine`].

use super::utility::get_piece_type;
use crate::boards::{Board, CastlingRights, ColorBoard};
use crate::pieces::Piece;

fn piece_char(piece: Piece, white: bool) -> char {
    let c = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    if white {
        c.to_ascii_uppercase()
    } else {
        c
    }
}

fn char_to_piece(c: char) -> Option<Piece> {
    match c.to_ascii_lowercase() {
        'p' => Some(Piece::Pawn),
        'n' => Some(Piece::Knight),
        'b' => Some(Piece::Bishop),
        'r' => Some(Piece::Rook),
        'q' => Some(Piece::Queen),
        'k' => Some(Piece::King),
        _ => None,
    }
}

fn square_to_algebraic(index: u32) -> String {
    let file = (index % 8) as u8;
    let rank = (index / 8) as u8;
    format!("{}{}", (b'a' + file) as char, (b'1' + rank) as char)
}

fn algebraic_to_square(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0].checked_sub(b'a')?;
    let rank = bytes[1].checked_sub(b'1')?;
    if file > 7 || rank > 7 {
        return None;
    }
    Some(1u64 << (rank as u32 * 8 + file as u32))
}

/// Serializes the piece-placement field (the first space-delimited field of a FEN string).
pub fn fen_board_position(board: &Board) -> String {
    let mut ranks = Vec::with_capacity(8);

    for rank in (0..8).rev() {
        let mut rank_str = String::new();
        let mut empty_run = 0u8;

        for file in 0..8 {
            let square = 1u64 << (rank * 8 + file);
            let found = get_piece_type(&board.white, square)
                .map(|p| (p, true))
                .or_else(|| get_piece_type(&board.black, square).map(|p| (p, false)));

            match found {
                Some((piece, white)) => {
                    if empty_run > 0 {
                        rank_str.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    rank_str.push(piece_char(piece, white));
                }
                None => empty_run += 1,
            }
        }

        if empty_run > 0 {
            rank_str.push_str(&empty_run.to_string());
        }
        ranks.push(rank_str);
    }

    ranks.join("/")
}

/// Serializes the castling-availability field.
pub fn fen_castling(board: &Board) -> String {
    let mut s = String::new();
    if board.white.castling_rights.is_short_castling_available() {
        s.push('K');
    }
    if board.white.castling_rights.is_long_castling_available() {
        s.push('Q');
    }
    if board.black.castling_rights.is_short_castling_available() {
        s.push('k');
    }
    if board.black.castling_rights.is_long_castling_available() {
        s.push('q');
    }
    if s.is_empty() {
        s.push('-');
    }
    s
}

/// Serializes the en-passant target square field.
pub fn fen_en_passant(board: &Board) -> String {
    if board.white.en_passant != 0 {
        square_to_algebraic(board.white.en_passant.trailing_zeros())
    } else if board.black.en_passant != 0 {
        square_to_algebraic(board.black.en_passant.trailing_zeros())
    } else {
        "-".to_string()
    }
}

/// Parses a full board from a FEN piece-placement field.
pub fn parse_board_position(field: &str) -> Result<Board, String> {
    let mut board = Board::new();
    board.white = ColorBoard {
        pawn: 0,
        knight: 0,
        bishop: 0,
        rook: 0,
        queen: 0,
        king: 0,
        castling_rights: CastlingRights::new_with_rules(false, false),
        en_passant: 0,
    };
    board.black = ColorBoard {
        pawn: 0,
        knight: 0,
        bishop: 0,
        rook: 0,
        queen: 0,
        king: 0,
        castling_rights: CastlingRights::new_with_rules(false, false),
        en_passant: 0,
    };

    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(format!("expected 8 ranks, found {}", ranks.len()));
    }

    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_from_top as u32;
        let mut file = 0u32;

        for c in rank_str.chars() {
            if file > 7 {
                return Err(format!("rank '{}' overflows the board", rank_str));
            }
            if let Some(skip) = c.to_digit(10) {
                file += skip;
                continue;
            }
            let piece = char_to_piece(c).ok_or_else(|| format!("invalid piece char '{}'", c))?;
            let square = 1u64 << (rank * 8 + file);
            let color_board = if c.is_ascii_uppercase() {
                &mut board.white
            } else {
                &mut board.black
            };
            color_board.set_bitboard_by_type(
                piece,
                color_board.get_bitboard_by_type(piece) | square,
            );
            file += 1;
        }
    }

    Ok(board)
}

/// Applies the castling-availability field onto an already-parsed board.
pub fn apply_castling_field(board: &mut Board, field: &str) -> Result<(), String> {
    if field == "-" {
        board.white.castling_rights = CastlingRights::new_with_rules(false, false);
        board.black.castling_rights = CastlingRights::new_with_rules(false, false);
        return Ok(());
    }

    let mut white_short = false;
    let mut white_long = false;
    let mut black_short = false;
    let mut black_long = false;

    for c in field.chars() {
        match c {
            'K' => white_short = true,
            'Q' => white_long = true,
            'k' => black_short = true,
            'q' => black_long = true,
            _ => return Err(format!("invalid castling char '{}'", c)),
        }
    }

    board.white.castling_rights = CastlingRights::new_with_rules(white_short, white_long);
    board.black.castling_rights = CastlingRights::new_with_rules(black_short, black_long);
    Ok(())
}

/// Applies the en-passant target-square field onto an already-parsed board.
///
/// The target square belongs to whichever side just moved a pawn two squares,
/// i.e. the side *not* to move.
pub fn apply_en_passant_field(board: &mut Board, field: &str, white_to_move: bool) -> Result<(), String> {
    if field == "-" {
        return Ok(());
    }
    let square = algebraic_to_square(field).ok_or_else(|| format!("invalid en passant square '{}'", field))?;
    if white_to_move {
        board.black.en_passant = square;
    } else {
        board.white.en_passant = square;
    }
    Ok(())
}
