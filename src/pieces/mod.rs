pub mod color;
pub mod moves;
pub mod piece;
pub mod static_positions;

pub use {
    color::Color,
    piece::{Piece, ALL_PIECES},
};
