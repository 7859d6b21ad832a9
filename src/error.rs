//! Error taxonomy for the evolutionary engine, per the structural / numeric /
//! move-selection / deadline / external split.

use thiserror::Error;

/// Errors raised by the chess rules adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("invalid FEN string: {0}")]
    InvalidFen(String),
    #[error("illegal move: {0}")]
    IllegalMove(String),
}

/// Errors surfaced by the evolutionary core. The game runner always converts
/// these into a terminal fitness vector rather than propagating them to the
/// tournament loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Programmer error: unknown/disallowed variable id, or a `write` outside
    /// the dynamic memory range.
    #[error("structural fault: {0}")]
    Structural(String),

    /// An arithmetic operation hit a documented edge case (div/mod by zero
    /// are policy, not faults, so this variant is reserved for anything that
    /// would otherwise overflow a 32-bit result).
    #[error("numeric fault: {0}")]
    Numeric(String),

    /// No legal move was found, or recursive search returned no candidate.
    #[error("move selection failed: {0}")]
    MoveSelectionFailure(String),

    /// The per-turn wall-clock budget elapsed.
    #[error("turn deadline exceeded")]
    Deadline,

    /// The chess adapter raised an error during a game; wrapped as structural
    /// per the propagation policy.
    #[error("external adapter fault: {0}")]
    External(#[from] AdapterError),
}
