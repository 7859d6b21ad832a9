pub mod agent;
pub mod boards;
pub mod chess_adapter;
pub mod config;
pub mod error;
pub mod game_engine;
pub mod game_runner;
pub mod memory;
pub mod mutator;
pub mod pieces;
pub mod program;
pub mod square;
pub mod tournament;
pub mod turn_context;

pub mod prelude {
    // Chess rules, pinned behind the adapter trait.
    pub use crate::chess_adapter::{ChessAdapter, EngineAdapter, LegalMove};
    pub use crate::pieces::{Color, Piece};
    pub use crate::square::Square;

    // Evolutionary core.
    pub use crate::agent::Agent;
    pub use crate::config::{MutationConfig, TournamentConfig};
    pub use crate::error::{AdapterError, GameError};
    pub use crate::memory::MemoryBank;
    pub use crate::mutator;
    pub use crate::program::{Algorithm, FunctionKind, Node, ProgramKind, ProvidedVar, VariableId};

    // Running games and tournaments.
    pub use crate::game_runner::{play_game, GameEndReason, GameRecord};
    pub use crate::tournament::{run_round, run_tournament, Standings};
}