//! Tournament and mutation configuration. No CLI/env-var surface is in
//! scope; config is constructed programmatically or deserialized from
//! `serde`, the way the adapter's own tree search is configured through a
//! builder rather than free-standing constants.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::memory::{DYNAMIC_CELLS, STATIC_CELLS};
use crate::mutator::{MAX_MUT, MIN_MUT};

/// Population-, deadline-, and search-level knobs for a tournament.
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct TournamentConfig {
    /// Always even: the unchanged survivor plus `population_size - 1` offspring.
    #[builder(default = "32")]
    pub population_size: usize,

    /// Per-turn wall-clock budget in milliseconds (`T_turn`).
    #[builder(default = "1000")]
    pub turn_budget_ms: u64,

    /// `MAX_SEARCH_DEPTH`: recursion cap for the movement program's
    /// request-deeper-search protocol.
    #[builder(default = "30")]
    pub max_search_depth: i64,

    /// Number of agents replaced by migration at the tail of the
    /// population, each tournament; `0` disables migration.
    #[builder(default = "0")]
    pub migration_count: usize,

    #[builder(default)]
    pub mutation: MutationConfig,
}

impl TournamentConfigBuilder {
    pub fn build_or_default(&self) -> TournamentConfig {
        self.build().unwrap_or_else(|_| TournamentConfig::default())
    }
}

impl Default for TournamentConfig {
    fn default() -> Self {
        TournamentConfig {
            population_size: 32,
            turn_budget_ms: 1000,
            max_search_depth: 30,
            migration_count: 0,
            mutation: MutationConfig::default(),
        }
    }
}

/// Bounds for the mutator's random edits. Memory sizing is exposed here too
/// since both are evolutionary parameters, even though the cell counts
/// themselves are fixed by the data model (`S = 36`, `D = 24`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct MutationConfig {
    #[builder(default = "MIN_MUT")]
    pub min_edits: usize,
    #[builder(default = "MAX_MUT")]
    pub max_edits: usize,
    #[builder(default = "STATIC_CELLS")]
    pub static_cells: usize,
    #[builder(default = "DYNAMIC_CELLS")]
    pub dynamic_cells: usize,
}

impl Default for MutationConfig {
    fn default() -> Self {
        MutationConfig {
            min_edits: MIN_MUT,
            max_edits: MAX_MUT,
            static_cells: STATIC_CELLS,
            dynamic_cells: DYNAMIC_CELLS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_the_data_model_constants() {
        let config = TournamentConfig::default();
        assert_eq!(config.mutation.static_cells, STATIC_CELLS);
        assert_eq!(config.mutation.dynamic_cells, DYNAMIC_CELLS);
        assert_eq!(config.max_search_depth, 30);
    }

    #[test]
    fn builder_overrides_population_size() {
        let config = TournamentConfigBuilder::default()
            .population_size(16usize)
            .build()
            .unwrap();
        assert_eq!(config.population_size, 16);
        assert_eq!(config.turn_budget_ms, 1000);
    }
}
