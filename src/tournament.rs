//! Runs repeated rounds of paired games over a population, selects a single
//! top survivor each round, and repopulates from it via the mutator.

use std::collections::HashMap;

use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::agent::Agent;
use crate::chess_adapter::ChessAdapter;
use crate::config::TournamentConfig;
use crate::game_runner::{self, GameRecord};
use crate::mutator;

/// One agent's total fitness for a round, descending by score with ties
/// broken by the most recently created agent (higher id).
pub type Standings = Vec<(u64, i64)>;

fn score_standings(population: &[Agent], records: &[GameRecord]) -> Standings {
    let mut totals: HashMap<u64, i64> = population.iter().map(|a| (a.id, 0)).collect();
    for record in records {
        for (&id, &delta) in &record.scores {
            *totals.entry(id).or_insert(0) += delta;
        }
    }
    let mut standings: Standings = totals.into_iter().collect();
    standings.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
    standings
}

/// Shuffles `population` into disjoint pairs and plays each pair's game
/// concurrently.
fn play_round<A: ChessAdapter + Send + Sync>(population: &[Agent], config: &TournamentConfig, rng: &mut impl Rng) -> Vec<GameRecord> {
    debug_assert_eq!(population.len() % 2, 0, "population size must stay even");

    let mut order: Vec<usize> = (0..population.len()).collect();
    order.shuffle(rng);

    let pairs: Vec<(Agent, Agent)> = order
        .chunks_exact(2)
        .map(|pair| (population[pair[0]].clone(), population[pair[1]].clone()))
        .collect();

    pairs
        .par_iter()
        .map(|(white, black)| game_runner::play_game::<A>(white.clone(), black.clone(), config))
        .collect()
}

/// Plays one full round, selects the top survivor, and repopulates from it.
/// Returns the new population (same size as `population`) and the round's
/// standings.
pub fn run_round<A: ChessAdapter + Send + Sync>(
    population: &[Agent],
    config: &TournamentConfig,
    rng: &mut impl Rng,
) -> (Vec<Agent>, Standings) {
    let records = play_round::<A>(population, config, rng);
    let standings = score_standings(population, &records);

    let by_id: HashMap<u64, &Agent> = population.iter().map(|a| (a.id, a)).collect();
    let (survivor_id, survivor_score) = standings[0];
    let survivor = by_id[&survivor_id];
    info!(
        "round complete: survivor {survivor_id} (generation {}) scored {survivor_score}",
        survivor.generation
    );

    let next_generation = survivor.generation + 1;
    let mut next_population = mutator::produce_offspring(
        survivor,
        config.population_size,
        next_generation,
        rng,
        &config.mutation,
    );

    if config.migration_count > 0 && !next_population.is_empty() {
        let migrants = config.migration_count.min(next_population.len());
        let tail_start = next_population.len() - migrants;
        for slot in &mut next_population[tail_start..] {
            *slot = Agent::random(rng, next_generation);
        }
        info!("migrated {migrants} fresh agent(s) into generation {next_generation}");
    }

    (next_population, standings)
}

/// Runs `rounds` consecutive rounds starting from `initial`, returning the
/// final population and each round's standings in order.
pub fn run_tournament<A: ChessAdapter + Send + Sync>(
    initial: Vec<Agent>,
    rounds: u32,
    config: &TournamentConfig,
    rng: &mut impl Rng,
) -> (Vec<Agent>, Vec<Standings>) {
    let mut population = initial;
    let mut history = Vec::with_capacity(rounds as usize);

    for round in 0..rounds {
        info!("starting round {round} with population {}", population.len());
        let (next_population, standings) = run_round::<A>(&population, config, rng);
        history.push(standings);
        population = next_population;
    }

    (population, history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_adapter::EngineAdapter;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_population(size: usize, rng: &mut impl Rng) -> Vec<Agent> {
        (0..size).map(|_| Agent::random(rng, 0)).collect()
    }

    #[test]
    fn a_round_preserves_population_size() {
        let mut rng = StdRng::seed_from_u64(200);
        let population = small_population(4, &mut rng);
        let config = TournamentConfig {
            turn_budget_ms: 2000,
            population_size: 4,
            ..TournamentConfig::default()
        };

        let (next_population, standings) = run_round::<EngineAdapter>(&population, &config, &mut rng);
        assert_eq!(next_population.len(), 4);
        assert_eq!(standings.len(), 4);
    }

    #[test]
    fn every_survivor_offspring_shares_the_survivors_next_generation() {
        let mut rng = StdRng::seed_from_u64(201);
        let population = small_population(4, &mut rng);
        let config = TournamentConfig {
            turn_budget_ms: 2000,
            population_size: 4,
            ..TournamentConfig::default()
        };

        let (next_population, _standings) = run_round::<EngineAdapter>(&population, &config, &mut rng);
        let expected_generation = next_population[0].generation;
        for agent in &next_population {
            assert_eq!(agent.generation, expected_generation);
        }
    }

    #[test]
    fn migration_replaces_the_tail_of_the_next_population() {
        let mut rng = StdRng::seed_from_u64(202);
        let population = small_population(6, &mut rng);
        let config = TournamentConfig {
            turn_budget_ms: 2000,
            population_size: 6,
            migration_count: 2,
            ..TournamentConfig::default()
        };

        let (next_population, _standings) = run_round::<EngineAdapter>(&population, &config, &mut rng);
        assert_eq!(next_population.len(), 6);
        let parent_ids: Vec<u64> = population.iter().map(|a| a.id).collect();
        for migrant in &next_population[4..] {
            assert!(migrant.lineage.is_empty());
            assert!(!parent_ids.contains(&migrant.id));
        }
    }

    #[test]
    fn a_multi_round_tournament_keeps_a_stable_population_size() {
        let mut rng = StdRng::seed_from_u64(203);
        let population = small_population(4, &mut rng);
        let config = TournamentConfig {
            turn_budget_ms: 1500,
            population_size: 4,
            ..TournamentConfig::default()
        };

        let (final_population, history) = run_tournament::<EngineAdapter>(population, 3, &config, &mut rng);
        assert_eq!(final_population.len(), 4);
        assert_eq!(history.len(), 3);
    }
}
