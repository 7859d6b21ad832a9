//! Demo entry point: runs a handful of tournament rounds over a small,
//! randomly initialized population and prints each round's standings.
//! No CLI/env-var configuration surface is in scope — tune the constants
//! below or construct a `TournamentConfig` programmatically.

use chess_evolve::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const ROUNDS: u32 = 5;

fn main() {
    env_logger::init();

    let mut rng = StdRng::from_entropy();
    let config = TournamentConfig {
        population_size: 16,
        ..TournamentConfig::default()
    };
    let population: Vec<Agent> = (0..config.population_size).map(|_| Agent::random(&mut rng, 0)).collect();

    log::info!(
        "starting a {ROUNDS}-round tournament over a population of {}",
        config.population_size
    );
    let (_final_population, history) = run_tournament::<EngineAdapter>(population, ROUNDS, &config, &mut rng);

    for (round, standings) in history.iter().enumerate() {
        let (top_id, top_score) = standings[0];
        println!("round {round}: survivor {top_id} scored {top_score}");
    }
}
