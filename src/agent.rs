//! An evolvable agent: two expression trees plus a memory bank. Each agent
//! exclusively owns its trees and memory; mutation always produces an
//! independent copy, never an in-place edit of the parent.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

use crate::memory::MemoryBank;
use crate::program::{generator, Algorithm, ProgramKind};

static NEXT_AGENT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a fresh, process-unique agent identity.
pub fn fresh_id() -> u64 {
    NEXT_AGENT_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: u64,
    pub board_alg: Algorithm,
    pub move_alg: Algorithm,
    pub memory: MemoryBank,
    /// Observability only: never read by the interpreter or game runner.
    pub generation: u32,
    pub lineage: Vec<u64>,
}

impl Agent {
    pub fn fresh(id: u64, board_alg: Algorithm, move_alg: Algorithm, memory: MemoryBank) -> Self {
        debug_assert_eq!(board_alg.kind, ProgramKind::Board);
        debug_assert_eq!(move_alg.kind, ProgramKind::Movement);
        Agent {
            id,
            board_alg,
            move_alg,
            memory,
            generation: 0,
            lineage: Vec::new(),
        }
    }

    /// A brand-new agent with randomly synthesized trees and static memory;
    /// dynamic memory starts zeroed.
    pub fn random(rng: &mut impl Rng, generation: u32) -> Self {
        Agent {
            id: fresh_id(),
            board_alg: generator::generate_algorithm(rng, ProgramKind::Board),
            move_alg: generator::generate_algorithm(rng, ProgramKind::Movement),
            memory: MemoryBank::random_static(rng),
            generation,
            lineage: Vec::new(),
        }
    }

    /// Resets dynamic memory to zero; called before any game the agent
    /// plays, and on every child produced by the mutator.
    pub fn reset_dynamic_memory(&mut self) {
        self.memory.reset_dynamic();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fresh_ids_are_unique() {
        let a = fresh_id();
        let b = fresh_id();
        assert_ne!(a, b);
    }

    #[test]
    fn random_agent_has_zeroed_dynamic_memory() {
        let mut rng = StdRng::seed_from_u64(5);
        let agent = Agent::random(&mut rng, 0);
        for i in crate::memory::STATIC_CELLS..crate::memory::TOTAL_CELLS {
            assert_eq!(agent.memory.get(i), 0);
        }
    }
}
