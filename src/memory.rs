//! An agent's memory bank: `S` evolvable static cells followed by `D`
//! runtime-scratch dynamic cells, each an integer in `[-99, +99]`.

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const STATIC_CELLS: usize = 36;
pub const DYNAMIC_CELLS: usize = 24;
pub const TOTAL_CELLS: usize = STATIC_CELLS + DYNAMIC_CELLS;

pub const MEMORY_MIN: i32 = -99;
pub const MEMORY_MAX: i32 = 99;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBank {
    values: [i32; TOTAL_CELLS],
}

impl MemoryBank {
    pub fn zeroed() -> Self {
        MemoryBank {
            values: [0; TOTAL_CELLS],
        }
    }

    /// Random static cells, dynamic cells zeroed — used for a freshly
    /// created agent.
    pub fn random_static(rng: &mut impl Rng) -> Self {
        let mut bank = MemoryBank::zeroed();
        for cell in &mut bank.values[..STATIC_CELLS] {
            *cell = rng.gen_range(MEMORY_MIN..=MEMORY_MAX);
        }
        bank
    }

    pub fn get(&self, index: usize) -> i32 {
        self.values[index]
    }

    pub fn set(&mut self, index: usize, value: i32) {
        self.values[index] = value;
    }

    pub fn is_static(index: usize) -> bool {
        index < STATIC_CELLS
    }

    pub fn is_dynamic(index: usize) -> bool {
        (STATIC_CELLS..TOTAL_CELLS).contains(&index)
    }

    /// Zeroes the `[S, S+D)` range; static cells are untouched.
    pub fn reset_dynamic(&mut self) {
        for cell in &mut self.values[STATIC_CELLS..] {
            *cell = 0;
        }
    }

    /// A copy with dynamic cells zeroed — the canonical form used for the
    /// offspring content hash and for child 0's fresh memory.
    pub fn with_dynamic_zeroed(&self) -> Self {
        let mut copy = self.clone();
        copy.reset_dynamic();
        copy
    }

    pub fn static_values(&self) -> &[i32] {
        &self.values[..STATIC_CELLS]
    }

    pub fn static_values_mut(&mut self) -> &mut [i32] {
        &mut self.values[..STATIC_CELLS]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_static_leaves_dynamic_cells_at_zero() {
        let mut rng = StdRng::seed_from_u64(11);
        let bank = MemoryBank::random_static(&mut rng);
        for i in STATIC_CELLS..TOTAL_CELLS {
            assert_eq!(bank.get(i), 0);
        }
    }

    #[test]
    fn random_static_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(12);
        let bank = MemoryBank::random_static(&mut rng);
        for &v in bank.static_values() {
            assert!((MEMORY_MIN..=MEMORY_MAX).contains(&v));
        }
    }

    #[test]
    fn with_dynamic_zeroed_preserves_static_cells() {
        let mut bank = MemoryBank::zeroed();
        bank.set(0, 42);
        bank.set(STATIC_CELLS, 7);
        let cleared = bank.with_dynamic_zeroed();
        assert_eq!(cleared.get(0), 42);
        assert_eq!(cleared.get(STATIC_CELLS), 0);
    }

    #[test]
    fn static_and_dynamic_ranges_partition_all_cells() {
        for i in 0..TOTAL_CELLS {
            assert_ne!(MemoryBank::is_static(i), MemoryBank::is_dynamic(i));
        }
    }
}
