//! Produces mutated copies of trees and memory banks, rejects edits that
//! didn't actually change anything, and assembles a survivor's offspring.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use rand::Rng;
use serde::Serialize;

use crate::agent::{self, Agent};
use crate::config::MutationConfig;
use crate::memory::{MemoryBank, MEMORY_MAX, MEMORY_MIN, STATIC_CELLS};
use crate::program::algorithm::{Algorithm, ProgramKind};
use crate::program::generator;
use crate::program::node::Node;
use crate::program::walk::{count_nodes, walk_unordered, WalkControl};

pub const MIN_MUT: usize = 1;
pub const MAX_MUT: usize = 4;
const MAX_TREE_EDIT_ATTEMPTS: usize = 1000;
const MAX_MEMORY_EDIT_ATTEMPTS: usize = 1000;

fn canonical_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).expect("tree/memory serialization is infallible")
}

fn hash_of<T: Serialize>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    canonical_json(value).hash(&mut hasher);
    hasher.finish()
}

/// A single accepted tree edit: the path to the replaced node, and what it
/// was replaced with.
#[derive(Debug, Clone)]
pub struct TreeEdit {
    pub path: Vec<usize>,
    pub from: Node,
    pub to: Node,
}

/// A single accepted static-memory edit.
#[derive(Debug, Clone, Copy)]
pub struct MemoryEdit {
    pub index: usize,
    pub from: i32,
    pub to: i32,
}

/// Mutates `alg`'s tree: draws `N` target edits in `[min_edits, max_edits]`
/// and attempts (up to 1,000 tries each) to replace a non-root node with a
/// freshly generated subtree that actually changes the tree.
pub fn mutate_tree(alg: &Algorithm, rng: &mut impl Rng, mutation: &MutationConfig) -> (Algorithm, Vec<TreeEdit>) {
    let target_edits = rng.gen_range(mutation.min_edits..=mutation.max_edits);
    let mut current = alg.root.clone();
    let mut edits = Vec::new();

    for _ in 0..target_edits {
        for _ in 0..MAX_TREE_EDIT_ATTEMPTS {
            if let Some((candidate, edit)) = attempt_tree_edit(&current, alg.kind, rng) {
                current = candidate;
                edits.push(edit);
                break;
            }
        }
    }

    (Algorithm::new(alg.kind, current), edits)
}

/// One attempt at the tree-mutation procedure: copy, count nodes, walk
/// unordered with a replacement probability that grows from `1/total` to
/// `1.0`, and commit only if the replacement actually changed the tree.
fn attempt_tree_edit(original: &Node, kind: ProgramKind, rng: &mut impl Rng) -> Option<(Node, TreeEdit)> {
    let total_nodes = count_nodes(original);
    if total_nodes <= 1 {
        return None;
    }

    let mut candidate = original.clone();
    let mut walks_so_far = 0usize;
    let mut edit: Option<TreeEdit> = None;

    walk_unordered(&mut candidate, rng, |node, path, rng| {
        walks_so_far += 1;
        if path.is_empty() {
            return WalkControl::Continue;
        }
        let probability = walks_so_far as f64 / total_nodes as f64;
        if rng.gen::<f64>() <= probability {
            let replacement = generator::generate_node(rng, kind, generator::Parent::None, 0);
            edit = Some(TreeEdit {
                path: path.to_vec(),
                from: node.clone(),
                to: replacement.clone(),
            });
            WalkControl::Replace(replacement)
        } else {
            WalkControl::Continue
        }
    });

    let edit = edit?;
    if canonical_json(&candidate) == canonical_json(original) {
        return None;
    }
    Some((candidate, edit))
}

/// Mutates `memory`'s static cells: draws `N` target edits, each a fresh
/// uniform static index not yet touched this batch, committed only if the
/// new value actually differs from the current one.
pub fn mutate_memory(memory: &MemoryBank, rng: &mut impl Rng, mutation: &MutationConfig) -> (MemoryBank, Vec<MemoryEdit>) {
    let static_cells = mutation.static_cells.min(STATIC_CELLS);
    let target_edits = rng.gen_range(mutation.min_edits..=mutation.max_edits).min(static_cells);
    let mut mutated = memory.clone();
    let mut edits = Vec::new();
    let mut touched = HashSet::new();

    let mut attempts = 0;
    while edits.len() < target_edits && attempts < MAX_MEMORY_EDIT_ATTEMPTS {
        attempts += 1;
        let index = rng.gen_range(0..static_cells);
        if touched.contains(&index) {
            continue;
        }
        let from = mutated.static_values_mut()[index];
        let to = rng.gen_range(MEMORY_MIN..=MEMORY_MAX);
        if to == from {
            continue;
        }
        mutated.static_values_mut()[index] = to;
        touched.insert(index);
        edits.push(MemoryEdit { index, from, to });
    }

    (mutated, edits)
}

/// The canonical content hash of an agent's heredity: both trees plus
/// static memory. Dynamic memory is omitted entirely, since it is always
/// reset to zero and so carries no distinguishing information here.
pub fn content_hash(board_alg: &Algorithm, move_alg: &Algorithm, static_memory: &[i32]) -> u64 {
    hash_of(&(board_alg, move_alg, static_memory))
}

fn agent_hash(agent: &Agent) -> u64 {
    content_hash(&agent.board_alg, &agent.move_alg, agent.memory.static_values())
}

/// Produces `desired` offspring of `parent`. Child 0 is always an exact
/// structural copy with fresh identity and zeroed dynamic memory and no
/// mutation record. Children `1..desired` independently mutate both trees
/// and static memory, accepted only if their content hash is new within
/// this call; the whole batch gives up after `10 * (desired + 1)`
/// attempts, possibly returning fewer than `desired` children.
pub fn produce_offspring(
    parent: &Agent,
    desired: usize,
    generation: u32,
    rng: &mut impl Rng,
    mutation: &MutationConfig,
) -> Vec<Agent> {
    let mut children = Vec::with_capacity(desired + 1);
    let mut seen_hashes = HashSet::new();

    let mut child0 = parent.clone();
    child0.id = agent::fresh_id();
    child0.generation = generation;
    child0.lineage.push(parent.id);
    child0.reset_dynamic_memory();
    seen_hashes.insert(agent_hash(&child0));
    children.push(child0);

    if desired == 0 {
        return children;
    }

    let max_attempts = 10 * (desired + 1);
    for _ in 0..max_attempts {
        if children.len() >= desired {
            break;
        }

        let (board_alg, _) = mutate_tree(&parent.board_alg, rng, mutation);
        let (move_alg, _) = mutate_tree(&parent.move_alg, rng, mutation);
        let (memory, _) = mutate_memory(&parent.memory, rng, mutation);

        let hash = content_hash(&board_alg, &move_alg, memory.static_values());
        if !seen_hashes.insert(hash) {
            continue;
        }

        let mut child = Agent::fresh(agent::fresh_id(), board_alg, move_alg, memory);
        child.generation = generation;
        child.lineage = parent.lineage.clone();
        child.lineage.push(parent.id);
        child.reset_dynamic_memory();
        children.push(child);
    }

    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBank;
    use crate::program::algorithm::{Algorithm, ProgramKind};
    use crate::program::generator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn random_agent(seed: u64) -> Agent {
        let mut rng = StdRng::seed_from_u64(seed);
        Agent::random(&mut rng, 0)
    }

    #[test]
    fn mutating_a_tree_does_not_mutate_the_original() {
        let mut rng = StdRng::seed_from_u64(100);
        let mutation = MutationConfig::default();
        let original = Algorithm::new(
            ProgramKind::Board,
            generator::generate_node(&mut rng, ProgramKind::Board, generator::Parent::None, 0),
        );
        let before = canonical_json(&original);
        let (_mutated, _) = mutate_tree(&original, &mut rng, &mutation);
        let after = canonical_json(&original);
        assert_eq!(before, after);
    }

    #[test]
    fn repeated_mutation_produces_structurally_distinct_trees() {
        let mut rng = StdRng::seed_from_u64(101);
        let mutation = MutationConfig::default();
        let mut alg = Algorithm::new(
            ProgramKind::Board,
            generator::generate_node(&mut rng, ProgramKind::Board, generator::Parent::None, 0),
        );
        for _ in 0..500 {
            let before = canonical_json(&alg);
            let (mutated, edits) = mutate_tree(&alg, &mut rng, &mutation);
            if !edits.is_empty() {
                assert_ne!(canonical_json(&mutated), before);
            }
            alg = mutated;
        }
    }

    #[test]
    fn offspring_hash_set_matches_returned_count_and_child_zero_is_the_parent() {
        let mut rng = StdRng::seed_from_u64(102);
        let mutation = MutationConfig::default();
        let parent = random_agent(7);
        let children = produce_offspring(&parent, 5, 1, &mut rng, &mutation);

        let mut hashes = HashSet::new();
        for child in &children {
            hashes.insert(agent_hash(child));
        }
        assert_eq!(hashes.len(), children.len());

        let parent_hash = content_hash(
            &parent.board_alg,
            &parent.move_alg,
            parent.memory.with_dynamic_zeroed().static_values(),
        );
        assert_eq!(agent_hash(&children[0]), parent_hash);
    }

    #[test]
    fn every_offspring_has_zeroed_dynamic_memory() {
        let mut rng = StdRng::seed_from_u64(103);
        let mutation = MutationConfig::default();
        let mut parent = random_agent(8);
        for i in STATIC_CELLS..crate::memory::TOTAL_CELLS {
            parent.memory.set(i, 13);
        }
        let children = produce_offspring(&parent, 4, 1, &mut rng, &mutation);
        for child in &children {
            for i in STATIC_CELLS..crate::memory::TOTAL_CELLS {
                assert_eq!(child.memory.get(i), 0);
            }
        }
    }

    #[test]
    fn memory_mutation_only_touches_static_cells() {
        let mut rng = StdRng::seed_from_u64(104);
        let mutation = MutationConfig::default();
        let memory = MemoryBank::random_static(&mut rng);
        let (mutated, edits) = mutate_memory(&memory, &mut rng, &mutation);
        for edit in &edits {
            assert!(MemoryBank::is_static(edit.index));
            assert_ne!(edit.from, edit.to);
        }
        for i in STATIC_CELLS..crate::memory::TOTAL_CELLS {
            assert_eq!(mutated.get(i), memory.get(i));
        }
    }
}
