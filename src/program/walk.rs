//! Structural tree traversal. Two flavors: a read-only visitor used by
//! inspection code (counting nodes, measuring depth, collecting variable
//! ids) and a mutating [`TreeWalk`] used by the mutator, which can stop
//! early and optionally replace the node it stopped on.

use rand::seq::SliceRandom;
use rand::RngCore;

use super::node::Node;

/// What a mutating visitor wants to happen after looking at a node.
pub enum WalkControl {
    Continue,
    Stop,
    Replace(Node),
}

/// Visits every node of `root` in read-only pre-order (parent before
/// children). `visit` receives the node and its path from the root (a
/// sequence of child indices).
pub fn walk_ref<'a>(root: &'a Node, mut visit: impl FnMut(&'a Node, &[usize])) {
    fn rec<'a>(node: &'a Node, path: &mut Vec<usize>, visit: &mut dyn FnMut(&'a Node, &[usize])) {
        visit(node, path);
        for i in 0..node.child_count() {
            path.push(i);
            rec(node.child(i).unwrap(), path, visit);
            path.pop();
        }
    }
    let mut path = Vec::new();
    rec(root, &mut path, &mut visit);
}

pub fn count_nodes(root: &Node) -> usize {
    let mut count = 0;
    walk_ref(root, |_, _| count += 1);
    count
}

/// The length of the longest root-to-leaf path, in edges (a bare leaf root
/// has depth 0).
pub fn max_depth(root: &Node) -> usize {
    let mut depth = 0;
    walk_ref(root, |_, path| depth = depth.max(path.len()));
    depth
}

/// Deterministic pre-order mutating walk; stops as soon as `visit` returns
/// anything other than `Continue`. Returns `true` if the walk was stopped
/// (by `Stop` or `Replace`).
pub fn walk_ordered(root: &mut Node, visit: impl FnMut(&Node, &[usize]) -> WalkControl) -> bool {
    let mut path = Vec::new();
    let mut visit = visit;
    walk_mut_rec_ordered(root, &mut path, &mut visit)
}

fn walk_mut_rec_ordered(
    node: &mut Node,
    path: &mut Vec<usize>,
    visit: &mut dyn FnMut(&Node, &[usize]) -> WalkControl,
) -> bool {
    match visit(node, path) {
        WalkControl::Stop => return true,
        WalkControl::Replace(replacement) => {
            *node = replacement;
            return true;
        }
        WalkControl::Continue => {}
    }

    for i in 0..node.child_count() {
        path.push(i);
        let stopped = walk_mut_rec_ordered(node.child_mut(i).unwrap(), path, visit);
        path.pop();
        if stopped {
            return true;
        }
    }
    false
}

/// Same as [`walk_ordered`] but randomizes sibling order before descending
/// into each node's children.
pub fn walk_unordered<R: RngCore + ?Sized>(
    root: &mut Node,
    rng: &mut R,
    visit: impl FnMut(&Node, &[usize], &mut R) -> WalkControl,
) -> bool {
    let mut path = Vec::new();
    let mut visit = visit;
    walk_mut_rec_unordered(root, &mut path, rng, &mut visit)
}

fn walk_mut_rec_unordered<R: RngCore + ?Sized>(
    node: &mut Node,
    path: &mut Vec<usize>,
    rng: &mut R,
    visit: &mut dyn FnMut(&Node, &[usize], &mut R) -> WalkControl,
) -> bool {
    match visit(node, path, rng) {
        WalkControl::Stop => return true,
        WalkControl::Replace(replacement) => {
            *node = replacement;
            return true;
        }
        WalkControl::Continue => {}
    }

    let mut indices: Vec<usize> = (0..node.child_count()).collect();
    indices.shuffle(rng);

    for i in indices {
        path.push(i);
        let stopped = walk_mut_rec_unordered(node.child_mut(i).unwrap(), path, rng, visit);
        path.pop();
        if stopped {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::variable::{ProvidedVar, VariableId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn leaf(id: usize) -> Node {
        Node::Variable(VariableId::Custom(id))
    }

    fn sample_tree() -> Node {
        Node::Binary {
            kind: crate::program::function_kind::FunctionKind::Add,
            left: Box::new(leaf(0)),
            right: Box::new(Node::Unary {
                kind: crate::program::function_kind::FunctionKind::Sqrt,
                value: Box::new(leaf(1)),
            }),
        }
    }

    #[test]
    fn count_nodes_matches_manual_count() {
        assert_eq!(count_nodes(&sample_tree()), 4);
    }

    #[test]
    fn max_depth_matches_manual_depth() {
        assert_eq!(max_depth(&sample_tree()), 2);
    }

    #[test]
    fn ordered_walk_visits_parent_before_children() {
        let tree = sample_tree();
        let mut order = Vec::new();
        walk_ref(&tree, |node, _| {
            order.push(matches!(node, Node::Variable(_)));
        });
        assert_eq!(order, vec![false, true, false, true]);
    }

    #[test]
    fn replace_swaps_the_visited_node_in_place() {
        let mut tree = sample_tree();
        walk_ordered(&mut tree, |_, path| {
            if path == [0] {
                WalkControl::Replace(Node::Variable(VariableId::Provided(ProvidedVar::IsDraw)))
            } else {
                WalkControl::Continue
            }
        });
        match tree.child(0).unwrap() {
            Node::Variable(VariableId::Provided(ProvidedVar::IsDraw)) => {}
            other => panic!("expected replaced leaf, got {other:?}"),
        }
    }

    #[test]
    fn unordered_walk_still_visits_every_node_exactly_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut tree = sample_tree();
        let mut visited = 0;
        walk_unordered(&mut tree, &mut rng, |_, _, _| {
            visited += 1;
            WalkControl::Continue
        });
        assert_eq!(visited, 4);
    }
}
