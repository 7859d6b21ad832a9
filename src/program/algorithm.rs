//! An `Algorithm` pairs a tree with the program kind it was synthesized for,
//! which in turn determines which variables are legal within it.

use serde::{Deserialize, Serialize};

use super::node::Node;

/// Which of the two roles a tree plays for an agent. Determines the allowed
/// provided-variable subset (see [`super::variable::ProvidedVar::allowed_in`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramKind {
    Board,
    Movement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Algorithm {
    pub kind: ProgramKind,
    pub root: Node,
}

impl Algorithm {
    pub fn new(kind: ProgramKind, root: Node) -> Self {
        Algorithm { kind, root }
    }
}
