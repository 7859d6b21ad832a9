//! The per-turn bundle threaded through board-program and movement-program
//! evaluation: which agent is acting, the position it sees, and the running
//! totals the movement program can read back.

use crate::agent::Agent;
use crate::pieces::Color;

/// Six running totals, reset/shifted at the start of each turn per the
/// per-turn procedure in the game runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnOutputs {
    pub first_pre: i64,
    pub first_post: i64,
    pub prev_pre: i64,
    pub prev_post: i64,
    pub this_pre: i64,
    pub this_post: i64,
}

impl TurnOutputs {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Shifts `this_*` into `prev_*` and zeroes `this_*` — step 2 of the
    /// per-turn procedure, run before the new turn's scans accumulate.
    pub fn advance(&mut self) {
        self.prev_pre = self.this_pre;
        self.prev_post = self.this_post;
        self.this_pre = 0;
        self.this_post = 0;
    }
}

#[derive(Debug, Clone)]
pub struct TurnContext<A> {
    pub agent: Agent,
    pub board: A,
    pub color: Color,
    pub depth: i64,
    pub outputs: TurnOutputs,
}

impl<A: Clone> TurnContext<A> {
    pub fn new(agent: Agent, board: A, color: Color) -> Self {
        TurnContext {
            agent,
            board,
            color,
            depth: 0,
            outputs: TurnOutputs::zero(),
        }
    }

    /// Clones this context for the next turn on the same color: increments
    /// depth and shifts `this_*` into `prev_*`.
    pub fn next_turn(&self, board: A) -> Self {
        let mut outputs = self.outputs;
        outputs.advance();
        TurnContext {
            agent: self.agent.clone(),
            board,
            color: self.color,
            depth: self.depth + 1,
            outputs,
        }
    }
}
