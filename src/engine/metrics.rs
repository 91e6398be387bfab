//! Composition run metrics.
//!
//! The engine always records, per pass, which nodes became resolved; that is
//! what the `pass` annotation of every node is derived from. Timing rides
//! along for the verbose entry point and the debug CLI.
//!
//! ```text
//! pass 0        seed leaves from the lexicon (+ arity errors)
//! pass 1..k     compose internal nodes from the previous pass's state
//! pass k+1      (only if needed) mark everything still pending as an error
//! ```

use crate::tree::NodeId;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time for the composition run, including the collision check.
    pub total: Duration,
    /// Lexical seeding (pass 0).
    pub seed: PassMetrics,
    /// Composition passes, then the final error pass if one was needed.
    pub passes: Vec<PassMetrics>,
}

impl RunMetrics {
    /// Index of the last pass that ran.
    pub fn last_pass(&self) -> usize {
        self.passes.last().map_or(self.seed.pass, |pass| pass.pass)
    }
}

#[derive(Debug, Default, Clone)]
pub struct PassMetrics {
    pub pass: usize,
    pub duration: Duration,
    /// Nodes that became resolved during this pass, in preorder.
    pub resolved: Vec<NodeId>,
    /// Binary nodes over an ambiguous daughter that could not pick a single
    /// candidate during this pass.
    pub deferred: usize,
    /// Whether this is the closing pass that turns pending nodes into errors.
    pub closing: bool,
}
