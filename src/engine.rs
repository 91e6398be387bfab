//! Parsing and composition engine.
//!
//! The engine is split into focused submodules under `src/engine/`; this file
//! wires them together and re-exports the pieces the public API needs.
//!
//! ## How the parts work together
//!
//! ```text
//! input ── tokenize + recursive descent ───────── (bracket.rs)
//!            │  every label normalized to
//!            │  display label + lookup key      (normalize.rs)
//!            v
//!          Tree (arena, preorder NodeIds)
//!            │
//!            v
//!          Composer::run                          (compose.rs)
//!            - pass 0: seed leaves from the Lexicon
//!            - pass 1..k: compose from the previous pass's state
//!              using the active RuleSet           (rules.rs)
//!            - stop at the first pass that resolves nothing
//!            - close: leftover nodes become errors
//!            │
//!            v
//!          check_collisions                       (normalize.rs)
//!            │
//!            v
//!          resolutions + diagnostics + RunMetrics (metrics.rs)
//! ```
//!
//! Composition is a fixed point over the tree: a pass only reads what the
//! previous pass produced, so a node's pass number is one more than its
//! latest daughter's. Nothing here panics on bad input; failures turn into
//! the error marker plus a [`Diagnostic`](crate::Diagnostic).
//!
//! ## Debugging
//!
//! The engine emits `tracing` events: `debug` for pass summaries and
//! diagnostics, `trace` for every node decision. The CLI reads its filter
//! from `TYPETREE_LOG`, e.g. `TYPETREE_LOG=typetree=trace`.

#[path = "engine/bracket.rs"]
mod bracket;
#[path = "engine/compose.rs"]
mod compose;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/normalize.rs"]
pub(crate) mod normalize;
#[path = "engine/rules.rs"]
mod rules;


pub(crate) use bracket::parse_tree;
pub(crate) use compose::Composer;
pub use metrics::{PassMetrics, RunMetrics};
pub use normalize::lookup_key;
pub use rules::{Direction, Rule, RuleSet};
