//! Bottom-up fixed-point composition.
//!
//! This module is the operational core of the engine. Given a parsed [`Tree`]
//! and a [`Lexicon`], it assigns every node a [`Typing`] and a [`Rule`] in
//! numbered passes:
//!
//! ```text
//! (0) seed            leaves from the lexicon; >2 daughters -> error
//! (1..k) compose      every pending node looks at its daughters as they
//!                     stood at the end of the previous pass
//! (k+1) close         only if something is still pending: mark it an error
//! ```
//!
//! Reading the previous pass's state (rather than updating in place) is what
//! makes the pass number meaningful: a node typed by Functional Application
//! on pass `k` has its latest daughter resolved on pass `k - 1`.
//!
//! ## Ambiguous leaves
//!
//! A leaf with several lexicon candidates is not resolved on its own. It is
//! narrowed by the first binary ancestor that can see it, either directly or
//! through a chain of pending unary nodes:
//!
//! ```text
//!        S            S tries e+e (fails) and e+<e,t> (succeeds): exactly one
//!      /   \          success, so S := t and the choice <e,t> is committed to
//!   NP:e    X         X and `that` on the same pass.
//!           |
//!          that {e, <e,t>}
//! ```
//!
//! Zero or several successful candidates defer the decision. A pass that
//! resolves nothing ends the loop, and whatever is still pending is closed
//! as an error; the engine never picks between two working candidates.

use super::metrics::{PassMetrics, RunMetrics};
use super::rules::{self, Rule, RuleSet};
use crate::api::Options;
use crate::diagnostics::Diagnostic;
use crate::lexicon::{LexicalEntry, Lexicon, Lookup};
use crate::sem_type::Typing;
use crate::tree::{NodeId, Tree};
use std::time::Instant;
use tracing::{debug, trace};

/// Final annotation of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolution {
    pub typing: Typing,
    pub rule: Rule,
    pub pass: usize,
}

#[derive(Debug, Clone)]
enum State {
    Pending,
    /// Leaf with more than one lexicon candidate.
    Ambiguous(Vec<LexicalEntry>),
    Resolved(Resolution),
}

/// A daughter as seen by its mother during a pass.
#[derive(Debug, Clone)]
enum View {
    Resolved(Typing),
    /// Ambiguous leaf, possibly under pending unary nodes (`chain`, top first).
    Candidates { leaf: NodeId, chain: Vec<NodeId>, entries: Vec<LexicalEntry> },
    /// Not decidable yet.
    Blocked,
}

/// One node's outcome within a pass.
#[derive(Debug)]
struct Assignment {
    node: NodeId,
    typing: Typing,
    rule: Rule,
}

pub(crate) struct Composition {
    /// Indexed by `NodeId`.
    pub resolutions: Vec<Resolution>,
    pub diagnostics: Vec<Diagnostic>,
    pub metrics: RunMetrics,
}

/// Composer orchestrates the passes over one tree.
///
/// Usage: `Composer::new(&tree, &lexicon, &options).run()`.
pub(crate) struct Composer<'a> {
    tree: &'a Tree,
    lexicon: &'a Lexicon,
    options: &'a Options,
    states: Vec<State>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Composer<'a> {
    pub fn new(tree: &'a Tree, lexicon: &'a Lexicon, options: &'a Options) -> Self {
        Self { tree, lexicon, options, states: vec![State::Pending; tree.len()], diagnostics: Vec::new() }
    }

    /// Run every pass and return the per-node resolutions.
    pub fn run(mut self) -> Composition {
        let total_start = Instant::now();
        let mut metrics = RunMetrics { seed: self.seed(), ..RunMetrics::default() };

        let mut pass = 0;
        let mut limited = false;
        while self.has_unresolved() {
            if self.options.max_passes.is_some_and(|limit| pass >= limit) {
                limited = true;
                break;
            }
            pass += 1;
            let pass_start = Instant::now();
            let (assignments, deferred) = self.compose_pass();
            let resolved = self.apply(assignments, pass);
            debug!(pass, resolved = resolved.len(), deferred, "composition pass");
            let stalled = resolved.is_empty();
            metrics.passes.push(PassMetrics {
                pass,
                duration: pass_start.elapsed(),
                resolved,
                deferred,
                closing: false,
            });
            if stalled {
                break;
            }
        }

        if self.has_unresolved() {
            if limited {
                if let Some(limit) = self.options.max_passes {
                    self.report(Diagnostic::PassLimitReached { limit });
                }
            }
            metrics.passes.push(self.close(pass + 1));
        }

        let resolutions: Vec<Resolution> = self
            .states
            .into_iter()
            .map(|state| match state {
                State::Resolved(resolution) => resolution,
                // `close` leaves nothing pending.
                State::Pending | State::Ambiguous(_) => Resolution { typing: Typing::Error, rule: Rule::Error, pass: 0 },
            })
            .collect();

        metrics.total = total_start.elapsed();
        Composition { resolutions, diagnostics: self.diagnostics, metrics }
    }

    /// Pass 0: type leaves from the lexicon and reject unsupported arities.
    fn seed(&mut self) -> PassMetrics {
        let start = Instant::now();
        let (tree, lexicon) = (self.tree, self.lexicon);
        let mut resolved = Vec::new();

        for (id, node) in tree.iter() {
            let arity = node.children.len();
            if arity > 2 {
                self.report(Diagnostic::UnsupportedArity { node: id, label: node.label.display.clone(), arity });
                self.states[id.index()] = error_at(0);
                resolved.push(id);
                continue;
            }
            if arity > 0 {
                continue;
            }

            let key = node.label.key.as_str();
            match lexicon.resolve(key) {
                Lookup::Unique(entry) => {
                    trace!(node = %id, key, typing = %entry, "lexical leaf");
                    self.states[id.index()] =
                        State::Resolved(Resolution { typing: entry.typing(), rule: entry.rule(), pass: 0 });
                    resolved.push(id);
                }
                Lookup::Gap => {
                    self.report(Diagnostic::LexicalGap { node: id, key: key.to_string() });
                    let variants = lexicon.case_variants(key);
                    if !variants.is_empty() {
                        self.report(Diagnostic::CaseMismatch {
                            node: id,
                            key: key.to_string(),
                            variants: variants.into_iter().map(str::to_string).collect(),
                        });
                    }
                    self.states[id.index()] = error_at(0);
                    resolved.push(id);
                }
                Lookup::Ambiguous(entries) if self.options.ambiguity_fatal => {
                    self.report(Diagnostic::UnresolvedAmbiguity {
                        node: id,
                        key: key.to_string(),
                        candidates: entries.to_vec(),
                    });
                    self.states[id.index()] = error_at(0);
                    resolved.push(id);
                }
                Lookup::Ambiguous(entries) => {
                    trace!(node = %id, key, candidates = entries.len(), "ambiguous leaf");
                    self.states[id.index()] = State::Ambiguous(entries.to_vec());
                }
            }
        }

        debug!(resolved = resolved.len(), "lexical seeding");
        PassMetrics { pass: 0, duration: start.elapsed(), resolved, deferred: 0, closing: false }
    }

    fn has_unresolved(&self) -> bool {
        self.states.iter().any(|state| !matches!(state, State::Resolved(_)))
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        debug!(severity = ?diagnostic.severity(), "{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    /// Decide every pending internal node against the current state.
    ///
    /// Nothing is written here; see [`Composer::apply`].
    fn compose_pass(&mut self) -> (Vec<Assignment>, usize) {
        let mut assignments = Vec::new();
        let mut failures = Vec::new();
        let mut deferred = 0;
        let tree = self.tree;

        for (id, node) in tree.iter() {
            if !matches!(self.states[id.index()], State::Pending) {
                continue;
            }
            match node.children.as_slice() {
                [only] => {
                    if let State::Resolved(daughter) = &self.states[only.index()] {
                        assignments.push(self.compose_unary(id, &daughter.typing));
                    }
                }
                [left, right] => match (self.view(*left), self.view(*right)) {
                    (View::Blocked, _) | (_, View::Blocked) => {}
                    (View::Resolved(l), View::Resolved(r)) => {
                        let (assignment, failure) = self.compose_binary(id, l, r);
                        assignments.push(assignment);
                        failures.extend(failure);
                    }
                    (left_view, right_view) => match self.try_candidates(id, left_view, right_view, &mut failures) {
                        Some(mut chosen) => assignments.append(&mut chosen),
                        None => deferred += 1,
                    },
                },
                _ => {}
            }
        }

        for failure in failures {
            self.report(failure);
        }
        (assignments, deferred)
    }

    fn compose_unary(&self, id: NodeId, child: &Typing) -> Assignment {
        if child.is_error() {
            return Assignment { node: id, typing: Typing::Error, rule: Rule::Error };
        }
        match rules::pass_through(child, self.options.rules) {
            Some((typing, rule)) => Assignment { node: id, typing, rule },
            None => Assignment { node: id, typing: Typing::Error, rule: Rule::Error },
        }
    }

    fn compose_binary(&self, id: NodeId, left: Typing, right: Typing) -> (Assignment, Option<Diagnostic>) {
        if left.is_error() || right.is_error() {
            return (Assignment { node: id, typing: Typing::Error, rule: Rule::Error }, None);
        }
        match rules::combine(&left, &right, self.options.rules) {
            Some((typing, rule)) => {
                trace!(node = %id, %left, %right, %typing, %rule, "composed");
                (Assignment { node: id, typing, rule }, None)
            }
            None => (
                Assignment { node: id, typing: Typing::Error, rule: Rule::Error },
                Some(Diagnostic::CompositionFailure { node: id, left, right }),
            ),
        }
    }

    /// Enumerate candidate combinations for a binary node with at least one
    /// ambiguous daughter. Returns the assignments for the node and the
    /// committed chain(s) when exactly one combination works.
    fn try_candidates(
        &self,
        id: NodeId,
        left: View,
        right: View,
        failures: &mut Vec<Diagnostic>,
    ) -> Option<Vec<Assignment>> {
        let left_options = options_of(&left);
        let right_options = options_of(&right);

        // An error on the resolved side decides the node regardless of the
        // candidates; nothing above can narrow them any more, so they fail now.
        if left_options.iter().chain(&right_options).any(|(typing, entry)| entry.is_none() && typing.is_error()) {
            let mut out = vec![Assignment { node: id, typing: Typing::Error, rule: Rule::Error }];
            for view in [&left, &right] {
                if let View::Candidates { leaf, chain, entries } = view {
                    failures.push(Diagnostic::UnresolvedAmbiguity {
                        node: *leaf,
                        key: self.tree.node(*leaf).label.key.clone(),
                        candidates: entries.clone(),
                    });
                    out.extend(std::iter::once(leaf).chain(chain).map(|&node| Assignment {
                        node,
                        typing: Typing::Error,
                        rule: Rule::Error,
                    }));
                }
            }
            trace!(node = %id, "ambiguity abandoned beside an error");
            return Some(out);
        }

        let mut successes = Vec::new();
        for (l, l_entry) in &left_options {
            for (r, r_entry) in &right_options {
                if let Some((typing, rule)) = rules::combine(l, r, self.options.rules) {
                    successes.push((typing, rule, *l_entry, *r_entry));
                }
            }
        }

        let [(typing, rule, l_entry, r_entry)] = successes.as_slice() else {
            trace!(node = %id, successes = successes.len(), "ambiguity deferred");
            return None;
        };

        trace!(node = %id, %typing, %rule, "ambiguity narrowed");
        let mut out = vec![Assignment { node: id, typing: typing.clone(), rule: *rule }];
        if let (View::Candidates { leaf, chain, .. }, Some(entry)) = (&left, l_entry) {
            commit(&mut out, *leaf, chain, entry);
        }
        if let (View::Candidates { leaf, chain, .. }, Some(entry)) = (&right, r_entry) {
            commit(&mut out, *leaf, chain, entry);
        }
        Some(out)
    }

    /// How `id` looks to its mother right now.
    fn view(&self, id: NodeId) -> View {
        let mut chain = Vec::new();
        let mut current = id;
        loop {
            match &self.states[current.index()] {
                State::Resolved(resolution) if chain.is_empty() => return View::Resolved(resolution.typing.clone()),
                // The chain's bottom is typed; its unary nodes resolve on their own.
                State::Resolved(_) => return View::Blocked,
                State::Ambiguous(entries) => {
                    return View::Candidates { leaf: current, chain, entries: entries.clone() };
                }
                State::Pending => {
                    let node = self.tree.node(current);
                    match node.children.as_slice() {
                        [only] if self.options.rules.contains(RuleSet::NON_BRANCHING) => {
                            chain.push(current);
                            current = *only;
                        }
                        _ => return View::Blocked,
                    }
                }
            }
        }
    }

    /// Write a pass's assignments; returns the nodes resolved, in preorder.
    fn apply(&mut self, mut assignments: Vec<Assignment>, pass: usize) -> Vec<NodeId> {
        assignments.sort_by_key(|assignment| assignment.node);
        assignments
            .into_iter()
            .map(|Assignment { node, typing, rule }| {
                self.states[node.index()] = State::Resolved(Resolution { typing, rule, pass });
                node
            })
            .collect()
    }

    /// Closing pass: everything still pending becomes an error.
    fn close(&mut self, pass: usize) -> PassMetrics {
        let start = Instant::now();
        let tree = self.tree;
        let mut resolved = Vec::new();

        for (id, node) in tree.iter() {
            match &self.states[id.index()] {
                State::Resolved(_) => continue,
                State::Ambiguous(entries) => {
                    let diagnostic = Diagnostic::UnresolvedAmbiguity {
                        node: id,
                        key: node.label.key.clone(),
                        candidates: entries.clone(),
                    };
                    self.report(diagnostic);
                }
                State::Pending => {}
            }
            self.states[id.index()] = error_at(pass);
            resolved.push(id);
        }

        debug!(pass, closed = resolved.len(), "closing pass");
        PassMetrics { pass, duration: start.elapsed(), resolved, deferred: 0, closing: true }
    }
}

fn error_at(pass: usize) -> State {
    State::Resolved(Resolution { typing: Typing::Error, rule: Rule::Error, pass })
}

/// Typings a daughter may take, each with the lexical entry it would commit.
fn options_of(view: &View) -> Vec<(Typing, Option<&LexicalEntry>)> {
    match view {
        View::Resolved(typing) => vec![(typing.clone(), None)],
        View::Candidates { entries, .. } => entries.iter().map(|entry| (entry.typing(), Some(entry))).collect(),
        View::Blocked => Vec::new(),
    }
}

/// Resolve an ambiguous leaf to `entry`, and the unary chain above it by identity.
fn commit(out: &mut Vec<Assignment>, leaf: NodeId, chain: &[NodeId], entry: &LexicalEntry) {
    out.push(Assignment { node: leaf, typing: entry.typing(), rule: entry.rule() });
    for &node in chain {
        out.push(Assignment { node, typing: entry.typing(), rule: Rule::NonBranching });
    }
}
