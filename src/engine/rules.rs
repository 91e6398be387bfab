//! Composition rules.
//!
//! The default rule set is Functional Application plus Non-Branching
//! (identity for unary nodes). The remaining rules of the classic
//! Heim & Kratzer inventory are available behind [`RuleSet`] flags:
//!
//! ```text
//! FA   <A,B> + A          -> B        (either order; records direction)
//! NN   [X]                -> X        (unary nodes)
//! PM   <e,t> + <e,t>      -> <e,t>
//! PA   index + T          -> <e,T>
//! VAC  vacuous + X        -> X        (tagged NN)
//! ```
//!
//! [`combine`] tries the rules in that order and returns the first that
//! applies; the engine decides what an absent result means (failure now, or
//! deferral while a child is still ambiguous).

use crate::sem_type::{SemType, Typing};
use std::fmt;

bitflags::bitflags! {
    /// Rules the engine may use.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RuleSet: u8 {
        const FUNCTIONAL_APPLICATION = 1 << 0;
        const NON_BRANCHING          = 1 << 1;
        const PREDICATE_MODIFICATION = 1 << 2;
        const PREDICATE_ABSTRACTION  = 1 << 3;
        const VACUOUS                = 1 << 4;
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::FUNCTIONAL_APPLICATION | RuleSet::NON_BRANCHING
    }
}

/// Which daughter holds the function in a Functional Application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Function on the left, argument on the right.
    Forward,
    /// Argument on the left, function on the right.
    Backward,
}

/// How a node got its typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Leaf typed straight from the lexicon.
    Lexical,
    /// Trace or pronoun leaf.
    Trace,
    /// Index or vacuous leaf.
    Empty,
    NonBranching,
    FunctionalApplication(Direction),
    PredicateModification,
    PredicateAbstraction,
    Error,
}

impl Rule {
    pub fn is_error(self) -> bool {
        matches!(self, Rule::Error)
    }

    /// Short tag used in annotations.
    pub fn tag(self) -> &'static str {
        match self {
            Rule::Lexical => "TN",
            Rule::Trace => "TN2",
            Rule::Empty => "-",
            Rule::NonBranching => "NN",
            Rule::FunctionalApplication(Direction::Forward) => "FA>",
            Rule::FunctionalApplication(Direction::Backward) => "FA<",
            Rule::PredicateModification => "PM",
            Rule::PredicateAbstraction => "PA",
            Rule::Error => Typing::ERROR_MARKER,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Typing of a unary node over `child`.
pub(crate) fn pass_through(child: &Typing, rules: RuleSet) -> Option<(Typing, Rule)> {
    rules.contains(RuleSet::NON_BRANCHING).then(|| (child.clone(), Rule::NonBranching))
}

/// Typing of a binary node over `left` and `right`, if any active rule applies.
///
/// Neither side may be [`Typing::Error`]; error propagation is the caller's job.
pub(crate) fn combine(left: &Typing, right: &Typing, rules: RuleSet) -> Option<(Typing, Rule)> {
    if rules.contains(RuleSet::FUNCTIONAL_APPLICATION) {
        if let (Some(l), Some(r)) = (left.as_type(), right.as_type()) {
            // At most one order can apply: a type never occurs inside its own domain.
            if let Some(out) = l.apply(r) {
                return Some((out.clone().into(), Rule::FunctionalApplication(Direction::Forward)));
            }
            if let Some(out) = r.apply(l) {
                return Some((out.clone().into(), Rule::FunctionalApplication(Direction::Backward)));
            }
        }
    }

    if rules.contains(RuleSet::PREDICATE_MODIFICATION) {
        if let (Some(l), Some(r)) = (left.as_type(), right.as_type()) {
            if l == r && *l == SemType::predicate() {
                return Some((left.clone(), Rule::PredicateModification));
            }
        }
    }

    if rules.contains(RuleSet::PREDICATE_ABSTRACTION) {
        match (left, right) {
            (Typing::Index, Typing::Type(body)) | (Typing::Type(body), Typing::Index) => {
                return Some((SemType::function(SemType::entity(), body.clone()).into(), Rule::PredicateAbstraction));
            }
            _ => {}
        }
    }

    if rules.contains(RuleSet::VACUOUS) {
        match (left, right) {
            (Typing::Vacuous, other) | (other, Typing::Vacuous) => return Some((other.clone(), Rule::NonBranching)),
            _ => {}
        }
    }

    None
}
