//! Non-fatal findings collected while annotating a tree.
//!
//! Composition never aborts: a node that cannot be typed is marked with the
//! error marker and a [`Diagnostic`] says why. Errors that merely propagate
//! from a failed child do not produce a diagnostic of their own.

use crate::lexicon::LexicalEntry;
use crate::sem_type::Typing;
use crate::tree::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// Leaf key absent from the lexicon.
    #[error("no lexicon entry for `{key}`")]
    LexicalGap { node: NodeId, key: String },

    /// Reported next to a [`Diagnostic::LexicalGap`] when the key exists in another case.
    #[error("`{key}` is not in the lexicon, but {} is", quoted(.variants))]
    CaseMismatch { node: NodeId, key: String, variants: Vec<String> },

    /// Two resolved daughters that no active rule combines.
    #[error("cannot compose `{left}` with `{right}`")]
    CompositionFailure { node: NodeId, left: Typing, right: Typing },

    /// Ambiguous leaf that never narrowed to a single candidate.
    #[error("`{key}` stayed ambiguous between {}", joined(.candidates))]
    UnresolvedAmbiguity { node: NodeId, key: String, candidates: Vec<LexicalEntry> },

    #[error("`{label}` has {arity} daughters; only unary and binary nodes compose")]
    UnsupportedArity { node: NodeId, label: String, arity: usize },

    /// Nodes sharing a lookup key ended up with different typings or rules.
    #[error("nodes sharing key `{key}` resolved differently: {}", joined(.nodes))]
    LabelCollision { key: String, nodes: Vec<NodeId> },

    #[error("composition stopped after the {limit}-pass limit with nodes unresolved")]
    PassLimitReached { limit: usize },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::CaseMismatch { .. } | Diagnostic::PassLimitReached { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Nodes the diagnostic is attached to.
    pub fn nodes(&self) -> Vec<NodeId> {
        match self {
            Diagnostic::LexicalGap { node, .. }
            | Diagnostic::CaseMismatch { node, .. }
            | Diagnostic::CompositionFailure { node, .. }
            | Diagnostic::UnresolvedAmbiguity { node, .. }
            | Diagnostic::UnsupportedArity { node, .. } => vec![*node],
            Diagnostic::LabelCollision { nodes, .. } => nodes.clone(),
            Diagnostic::PassLimitReached { .. } => Vec::new(),
        }
    }
}

fn quoted(items: &[String]) -> String {
    items.iter().map(|item| format!("`{item}`")).collect::<Vec<_>>().join(", ")
}

fn joined<T: std::fmt::Display>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sem_type::SemType;

    #[test]
    fn messages() {
        let gap = Diagnostic::LexicalGap { node: NodeId(3), key: "zorks".into() };
        assert_eq!(gap.to_string(), "no lexicon entry for `zorks`");

        let case = Diagnostic::CaseMismatch { node: NodeId(3), key: "andrew".into(), variants: vec!["Andrew".into()] };
        assert_eq!(case.to_string(), "`andrew` is not in the lexicon, but `Andrew` is");
        assert_eq!(case.severity(), Severity::Warning);

        let ambiguity = Diagnostic::UnresolvedAmbiguity {
            node: NodeId(1),
            key: "that".into(),
            candidates: vec![LexicalEntry::Typed(SemType::entity()), LexicalEntry::Typed(SemType::predicate())],
        };
        assert_eq!(ambiguity.to_string(), "`that` stayed ambiguous between e, <e,t>");

        let collision = Diagnostic::LabelCollision { key: "X".into(), nodes: vec![NodeId(1), NodeId(3)] };
        assert_eq!(collision.to_string(), "nodes sharing key `X` resolved differently: n1, n3");
        assert_eq!(collision.nodes(), vec![NodeId(1), NodeId(3)]);
    }
}
