use crate::diagnostics::{Diagnostic, Severity};
use crate::engine::{self, Composer, RuleSet, RunMetrics};
use crate::error::ParseError;
use crate::lexicon::Lexicon;
use crate::sem_type::Typing;
use crate::tree::{Label, NodeId, Tree};
use crate::Rule;
use std::ops::Range;
use std::time::Instant;

/// Options that affect composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Composition rules the engine may use.
    pub rules: RuleSet,
    /// Turn every ambiguous leaf into an error at pass 0 instead of letting
    /// a binary ancestor narrow it.
    pub ambiguity_fatal: bool,
    /// Stop after this many composition passes. Whatever is still unresolved
    /// becomes an error and [`Diagnostic::PassLimitReached`] is reported.
    pub max_passes: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Self { rules: RuleSet::default(), ambiguity_fatal: false, max_passes: None }
    }
}

impl Options {
    /// Default options with every composition rule enabled.
    pub fn all_rules() -> Self {
        Self { rules: RuleSet::all(), ..Self::default() }
    }
}

/// One node of an [`AnnotatedTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedNode {
    pub id: NodeId,
    pub label: Label,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Byte span of the node in the input.
    pub span: Range<usize>,
    pub typing: Typing,
    pub rule: Rule,
    /// Pass at which the node was resolved (0 for lexical leaves).
    pub pass: usize,
}

impl AnnotatedNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_error(&self) -> bool {
        self.typing.is_error()
    }
}

/// The input tree with every node typed.
///
/// Same shape and node ids as the parsed [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedTree {
    nodes: Vec<AnnotatedNode>,
}

impl AnnotatedTree {
    pub fn root(&self) -> &AnnotatedNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &AnnotatedNode {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in preorder.
    pub fn iter(&self) -> impl Iterator<Item = &AnnotatedNode> {
        self.nodes.iter()
    }

    /// Leaves, left to right.
    pub fn leaves(&self) -> impl Iterator<Item = &AnnotatedNode> + '_ {
        self.nodes.iter().filter(|node| node.is_leaf())
    }

    /// Number of the last pass that resolved any node.
    pub fn passes(&self) -> usize {
        self.nodes.iter().map(|node| node.pass).max().unwrap_or(0)
    }

    /// True when no node carries the error marker.
    pub fn is_fully_resolved(&self) -> bool {
        self.nodes.iter().all(|node| !node.is_error())
    }

    /// First node, in preorder, whose display label is `display`.
    pub fn find(&self, display: &str) -> Option<&AnnotatedNode> {
        self.nodes.iter().find(|node| node.label.display == display)
    }

    /// Every node whose display label is `display`, in preorder.
    pub fn find_all<'s>(&'s self, display: &'s str) -> impl Iterator<Item = &'s AnnotatedNode> + 's {
        self.nodes.iter().filter(move |node| node.label.display == display)
    }
}

/// Result from [`annotate`] and [`annotate_with`].
#[derive(Debug, Clone)]
pub struct Annotation {
    pub tree: AnnotatedTree,
    /// Everything that went wrong, in the order the engine found it.
    pub diagnostics: Vec<Diagnostic>,
}

impl Annotation {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.severity() == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Result from [`annotate_verbose_with`].
#[derive(Debug, Clone)]
pub struct AnnotationVerbose {
    pub annotation: Annotation,
    pub metrics: RunMetrics,
}

/// Parse `tree` and annotate it with the default [`Options`].
///
/// # Example
/// ```
/// use typetree::{annotate, lexicon};
///
/// let lexicon = lexicon! { "e" => ["Andrew"], "<e,t>" => ["sleeps"] }.unwrap();
/// let out = annotate("[.S [.NP Andrew ] [.VP sleeps ] ]", &lexicon).unwrap();
/// assert_eq!(out.tree.root().typing.to_string(), "t");
/// assert_eq!(out.tree.root().rule.to_string(), "FA<");
/// ```
pub fn annotate(tree: &str, lexicon: &Lexicon) -> Result<Annotation, ParseError> {
    annotate_with(tree, lexicon, &Options::default())
}

/// Parse `tree` and annotate it with the provided `options`.
///
/// Only a malformed bracket string is an `Err`; everything that goes wrong
/// during composition is reported in [`Annotation::diagnostics`].
pub fn annotate_with(tree: &str, lexicon: &Lexicon, options: &Options) -> Result<Annotation, ParseError> {
    Ok(annotate_verbose_with(tree, lexicon, options)?.annotation)
}

/// Like [`annotate_with`], and also return per-pass metrics.
pub fn annotate_verbose_with(tree: &str, lexicon: &Lexicon, options: &Options) -> Result<AnnotationVerbose, ParseError> {
    let parsed = engine::parse_tree(tree)?;
    Ok(annotate_tree(&parsed, lexicon, options))
}

/// Annotate an already parsed tree.
pub fn annotate_tree(tree: &Tree, lexicon: &Lexicon, options: &Options) -> AnnotationVerbose {
    let mut composition = Composer::new(tree, lexicon, options).run();
    let collision_start = Instant::now();
    composition.diagnostics.extend(engine::normalize::check_collisions(tree, &composition.resolutions));
    composition.metrics.total += collision_start.elapsed();

    let nodes = tree
        .iter()
        .zip(composition.resolutions)
        .map(|((id, node), resolution)| AnnotatedNode {
            id,
            label: node.label.clone(),
            children: node.children.clone(),
            parent: node.parent,
            span: node.span.clone(),
            typing: resolution.typing,
            rule: resolution.rule,
            pass: resolution.pass,
        })
        .collect();

    AnnotationVerbose {
        annotation: Annotation { tree: AnnotatedTree { nodes }, diagnostics: composition.diagnostics },
        metrics: composition.metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    fn lexicon() -> Lexicon {
        lexicon! { "e" => ["Andrew", "Mathis"], "<e,t>" => ["sleeps"], "<e,<e,t>>" => ["hits"] }.unwrap()
    }

    #[test]
    fn annotate_types_every_node() {
        let out = annotate("[.S [.NP Andrew ] [.VP [.V hits ] [.NP Mathis ] ] ]", &lexicon()).unwrap();

        assert!(out.tree.is_fully_resolved());
        assert!(out.diagnostics.is_empty());
        assert_eq!(out.tree.len(), 8);
        assert_eq!(out.tree.root().typing.to_string(), "t");
        assert_eq!(out.tree.find("VP").unwrap().typing.to_string(), "<e,t>");
        assert_eq!(out.tree.find("VP").unwrap().rule, Rule::FunctionalApplication(crate::Direction::Forward));
        assert_eq!(out.tree.passes(), 3);
        assert_eq!(out.tree.leaves().map(|leaf| leaf.label.display.as_str()).collect::<Vec<_>>(), vec![
            "Andrew", "hits", "Mathis"
        ]);
    }

    #[test]
    fn malformed_tree_is_an_error() {
        let err = annotate("[.S [.NP Andrew ]", &lexicon()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Unclosed);
    }

    #[test]
    fn failures_are_diagnostics_not_errors() {
        let out = annotate("[.S Andrew Mathis ]", &lexicon()).unwrap();
        assert!(!out.tree.is_fully_resolved());
        assert!(out.has_errors());
        assert_eq!(out.errors().count(), 1);
        assert_eq!(out.warnings().count(), 0);
        assert_eq!(out.tree.root().typing, Typing::Error);
    }

    #[test]
    fn find_all_returns_every_match_in_preorder() {
        let out = annotate("[.S [.NP Andrew ] [.VP [.V hits ] [.NP Mathis ] ] ]", &lexicon()).unwrap();
        let ids: Vec<NodeId> = out.tree.find_all("NP").map(|node| node.id).collect();
        assert_eq!(ids, vec![NodeId(1), NodeId(6)]);
    }

    #[test]
    fn verbose_reports_passes() {
        let out =
            annotate_verbose_with("[.S [.NP Andrew ] [.VP sleeps ] ]", &lexicon(), &Options::default()).unwrap();
        assert_eq!(out.metrics.seed.resolved, vec![NodeId(2), NodeId(4)]);
        assert_eq!(out.metrics.last_pass(), 2);
        assert!(out.metrics.passes.iter().all(|pass| !pass.closing));
        // `total` also covers the collision check that runs after the passes.
        let timed: std::time::Duration =
            out.metrics.passes.iter().map(|pass| pass.duration).sum::<std::time::Duration>() + out.metrics.seed.duration;
        assert!(out.metrics.total >= timed);
    }

    #[test]
    fn all_rules_enables_every_flag() {
        assert_eq!(Options::all_rules().rules, RuleSet::all());
        assert_eq!(Options::default().rules, RuleSet::FUNCTIONAL_APPLICATION | RuleSet::NON_BRANCHING);
    }
}
