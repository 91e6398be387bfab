//! Label normalization.
//!
//! Every raw label yields two derived forms (see [`Label`]):
//!
//! ```text
//! raw                     display   key
//! ─────────────────────   ───────   ────────
//! \node(top){S };         S         S
//! NP^2                    NP^2      NP
//! N$'$^{12}               N$'$^{12} N$'$
//! that_{RP}^1             that_{RP}^1 that_{RP}
//! D_{1}                   D_{1}     D
//! ```
//!
//! Superscripts and numeric subscripts only keep otherwise identical labels
//! apart in the tree, so they are dropped from the lookup key. Non-numeric
//! subscripts are how ambiguous lexical entries sharing a display form are
//! told apart, so they stay.
//!
//! The module also owns the post-composition uniqueness check: nodes that
//! share a key must also share their typing and rule.

use crate::diagnostics::Diagnostic;
use crate::engine::compose::Resolution;
use crate::error::ParseErrorKind;
use crate::tree::{Label, NodeId, Tree};
use std::collections::BTreeMap;

/// Derive display label and lookup key for `raw`.
///
/// `outermost` is true only for the root label, the one place the
/// `\node(id){text};` form is accepted.
pub(crate) fn normalize(raw: &str, outermost: bool) -> Result<Label, ParseErrorKind> {
    let display = match root_node_text(raw) {
        Some(_) if !outermost => return Err(ParseErrorKind::MisplacedRootNode),
        Some("") => return Err(ParseErrorKind::MissingLabel),
        Some(text) => text.to_string(),
        None => raw.to_string(),
    };
    let key = lookup_key(&display);
    Ok(Label { raw: raw.to_string(), display, key })
}

/// Braced text of a `\node(id){text};` label, trimmed.
fn root_node_text(raw: &str) -> Option<&str> {
    let caps = regex!(r"^\\node\s*\([^()]*\)\s*\{(.*)\}\s*;?$").captures(raw)?;
    caps.get(1).map(|m| m.as_str().trim())
}

/// Strip trailing superscript and numeric-subscript markers from a label.
///
/// Markers are removed one at a time from the end until the label ends in
/// something else (plain text or a non-numeric subscript). A label that is
/// nothing but a marker is returned unchanged.
pub fn lookup_key(display: &str) -> String {
    let superscript = regex!(r"\^(?:\{[^{}]*\}|[^\^_{}\s]+)$");
    let numeric_subscript = regex!(r"_(?:\{\d+\}|\d+)$");

    let mut key = display;
    loop {
        let marker = superscript.find(key).or_else(|| numeric_subscript.find(key));
        match marker {
            Some(m) if m.start() > 0 => key = &key[..m.start()],
            _ => break,
        }
    }
    key.to_string()
}

/// Report every key whose nodes disagree on typing or rule.
pub(crate) fn check_collisions(tree: &Tree, resolutions: &[Resolution]) -> Vec<Diagnostic> {
    let mut by_key: BTreeMap<&str, Vec<NodeId>> = BTreeMap::new();
    for (id, node) in tree.iter() {
        by_key.entry(node.label.key.as_str()).or_default().push(id);
    }

    by_key
        .into_iter()
        .filter(|(_, nodes)| nodes.len() > 1)
        .filter(|(_, nodes)| {
            let first = &resolutions[nodes[0].index()];
            nodes[1..].iter().any(|id| {
                let other = &resolutions[id.index()];
                other.typing != first.typing || other.rule != first.rule
            })
        })
        .map(|(key, nodes)| {
            tracing::debug!(key, count = nodes.len(), "label collision");
            Diagnostic::LabelCollision { key: key.to_string(), nodes }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("NP", "NP")]
    #[case("NP^1", "NP")]
    #[case("N$'$^2", "N$'$")]
    #[case("N^{12}", "N")]
    #[case("D_1", "D")]
    #[case("D_{1}", "D")]
    #[case("NP_1^2", "NP")]
    #[case("der_{RP}", "der_{RP}")]
    #[case("der_{RP}^2", "der_{RP}")]
    #[case("that_{RP}_1", "that_{RP}")]
    #[case("und_{ind}", "und_{ind}")]
    #[case("x_a", "x_a")]
    #[case("$t$", "$t$")]
    #[case("1", "1")]
    #[case("^1", "^1")]
    fn strips_only_disambiguation_markers(#[case] label: &str, #[case] key: &str) {
        assert_eq!(lookup_key(label), key);
    }

    #[test]
    fn root_form_is_unwrapped_for_display_and_key() {
        let label = normalize(r"\node(top){S$'$^1 };", true).unwrap();
        assert_eq!(label.raw, r"\node(top){S$'$^1 };");
        assert_eq!(label.display, "S$'$^1");
        assert_eq!(label.key, "S$'$");
    }

    #[test]
    fn root_form_rejected_below_the_root() {
        assert_eq!(normalize(r"\node(top){S };", false), Err(ParseErrorKind::MisplacedRootNode));
    }

    #[test]
    fn empty_root_text_is_a_missing_label() {
        assert_eq!(normalize(r"\node(top){ };", true), Err(ParseErrorKind::MissingLabel));
    }

    #[test]
    fn plain_labels_keep_their_display() {
        let label = normalize("VP^2", false).unwrap();
        assert_eq!(label.display, "VP^2");
        assert_eq!(label.key, "VP");
    }
}
