//! Semantic type annotation for syntax trees.
//!
//! Takes a qtree bracket tree (`[.S [.NP Andrew ] [.VP sleeps ] ]`) and a
//! lexicon mapping words to semantic types, and annotates every node with a
//! type and the composition rule that produced it.
//!
//! ```
//! use typetree::{annotate, lexicon};
//!
//! let lexicon = lexicon! { "e" => ["Andrew"], "<e,t>" => ["sleeps"] }.unwrap();
//! let out = annotate("[.S [.NP Andrew ] [.VP sleeps ] ]", &lexicon).unwrap();
//! let np = out.tree.find("NP").unwrap();
//! assert_eq!((np.typing.to_string(), np.rule.to_string(), np.pass), ("e".into(), "NN".into(), 1));
//! ```

#[macro_use]
mod macros;
mod api;
mod diagnostics;
mod engine;
mod error;
mod lexicon;
mod sem_type;
mod tree;

pub use api::{
    AnnotatedNode, AnnotatedTree, Annotation, AnnotationVerbose, Options, annotate, annotate_tree,
    annotate_verbose_with, annotate_with,
};
pub use diagnostics::{Diagnostic, Severity};
pub use engine::{Direction, PassMetrics, Rule, RuleSet, RunMetrics, lookup_key};
pub use error::{Error, LexiconError, ParseError, ParseErrorKind, Result, TypeSyntaxError};
pub use lexicon::{LexicalEntry, Lexicon, Lookup};
pub use sem_type::{SemType, Typing};
pub use tree::{Label, NodeId, Tree, TreeNode};
