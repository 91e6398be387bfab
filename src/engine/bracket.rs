//! qtree bracket parser.
//!
//! ```text
//! tree  := '[' '.' label child* ']'
//! child := tree | token
//! ```
//!
//! Parsing is two steps: a tokenizer that splits on whitespace and brackets
//! while keeping balanced `{..}` / `(..)` groups inside one token, then a
//! recursive descent over those tokens that builds the [`Tree`] arena in
//! preorder.
//!
//! The group rule is what keeps the optional root form in one piece:
//!
//! ```text
//! [.\node(top){S }; [.NP Andrew ] ]
//!  ^^^^^^^^^^^^^^^^  one token, display label "S"
//! ```
//!
//! A bracket with a label but no daughters (`[.Peter ]`, `[.1 ]`) is a leaf,
//! exactly like a bare token.

use super::normalize::normalize;
use crate::error::{ParseError, ParseErrorKind};
use crate::tree::{NodeId, Tree, TreeNode};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Open(usize),
    Close(usize),
    Word(&'a str, Range<usize>),
}

/// Split `input` into brackets and words.
fn tokenize(input: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;
    // Open `{` / `(` groups inside the current word, innermost last.
    let mut groups: Vec<(char, usize)> = Vec::new();

    for (idx, c) in input.char_indices() {
        if !groups.is_empty() {
            match c {
                '{' | '(' => groups.push((c, idx)),
                '}' | ')' => match groups.pop() {
                    Some(('{', _)) if c == '}' => {}
                    Some(('(', _)) if c == ')' => {}
                    _ => return Err(ParseError::new(ParseErrorKind::UnbalancedGroup, idx)),
                },
                _ => {}
            }
            continue;
        }

        match c {
            '[' | ']' => {
                if let Some(start) = word_start.take() {
                    tokens.push(Token::Word(&input[start..idx], start..idx));
                }
                tokens.push(if c == '[' { Token::Open(idx) } else { Token::Close(idx) });
            }
            c if c.is_whitespace() => {
                if let Some(start) = word_start.take() {
                    tokens.push(Token::Word(&input[start..idx], start..idx));
                }
            }
            _ => {
                if word_start.is_none() {
                    word_start = Some(idx);
                }
                if matches!(c, '{' | '(') {
                    groups.push((c, idx));
                }
            }
        }
    }

    if let Some(&(_, offset)) = groups.first() {
        return Err(ParseError::new(ParseErrorKind::UnbalancedGroup, offset));
    }
    if let Some(start) = word_start {
        tokens.push(Token::Word(&input[start..], start..input.len()));
    }
    Ok(tokens)
}

/// Parse a qtree bracket string into a [`Tree`].
pub(crate) fn parse_tree(input: &str) -> Result<Tree, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = BracketParser { tokens, pos: 0, tree: Tree::with_capacity(16) };

    let open = match parser.peek() {
        None => return Err(ParseError::new(ParseErrorKind::Empty, 0)),
        Some(Token::Open(offset)) => *offset,
        Some(Token::Close(offset)) => return Err(ParseError::new(ParseErrorKind::UnmatchedClose, *offset)),
        Some(Token::Word(_, span)) => return Err(ParseError::new(ParseErrorKind::ExpectedOpen, span.start)),
    };
    parser.parse_bracket(open, None)?;

    match parser.peek() {
        None => Ok(parser.tree),
        Some(Token::Close(offset)) => Err(ParseError::new(ParseErrorKind::UnmatchedClose, *offset)),
        Some(Token::Open(offset)) => Err(ParseError::new(ParseErrorKind::TrailingInput, *offset)),
        Some(Token::Word(_, span)) => Err(ParseError::new(ParseErrorKind::TrailingInput, span.start)),
    }
}

struct BracketParser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    tree: Tree,
}

impl BracketParser<'_> {
    fn peek(&self) -> Option<&Token<'_>> {
        self.tokens.get(self.pos)
    }

    /// Parse `[.label child* ]`; the current token is the `[` at byte `open`.
    ///
    /// The outermost call is the one with no `parent`.
    fn parse_bracket(&mut self, open: usize, parent: Option<NodeId>) -> Result<NodeId, ParseError> {
        self.pos += 1;

        // The label must follow `[` with no space: `[.NP`, not `[ .NP`.
        let raw = match self.tokens.get(self.pos) {
            Some(&Token::Word(text, ref span)) if span.start == open + 1 && text.len() > 1 && text.starts_with('.') => {
                &text[1..]
            }
            _ => return Err(ParseError::new(ParseErrorKind::MissingLabel, open)),
        };
        self.pos += 1;

        let label = normalize(raw, parent.is_none()).map_err(|kind| ParseError::new(kind, open + 2))?;
        let id = self.tree.push(TreeNode { label, children: Vec::new(), parent, span: open..open, bracketed: true });

        let mut children = Vec::new();
        loop {
            match self.tokens.get(self.pos) {
                Some(&Token::Open(offset)) => children.push(self.parse_bracket(offset, Some(id))?),
                Some(Token::Word(text, span)) => {
                    let (text, span) = (*text, span.clone());
                    self.pos += 1;
                    let label = normalize(text, false).map_err(|kind| ParseError::new(kind, span.start))?;
                    children.push(self.tree.push(TreeNode {
                        label,
                        children: Vec::new(),
                        parent: Some(id),
                        span,
                        bracketed: false,
                    }));
                }
                Some(Token::Close(offset)) => {
                    let end = offset + 1;
                    self.pos += 1;
                    let node = self.tree.node_mut(id);
                    node.children = children;
                    node.span = open..end;
                    return Ok(id);
                }
                None => return Err(ParseError::new(ParseErrorKind::Unclosed, open)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kind_of(input: &str) -> ParseErrorKind {
        parse_tree(input).unwrap_err().kind
    }

    #[test]
    fn parses_nested_tree_in_preorder() {
        let tree = parse_tree("[.S [.NP [.N Andrew ] ] [.VP [.V hits ] [.NP [.N Mathis ] ] ] ]").unwrap();
        assert_eq!(tree.labels(), vec!["S", "NP", "N", "Andrew", "VP", "V", "hits", "NP", "N", "Mathis"]);
        assert_eq!(tree.height(), 4);

        let root = tree.node(tree.root());
        assert_eq!(root.children, vec![NodeId(1), NodeId(4)]);
        assert_eq!(root.parent, None);
        assert_eq!(tree.node(NodeId(3)).parent, Some(NodeId(2)));
        assert_eq!(tree.leaves().collect::<Vec<_>>(), vec![NodeId(3), NodeId(6), NodeId(9)]);
    }

    #[test]
    fn root_form_is_one_token() {
        let tree = parse_tree(r"[.\node(top){NP }; [.AP schuldiger ] [.N Idiot ] ]").unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.label.raw, r"\node(top){NP };");
        assert_eq!(root.label.display, "NP");
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn label_only_brackets_are_leaves() {
        let tree = parse_tree("[.XP [.1 ] [.S [.$t$ ] [.VP sleeps ] ] ]").unwrap();
        let index = tree.node(NodeId(1));
        assert!(index.is_leaf());
        assert!(index.bracketed);
        assert_eq!(index.label.key, "1");
        assert_eq!(tree.node(NodeId(3)).label.display, "$t$");
    }

    #[test]
    fn close_bracket_ends_a_token() {
        let tree = parse_tree("[.N Mathis]").unwrap();
        assert_eq!(tree.labels(), vec!["N", "Mathis"]);
        assert_eq!(tree.node(tree.root()).span, 0..11);
    }

    #[test]
    fn spans_cover_the_source() {
        let input = "[.S [.NP Andrew ] ]";
        let tree = parse_tree(input).unwrap();
        assert_eq!(&input[tree.node(NodeId(1)).span.clone()], "[.NP Andrew ]");
        assert_eq!(&input[tree.node(NodeId(2)).span.clone()], "Andrew");
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert_eq!(kind_of(""), ParseErrorKind::Empty);
        assert_eq!(kind_of("   "), ParseErrorKind::Empty);
        assert_eq!(kind_of("S [.NP a ]"), ParseErrorKind::ExpectedOpen);
        assert_eq!(kind_of("[.S [.NP Andrew ]"), ParseErrorKind::Unclosed);
        assert_eq!(kind_of("[.S a ] ]"), ParseErrorKind::UnmatchedClose);
        assert_eq!(kind_of("] [.S a ]"), ParseErrorKind::UnmatchedClose);
        assert_eq!(kind_of("[.S a ] [.T b ]"), ParseErrorKind::TrailingInput);
        assert_eq!(kind_of("[.S a ] b"), ParseErrorKind::TrailingInput);
        assert_eq!(kind_of("[S a ]"), ParseErrorKind::MissingLabel);
        assert_eq!(kind_of("[ .S a ]"), ParseErrorKind::MissingLabel);
        assert_eq!(kind_of("[. a ]"), ParseErrorKind::MissingLabel);
        assert_eq!(kind_of("[.S [ ] ]"), ParseErrorKind::MissingLabel);
        assert_eq!(kind_of(r"[.S [.\node(x){NP }; a ] ]"), ParseErrorKind::MisplacedRootNode);
        assert_eq!(kind_of(r"[.\node(top){S ; a ]"), ParseErrorKind::UnbalancedGroup);
    }

    #[test]
    fn group_closes_only_on_its_own_bracket() {
        assert_eq!(parse_tree("[.S a{b) ]").unwrap_err(), ParseError::new(ParseErrorKind::UnbalancedGroup, 7));
        assert_eq!(kind_of(r"[.\node(top}{S }; a ]"), ParseErrorKind::UnbalancedGroup);
        assert_eq!(kind_of("[.S f({x)} ]"), ParseErrorKind::UnbalancedGroup);

        let tree = parse_tree("[.S f({x}) g_{(1)} ]").unwrap();
        assert_eq!(tree.labels(), vec!["S", "f({x})", "g_{(1)}"]);
    }

    #[test]
    fn unbalanced_error_reports_the_opening_bracket() {
        let err = parse_tree("[.S [.NP [.N a ] ]").unwrap_err();
        assert_eq!(err, ParseError::new(ParseErrorKind::Unclosed, 0));
    }

    #[test]
    fn deep_nesting() {
        let depth = 500;
        let input = format!("{}leaf{}", "[.X ".repeat(depth), " ]".repeat(depth));
        let tree = parse_tree(&input).unwrap();
        assert_eq!(tree.len(), depth + 1);
        assert_eq!(tree.height(), depth);
    }

    #[derive(Debug, Clone)]
    enum Shape {
        Leaf(String),
        Node(String, Vec<Shape>),
    }

    impl Shape {
        fn render(&self, out: &mut String) {
            match self {
                Shape::Leaf(label) => out.push_str(label),
                Shape::Node(label, children) => {
                    out.push_str("[.");
                    out.push_str(label);
                    for child in children {
                        out.push(' ');
                        child.render(out);
                    }
                    out.push_str(" ]");
                }
            }
        }

        fn labels<'s>(&'s self, out: &mut Vec<&'s str>) {
            match self {
                Shape::Leaf(label) => out.push(label),
                Shape::Node(label, children) => {
                    out.push(label);
                    children.iter().for_each(|child| child.labels(out));
                }
            }
        }
    }

    fn label() -> impl Strategy<Value = String> {
        "[A-Za-z$'][A-Za-z0-9$'^_]{0,5}"
    }

    fn shape() -> impl Strategy<Value = Shape> {
        let leaf = label().prop_map(Shape::Leaf);
        leaf.prop_recursive(4, 48, 3, |inner| {
            (label(), prop::collection::vec(inner, 1..4)).prop_map(|(label, children)| Shape::Node(label, children))
        })
    }

    fn bracketed_tree() -> impl Strategy<Value = Shape> {
        (label(), prop::collection::vec(shape(), 0..4)).prop_map(|(label, children)| Shape::Node(label, children))
    }

    proptest! {
        #[test]
        fn label_sequence_survives_round_trip(shape in bracketed_tree()) {
            let mut input = String::new();
            shape.render(&mut input);
            let mut expected = Vec::new();
            shape.labels(&mut expected);

            let tree = parse_tree(&input).unwrap();
            prop_assert_eq!(tree.labels(), expected.clone());

            let reparsed = parse_tree(&tree.to_bracket()).unwrap();
            prop_assert_eq!(reparsed.labels(), expected);
        }
    }
}
