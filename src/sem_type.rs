//! Semantic types and node typings.
//!
//! A [`SemType`] is either atomic (`e`, `t`, `s`, ...) or functional, written
//! `<A,B>` for a function from `A` to `B`. Types are parsed once from their
//! authored string form when a lexicon is loaded; composition afterwards only
//! compares structured values.
//!
//! ```text
//! "<e, <e,t>>"  ──FromStr──▶  Function(e, Function(e, t))  ──Display──▶  "<e,<e,t>>"
//! ```

use crate::error::TypeSyntaxError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SemType {
    Atomic(String),
    Function(Box<SemType>, Box<SemType>),
}

impl SemType {
    pub fn atomic(name: impl Into<String>) -> Self {
        SemType::Atomic(name.into())
    }

    pub fn function(domain: SemType, codomain: SemType) -> Self {
        SemType::Function(Box::new(domain), Box::new(codomain))
    }

    /// Type `e` (individuals).
    pub fn entity() -> Self {
        Self::atomic("e")
    }

    /// Type `t` (truth values).
    pub fn truth() -> Self {
        Self::atomic("t")
    }

    /// Type `<e,t>`.
    pub fn predicate() -> Self {
        Self::function(Self::entity(), Self::truth())
    }

    pub fn is_function(&self) -> bool {
        matches!(self, SemType::Function(..))
    }

    /// Codomain of `self` applied to `argument`, if `self` is a function whose
    /// domain is exactly `argument`.
    pub fn apply(&self, argument: &SemType) -> Option<&SemType> {
        match self {
            SemType::Function(domain, codomain) if **domain == *argument => Some(codomain),
            _ => None,
        }
    }
}

impl fmt::Display for SemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemType::Atomic(name) => f.write_str(name),
            SemType::Function(domain, codomain) => write!(f, "<{domain},{codomain}>"),
        }
    }
}

impl FromStr for SemType {
    type Err = TypeSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cursor = TypeCursor { input: s, pos: 0 };
        let ty = cursor.parse_type()?;
        cursor.skip_whitespace();
        if cursor.pos < s.len() {
            return Err(TypeSyntaxError::Trailing { offset: cursor.pos });
        }
        Ok(ty)
    }
}

/// Recursive-descent reader over an authored type string.
struct TypeCursor<'a> {
    input: &'a str,
    pos: usize,
}

impl TypeCursor<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, want: char, expected: &'static str) -> Result<(), TypeSyntaxError> {
        self.skip_whitespace();
        let offset = self.pos;
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(found) => Err(TypeSyntaxError::UnexpectedChar { found, offset, expected }),
            None => Err(TypeSyntaxError::UnexpectedEnd { expected }),
        }
    }

    fn parse_type(&mut self) -> Result<SemType, TypeSyntaxError> {
        self.skip_whitespace();
        match self.peek() {
            Some('<') => {
                self.bump();
                let domain = self.parse_type()?;
                self.expect(',', "`,`")?;
                let codomain = self.parse_type()?;
                self.expect('>', "`>`")?;
                Ok(SemType::function(domain, codomain))
            }
            Some(c) if is_atom_char(c) => {
                let start = self.pos;
                while self.peek().is_some_and(is_atom_char) {
                    self.bump();
                }
                Ok(SemType::atomic(&self.input[start..self.pos]))
            }
            Some(found) => Err(TypeSyntaxError::UnexpectedChar { found, offset: self.pos, expected: "a type" }),
            None => Err(TypeSyntaxError::UnexpectedEnd { expected: "a type" }),
        }
    }
}

fn is_atom_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\''
}

/// What a node resolved to.
///
/// `Index` and `Vacuous` are the typings of binder indices and semantically
/// empty leaves; they only compose under the corresponding opt-in rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Typing {
    Type(SemType),
    Index,
    Vacuous,
    Error,
}

impl Typing {
    /// Rendering of [`Typing::Error`].
    pub const ERROR_MARKER: &'static str = "#";

    pub fn as_type(&self) -> Option<&SemType> {
        match self {
            Typing::Type(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Typing::Error)
    }
}

impl From<SemType> for Typing {
    fn from(ty: SemType) -> Self {
        Typing::Type(ty)
    }
}

impl fmt::Display for Typing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Typing::Type(ty) => ty.fmt(f),
            Typing::Index | Typing::Vacuous => f.write_str("-"),
            Typing::Error => f.write_str(Self::ERROR_MARKER),
        }
    }
}
