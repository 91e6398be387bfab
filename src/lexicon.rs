//! Lexicon loading and lookup.
//!
//! Lexicons are authored the way linguists write them down: one semantic type
//! per entry, listing the words that carry it.
//!
//! ```json
//! { "e": ["Andrew", "Mathis"], "<e,t>": ["hits", "that_{RP}"], "trace": ["$t$"] }
//! ```
//!
//! Loading inverts that into `key -> candidates`, parsing every type string
//! once. A key listed under several types becomes an ambiguous leaf whose
//! candidates the composition engine narrows down later.
//!
//! A few authored type strings are reserved:
//!
//! - `trace` / `pron`: a trace or pronoun, type `e`.
//! - `index`: a binder index, consumed by predicate abstraction.
//! - `""`: a semantically vacuous word.

use crate::engine::Rule;
use crate::error::LexiconError;
use crate::sem_type::{SemType, Typing};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LexicalEntry {
    Typed(SemType),
    Trace,
    Index,
    Vacuous,
}

impl LexicalEntry {
    /// Interpret an authored type string, honoring the reserved words.
    pub fn parse(authored: &str) -> Result<Self, LexiconError> {
        match authored.trim() {
            "" => Ok(LexicalEntry::Vacuous),
            "trace" | "pron" => Ok(LexicalEntry::Trace),
            "index" => Ok(LexicalEntry::Index),
            other => other
                .parse()
                .map(LexicalEntry::Typed)
                .map_err(|source| LexiconError::InvalidType { ty: authored.to_string(), source }),
        }
    }

    pub fn typing(&self) -> Typing {
        match self {
            LexicalEntry::Typed(ty) => Typing::Type(ty.clone()),
            LexicalEntry::Trace => Typing::Type(SemType::entity()),
            LexicalEntry::Index => Typing::Index,
            LexicalEntry::Vacuous => Typing::Vacuous,
        }
    }

    /// Rule tag a leaf carrying this entry is annotated with.
    pub fn rule(&self) -> Rule {
        match self {
            LexicalEntry::Typed(_) => Rule::Lexical,
            LexicalEntry::Trace => Rule::Trace,
            LexicalEntry::Index | LexicalEntry::Vacuous => Rule::Empty,
        }
    }
}

impl fmt::Display for LexicalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexicalEntry::Typed(ty) => ty.fmt(f),
            LexicalEntry::Trace => f.write_str("trace"),
            LexicalEntry::Index => f.write_str("index"),
            LexicalEntry::Vacuous => f.write_str("vacuous"),
        }
    }
}

/// Outcome of looking a key up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Gap,
    Unique(&'a LexicalEntry),
    Ambiguous(&'a [LexicalEntry]),
}

/// Inverted lexicon: exact-case lookup key to candidate entries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "BTreeMap<String, Vec<String>>")]
pub struct Lexicon {
    entries: HashMap<String, Vec<LexicalEntry>>,
    /// Lowercased key to every exact-case key that folds to it.
    folded: HashMap<String, Vec<String>>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from authored `(type, keys)` pairs.
    pub fn from_entries<I, T, K>(entries: I) -> Result<Self, LexiconError>
    where
        I: IntoIterator<Item = (T, K)>,
        T: AsRef<str>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        let mut lexicon = Self::new();
        for (ty, keys) in entries {
            lexicon.insert(ty.as_ref(), keys)?;
        }
        Ok(lexicon)
    }

    /// Load from a JSON object mapping type strings to arrays of keys.
    pub fn from_json(json: &str) -> Result<Self, LexiconError> {
        let authored: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        Self::try_from(authored)
    }

    /// Register every key in `keys` under the authored type `ty`.
    pub fn insert<K>(&mut self, ty: &str, keys: K) -> Result<(), LexiconError>
    where
        K: IntoIterator,
        K::Item: Into<String>,
    {
        let entry = LexicalEntry::parse(ty)?;
        for key in keys {
            self.insert_entry(key, entry.clone());
        }
        Ok(())
    }

    /// Register a single already-parsed entry. Duplicates are ignored.
    pub fn insert_entry(&mut self, key: impl Into<String>, entry: LexicalEntry) {
        let key = key.into();
        let candidates = self.entries.entry(key.clone()).or_default();
        if candidates.contains(&entry) {
            return;
        }
        candidates.push(entry);

        let variants = self.folded.entry(key.to_lowercase()).or_default();
        if !variants.contains(&key) {
            variants.push(key);
        }
    }

    /// Candidate entries for `key` (exact case), in authoring order.
    pub fn candidates(&self, key: &str) -> &[LexicalEntry] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn resolve(&self, key: &str) -> Lookup<'_> {
        match self.candidates(key) {
            [] => Lookup::Gap,
            [entry] => Lookup::Unique(entry),
            entries => Lookup::Ambiguous(entries),
        }
    }

    /// Keys that differ from `key` only in case.
    pub fn case_variants(&self, key: &str) -> Vec<&str> {
        self.folded
            .get(&key.to_lowercase())
            .map(|variants| variants.iter().map(String::as_str).filter(|variant| *variant != key).collect())
            .unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<BTreeMap<String, Vec<String>>> for Lexicon {
    type Error = LexiconError;

    fn try_from(authored: BTreeMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        Self::from_entries(authored)
    }
}

impl FromStr for Lexicon {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_types_to_keys() {
        let lexicon = crate::lexicon! {
            "e" => ["Andrew", "Mathis"],
            "<e,t>" => ["hits"],
        }
        .unwrap();

        assert_eq!(lexicon.len(), 3);
        assert_eq!(lexicon.resolve("Andrew"), Lookup::Unique(&LexicalEntry::Typed(SemType::entity())));
        assert_eq!(lexicon.resolve("hits"), Lookup::Unique(&LexicalEntry::Typed(SemType::predicate())));
        assert_eq!(lexicon.resolve("Peter"), Lookup::Gap);
    }

    #[test]
    fn key_under_two_types_is_ambiguous() {
        let lexicon = crate::lexicon! {
            "e" => ["that"],
            "<e,t>" => ["that", "that"],
        }
        .unwrap();

        let Lookup::Ambiguous(entries) = lexicon.resolve("that") else {
            panic!("expected ambiguous lookup");
        };
        assert_eq!(entries, &[LexicalEntry::Typed(SemType::entity()), LexicalEntry::Typed(SemType::predicate())]);
    }

    #[test]
    fn lookup_is_case_sensitive_but_reports_variants() {
        let lexicon = crate::lexicon! { "e" => ["Andrew", "ANDREW"] }.unwrap();

        assert!(lexicon.candidates("andrew").is_empty());
        assert_eq!(lexicon.case_variants("andrew"), vec!["Andrew", "ANDREW"]);
        assert_eq!(lexicon.case_variants("Andrew"), vec!["ANDREW"]);
        assert!(lexicon.case_variants("Mathis").is_empty());
    }

    #[test]
    fn reserved_type_words() {
        let lexicon = crate::lexicon! {
            "trace" => ["$t$"],
            "pron" => ["she"],
            "index" => ["1"],
            "" => ["wo"],
        }
        .unwrap();

        assert_eq!(lexicon.candidates("$t$"), &[LexicalEntry::Trace]);
        assert_eq!(lexicon.candidates("she")[0].typing(), Typing::Type(SemType::entity()));
        assert_eq!(lexicon.candidates("1")[0].rule(), Rule::Empty);
        assert_eq!(lexicon.candidates("wo")[0].typing(), Typing::Vacuous);
    }

    #[test]
    fn loads_json() {
        let lexicon: Lexicon = r#"{"e": ["Andrew"], "<e, <e,t>>": ["hits"]}"#.parse().unwrap();
        assert_eq!(lexicon.candidates("hits")[0].to_string(), "<e,<e,t>>");
    }

    #[test]
    fn deserializes_inside_other_documents() {
        #[derive(Deserialize)]
        struct Fixture {
            lexicon: Lexicon,
        }

        let fixture: Fixture = serde_json::from_str(r#"{"lexicon": {"trace": ["$t$"], "e": ["Andrew"]}}"#).unwrap();
        assert_eq!(fixture.lexicon.len(), 2);
        assert!(fixture.lexicon.contains_key("$t$"));

        assert!(serde_json::from_str::<Fixture>(r#"{"lexicon": {"<e": ["x"]}}"#).is_err());
    }

    #[test]
    fn malformed_type_fails_to_load() {
        let err = Lexicon::from_json(r#"{"<e,t": ["hits"]}"#).unwrap_err();
        assert!(matches!(err, LexiconError::InvalidType { ref ty, .. } if ty == "<e,t"));

        let err = Lexicon::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, LexiconError::Json(_)));
    }
}
