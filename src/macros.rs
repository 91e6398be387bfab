/// Lazily compiled, process-wide regex for a literal pattern.
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).expect("invalid built-in pattern"));
        &*RE
    }};
}

/// Build a [`Lexicon`](crate::Lexicon) from authored `type => [keys]` pairs.
///
/// Evaluates to `Result<Lexicon, LexiconError>` since type strings are parsed
/// eagerly.
///
/// ```
/// let lexicon = typetree::lexicon! {
///     "e" => ["Andrew", "Mathis"],
///     "<e,t>" => ["hits"],
/// }
/// .unwrap();
/// assert_eq!(lexicon.candidates("hits").len(), 1);
/// ```
#[macro_export]
macro_rules! lexicon {
    ( $( $ty:expr => [ $($key:expr),* $(,)? ] ),* $(,)? ) => {
        $crate::Lexicon::from_entries(::std::vec![ $( ($ty, ::std::vec![ $($key),* ]) ),* ])
    };
}
