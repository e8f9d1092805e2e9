use crate::analyzer::Analyzer;
use std::collections::HashSet;

/// Prefix that switches a query into snippet mode.
pub const SNIPPET_PREFIX: &str = "> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Document ids only.
    Plain,
    /// Document ids followed by the best-matching source lines.
    Snippet,
}

/// Distinct query terms in first-occurrence order.
///
/// Repeating a term adds nothing to candidate filtering or position
/// gathering, so duplicates are removed here, once, when the query is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTerms(Vec<String>);

impl QueryTerms {
    /// Drop empty tokens and later repeats of a token.
    pub fn from_tokens<I: IntoIterator<Item = String>>(tokens: I) -> Self {
        let mut seen = HashSet::new();
        let terms = tokens
            .into_iter()
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(t.clone()))
            .collect();
        QueryTerms(terms)
    }

    pub fn as_slice(&self) -> &[String] { &self.0 }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn iter(&self) -> std::slice::Iter<'_, String> { self.0.iter() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub mode: OutputMode,
    pub terms: QueryTerms,
}

impl Query {
    pub fn parse(raw: &str, analyzer: &dyn Analyzer) -> Self {
        let (mode, text) = match raw.strip_prefix(SNIPPET_PREFIX) {
            Some(rest) => (OutputMode::Snippet, rest),
            None => (OutputMode::Plain, raw),
        };
        Query { mode, terms: QueryTerms::from_tokens(analyzer.analyze(text)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::WhitespaceAnalyzer;

    #[test]
    fn plain_query_keeps_terms_in_order() {
        let q = Query::parse("cat mat", &WhitespaceAnalyzer);
        assert_eq!(q.mode, OutputMode::Plain);
        assert_eq!(q.terms.as_slice(), ["cat", "mat"]);
    }

    #[test]
    fn prefix_selects_snippet_mode_and_is_stripped() {
        let q = Query::parse("> Cat mat", &WhitespaceAnalyzer);
        assert_eq!(q.mode, OutputMode::Snippet);
        assert_eq!(q.terms.as_slice(), ["cat", "mat"]);
    }

    #[test]
    fn prefix_without_space_is_an_ordinary_token() {
        let q = Query::parse(">cat", &WhitespaceAnalyzer);
        assert_eq!(q.mode, OutputMode::Plain);
        assert_eq!(q.terms.as_slice(), [">cat"]);
    }

    #[test]
    fn duplicates_collapse_to_first_occurrence() {
        let terms = QueryTerms::from_tokens(["b", "a", "", "b", "c", "a"].map(String::from));
        assert_eq!(terms.as_slice(), ["b", "a", "c"]);
    }
}
