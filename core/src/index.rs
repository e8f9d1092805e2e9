use std::collections::HashMap;

/// Zero-based line number within a source document.
pub type LineNo = u32;
/// Document-wide token ordinal. Does not reset per line.
pub type Position = u32;

/// line -> positions of one token on that line, in scan order
pub type LinePositions = HashMap<LineNo, Vec<Position>>;
/// document id -> lines for one token
pub type TermPostings = HashMap<String, LinePositions>;

/// One analyzed source line: its number and the (position, token) pairs on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzedLine {
    pub line: LineNo,
    pub tokens: Vec<(Position, String)>,
}

impl AnalyzedLine {
    pub fn new(line: LineNo, tokens: Vec<(Position, String)>) -> Self {
        Self { line, tokens }
    }
}

/// Positional inverted index: token -> document -> line -> positions.
///
/// Built once by calling [`PostingsIndex::add_document`] for every document,
/// then only read. Adding the same document twice duplicates its postings;
/// callers are expected not to do that.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PostingsIndex {
    postings: HashMap<String, TermPostings>,
    total_occurrences: u64,
    num_docs: u64,
}

impl PostingsIndex {
    pub fn new() -> Self { Self::default() }

    /// Record every non-empty token of `lines` under `doc_id`.
    pub fn add_document(&mut self, doc_id: &str, lines: &[AnalyzedLine]) {
        for line in lines {
            for (position, token) in &line.tokens {
                if token.is_empty() { continue; }
                self.postings
                    .entry(token.clone())
                    .or_default()
                    .entry(doc_id.to_string())
                    .or_default()
                    .entry(line.line)
                    .or_default()
                    .push(*position);
                self.total_occurrences += 1;
            }
        }
        self.num_docs += 1;
    }

    /// Postings for `token`, or `None` if it was never indexed.
    pub fn lookup(&self, token: &str) -> Option<&TermPostings> {
        self.postings.get(token)
    }

    pub fn distinct_term_count(&self) -> usize { self.postings.len() }

    pub fn total_occurrence_count(&self) -> u64 { self.total_occurrences }

    /// Number of `add_document` calls made while building.
    pub fn document_count(&self) -> u64 { self.num_docs }

    /// Every indexed token, in no particular order.
    pub fn all_terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&String, &TermPostings)> {
        self.postings.iter()
    }

    pub(crate) fn from_parts(postings: HashMap<String, TermPostings>, total_occurrences: u64, num_docs: u64) -> Self {
        Self { postings, total_occurrences, num_docs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: LineNo, start: Position, text: &str) -> AnalyzedLine {
        let tokens = text
            .split_whitespace()
            .enumerate()
            .map(|(i, t)| (start + i as Position, t.to_string()))
            .collect();
        AnalyzedLine::new(n, tokens)
    }

    #[test]
    fn lookup_maps_token_to_document_line_and_position() {
        let mut index = PostingsIndex::new();
        index.add_document("1", &[line(0, 0, "cat sat"), line(1, 2, "on the cat")]);

        let cat = index.lookup("cat").unwrap();
        let lines = &cat["1"];
        assert_eq!(lines[&0], vec![0]);
        assert_eq!(lines[&1], vec![4]);
        assert!(index.lookup("dog").is_none());
    }

    #[test]
    fn repeated_token_on_one_line_appends_in_scan_order() {
        let mut index = PostingsIndex::new();
        index.add_document("a", &[line(3, 10, "x y x x")]);
        assert_eq!(index.lookup("x").unwrap()["a"][&3], vec![10, 12, 13]);
        assert_eq!(index.total_occurrence_count(), 4);
        assert_eq!(index.distinct_term_count(), 2);
    }

    #[test]
    fn empty_tokens_are_skipped_and_not_counted() {
        let mut index = PostingsIndex::new();
        let l = AnalyzedLine::new(0, vec![(0, "".into()), (1, "word".into()), (2, "".into())]);
        index.add_document("d", &[l]);
        assert_eq!(index.total_occurrence_count(), 1);
        assert_eq!(index.distinct_term_count(), 1);
        assert!(index.lookup("").is_none());
    }

    #[test]
    fn aggregate_counts_do_not_depend_on_insertion_order() {
        let docs = vec![
            ("1", vec![line(0, 0, "cat sat mat")]),
            ("2", vec![line(0, 0, "cat ran far"), line(1, 3, "far far away")]),
            ("3", vec![line(0, 0, "dog")]),
        ];
        let mut forward = PostingsIndex::new();
        for (id, lines) in &docs { forward.add_document(id, lines); }
        let mut backward = PostingsIndex::new();
        for (id, lines) in docs.iter().rev() { backward.add_document(id, lines); }

        assert_eq!(forward.distinct_term_count(), backward.distinct_term_count());
        assert_eq!(forward.total_occurrence_count(), backward.total_occurrence_count());
        assert_eq!(forward.distinct_term_count(), 7);
        assert_eq!(forward.total_occurrence_count(), 10);
        assert_eq!(forward, backward);
    }

    #[test]
    fn all_terms_lists_each_token_once() {
        let mut index = PostingsIndex::new();
        index.add_document("1", &[line(0, 0, "b a b")]);
        let mut terms: Vec<&str> = index.all_terms().collect();
        terms.sort();
        assert_eq!(terms, vec!["a", "b"]);
    }
}
