//! AND-filtering of documents and per-document occurrence gathering.

use crate::index::{LineNo, LinePositions, Position, PostingsIndex, TermPostings};
use crate::query::QueryTerms;
use std::collections::{HashMap, HashSet};

/// Documents containing every query term.
///
/// Empty as soon as one term is missing from the index, and empty for an
/// empty query.
pub fn candidate_documents<'a>(index: &'a PostingsIndex, terms: &QueryTerms) -> HashSet<&'a str> {
    let mut postings: Vec<&'a TermPostings> = Vec::with_capacity(terms.len());
    for term in terms.iter() {
        match index.lookup(term) {
            Some(p) => postings.push(p),
            None => return HashSet::new(),
        }
    }
    postings.sort_by_key(|p| p.len());
    let Some((smallest, rest)) = postings.split_first() else {
        return HashSet::new();
    };
    smallest
        .keys()
        .map(String::as_str)
        .filter(|doc| rest.iter().all(|p| p.contains_key(*doc)))
        .collect()
}

/// Where each query term occurs in one candidate document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocOccurrences {
    /// One list per query term, in query order. Lines follow the shared line
    /// order and positions keep their per-line insertion order.
    pub positions: Vec<Vec<Position>>,
    /// Line on which each collected position sits.
    pub line_of: HashMap<Position, LineNo>,
}

impl DocOccurrences {
    /// Lines touched by `picked`, ascending and deduplicated.
    pub fn lines_for(&self, picked: &[Position]) -> Vec<LineNo> {
        let mut lines: Vec<LineNo> = picked.iter().filter_map(|p| self.line_of.get(p).copied()).collect();
        lines.sort_unstable();
        lines.dedup();
        lines
    }
}

/// Gather positions for every term in `doc_id`.
///
/// All terms are flattened along one shared line order: lines in the order
/// they are first reached walking the terms in query order, each term's lines
/// ascending. That order decides which of several equally close combinations
/// is found first.
pub fn collect_occurrences(index: &PostingsIndex, terms: &QueryTerms, doc_id: &str) -> DocOccurrences {
    let per_term: Vec<Option<&LinePositions>> =
        terms.iter().map(|t| index.lookup(t).and_then(|p| p.get(doc_id))).collect();

    let mut line_order: Vec<LineNo> = Vec::new();
    let mut seen: HashSet<LineNo> = HashSet::new();
    for lines in per_term.iter().flatten() {
        let mut line_nos: Vec<LineNo> = lines.keys().copied().collect();
        line_nos.sort_unstable();
        line_order.extend(line_nos.into_iter().filter(|l| seen.insert(*l)));
    }

    let mut occ = DocOccurrences { positions: Vec::with_capacity(terms.len()), line_of: HashMap::new() };
    for lines in &per_term {
        let mut flat = Vec::new();
        if let Some(lines) = lines {
            for line in &line_order {
                for &pos in lines.get(line).into_iter().flatten() {
                    flat.push(pos);
                    occ.line_of.insert(pos, *line);
                }
            }
        }
        occ.positions.push(flat);
    }
    occ
}
