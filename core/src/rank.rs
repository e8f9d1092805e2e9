//! Proximity and term-order ranking of candidate documents.
//!
//! Documents are ordered by `(distance, order, document id)`, all ascending.
//! The distance of a combination is the sum of gaps between consecutive picks
//! taken in query order, so for three or more terms it is a path length rather
//! than the true spread of the picked positions.

use crate::candidates::{candidate_documents, collect_occurrences};
use crate::index::{LineNo, Position, PostingsIndex};
use crate::query::QueryTerms;
use std::cmp::Ordering;

/// Best combination found for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proximity {
    pub distance: u64,
    /// One position per term, in query order.
    pub positions: Vec<Position>,
}

/// Minimum path-sum over the Cartesian product of `positions`.
///
/// Combinations are visited in lexicographic order (last term varies fastest)
/// and the first one reaching the minimum wins. Returns `None` when any term
/// has no positions. Cost is the product of the list lengths.
pub fn min_distance(positions: &[Vec<Position>]) -> Option<Proximity> {
    if positions.is_empty() || positions.iter().any(Vec::is_empty) {
        return None;
    }
    let mut cursor = vec![0usize; positions.len()];
    let mut best: Option<Proximity> = None;
    loop {
        let distance = path_sum(positions, &cursor);
        if best.as_ref().map_or(true, |b| distance < b.distance) {
            let picked = cursor.iter().zip(positions).map(|(&i, list)| list[i]).collect();
            best = Some(Proximity { distance, positions: picked });
        }
        if !advance(&mut cursor, positions) {
            break;
        }
    }
    best
}

fn path_sum(positions: &[Vec<Position>], cursor: &[usize]) -> u64 {
    cursor
        .windows(2)
        .zip(positions.windows(2))
        .map(|(c, p)| u64::from(p[0][c[0]].abs_diff(p[1][c[1]])))
        .sum()
}

// odometer step; false once every combination has been visited
fn advance(cursor: &mut [usize], positions: &[Vec<Position>]) -> bool {
    for slot in (0..cursor.len()).rev() {
        cursor[slot] += 1;
        if cursor[slot] < positions[slot].len() {
            return true;
        }
        cursor[slot] = 0;
    }
    false
}

/// How many terms can be matched in strictly increasing position order,
/// greedily taking each term's first position past the previous match.
/// A term with nothing past the cursor is skipped and the cursor stays put.
pub fn in_order_count(positions: &[Vec<Position>]) -> usize {
    let mut order = 0;
    let mut cursor: Option<Position> = None;
    for list in positions {
        let mut sorted = list.clone();
        sorted.sort_unstable();
        if let Some(&next) = sorted.iter().find(|&&p| cursor.map_or(true, |c| p > c)) {
            order += 1;
            cursor = Some(next);
        }
    }
    order
}

/// Total order on document ids: numeric ids first, by value, then the rest
/// lexicographically.
pub fn compare_doc_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedDoc {
    pub doc_id: String,
    pub distance: u64,
    pub order: usize,
    /// Lines touched by the best combination, ascending.
    pub lines: Vec<LineNo>,
}

impl RankedDoc {
    fn cmp_key(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then(self.order.cmp(&other.order))
            .then_with(|| compare_doc_ids(&self.doc_id, &other.doc_id))
    }
}

/// Score one candidate document.
pub fn rank_document(index: &PostingsIndex, terms: &QueryTerms, doc_id: &str) -> RankedDoc {
    let occ = collect_occurrences(index, terms, doc_id);
    match min_distance(&occ.positions) {
        Some(best) => RankedDoc {
            doc_id: doc_id.to_string(),
            distance: best.distance,
            order: in_order_count(&occ.positions),
            lines: occ.lines_for(&best.positions),
        },
        None => RankedDoc { doc_id: doc_id.to_string(), distance: u64::MAX, order: 0, lines: Vec::new() },
    }
}

/// Run the whole pipeline for `terms`: filter, score and sort.
pub fn rank(index: &PostingsIndex, terms: &QueryTerms) -> Vec<RankedDoc> {
    let mut ranked: Vec<RankedDoc> = candidate_documents(index, terms)
        .into_iter()
        .map(|doc| rank_document(index, terms, doc))
        .collect();
    ranked.sort_by(RankedDoc::cmp_key);
    tracing::debug!(terms = terms.len(), hits = ranked.len(), "ranked candidates");
    ranked
}
