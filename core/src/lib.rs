pub mod analyzer;
pub mod build;
pub mod candidates;
pub mod index;
pub mod persist;
pub mod query;
pub mod rank;
pub mod snippet;

pub use analyzer::{Analyzer, AnalyzerKind};
pub use index::*;
pub use query::{OutputMode, Query, QueryTerms};
pub use rank::{rank, RankedDoc};
