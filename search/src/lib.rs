use anyhow::{Context, Result};
use lineseek_core::persist::{load_index, load_meta, IndexPaths, LoadedIndex};
use lineseek_core::snippet::extract_lines;
use lineseek_core::{rank, Analyzer, OutputMode, PostingsIndex, Query};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Answers queries against one loaded index.
///
/// The index is read-only once loaded, so a `Searcher` can be shared between
/// threads by reference.
pub struct Searcher {
    index: PostingsIndex,
    analyzer: Box<dyn Analyzer>,
    source_root: PathBuf,
}

impl Searcher {
    pub fn open<P: AsRef<Path>>(index_dir: P) -> Result<Self> {
        let loaded = load_index(&IndexPaths::new(index_dir))?;
        Ok(Self::from_loaded(loaded))
    }

    pub fn from_loaded(loaded: LoadedIndex) -> Self {
        Self { index: loaded.index, analyzer: loaded.analyzer.analyzer(), source_root: loaded.source_root }
    }

    /// Read snippet lines from `root` instead of the directory recorded at build time.
    pub fn with_source_root(mut self, root: PathBuf) -> Self {
        self.source_root = root;
        self
    }

    pub fn index(&self) -> &PostingsIndex { &self.index }

    /// Output lines for one raw query, in rank order.
    ///
    /// Plain queries give one document id per line. Queries starting with
    /// `"> "` give `"> <id>"` followed by that document's best-matching lines.
    pub fn search(&self, raw: &str) -> Result<Vec<String>> {
        let query = Query::parse(raw, self.analyzer.as_ref());
        tracing::debug!(query = raw, terms = ?query.terms.as_slice(), "parsed query");
        let ranked = rank(&self.index, &query.terms);

        let mut out = Vec::new();
        match query.mode {
            OutputMode::Plain => out.extend(ranked.into_iter().map(|r| r.doc_id)),
            OutputMode::Snippet => {
                for hit in ranked {
                    let path = self.source_root.join(&hit.doc_id);
                    let f = File::open(&path).with_context(|| format!("opening source document {}", path.display()))?;
                    let lines = extract_lines(BufReader::new(f), &hit.lines)
                        .with_context(|| format!("reading source document {}", path.display()))?;
                    out.push(format!("> {}", hit.doc_id));
                    out.extend(lines);
                }
            }
        }
        Ok(out)
    }

    /// Every indexed term, sorted.
    pub fn sorted_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.index.all_terms().collect();
        terms.sort_unstable();
        terms
    }
}

/// Build totals recorded in the index directory's `meta.json`.
pub fn stored_stats<P: AsRef<Path>>(index_dir: P) -> Result<Vec<String>> {
    let paths = IndexPaths::new(index_dir);
    let meta = load_meta(&paths).with_context(|| format!("reading build summary in {}", paths.root.display()))?;
    Ok(vec![
        format!("Total number of documents: {}", meta.num_docs),
        format!("Total number of tokens: {}", meta.num_tokens),
        format!("Total number of terms: {}", meta.num_terms),
        format!("Analyzer: {}", meta.analyzer),
        format!("Created at: {}", meta.created_at),
    ])
}
