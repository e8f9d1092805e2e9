//! Single-pass index construction over a directory of text documents.

use crate::analyzer::Analyzer;
use crate::index::{AnalyzedLine, LineNo, Position, PostingsIndex};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Analyze a document line by line.
///
/// Every raw line gets a line number, blank ones included. Positions count only
/// the non-empty analyzer outputs and keep running across lines.
pub fn analyze_document<R: BufRead>(analyzer: &dyn Analyzer, reader: R) -> Result<Vec<AnalyzedLine>> {
    let mut lines = Vec::new();
    let mut next_pos: Position = 0;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let tokens: Vec<(Position, String)> = analyzer
            .analyze(&line)
            .into_iter()
            .filter(|t| !t.is_empty())
            .enumerate()
            .map(|(i, t)| (next_pos + i as Position, t))
            .collect();
        next_pos += tokens.len() as Position;
        lines.push(AnalyzedLine::new(line_no as LineNo, tokens));
    }
    Ok(lines)
}

/// Regular files directly inside `docs_dir`, sorted by name.
pub fn list_documents(docs_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(docs_dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("reading {}", docs_dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Index every document in `docs_dir`. The file name is the document id.
///
/// Returns the index and the canonical documents root. Any unreadable
/// document aborts the build.
pub fn build_index(docs_dir: &Path, analyzer: &dyn Analyzer) -> Result<(PostingsIndex, PathBuf)> {
    let root = fs::canonicalize(docs_dir).with_context(|| format!("resolving {}", docs_dir.display()))?;
    let mut index = PostingsIndex::new();
    for path in list_documents(&root)? {
        let doc_id = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        let f = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        let lines = analyze_document(analyzer, BufReader::new(f)).with_context(|| format!("reading {}", path.display()))?;
        index.add_document(&doc_id, &lines);
        tracing::debug!(doc_id = %doc_id, lines = lines.len(), "indexed document");
    }
    tracing::info!(
        num_docs = index.document_count(),
        num_tokens = index.total_occurrence_count(),
        num_terms = index.distinct_term_count(),
        "ingested documents"
    );
    Ok((index, root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::WhitespaceAnalyzer;
    use tempfile::tempdir;

    #[test]
    fn positions_continue_across_lines() {
        let lines = analyze_document(&WhitespaceAnalyzer, "a b\nc\n\nd e".as_bytes()).unwrap();
        let flat: Vec<(LineNo, Position)> = lines
            .iter()
            .flat_map(|l| l.tokens.iter().map(move |(p, _)| (l.line, *p)))
            .collect();
        assert_eq!(flat, vec![(0, 0), (0, 1), (1, 2), (3, 3), (3, 4)]);
    }

    #[test]
    fn builds_from_directory_using_file_names_as_ids() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("1"), "cat sat mat\n").unwrap();
        fs::write(dir.path().join("2"), "cat ran far\nfar away\n").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("3"), "ignored\n").unwrap();

        let (index, root) = build_index(dir.path(), &WhitespaceAnalyzer).unwrap();
        assert_eq!(root, fs::canonicalize(dir.path()).unwrap());
        assert_eq!(index.document_count(), 2);
        assert_eq!(index.total_occurrence_count(), 8);
        assert_eq!(index.distinct_term_count(), 6);
        assert_eq!(index.lookup("far").unwrap()["2"][&1], vec![3]);
        assert!(index.lookup("ignored").is_none());
    }

    #[test]
    fn missing_directory_fails() {
        let dir = tempdir().unwrap();
        assert!(build_index(&dir.path().join("nope"), &WhitespaceAnalyzer).is_err());
    }
}
