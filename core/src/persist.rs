use crate::analyzer::AnalyzerKind;
use crate::index::{LineNo, Position, PostingsIndex, TermPostings};
use anyhow::{bail, Context, Result};
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Bumped whenever [`IndexFile`] changes shape.
pub const INDEX_FORMAT_VERSION: u32 = 1;
const BLOB_EXTENSION: &str = "bin";

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u64,
    pub num_tokens: u64,
    pub num_terms: u64,
    pub analyzer: AnalyzerKind,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn blob(&self) -> PathBuf { self.root.join("index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }

    /// First `*.bin` file of the index directory by file name.
    pub fn find_blob(&self) -> Result<PathBuf> {
        let mut blobs: Vec<PathBuf> = fs::read_dir(&self.root)
            .with_context(|| format!("reading index directory {}", self.root.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()) == Some(BLOB_EXTENSION))
            .collect();
        blobs.sort();
        match blobs.into_iter().next() {
            Some(p) => Ok(p),
            None => bail!("no index file (*.{BLOB_EXTENSION}) in {}", self.root.display()),
        }
    }
}

/// Everything needed to answer queries, loaded as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedIndex {
    pub index: PostingsIndex,
    pub analyzer: AnalyzerKind,
    /// Directory holding the indexed source documents.
    pub source_root: PathBuf,
}

// On-disk schema. Kept apart from PostingsIndex so the in-memory layout can
// change without touching the file format.
#[derive(Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    analyzer: AnalyzerKind,
    source_root: PathBuf,
    num_docs: u64,
    total_occurrences: u64,
    terms: Vec<StoredTerm>,
}

#[derive(Serialize, Deserialize)]
struct StoredTerm {
    token: String,
    docs: Vec<StoredDoc>,
}

#[derive(Serialize, Deserialize)]
struct StoredDoc {
    doc_id: String,
    lines: Vec<(LineNo, Vec<Position>)>,
}

impl IndexFile {
    fn from_index(loaded: &LoadedIndex) -> Self {
        let mut terms: Vec<StoredTerm> = loaded
            .index
            .iter()
            .map(|(token, postings)| {
                let mut docs: Vec<StoredDoc> = postings
                    .iter()
                    .map(|(doc_id, lines)| {
                        let mut lines: Vec<(LineNo, Vec<Position>)> =
                            lines.iter().map(|(l, p)| (*l, p.clone())).collect();
                        lines.sort_by_key(|(l, _)| *l);
                        StoredDoc { doc_id: doc_id.clone(), lines }
                    })
                    .collect();
                docs.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));
                StoredTerm { token: token.clone(), docs }
            })
            .collect();
        terms.sort_by(|a, b| a.token.cmp(&b.token));
        IndexFile {
            version: INDEX_FORMAT_VERSION,
            analyzer: loaded.analyzer,
            source_root: loaded.source_root.clone(),
            num_docs: loaded.index.document_count(),
            total_occurrences: loaded.index.total_occurrence_count(),
            terms,
        }
    }

    fn into_index(self) -> LoadedIndex {
        let postings: HashMap<String, TermPostings> = self
            .terms
            .into_iter()
            .map(|t| {
                let docs: TermPostings = t.docs.into_iter().map(|d| (d.doc_id, d.lines.into_iter().collect())).collect();
                (t.token, docs)
            })
            .collect();
        LoadedIndex {
            index: PostingsIndex::from_parts(postings, self.total_occurrences, self.num_docs),
            analyzer: self.analyzer,
            source_root: self.source_root,
        }
    }
}

pub fn save_index(paths: &IndexPaths, loaded: &LoadedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.blob()).with_context(|| format!("creating {}", paths.blob().display()))?;
    let bytes = bincode::serialize(&IndexFile::from_index(loaded))?;
    f.write_all(&bytes)?;
    Ok(())
}

/// Load the whole index. Fails on a version mismatch or a damaged blob.
pub fn load_index(paths: &IndexPaths) -> Result<LoadedIndex> {
    let path = paths.find_blob()?;
    let mut f = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;

    // version tag is the first field, check it before decoding the rest
    let version: u32 = bincode::deserialize(&buf).with_context(|| format!("reading version of {}", path.display()))?;
    if version != INDEX_FORMAT_VERSION {
        bail!("{} has format version {version}, expected {INDEX_FORMAT_VERSION}", path.display());
    }
    let file: IndexFile = bincode::options()
        .with_fixint_encoding()
        .reject_trailing_bytes()
        .deserialize(&buf)
        .with_context(|| format!("decoding {}", path.display()))?;
    let loaded = file.into_index();
    tracing::info!(
        path = %path.display(),
        num_docs = loaded.index.document_count(),
        num_terms = loaded.index.distinct_term_count(),
        "loaded index"
    );
    Ok(loaded)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Summary written next to the blob for humans and tooling.
pub fn meta_for(loaded: &LoadedIndex) -> MetaFile {
    MetaFile {
        num_docs: loaded.index.document_count(),
        num_tokens: loaded.index.total_occurrence_count(),
        num_terms: loaded.index.distinct_term_count() as u64,
        analyzer: loaded.analyzer,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: INDEX_FORMAT_VERSION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::AnalyzedLine;
    use tempfile::tempdir;

    fn sample() -> LoadedIndex {
        let mut index = PostingsIndex::new();
        index.add_document("1", &[AnalyzedLine::new(0, vec![(0, "cat".into()), (1, "sat".into())])]);
        index.add_document("2", &[
            AnalyzedLine::new(0, vec![(0, "cat".into())]),
            AnalyzedLine::new(2, vec![(1, "cat".into())]),
        ]);
        LoadedIndex { index, analyzer: AnalyzerKind::Whitespace, source_root: PathBuf::from("/docs") }
    }

    #[test]
    fn saved_index_loads_back_whole() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let original = sample();
        save_index(&paths, &original).unwrap();
        save_meta(&paths, &meta_for(&original)).unwrap();

        let loaded = load_index(&paths).unwrap();
        assert_eq!(loaded, original);
        assert_eq!(loaded.index.lookup("cat").unwrap()["2"][&2], vec![1]);

        let meta = load_meta(&paths).unwrap();
        assert_eq!((meta.num_docs, meta.num_tokens, meta.num_terms), (2, 4, 2));
    }

    #[test]
    fn equal_indexes_encode_to_equal_bytes() {
        let dir_a = tempdir().unwrap();
        let dir_b = tempdir().unwrap();
        save_index(&IndexPaths::new(dir_a.path()), &sample()).unwrap();
        save_index(&IndexPaths::new(dir_b.path()), &sample()).unwrap();
        let a = fs::read(dir_a.path().join("index.bin")).unwrap();
        let b = fs::read(dir_b.path().join("index.bin")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn truncated_blob_fails_to_load() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        save_index(&paths, &sample()).unwrap();
        let blob = dir.path().join("index.bin");
        let bytes = fs::read(&blob).unwrap();
        fs::write(&blob, &bytes[..bytes.len() / 2]).unwrap();
        assert!(load_index(&paths).is_err());
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        save_index(&paths, &sample()).unwrap();
        let blob = dir.path().join("index.bin");
        let mut bytes = fs::read(&blob).unwrap();
        bytes[..4].copy_from_slice(&99u32.to_le_bytes());
        fs::write(&blob, &bytes).unwrap();
        let err = load_index(&paths).unwrap_err();
        assert!(err.to_string().contains("format version 99"));
    }

    #[test]
    fn first_blob_by_name_is_used() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        save_index(&paths, &sample()).unwrap();
        fs::write(dir.path().join("zz.bin"), b"garbage").unwrap();
        assert!(load_index(&paths).is_ok());
        fs::write(dir.path().join("aa.bin"), b"garbage").unwrap();
        assert!(load_index(&paths).is_err());
    }

    #[test]
    fn empty_directory_has_no_blob() {
        let dir = tempdir().unwrap();
        assert!(load_index(&IndexPaths::new(dir.path())).is_err());
    }
}
