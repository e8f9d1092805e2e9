use anyhow::{bail, Result};
use clap::Parser;
use lineseek_core::build::build_index;
use lineseek_core::persist::{meta_for, save_index, save_meta, IndexPaths, LoadedIndex};
use lineseek_core::AnalyzerKind;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a positional inverted index over a directory of text documents", long_about = None)]
struct Cli {
    /// Directory of documents to index; each file is one document
    docs: PathBuf,
    /// Output index directory (created if absent)
    index: PathBuf,
    /// Analyzer applied to documents and, later, to queries
    #[arg(long, default_value_t = AnalyzerKind::English)]
    analyzer: AnalyzerKind,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    if !cli.docs.is_dir() {
        bail!("{} is not a directory", cli.docs.display());
    }
    if cli.index.exists() && !cli.index.is_dir() {
        bail!("{} is not a directory", cli.index.display());
    }
    fs::create_dir_all(&cli.index)?;

    let analyzer = cli.analyzer.analyzer();
    let (index, source_root) = build_index(&cli.docs, analyzer.as_ref())?;
    let loaded = LoadedIndex { index, analyzer: cli.analyzer, source_root };

    let paths = IndexPaths::new(&cli.index);
    save_index(&paths, &loaded)?;
    save_meta(&paths, &meta_for(&loaded))?;
    tracing::info!(output = %cli.index.display(), "index build complete");

    println!("Total number of documents: {}", loaded.index.document_count());
    println!("Total number of tokens: {}", loaded.index.total_occurrence_count());
    println!("Total number of terms: {}", loaded.index.distinct_term_count());
    Ok(())
}
