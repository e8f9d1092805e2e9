use anyhow::{bail, Result};
use clap::Parser;
use search::{stored_stats, Searcher};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Answer proximity queries read from stdin, one per line", long_about = None)]
struct Args {
    /// Index directory path
    index: PathBuf,
    /// Documents directory for snippet lines (defaults to the one recorded in the index)
    #[arg(long)]
    docs: Option<PathBuf>,
    /// Print every indexed term and exit
    #[arg(long, default_value_t = false)]
    list_terms: bool,
    /// Print the totals recorded at build time and exit
    #[arg(long, default_value_t = false)]
    stats: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let args = Args::parse();

    if !args.index.is_dir() {
        bail!("{} is not a directory", args.index.display());
    }
    if args.stats {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for line in stored_stats(&args.index)? {
            writeln!(out, "{line}")?;
        }
        return Ok(());
    }

    let mut searcher = Searcher::open(&args.index)?;
    if let Some(docs) = args.docs {
        if !docs.is_dir() {
            bail!("{} is not a directory", docs.display());
        }
        searcher = searcher.with_source_root(docs);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.list_terms {
        for term in searcher.sorted_terms() {
            writeln!(out, "{term}")?;
        }
        return Ok(());
    }

    for line in io::stdin().lock().lines() {
        let line = line?;
        let query = line.trim();
        match searcher.search(query) {
            Ok(results) => {
                for r in results {
                    writeln!(out, "{r}")?;
                }
                out.flush()?;
            }
            Err(e) => tracing::warn!(query, error = %format!("{e:#}"), "query failed"),
        }
    }
    Ok(())
}
