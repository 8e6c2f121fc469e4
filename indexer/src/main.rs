use anyhow::Result;
use clap::Parser;
use core::index::Index;
use core::tokenizer::WordSegmenter;
use core::DocId;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build the in-memory forward and inverted indexes from a record file", long_about = None)]
struct Cli {
    /// Record file produced by the parser, one document per line
    #[arg(long, default_value = "data/records.txt")]
    input: String,
    /// Terms to look up in the inverted index after the build
    #[arg(long)]
    term: Vec<String>,
    /// Document ids to look up in the forward index after the build
    #[arg(long)]
    doc: Vec<DocId>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let segmenter = WordSegmenter::new();
    let mut index = Index::new();
    index.build_from_path(&cli.input, &segmenter)?;
    tracing::info!(docs = index.doc_count(), terms = index.term_count(), input = %cli.input, "indexes ready");

    for term in &cli.term {
        match index.postings(&term.to_lowercase()) {
            Some(postings) => println!("{}", serde_json::to_string(postings)?),
            None => println!("term {term:?}: not found"),
        }
    }
    for doc_id in &cli.doc {
        match index.forward_record(*doc_id) {
            Some(record) => println!("{}", serde_json::to_string(record)?),
            None => println!("doc {doc_id}: not found"),
        }
    }
    Ok(())
}
