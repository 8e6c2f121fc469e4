use anyhow::{bail, Context, Result};
use clap::Parser;
use core::html;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "parser")]
#[command(about = "Strip an HTML corpus into title/content/url records", long_about = None)]
struct Cli {
    /// Corpus root, walked recursively
    #[arg(long, default_value = "data/input")]
    input: String,
    /// Output record file, one document per line
    #[arg(long, default_value = "data/records.txt")]
    output: String,
    /// URL prefix substituted for the corpus root when deriving document URLs
    #[arg(long, default_value = "https://www.boost.org/doc/libs/1_81_0/doc/html")]
    base_url: String,
    /// File extension to pick up
    #[arg(long, default_value = "html")]
    ext: String,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let root = PathBuf::from(&cli.input);
    let files = enum_files(&root, &cli.ext)?;
    tracing::info!(files = files.len(), input = %root.display(), "corpus enumerated");

    if let Some(dir) = Path::new(&cli.output).parent() {
        fs::create_dir_all(dir).ok();
    }
    let out_file =
        File::create(&cli.output).with_context(|| format!("create {}", cli.output))?;
    let mut out = BufWriter::new(out_file);

    let mut parsed = 0usize;
    let mut skipped = 0usize;
    for path in files {
        // Whole-file read: newlines survive into the stripper, which folds
        // them to spaces so words never merge across line breaks.
        let raw = match fs::read(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "read failed, skipping");
                skipped += 1;
                continue;
            }
        };
        match html::normalize(&raw, &path, &root, &cli.base_url) {
            Some(record) => {
                out.write_all(record.to_line().as_bytes())?;
                out.write_all(b"\n")?;
                parsed += 1;
            }
            None => {
                tracing::warn!(path = %path.display(), "no usable title, skipping");
                skipped += 1;
            }
        }
    }
    out.flush()?;
    tracing::info!(parsed, skipped, output = %cli.output, "corpus normalized");
    Ok(())
}

fn enum_files(root: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        bail!("corpus root {} does not exist", root.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if !p.is_file() {
            continue;
        }
        if p.extension().and_then(|s| s.to_str()) == Some(ext) {
            files.push(p.to_path_buf());
        }
    }
    Ok(files)
}
