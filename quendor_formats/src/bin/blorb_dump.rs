use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use quendor_formats::{Blorb, ResourceEntry};
use serde::Serialize;
use walkdir::WalkDir;

const BLORB_EXTENSIONS: [&str; 3] = ["blb", "blorb", "zblorb"];

#[derive(Parser, Debug)]
#[command(about = "List the resource index of Blorb containers", version)]
struct Args {
    /// Blorb files to inspect
    #[arg(value_name = "FILE", conflicts_with = "root")]
    files: Vec<PathBuf>,

    /// Directory scanned recursively for .blb/.blorb/.zblorb files
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Print the listing as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct BlorbListing {
    path: PathBuf,
    size: usize,
    release: u16,
    resources: Vec<ResourceEntry>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let files = resolve_blorb_paths(&args);
    if files.is_empty() {
        bail!("no Blorb files to inspect");
    }

    let mut listings = Vec::with_capacity(files.len());
    for path in files {
        listings.push(read_listing(&path)?);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&listings)
            .context("serializing Blorb listing to JSON")?;
        println!("{json}");
        return Ok(());
    }

    for listing in &listings {
        println!(
            "{} entries in {} (release {}, {} bytes)",
            listing.resources.len(),
            listing.path.display(),
            listing.release,
            listing.size
        );
        for entry in &listing.resources {
            println!(
                "{usage:<4} {number:>6} {start:>10}",
                usage = entry.usage.as_str(),
                number = entry.number,
                start = entry.start
            );
        }
    }

    Ok(())
}

fn read_listing(path: &Path) -> Result<BlorbListing> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let size = data.len();
    let blorb = Blorb::new(data, None).with_context(|| format!("decoding {}", path.display()))?;
    Ok(BlorbListing {
        path: path.to_path_buf(),
        size,
        release: blorb.release_number(),
        resources: blorb.resources().collect(),
    })
}

fn resolve_blorb_paths(args: &Args) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if !args.files.is_empty() {
        files.extend(args.files.iter().cloned());
    } else if let Some(root) = args.root.as_ref() {
        for entry in WalkDir::new(root).into_iter().filter_map(|res| res.ok()) {
            if entry.file_type().is_file() && has_blorb_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

fn has_blorb_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            BLORB_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
