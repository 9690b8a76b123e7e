use anyhow::{Context, Result};
use env_logger::Env;
use quendor_engine::program::ProgramDetails;
use quendor_engine::{assemble, ProgramConfig, ResourceBundle, SearchPaths};
use quendor_formats::Blorb;
use serde::Serialize;

mod cli;

#[derive(Serialize)]
struct BundleReport<'a> {
    program: ProgramDetails,
    config: &'a ProgramConfig,
    blorbs: Vec<BlorbSummary>,
}

#[derive(Serialize)]
struct BlorbSummary {
    release: u16,
    resources: usize,
    size: usize,
    verified: bool,
}

impl From<&Blorb> for BlorbSummary {
    fn from(blorb: &Blorb) -> Self {
        BlorbSummary {
            release: blorb.release_number(),
            resources: blorb.resource_count(),
            size: blorb.data().len(),
            verified: blorb.reference().is_some(),
        }
    }
}

fn main() -> Result<()> {
    let args = cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level().to_string()))
        .init();

    let paths = SearchPaths::from_env();
    let bundle = assemble(&args.request(), &paths)?;
    let report = BundleReport {
        program: bundle
            .program
            .details()
            .context("reading program header")?,
        config: &bundle.config,
        blorbs: bundle.blorbs.iter().map(BlorbSummary::from).collect(),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("serializing startup bundle to JSON")?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "\nQuendor Z-Machine Interpreter (version: {})\n",
        env!("CARGO_PKG_VERSION")
    );
    describe(&bundle, &report);
    Ok(())
}

fn describe(bundle: &ResourceBundle, report: &BundleReport<'_>) {
    let details = &report.program;
    println!("Program: {}", details.file.display());
    println!(
        "  format: {} | version: {} | size: {} bytes",
        details.format, details.version, details.size
    );
    println!(
        "  release: {} | serial: {} | checksum: 0x{:04X}",
        details.release, details.serial, details.checksum
    );
    println!("  identity: {}", bundle.identity);

    println!("\nConfiguration:");
    for (key, value) in bundle.config.entries() {
        let shown = if value.is_empty() { "-" } else { value };
        println!("  {key:<8} {shown}");
    }

    if report.blorbs.is_empty() {
        println!("\nNo resource files.");
        return;
    }
    println!("\nResource files:");
    for (index, blorb) in report.blorbs.iter().enumerate() {
        println!(
            "  {index:>2}. release {release:<5} {count:>4} resources {size:>10} bytes{verified}",
            release = blorb.release,
            count = blorb.resources,
            size = blorb.size,
            verified = if blorb.verified { " (verified)" } else { "" }
        );
    }
}
