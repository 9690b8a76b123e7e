use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::LevelFilter;
use quendor_engine::StartupRequest;

#[derive(Parser, Debug)]
#[command(
    about = "Execute a zcode program on the Z-Machine",
    after_help = "Enjoy your visit to Quendor!",
    version
)]
pub struct Args {
    /// Program to run: a bare zcode file or a Blorb wrapping one
    #[arg(value_name = "PROGRAM")]
    pub program: String,

    /// Resource (Blorb) file to pair with the program
    #[arg(short, long, value_name = "FILE")]
    pub resource: Option<String>,

    /// Use this configuration file instead of searching for .quendor
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the resolved startup bundle as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase log output (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn request(&self) -> StartupRequest {
        StartupRequest {
            program: self.program.clone(),
            resource: self.resource.clone(),
            config: self.config.clone(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
