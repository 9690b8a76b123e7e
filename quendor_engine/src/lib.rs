//! Startup resolution for the Quendor Z-machine host: locate the program,
//! pair it with its resource containers, and resolve per-title settings.

pub mod config;
pub mod error;
pub mod program;
pub mod search;
pub mod startup;

pub use config::{ConfigFile, ProgramConfig};
pub use error::StartupError;
pub use program::{LoadedProgram, ProgramImage};
pub use search::SearchPaths;
pub use startup::{assemble, remove_duplicate_blorbs, ResourceBundle, StartupRequest};
