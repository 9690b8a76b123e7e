use std::io;
use std::path::PathBuf;

use quendor_formats::FormatError;
use thiserror::Error;

/// Failures that stop the startup sequence before the program can run.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("unable to locate the program: {name}\n\nChecked in:\n\t{}", join_dirs(.checked))]
    ProgramNotFound { name: String, checked: Vec<PathBuf> },
    #[error("unable to locate the resource: {name}\n\nChecked in:\n\t{}", join_dirs(.checked))]
    ResourceNotFound { name: String, checked: Vec<PathBuf> },
    #[error("unable to access {}: {source}", .path.display())]
    ProgramUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to read configuration file {}: {source}", .path.display())]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid program {}: {source}", .path.display())]
    InvalidProgram {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("invalid resource {}: {source}", .path.display())]
    InvalidResource {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

impl StartupError {
    /// The format failure underneath a program or resource error, if any.
    pub fn format_error(&self) -> Option<&FormatError> {
        match self {
            StartupError::InvalidProgram { source, .. }
            | StartupError::InvalidResource { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn join_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|dir| dir.display().to_string())
        .collect::<Vec<_>>()
        .join("\n\t")
}
