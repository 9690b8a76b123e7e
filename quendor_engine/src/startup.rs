use std::path::PathBuf;

use log::{info, warn};
use quendor_formats::{Blorb, TitleIdentity};

use crate::config::{ConfigFile, ProgramConfig};
use crate::error::StartupError;
use crate::program::{read_file, ProgramImage};
use crate::search::SearchPaths;

/// What the caller asked to run.
#[derive(Debug, Clone, Default)]
pub struct StartupRequest {
    pub program: String,
    /// Resource file supplied alongside the program; it must match the
    /// program's `IFhd` identity.
    pub resource: Option<String>,
    /// Explicit configuration file, bypassing the search.
    pub config: Option<PathBuf>,
}

impl StartupRequest {
    pub fn new(program: impl Into<String>) -> Self {
        StartupRequest {
            program: program.into(),
            ..StartupRequest::default()
        }
    }
}

/// Everything the virtual machine needs before the first instruction.
#[derive(Debug)]
pub struct ResourceBundle {
    pub program: ProgramImage,
    pub blorbs: Vec<Blorb>,
    pub config: ProgramConfig,
    pub identity: TitleIdentity,
}

/// Load the program, gather its resource containers, and resolve its
/// configuration.
pub fn assemble(
    request: &StartupRequest,
    paths: &SearchPaths,
) -> Result<ResourceBundle, StartupError> {
    let loaded = ProgramImage::load(&request.program, paths)?;
    let program = loaded.image;
    let mut blorbs: Vec<Blorb> = loaded.container.into_iter().collect();

    // A resource file without an Exec chunk only makes sense paired with the
    // program it was built for.
    if let Some(name) = request.resource.as_deref() {
        blorbs.push(load_blorb(name, paths, Some(program.data()))?);
    }

    let identity = program
        .identity()
        .map_err(|source| StartupError::InvalidProgram {
            path: program.path().to_path_buf(),
            source,
        })?;

    let config_file = match request.config.as_deref() {
        Some(path) => ConfigFile::read(path)?,
        None => ConfigFile::locate(paths)?,
    };
    let config = config_file.resolve(&identity);

    if !config.blorb.is_empty() {
        blorbs.push(load_blorb(&config.blorb, paths, None)?);
    }

    remove_duplicate_blorbs(&mut blorbs);

    Ok(ResourceBundle {
        program,
        blorbs,
        config,
        identity,
    })
}

fn load_blorb(
    name: &str,
    paths: &SearchPaths,
    reference: Option<&[u8]>,
) -> Result<Blorb, StartupError> {
    let path = paths
        .locate_program(name)
        .map_err(|checked| StartupError::ResourceNotFound {
            name: name.to_string(),
            checked,
        })?;
    info!("Located resource: {}", path.display());

    let data = read_file(&path)?;
    Blorb::new(data, reference).map_err(|source| StartupError::InvalidResource { path, source })
}

/// Indices of entries whose bytes equal an earlier entry's, ascending and
/// without repeats.
pub fn duplicate_indices<T: AsRef<[u8]>>(items: &[T]) -> Vec<usize> {
    let mut duplicates = Vec::new();
    for first in 0..items.len() {
        for second in first + 1..items.len() {
            if items[first].as_ref() == items[second].as_ref() {
                duplicates.push(second);
            }
        }
    }
    duplicates.sort_unstable();
    duplicates.dedup();
    duplicates
}

/// Drop later copies of byte-identical containers, keeping the first of
/// each. Returns how many were removed.
pub fn remove_duplicate_blorbs<T: AsRef<[u8]>>(blorbs: &mut Vec<T>) -> usize {
    let duplicates = duplicate_indices(blorbs.as_slice());
    for &index in duplicates.iter().rev() {
        warn!("Byte data match found between blorbs in the list. Removing duplicate at {index}.");
        blorbs.remove(index);
    }
    duplicates.len()
}
