use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use quendor_formats::{classify, Blorb, FormatError, ProgramFormat, TitleIdentity, ZcodeHeader};
use serde::Serialize;

use crate::error::StartupError;
use crate::search::SearchPaths;

/// Story bytes ready for the virtual machine, plus where they came from.
///
/// When the file on disk was a Blorb, `data` already holds the extracted
/// `ZCOD` payload and `format` still records `Blorb`.
#[derive(Debug, Clone)]
pub struct ProgramImage {
    path: PathBuf,
    data: Vec<u8>,
    format: ProgramFormat,
}

/// A loaded program and, if it arrived wrapped, the container it came in.
#[derive(Debug)]
pub struct LoadedProgram {
    pub image: ProgramImage,
    pub container: Option<Blorb>,
}

/// Header summary printed before the program starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramDetails {
    pub file: PathBuf,
    pub format: ProgramFormat,
    pub size: usize,
    pub version: u8,
    pub release: u16,
    pub serial: String,
    pub checksum: u16,
    pub identity: TitleIdentity,
}

impl ProgramImage {
    /// Locate `name` along the program search path and load it.
    pub fn load(name: &str, paths: &SearchPaths) -> Result<LoadedProgram, StartupError> {
        let path = paths
            .locate_program(name)
            .map_err(|checked| StartupError::ProgramNotFound {
                name: name.to_string(),
                checked,
            })?;
        info!("Located program: {}", path.display());

        let data = read_file(&path)?;
        ProgramImage::from_bytes(&path, data).map_err(|source| StartupError::InvalidProgram {
            path: path.clone(),
            source,
        })
    }

    /// Classify `data` and unwrap it if it is a Blorb.
    pub fn from_bytes(path: &Path, data: Vec<u8>) -> Result<LoadedProgram, FormatError> {
        let format = classify(&data)?;
        debug!("{} classified as {format}", path.display());

        match format {
            ProgramFormat::Zcode => Ok(LoadedProgram {
                image: ProgramImage {
                    path: path.to_path_buf(),
                    data,
                    format,
                },
                container: None,
            }),
            ProgramFormat::Blorb => {
                let blorb = Blorb::new(data, None)?;
                let zcode = blorb.read_exec_chunk(0)?.to_vec();
                Ok(LoadedProgram {
                    image: ProgramImage {
                        path: path.to_path_buf(),
                        data: zcode,
                        format,
                    },
                    container: Some(blorb),
                })
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn format(&self) -> ProgramFormat {
        self.format
    }

    pub fn header(&self) -> Result<ZcodeHeader, FormatError> {
        ZcodeHeader::parse(&self.data)
    }

    pub fn identity(&self) -> Result<TitleIdentity, FormatError> {
        self.header().map(|header| header.identity())
    }

    pub fn details(&self) -> Result<ProgramDetails, FormatError> {
        let header = self.header()?;
        Ok(ProgramDetails {
            file: self.path.clone(),
            format: self.format,
            size: self.data.len(),
            version: header.version,
            release: header.release,
            serial: header.serial_text(),
            checksum: header.checksum,
            identity: header.identity(),
        })
    }
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, StartupError> {
    fs::read(path).map_err(|source| StartupError::ProgramUnreadable {
        path: path.to_path_buf(),
        source,
    })
}
