use std::fmt;

use thiserror::Error;

use crate::blorb::ChunkTag;

/// Virtual machine targets that are recognised but deliberately not handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedTarget {
    Glulx,
}

impl fmt::Display for UnsupportedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedTarget::Glulx => f.write_str("Glulx"),
        }
    }
}

/// Story identity fields shared by the `IFhd` chunk and the Z-machine header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Release,
    Serial,
    Checksum,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityField::Release => f.write_str("release"),
            IdentityField::Serial => f.write_str("serial"),
            IdentityField::Checksum => f.write_str("checksum"),
        }
    }
}

/// One disagreeing field between a container's `IFhd` and its program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: IdentityField,
    pub container: String,
    pub program: String,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (blorb: {}, program: {})",
            self.field, self.container, self.program
        )
    }
}

/// Failures raised while classifying or decoding program and container bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("cannot interpret {0} programs")]
    UnsupportedFormat(UnsupportedTarget),
    #[error("IFF container type is {found}, only IFRS resources are supported")]
    UnsupportedContainerType { found: ChunkTag },
    #[error("unable to determine program format from leading bytes {found:02x?}")]
    UnknownFormat { found: Vec<u8> },
    #[error("no RIdx chunk found in the blorb")]
    MissingResourceIndex,
    #[error("blorb has no Exec resource numbered {number}")]
    MissingExecutableChunk { number: u32 },
    #[error("unsupported Exec chunk type {found}, only ZCOD is supported")]
    UnsupportedExecutableType { found: ChunkTag },
    #[error("IFhd does not match the program: {}", join_mismatches(.mismatches))]
    IdentityMismatch { mismatches: Vec<FieldMismatch> },
    #[error("{what} at offset {offset} needs {needed} bytes but the buffer holds {len}")]
    Truncated {
        what: &'static str,
        offset: usize,
        needed: usize,
        len: usize,
    },
}

impl FormatError {
    /// Names of every field reported by an `IdentityMismatch`, empty otherwise.
    pub fn mismatched_fields(&self) -> Vec<IdentityField> {
        match self {
            FormatError::IdentityMismatch { mismatches } => {
                mismatches.iter().map(|mismatch| mismatch.field).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn join_mismatches(mismatches: &[FieldMismatch]) -> String {
    mismatches
        .iter()
        .map(|mismatch| mismatch.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Borrow `needed` bytes at `offset`, reporting a truncation instead of panicking.
pub(crate) fn slice_at<'a>(
    data: &'a [u8],
    offset: usize,
    needed: usize,
    what: &'static str,
) -> Result<&'a [u8], FormatError> {
    offset
        .checked_add(needed)
        .and_then(|end| data.get(offset..end))
        .ok_or(FormatError::Truncated {
            what,
            offset,
            needed,
            len: data.len(),
        })
}
