//! Program classification and Z-machine story header fields.
//!
//! Only the handful of header fields needed before execution are decoded
//! here: the version byte that marks a bare story file, and the release,
//! serial and checksum triple that identifies a particular build of a title.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use serde::Serialize;

use crate::blorb::ChunkTag;
use crate::error::{FormatError, UnsupportedTarget, slice_at};

const VERSION_OFFSET: usize = 0x00;
const RELEASE_OFFSET: usize = 0x02;
const SERIAL_OFFSET: usize = 0x12;
const CHECKSUM_OFFSET: usize = 0x1C;

pub const SERIAL_LEN: usize = 6;

/// Valid Z-machine version numbers.
pub const VERSIONS: std::ops::RangeInclusive<u8> = 1..=8;

const GLULX_MAGIC: &[u8; 4] = b"GLUL";
const FORM_MAGIC: &[u8; 4] = b"FORM";
const IFRS_TYPE: &[u8; 4] = b"IFRS";

/// Shape of a program file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramFormat {
    /// A bare Z-machine story image.
    Zcode,
    /// An IFRS resource container wrapping the story image.
    Blorb,
}

impl fmt::Display for ProgramFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramFormat::Zcode => f.write_str("zcode"),
            ProgramFormat::Blorb => f.write_str("blorb"),
        }
    }
}

/// Classify a program from its leading bytes.
///
/// Glulx is rejected before anything else. An IFF `FORM` must carry the
/// `IFRS` type id; otherwise the first byte has to be a Z-machine version.
pub fn classify(data: &[u8]) -> Result<ProgramFormat, FormatError> {
    let format_id = &data[..data.len().min(4)];

    if format_id.eq_ignore_ascii_case(GLULX_MAGIC) {
        return Err(FormatError::UnsupportedFormat(UnsupportedTarget::Glulx));
    }

    if format_id.eq_ignore_ascii_case(FORM_MAGIC) {
        let type_id = data.get(8..12).unwrap_or_default();
        if !type_id.eq_ignore_ascii_case(IFRS_TYPE) {
            // A short file reports whatever type bytes it has, zero-filled.
            let present = data.get(8..).unwrap_or_default();
            let present = &present[..present.len().min(4)];
            let mut found = [0u8; 4];
            found[..present.len()].copy_from_slice(present);
            return Err(FormatError::UnsupportedContainerType {
                found: ChunkTag(found),
            });
        }
        return Ok(ProgramFormat::Blorb);
    }

    match data.first() {
        Some(version) if VERSIONS.contains(version) => Ok(ProgramFormat::Zcode),
        _ => Err(FormatError::UnknownFormat {
            found: format_id.to_vec(),
        }),
    }
}

/// The identifying fields of a Z-machine story header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZcodeHeader {
    pub version: u8,
    pub release: u16,
    pub serial: [u8; SERIAL_LEN],
    pub checksum: u16,
}

impl ZcodeHeader {
    pub fn parse(data: &[u8]) -> Result<Self, FormatError> {
        let version = slice_at(data, VERSION_OFFSET, 1, "header version")?[0];
        let release = BigEndian::read_u16(slice_at(data, RELEASE_OFFSET, 2, "header release")?);
        let mut serial = [0u8; SERIAL_LEN];
        serial.copy_from_slice(slice_at(data, SERIAL_OFFSET, SERIAL_LEN, "header serial")?);
        let checksum =
            BigEndian::read_u16(slice_at(data, CHECKSUM_OFFSET, 2, "header checksum")?);

        Ok(ZcodeHeader {
            version,
            release,
            serial,
            checksum,
        })
    }

    pub fn serial_text(&self) -> String {
        latin1(&self.serial)
    }

    pub fn identity(&self) -> TitleIdentity {
        TitleIdentity::new(self.release, &self.serial)
    }
}

/// Per-title lookup key, `<release>.<serial>` (for example `88.840726`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TitleIdentity(String);

impl TitleIdentity {
    pub fn new(release: u16, serial: &[u8]) -> Self {
        TitleIdentity(format!("{release}.{}", latin1(serial)))
    }

    pub fn from_program(data: &[u8]) -> Result<Self, FormatError> {
        ZcodeHeader::parse(data).map(|header| header.identity())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TitleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decode bytes one-to-one as ISO-8859-1.
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(version: u8) -> Vec<u8> {
        let mut data = vec![0u8; 0x40];
        data[0] = version;
        data[2..4].copy_from_slice(&88u16.to_be_bytes());
        data[0x12..0x18].copy_from_slice(b"840726");
        data[0x1C..0x1E].copy_from_slice(&0xA129u16.to_be_bytes());
        data
    }

    #[test]
    fn classifies_story_versions() {
        for version in 1..=8 {
            assert_eq!(classify(&story(version)), Ok(ProgramFormat::Zcode));
        }
        assert!(matches!(
            classify(&story(0)),
            Err(FormatError::UnknownFormat { .. })
        ));
        assert!(matches!(
            classify(&story(9)),
            Err(FormatError::UnknownFormat { .. })
        ));
        assert!(matches!(
            classify(&[]),
            Err(FormatError::UnknownFormat { found }) if found.is_empty()
        ));
    }

    #[test]
    fn rejects_glulx_in_any_case() {
        for magic in [b"GLUL", b"glul", b"Glul"] {
            let mut data = magic.to_vec();
            data.extend_from_slice(&[0u8; 32]);
            assert_eq!(
                classify(&data),
                Err(FormatError::UnsupportedFormat(UnsupportedTarget::Glulx))
            );
        }
    }

    #[test]
    fn form_requires_ifrs_type() {
        let mut data = Vec::new();
        data.extend_from_slice(b"FORM");
        data.extend_from_slice(&4u32.to_be_bytes());
        data.extend_from_slice(b"ifrs");
        assert_eq!(classify(&data), Ok(ProgramFormat::Blorb));

        data[8..12].copy_from_slice(b"AIFF");
        let err = classify(&data).unwrap_err();
        assert_eq!(
            err,
            FormatError::UnsupportedContainerType {
                found: ChunkTag(*b"AIFF")
            }
        );
        assert!(err.to_string().contains("AIFF"));
    }

    #[test]
    fn short_form_is_unsupported_container() {
        assert_eq!(
            classify(b"FORM\0\0\0\x04IF"),
            Err(FormatError::UnsupportedContainerType {
                found: ChunkTag(*b"IF\0\0")
            })
        );
        assert_eq!(
            classify(b"FORM\0\0"),
            Err(FormatError::UnsupportedContainerType {
                found: ChunkTag([0; 4])
            })
        );
    }

    #[test]
    fn header_fields_and_identity() {
        let header = ZcodeHeader::parse(&story(3)).unwrap();
        assert_eq!(header.version, 3);
        assert_eq!(header.release, 88);
        assert_eq!(header.serial_text(), "840726");
        assert_eq!(header.checksum, 0xA129);
        assert_eq!(header.identity().as_str(), "88.840726");
    }

    #[test]
    fn short_header_is_truncated() {
        let err = ZcodeHeader::parse(&[3, 0, 0, 88]).unwrap_err();
        assert!(matches!(
            err,
            FormatError::Truncated {
                what: "header serial",
                ..
            }
        ));
    }

    #[test]
    fn serial_decodes_as_latin1() {
        let identity = TitleIdentity::new(1, &[b'9', b'9', 0xE9, b'0', b'1', b'2']);
        assert_eq!(identity.as_str(), "1.99\u{e9}012");
    }
}
