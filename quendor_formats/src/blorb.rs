//! Decoder for IFRS (Blorb) resource containers.
//!
//! A container is an IFF `FORM` whose 12 byte header is followed by a flat
//! run of chunks: tag, big-endian length, payload, and one zero pad byte when
//! the length is odd. The `RIdx` chunk indexes every resource by usage and
//! number so chunks can be reached without another scan.

use std::collections::BTreeMap;
use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use log::debug;
use serde::{Serialize, Serializer};

use crate::error::{FieldMismatch, FormatError, IdentityField, slice_at};
use crate::zcode::{SERIAL_LEN, ZcodeHeader, latin1};

pub const HEADER_LEN: usize = 12;
pub const CHUNK_HEADER_LEN: usize = 8;
const INDEX_ENTRY_LEN: usize = 12;

/// Returned by [`locate_chunk`] when no chunk matches. Never a real chunk
/// start because the FORM header occupies the first 12 bytes.
pub const NOT_FOUND: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkTag(pub [u8; 4]);

impl ChunkTag {
    pub const RIDX: ChunkTag = ChunkTag(*b"RIdx");
    pub const IFHD: ChunkTag = ChunkTag(*b"IFhd");
    pub const RELN: ChunkTag = ChunkTag(*b"RelN");
    pub const EXEC: ChunkTag = ChunkTag(*b"Exec");
    pub const ZCOD: ChunkTag = ChunkTag(*b"ZCOD");
    pub const PICT: ChunkTag = ChunkTag(*b"Pict");
    pub const SND: ChunkTag = ChunkTag(*b"Snd ");

    pub fn as_str(self) -> String {
        latin1(&self.0)
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl Serialize for ChunkTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

/// Composite key of the resource index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ResourceKey {
    pub usage: ChunkTag,
    pub number: u32,
}

impl ResourceKey {
    pub fn new(usage: ChunkTag, number: u32) -> Self {
        ResourceKey { usage, number }
    }
}

/// One row of the `RIdx` resource index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceEntry {
    pub usage: ChunkTag,
    pub number: u32,
    pub start: u32,
}

/// A chunk viewed in place: its tag and its payload without the pad byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub offset: usize,
    pub tag: ChunkTag,
    pub data: &'a [u8],
}

/// A decoded resource container.
#[derive(Debug, Clone)]
pub struct Blorb {
    data: Vec<u8>,
    index: BTreeMap<ResourceKey, u32>,
    release: u16,
    reference: Option<Vec<u8>>,
}

impl Blorb {
    /// Decode `data`, cross-checking its `IFhd` against `reference` when one
    /// is given. An empty reference is treated the same as none.
    pub fn new(data: Vec<u8>, reference: Option<&[u8]>) -> Result<Self, FormatError> {
        debug!("decoding blorb ({} bytes)", data.len());

        let ridx = locate_chunk(&data, ChunkTag::RIDX);
        if ridx == NOT_FOUND {
            return Err(FormatError::MissingResourceIndex);
        }

        let index = read_resource_index(&data, ridx)?;

        let reference = reference.filter(|bytes| !bytes.is_empty());
        if let Some(program) = reference {
            verify_identity(&data, program)?;
        }

        let release = match locate_chunk(&data, ChunkTag::RELN) {
            NOT_FOUND => 0,
            offset => BigEndian::read_u16(slice_at(
                &data,
                offset + CHUNK_HEADER_LEN,
                2,
                "RelN release number",
            )?),
        };
        debug!("\tRelease number: {release}");

        Ok(Blorb {
            data,
            index,
            release,
            reference: reference.map(<[u8]>::to_vec),
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The program bytes this container was verified against, if any.
    pub fn reference(&self) -> Option<&[u8]> {
        self.reference.as_deref()
    }

    pub fn release_number(&self) -> u16 {
        self.release
    }

    pub fn resource_count(&self) -> usize {
        self.index.len()
    }

    pub fn resources(&self) -> impl Iterator<Item = ResourceEntry> + '_ {
        self.index.iter().map(|(key, &start)| ResourceEntry {
            usage: key.usage,
            number: key.number,
            start,
        })
    }

    pub fn resource_offset(&self, usage: ChunkTag, number: u32) -> Option<usize> {
        self.index
            .get(&ResourceKey::new(usage, number))
            .map(|&start| start as usize)
    }

    pub fn locate_chunk(&self, tag: ChunkTag) -> usize {
        locate_chunk(&self.data, tag)
    }

    /// Read the chunk that starts at `offset`.
    pub fn chunk_at(&self, offset: usize) -> Result<Chunk<'_>, FormatError> {
        let header = slice_at(&self.data, offset, CHUNK_HEADER_LEN, "chunk header")?;
        let tag = ChunkTag(header[0..4].try_into().unwrap());
        let length = BigEndian::read_u32(&header[4..8]) as usize;
        let data = slice_at(&self.data, offset + CHUNK_HEADER_LEN, length, "chunk payload")?;
        Ok(Chunk { offset, tag, data })
    }

    /// Payload of any indexed resource.
    pub fn read_resource(
        &self,
        usage: ChunkTag,
        number: u32,
    ) -> Option<Result<Chunk<'_>, FormatError>> {
        self.resource_offset(usage, number)
            .map(|offset| self.chunk_at(offset))
    }

    /// Story image stored under `Exec` resource `number`.
    pub fn read_exec_chunk(&self, number: u32) -> Result<&[u8], FormatError> {
        let offset = self
            .resource_offset(ChunkTag::EXEC, number)
            .ok_or(FormatError::MissingExecutableChunk { number })?;

        let chunk = self.chunk_at(offset)?;
        if chunk.tag != ChunkTag::ZCOD {
            return Err(FormatError::UnsupportedExecutableType { found: chunk.tag });
        }
        debug!("\tExec chunk {number}: {} bytes at {offset}", chunk.data.len());

        Ok(chunk.data)
    }
}

impl AsRef<[u8]> for Blorb {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Offset of the chunk following one that starts at `offset` with payload
/// length `length`, honouring the even-alignment pad byte.
pub fn next_chunk_offset(offset: usize, length: usize) -> Option<usize> {
    offset
        .checked_add(CHUNK_HEADER_LEN)?
        .checked_add(length)?
        .checked_add(length % 2)
}

/// Scan the chunks after the FORM header for `tag`, returning the chunk's
/// start offset or [`NOT_FOUND`].
///
/// Only the tag has to fit in the buffer for a match; a chunk cut short
/// after its tag fails later, when its fields are read.
pub fn locate_chunk(data: &[u8], tag: ChunkTag) -> usize {
    debug!("\tSearching for chunk name: {tag}");

    let mut position = HEADER_LEN;
    while let Some(chunk_id) = position
        .checked_add(4)
        .and_then(|end| data.get(position..end))
    {
        if chunk_id == tag.0 {
            debug!("\tFound chunk {tag} at {position}");
            return position;
        }

        let Some(length) = position
            .checked_add(CHUNK_HEADER_LEN)
            .and_then(|end| data.get(position + 4..end))
            .map(|bytes| BigEndian::read_u32(bytes) as usize)
        else {
            break;
        };
        debug!("\tChunk {:?} at {position}, length {length}", latin1(chunk_id));

        match next_chunk_offset(position, length) {
            Some(next) => position = next,
            None => break,
        }
    }

    NOT_FOUND
}

fn read_resource_index(
    data: &[u8],
    ridx: usize,
) -> Result<BTreeMap<ResourceKey, u32>, FormatError> {
    let count_offset = ridx + CHUNK_HEADER_LEN;
    let count = BigEndian::read_u32(slice_at(data, count_offset, 4, "RIdx resource count")?);
    debug!("\tResource Count: {count}");

    let entries_offset = count_offset + 4;
    let entries_len = (count as usize)
        .checked_mul(INDEX_ENTRY_LEN)
        .ok_or(FormatError::Truncated {
            what: "RIdx entries",
            offset: entries_offset,
            needed: usize::MAX,
            len: data.len(),
        })?;
    let entries = slice_at(data, entries_offset, entries_len, "RIdx entries")?;

    let mut index = BTreeMap::new();
    for entry in entries.chunks_exact(INDEX_ENTRY_LEN) {
        let usage = ChunkTag(entry[0..4].try_into().unwrap());
        let number = BigEndian::read_u32(&entry[4..8]);
        let start = BigEndian::read_u32(&entry[8..12]);
        if index.insert(ResourceKey::new(usage, number), start).is_some() {
            debug!("\tduplicate index entry {usage} {number}, keeping the later one");
        }
    }

    Ok(index)
}

/// Compare the container's `IFhd` against the reference program header.
/// Every differing field is reported, not just the first.
fn verify_identity(data: &[u8], program: &[u8]) -> Result<(), FormatError> {
    let offset = locate_chunk(data, ChunkTag::IFHD);
    if offset == NOT_FOUND {
        debug!("\tno IFhd chunk, skipping identity check");
        return Ok(());
    }

    let ifhd = slice_at(data, offset + CHUNK_HEADER_LEN, 2 + SERIAL_LEN + 2, "IFhd fields")?;
    let release = BigEndian::read_u16(&ifhd[0..2]);
    let serial = &ifhd[2..2 + SERIAL_LEN];
    let checksum = BigEndian::read_u16(&ifhd[2 + SERIAL_LEN..]);

    let header = ZcodeHeader::parse(program)?;

    let mut mismatches = Vec::new();
    if release != header.release {
        mismatches.push(FieldMismatch {
            field: IdentityField::Release,
            container: release.to_string(),
            program: header.release.to_string(),
        });
    }
    if serial != header.serial {
        mismatches.push(FieldMismatch {
            field: IdentityField::Serial,
            container: latin1(serial),
            program: header.serial_text(),
        });
    }
    if checksum != header.checksum {
        mismatches.push(FieldMismatch {
            field: IdentityField::Checksum,
            container: format!("{checksum:#06x}"),
            program: format!("{:#06x}", header.checksum),
        });
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(FormatError::IdentityMismatch { mismatches })
    }
}
