#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// A minimal story image with the given release, serial and checksum.
pub fn story(version: u8, release: u16, serial: &[u8; 6], checksum: u16) -> Vec<u8> {
    let mut data = vec![0u8; 0x40];
    data[0] = version;
    data[2..4].copy_from_slice(&release.to_be_bytes());
    data[0x12..0x18].copy_from_slice(serial);
    data[0x1C..0x1E].copy_from_slice(&checksum.to_be_bytes());
    data
}

pub fn zork1() -> Vec<u8> {
    story(3, 88, b"840726", 0xA129)
}

pub fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = tag.to_vec();
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
    out
}

pub fn ifhd(release: u16, serial: &[u8; 6], checksum: u16) -> Vec<u8> {
    let mut payload = release.to_be_bytes().to_vec();
    payload.extend_from_slice(serial);
    payload.extend_from_slice(&checksum.to_be_bytes());
    payload.extend_from_slice(&[0, 0, 0]);
    chunk(b"IFhd", &payload)
}

/// Build an IFRS container. `resources` become indexed chunks in order;
/// `extra` chunks follow them unindexed.
pub fn blorb(resources: &[(&[u8; 4], u32, Vec<u8>)], extra: &[Vec<u8>]) -> Vec<u8> {
    let ridx_len = 8 + 4 + 12 * resources.len();
    let mut start = 12 + ridx_len;

    let mut index = (resources.len() as u32).to_be_bytes().to_vec();
    let mut body = Vec::new();
    for (usage, number, chunk_bytes) in resources {
        index.extend_from_slice(*usage);
        index.extend_from_slice(&number.to_be_bytes());
        index.extend_from_slice(&(start as u32).to_be_bytes());
        start += chunk_bytes.len();
        body.extend_from_slice(chunk_bytes);
    }
    for chunk_bytes in extra {
        body.extend_from_slice(chunk_bytes);
    }

    let mut out = b"FORM".to_vec();
    out.extend_from_slice(&((4 + ridx_len + body.len()) as u32).to_be_bytes());
    out.extend_from_slice(b"IFRS");
    out.extend_from_slice(&chunk(b"RIdx", &index));
    out.extend_from_slice(&body);
    out
}

/// A container wrapping `zcode` as Exec 0, with a matching IFhd.
pub fn wrapped(zcode: &[u8]) -> Vec<u8> {
    blorb(
        &[(b"Exec", 0, chunk(b"ZCOD", zcode))],
        &[ifhd(
            u16::from_be_bytes([zcode[2], zcode[3]]),
            zcode[0x12..0x18].try_into().unwrap(),
            u16::from_be_bytes([zcode[0x1C], zcode[0x1D]]),
        )],
    )
}

/// A picture-only resource file, tagged with the given IFhd.
pub fn pictures(ifhd_chunk: Vec<u8>, release: u16) -> Vec<u8> {
    blorb(
        &[(b"Pict", 1, chunk(b"PNG ", b"\x89PNG-ish"))],
        &[ifhd_chunk, chunk(b"RelN", &release.to_be_bytes())],
    )
}

pub fn write(dir: &Path, name: &str, bytes: &[u8]) {
    fs::write(dir.join(name), bytes).unwrap();
}
