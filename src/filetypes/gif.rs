// GIF89a: header, logical screen descriptor, blocks, and a terminator followed by the trailer
use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use hex_literal::hex;

use super::FormatSpec;

pub const HEADER: [u8; 6] = *b"GIF89a";
pub const TRAILER: [u8; 2] = hex!("00 3B");

// logical screen width and height
const SCREEN_LEN: usize = 4;

pub fn format() -> FormatSpec {
    FormatSpec::new("gif", &HEADER, &TRAILER, validate)
}

pub fn validate(span: &[u8]) -> bool {
    span.starts_with(&HEADER)
        && span.ends_with(&TRAILER)
        && span.len() >= HEADER.len() + SCREEN_LEN + TRAILER.len()
        && screen_is_sane(&span[HEADER.len()..]).unwrap_or(false)
}

// logical screen width and height, both little endian and never 0
fn screen_is_sane(descriptor: &[u8]) -> std::io::Result<bool> {
    let mut cursor = Cursor::new(descriptor);
    let width = cursor.read_u16::<LittleEndian>()?;
    let height = cursor.read_u16::<LittleEndian>()?;

    Ok(width != 0 && height != 0)
}
