// PNG: the 8-byte signature, a mandatory IHDR chunk first, and the IEND chunk last.
// IEND has no data so its CRC never changes: chunk type + CRC make a fixed end marker.
use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};
use hex_literal::hex;

use super::FormatSpec;

pub const SIGNATURE: [u8; 8] = hex!("89 50 4E 47 0D 0A 1A 0A");
pub const IEND: [u8; 8] = hex!("49 45 4E 44 AE 42 60 82");

// IHDR data is always 13 bytes long
const IHDR_LENGTH: u32 = 13;

pub fn format() -> FormatSpec {
    FormatSpec::new("png", &SIGNATURE, &IEND, validate)
}

pub fn validate(span: &[u8]) -> bool {
    span.starts_with(&SIGNATURE)
        && span.ends_with(&IEND)
        && span.len() >= SIGNATURE.len() + IEND.len()
        && first_chunk_is_ihdr(&span[SIGNATURE.len()..]).unwrap_or(false)
}

// read the first chunk header right after the signature
fn first_chunk_is_ihdr(chunks: &[u8]) -> std::io::Result<bool> {
    let mut cursor = Cursor::new(chunks);

    let length = cursor.read_u32::<BigEndian>()?;
    let mut chunk_type = [0u8; 4];
    cursor.read_exact(&mut chunk_type)?;

    Ok(length == IHDR_LENGTH && &chunk_type == b"IHDR")
}
