// JPEG/JFIF: a file starts with SOI immediately followed by the APP0 segment, and ends with EOI
use hex_literal::hex;

use super::FormatSpec;

pub const SOI: [u8; 2] = hex!("FF D8");
pub const APP0: [u8; 2] = hex!("FF E0");
pub const EOI: [u8; 2] = hex!("FF D9");

pub fn format() -> FormatSpec {
    FormatSpec::new("jpg", &SOI, &EOI, validate)
}

// spans shorter than 4 bytes can't hold SOI and APP0, get() keeps us in bounds
pub fn validate(span: &[u8]) -> bool {
    span.get(..2) == Some(&SOI[..])
        && span.get(2..4) == Some(&APP0[..])
        && span.ends_with(&EOI)
}
