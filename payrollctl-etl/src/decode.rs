//! Text decoding for downloaded CSV files
//!
//! Newer exports are UTF-8 (sometimes with a BOM); older ones are Windows
//! Latin-1. Decoding never fails: bytes that are not valid UTF-8 are read as
//! Latin-1.

use std::borrow::Cow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Decode `bytes` as UTF-8, falling back to Latin-1.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = strip_bom(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(err) => {
            tracing::debug!(
                valid_up_to = err.valid_up_to(),
                "input is not UTF-8, decoding as Latin-1"
            );
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}
