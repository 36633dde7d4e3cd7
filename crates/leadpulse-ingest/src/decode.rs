//! Byte-level decoding of uploaded exports into text.

use encoding_rs::WINDOWS_1252;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes raw file bytes, stripping a UTF-8 BOM.
///
/// Spreadsheet tools still emit Windows-1252 exports; bytes that are not
/// valid UTF-8 are decoded as Windows-1252 rather than rejected.
#[must_use]
pub fn decode_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            tracing::debug!("input is not valid UTF-8; decoding as windows-1252");
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}
