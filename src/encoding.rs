// Legacy byte decoding for registry extracts.
//
// The source extracts are not valid UTF-8: a handful of high bytes stand in
// for Norwegian letters (å/Å, ø/Ø, æ/Æ) in a way that matches no documented
// code page. The table below was reverse-engineered from the observed corpus
// and is injectable so a different extract producer can ship its own mapping.

use serde::{Deserialize, Serialize};

// ============================================================================
// ENCODING TABLE
// ============================================================================

/// Byte-to-character remapping applied before any text processing.
///
/// Bytes not covered by the table decode as their literal code point
/// (Latin-1 style), so decoding can never fail on arbitrary input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingTable {
    mappings: Vec<(u8, char)>,
}

impl EncodingTable {
    /// Table observed in the registry corpus this tool was built against.
    ///
    /// This is a reverse-engineered guess, not a standard: treat it as
    /// configuration when targeting a different source.
    pub fn registry_default() -> Self {
        EncodingTable {
            mappings: vec![
                (0x86, 'å'),
                (0x8D, 'æ'),
                (0x8E, 'Æ'),
                (0x8F, 'Å'),
                (0x91, 'æ'),
                (0x9A, 'ø'),
                (0x9B, 'ø'),
                (0x9D, 'Ø'),
            ],
        }
    }

    /// Build a table from explicit byte → char pairs.
    pub fn from_mappings(mappings: Vec<(u8, char)>) -> Self {
        EncodingTable { mappings }
    }

    /// Look up the replacement character for a byte, if any.
    pub fn lookup(&self, byte: u8) -> Option<char> {
        self.mappings
            .iter()
            .find(|(b, _)| *b == byte)
            .map(|(_, c)| *c)
    }
}

impl Default for EncodingTable {
    fn default() -> Self {
        Self::registry_default()
    }
}

// ============================================================================
// DECODING
// ============================================================================

/// Decode raw extract bytes into a `String` using the remapping table.
///
/// Every byte outside the table is taken as its literal code point, which
/// makes this total: no input can produce an error or a replacement marker.
pub fn decode_registry_bytes(bytes: &[u8], table: &EncodingTable) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &byte in bytes {
        match table.lookup(byte) {
            Some(c) => out.push(c),
            None => out.push(byte as char),
        }
    }
    out
}

/// Strip a leading UTF-8 byte-order mark and normalize all line endings
/// to `\n`.
pub fn normalize_text(text: &str) -> String {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.replace("\r\n", "\n").replace('\r', "\n")
}

// ============================================================================
// TESTS
// ============================================================================
