// Row Parser for yearly registry extracts.
//
// One extract file per year: semicolon-delimited, first line column names,
// second line a separator/units row that is always discarded, every later
// non-blank line one company row. The year the file describes is carried in
// the filename, not in the rows.

use crate::encoding::{decode_registry_bytes, normalize_text, EncodingTable};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// COLUMN NAMES
// ============================================================================

/// Required columns, by extract header name.
pub const COL_ORGNR: &str = "Orgnr";
pub const COL_NAME: &str = "Navn";
pub const COL_ADDRESS: &str = "Forretningsadresse";
pub const COL_POSTAL_CODE: &str = "Fadr postnr";
pub const COL_POSTAL_PLACE: &str = "Fadr poststed";
pub const COL_EMPLOYEES: &str = "Antall ansatte";

/// Optional columns carried through for display.
pub const COL_FOUNDED: &str = "Stiftelsesdato";
pub const COL_ORG_FORM: &str = "Organisasjonsform";

// ============================================================================
// CORE TYPES
// ============================================================================

/// One data row as a column-name → trimmed-value map.
///
/// Ephemeral: rows only live until they are folded into company timelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    fields: HashMap<String, String>,
}

impl RawRow {
    /// Value for a column, or `""` when the column is missing.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    /// True when every field normalized to empty.
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.is_empty())
    }
}

/// Output of parsing one extract file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFile {
    /// Original filename, kept for diagnostics.
    pub filename: String,
    /// Year the file describes, from the filename. `None` means the rows
    /// cannot be placed on any timeline and must be skipped downstream.
    pub year: Option<i32>,
    pub rows: Vec<RawRow>,
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse raw extract bytes: legacy byte remapping, then text parsing.
pub fn parse_extract_bytes(bytes: &[u8], filename: &str, table: &EncodingTable) -> ParsedFile {
    let text = decode_registry_bytes(bytes, table);
    parse_extract(&text, filename)
}

/// Parse already-decoded extract text into rows plus the filename year.
///
/// Malformed files (fewer than three usable lines) yield an empty row set,
/// never an error: extracts are best-effort input.
pub fn parse_extract(text: &str, filename: &str) -> ParsedFile {
    let year = extract_year(filename);
    let text = normalize_text(text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut headers: Vec<String> = Vec::new();
    let mut rows = Vec::new();
    let mut record_index = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!("{}: skipping unreadable line: {}", filename, err);
                continue;
            }
        };

        match record_index {
            // Line 1: column names
            0 => {
                headers = record.iter().map(|h| h.trim().to_string()).collect();
            }
            // Line 2: separator/units row, always discarded
            1 => {}
            _ => {
                let mut fields = HashMap::with_capacity(headers.len());
                for (i, header) in headers.iter().enumerate() {
                    let value = record.get(i).unwrap_or("").trim().to_string();
                    fields.insert(header.clone(), value);
                }
                let row = RawRow { fields };
                if !row.is_blank() {
                    rows.push(row);
                }
            }
        }
        record_index += 1;
    }

    if record_index < 3 {
        debug!(
            "{}: fewer than 3 usable lines ({}), treating as empty",
            filename, record_index
        );
    }
    if year.is_none() {
        warn!(
            "{}: no 4-digit year in filename, rows will be skipped",
            filename
        );
    }

    ParsedFile {
        filename: filename.to_string(),
        year,
        rows,
    }
}

/// Extract the file's year from its name: the first run of exactly four
/// digits. Runs longer than four digits do not qualify.
pub fn extract_year(filename: &str) -> Option<i32> {
    let bytes = filename.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start == 4 {
                return filename[start..i].parse().ok();
            }
        } else {
            i += 1;
        }
    }
    None
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Orgnr;Navn;Forretningsadresse;Fadr postnr;Fadr poststed;Antall ansatte\n\
                          ---;---;---;---;---;---\n\
                          900000000;Fjellheim AS;Storgata 1;0155;Oslo;10\n\
                          900000001;Kystverket DA;Havnegata 7;5003;Bergen;42\n";

    #[test]
    fn test_parse_basic_extract() {
        let parsed = parse_extract(SAMPLE, "enheter_2015.csv");
        assert_eq!(parsed.year, Some(2015));
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].get(COL_ORGNR), "900000000");
        assert_eq!(parsed.rows[0].get(COL_NAME), "Fjellheim AS");
        assert_eq!(parsed.rows[1].get(COL_EMPLOYEES), "42");
    }

    #[test]
    fn test_separator_line_discarded() {
        let parsed = parse_extract(SAMPLE, "2020.csv");
        assert!(parsed.rows.iter().all(|r| r.get(COL_ORGNR) != "---"));
    }

    #[test]
    fn test_quoted_delimiter_is_literal() {
        let text = "Orgnr;Navn;Forretningsadresse\n-;-;-\n1;\"A; B AS\";\"Gata 1; oppgang B\"\n";
        let parsed = parse_extract(text, "x2019y.csv");
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].get(COL_NAME), "A; B AS");
        assert_eq!(parsed.rows[0].get(COL_ADDRESS), "Gata 1; oppgang B");
    }

    #[test]
    fn test_doubled_quote_is_escaped_quote() {
        let text = "Orgnr;Navn\n-;-\n1;\"Huset \"\"Solsiden\"\" AS\"\n";
        let parsed = parse_extract(text, "2019.csv");
        assert_eq!(parsed.rows[0].get(COL_NAME), "Huset \"Solsiden\" AS");
    }

    #[test]
    fn test_all_empty_row_dropped() {
        let text = "Orgnr;Navn\n-;-\n;;\n1;Alpha\n;\n";
        let parsed = parse_extract(text, "2019.csv");
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].get(COL_NAME), "Alpha");
    }

    #[test]
    fn test_too_few_lines_is_empty_not_error() {
        let parsed = parse_extract("Orgnr;Navn\n-;-\n", "2019.csv");
        assert!(parsed.rows.is_empty());
        let parsed = parse_extract("", "2019.csv");
        assert!(parsed.rows.is_empty());
    }

    #[test]
    fn test_bom_and_crlf_handled() {
        let text = "\u{feff}Orgnr;Navn\r\n-;-\r\n1;Alpha\r\n";
        let parsed = parse_extract(text, "2019.csv");
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].get(COL_ORGNR), "1");
    }

    #[test]
    fn test_year_extraction() {
        assert_eq!(extract_year("enheter_2015.csv"), Some(2015));
        assert_eq!(extract_year("2023-export.csv"), Some(2023));
        assert_eq!(extract_year("export.csv"), None);
        // A longer digit run is not a year
        assert_eq!(extract_year("org_12345_dump.csv"), None);
        assert_eq!(extract_year("org_12345_2018.csv"), Some(2018));
    }

    #[test]
    fn test_missing_year_keeps_rows_but_flags_file() {
        let parsed = parse_extract(SAMPLE, "export.csv");
        assert_eq!(parsed.year, None);
        assert_eq!(parsed.rows.len(), 2);
    }

    #[test]
    fn test_parse_bytes_with_legacy_encoding() {
        let bytes = b"Orgnr;Navn;Forretningsadresse\n-;-;-\n1;S\x9Br AS;H\x86konsgate 3\n";
        let parsed = parse_extract_bytes(bytes, "2021.csv", &EncodingTable::registry_default());
        assert_eq!(parsed.rows[0].get(COL_NAME), "Sør AS");
        assert_eq!(parsed.rows[0].get(COL_ADDRESS), "Håkonsgate 3");
    }
}
