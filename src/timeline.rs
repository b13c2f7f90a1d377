// Timeline Builder: folds parsed yearly rows into per-company histories.
//
// Companies are keyed by organization number. Each ingested year contributes
// at most one timeline entry per company; a later row for the same year
// replaces the earlier one instead of duplicating it. A fresh ingest always
// rebuilds the registry from scratch.

use crate::encoding::EncodingTable;
use crate::error::AnalysisError;
use crate::parser::{
    parse_extract_bytes, ParsedFile, RawRow, COL_ADDRESS, COL_EMPLOYEES, COL_FOUNDED, COL_NAME,
    COL_ORGNR, COL_ORG_FORM, COL_POSTAL_CODE, COL_POSTAL_PLACE,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// CORE TYPES
// ============================================================================

/// One year's observation of a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub year: i32,
    pub address: String,
    pub postal_code: String,
    pub postal_place: String,
    /// Employee count for the year; unparsable source values become 0.
    pub employees: u32,
    /// Founding date as reported, empty when the extract lacks the column.
    pub founded_date: String,
    /// Organization form as reported, empty when absent.
    pub org_form: String,
}

/// A registry-tracked organization with its chronological observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Registry key: opaque, case-preserving, required.
    pub orgnr: String,
    /// Display name; the last non-empty value across ingested years wins.
    pub name: String,
    /// Sorted ascending by year after ingest, one entry per year.
    pub timeline: Vec<TimelineEntry>,
}

impl Company {
    pub fn first_entry(&self) -> Option<&TimelineEntry> {
        self.timeline.first()
    }

    pub fn last_entry(&self) -> Option<&TimelineEntry> {
        self.timeline.last()
    }
}

/// The full in-memory dataset: every company plus the set of ingested years.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyRegistry {
    companies: HashMap<String, Company>,
    /// Distinct ingested years, sorted ascending.
    years: Vec<i32>,
}

impl CompanyRegistry {
    pub fn company(&self, orgnr: &str) -> Option<&Company> {
        self.companies.get(orgnr)
    }

    pub fn companies(&self) -> impl Iterator<Item = &Company> {
        self.companies.values()
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// Years actually present in the ingested file set.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Anchor for all relative-year computations: the maximum ingested year.
    ///
    /// Data-derived rather than wall-clock so results are reproducible
    /// against a fixed fixture.
    pub fn reference_year(&self) -> Option<i32> {
        self.years.last().copied()
    }

    pub fn earliest_year(&self) -> Option<i32> {
        self.years.first().copied()
    }

    /// The calendar year meant by "N years ago".
    pub fn target_year(&self, years_ago: u32) -> Option<i32> {
        self.reference_year().map(|r| r - years_ago as i32)
    }
}

// ============================================================================
// INGEST
// ============================================================================

/// One uploaded file: name plus raw bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        SourceFile {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Ingest an ordered collection of extract files into a fresh registry.
///
/// Fails with [`AnalysisError::NoUsableData`] only when zero files parse to
/// a non-empty row set; individual bad rows and files are skipped silently.
pub fn ingest_files(
    files: &[SourceFile],
    table: &EncodingTable,
) -> Result<CompanyRegistry, AnalysisError> {
    let parsed: Vec<ParsedFile> = files
        .iter()
        .map(|f| parse_extract_bytes(&f.bytes, &f.filename, table))
        .collect();

    if parsed.iter().all(|p| p.rows.is_empty()) {
        return Err(AnalysisError::NoUsableData);
    }

    Ok(build_timelines(parsed))
}

/// Fold parsed files into the company map.
///
/// Files without a filename year are excluded entirely; the rest are
/// processed in ascending year order.
pub fn build_timelines(mut files: Vec<ParsedFile>) -> CompanyRegistry {
    files.retain(|f| f.year.is_some());
    files.sort_by_key(|f| f.year);

    let mut registry = CompanyRegistry::default();

    for file in &files {
        // retain() above guarantees a year here
        let Some(year) = file.year else { continue };

        if !registry.years.contains(&year) {
            registry.years.push(year);
        }

        for row in &file.rows {
            fold_row(&mut registry, row, year);
        }
    }

    registry.years.sort_unstable();

    // Mandatory before any downstream pairwise comparison
    for company in registry.companies.values_mut() {
        company.timeline.sort_by_key(|e| e.year);
    }

    info!(
        "built timelines for {} companies across {} years",
        registry.companies.len(),
        registry.years.len()
    );

    registry
}

fn fold_row(registry: &mut CompanyRegistry, row: &RawRow, year: i32) {
    let orgnr = row.get(COL_ORGNR);
    if orgnr.is_empty() {
        debug!("dropping row without {} for year {}", COL_ORGNR, year);
        return;
    }

    let company = registry
        .companies
        .entry(orgnr.to_string())
        .or_insert_with(|| Company {
            orgnr: orgnr.to_string(),
            name: String::new(),
            timeline: Vec::new(),
        });

    let name = row.get(COL_NAME);
    if !name.is_empty() {
        company.name = name.to_string();
    }

    let entry = TimelineEntry {
        year,
        address: row.get(COL_ADDRESS).to_string(),
        postal_code: row.get(COL_POSTAL_CODE).to_string(),
        postal_place: row.get(COL_POSTAL_PLACE).to_string(),
        employees: parse_employee_count(row.get(COL_EMPLOYEES)),
        founded_date: row.get(COL_FOUNDED).to_string(),
        org_form: row.get(COL_ORG_FORM).to_string(),
    };

    // Upsert: at most one entry per (company, year)
    match company.timeline.iter_mut().find(|e| e.year == year) {
        Some(existing) => *existing = entry,
        None => company.timeline.push(entry),
    }
}

/// Parse an employee count, stripping internal whitespace first (extracts
/// use spaces as thousands separators). Unparsable values become 0.
pub fn parse_employee_count(raw: &str) -> u32 {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    cleaned.parse().unwrap_or(0)
}

// ============================================================================
// TESTS
// ============================================================================
