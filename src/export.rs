// Export snapshot: the read-only view handed to the export collaborators
// (CSV/PDF writers live outside this crate). Rows are flattened to the
// field set shared by change events and summaries.

use crate::analysis::{AddressChangeEvent, DatasetStatistics, EmployeeChangeSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One flat export row. Either a single address change or a whole-span
/// employee summary maps onto the same columns.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    pub orgnr: String,
    pub name: String,
    pub year: i32,
    pub old_address: String,
    pub new_address: String,
    pub employees_before: u32,
    pub employees_after: u32,
    pub change: i64,
    /// Formatted percent, `"N/A"` when undefined.
    pub change_percent: String,
}

impl From<&AddressChangeEvent> for ExportRow {
    fn from(event: &AddressChangeEvent) -> Self {
        ExportRow {
            orgnr: event.orgnr.clone(),
            name: event.name.clone(),
            year: event.year,
            old_address: event.old_address.clone(),
            new_address: event.new_address.clone(),
            employees_before: event.employees_before,
            employees_after: event.employees_after,
            change: event.employee_change,
            change_percent: event.employee_change_percent.to_string(),
        }
    }
}

impl From<&EmployeeChangeSummary> for ExportRow {
    fn from(summary: &EmployeeChangeSummary) -> Self {
        // A summary has no move address of its own; the last observed
        // address stands in for the "new" side
        let last_address = summary
            .timeline
            .last()
            .map(|e| e.address.clone())
            .unwrap_or_default();
        let first_address = summary
            .timeline
            .first()
            .map(|e| e.address.clone())
            .unwrap_or_default();

        ExportRow {
            orgnr: summary.orgnr.clone(),
            name: summary.name.clone(),
            year: summary.first_year,
            old_address: first_address,
            new_address: last_address,
            employees_before: summary.employees_start,
            employees_after: summary.employees_end,
            change: summary.total_change,
            change_percent: summary.total_change_percent.to_string(),
        }
    }
}

/// Immutable snapshot of the currently displayed result set plus the
/// statistics object. No mutation contract: consumers only read.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSnapshot {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<ExportRow>,
    pub statistics: DatasetStatistics,
}

impl ExportSnapshot {
    pub fn new(rows: Vec<ExportRow>, statistics: DatasetStatistics) -> Self {
        ExportSnapshot {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            rows,
            statistics,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
