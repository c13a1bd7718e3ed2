//! Outcome aggregation and the report returned to the admin screen.

use serde::Serialize;

use super::error::RowFailure;
use super::parser::RowData;
use super::resolver::ResolvedRow;
use crate::domain::aggregates::Family;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FailedRow {
    pub row: usize,
    pub data: RowData,
    pub error: &'static str,
    pub message: String,
}

/// Running tally of one import. Every processed row lands in exactly one of
/// `successful_rows` or `failed_rows`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub total_rows: usize,
    pub successful_rows: usize,
    pub successful_families: usize,
    pub successful_subfamilies: usize,
    pub failed_rows: Vec<FailedRow>,
    pub created_families: Vec<String>,
    pub created_subfamilies: Vec<String>,
}

impl ImportResult {
    pub fn new() -> Self { Self::default() }

    pub fn record_success(&mut self, resolved: &ResolvedRow) {
        self.total_rows += 1;
        self.successful_rows += 1;
        if resolved.family_created {
            self.record_created_family(&resolved.family);
        }
        if let (true, Some(subfamily)) = (resolved.subfamily_created, &resolved.subfamily) {
            self.successful_subfamilies += 1;
            self.created_subfamilies.push(format!("{} - {}", subfamily.reference, subfamily.name));
        }
    }

    /// Counts the row as failed. A family the row created before failing is still counted as created.
    pub fn record_failure(&mut self, row: usize, data: RowData, failure: &RowFailure) {
        self.total_rows += 1;
        if let Some(family) = &failure.created_family {
            self.record_created_family(family);
        }
        let error = &failure.error;
        self.failed_rows.push(FailedRow { row, data, error: error.code(), message: error.to_string() });
    }

    fn record_created_family(&mut self, family: &Family) {
        self.successful_families += 1;
        self.created_families.push(format!("{} - {}", family.reference, family.name));
    }

    pub fn has_failures(&self) -> bool { !self.failed_rows.is_empty() }

    /// Share of rows that went through, as a rounded percentage.
    pub fn success_rate(&self) -> u32 {
        if self.total_rows == 0 { return 0; }
        ((self.successful_rows * 100 + self.total_rows / 2) / self.total_rows) as u32
    }

    pub fn summary(&self) -> ImportSummary {
        let status = if self.has_failures() { ImportStatus::CompletedWithErrors } else { ImportStatus::Succeeded };
        ImportSummary { status, title: status.title(), success_rate: self.success_rate() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportStatus {
    Succeeded,
    CompletedWithErrors,
}

impl ImportStatus {
    pub fn title(self) -> &'static str {
        match self {
            Self::Succeeded => "Import Réussi",
            Self::CompletedWithErrors => "Import Terminé avec des Erreurs",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub status: ImportStatus,
    pub title: &'static str,
    pub success_rate: u32,
}

/// Body of a completed import response.
#[derive(Clone, Debug, Serialize)]
pub struct ImportReport {
    pub success: bool,
    pub message: &'static str,
    pub result: ImportResult,
    pub summary: ImportSummary,
}

impl From<ImportResult> for ImportReport {
    fn from(result: ImportResult) -> Self {
        let summary = result.summary();
        Self { success: true, message: "Import terminé", result, summary }
    }
}
