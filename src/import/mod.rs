//! Bulk import of families and subfamilies from a spreadsheet.
//!
//! Rows are processed one at a time, in file order, because a later row may
//! reuse a family created by an earlier one. A failing row is recorded and
//! skipped; nothing already written is rolled back.

pub mod error;
pub mod outcome;
pub mod parser;
pub mod resolver;
pub mod template;

pub use error::{ImportError, RowError, RowFailure};
pub use outcome::{FailedRow, ImportReport, ImportResult, ImportStatus, ImportSummary};
pub use parser::{parse_rows, Column, ImportRow, RowData};
pub use resolver::{HierarchyResolver, ResolvedRow};
pub use template::{template_csv, template_rows, template_xlsx, TEMPLATE_CSV_FILE_NAME, TEMPLATE_FILE_NAME};

use tracing::{info, warn};

use crate::domain::events::DomainEvent;
use crate::store::HierarchyStore;

/// A finished run: the report plus every event it raised, `ImportCompleted` last.
#[derive(Debug)]
pub struct ImportRun {
    pub report: ImportReport,
    pub events: Vec<DomainEvent>,
}

/// Parses `bytes` and reconciles every row against the store.
pub async fn import_sheet(store: &dyn HierarchyStore, bytes: &[u8]) -> Result<ImportRun, ImportError> {
    info!(bytes = bytes.len(), "import started");
    let rows = parse_rows(bytes)?;
    import_rows(store, rows).await
}

pub async fn import_rows(store: &dyn HierarchyStore, rows: Vec<ImportRow>) -> Result<ImportRun, ImportError> {
    let mut resolver = HierarchyResolver::load(store).await?;
    let mut result = ImportResult::new();

    for ImportRow { row, data } in rows {
        match resolver.resolve(&data).await {
            Ok(resolved) => result.record_success(&resolved),
            Err(failure) => {
                warn!(row, code = failure.error.code(), error = %failure.error, "import row rejected");
                result.record_failure(row, data, &failure);
            }
        }
    }

    info!(
        total = result.total_rows,
        families = result.successful_families,
        subfamilies = result.successful_subfamilies,
        failed = result.failed_rows.len(),
        "import finished"
    );

    let mut events = resolver.take_events();
    events.push(DomainEvent::ImportCompleted {
        total_rows: result.total_rows,
        created_families: result.successful_families,
        created_subfamilies: result.successful_subfamilies,
        failed_rows: result.failed_rows.len(),
    });

    Ok(ImportRun { report: result.into(), events })
}
