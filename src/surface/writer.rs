//! Writes an assembled report into a dated sheet.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{SheetHandle, SurfaceResult, Workbook};
use crate::core::{CellValue, ReportRow, COLUMN_COUNT, HEADERS, TITLE_COLUMN};

/// Column sizing for the report sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Width of the title column in pixels
    pub title_column_width: u32,
    /// Width of every other column in pixels
    pub column_width: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self { title_column_width: 500, column_width: 100 }
    }
}

/// Outcome of a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    /// Sheet that received the report
    pub sheet: SheetHandle,
    /// Whether the sheet was created by this write
    pub created: bool,
    /// Number of data rows written
    pub rows_written: usize,
}

/// Sheet title for a report date.
pub fn sheet_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Replace the contents of the named sheet with the report.
///
/// The sheet is created at the first tab position when missing and cleared
/// otherwise. Data rows start at row 2, under a frozen, styled header.
pub async fn write_report(
    workbook: &mut dyn Workbook,
    title: &str,
    rows: &[ReportRow],
    layout: &SheetLayout,
) -> SurfaceResult<WriteSummary> {
    let (sheet, created) = match workbook.resolve_sheet(title).await? {
        Some(sheet) => {
            tracing::debug!(sheet = title, "Clearing existing sheet");
            workbook.clear(&sheet).await?;
            (sheet, false)
        }
        None => {
            tracing::debug!(sheet = title, "Creating sheet");
            (workbook.create_sheet(title, 0).await?, true)
        }
    };

    let header: Vec<CellValue> = HEADERS.iter().map(|h| CellValue::text(*h)).collect();
    workbook.write_row(&sheet, 1, &header).await?;
    workbook.freeze_first_row(&sheet).await?;
    workbook.set_header_style(&sheet, COLUMN_COUNT).await?;

    for (offset, row) in rows.iter().enumerate() {
        let index = offset + 2;
        workbook.write_row(&sheet, index, &row.cells).await?;
        if let Some(color) = row.background {
            workbook.set_background(&sheet, index, COLUMN_COUNT, color).await?;
        }
    }

    for column in 1..=COLUMN_COUNT {
        let width =
            if column == TITLE_COLUMN { layout.title_column_width } else { layout.column_width };
        workbook.set_column_width(&sheet, column, width).await?;
    }

    workbook.flush(&sheet).await?;

    tracing::info!(
        workbook = workbook.name(),
        sheet = title,
        rows = rows.len(),
        created,
        "Report written"
    );

    Ok(WriteSummary { sheet, created, rows_written: rows.len() })
}
