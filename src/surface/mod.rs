//! Destination surfaces for the report.
//!
//! A [`Workbook`] is a collection of named sheets. The writer only needs a
//! handful of operations from it, so the same report can land in Google
//! Sheets or in memory (for previews and tests).

mod memory;
mod sheets;
mod writer;

pub use memory::{MemorySheet, MemoryWorkbook};
pub use sheets::{SheetsWorkbook, DEFAULT_SHEETS_API_URL};
pub use writer::{sheet_name, write_report, SheetLayout, WriteSummary};

use async_trait::async_trait;
use thiserror::Error;

use crate::core::{CellValue, Color};

/// Result type for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Errors raised by workbook backends.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Sheet not found: {0}")]
    NotFound(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Handle to a sheet inside a workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetHandle {
    /// Backend specific sheet ID
    pub id: i64,
    /// Sheet title
    pub title: String,
}

/// Operations the report writer needs from a workbook.
///
/// Row and column indices are 1-based, like spreadsheet coordinates.
#[async_trait]
pub trait Workbook: Send {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    /// Find a sheet by title.
    async fn resolve_sheet(&mut self, title: &str) -> SurfaceResult<Option<SheetHandle>>;

    /// Create a sheet at the given tab position.
    async fn create_sheet(&mut self, title: &str, position: usize) -> SurfaceResult<SheetHandle>;

    /// Remove all values and formatting.
    async fn clear(&mut self, sheet: &SheetHandle) -> SurfaceResult<()>;

    /// Write one row of values starting at the first column.
    async fn write_row(
        &mut self,
        sheet: &SheetHandle,
        row: usize,
        values: &[CellValue],
    ) -> SurfaceResult<()>;

    /// Fill the first `columns` cells of a row with a background color.
    async fn set_background(
        &mut self,
        sheet: &SheetHandle,
        row: usize,
        columns: usize,
        color: Color,
    ) -> SurfaceResult<()>;

    /// Style the header row: bold, inverse colors (white on black).
    async fn set_header_style(&mut self, sheet: &SheetHandle, columns: usize) -> SurfaceResult<()>;

    /// Keep the first row visible while scrolling.
    async fn freeze_first_row(&mut self, sheet: &SheetHandle) -> SurfaceResult<()>;

    /// Set a column's width in pixels.
    async fn set_column_width(
        &mut self,
        sheet: &SheetHandle,
        column: usize,
        pixels: u32,
    ) -> SurfaceResult<()>;

    /// Push any buffered changes. Backends that apply changes immediately need not override this.
    async fn flush(&mut self, _sheet: &SheetHandle) -> SurfaceResult<()> {
        Ok(())
    }
}
