//! In-memory workbook, used for dry runs, previews and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{SheetHandle, SurfaceError, SurfaceResult, Workbook};
use crate::core::{CellValue, Color};

/// A sheet held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySheet {
    /// Sheet ID
    pub id: i64,
    /// Sheet title
    pub title: String,
    /// Rows by 1-based index
    rows: BTreeMap<usize, Vec<CellValue>>,
    /// Row backgrounds by 1-based index
    backgrounds: BTreeMap<usize, Color>,
    /// Column widths by 1-based index
    column_widths: BTreeMap<usize, u32>,
    /// Whether the header style was applied
    header_styled: bool,
    /// Number of frozen rows
    frozen_rows: usize,
}

impl MemorySheet {
    fn new(id: i64, title: &str) -> Self {
        Self { id, title: title.to_string(), ..Self::default() }
    }

    /// Values of a row.
    pub fn row(&self, row: usize) -> Option<&[CellValue]> {
        self.rows.get(&row).map(Vec::as_slice)
    }

    /// Index of the last written row, 0 when the sheet is empty.
    pub fn last_row(&self) -> usize {
        self.rows.keys().next_back().copied().unwrap_or(0)
    }

    /// Background of a row.
    pub fn background(&self, row: usize) -> Option<Color> {
        self.backgrounds.get(&row).copied()
    }

    /// Width of a column.
    pub fn column_width(&self, column: usize) -> Option<u32> {
        self.column_widths.get(&column).copied()
    }

    /// Whether the header style was applied.
    pub fn is_header_styled(&self) -> bool {
        self.header_styled
    }

    /// Number of frozen rows.
    pub fn frozen_rows(&self) -> usize {
        self.frozen_rows
    }

    /// Render rows as tab separated text, one line per row.
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        for row in 1..=self.last_row() {
            let line = self
                .row(row)
                .map(|cells| cells.iter().map(ToString::to_string).collect::<Vec<_>>().join("\t"))
                .unwrap_or_default();
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

/// A workbook held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<MemorySheet>,
    next_id: i64,
}

impl MemoryWorkbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sheets in tab order.
    pub fn sheets(&self) -> &[MemorySheet] {
        &self.sheets
    }

    /// Find a sheet by title.
    pub fn sheet(&self, title: &str) -> Option<&MemorySheet> {
        self.sheets.iter().find(|s| s.title == title)
    }

    /// Sheet titles in tab order.
    pub fn titles(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.title.as_str()).collect()
    }

    fn sheet_mut(&mut self, handle: &SheetHandle) -> SurfaceResult<&mut MemorySheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.id == handle.id)
            .ok_or_else(|| SurfaceError::NotFound(handle.title.clone()))
    }
}

#[async_trait]
impl Workbook for MemoryWorkbook {
    fn name(&self) -> &str {
        "memory"
    }

    async fn resolve_sheet(&mut self, title: &str) -> SurfaceResult<Option<SheetHandle>> {
        Ok(self.sheet(title).map(|s| SheetHandle { id: s.id, title: s.title.clone() }))
    }

    async fn create_sheet(&mut self, title: &str, position: usize) -> SurfaceResult<SheetHandle> {
        let id = self.next_id;
        self.next_id += 1;

        let position = position.min(self.sheets.len());
        self.sheets.insert(position, MemorySheet::new(id, title));
        Ok(SheetHandle { id, title: title.to_string() })
    }

    async fn clear(&mut self, sheet: &SheetHandle) -> SurfaceResult<()> {
        let target = self.sheet_mut(sheet)?;
        *target = MemorySheet::new(target.id, &target.title);
        Ok(())
    }

    async fn write_row(
        &mut self,
        sheet: &SheetHandle,
        row: usize,
        values: &[CellValue],
    ) -> SurfaceResult<()> {
        self.sheet_mut(sheet)?.rows.insert(row, values.to_vec());
        Ok(())
    }

    async fn set_background(
        &mut self,
        sheet: &SheetHandle,
        row: usize,
        _columns: usize,
        color: Color,
    ) -> SurfaceResult<()> {
        self.sheet_mut(sheet)?.backgrounds.insert(row, color);
        Ok(())
    }

    async fn set_header_style(&mut self, sheet: &SheetHandle, _columns: usize) -> SurfaceResult<()> {
        self.sheet_mut(sheet)?.header_styled = true;
        Ok(())
    }

    async fn freeze_first_row(&mut self, sheet: &SheetHandle) -> SurfaceResult<()> {
        self.sheet_mut(sheet)?.frozen_rows = 1;
        Ok(())
    }

    async fn set_column_width(
        &mut self,
        sheet: &SheetHandle,
        column: usize,
        pixels: u32,
    ) -> SurfaceResult<()> {
        self.sheet_mut(sheet)?.column_widths.insert(column, pixels);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_resolve() {
        let mut workbook = MemoryWorkbook::new();
        assert!(workbook.resolve_sheet("2024-06-30").await.unwrap().is_none());

        let handle = workbook.create_sheet("2024-06-30", 0).await.unwrap();
        let resolved = workbook.resolve_sheet("2024-06-30").await.unwrap();
        assert_eq!(resolved, Some(handle));
    }

    #[tokio::test]
    async fn test_create_inserts_at_position() {
        let mut workbook = MemoryWorkbook::new();
        workbook.create_sheet("old", 0).await.unwrap();
        workbook.create_sheet("new", 0).await.unwrap();
        workbook.create_sheet("last", 99).await.unwrap();
        assert_eq!(workbook.titles(), vec!["new", "old", "last"]);
    }

    #[tokio::test]
    async fn test_clear_resets_content() {
        let mut workbook = MemoryWorkbook::new();
        let sheet = workbook.create_sheet("s", 0).await.unwrap();
        workbook.write_row(&sheet, 1, &[CellValue::text("a")]).await.unwrap();
        workbook.set_background(&sheet, 1, 1, Color::ORANGE).await.unwrap();
        workbook.freeze_first_row(&sheet).await.unwrap();

        workbook.clear(&sheet).await.unwrap();
        let stored = workbook.sheet("s").unwrap();
        assert_eq!(stored.last_row(), 0);
        assert_eq!(stored.background(1), None);
        assert_eq!(stored.frozen_rows(), 0);
        assert_eq!(stored.id, sheet.id);
    }

    #[tokio::test]
    async fn test_unknown_handle_is_error() {
        let mut workbook = MemoryWorkbook::new();
        let ghost = SheetHandle { id: 42, title: "ghost".to_string() };
        let err = workbook.clear(&ghost).await.unwrap_err();
        assert!(matches!(err, SurfaceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_to_tsv() {
        let mut workbook = MemoryWorkbook::new();
        let sheet = workbook.create_sheet("s", 0).await.unwrap();
        workbook
            .write_row(&sheet, 1, &[CellValue::text("a"), CellValue::Empty, CellValue::Number(2.0)])
            .await
            .unwrap();
        workbook.write_row(&sheet, 2, &[CellValue::text("b")]).await.unwrap();

        assert_eq!(workbook.sheet("s").unwrap().to_tsv(), "a\t\t2\nb\n");
    }
}
