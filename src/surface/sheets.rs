//! Google Sheets workbook backend (Sheets API v4).
//!
//! Sheet lookup and creation hit the API immediately. Every other mutation is
//! queued and sent as a single `batchUpdate` on [`Workbook::flush`], so a run
//! that fails before flushing leaves the existing sheet untouched.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{SheetHandle, SurfaceError, SurfaceResult, Workbook};
use crate::core::{CellValue, Color};
use crate::security::SecretValue;

/// Default Sheets API endpoint.
pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Google Sheets API client bound to one spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsWorkbook {
    /// Spreadsheet ID
    spreadsheet_id: String,
    /// OAuth bearer token
    token: SecretValue,
    /// API base URL
    api_url: String,
    /// HTTP client
    client: reqwest::Client,
    /// Requests waiting for the next flush
    pending: Vec<Value>,
}

#[derive(Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
}

impl SheetsWorkbook {
    /// Create a client for a spreadsheet.
    pub fn new(spreadsheet_id: impl Into<String>, token: SecretValue) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            token,
            api_url: DEFAULT_SHEETS_API_URL.to_string(),
            client: reqwest::Client::new(),
            pending: Vec::new(),
        }
    }

    /// Override the API base URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Requests queued for the next flush.
    pub fn pending(&self) -> &[Value] {
        &self.pending
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/{}", self.api_url, self.spreadsheet_id)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> SurfaceResult<Value> {
        let response = request.bearer_auth(self.token.expose()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SurfaceError::Unauthorized);
        }

        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| body.pointer("/error/message").and_then(Value::as_str).map(String::from))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            return Err(SurfaceError::Api { status: status.as_u16(), message });
        }

        serde_json::from_str(&text)
            .map_err(|e| SurfaceError::MalformedResponse(format!("invalid JSON body: {e}")))
    }

    async fn batch_update(&self, requests: Vec<Value>) -> SurfaceResult<Value> {
        let url = format!("{}:batchUpdate", self.spreadsheet_url());
        tracing::debug!(requests = requests.len(), "Sending Sheets batchUpdate");
        self.send(self.client.post(url).json(&json!({ "requests": requests }))).await
    }
}

#[async_trait]
impl Workbook for SheetsWorkbook {
    fn name(&self) -> &str {
        "google-sheets"
    }

    async fn resolve_sheet(&mut self, title: &str) -> SurfaceResult<Option<SheetHandle>> {
        let request = self
            .client
            .get(self.spreadsheet_url())
            .query(&[("fields", "sheets.properties(sheetId,title,index)")]);
        let body = self.send(request).await?;

        let spreadsheet: SpreadsheetResponse = serde_json::from_value(body)
            .map_err(|e| SurfaceError::MalformedResponse(format!("spreadsheet metadata: {e}")))?;

        Ok(spreadsheet
            .sheets
            .into_iter()
            .find(|s| s.properties.title == title)
            .map(|s| SheetHandle { id: s.properties.sheet_id, title: s.properties.title }))
    }

    async fn create_sheet(&mut self, title: &str, position: usize) -> SurfaceResult<SheetHandle> {
        let body = self.batch_update(vec![add_sheet_request(title, position)]).await?;

        let sheet_id = body
            .pointer("/replies/0/addSheet/properties/sheetId")
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                SurfaceError::MalformedResponse("addSheet reply without sheetId".to_string())
            })?;

        Ok(SheetHandle { id: sheet_id, title: title.to_string() })
    }

    async fn clear(&mut self, sheet: &SheetHandle) -> SurfaceResult<()> {
        self.pending.push(clear_request(sheet.id));
        Ok(())
    }

    async fn write_row(
        &mut self,
        sheet: &SheetHandle,
        row: usize,
        values: &[CellValue],
    ) -> SurfaceResult<()> {
        self.pending.push(write_row_request(sheet.id, row, values));
        Ok(())
    }

    async fn set_background(
        &mut self,
        sheet: &SheetHandle,
        row: usize,
        columns: usize,
        color: Color,
    ) -> SurfaceResult<()> {
        self.pending.push(background_request(sheet.id, row, columns, color));
        Ok(())
    }

    async fn set_header_style(&mut self, sheet: &SheetHandle, columns: usize) -> SurfaceResult<()> {
        self.pending.push(header_style_request(sheet.id, columns));
        Ok(())
    }

    async fn freeze_first_row(&mut self, sheet: &SheetHandle) -> SurfaceResult<()> {
        self.pending.push(json!({
            "updateSheetProperties": {
                "properties": { "sheetId": sheet.id, "gridProperties": { "frozenRowCount": 1 } },
                "fields": "gridProperties.frozenRowCount"
            }
        }));
        Ok(())
    }

    async fn set_column_width(
        &mut self,
        sheet: &SheetHandle,
        column: usize,
        pixels: u32,
    ) -> SurfaceResult<()> {
        self.pending.push(json!({
            "updateDimensionProperties": {
                "range": {
                    "sheetId": sheet.id,
                    "dimension": "COLUMNS",
                    "startIndex": column - 1,
                    "endIndex": column
                },
                "properties": { "pixelSize": pixels },
                "fields": "pixelSize"
            }
        }));
        Ok(())
    }

    async fn flush(&mut self, _sheet: &SheetHandle) -> SurfaceResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let requests = std::mem::take(&mut self.pending);
        self.batch_update(requests).await?;
        Ok(())
    }
}

fn add_sheet_request(title: &str, position: usize) -> Value {
    json!({ "addSheet": { "properties": { "title": title, "index": position } } })
}

fn clear_request(sheet_id: i64) -> Value {
    json!({ "updateCells": { "range": { "sheetId": sheet_id }, "fields": "*" } })
}

fn write_row_request(sheet_id: i64, row: usize, values: &[CellValue]) -> Value {
    let cells: Vec<Value> = values.iter().map(cell_data).collect();
    json!({
        "updateCells": {
            "start": { "sheetId": sheet_id, "rowIndex": row - 1, "columnIndex": 0 },
            "rows": [{ "values": cells }],
            "fields": "userEnteredValue"
        }
    })
}

fn cell_data(value: &CellValue) -> Value {
    match value {
        CellValue::Empty => json!({}),
        CellValue::Text(text) => json!({ "userEnteredValue": { "stringValue": text } }),
        CellValue::Number(number) => json!({ "userEnteredValue": { "numberValue": number } }),
        CellValue::Formula(formula) => json!({ "userEnteredValue": { "formulaValue": formula } }),
    }
}

fn color_json(color: Color) -> Value {
    let (red, green, blue) = color.to_unit_rgb();
    json!({ "red": red, "green": green, "blue": blue })
}

fn row_range(sheet_id: i64, row: usize, columns: usize) -> Value {
    json!({
        "sheetId": sheet_id,
        "startRowIndex": row - 1,
        "endRowIndex": row,
        "startColumnIndex": 0,
        "endColumnIndex": columns
    })
}

fn background_request(sheet_id: i64, row: usize, columns: usize, color: Color) -> Value {
    json!({
        "repeatCell": {
            "range": row_range(sheet_id, row, columns),
            "cell": { "userEnteredFormat": { "backgroundColor": color_json(color) } },
            "fields": "userEnteredFormat.backgroundColor"
        }
    })
}

fn header_style_request(sheet_id: i64, columns: usize) -> Value {
    json!({
        "repeatCell": {
            "range": row_range(sheet_id, 1, columns),
            "cell": {
                "userEnteredFormat": {
                    "backgroundColor": color_json(Color::BLACK),
                    "textFormat": { "foregroundColor": color_json(Color::WHITE), "bold": true }
                }
            },
            "fields": "userEnteredFormat(backgroundColor,textFormat)"
        }
    })
}
