//! End-to-end report run: fetch, classify, rank, assemble, write.

use chrono::{DateTime, Local, Utc};
use thiserror::Error;

use crate::core::{build_report, Classifier, ConfigError, Report, ReportSettings};
use crate::integrations::{IssueSource, LinearClient, LinearError};
use crate::surface::{sheet_name, write_report, SheetsWorkbook, SurfaceError, Workbook, WriteSummary};

/// Result type for report runs.
pub type ReportResult<T> = Result<T, ReportError>;

/// Fatal errors of a report run. Unrecognized statuses and unparseable dates
/// are not errors; they only shape the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A credential or destination ID is absent.
    #[error("{0}")]
    ConfigurationMissing(ConfigError),

    /// The configuration exists but is unusable.
    #[error("{0}")]
    Configuration(ConfigError),

    /// Network or HTTP failure while fetching issues.
    #[error("Failed to fetch issues: {0}")]
    Transport(LinearError),

    /// The issue response did not have the expected shape.
    #[error("Malformed issue response: {0}")]
    MalformedResponse(String),

    /// Writing the report failed.
    #[error("Failed to write report: {0}")]
    Surface(#[from] SurfaceError),
}

impl From<ConfigError> for ReportError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::Missing { .. } => Self::ConfigurationMissing(error),
            other => Self::Configuration(other),
        }
    }
}

impl From<LinearError> for ReportError {
    fn from(error: LinearError) -> Self {
        match error {
            LinearError::MalformedResponse(message) => Self::MalformedResponse(message),
            other => Self::Transport(other),
        }
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Sheet title the report was written to
    pub sheet: String,
    /// Issues returned by the source
    pub fetched: usize,
    /// The assembled report
    pub report: Report,
    /// What the writer did
    pub write: WriteSummary,
}

/// A configured report pipeline.
pub struct ReportPipeline<S: IssueSource> {
    settings: ReportSettings,
    source: S,
}

impl ReportPipeline<LinearClient> {
    /// Pipeline backed by the Linear API.
    pub fn linear(settings: ReportSettings) -> Self {
        let client = LinearClient::new(settings.linear_api_key.clone())
            .with_api_url(settings.linear_api_url.clone());
        Self::new(settings, client)
    }
}

impl<S: IssueSource> ReportPipeline<S> {
    /// Create a pipeline from resolved settings and an issue source.
    pub fn new(settings: ReportSettings, source: S) -> Self {
        Self { settings, source }
    }

    /// Settings the pipeline runs with.
    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Google Sheets workbook for the configured destination.
    pub fn sheets_workbook(&self) -> ReportResult<SheetsWorkbook> {
        let (spreadsheet_id, token) = self.settings.destination()?;
        Ok(SheetsWorkbook::new(spreadsheet_id, token.clone())
            .with_api_url(self.settings.sheets_api_url.clone()))
    }

    /// Fetch issues and build the report as of `now`, without writing anything.
    pub async fn build(&self, now: DateTime<Utc>) -> ReportResult<(usize, Report)> {
        let issues = self.source.fetch_issues(&self.settings.query).await?;
        tracing::info!(source = self.source.name(), count = issues.len(), "Fetched issues");

        let classifier = Classifier::new(now, self.settings.recent_done_days);
        let report = build_report(&issues, &classifier);
        if report.dropped > 0 {
            tracing::info!(dropped = report.dropped, "Issues excluded from the report");
        }

        Ok((issues.len(), report))
    }

    /// Run the whole pipeline and write the report into the sheet dated `now`.
    pub async fn run(
        &self,
        workbook: &mut dyn Workbook,
        now: DateTime<Local>,
    ) -> ReportResult<RunSummary> {
        let sheet = sheet_name(now.date_naive());
        let (fetched, report) = self.build(now.with_timezone(&Utc)).await?;

        let write = write_report(workbook, &sheet, &report.rows, &self.settings.layout).await?;

        Ok(RunSummary { sheet, fetched, report, write })
    }
}
