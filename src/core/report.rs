//! Report assembly: ranked categories flattened into styled rows.

use serde::Serialize;

use super::category::{Category, Classification, Classifier};
use super::cell::{CellValue, Color};
use super::issue::Issue;
use super::normalize::{display_title, format_date, priority_label, status_color};
use super::rank::rank_all;

/// Number of columns in the report.
pub const COLUMN_COUNT: usize = 14;

/// 1-based index of the title column.
pub const TITLE_COLUMN: usize = 3;

/// Header row.
pub const HEADERS: [&str; COLUMN_COUNT] = [
    "プロジェクト",
    "優先度",
    "タスク名",
    "ステータス",
    "担当者",
    "工数見積(人日)",
    "消化工数(人日)",
    "残工数(人日)",
    "進捗率(%)",
    "前回の進捗率(%)",
    "進捗差分(%)",
    "予定リリース日",
    "リリース日",
    "備考",
];

/// A single styled report row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// Issue the row was built from
    pub issue_id: String,
    /// Category the issue was placed in
    pub category: Category,
    /// Cell values, one per header column
    pub cells: Vec<CellValue>,
    /// Row background, `None` leaves the surface default
    pub background: Option<Color>,
}

impl ReportRow {
    /// Build the row for an issue in the given category.
    pub fn from_issue(issue: &Issue, category: Category) -> Self {
        let status = issue.status_name().unwrap_or("");

        let estimate = match issue.estimate {
            Some(estimate) if estimate != 0.0 && estimate.is_finite() => {
                CellValue::Number(estimate)
            }
            _ => CellValue::Empty,
        };

        let cells = vec![
            CellValue::text(issue.project_name().unwrap_or("")),
            CellValue::text(priority_label(issue.priority)),
            display_title(issue),
            CellValue::text(status),
            CellValue::text(issue.assignee_name().unwrap_or("")),
            estimate,
            // Consumed, remaining, progress, previous progress and delta are
            // filled in by hand.
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Empty,
            CellValue::text(format_date(issue.due_date.as_deref())),
            CellValue::text(format_date(issue.completed_at.as_deref())),
            CellValue::Empty,
        ];

        Self { issue_id: issue.id.clone(), category, cells, background: status_color(status) }
    }
}

/// The assembled report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    /// Rows in final order
    pub rows: Vec<ReportRow>,
    /// Issues excluded from every category
    pub dropped: usize,
}

impl Report {
    /// Number of rows in a category.
    pub fn count(&self, category: Category) -> usize {
        self.rows.iter().filter(|r| r.category == category).count()
    }

    /// Whether the report has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Flatten ranked categories into rows, in fixed category order.
pub fn assemble(classification: &Classification<'_>) -> Vec<ReportRow> {
    classification
        .iter()
        .flat_map(|(category, issues)| {
            issues.iter().map(move |issue| ReportRow::from_issue(issue, category))
        })
        .collect()
}

/// Classify, rank and assemble in one pass.
pub fn build_report(issues: &[Issue], classifier: &Classifier) -> Report {
    let mut classification = classifier.classify(issues);
    rank_all(&mut classification);

    let rows = assemble(&classification);
    for (category, bucket) in classification.iter() {
        if !bucket.is_empty() {
            tracing::debug!(category = %category, count = bucket.len(), "Ranked category");
        }
    }

    Report { rows, dropped: classification.dropped() }
}
