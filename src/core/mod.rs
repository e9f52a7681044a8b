//! Core types and functionality for the report.
//!
//! This module contains the issue model, configuration, and the pure
//! classify / rank / assemble pipeline that turns issues into report rows.

mod category;
mod cell;
mod config;
mod issue;
mod normalize;
mod rank;
mod report;

pub use category::{status, Category, Classification, Classifier, DEFAULT_RECENT_DONE_DAYS};
pub use cell::{CellValue, Color};
pub use config::{
    Config, ConfigError, ConfigResult, LinearConfig, ReportConfig, ReportSettings, SheetsConfig,
};
pub use issue::{Issue, IssueState, LabelConnection, NamedRef, Priority};
pub use normalize::{
    display_title, format_date, parse_calendar_date, parse_instant, priority_label, status_color,
};
pub use rank::{rank, rank_all, weight};
pub use report::{assemble, build_report, Report, ReportRow, COLUMN_COUNT, HEADERS, TITLE_COLUMN};
