#![allow(clippy::cast_lossless)]
#![allow(clippy::float_cmp)]

//! # linear-report
//!
//! Daily Linear progress report: fetch the issues carrying the report label,
//! bucket them by workflow state, rank each bucket by priority and write the
//! result into a spreadsheet tab named after today's date.
//!
//! ## Pipeline
//!
//! - **Fetch**: one GraphQL query against Linear ([`integrations::LinearClient`])
//! - **Classify**: nine fixed categories ([`core::Classifier`])
//! - **Rank**: stable sort by priority weight ([`core::rank`])
//! - **Assemble**: styled 14-column rows ([`core::build_report`])
//! - **Write**: dated sheet in a [`surface::Workbook`]
//!
//! ## Quick Start
//!
//! ```bash
//! export LINEAR_API_KEY=lin_api_...
//! export SPREADSHEET_ID=1AbC...
//! export GOOGLE_SHEETS_TOKEN=ya29....
//!
//! # Preview without touching the spreadsheet
//! linear-report preview
//!
//! # Write today's sheet
//! linear-report
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::ref_option)]

pub mod core;
pub mod integrations;
pub mod pipeline;
pub mod security;
pub mod surface;

// Re-export commonly used types
pub use crate::core::{Category, Classifier, Config, Issue, Priority, Report, ReportRow, ReportSettings};
pub use integrations::{IssueQuery, IssueSource, LinearClient, LinearError};
pub use pipeline::{ReportError, ReportPipeline, ReportResult, RunSummary};
pub use security::{CredentialType, PropertySource, SecretValue, SecretsManager};
pub use surface::{MemoryWorkbook, SheetsWorkbook, SurfaceError, Workbook};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "linear-report";
