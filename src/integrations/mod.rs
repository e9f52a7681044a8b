//! External integrations module.
//!
//! Provides the issue tracker integration the report is built from.

pub mod linear;

pub use linear::{
    decode_issues_response, IssueQuery, IssueSource, LinearClient, LinearError, LinearResult,
    DEFAULT_FETCH_LIMIT, DEFAULT_LABEL, DEFAULT_LINEAR_API_URL,
};
