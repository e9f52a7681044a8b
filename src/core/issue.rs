//! Issue records as returned by the Linear GraphQL API.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A Linear issue, restricted to the fields the report consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Issue ID
    pub id: String,
    /// Issue title
    pub title: Option<String>,
    /// Owning project
    pub project: Option<NamedRef>,
    /// Workflow state
    pub state: Option<IssueState>,
    /// Assignee
    pub assignee: Option<NamedRef>,
    /// Estimate in points (treated as person-days in the report)
    pub estimate: Option<f64>,
    /// Due date (`YYYY-MM-DD`)
    pub due_date: Option<String>,
    /// Completion timestamp (RFC 3339)
    pub completed_at: Option<String>,
    /// Issue description (markdown)
    pub description: Option<String>,
    /// Issue labels
    pub labels: Option<LabelConnection>,
    /// Issue priority
    #[serde(default)]
    pub priority: Priority,
    /// URL to the issue
    pub url: Option<String>,
}

/// Any object the API exposes only by name (projects, users).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

/// A Linear issue state (workflow state).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueState {
    /// State name
    pub name: String,
    /// State type (backlog, unstarted, started, completed, canceled, triage)
    #[serde(rename = "type", default)]
    pub state_type: String,
}

/// GraphQL connection wrapping the issue's labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConnection {
    #[serde(default)]
    pub nodes: Vec<NamedRef>,
}

impl Issue {
    /// Create an issue with just an ID, mostly useful for tests and fixtures.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the workflow state by name.
    pub fn with_status(mut self, name: impl Into<String>) -> Self {
        self.state = Some(IssueState { name: name.into(), state_type: String::new() });
        self
    }

    /// Set the priority level.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the completion timestamp.
    pub fn with_completed_at(mut self, completed_at: impl Into<String>) -> Self {
        self.completed_at = Some(completed_at.into());
        self
    }

    /// Set the issue URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Workflow state name, if the issue has a state.
    pub fn status_name(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.name.as_str())
    }

    /// Project name, if the issue belongs to one.
    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.name.as_str())
    }

    /// Assignee name, if the issue is assigned.
    pub fn assignee_name(&self) -> Option<&str> {
        self.assignee.as_ref().map(|a| a.name.as_str())
    }

    /// Names of all labels on the issue.
    pub fn label_names(&self) -> Vec<&str> {
        self.labels
            .as_ref()
            .map(|l| l.nodes.iter().map(|n| n.name.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Issue priority as Linear encodes it (0 = none, 1 = urgent ... 4 = low).
///
/// Values outside that range are kept as [`Priority::Unrecognized`] instead of
/// being rejected, so a schema change upstream degrades the report rather than
/// aborting it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Priority {
    /// No priority (0, null or absent)
    #[default]
    Unset,
    Urgent,
    High,
    Medium,
    Low,
    /// Any other number
    Unrecognized(f64),
}

impl Priority {
    /// Map an integral level to a priority.
    pub fn from_level(level: i64) -> Self {
        match level {
            0 => Self::Unset,
            1 => Self::Urgent,
            2 => Self::High,
            3 => Self::Medium,
            4 => Self::Low,
            other => Self::Unrecognized(other as f64),
        }
    }

    /// Map a raw JSON number (or null) to a priority.
    pub fn from_raw(raw: Option<f64>) -> Self {
        match raw {
            None => Self::Unset,
            Some(value) if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 => {
                Self::from_level(value as i64)
            }
            Some(value) => Self::Unrecognized(value),
        }
    }

    /// Numeric level, `None` when unset.
    pub fn level(self) -> Option<f64> {
        match self {
            Self::Unset => None,
            Self::Urgent => Some(1.0),
            Self::High => Some(2.0),
            Self::Medium => Some(3.0),
            Self::Low => Some(4.0),
            Self::Unrecognized(value) => Some(value),
        }
    }

    /// Whether the issue carries any nonzero priority, recognized or not.
    pub fn is_set(self) -> bool {
        !matches!(self, Self::Unset)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level() {
            Some(level) => write!(f, "{level}"),
            None => f.write_str("none"),
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<f64>::deserialize(deserializer).map(Self::from_raw)
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.level() {
            Some(level) => serializer.serialize_f64(level),
            None => serializer.serialize_none(),
        }
    }
}
