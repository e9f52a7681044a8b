//! Linear issue tracker integration.
//!
//! Fetches the issues that feed the report from Linear's GraphQL API.

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::{status, Issue};
use crate::security::SecretValue;

/// Default Linear GraphQL endpoint.
pub const DEFAULT_LINEAR_API_URL: &str = "https://api.linear.app/graphql";

/// Label that marks issues for the report.
pub const DEFAULT_LABEL: &str = "エピック";

/// Fetch cap. The report makes a single request and does not paginate.
pub const DEFAULT_FETCH_LIMIT: u32 = 200;

const REPORT_ISSUES_QUERY: &str = r#"
    query ReportIssues($first: Int!, $label: String!, $states: [String!]) {
        issues(first: $first, filter: {
            labels: { name: { eq: $label } },
            state: { name: { in: $states } }
        }) {
            nodes {
                id
                title
                project { name }
                state { name type }
                assignee { name }
                estimate
                dueDate
                completedAt
                description
                labels { nodes { name } }
                priority
                url
            }
        }
    }
"#;

/// Result type for Linear operations.
pub type LinearResult<T> = Result<T, LinearError>;

/// Error types for Linear operations.
#[derive(Debug, thiserror::Error)]
pub enum LinearError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GraphQL error: {0}")]
    GraphQL(String),

    #[error("Linear API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Filter for the report query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    /// Label every issue must carry
    pub label: String,
    /// Accepted workflow state names
    pub states: Vec<String>,
    /// Maximum number of issues to fetch
    pub limit: u32,
}

impl Default for IssueQuery {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            states: status::ALL.iter().map(ToString::to_string).collect(),
            limit: DEFAULT_FETCH_LIMIT,
        }
    }
}

impl IssueQuery {
    /// GraphQL variables for this query.
    pub fn variables(&self) -> serde_json::Value {
        serde_json::json!({
            "first": self.limit,
            "label": self.label,
            "states": self.states,
        })
    }
}

/// Anything that can supply issues for the report.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Source name, for logs.
    fn name(&self) -> &str;

    /// Fetch every issue matching the query.
    async fn fetch_issues(&self, query: &IssueQuery) -> LinearResult<Vec<Issue>>;
}

/// Linear API client.
#[derive(Debug, Clone)]
pub struct LinearClient {
    /// Linear API token
    token: SecretValue,
    /// GraphQL endpoint
    api_url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl LinearClient {
    /// Create a new Linear client.
    pub fn new(token: SecretValue) -> Self {
        Self { token, api_url: DEFAULT_LINEAR_API_URL.to_string(), client: reqwest::Client::new() }
    }

    /// Override the GraphQL endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Execute a GraphQL query and return its `data` object.
    async fn query(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> LinearResult<serde_json::Value> {
        let body = serde_json::json!({ "query": query, "variables": variables });

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", self.token.expose())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LinearError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LinearError::RateLimited);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| {
                    v.pointer("/errors/0/message").and_then(|m| m.as_str()).map(String::from)
                })
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            return Err(LinearError::Api { status: status.as_u16(), message });
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LinearError::MalformedResponse(format!("invalid JSON body: {e}")))?;

        extract_data(result)
    }

    /// Fetch the issues that feed the report.
    pub async fn fetch_report_issues(&self, query: &IssueQuery) -> LinearResult<Vec<Issue>> {
        tracing::debug!(label = %query.label, limit = query.limit, "Querying Linear issues");

        let data = self.query(REPORT_ISSUES_QUERY, query.variables()).await?;
        let issues = decode_issues(data)?;

        if issues.len() as u64 >= u64::from(query.limit) {
            tracing::warn!(limit = query.limit, "Fetch limit reached, report may be incomplete");
        }
        Ok(issues)
    }
}

#[async_trait]
impl IssueSource for LinearClient {
    fn name(&self) -> &str {
        "linear"
    }

    async fn fetch_issues(&self, query: &IssueQuery) -> LinearResult<Vec<Issue>> {
        self.fetch_report_issues(query).await
    }
}

/// Pull `data` out of a GraphQL response, surfacing the first GraphQL error.
fn extract_data(mut result: serde_json::Value) -> LinearResult<serde_json::Value> {
    if let Some(errors) = result.get("errors") {
        if let Some(first_error) = errors.as_array().and_then(|e| e.first()) {
            let message =
                first_error.get("message").and_then(|m| m.as_str()).unwrap_or("Unknown error");
            return Err(LinearError::GraphQL(message.to_string()));
        }
    }

    match result.get_mut("data").map(serde_json::Value::take) {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(LinearError::MalformedResponse("No data in response".to_string())),
    }
}

/// Decode `issues.nodes` from a GraphQL `data` object.
fn decode_issues(data: serde_json::Value) -> LinearResult<Vec<Issue>> {
    #[derive(Deserialize)]
    struct IssuesNode {
        nodes: Vec<Issue>,
    }

    #[derive(Deserialize)]
    struct Response {
        issues: IssuesNode,
    }

    serde_json::from_value::<Response>(data)
        .map(|response| response.issues.nodes)
        .map_err(|e| LinearError::MalformedResponse(format!("Failed to parse issues: {e}")))
}

/// Decode a full GraphQL response body into issues.
pub fn decode_issues_response(body: serde_json::Value) -> LinearResult<Vec<Issue>> {
    extract_data(body).and_then(decode_issues)
}
