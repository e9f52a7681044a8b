//! Report categories and the classifier that assigns issues to them.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::issue::Issue;
use super::normalize::parse_instant;

/// Workflow state names recognized by the report.
pub mod status {
    pub const DONE: &str = "完了";
    pub const AWAITING_RELEASE: &str = "リリース待ち";
    pub const IN_REVIEW: &str = "レビュー中";
    pub const IN_PROGRESS: &str = "進行中";
    pub const TODO: &str = "TODO";
    pub const ESTIMATING: &str = "見積もり中";
    pub const UNASSIGNED: &str = "未対応";
    pub const TRIAGE: &str = "Triage";

    /// Every recognized state, in report order. Used as the fetch filter.
    pub const ALL: [&str; 8] =
        [DONE, AWAITING_RELEASE, IN_REVIEW, IN_PROGRESS, TODO, ESTIMATING, UNASSIGNED, TRIAGE];
}

/// Default trailing window for recently completed issues.
pub const DEFAULT_RECENT_DONE_DAYS: u32 = 14;

/// One of the nine report buckets. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    RecentlyDone,
    AwaitingRelease,
    InReview,
    InProgress,
    Todo,
    Estimating,
    UnassignedPrioritized,
    UnassignedUnprioritized,
    Triage,
}

impl Category {
    /// All categories in report order.
    pub const ALL: [Self; 9] = [
        Self::RecentlyDone,
        Self::AwaitingRelease,
        Self::InReview,
        Self::InProgress,
        Self::Todo,
        Self::Estimating,
        Self::UnassignedPrioritized,
        Self::UnassignedUnprioritized,
        Self::Triage,
    ];

    /// Position of the category in the report.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Workflow state name that feeds this category.
    pub const fn status_name(self) -> &'static str {
        match self {
            Self::RecentlyDone => status::DONE,
            Self::AwaitingRelease => status::AWAITING_RELEASE,
            Self::InReview => status::IN_REVIEW,
            Self::InProgress => status::IN_PROGRESS,
            Self::Todo => status::TODO,
            Self::Estimating => status::ESTIMATING,
            Self::UnassignedPrioritized | Self::UnassignedUnprioritized => status::UNASSIGNED,
            Self::Triage => status::TRIAGE,
        }
    }

    /// Human readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::RecentlyDone => "Recently done",
            Self::AwaitingRelease => "Awaiting release",
            Self::InReview => "In review",
            Self::InProgress => "In progress",
            Self::Todo => "Todo",
            Self::Estimating => "Estimating",
            Self::UnassignedPrioritized => "Unassigned (prioritized)",
            Self::UnassignedUnprioritized => "Unassigned (unprioritized)",
            Self::Triage => "Triage",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Issues partitioned into categories, each bucket in input order until ranked.
#[derive(Debug, Clone)]
pub struct Classification<'a> {
    buckets: [Vec<&'a Issue>; 9],
    dropped: usize,
}

impl<'a> Classification<'a> {
    fn empty() -> Self {
        Self { buckets: std::array::from_fn(|_| Vec::new()), dropped: 0 }
    }

    /// Issues in a single category.
    pub fn bucket(&self, category: Category) -> &[&'a Issue] {
        &self.buckets[category.index()]
    }

    /// Mutable access to a category's issues (used by the ranker).
    pub fn bucket_mut(&mut self, category: Category) -> &mut Vec<&'a Issue> {
        &mut self.buckets[category.index()]
    }

    /// Iterate over all categories in report order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[&'a Issue])> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.bucket(c)))
    }

    /// Number of issues that landed in no category.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Total number of classified issues.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Whether no issue was classified.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Assigns issues to categories relative to a fixed invocation instant.
#[derive(Debug, Clone)]
pub struct Classifier {
    /// Invocation instant
    now: DateTime<Utc>,
    /// Completion window for [`Category::RecentlyDone`]
    recent_window: Duration,
}

impl Classifier {
    /// Create a classifier for the given instant and recency window.
    pub fn new(now: DateTime<Utc>, recent_done_days: u32) -> Self {
        Self { now, recent_window: Duration::days(i64::from(recent_done_days)) }
    }

    /// Earliest completion instant still counted as recent.
    pub fn recent_cutoff(&self) -> DateTime<Utc> {
        self.now - self.recent_window
    }

    /// Category for a single issue, `None` when it is excluded from the report.
    pub fn categorize(&self, issue: &Issue) -> Option<Category> {
        let category = match issue.status_name()? {
            status::DONE => {
                if !self.is_recently_completed(issue) {
                    tracing::debug!(
                        issue = %issue.id,
                        completed_at = issue.completed_at.as_deref().unwrap_or(""),
                        "Skipping done issue outside the recent window"
                    );
                    return None;
                }
                Category::RecentlyDone
            }
            status::AWAITING_RELEASE => Category::AwaitingRelease,
            status::IN_REVIEW => Category::InReview,
            status::IN_PROGRESS => Category::InProgress,
            status::TODO => Category::Todo,
            status::ESTIMATING => Category::Estimating,
            status::UNASSIGNED if issue.priority.is_set() => Category::UnassignedPrioritized,
            status::UNASSIGNED => Category::UnassignedUnprioritized,
            status::TRIAGE => Category::Triage,
            _ => return None,
        };
        Some(category)
    }

    fn is_recently_completed(&self, issue: &Issue) -> bool {
        issue
            .completed_at
            .as_deref()
            .and_then(parse_instant)
            .is_some_and(|completed| completed >= self.recent_cutoff())
    }

    /// Partition issues into categories, preserving input order within each.
    pub fn classify<'a>(&self, issues: &'a [Issue]) -> Classification<'a> {
        let mut classification = Classification::empty();

        for issue in issues {
            match self.categorize(issue) {
                Some(category) => classification.bucket_mut(category).push(issue),
                None => {
                    let status = issue.status_name();
                    if status != Some(status::DONE) {
                        tracing::warn!(
                            issue = %issue.id,
                            status = status.unwrap_or("<none>"),
                            "Dropping issue with unrecognized status"
                        );
                    }
                    classification.dropped += 1;
                }
            }
        }

        tracing::debug!(
            classified = classification.len(),
            dropped = classification.dropped,
            "Classified issues"
        );

        classification
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::core::issue::Priority;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn classifier() -> Classifier {
        Classifier::new(now(), DEFAULT_RECENT_DONE_DAYS)
    }

    fn days_ago(days: i64) -> String {
        (now() - Duration::days(days)).to_rfc3339()
    }

    #[test]
    fn test_category_order_matches_index() {
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_simple_status_mapping() {
        let c = classifier();
        let cases = [
            ("リリース待ち", Category::AwaitingRelease),
            ("レビュー中", Category::InReview),
            ("進行中", Category::InProgress),
            ("TODO", Category::Todo),
            ("見積もり中", Category::Estimating),
            ("Triage", Category::Triage),
        ];
        for (name, expected) in cases {
            assert_eq!(c.categorize(&Issue::new("x").with_status(name)), Some(expected), "{name}");
        }
    }

    #[test]
    fn test_unknown_or_missing_status_is_dropped() {
        let c = classifier();
        assert_eq!(c.categorize(&Issue::new("x").with_status("Canceled")), None);
        assert_eq!(c.categorize(&Issue::new("x").with_status("todo")), None);
        assert_eq!(c.categorize(&Issue::new("x")), None);
    }

    #[test]
    fn test_done_within_window() {
        let c = classifier();
        let issue = Issue::new("x").with_status("完了").with_completed_at(days_ago(3));
        assert_eq!(c.categorize(&issue), Some(Category::RecentlyDone));
    }

    #[test]
    fn test_done_window_boundary_is_inclusive() {
        let c = classifier();
        let issue = Issue::new("x").with_status("完了").with_completed_at(days_ago(14));
        assert_eq!(c.categorize(&issue), Some(Category::RecentlyDone));
    }

    #[test]
    fn test_done_outside_window_is_excluded() {
        let c = classifier();
        let issues = vec![Issue::new("old").with_status("完了").with_completed_at(days_ago(20))];
        let classification = c.classify(&issues);
        assert!(classification.is_empty());
        assert_eq!(classification.dropped(), 1);
    }

    #[test]
    fn test_done_without_completion_is_excluded() {
        let c = classifier();
        assert_eq!(c.categorize(&Issue::new("x").with_status("完了")), None);
        let garbled = Issue::new("y").with_status("完了").with_completed_at("soon");
        assert_eq!(c.categorize(&garbled), None);
    }

    #[test]
    fn test_configurable_window() {
        let c = Classifier::new(now(), 30);
        let issue = Issue::new("x").with_status("完了").with_completed_at(days_ago(20));
        assert_eq!(c.categorize(&issue), Some(Category::RecentlyDone));
    }

    #[test]
    fn test_unassigned_split_by_priority() {
        let c = classifier();
        let issues = vec![
            Issue::new("p2").with_status("未対応").with_priority(Priority::High),
            Issue::new("none").with_status("未対応"),
            Issue::new("zero").with_status("未対応").with_priority(Priority::from_raw(Some(0.0))),
            Issue::new("odd").with_status("未対応").with_priority(Priority::from_raw(Some(9.0))),
        ];

        let classification = c.classify(&issues);
        let ids = |cat| classification.bucket(cat).iter().map(|i| i.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids(Category::UnassignedPrioritized), vec!["p2", "odd"]);
        assert_eq!(ids(Category::UnassignedUnprioritized), vec!["none", "zero"]);
    }

    #[test]
    fn test_classify_preserves_input_order() {
        let c = classifier();
        let issues = vec![
            Issue::new("a").with_status("進行中").with_priority(Priority::Low),
            Issue::new("b").with_status("TODO"),
            Issue::new("c").with_status("進行中").with_priority(Priority::Urgent),
        ];

        let classification = c.classify(&issues);
        let in_progress: Vec<_> =
            classification.bucket(Category::InProgress).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(in_progress, vec!["a", "c"]);
        assert_eq!(classification.len(), 3);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let c = classifier();
        let issues = vec![
            Issue::new("a").with_status("Triage"),
            Issue::new("b").with_status("完了").with_completed_at(days_ago(1)),
            Issue::new("c").with_status("Unknown"),
        ];

        let first: Vec<Option<Category>> = issues.iter().map(|i| c.categorize(i)).collect();
        let second: Vec<Option<Category>> = issues.iter().map(|i| c.categorize(i)).collect();
        assert_eq!(first, second);
    }
}
