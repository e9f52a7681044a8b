//! Priority ranking within a category.

use std::cmp::Reverse;

use super::category::{Category, Classification};
use super::issue::{Issue, Priority};

/// Sort weight for a priority. Higher sorts first.
pub const fn weight(priority: Priority) -> u8 {
    match priority {
        Priority::Urgent => 100,
        Priority::High => 90,
        Priority::Medium => 80,
        Priority::Low => 70,
        Priority::Unset | Priority::Unrecognized(_) => 0,
    }
}

/// Order issues by descending weight. Stable: equal weights keep input order.
pub fn rank(issues: &mut [&Issue]) {
    issues.sort_by_key(|issue| Reverse(weight(issue.priority)));
}

/// Rank every bucket of a classification in place.
pub fn rank_all(classification: &mut Classification<'_>) {
    for category in Category::ALL {
        rank(classification.bucket_mut(category));
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::core::category::Classifier;

    fn ids<'a>(issues: &[&'a Issue]) -> Vec<&'a str> {
        issues.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_weights() {
        assert_eq!(weight(Priority::Urgent), 100);
        assert_eq!(weight(Priority::High), 90);
        assert_eq!(weight(Priority::Medium), 80);
        assert_eq!(weight(Priority::Low), 70);
        assert_eq!(weight(Priority::Unset), 0);
        assert_eq!(weight(Priority::from_raw(Some(0.0))), 0);
        assert_eq!(weight(Priority::from_raw(Some(5.0))), 0);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let issues = [
            Issue::new("p3").with_priority(Priority::Medium),
            Issue::new("p1-first").with_priority(Priority::Urgent),
            Issue::new("p1-second").with_priority(Priority::Urgent),
        ];
        let mut refs: Vec<&Issue> = issues.iter().collect();

        rank(&mut refs);
        assert_eq!(ids(&refs), vec!["p1-first", "p1-second", "p3"]);
    }

    #[test]
    fn test_rank_full_order() {
        let issues = [
            Issue::new("none"),
            Issue::new("low").with_priority(Priority::Low),
            Issue::new("odd").with_priority(Priority::Unrecognized(6.0)),
            Issue::new("high").with_priority(Priority::High),
            Issue::new("urgent").with_priority(Priority::Urgent),
            Issue::new("medium").with_priority(Priority::Medium),
        ];
        let mut refs: Vec<&Issue> = issues.iter().collect();

        rank(&mut refs);
        assert_eq!(ids(&refs), vec!["urgent", "high", "medium", "low", "none", "odd"]);
    }

    #[test]
    fn test_rank_all_respects_adjacent_pairs() {
        let issues: Vec<Issue> = (0..40)
            .map(|i| {
                Issue::new(format!("i{i}"))
                    .with_status(if i % 2 == 0 { "進行中" } else { "TODO" })
                    .with_priority(Priority::from_level(i % 6))
            })
            .collect();

        let mut classification = Classifier::new(Utc::now(), 14).classify(&issues);
        rank_all(&mut classification);

        let position = |id: &str| issues.iter().position(|i| i.id == id).unwrap();
        for (_, bucket) in classification.iter() {
            for pair in bucket.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                assert!(weight(a.priority) >= weight(b.priority));
                if weight(a.priority) == weight(b.priority) {
                    assert!(position(&a.id) < position(&b.id));
                }
            }
        }
    }
}
