//! Aggregate views over an owner's work items.
//!
//! Used for progress, report, and calendar answers, and by `tp stats`.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::models::{Entity, Status};

/// Label used for items filed under no project.
pub const NO_PROJECT: &str = "(no project)";

/// Completion of one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectProgress {
    pub project: String,
    pub done: usize,
    pub total: usize,
    /// Whole-number completion percentage.
    pub percent: u32,
}

/// Number of items in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Per-project completion, ordered by project name.
pub fn project_progress(entities: &[Entity]) -> Vec<ProjectProgress> {
    let mut by_project: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for e in entities {
        let key = e.project.as_deref().unwrap_or(NO_PROJECT);
        let counts = by_project.entry(key).or_insert((0, 0));
        counts.1 += 1;
        if !e.is_incomplete() {
            counts.0 += 1;
        }
    }

    by_project
        .into_iter()
        .map(|(project, (done, total))| ProjectProgress {
            project: project.to_string(),
            done,
            total,
            percent: ((done * 100) / total) as u32,
        })
        .collect()
}

/// Counts per status: not started, in progress, done, then other labels
/// alphabetically. Statuses with no items are omitted.
pub fn status_counts(entities: &[Entity]) -> Vec<StatusCount> {
    let mut fixed = [0usize; 3];
    let mut other: BTreeMap<&str, usize> = BTreeMap::new();
    for e in entities {
        match &e.status {
            Status::NotStarted => fixed[0] += 1,
            Status::InProgress => fixed[1] += 1,
            Status::Done => fixed[2] += 1,
            Status::Other(label) => *other.entry(label.as_str()).or_insert(0) += 1,
        }
    }

    let labels = [
        Status::NotStarted.label().to_string(),
        Status::InProgress.label().to_string(),
        Status::Done.label().to_string(),
    ];
    labels
        .into_iter()
        .zip(fixed)
        .chain(other.into_iter().map(|(l, c)| (l.to_string(), c)))
        .filter(|(_, count)| *count > 0)
        .map(|(status, count)| StatusCount { status, count })
        .collect()
}

/// Incomplete items whose deadline is overdue or falls within `days`
/// calendar days of `now`, earliest first. A window reaching past the
/// representable date range includes every deadline.
pub fn upcoming(entities: &[Entity], now: DateTime<Utc>, days: i64) -> Vec<Entity> {
    let horizon = TimeDelta::try_days(days)
        .and_then(|window| now.checked_add_signed(window))
        .map(|end| end.date_naive())
        .unwrap_or(chrono::NaiveDate::MAX);
    let mut due: Vec<(DateTime<Utc>, &Entity)> = entities
        .iter()
        .filter(|e| e.is_incomplete())
        .filter_map(|e| e.deadline_at().map(|d| (d, e)))
        .filter(|(d, _)| d.date_naive() <= horizon)
        .collect();
    due.sort_by_key(|(d, _)| *d);
    due.into_iter().map(|(_, e)| e.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::TimeZone;

    fn task(id: &str, project: Option<&str>, status: &str, deadline: Option<&str>) -> Entity {
        Entity {
            id: id.to_string(),
            title: format!("Task {}", id),
            content: None,
            status: Status::parse(status),
            priority: Priority::Low,
            deadline: deadline.map(str::to_string),
            owner: "u1".to_string(),
            project: project.map(str::to_string),
        }
    }

    #[test]
    fn test_project_progress() {
        let items = vec![
            task("1", Some("Web"), "done", None),
            task("2", Some("Web"), "todo", None),
            task("3", Some("App"), "done", None),
            task("4", None, "doing", None),
        ];
        let progress = project_progress(&items);
        let rows: Vec<(&str, usize, usize, u32)> = progress
            .iter()
            .map(|p| (p.project.as_str(), p.done, p.total, p.percent))
            .collect();
        assert_eq!(
            rows,
            vec![(NO_PROJECT, 0, 1, 0), ("App", 1, 1, 100), ("Web", 1, 2, 50)]
        );
    }

    #[test]
    fn test_status_counts_order() {
        let items = vec![
            task("1", None, "done", None),
            task("2", None, "blocked", None),
            task("3", None, "todo", None),
            task("4", None, "done", None),
        ];
        let counts = status_counts(&items);
        let rows: Vec<(&str, usize)> = counts.iter().map(|c| (c.status.as_str(), c.count)).collect();
        assert_eq!(rows, vec![("not started", 1), ("done", 2), ("blocked", 1)]);
        assert!(status_counts(&[]).is_empty());
    }

    #[test]
    fn test_upcoming() {
        let now = Utc.with_ymd_and_hms(2026, 5, 13, 10, 0, 0).unwrap();
        let items = vec![
            task("far", None, "todo", Some("2026-06-30")),
            task("soon", None, "todo", Some("2026-05-15")),
            task("late", None, "todo", Some("2026-05-01")),
            task("finished", None, "done", Some("2026-05-14")),
            task("none", None, "todo", None),
        ];
        let ids: Vec<String> = upcoming(&items, now, 3).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["late", "soon"]);
    }

    #[test]
    fn test_upcoming_huge_window_includes_everything() {
        let now = Utc.with_ymd_and_hms(2026, 5, 13, 10, 0, 0).unwrap();
        let items = vec![
            task("far", None, "todo", Some("9999-12-31")),
            task("soon", None, "todo", Some("2026-05-15")),
        ];
        let ids: Vec<String> = upcoming(&items, now, 100_000_000)
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["soon", "far"]);
        assert_eq!(upcoming(&items, now, i64::MAX).len(), 2);
    }
}
