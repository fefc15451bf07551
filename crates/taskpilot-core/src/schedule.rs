//! Places ranked work items into a fixed grid of daily work slots.
//!
//! Each day has exactly two non-overlapping slots (a morning block and an
//! afternoon block by default). Items fill the grid strictly in ranked
//! order: day 1 slot 1, day 1 slot 2, day 2 slot 1, and so on. Items that do
//! not fit are counted in [`Schedule::unscheduled_count`], never dropped
//! silently.

use chrono::{Days, NaiveDate};

use crate::models::{Entity, Schedule, ScheduleSlot};

/// Slot grid, decoupled from application config.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleParams {
    /// `(start_hour, end_hour)` of the two daily slots, in order.
    pub slots: [(u32, u32); 2],
    /// Days to plan when the caller does not specify a number.
    pub default_days: u32,
}

impl Default for ScheduleParams {
    fn default() -> Self {
        Self {
            slots: [(8, 12), (13, 17)],
            default_days: 3,
        }
    }
}

/// Build a `days`-day schedule starting at `start_date`.
///
/// `ranked` must already be in priority order. Unfilled trailing slots are
/// included with `item: None`.
pub fn build_schedule(
    ranked: Vec<Entity>,
    days: u32,
    start_date: NaiveDate,
    params: &ScheduleParams,
) -> Schedule {
    let total = ranked.len();
    let mut queue = ranked.into_iter();
    let mut slots = Vec::with_capacity(days as usize * params.slots.len());
    let mut filled = 0usize;

    for day_index in 0..days {
        let date = start_date
            .checked_add_days(Days::new(day_index as u64))
            .unwrap_or(start_date);
        for &(start_hour, end_hour) in &params.slots {
            let item = queue.next();
            if item.is_some() {
                filled += 1;
            }
            slots.push(ScheduleSlot {
                day_index,
                date,
                start_hour,
                end_hour,
                item,
            });
        }
    }

    Schedule {
        slots,
        unscheduled_count: total - filled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Status};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 13).unwrap()
    }

    fn tasks(n: usize) -> Vec<Entity> {
        (0..n)
            .map(|i| Entity {
                id: format!("t{}", i),
                title: format!("Task {}", i),
                content: None,
                status: Status::NotStarted,
                priority: Priority::Medium,
                deadline: None,
                owner: "u1".to_string(),
                project: None,
            })
            .collect()
    }

    #[test]
    fn test_two_days_five_items() {
        let s = build_schedule(tasks(5), 2, start(), &ScheduleParams::default());
        assert_eq!(s.slots.len(), 4);
        assert_eq!(s.filled().count(), 4);
        assert_eq!(s.unscheduled_count, 1);
    }

    #[test]
    fn test_fill_order() {
        let s = build_schedule(tasks(3), 2, start(), &ScheduleParams::default());
        let layout: Vec<(u32, u32, Option<&str>)> = s
            .slots
            .iter()
            .map(|slot| (slot.day_index, slot.start_hour, slot.item.as_ref().map(|e| e.id.as_str())))
            .collect();
        assert_eq!(
            layout,
            vec![
                (0, 8, Some("t0")),
                (0, 13, Some("t1")),
                (1, 8, Some("t2")),
                (1, 13, None),
            ]
        );
        assert_eq!(s.unscheduled_count, 0);
        assert_eq!(s.slots[2].date, NaiveDate::from_ymd_opt(2026, 5, 14).unwrap());
    }

    #[test]
    fn test_empty_input_yields_empty_slots() {
        let s = build_schedule(Vec::new(), 1, start(), &ScheduleParams::default());
        assert_eq!(s.slots.len(), 2);
        assert_eq!(s.filled().count(), 0);
        assert_eq!(s.unscheduled_count, 0);
    }

    #[test]
    fn test_zero_days_reports_everything_unscheduled() {
        let s = build_schedule(tasks(3), 0, start(), &ScheduleParams::default());
        assert!(s.slots.is_empty());
        assert_eq!(s.unscheduled_count, 3);
    }

    #[test]
    fn test_slots_do_not_overlap() {
        let [(s1, e1), (s2, e2)] = ScheduleParams::default().slots;
        assert!(s1 < e1 && e1 < s2 && s2 < e2);
    }
}
