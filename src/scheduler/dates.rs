//! Date rules shared by the scheduler and the closest-relation ranking.

use chrono::NaiveDate;

use crate::models::{Calendar, Relation, WorkItem};

/// Soonest date the successor of `relation` may start, given its predecessor.
///
/// `predecessor`'s end (due date, or start date when it has no due date)
/// advanced by `lag + 1` qualifying days of the successor's calendar.
///
/// Returns `None` when the predecessor has no dates, the lag is negative,
/// or the result leaves chrono's date range.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use wp_schedule::models::{Calendar, Relation, WorkItem};
/// use wp_schedule::scheduler::soonest_successor_start;
///
/// let tuesday = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
/// let pred = WorkItem::new(1).with_dates(tuesday, tuesday);
/// let rel = Relation::follows(1, 2, 1).with_lag(2);
/// let soonest = soonest_successor_start(&Calendar::default(), &rel, &pred, false);
/// assert_eq!(soonest, NaiveDate::from_ymd_opt(2025, 3, 7)); // Friday
/// ```
pub fn soonest_successor_start(
    calendar: &Calendar,
    relation: &Relation,
    predecessor: &WorkItem,
    ignore_non_working_days: bool,
) -> Option<NaiveDate> {
    let lag = u32::try_from(relation.lag).ok()?;
    let end = predecessor.end_date()?;
    calendar.add_working_days(end, lag.checked_add(1)?, ignore_non_working_days)
}

/// Recomputes the dates of an automatically scheduled leaf item that has to
/// start on `start`.
///
/// The due date keeps the item's duration, or its current span when no
/// duration is set. Without either, a due date that still lies on or after
/// the new start is kept. Milestones collapse to a single day.
pub(crate) fn move_to_start(calendar: &Calendar, item: &WorkItem, start: NaiveDate) -> WorkItem {
    let mut moved = item.clone();
    let ignore = item.ignore_non_working_days;
    moved.start_date = Some(start);

    if item.is_milestone {
        moved.due_date = Some(start);
        moved.duration = None;
        return moved;
    }

    let duration = item.duration.or_else(|| match (item.start_date, item.due_date) {
        (Some(s), Some(d)) if d >= s => Some(calendar.span(s, d, ignore)),
        _ => None,
    });

    moved.due_date = match duration {
        Some(days) => calendar.due_date_for(start, days, ignore),
        None => item.due_date.filter(|due| *due >= start),
    };
    moved.duration = match moved.due_date {
        Some(due) => Some(calendar.span(start, due, ignore)),
        None => duration,
    };
    moved
}

/// Rolls children's dates up into a parent: earliest child start, latest
/// child end. `None` when no child has any date.
pub(crate) fn rollup<'a>(
    calendar: &Calendar,
    parent: &WorkItem,
    children: impl IntoIterator<Item = &'a WorkItem>,
) -> Option<WorkItem> {
    let mut start: Option<NaiveDate> = None;
    let mut due: Option<NaiveDate> = None;
    for child in children {
        if let Some(s) = child.start_date.or(child.due_date) {
            start = Some(start.map_or(s, |cur| cur.min(s)));
        }
        if let Some(d) = child.end_date() {
            due = Some(due.map_or(d, |cur| cur.max(d)));
        }
    }
    if start.is_none() && due.is_none() {
        return None;
    }

    let mut rolled = parent.clone();
    rolled.start_date = start;
    rolled.due_date = due;
    rolled.duration = match (start, due) {
        (Some(s), Some(d)) => Some(calendar.span(s, d, parent.ignore_non_working_days)),
        _ => None,
    };
    Some(rolled)
}
