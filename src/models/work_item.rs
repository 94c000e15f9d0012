//! Work item model.
//!
//! A work item is a schedulable task or milestone with optional start and
//! due dates and a duration counted in days.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque, stable work item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkItemId(pub u64);

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for WorkItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A schedulable unit of work.
///
/// # Scheduling Modes
/// - **Manual** (`schedule_manually = true`): dates are authoritative and
///   never overwritten by the scheduler. They still constrain successors.
/// - **Automatic**: dates are derived from predecessors (or children for
///   parents) by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique identifier.
    pub id: WorkItemId,
    /// First day of work.
    pub start_date: Option<NaiveDate>,
    /// Last day of work (inclusive).
    pub due_date: Option<NaiveDate>,
    /// Length in days (working days unless `ignore_non_working_days`).
    pub duration: Option<u32>,
    /// Whether dates are user-authoritative.
    pub schedule_manually: bool,
    /// Count every calendar day instead of working days only.
    pub ignore_non_working_days: bool,
    /// Milestones occupy a single day and carry no duration.
    pub is_milestone: bool,
}

impl WorkItem {
    /// Creates an automatically scheduled item without dates.
    pub fn new(id: impl Into<WorkItemId>) -> Self {
        Self {
            id: id.into(),
            start_date: None,
            due_date: None,
            duration: None,
            schedule_manually: false,
            ignore_non_working_days: false,
            is_milestone: false,
        }
    }

    /// Creates a milestone.
    pub fn milestone(id: impl Into<WorkItemId>) -> Self {
        Self {
            is_milestone: true,
            ..Self::new(id)
        }
    }

    /// Sets the start date.
    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Sets the due date.
    pub fn with_due(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Sets start and due dates.
    pub fn with_dates(self, start: NaiveDate, due: NaiveDate) -> Self {
        self.with_start(start).with_due(due)
    }

    /// Sets the duration in days.
    pub fn with_duration(mut self, days: u32) -> Self {
        self.duration = Some(days);
        self
    }

    /// Marks the item as manually scheduled.
    pub fn manual(mut self) -> Self {
        self.schedule_manually = true;
        self
    }

    /// Counts every calendar day for this item.
    pub fn ignoring_non_working_days(mut self) -> Self {
        self.ignore_non_working_days = true;
        self
    }

    /// Last day of the item: due date, or start date when no due date is set.
    ///
    /// This is the date successors are measured from.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.due_date.or(self.start_date)
    }

    /// Whether both dates are set.
    pub fn has_dates(&self) -> bool {
        self.start_date.is_some() && self.due_date.is_some()
    }

    /// Whether start and due dates are unchanged compared to `other`.
    pub fn same_dates(&self, other: &Self) -> bool {
        self.start_date == other.start_date && self.due_date == other.due_date
    }
}
