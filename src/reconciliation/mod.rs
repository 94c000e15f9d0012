//! Date form reconciliation.
//!
//! While a user edits the dates of one work item, each of the four date
//! fields is either *touched* (set by the user, authoritative) or
//! *derived* (free to be recomputed). [`reconcile`] applies one edit and
//! decides which fields stay touched, so the fields never over- or
//! under-constrain each other. [`DatePreview::derive`] then fills in the
//! derived fields for display.
//!
//! Both are pure functions over explicit values; the session state lives in
//! [`FieldTouchState`], owned by the caller.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use wp_schedule::models::Calendar;
//! use wp_schedule::reconciliation::{
//!     reconcile, DateField, DatePreview, EditContext, FieldEdit, FieldTouchState, FieldValues,
//! };
//!
//! let mon = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
//! let values = FieldValues::new(Some(mon), None, None);
//! let state = FieldTouchState::new(&values);
//!
//! let (state, values) = reconcile(&state, &values, FieldEdit::Duration(Some(5)), EditContext::manual());
//! let preview = DatePreview::derive(&values, &state, EditContext::manual(), &Calendar::default(), None);
//!
//! assert!(preview.is_derived(DateField::DueDate));
//! assert_eq!(preview.values.due_date, NaiveDate::from_ymd_opt(2025, 3, 7));
//! ```

mod preview;
mod touch;

pub use preview::DatePreview;
pub use touch::{reconcile, FieldTouchState};

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::WorkItem;

/// An editable date field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    StartDate,
    DueDate,
    Duration,
    IgnoreNonWorkingDays,
}

impl DateField {
    /// All fields, in form order.
    pub const ALL: [DateField; 4] = [
        DateField::StartDate,
        DateField::DueDate,
        DateField::Duration,
        DateField::IgnoreNonWorkingDays,
    ];
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DateField::StartDate => "start_date",
            DateField::DueDate => "due_date",
            DateField::Duration => "duration",
            DateField::IgnoreNonWorkingDays => "ignore_non_working_days",
        };
        f.write_str(name)
    }
}

/// One user edit: the field and its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldEdit {
    StartDate(Option<NaiveDate>),
    DueDate(Option<NaiveDate>),
    Duration(Option<u32>),
    IgnoreNonWorkingDays(bool),
}

impl FieldEdit {
    /// The edited field.
    pub fn field(&self) -> DateField {
        match self {
            FieldEdit::StartDate(_) => DateField::StartDate,
            FieldEdit::DueDate(_) => DateField::DueDate,
            FieldEdit::Duration(_) => DateField::Duration,
            FieldEdit::IgnoreNonWorkingDays(_) => DateField::IgnoreNonWorkingDays,
        }
    }
}

/// Current values of the date form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValues {
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub duration: Option<u32>,
    pub ignore_non_working_days: bool,
}

impl FieldValues {
    /// Creates form values on the working-day calendar.
    pub fn new(start_date: Option<NaiveDate>, due_date: Option<NaiveDate>, duration: Option<u32>) -> Self {
        Self {
            start_date,
            due_date,
            duration,
            ignore_non_working_days: false,
        }
    }

    /// Sets the ignore-non-working-days flag.
    pub fn ignoring_non_working_days(mut self, ignore: bool) -> Self {
        self.ignore_non_working_days = ignore;
        self
    }

    /// Form values of a stored item.
    pub fn from_item(item: &WorkItem) -> Self {
        Self {
            start_date: item.start_date,
            due_date: item.due_date,
            duration: item.duration,
            ignore_non_working_days: item.ignore_non_working_days,
        }
    }

    /// Writes the values onto `item`.
    pub fn write_to(&self, item: &mut WorkItem) {
        item.start_date = self.start_date;
        item.due_date = self.due_date;
        item.duration = self.duration;
        item.ignore_non_working_days = self.ignore_non_working_days;
    }

    /// Stores the value carried by `edit`.
    pub fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::StartDate(v) => self.start_date = v,
            FieldEdit::DueDate(v) => self.due_date = v,
            FieldEdit::Duration(v) => self.duration = v,
            FieldEdit::IgnoreNonWorkingDays(v) => self.ignore_non_working_days = v,
        }
    }

    /// Whether the field holds a value. The flag always does.
    pub fn has_value(&self, field: DateField) -> bool {
        match field {
            DateField::StartDate => self.start_date.is_some(),
            DateField::DueDate => self.due_date.is_some(),
            DateField::Duration => self.duration.is_some(),
            DateField::IgnoreNonWorkingDays => true,
        }
    }
}

/// Item properties that steer reconciliation but are not edited in the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditContext {
    pub schedule_manually: bool,
    pub is_milestone: bool,
}

impl EditContext {
    /// Manually scheduled task.
    pub fn manual() -> Self {
        Self {
            schedule_manually: true,
            is_milestone: false,
        }
    }

    /// Automatically scheduled task.
    pub fn automatic() -> Self {
        Self::default()
    }

    /// Marks the item as a milestone.
    pub fn milestone(mut self) -> Self {
        self.is_milestone = true;
        self
    }

    /// Context of a stored item.
    pub fn from_item(item: &WorkItem) -> Self {
        Self {
            schedule_manually: item.schedule_manually,
            is_milestone: item.is_milestone,
        }
    }
}
