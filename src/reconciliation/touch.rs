//! Touched/derived bookkeeping for the date form.
//!
//! # Rules
//!
//! The edited field always becomes touched. Then, in order:
//!
//! 1. A start date that was empty when the session began and has not been
//!    touched leaves everything else alone.
//! 2. Milestones stop here.
//! 3. Start edited:
//!    - due touched but empty, duration set: derive due from duration
//!    - duration touched but empty, due set: derive duration from due
//!    - due and duration both touched: duration yields if empty, else due
//! 4. Due edited (manual): start touched but empty with a duration set
//!    derives start; a set start derives duration.
//!    Due edited (automatic): duration derives.
//! 5. Duration edited (manual): the touched date that has a value stays,
//!    the other one derives; an empty touched date hands its touch over.
//!    Duration edited (automatic): due derives.
//! 6. Ignore-non-working-days edited (automatic only): duration derives if
//!    touched, otherwise due if touched.
//!
//! Repeating the last edit with the same value changes nothing.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{DateField, EditContext, FieldEdit, FieldValues};

/// Touched state of the date form fields during one edit session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTouchState {
    start_date: bool,
    due_date: bool,
    duration: bool,
    ignore_non_working_days: bool,
    initial_start_empty: bool,
    last_edit: Option<FieldEdit>,
}

impl FieldTouchState {
    /// Starts a session over the form's initial values. Nothing is touched.
    pub fn new(initial: &FieldValues) -> Self {
        Self {
            initial_start_empty: initial.start_date.is_none(),
            ..Self::default()
        }
    }

    /// Marks a field as touched (builder form, for restoring a session).
    pub fn with_touched(mut self, field: DateField) -> Self {
        self.touch(field);
        self
    }

    /// Whether the field is touched.
    pub fn is_touched(&self, field: DateField) -> bool {
        match field {
            DateField::StartDate => self.start_date,
            DateField::DueDate => self.due_date,
            DateField::Duration => self.duration,
            DateField::IgnoreNonWorkingDays => self.ignore_non_working_days,
        }
    }

    /// Touched fields in form order.
    pub fn touched_fields(&self) -> Vec<DateField> {
        DateField::ALL
            .into_iter()
            .filter(|f| self.is_touched(*f))
            .collect()
    }

    /// Whether the start date was empty when the session began.
    pub fn initial_start_empty(&self) -> bool {
        self.initial_start_empty
    }

    /// The most recent edit of the session.
    pub fn last_edit(&self) -> Option<FieldEdit> {
        self.last_edit
    }

    pub fn touch(&mut self, field: DateField) {
        self.set(field, true);
    }

    pub fn untouch(&mut self, field: DateField) {
        self.set(field, false);
    }

    fn set(&mut self, field: DateField, touched: bool) {
        match field {
            DateField::StartDate => self.start_date = touched,
            DateField::DueDate => self.due_date = touched,
            DateField::Duration => self.duration = touched,
            DateField::IgnoreNonWorkingDays => self.ignore_non_working_days = touched,
        }
    }

    fn touched_but_empty(&self, values: &FieldValues, field: DateField) -> bool {
        self.is_touched(field) && !values.has_value(field)
    }
}

/// Applies one edit to the form and returns the new touched state and values.
pub fn reconcile(
    state: &FieldTouchState,
    values: &FieldValues,
    edit: FieldEdit,
    ctx: EditContext,
) -> (FieldTouchState, FieldValues) {
    let mut values = values.clone();
    values.apply(edit);
    let mut state = state.clone();

    if state.last_edit == Some(edit) {
        return (state, values);
    }
    state.last_edit = Some(edit);

    let trigger = edit.field();
    state.touch(trigger);

    if state.initial_start_empty && !state.start_date {
        trace!(field = %trigger, "start never set, leaving other fields derived");
        return (state, values);
    }
    if ctx.is_milestone {
        return (state, values);
    }

    match trigger {
        DateField::StartDate => on_start_edit(&mut state, &values),
        DateField::DueDate => on_due_edit(&mut state, &values, ctx),
        DateField::Duration => on_duration_edit(&mut state, &values, ctx),
        DateField::IgnoreNonWorkingDays => on_ignore_edit(&mut state, ctx),
    }

    trace!(field = %trigger, touched = ?state.touched_fields(), "reconciled edit");
    (state, values)
}

fn on_start_edit(state: &mut FieldTouchState, values: &FieldValues) {
    use DateField::*;

    if state.touched_but_empty(values, DueDate) && values.has_value(Duration) {
        state.untouch(DueDate);
        state.touch(Duration);
    } else if state.touched_but_empty(values, Duration) && values.has_value(DueDate) {
        state.untouch(Duration);
        state.touch(DueDate);
    } else if state.is_touched(DueDate) && state.is_touched(Duration) {
        if values.has_value(Duration) {
            state.untouch(DueDate);
        } else {
            state.untouch(Duration);
        }
    }
}

fn on_due_edit(state: &mut FieldTouchState, values: &FieldValues, ctx: EditContext) {
    use DateField::*;

    if !ctx.schedule_manually {
        state.untouch(Duration);
        return;
    }
    if state.touched_but_empty(values, StartDate) && values.has_value(Duration) {
        state.untouch(StartDate);
        state.touch(Duration);
    } else if values.has_value(StartDate) {
        state.untouch(Duration);
    }
}

fn on_duration_edit(state: &mut FieldTouchState, values: &FieldValues, ctx: EditContext) {
    use DateField::*;

    if !ctx.schedule_manually {
        state.untouch(DueDate);
        return;
    }
    if state.is_touched(StartDate) {
        hand_over(state, values, StartDate, DueDate);
    } else if state.is_touched(DueDate) {
        hand_over(state, values, DueDate, StartDate);
    }
}

/// `kept` is the touched date. If it has a value, `other` derives from it
/// and the duration. If it is empty, `kept` derives and the touch moves to
/// `other` when that one has a value.
fn hand_over(state: &mut FieldTouchState, values: &FieldValues, kept: DateField, other: DateField) {
    if values.has_value(kept) {
        state.untouch(other);
    } else {
        state.untouch(kept);
        if values.has_value(other) {
            state.touch(other);
        } else {
            state.untouch(other);
        }
    }
}

fn on_ignore_edit(state: &mut FieldTouchState, ctx: EditContext) {
    use DateField::*;

    if ctx.schedule_manually {
        return;
    }
    if state.is_touched(Duration) {
        state.untouch(Duration);
    } else if state.is_touched(DueDate) {
        state.untouch(DueDate);
    }
}
