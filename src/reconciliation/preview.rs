//! Derived values for the date form.
//!
//! Given the reconciled touched state, fills in the untouched fields:
//!
//! - milestones collapse to a single day
//! - automatically scheduled items start on their soonest start
//! - then the first untouched field whose two inputs are present is
//!   computed, in order duration, due, start
//!
//! A duration whose inputs were cleared by the user is cleared as well.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DateField, EditContext, FieldTouchState, FieldValues};
use crate::models::Calendar;

/// Form values after derivation, and which fields were computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatePreview {
    pub values: FieldValues,
    pub derived: Vec<DateField>,
}

impl DatePreview {
    /// Derives the untouched fields of `values`.
    ///
    /// `soonest_start` is the soonest start allowed by the item's
    /// predecessors (see [`Scheduler::soonest_start`]), used only for
    /// automatically scheduled items.
    ///
    /// [`Scheduler::soonest_start`]: crate::scheduler::Scheduler::soonest_start
    pub fn derive(
        values: &FieldValues,
        state: &FieldTouchState,
        ctx: EditContext,
        calendar: &Calendar,
        soonest_start: Option<NaiveDate>,
    ) -> Self {
        use DateField::*;

        let mut preview = Self {
            values: values.clone(),
            derived: Vec::new(),
        };
        let ignore = values.ignore_non_working_days;

        let mut start_moved = false;
        if !ctx.schedule_manually && !state.is_touched(StartDate) {
            if let Some(soonest) = soonest_start {
                preview.values.start_date = Some(soonest);
                preview.mark(StartDate);
                start_moved = true;
            }
        }

        if ctx.is_milestone {
            preview.collapse_milestone(state, start_moved);
            return preview;
        }

        let cleared = |field: DateField| state.is_touched(field) && !values.has_value(field);
        if !state.is_touched(Duration) && (cleared(StartDate) || cleared(DueDate)) {
            preview.values.duration = None;
        }

        let v = &preview.values;
        let (start, due, duration) = (v.start_date, v.due_date, v.duration);

        // A start moved by predecessors keeps the duration, like the scheduler does
        if start_moved && !state.is_touched(DueDate) {
            if let (Some(s), Some(n)) = (start, duration) {
                preview.values.due_date = calendar.due_date_for(s, n, ignore);
                preview.mark(DueDate);
                return preview;
            }
        }

        let duration_free = !state.is_touched(Duration)
            || (state.is_touched(StartDate) && state.is_touched(DueDate));
        let start_free = !state.is_touched(StartDate) && !start_moved;

        match (start, due, duration) {
            (Some(s), Some(d), _) if duration_free && d >= s => {
                preview.values.duration = Some(calendar.span(s, d, ignore));
                preview.mark(Duration);
            }
            (Some(s), _, Some(n)) if !state.is_touched(DueDate) => {
                preview.values.due_date = calendar.due_date_for(s, n, ignore);
                preview.mark(DueDate);
            }
            (_, Some(d), Some(n)) if start_free => {
                preview.values.start_date = calendar.start_date_for(d, n, ignore);
                preview.mark(StartDate);
            }
            _ => {}
        }
        preview
    }

    /// Whether the field was computed rather than taken from the form.
    pub fn is_derived(&self, field: DateField) -> bool {
        self.derived.contains(&field)
    }

    fn mark(&mut self, field: DateField) {
        if !self.derived.contains(&field) {
            self.derived.push(field);
        }
    }

    fn collapse_milestone(&mut self, state: &FieldTouchState, start_moved: bool) {
        let due_leads =
            state.is_touched(DateField::DueDate) && !state.is_touched(DateField::StartDate) && !start_moved;
        let v = &self.values;
        let day = if due_leads {
            v.due_date.or(v.start_date)
        } else {
            v.start_date.or(v.due_date)
        };

        self.values.duration = None;
        let Some(day) = day else {
            return;
        };
        if self.values.start_date != Some(day) {
            self.mark(DateField::StartDate);
        }
        if self.values.due_date != Some(day) {
            self.mark(DateField::DueDate);
        }
        self.values.start_date = Some(day);
        self.values.due_date = Some(day);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkingDays;
    use DateField::*;

    fn date(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 3, d)
    }

    fn session(values: &FieldValues, touched: &[DateField]) -> FieldTouchState {
        touched
            .iter()
            .fold(FieldTouchState::new(values), |s, f| s.with_touched(*f))
    }

    fn derive(values: FieldValues, touched: &[DateField], ctx: EditContext) -> DatePreview {
        let state = session(&values, touched);
        DatePreview::derive(&values, &state, ctx, &Calendar::default(), None)
    }

    #[test]
    fn test_duration_from_dates() {
        // Mon 3 .. Fri 14 is ten working days
        let preview = derive(FieldValues::new(date(3), date(14), None), &[StartDate, DueDate], EditContext::manual());
        assert_eq!(preview.values.duration, Some(10));
        assert_eq!(preview.derived, vec![Duration]);
    }

    #[test]
    fn test_due_from_start_and_duration() {
        let preview = derive(FieldValues::new(date(6), None, Some(3)), &[StartDate, Duration], EditContext::manual());
        assert_eq!(preview.values.due_date, date(10));
        assert!(preview.is_derived(DueDate));
    }

    #[test]
    fn test_start_from_due_and_duration() {
        let preview = derive(FieldValues::new(None, date(10), Some(3)), &[DueDate, Duration], EditContext::manual());
        assert_eq!(preview.values.start_date, date(6));
        assert!(preview.is_derived(StartDate));
    }

    #[test]
    fn test_all_touched_rederives_duration() {
        let preview = derive(
            FieldValues::new(date(3), date(5), Some(9)),
            &[StartDate, DueDate, Duration],
            EditContext::manual(),
        );
        assert_eq!(preview.values.duration, Some(3));
    }

    #[test]
    fn test_cleared_date_clears_duration() {
        let initial = FieldValues::new(date(3), date(5), Some(3));
        let state = session(&initial, &[StartDate]);
        let values = FieldValues::new(None, date(5), Some(3));
        let preview = DatePreview::derive(&values, &state, EditContext::manual(), &Calendar::default(), None);
        assert_eq!(preview.values.duration, None);
        assert_eq!(preview.values.due_date, date(5));
        assert!(preview.derived.is_empty());
    }

    #[test]
    fn test_ignore_non_working_days() {
        let values = FieldValues::new(date(7), None, Some(3)).ignoring_non_working_days(true);
        let preview = derive(values, &[StartDate, Duration], EditContext::manual());
        assert_eq!(preview.values.due_date, date(9));
    }

    #[test]
    fn test_automatic_takes_soonest_start() {
        let values = FieldValues::new(date(3), date(4), Some(2));
        let state = FieldTouchState::new(&values);
        let preview = DatePreview::derive(
            &values,
            &state,
            EditContext::automatic(),
            &Calendar::default(),
            date(7),
        );
        assert_eq!(preview.values.start_date, date(7));
        assert_eq!(preview.values.due_date, date(10));
        assert_eq!(preview.values.duration, Some(2));
        assert_eq!(preview.derived, vec![StartDate, DueDate]);
    }

    #[test]
    fn test_manual_ignores_soonest_start() {
        let values = FieldValues::new(date(3), date(4), None);
        let state = FieldTouchState::new(&values);
        let preview = DatePreview::derive(&values, &state, EditContext::manual(), &Calendar::default(), date(7));
        assert_eq!(preview.values.start_date, date(3));
        assert_eq!(preview.values.duration, Some(2));
    }

    #[test]
    fn test_milestone_collapses() {
        let ctx = EditContext::manual().milestone();
        let preview = derive(FieldValues::new(date(3), date(5), Some(3)), &[StartDate], ctx);
        assert_eq!(preview.values.due_date, date(3));
        assert_eq!(preview.values.duration, None);
        assert_eq!(preview.derived, vec![DueDate]);

        let preview = derive(FieldValues::new(date(3), date(5), None), &[DueDate], ctx);
        assert_eq!(preview.values.start_date, date(5));
        assert_eq!(preview.derived, vec![StartDate]);
    }

    #[test]
    fn test_milestone_on_soonest_start() {
        let values = FieldValues::new(None, None, None);
        let state = FieldTouchState::new(&values);
        let ctx = EditContext::automatic().milestone();
        let preview = DatePreview::derive(&values, &state, ctx, &Calendar::default(), date(7));
        assert_eq!(preview.values.start_date, date(7));
        assert_eq!(preview.values.due_date, date(7));
    }

    #[test]
    fn test_unrestricted_calendar() {
        let cal = Calendar::new(WorkingDays::unrestricted());
        let values = FieldValues::new(date(7), date(10), None);
        let state = session(&values, &[StartDate, DueDate]);
        let preview = DatePreview::derive(&values, &state, EditContext::manual(), &cal, None);
        assert_eq!(preview.values.duration, Some(4));
    }
}
