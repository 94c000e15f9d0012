//! Scheduling domain models.
//!
//! Provides the data types the scheduler consumes and produces: work items,
//! relations, the working-day calendar, and the result of a pass.
//!
//! # Concepts
//!
//! | Type | Meaning |
//! |------|---------|
//! | `WorkItem` | Task or milestone with start/due/duration |
//! | `Relation` | Typed edge (follows/precedes with lag, parent/child, ...) |
//! | `Calendar` | Working weekdays plus holidays |
//! | `ScheduleResult` | Date changes, cycle warnings, conflicts |

mod calendar;
mod relation;
mod schedule;
mod work_item;

pub use calendar::{Calendar, DayPredicate, WorkingDays};
pub use relation::{Relation, RelationId, RelationType};
pub use schedule::{CycleWarning, DateChange, ScheduleResult, SchedulingConflict};
pub use work_item::{WorkItem, WorkItemId};
