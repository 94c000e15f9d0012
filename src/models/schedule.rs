//! Scheduling pass result.
//!
//! A pass produces the date changes to persist, the cycles it had to cut,
//! and the conflicts worth surfacing to the user.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{RelationId, WorkItem, WorkItemId};

/// Outcome of one scheduling pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Items whose dates differ from the stored snapshot.
    pub changes: Vec<DateChange>,
    /// Cycles found in the affected part of the graph.
    pub cycles: Vec<CycleWarning>,
    /// Manually scheduled items starting earlier than their predecessors allow.
    pub conflicts: Vec<SchedulingConflict>,
}

/// A date change for one work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateChange {
    pub item_id: WorkItemId,
    pub old_start: Option<NaiveDate>,
    pub new_start: Option<NaiveDate>,
    pub old_due: Option<NaiveDate>,
    pub new_due: Option<NaiveDate>,
    pub old_duration: Option<u32>,
    pub new_duration: Option<u32>,
}

impl DateChange {
    /// Builds the change between a stored snapshot and its recomputed version.
    pub fn between(old: &WorkItem, new: &WorkItem) -> Self {
        Self {
            item_id: new.id,
            old_start: old.start_date,
            new_start: new.start_date,
            old_due: old.due_date,
            new_due: new.due_date,
            old_duration: old.duration,
            new_duration: new.duration,
        }
    }

    /// Whether start or due date moved.
    pub fn dates_changed(&self) -> bool {
        self.old_start != self.new_start || self.old_due != self.new_due
    }

    /// Writes the new values onto `item`.
    pub fn apply_to(&self, item: &mut WorkItem) {
        item.start_date = self.new_start;
        item.due_date = self.new_due;
        item.duration = self.new_duration;
    }
}

/// A strongly connected set of items whose dates depend on each other.
///
/// Members keep their stored dates for the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleWarning {
    /// Members in ascending id order.
    pub item_ids: Vec<WorkItemId>,
}

impl CycleWarning {
    pub fn new(mut item_ids: Vec<WorkItemId>) -> Self {
        item_ids.sort();
        item_ids.dedup();
        Self { item_ids }
    }

    pub fn contains(&self, item: WorkItemId) -> bool {
        self.item_ids.binary_search(&item).is_ok()
    }
}

/// A manually scheduled item starting before its binding predecessor allows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConflict {
    pub item_id: WorkItemId,
    /// The closest (binding) follows relation.
    pub relation_id: RelationId,
    pub soonest_start: NaiveDate,
    pub start_date: NaiveDate,
}

impl ScheduleResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pass changed nothing and found no cycles.
    pub fn is_clean(&self) -> bool {
        self.changes.is_empty() && self.cycles.is_empty()
    }

    /// Finds the change for an item.
    pub fn change_for(&self, item_id: WorkItemId) -> Option<&DateChange> {
        self.changes.iter().find(|c| c.item_id == item_id)
    }

    /// Whether the item is part of any reported cycle.
    pub fn in_cycle(&self, item_id: WorkItemId) -> bool {
        self.cycles.iter().any(|c| c.contains(item_id))
    }

    /// All items reported in cycles, ascending.
    pub fn cycle_item_ids(&self) -> Vec<WorkItemId> {
        let mut ids: Vec<WorkItemId> = self
            .cycles
            .iter()
            .flat_map(|c| c.item_ids.iter().copied())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Finds the conflict reported for an item.
    pub fn conflict_for(&self, item_id: WorkItemId) -> Option<&SchedulingConflict> {
        self.conflicts.iter().find(|c| c.item_id == item_id)
    }

    /// Number of changed items.
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }
}
