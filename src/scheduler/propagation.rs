//! Date propagation over the relation graph.
//!
//! # Algorithm
//!
//! 1. Overlay the caller's changed items on the graph's stored snapshot.
//! 2. Collect every item reachable from the changed set through dependency
//!    edges: predecessor → successor (and the successor's descendants,
//!    which inherit its relations), child → automatically scheduled parent.
//! 3. Order the affected items by strongly connected components.
//! 4. Recompute each acyclic item once, in order:
//!    - manually scheduled: untouched
//!    - automatic parent: roll up children
//!    - automatic leaf: start on the soonest start of its closest relation,
//!      keep its duration
//! 5. Report cycles, conflicts and every item whose values moved.
//!
//! # Complexity
//! O(n + e) SCC pass plus one closest-relation ranking per affected item.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::NaiveDate;
use tracing::{debug, trace, warn};

use super::dates::{move_to_start, rollup};
use super::order::{components, Dependents};
use crate::error::{Error, Result};
use crate::graph::{ItemSource, RelationGraph};
use crate::models::{
    Calendar, CycleWarning, DateChange, RelationType, ScheduleResult, SchedulingConflict,
    WorkItem, WorkItemId,
};

/// Item snapshots of one pass: recomputed values over the stored graph.
struct WorkingSet<'g> {
    graph: &'g RelationGraph,
    overlay: HashMap<WorkItemId, WorkItem>,
}

impl ItemSource for WorkingSet<'_> {
    fn item(&self, id: WorkItemId) -> Option<&WorkItem> {
        self.overlay.get(&id).or_else(|| self.graph.item(id))
    }
}

/// Recomputes derived dates after items changed.
///
/// A pass is synchronous and works on an in-memory snapshot; concurrent
/// passes over the same graph must be serialized by the caller.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use wp_schedule::graph::RelationGraph;
/// use wp_schedule::models::{Calendar, Relation, WorkItem, WorkItemId};
/// use wp_schedule::scheduler::Scheduler;
///
/// let tue = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
/// let graph = RelationGraph::new(
///     vec![
///         WorkItem::new(1).manual().with_dates(tue, tue),
///         WorkItem::new(2).with_duration(2),
///     ],
///     vec![Relation::follows(1, 2, 1).with_lag(2)],
/// );
///
/// let scheduler = Scheduler::new(Calendar::default());
/// let result = scheduler.schedule_all(&graph);
/// let change = result.change_for(WorkItemId(2)).unwrap();
/// assert_eq!(change.new_start, NaiveDate::from_ymd_opt(2025, 3, 7));
/// assert_eq!(change.new_due, NaiveDate::from_ymd_opt(2025, 3, 10));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    calendar: Calendar,
}

impl Scheduler {
    /// Creates a scheduler over a working-day calendar.
    pub fn new(calendar: Calendar) -> Self {
        Self { calendar }
    }

    /// The calendar used for day arithmetic.
    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Reschedules after the caller changed `changed` items.
    ///
    /// `changed` holds the new snapshots; the graph still holds the stored
    /// ones, which the change records compare against.
    ///
    /// # Errors
    /// [`Error::UnknownWorkItem`] if a changed item is not in the graph.
    pub fn reschedule(&self, graph: &RelationGraph, changed: &[WorkItem]) -> Result<ScheduleResult> {
        let mut overlay = HashMap::new();
        let mut seeds = Vec::with_capacity(changed.len());
        for item in changed {
            if graph.item(item.id).is_none() {
                return Err(Error::UnknownWorkItem(item.id));
            }
            seeds.push(item.id);
            overlay.insert(item.id, item.clone());
        }
        Ok(self.run(WorkingSet { graph, overlay }, seeds))
    }

    /// Reschedules from items whose stored snapshot already changed.
    ///
    /// # Errors
    /// [`Error::UnknownWorkItem`] if an id is not in the graph.
    pub fn reschedule_ids(&self, graph: &RelationGraph, ids: &[WorkItemId]) -> Result<ScheduleResult> {
        if let Some(missing) = ids.iter().find(|id| graph.item(**id).is_none()) {
            return Err(Error::UnknownWorkItem(*missing));
        }
        let working = WorkingSet {
            graph,
            overlay: HashMap::new(),
        };
        Ok(self.run(working, ids.to_vec()))
    }

    /// Recomputes every item of the graph.
    pub fn schedule_all(&self, graph: &RelationGraph) -> ScheduleResult {
        let working = WorkingSet {
            graph,
            overlay: HashMap::new(),
        };
        self.run(working, graph.item_ids())
    }

    /// Soonest start of an item over the stored dates, counting relations
    /// inherited from ancestors.
    pub fn soonest_start(&self, graph: &RelationGraph, item_id: WorkItemId) -> Option<NaiveDate> {
        graph
            .closest_scheduling_relation_in(item_id, &self.calendar, graph)?
            .soonest_start
    }

    fn run(&self, mut working: WorkingSet<'_>, seeds: Vec<WorkItemId>) -> ScheduleResult {
        let graph = working.graph;
        let (affected, dependents) = collect_affected(&working, &seeds);
        let order = components(&affected, &dependents);

        let mut result = ScheduleResult::new();
        for component in order {
            if component.cyclic {
                warn!(items = ?component.members, "dependency cycle, keeping stored dates");
                result.cycles.push(CycleWarning::new(component.members));
                continue;
            }
            for id in component.members {
                if let Some(updated) = self.compute(&working, id) {
                    trace!(
                        item = %id,
                        start = ?updated.start_date,
                        due = ?updated.due_date,
                        "rescheduled item"
                    );
                    working.overlay.insert(id, updated);
                }
            }
        }

        for &id in &affected {
            let (Some(old), Some(new)) = (graph.item(id), working.item(id)) else {
                continue;
            };
            if !old.same_dates(new) || old.duration != new.duration {
                result.changes.push(DateChange::between(old, new));
            }
            if let Some(conflict) = self.conflict(&working, new) {
                result.conflicts.push(conflict);
            }
        }

        debug!(
            seeds = seeds.len(),
            affected = affected.len(),
            changes = result.changes.len(),
            cycles = result.cycles.len(),
            conflicts = result.conflicts.len(),
            "scheduling pass finished"
        );
        result
    }

    /// New snapshot for an item, or `None` when it keeps its current values.
    fn compute(&self, working: &WorkingSet<'_>, id: WorkItemId) -> Option<WorkItem> {
        let graph = working.graph;
        let item = working.item(id)?;
        if item.schedule_manually {
            return None;
        }

        if graph.has_children(id) {
            let children = graph.children_of(id);
            return rollup(
                &self.calendar,
                item,
                children.iter().filter_map(|c| working.item(*c)),
            );
        }

        let closest = graph.closest_scheduling_relation_in(id, &self.calendar, working)?;
        let start = closest.soonest_start?;
        Some(move_to_start(&self.calendar, item, start))
    }

    /// A manually scheduled item starting before its closest relation allows.
    fn conflict(&self, working: &WorkingSet<'_>, item: &WorkItem) -> Option<SchedulingConflict> {
        if !item.schedule_manually {
            return None;
        }
        let start_date = item.start_date?;
        let closest = working
            .graph
            .closest_scheduling_relation_in(item.id, &self.calendar, working)?;
        let soonest_start = closest.soonest_start?;
        (start_date < soonest_start).then(|| SchedulingConflict {
            item_id: item.id,
            relation_id: closest.relation.id,
            soonest_start,
            start_date,
        })
    }
}

/// Items whose dates have to be recomputed after `id` changed.
fn dependents_of<S: ItemSource + ?Sized>(
    graph: &RelationGraph,
    source: &S,
    id: WorkItemId,
) -> Vec<WorkItemId> {
    let mut out = Vec::new();
    for relation in graph.successors_of(id, RelationType::Follows) {
        let successor = relation.successor_id();
        out.push(successor);
        out.extend(graph.descendants_of(successor));
    }
    if let Some(parent) = graph.parent_of(id) {
        if source.item(parent).is_some_and(|p| !p.schedule_manually) {
            out.push(parent);
        }
    }
    out.sort();
    out.dedup();
    out
}

/// Breadth-first closure of `seeds` over dependency edges, visiting each
/// item once. Returns the sorted affected set and its edges.
fn collect_affected(working: &WorkingSet<'_>, seeds: &[WorkItemId]) -> (Vec<WorkItemId>, Dependents) {
    let graph = working.graph;
    let mut seen: HashSet<WorkItemId> = HashSet::new();
    let mut queue: VecDeque<WorkItemId> = VecDeque::new();
    let mut dependents = Dependents::new();

    for &seed in seeds {
        if seen.insert(seed) {
            queue.push_back(seed);
        }
    }
    while let Some(id) = queue.pop_front() {
        let next = dependents_of(graph, working, id);
        for &dep in &next {
            if graph.item(dep).is_some() && seen.insert(dep) {
                queue.push_back(dep);
            }
        }
        dependents.insert(id, next);
    }

    let mut affected: Vec<WorkItemId> = seen.into_iter().collect();
    affected.sort();
    (affected, dependents)
}
