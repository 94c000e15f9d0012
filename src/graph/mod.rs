//! In-memory relation graph over work items.
//!
//! Indexes relations by canonical kind and orientation so predecessor,
//! successor and hierarchy queries don't rescan the edge list.
//!
//! # Orientation
//! Every relation is indexed once, in the canonical `(source, target)`
//! orientation of [`Relation::endpoints`]: `(predecessor, successor)` for
//! follows/precedes and `(parent, child)` for the hierarchy. Asking for
//! `Precedes` is the same as asking for `Follows`.

mod closest;

pub use closest::ClosestRelation;

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::warn;

use crate::error::{Error, Result};
use crate::models::{
    Calendar, Relation, RelationId, RelationType, ScheduleResult, WorkItem, WorkItemId,
};

/// Read access to work item snapshots.
///
/// Implemented by the graph (stored dates) and by the scheduler's working
/// copy (dates recomputed so far in a pass).
pub trait ItemSource {
    /// Looks up an item by id.
    fn item(&self, id: WorkItemId) -> Option<&WorkItem>;
}

impl ItemSource for HashMap<WorkItemId, WorkItem> {
    fn item(&self, id: WorkItemId) -> Option<&WorkItem> {
        self.get(&id)
    }
}

type IndexKey = (WorkItemId, RelationType);

/// Work items and the relations between them.
///
/// # Example
/// ```
/// use wp_schedule::graph::RelationGraph;
/// use wp_schedule::models::{Relation, RelationType, WorkItem, WorkItemId};
///
/// let graph = RelationGraph::new(
///     vec![WorkItem::new(1), WorkItem::new(2)],
///     vec![Relation::follows(10, 2, 1)],
/// );
/// let preds = graph.predecessors_of(WorkItemId(2), RelationType::Follows);
/// assert_eq!(preds.len(), 1);
/// assert_eq!(preds[0].predecessor_id(), WorkItemId(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    items: HashMap<WorkItemId, WorkItem>,
    relations: Vec<Relation>,
    by_target: HashMap<IndexKey, Vec<usize>>,
    by_source: HashMap<IndexKey, Vec<usize>>,
}

impl RelationGraph {
    /// Builds a graph from item and relation snapshots.
    ///
    /// Self-relations are dropped with a warning. Relations pointing at
    /// unknown items are kept; lookups through them yield nothing.
    pub fn new(
        items: impl IntoIterator<Item = WorkItem>,
        relations: impl IntoIterator<Item = Relation>,
    ) -> Self {
        let items: HashMap<WorkItemId, WorkItem> =
            items.into_iter().map(|item| (item.id, item)).collect();

        let mut relations: Vec<Relation> = relations
            .into_iter()
            .filter(|r| {
                if r.is_self_relation() {
                    warn!(relation = %r.id, item = %r.from_id, "dropping self-relation");
                    false
                } else {
                    true
                }
            })
            .collect();
        // Oldest first so every index list is already in creation order
        relations.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let mut by_target: HashMap<IndexKey, Vec<usize>> = HashMap::new();
        let mut by_source: HashMap<IndexKey, Vec<usize>> = HashMap::new();
        for (idx, relation) in relations.iter().enumerate() {
            let (source, target) = relation.endpoints();
            let kind = relation.kind();
            by_target.entry((target, kind)).or_default().push(idx);
            by_source.entry((source, kind)).or_default().push(idx);
        }

        Self {
            items,
            relations,
            by_target,
            by_source,
        }
    }

    /// Looks up an item.
    pub fn item(&self, id: WorkItemId) -> Option<&WorkItem> {
        self.items.get(&id)
    }

    /// All items, in no particular order.
    pub fn items(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.values()
    }

    /// All item ids in ascending order.
    pub fn item_ids(&self) -> Vec<WorkItemId> {
        let mut ids: Vec<WorkItemId> = self.items.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the graph holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All relations, oldest first.
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Looks up a relation by id.
    pub fn relation(&self, id: RelationId) -> Option<&Relation> {
        self.relations.iter().find(|r| r.id == id)
    }

    /// Inserts or replaces an item snapshot, returning the previous one.
    pub fn upsert_item(&mut self, item: WorkItem) -> Option<WorkItem> {
        self.items.insert(item.id, item)
    }

    /// Replaces an existing item snapshot, returning the previous one.
    ///
    /// # Errors
    /// [`Error::UnknownWorkItem`] if the graph has no item with that id.
    pub fn update_item(&mut self, item: WorkItem) -> Result<WorkItem> {
        match self.items.get_mut(&item.id) {
            Some(existing) => Ok(std::mem::replace(existing, item)),
            None => Err(Error::UnknownWorkItem(item.id)),
        }
    }

    /// Writes the date changes of a scheduling pass back into the graph.
    pub fn apply(&mut self, result: &ScheduleResult) {
        for change in &result.changes {
            if let Some(item) = self.items.get_mut(&change.item_id) {
                change.apply_to(item);
            }
        }
    }

    /// Relations of the given kind pointing at `item_id`, oldest first.
    ///
    /// For follows/precedes these are the relations to the item's
    /// predecessors; for parent/child, the relation to its parent.
    pub fn predecessors_of(&self, item_id: WorkItemId, relation_type: RelationType) -> Vec<&Relation> {
        self.lookup(&self.by_target, item_id, relation_type)
    }

    /// Relations of the given kind leaving `item_id`, oldest first.
    pub fn successors_of(&self, item_id: WorkItemId, relation_type: RelationType) -> Vec<&Relation> {
        self.lookup(&self.by_source, item_id, relation_type)
    }

    fn lookup(
        &self,
        index: &HashMap<IndexKey, Vec<usize>>,
        item_id: WorkItemId,
        relation_type: RelationType,
    ) -> Vec<&Relation> {
        index
            .get(&(item_id, relation_type.canonical()))
            .map(|idxs| idxs.iter().map(|&i| &self.relations[i]).collect())
            .unwrap_or_default()
    }

    /// Parent of an item. With several parent relations the oldest wins.
    pub fn parent_of(&self, item_id: WorkItemId) -> Option<WorkItemId> {
        self.predecessors_of(item_id, RelationType::Parent)
            .first()
            .map(|r| r.endpoints().0)
    }

    /// Direct children of an item, oldest relation first.
    pub fn children_of(&self, item_id: WorkItemId) -> Vec<WorkItemId> {
        self.successors_of(item_id, RelationType::Parent)
            .iter()
            .map(|r| r.endpoints().1)
            .collect()
    }

    /// Whether the item has children.
    pub fn has_children(&self, item_id: WorkItemId) -> bool {
        self.by_source
            .get(&(item_id, RelationType::Parent))
            .is_some_and(|v| !v.is_empty())
    }

    /// Ancestors, nearest first. Stops at a repeated item.
    pub fn ancestors_of(&self, item_id: WorkItemId) -> Vec<WorkItemId> {
        let mut ancestors = Vec::new();
        let mut seen = HashSet::from([item_id]);
        let mut current = item_id;
        while let Some(parent) = self.parent_of(current) {
            if !seen.insert(parent) {
                break;
            }
            ancestors.push(parent);
            current = parent;
        }
        ancestors
    }

    /// All descendants in breadth-first order.
    pub fn descendants_of(&self, item_id: WorkItemId) -> Vec<WorkItemId> {
        let mut descendants = Vec::new();
        let mut seen = HashSet::from([item_id]);
        let mut queue = VecDeque::from([item_id]);
        while let Some(current) = queue.pop_front() {
            for child in self.children_of(current) {
                if seen.insert(child) {
                    descendants.push(child);
                    queue.push_back(child);
                }
            }
        }
        descendants
    }

    /// Follows relations constraining an item: its own plus those of all
    /// its ancestors. Own relations come first, each group oldest first.
    pub fn scheduling_relations_of(&self, item_id: WorkItemId) -> Vec<&Relation> {
        let mut relations = self.predecessors_of(item_id, RelationType::Follows);
        for ancestor in self.ancestors_of(item_id) {
            relations.extend(self.predecessors_of(ancestor, RelationType::Follows));
        }
        relations
    }

    /// The binding follows relation of `item_id` over the stored dates.
    ///
    /// See [`ClosestRelation`] for the ranking.
    pub fn closest_follows_relation(
        &self,
        item_id: WorkItemId,
        calendar: &Calendar,
    ) -> Option<ClosestRelation<'_>> {
        self.closest_follows_relation_in(item_id, calendar, self)
    }

    /// The binding follows relation of `item_id`, reading predecessor
    /// dates from `source`.
    pub fn closest_follows_relation_in<S: ItemSource + ?Sized>(
        &self,
        item_id: WorkItemId,
        calendar: &Calendar,
        source: &S,
    ) -> Option<ClosestRelation<'_>> {
        let ignore = source.item(item_id)?.ignore_non_working_days;
        ClosestRelation::select(
            self.predecessors_of(item_id, RelationType::Follows)
                .into_iter()
                .map(|r| ClosestRelation::evaluate(r, source, calendar, ignore)),
        )
    }

    /// Like [`closest_follows_relation_in`](Self::closest_follows_relation_in)
    /// but also ranks the follows relations inherited from ancestors.
    pub fn closest_scheduling_relation_in<S: ItemSource + ?Sized>(
        &self,
        item_id: WorkItemId,
        calendar: &Calendar,
        source: &S,
    ) -> Option<ClosestRelation<'_>> {
        let ignore = source.item(item_id)?.ignore_non_working_days;
        ClosestRelation::select(
            self.scheduling_relations_of(item_id)
                .into_iter()
                .map(|r| ClosestRelation::evaluate(r, source, calendar, ignore)),
        )
    }
}

impl ItemSource for RelationGraph {
    fn item(&self, id: WorkItemId) -> Option<&WorkItem> {
        self.items.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at_day(day: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn items(ids: &[u64]) -> Vec<WorkItem> {
        ids.iter().map(|&id| WorkItem::new(id)).collect()
    }

    #[test]
    fn test_predecessors_ordered_by_creation() {
        let graph = RelationGraph::new(
            items(&[1, 2, 3, 4]),
            vec![
                Relation::follows(1, 4, 1).with_created_at(at_day(3)),
                Relation::precedes(2, 2, 4).with_created_at(at_day(1)),
                Relation::follows(3, 4, 3).with_created_at(at_day(2)),
            ],
        );

        let preds: Vec<WorkItemId> = graph
            .predecessors_of(WorkItemId(4), RelationType::Follows)
            .iter()
            .map(|r| r.predecessor_id())
            .collect();
        assert_eq!(preds, vec![WorkItemId(2), WorkItemId(3), WorkItemId(1)]);

        // Precedes is the same logical edge
        assert_eq!(
            graph.predecessors_of(WorkItemId(4), RelationType::Precedes).len(),
            3
        );
    }

    #[test]
    fn test_successors_of() {
        let graph = RelationGraph::new(
            items(&[1, 2, 3]),
            vec![Relation::follows(1, 2, 1), Relation::precedes(2, 1, 3)],
        );
        let succs: Vec<WorkItemId> = graph
            .successors_of(WorkItemId(1), RelationType::Follows)
            .iter()
            .map(|r| r.successor_id())
            .collect();
        assert_eq!(succs, vec![WorkItemId(2), WorkItemId(3)]);
        assert!(graph
            .successors_of(WorkItemId(2), RelationType::Follows)
            .is_empty());
    }

    #[test]
    fn test_self_relation_dropped() {
        let graph = RelationGraph::new(items(&[1]), vec![Relation::follows(1, 1, 1)]);
        assert!(graph.relations().is_empty());
        assert!(graph
            .predecessors_of(WorkItemId(1), RelationType::Follows)
            .is_empty());
    }

    #[test]
    fn test_unrelated_kinds_not_mixed() {
        let graph = RelationGraph::new(
            items(&[1, 2]),
            vec![Relation::new(1, 2, 1, RelationType::Blocked)],
        );
        assert!(graph
            .predecessors_of(WorkItemId(2), RelationType::Follows)
            .is_empty());
        assert_eq!(
            graph.predecessors_of(WorkItemId(2), RelationType::Blocks).len(),
            1
        );
    }

    #[test]
    fn test_hierarchy_queries() {
        // 1 ─┬─ 2 ── 4
        //    └─ 3
        let graph = RelationGraph::new(
            items(&[1, 2, 3, 4]),
            vec![
                Relation::parent(1, 1, 2),
                Relation::parent(2, 1, 3),
                Relation::new(3, 4, 2, RelationType::Child),
            ],
        );

        assert_eq!(graph.parent_of(WorkItemId(4)), Some(WorkItemId(2)));
        assert_eq!(graph.parent_of(WorkItemId(1)), None);
        assert_eq!(
            graph.children_of(WorkItemId(1)),
            vec![WorkItemId(2), WorkItemId(3)]
        );
        assert!(graph.has_children(WorkItemId(2)));
        assert!(!graph.has_children(WorkItemId(3)));
        assert_eq!(
            graph.ancestors_of(WorkItemId(4)),
            vec![WorkItemId(2), WorkItemId(1)]
        );
        assert_eq!(
            graph.descendants_of(WorkItemId(1)),
            vec![WorkItemId(2), WorkItemId(3), WorkItemId(4)]
        );
    }

    #[test]
    fn test_ancestors_stop_on_cycle() {
        let graph = RelationGraph::new(
            items(&[1, 2]),
            vec![Relation::parent(1, 1, 2), Relation::parent(2, 2, 1)],
        );
        assert_eq!(graph.ancestors_of(WorkItemId(2)), vec![WorkItemId(1)]);
    }

    #[test]
    fn test_scheduling_relations_include_ancestors() {
        // 3 is a child of 2, and 2 follows 1
        let graph = RelationGraph::new(
            items(&[1, 2, 3]),
            vec![Relation::follows(1, 2, 1), Relation::parent(2, 2, 3)],
        );
        let rels = graph.scheduling_relations_of(WorkItemId(3));
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].id, RelationId(1));
    }

    #[test]
    fn test_update_and_apply() {
        let mut graph = RelationGraph::new(items(&[1]), vec![]);
        let updated = WorkItem::new(1).with_start(date(2025, 3, 3));
        let previous = graph.update_item(updated).unwrap();
        assert_eq!(previous.start_date, None);
        assert!(matches!(
            graph.update_item(WorkItem::new(9)),
            Err(Error::UnknownWorkItem(WorkItemId(9)))
        ));
        assert!(graph.upsert_item(WorkItem::new(9)).is_none());
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.item_ids(), vec![WorkItemId(1), WorkItemId(9)]);
    }

    #[test]
    fn test_closest_follows_relation_latest_wins() {
        let cal = Calendar::default();
        let graph = RelationGraph::new(
            vec![
                WorkItem::new(1).manual().with_dates(date(2025, 3, 3), date(2025, 3, 4)),
                WorkItem::new(2).manual().with_dates(date(2025, 3, 3), date(2025, 3, 6)),
                WorkItem::new(3),
            ],
            vec![
                Relation::follows(1, 3, 1).with_created_at(at_day(1)),
                Relation::follows(2, 3, 2).with_created_at(at_day(2)),
            ],
        );
        let closest = graph.closest_follows_relation(WorkItemId(3), &cal).unwrap();
        assert_eq!(closest.relation.id, RelationId(2));
        assert_eq!(closest.soonest_start, Some(date(2025, 3, 7)));
    }

    #[test]
    fn test_closest_follows_relation_none_without_dates() {
        let cal = Calendar::default();
        let graph = RelationGraph::new(items(&[1, 2]), vec![Relation::follows(1, 2, 1)]);
        assert!(graph.closest_follows_relation(WorkItemId(2), &cal).is_none());
        assert!(graph.closest_follows_relation(WorkItemId(1), &cal).is_none());
    }
}
