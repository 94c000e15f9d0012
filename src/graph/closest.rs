//! Closest (binding) follows relation.
//!
//! Among the follows relations into one successor, the closest relation is
//! the one whose predecessor allows the latest start. It is the relation
//! that actually constrains the successor, and the one conflict messages
//! point at.
//!
//! # Ranking
//! 1. A defined soonest start beats `None`; two `None`s are equal.
//! 2. Later soonest start ranks higher.
//! 3. On equal rank the OLDER relation ranks higher (reverse creation time),
//!    then the lower relation id.

use std::cmp::Ordering;

use chrono::NaiveDate;

use super::ItemSource;
use crate::models::{Calendar, Relation};
use crate::scheduler::soonest_successor_start;

/// A follows relation paired with the soonest start it allows.
#[derive(Debug, Clone, Copy)]
pub struct ClosestRelation<'a> {
    /// The relation.
    pub relation: &'a Relation,
    /// Soonest start the relation allows its successor, if determinable.
    pub soonest_start: Option<NaiveDate>,
}

impl<'a> ClosestRelation<'a> {
    /// Evaluates a relation against the predecessor's dates in `source`.
    ///
    /// `ignore_non_working_days` is the flag of the item being scheduled.
    pub fn evaluate<S: ItemSource + ?Sized>(
        relation: &'a Relation,
        source: &S,
        calendar: &Calendar,
        ignore_non_working_days: bool,
    ) -> Self {
        let soonest_start = source
            .item(relation.predecessor_id())
            .and_then(|pred| {
                soonest_successor_start(calendar, relation, pred, ignore_non_working_days)
            });
        Self {
            relation,
            soonest_start,
        }
    }

    /// Total order used to pick the closest relation (greater = closer).
    pub fn compare(&self, other: &Self) -> Ordering {
        let by_date = match (self.soonest_start, other.soonest_start) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp(&b),
        };
        by_date
            .then_with(|| other.relation.created_at.cmp(&self.relation.created_at))
            .then_with(|| other.relation.id.cmp(&self.relation.id))
    }

    /// Picks the closest candidate.
    ///
    /// Returns `None` if there are no candidates or none has a soonest start.
    pub fn select(candidates: impl IntoIterator<Item = Self>) -> Option<Self> {
        candidates
            .into_iter()
            .max_by(|a, b| a.compare(b))
            .filter(|c| c.soonest_start.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RelationId, WorkItem, WorkItemId};
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn relation(id: u64, created_day: u32) -> Relation {
        Relation::follows(id, 100, id).with_created_at(
            Utc.with_ymd_and_hms(2024, 1, created_day, 0, 0, 0).unwrap(),
        )
    }

    fn candidate(rel: &Relation, soonest: Option<NaiveDate>) -> ClosestRelation<'_> {
        ClosestRelation {
            relation: rel,
            soonest_start: soonest,
        }
    }

    #[test]
    fn test_none_loses() {
        let a = relation(1, 1);
        let b = relation(2, 2);
        let none = candidate(&a, None);
        let some = candidate(&b, Some(date(2025, 1, 1)));
        assert_eq!(none.compare(&some), Ordering::Less);
        assert_eq!(some.compare(&none), Ordering::Greater);

        let selected = ClosestRelation::select([none, some]).unwrap();
        assert_eq!(selected.relation.id, RelationId(2));
    }

    #[test]
    fn test_both_none_tie_breaks_to_older() {
        let older = relation(1, 1);
        let newer = relation(2, 5);
        let a = candidate(&older, None);
        let b = candidate(&newer, None);
        assert_eq!(a.compare(&b), Ordering::Greater);
        assert!(ClosestRelation::select([a, b]).is_none());
    }

    #[test]
    fn test_latest_soonest_start_wins() {
        let a = relation(1, 1);
        let b = relation(2, 2);
        let selected = ClosestRelation::select([
            candidate(&a, Some(date(2025, 3, 10))),
            candidate(&b, Some(date(2025, 3, 5))),
        ])
        .unwrap();
        assert_eq!(selected.relation.id, RelationId(1));
    }

    #[test]
    fn test_equal_dates_older_relation_wins() {
        let older = relation(7, 1);
        let newer = relation(3, 9);
        let same = Some(date(2025, 3, 7));
        // Order of candidates must not matter
        for pair in [
            [candidate(&older, same), candidate(&newer, same)],
            [candidate(&newer, same), candidate(&older, same)],
        ] {
            let selected = ClosestRelation::select(pair).unwrap();
            assert_eq!(selected.relation.id, RelationId(7));
        }
    }

    #[test]
    fn test_empty_candidates() {
        assert!(ClosestRelation::select(Vec::new()).is_none());
    }

    #[test]
    fn test_evaluate_reads_predecessor_dates() {
        let cal = Calendar::default();
        let rel = Relation::follows(1, 2, 1).with_lag(2);
        let mut items = HashMap::new();
        items.insert(
            WorkItemId(1),
            WorkItem::new(1).with_dates(date(2025, 3, 4), date(2025, 3, 4)),
        );
        let evaluated = ClosestRelation::evaluate(&rel, &items, &cal, false);
        assert_eq!(evaluated.soonest_start, Some(date(2025, 3, 7)));

        items.clear();
        let missing = ClosestRelation::evaluate(&rel, &items, &cal, false);
        assert_eq!(missing.soonest_start, None);
    }
}
