//! Relations between work items.
//!
//! A relation is a typed, directed edge. Every type has a reverse
//! (`Follows` ↔ `Precedes`, `Parent` ↔ `Child`, ...) so the same logical
//! edge can be stored from either end. Graph code works on the canonical
//! orientation returned by [`Relation::endpoints`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::WorkItemId;

/// Opaque, stable relation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationId(pub u64);

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "relation {}", self.0)
    }
}

/// Relation kinds.
///
/// Only `Follows`/`Precedes` and `Parent`/`Child` influence dates; the
/// others are carried so a graph can hold a project's full relation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// `from` starts after `to` finishes (plus lag). Canonical scheduling edge.
    Follows,
    /// `from` finishes before `to` starts (plus lag).
    Precedes,
    /// `from` is the parent of `to`.
    Parent,
    /// `from` is a child of `to`.
    Child,
    Relates,
    Duplicates,
    Duplicated,
    Blocks,
    Blocked,
    Includes,
    PartOf,
    Requires,
    Required,
}

impl RelationType {
    /// The same logical relation seen from the other end.
    pub fn reverse(self) -> Self {
        match self {
            Self::Follows => Self::Precedes,
            Self::Precedes => Self::Follows,
            Self::Parent => Self::Child,
            Self::Child => Self::Parent,
            Self::Relates => Self::Relates,
            Self::Duplicates => Self::Duplicated,
            Self::Duplicated => Self::Duplicates,
            Self::Blocks => Self::Blocked,
            Self::Blocked => Self::Blocks,
            Self::Includes => Self::PartOf,
            Self::PartOf => Self::Includes,
            Self::Requires => Self::Required,
            Self::Required => Self::Requires,
        }
    }

    /// The member of the reverse pair graphs index by.
    pub fn canonical(self) -> Self {
        match self {
            Self::Follows | Self::Precedes => Self::Follows,
            Self::Parent | Self::Child => Self::Parent,
            Self::Relates => Self::Relates,
            Self::Duplicates | Self::Duplicated => Self::Duplicates,
            Self::Blocks | Self::Blocked => Self::Blocks,
            Self::Includes | Self::PartOf => Self::Includes,
            Self::Requires | Self::Required => Self::Requires,
        }
    }

    /// Whether this relation influences start/due dates.
    pub fn affects_scheduling(self) -> bool {
        matches!(
            self,
            Self::Follows | Self::Precedes | Self::Parent | Self::Child
        )
    }
}

/// A directed, typed edge between two work items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Unique relation identifier.
    pub id: RelationId,
    /// Item the relation is stored on.
    pub from_id: WorkItemId,
    /// Item the relation points at.
    pub to_id: WorkItemId,
    /// Relation kind, read as "`from` <type> `to`".
    pub relation_type: RelationType,
    /// Minimum gap in days between predecessor finish and successor start.
    /// Only meaningful for follows/precedes; negative values are invalid.
    pub lag: i32,
    /// Creation time, used as ordering tie-break.
    pub created_at: DateTime<Utc>,
}

impl Relation {
    /// Creates a relation "`from` <relation_type> `to`" with zero lag.
    pub fn new(
        id: u64,
        from_id: impl Into<WorkItemId>,
        to_id: impl Into<WorkItemId>,
        relation_type: RelationType,
    ) -> Self {
        Self {
            id: RelationId(id),
            from_id: from_id.into(),
            to_id: to_id.into(),
            relation_type,
            lag: 0,
            created_at: DateTime::<Utc>::default(),
        }
    }

    /// `successor` follows `predecessor`.
    pub fn follows(
        id: u64,
        successor: impl Into<WorkItemId>,
        predecessor: impl Into<WorkItemId>,
    ) -> Self {
        Self::new(id, successor, predecessor, RelationType::Follows)
    }

    /// `predecessor` precedes `successor`.
    pub fn precedes(
        id: u64,
        predecessor: impl Into<WorkItemId>,
        successor: impl Into<WorkItemId>,
    ) -> Self {
        Self::new(id, predecessor, successor, RelationType::Precedes)
    }

    /// `parent` is the parent of `child`.
    pub fn parent(id: u64, parent: impl Into<WorkItemId>, child: impl Into<WorkItemId>) -> Self {
        Self::new(id, parent, child, RelationType::Parent)
    }

    /// Sets the lag in days.
    pub fn with_lag(mut self, lag: i32) -> Self {
        self.lag = lag;
        self
    }

    /// Sets the creation time.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Canonical kind of this relation (see [`RelationType::canonical`]).
    #[inline]
    pub fn kind(&self) -> RelationType {
        self.relation_type.canonical()
    }

    /// `(source, target)` in canonical orientation.
    ///
    /// - follows/precedes: `(predecessor, successor)`
    /// - parent/child: `(parent, child)`
    /// - other pairs: `(from, to)` of the canonical member
    pub fn endpoints(&self) -> (WorkItemId, WorkItemId) {
        let forward = match self.relation_type {
            RelationType::Follows => false,
            RelationType::Precedes => true,
            other => other == other.canonical(),
        };
        if forward {
            (self.from_id, self.to_id)
        } else {
            (self.to_id, self.from_id)
        }
    }

    /// Predecessor of a follows/precedes relation (canonical source).
    #[inline]
    pub fn predecessor_id(&self) -> WorkItemId {
        self.endpoints().0
    }

    /// Successor of a follows/precedes relation (canonical target).
    #[inline]
    pub fn successor_id(&self) -> WorkItemId {
        self.endpoints().1
    }

    /// Whether both ends are the same item.
    pub fn is_self_relation(&self) -> bool {
        self.from_id == self.to_id
    }

    /// Whether `item` is one of the two ends.
    pub fn involves(&self, item: WorkItemId) -> bool {
        self.from_id == item || self.to_id == item
    }
}
