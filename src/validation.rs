//! Input validation for scheduling.
//!
//! The scheduler degrades on bad data instead of failing; callers that want
//! to reject bad input up front run these checks first. Detects:
//! - Duplicate item and relation IDs
//! - Self-relations and negative lag
//! - Relations referencing unknown items
//! - Due dates before start dates, milestones spanning several days
//! - Circular follows dependencies (DAG validation)
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{HashMap, HashSet};

use crate::models::{Relation, RelationType, WorkItem, WorkItemId};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two work items share the same ID.
    DuplicateId,
    /// Two relations share the same ID.
    DuplicateRelationId,
    /// A relation connects an item with itself.
    SelfRelation,
    /// A relation has a negative lag.
    NegativeLag,
    /// A relation references an item that doesn't exist.
    InvalidReference,
    /// An item's due date lies before its start date.
    DueBeforeStart,
    /// A milestone's start and due dates differ.
    MilestoneSpan,
    /// The follows graph contains a cycle.
    CyclicDependency,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates work items and relations before scheduling.
///
/// Checks:
/// 1. No duplicate item IDs
/// 2. No duplicate relation IDs
/// 3. Items have `due >= start`, milestones a single day
/// 4. Relations are not self-relations and have non-negative lag
/// 5. Relation endpoints point to existing items
/// 6. No circular follows dependencies
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(items: &[WorkItem], relations: &[Relation]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut item_ids = HashSet::new();
    for item in items {
        if !item_ids.insert(item.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate work item ID: {}", item.id),
            ));
        }

        if let (Some(start), Some(due)) = (item.start_date, item.due_date) {
            if due < start {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DueBeforeStart,
                    format!("Work item {} is due {due} before it starts {start}", item.id),
                ));
            } else if item.is_milestone && due != start {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MilestoneSpan,
                    format!("Milestone {} spans {start} to {due}", item.id),
                ));
            }
        }
    }

    let mut relation_ids = HashSet::new();
    for rel in relations {
        if !relation_ids.insert(rel.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateRelationId,
                format!("Duplicate relation ID: {}", rel.id.0),
            ));
        }

        if rel.is_self_relation() {
            errors.push(ValidationError::new(
                ValidationErrorKind::SelfRelation,
                format!("Relation {} connects {} with itself", rel.id.0, rel.from_id),
            ));
        }

        if rel.lag < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeLag,
                format!("Relation {} has negative lag {}", rel.id.0, rel.lag),
            ));
        }

        for endpoint in [rel.from_id, rel.to_id] {
            if !item_ids.contains(&endpoint) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidReference,
                    format!("Relation {} references unknown work item {endpoint}", rel.id.0),
                ));
            }
        }
    }

    if let Some(cycle_err) = detect_cycles(relations) {
        errors.push(cycle_err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the follows graph using DFS.
///
/// # Algorithm
/// Three-color depth-first search on an explicit stack. Reaching a node
/// that is still open (on the current path) is a back edge, so a cycle
/// exists. Self-relations are reported separately and skipped here.
///
/// # Reference
/// Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.3-22.4
fn detect_cycles(relations: &[Relation]) -> Option<ValidationError> {
    // Adjacency list: predecessor → successors
    let mut adj: HashMap<WorkItemId, Vec<WorkItemId>> = HashMap::new();
    let mut all_ids: Vec<WorkItemId> = Vec::new();

    for rel in relations {
        if rel.kind() != RelationType::Follows || rel.is_self_relation() {
            continue;
        }
        let (pred, succ) = rel.endpoints();
        adj.entry(pred).or_default().push(succ);
        all_ids.extend([pred, succ]);
    }
    all_ids.sort();
    all_ids.dedup();

    let mut marks: HashMap<WorkItemId, Mark> = HashMap::new();
    all_ids
        .into_iter()
        .find_map(|root| find_back_edge(root, &adj, &mut marks))
        .map(|node| {
            ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular dependency detected involving work item {node}"),
            )
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Open,
    Done,
}

/// Walks everything reachable from `root` and returns the target of the
/// first back edge found.
fn find_back_edge(
    root: WorkItemId,
    adj: &HashMap<WorkItemId, Vec<WorkItemId>>,
    marks: &mut HashMap<WorkItemId, Mark>,
) -> Option<WorkItemId> {
    if marks.contains_key(&root) {
        return None;
    }
    marks.insert(root, Mark::Open);
    let mut path: Vec<(WorkItemId, usize)> = vec![(root, 0)];

    while let Some((node, pos)) = path.last_mut() {
        let successors = adj.get(&*node).map(Vec::as_slice).unwrap_or(&[]);
        let Some(&next) = successors.get(*pos) else {
            marks.insert(*node, Mark::Done);
            path.pop();
            continue;
        };
        *pos += 1;

        match marks.get(&next) {
            Some(Mark::Open) => return Some(next),
            Some(Mark::Done) => {}
            None => {
                marks.insert(next, Mark::Open);
                path.push((next, 0));
            }
        }
    }
    None
}
