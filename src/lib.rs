//! Work package date scheduling.
//!
//! Keeps the dates of dependent work items consistent: when an item moves,
//! every automatically scheduled item that follows it (directly, through a
//! parent, or transitively) is moved so it starts no earlier than its
//! predecessors allow, counting working days only.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `WorkItem`, `Relation`, `RelationType`,
//!   `Calendar`, `WorkingDays`, `ScheduleResult`, `DateChange`
//! - **`graph`**: `RelationGraph` with predecessor/successor and hierarchy
//!   queries, closest (binding) relation ranking
//! - **`scheduler`**: `Scheduler`, the date propagation pass
//! - **`reconciliation`**: touched/derived state of the date form and the
//!   derived preview values
//! - **`validation`**: Input integrity checks (duplicate IDs, lag, cycles)
//! - **`config`**: `SchedulingConfig` from TOML or the environment
//!
//! # Architecture
//!
//! Pure, synchronous, in-memory. Callers load item and relation snapshots,
//! run a pass, and persist the returned change records. Bad data degrades
//! to undetermined (`None`) dates and cycle warnings instead of errors.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use wp_schedule::config::SchedulingConfig;
//! use wp_schedule::graph::RelationGraph;
//! use wp_schedule::models::{Relation, WorkItem, WorkItemId};
//! use wp_schedule::scheduler::Scheduler;
//!
//! let calendar = SchedulingConfig::default().calendar();
//! let mon = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
//! let fri = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
//!
//! let mut graph = RelationGraph::new(
//!     vec![
//!         WorkItem::new(1).manual().with_dates(mon, fri),
//!         WorkItem::new(2).with_duration(3),
//!     ],
//!     vec![Relation::follows(1, 2, 1)],
//! );
//!
//! let result = Scheduler::new(calendar).reschedule_ids(&graph, &[WorkItemId(1)]).unwrap();
//! graph.apply(&result);
//!
//! let follower = graph.item(WorkItemId(2)).unwrap();
//! assert_eq!(follower.start_date, NaiveDate::from_ymd_opt(2025, 3, 10));
//! assert_eq!(follower.due_date, NaiveDate::from_ymd_opt(2025, 3, 12));
//! ```
//!
//! # References
//!
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"
//! - Tarjan (1972), "Depth-First Search and Linear Graph Algorithms"

pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod reconciliation;
pub mod scheduler;
pub mod validation;

pub use error::{Error, Result};
