//! Automatic date scheduling.
//!
//! When a work item's dates change, every automatically scheduled item
//! that depends on it (directly or transitively, through follows relations
//! and the parent hierarchy) is moved so it starts no earlier than its
//! predecessors allow. Manually scheduled items are never moved.
//!
//! # Algorithm
//!
//! [`Scheduler`] collects the affected subgraph, orders it by strongly
//! connected components (Tarjan) and recomputes each acyclic item once.
//! Items on a dependency cycle keep their stored dates and are reported.
//!
//! # References
//!
//! - Tarjan (1972), "Depth-First Search and Linear Graph Algorithms"
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"

mod dates;
mod order;
mod propagation;

pub use dates::soonest_successor_start;
pub use propagation::Scheduler;
