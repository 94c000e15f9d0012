//! Processing order for a scheduling pass.
//!
//! Splits the dependency graph of the affected items into strongly
//! connected components and returns them in topological order. A component
//! with more than one member (or a member depending on itself) is a cycle.
//!
//! # Algorithm
//! Tarjan's SCC algorithm: one iterative DFS, every node visited exactly
//! once, so the walk is bounded by the number of affected items.
//! Components are emitted sinks first; reversing that list gives the
//! processing order.
//!
//! # Reference
//! Tarjan (1972), "Depth-First Search and Linear Graph Algorithms"

use std::collections::{HashMap, HashSet};

use crate::models::WorkItemId;

/// Dependency edges: item → items that must be computed after it.
pub(crate) type Dependents = HashMap<WorkItemId, Vec<WorkItemId>>;

/// One unit of work in the processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Component {
    pub members: Vec<WorkItemId>,
    pub cyclic: bool,
}

/// Returns the components of `nodes` in topological order.
///
/// Edges to items outside `nodes` are ignored. Output is deterministic for
/// a given input when `nodes` and the adjacency lists are sorted.
pub(crate) fn components(nodes: &[WorkItemId], dependents: &Dependents) -> Vec<Component> {
    let mut tarjan = Tarjan {
        dependents,
        nodes: nodes.iter().copied().collect(),
        index: HashMap::new(),
        lowlink: HashMap::new(),
        on_stack: HashSet::new(),
        stack: Vec::new(),
        next_index: 0,
        components: Vec::new(),
    };

    for &node in nodes {
        if !tarjan.index.contains_key(&node) {
            tarjan.visit(node);
        }
    }

    let mut ordered = tarjan.components;
    ordered.reverse();
    ordered
}

struct Tarjan<'a> {
    dependents: &'a Dependents,
    nodes: HashSet<WorkItemId>,
    index: HashMap<WorkItemId, usize>,
    lowlink: HashMap<WorkItemId, usize>,
    on_stack: HashSet<WorkItemId>,
    stack: Vec<WorkItemId>,
    next_index: usize,
    components: Vec<Component>,
}

impl<'a> Tarjan<'a> {
    fn neighbors(&self, node: WorkItemId) -> &'a [WorkItemId] {
        let dependents: &'a Dependents = self.dependents;
        dependents.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    fn enter(&mut self, node: WorkItemId) {
        self.index.insert(node, self.next_index);
        self.lowlink.insert(node, self.next_index);
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack.insert(node);
    }

    /// Depth-first walk from `root` on an explicit frame stack
    /// `(node, next neighbor position)`, so chain length never touches the
    /// thread stack.
    fn visit(&mut self, root: WorkItemId) {
        self.enter(root);
        let mut frames: Vec<(WorkItemId, usize)> = vec![(root, 0)];

        while let Some(frame) = frames.last_mut() {
            let (node, pos) = *frame;
            let neighbors = self.neighbors(node);

            if let Some(&next) = neighbors.get(pos) {
                frame.1 += 1;
                if !self.nodes.contains(&next) {
                    continue;
                }
                if !self.index.contains_key(&next) {
                    self.enter(next);
                    frames.push((next, 0));
                } else if self.on_stack.contains(&next) {
                    let low = self.lowlink[&node].min(self.index[&next]);
                    self.lowlink.insert(node, low);
                }
                continue;
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                let low = self.lowlink[&parent].min(self.lowlink[&node]);
                self.lowlink.insert(parent, low);
            }
            if self.lowlink[&node] == self.index[&node] {
                self.emit(node, neighbors.contains(&node));
            }
        }
    }

    fn emit(&mut self, root: WorkItemId, self_dependent: bool) {
        let mut members = Vec::new();
        while let Some(member) = self.stack.pop() {
            self.on_stack.remove(&member);
            members.push(member);
            if member == root {
                break;
            }
        }
        members.sort();
        self.components.push(Component {
            cyclic: members.len() > 1 || self_dependent,
            members,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<WorkItemId> {
        raw.iter().map(|&i| WorkItemId(i)).collect()
    }

    fn edges(raw: &[(u64, u64)]) -> Dependents {
        let mut map = Dependents::new();
        for &(from, to) in raw {
            map.entry(WorkItemId(from)).or_default().push(WorkItemId(to));
        }
        map
    }

    fn position(order: &[Component], id: u64) -> usize {
        order
            .iter()
            .position(|c| c.members.contains(&WorkItemId(id)))
            .unwrap()
    }

    #[test]
    fn test_chain_in_topological_order() {
        // 1 → 2 → 3
        let order = components(&ids(&[3, 1, 2]), &edges(&[(1, 2), (2, 3)]));
        assert_eq!(order.len(), 3);
        assert!(order.iter().all(|c| !c.cyclic));
        assert!(position(&order, 1) < position(&order, 2));
        assert!(position(&order, 2) < position(&order, 3));
    }

    #[test]
    fn test_diamond() {
        // 1 → 2 → 4, 1 → 3 → 4
        let order = components(&ids(&[1, 2, 3, 4]), &edges(&[(1, 2), (1, 3), (2, 4), (3, 4)]));
        assert!(position(&order, 1) < position(&order, 2));
        assert!(position(&order, 1) < position(&order, 3));
        assert!(position(&order, 2) < position(&order, 4));
        assert!(position(&order, 3) < position(&order, 4));
    }

    #[test]
    fn test_three_cycle_with_tail() {
        // 1 → 2 → 3 → 1, 3 → 4
        let order = components(
            &ids(&[1, 2, 3, 4]),
            &edges(&[(1, 2), (2, 3), (3, 1), (3, 4)]),
        );
        assert_eq!(order.len(), 2);
        assert!(order[0].cyclic);
        assert_eq!(order[0].members, ids(&[1, 2, 3]));
        assert!(!order[1].cyclic);
        assert_eq!(order[1].members, ids(&[4]));
    }

    #[test]
    fn test_self_dependency_is_cyclic() {
        let order = components(&ids(&[1]), &edges(&[(1, 1)]));
        assert_eq!(order.len(), 1);
        assert!(order[0].cyclic);
    }

    #[test]
    fn test_edges_outside_nodes_ignored() {
        let order = components(&ids(&[1, 2]), &edges(&[(1, 9), (9, 1), (1, 2)]));
        assert_eq!(order.len(), 2);
        assert!(order.iter().all(|c| !c.cyclic));
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        // 1 → 2 → ... → 20_000
        let n = 20_000u64;
        let nodes: Vec<WorkItemId> = (1..=n).map(WorkItemId).collect();
        let deps: Dependents = (1..n).map(|i| (WorkItemId(i), vec![WorkItemId(i + 1)])).collect();

        let order = components(&nodes, &deps);
        assert_eq!(order.len(), n as usize);
        assert!(order.iter().all(|c| !c.cyclic));
        assert_eq!(order[0].members, ids(&[1]));
        assert_eq!(order[n as usize - 1].members, ids(&[n]));
    }

    #[test]
    fn test_long_cycle_is_one_component() {
        let n = 20_000u64;
        let nodes: Vec<WorkItemId> = (1..=n).map(WorkItemId).collect();
        let deps: Dependents = (1..=n)
            .map(|i| (WorkItemId(i), vec![WorkItemId(i % n + 1)]))
            .collect();

        let order = components(&nodes, &deps);
        assert_eq!(order.len(), 1);
        assert!(order[0].cyclic);
        assert_eq!(order[0].members.len(), n as usize);
    }
}
