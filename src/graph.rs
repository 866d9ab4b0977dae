//! Conversion graph and least-cost path search.
//!
//! Edges are registered [`ConversionInfo`] records, kept in three separate
//! adjacency maps (type, model, format) so paths never cross kinds. Search is
//! Dijkstra over non-negative costs with a total order on candidates:
//! lower accumulated cost first, then fewer edges, then the sequence of edge
//! ids compared lexicographically. Ids grow with registration order, so the
//! earliest-registered edge wins every remaining tie.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::Arc;

use crate::registry::{ConversionInfo, Id, Kind};

#[derive(Debug, Default)]
pub struct ConversionGraph {
    adjacency: [HashMap<Id, Vec<Arc<ConversionInfo>>>; 3],
    edges: usize,
}

fn graph_slot(kind: Kind) -> Option<usize> {
    match kind {
        Kind::Type => Some(0),
        Kind::Model => Some(1),
        Kind::Format => Some(2),
        Kind::Component | Kind::Conversion => None,
    }
}

/// A resolved sequence of edges.
#[derive(Debug, Clone, Default)]
pub struct Path {
    pub edges: Vec<Arc<ConversionInfo>>,
    pub cost: f64,
}

impl Path {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.edges.iter().map(|e| e.id)
    }
}

/// Search frontier entry.
struct Candidate {
    node: Id,
    cost: f64,
    edges: Vec<Arc<ConversionInfo>>,
}

impl Candidate {
    /// Ascending preference order: the smaller candidate is the better one.
    fn preference(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.edges.len().cmp(&other.edges.len()))
            .then_with(|| {
                self.edges
                    .iter()
                    .map(|e| e.id)
                    .cmp(other.edges.iter().map(|e| e.id))
            })
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.preference(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Reversed: BinaryHeap is a max-heap and we pop the preferred candidate
    fn cmp(&self, other: &Self) -> Ordering {
        other.preference(self)
    }
}

impl ConversionGraph {
    pub(crate) fn add(&mut self, edge: Arc<ConversionInfo>) {
        let Some(slot) = graph_slot(edge.kind) else {
            debug_assert!(false, "conversion of kind {} has no graph", edge.kind);
            return;
        };
        self.adjacency[slot]
            .entry(edge.source)
            .or_default()
            .push(edge);
        self.edges += 1;
    }

    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Outgoing edges of `node` in registration order.
    pub fn outgoing(&self, kind: Kind, node: Id) -> &[Arc<ConversionInfo>] {
        graph_slot(kind)
            .and_then(|slot| self.adjacency[slot].get(&node))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Least-cost path from `from` to `to` within one kind's graph.
    ///
    /// Returns an empty path when `from == to`, `None` when unreachable.
    pub fn shortest_path(&self, kind: Kind, from: Id, to: Id) -> Option<Path> {
        let mut open_set = BinaryHeap::new();
        let mut settled = HashSet::new();

        open_set.push(Candidate {
            node: from,
            cost: 0.0,
            edges: Vec::new(),
        });

        while let Some(current) = open_set.pop() {
            // First pop of a node carries its best label
            if !settled.insert(current.node) {
                continue;
            }
            if current.node == to {
                return Some(Path {
                    edges: current.edges,
                    cost: current.cost,
                });
            }

            for edge in self.outgoing(kind, current.node) {
                if settled.contains(&edge.destination) {
                    continue;
                }
                let mut edges = current.edges.clone();
                edges.push(edge.clone());
                open_set.push(Candidate {
                    node: edge.destination,
                    cost: current.cost + edge.cost,
                    edges,
                });
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::ConversionFn;

    struct Builder {
        graph: ConversionGraph,
        next: u32,
    }

    impl Builder {
        fn new() -> Self {
            Self {
                graph: ConversionGraph::default(),
                next: 100,
            }
        }

        fn edge(&mut self, from: u32, to: u32, cost: f64) -> Id {
            let id = Id::new(self.next, 1);
            self.next += 1;
            self.graph.add(Arc::new(ConversionInfo {
                id,
                name: format!("{from}->{to}"),
                kind: Kind::Model,
                source: Id::new(from, 1),
                destination: Id::new(to, 1),
                cost,
                func: ConversionFn::linear(|_, _, _| {}),
            }));
            id
        }

        fn path(&self, from: u32, to: u32) -> Option<Vec<Id>> {
            self.graph
                .shortest_path(Kind::Model, Id::new(from, 1), Id::new(to, 1))
                .map(|p| p.ids().collect())
        }
    }

    #[test]
    fn test_same_node_is_empty_path() {
        let b = Builder::new();
        assert_eq!(b.path(1, 1), Some(vec![]));
    }

    #[test]
    fn test_unreachable() {
        let mut b = Builder::new();
        b.edge(1, 2, 1.0);
        assert_eq!(b.path(2, 1), None);
        assert_eq!(b.path(1, 3), None);
    }

    #[test]
    fn test_prefers_cheaper_longer_path() {
        let mut b = Builder::new();
        b.edge(1, 3, 10.0);
        let x = b.edge(1, 2, 1.0);
        let y = b.edge(2, 3, 1.0);
        assert_eq!(b.path(1, 3), Some(vec![x, y]));
    }

    #[test]
    fn test_equal_cost_prefers_fewer_edges() {
        let mut b = Builder::new();
        let a = b.edge(1, 2, 1.0);
        let c = b.edge(2, 3, 1.0);
        let direct = b.edge(1, 3, 2.0);
        assert_eq!(b.path(1, 3), Some(vec![direct]));
        assert_ne!(b.path(1, 3), Some(vec![a, c]));
    }

    #[test]
    fn test_equal_cost_parallel_edges_pick_first_registered() {
        let mut b = Builder::new();
        let first = b.edge(1, 2, 1.0);
        let _second = b.edge(1, 2, 1.0);
        for _ in 0..10 {
            assert_eq!(b.path(1, 2), Some(vec![first]));
        }
    }

    #[test]
    fn test_tie_break_on_intermediate_edges() {
        let mut b = Builder::new();
        // Two equal two-hop routes; the one whose first edge registered
        // earlier wins.
        let early = b.edge(1, 2, 1.0);
        let _late = b.edge(1, 4, 1.0);
        let _tail_late = b.edge(4, 3, 1.0);
        let tail_early = b.edge(2, 3, 1.0);
        assert_eq!(b.path(1, 3), Some(vec![early, tail_early]));
    }

    #[test]
    fn test_cycle_terminates() {
        let mut b = Builder::new();
        b.edge(1, 2, 0.0);
        b.edge(2, 1, 0.0);
        let c = b.edge(2, 3, 0.0);
        let path = b.path(1, 3).unwrap();
        assert_eq!(path.last(), Some(&c));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_path_cost_is_sum() {
        let mut b = Builder::new();
        b.edge(1, 2, 0.5);
        b.edge(2, 3, 0.25);
        let p = b
            .graph
            .shortest_path(Kind::Model, Id::new(1, 1), Id::new(3, 1))
            .unwrap();
        assert_eq!(p.cost, 0.75);
    }
}
