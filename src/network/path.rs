/*!
Shortest paths over a graph snapshot.

`PathFinder` copies a `Snapshot` into an undirected petgraph graph and runs Dijkstra on it.
Parallel edges are all kept; relaxation naturally takes the cheapest one.
Among equally cheap routes the predecessor with the lexicographically smallest id wins,
so results are reproducible.
*/

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap},
    fmt::Display,
};

use petgraph::{
    graph::{NodeIndex, UnGraph},
    visit::EdgeRef,
};
use thiserror::Error;

use crate::network::{model::Snapshot, node::NodeId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("Please select exactly two users to find the shortest path ({0})")]
    InvalidSelection(String),
    #[error("No path exists between {from} and {to}")]
    NoPathFound { from: NodeId, to: NodeId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    pub nodes: Vec<NodeId>,
    pub total_weight: f64,
}

impl ShortestPath {
    /// Number of hops.
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn source(&self) -> Option<&NodeId> {
        self.nodes.first()
    }

    pub fn target(&self) -> Option<&NodeId> {
        self.nodes.last()
    }
}

impl Display for ShortestPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hops: Vec<&str> = self.nodes.iter().map(NodeId::as_str).collect();
        write!(f, "{}", hops.join(" -> "))
    }
}

/// Heap entry; ordering is reversed so `BinaryHeap` pops the cheapest first.
#[derive(Debug)]
struct Frontier<'a> {
    cost: f64,
    id: &'a NodeId,
    index: NodeIndex,
}

impl PartialEq for Frontier<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier<'_> {}

impl PartialOrd for Frontier<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.id.cmp(self.id))
    }
}

pub struct PathFinder {
    graph: UnGraph<NodeId, f64>,
    indices: HashMap<NodeId, NodeIndex>,
}

impl PathFinder {
    pub fn new(snapshot: &Snapshot) -> Self {
        let mut graph = UnGraph::with_capacity(snapshot.nodes.len(), snapshot.edges.len());
        let mut indices = HashMap::with_capacity(snapshot.nodes.len());
        for node in &snapshot.nodes {
            let index = graph.add_node(node.id.clone());
            indices.insert(node.id.clone(), index);
        }
        for edge in snapshot.edges.iter().filter(|edge| !edge.is_self_loop()) {
            // Dangling edges cannot come out of a GraphModel, skip them if a hand-built snapshot has them
            if let (Some(&a), Some(&b)) = (indices.get(&edge.source), indices.get(&edge.target)) {
                graph.add_edge(a, b, edge.weight);
            }
        }
        Self { graph, indices }
    }

    fn index_of(&self, id: &NodeId) -> Result<NodeIndex, PathError> {
        self.indices
            .get(id)
            .copied()
            .ok_or_else(|| PathError::InvalidSelection(format!("user {} does not exist", id)))
    }

    pub fn shortest_path(&self, source: &NodeId, target: &NodeId) -> Result<ShortestPath, PathError> {
        if source == target {
            return Err(PathError::InvalidSelection(format!(
                "{} was selected twice",
                source
            )));
        }
        let start = self.index_of(source)?;
        let goal = self.index_of(target)?;

        let mut dist: HashMap<NodeIndex, f64> = HashMap::new();
        let mut prev: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut heap = BinaryHeap::new();
        dist.insert(start, 0.0);
        heap.push(Frontier {
            cost: 0.0,
            id: &self.graph[start],
            index: start,
        });

        while let Some(Frontier { cost, index, .. }) = heap.pop() {
            if dist.get(&index).is_some_and(|&best| cost > best) {
                continue;
            }
            if index == goal {
                break;
            }
            for edge in self.graph.edges(index) {
                let next = if edge.source() == index {
                    edge.target()
                } else {
                    edge.source()
                };
                let candidate = cost + *edge.weight();
                match dist.get(&next) {
                    Some(&known) if candidate > known => {}
                    Some(&known) if candidate == known => {
                        // Equal cost: keep the smaller predecessor id
                        let better = prev
                            .get(&next)
                            .is_some_and(|&p| self.graph[index] < self.graph[p]);
                        if better {
                            prev.insert(next, index);
                        }
                    }
                    _ => {
                        dist.insert(next, candidate);
                        prev.insert(next, index);
                        heap.push(Frontier {
                            cost: candidate,
                            id: &self.graph[next],
                            index: next,
                        });
                    }
                }
            }
        }

        let Some(&total_weight) = dist.get(&goal) else {
            return Err(PathError::NoPathFound {
                from: source.clone(),
                to: target.clone(),
            });
        };

        let mut nodes = vec![self.graph[goal].clone()];
        let mut cursor = goal;
        while let Some(&p) = prev.get(&cursor) {
            nodes.push(self.graph[p].clone());
            cursor = p;
        }
        nodes.reverse();

        Ok(ShortestPath {
            nodes,
            total_weight,
        })
    }
}

pub fn shortest_path(
    snapshot: &Snapshot,
    source: &NodeId,
    target: &NodeId,
) -> Result<ShortestPath, PathError> {
    PathFinder::new(snapshot).shortest_path(source, target)
}

/// Entry point for the canvas: the first selected user is the source.
pub fn shortest_path_for_selection(
    snapshot: &Snapshot,
    selected: &[NodeId],
) -> Result<ShortestPath, PathError> {
    match selected {
        [source, target] => shortest_path(snapshot, source, target),
        _ => Err(PathError::InvalidSelection(format!(
            "{} selected",
            selected.len()
        ))),
    }
}
