/*!
Authoritative graph state.

This module defines:
- `GraphModel`: owner and only mutator of the user and connection collections.
- `Snapshot`: an owned copy of both collections, handed to the canvas, the path finder and the exporters.
- `ModelError`: errors returned by rejected mutations. A failed call leaves the model untouched.
*/

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::{
    edge::{DEFAULT_EDGE_WEIGHT, Edge, UndirectedEdgeKey},
    node::{Node, NodeId},
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Node {0} does not exist")]
    InvalidReference(NodeId),
    #[error("Edge weight must be a positive number, got {0}")]
    InvalidWeight(f64),
    #[error("Node {0} is defined more than once")]
    DuplicateNode(NodeId),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Point-in-time copy of the graph. Nodes are in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Snapshot {
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// Number of edge endpoints at `id`. A self-loop counts twice.
    pub fn degree(&self, id: &NodeId) -> usize {
        self.edges
            .iter()
            .map(|edge| (&edge.source == id) as usize + (&edge.target == id) as usize)
            .sum()
    }
}

#[derive(Debug, Default)]
pub struct GraphModel {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    ids: HashSet<NodeId>,
    next_id: u64,
}

impl GraphModel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Four users connected in a cycle, the graph the simulator starts with.
    pub fn with_sample_graph(color: &str) -> Self {
        let mut model = Self::new();
        let ids: Vec<NodeId> = (0..4).map(|_| model.add_user(color).id).collect();
        for (i, source) in ids.iter().enumerate() {
            let target = &ids[(i + 1) % ids.len()];
            model
                .edges
                .push(Edge::new(source.clone(), target.clone(), DEFAULT_EDGE_WEIGHT));
        }
        model
    }

    /// Rebuild a model from an imported snapshot. Ids, edge endpoints and weights
    /// are validated; the id counter resumes above the largest numeric id.
    pub fn from_snapshot(snapshot: Snapshot) -> ModelResult<Self> {
        let mut model = Self::new();
        for node in snapshot.nodes {
            if !model.ids.insert(node.id.clone()) {
                return Err(ModelError::DuplicateNode(node.id));
            }
            if let Some(n) = node.id.as_number() {
                model.next_id = model.next_id.max(n.saturating_add(1));
            }
            model.nodes.push(node);
        }
        for edge in snapshot.edges {
            model.validate_edge(&edge.source, &edge.target, edge.weight)?;
            model.edges.push(edge);
        }
        Ok(model)
    }

    fn fresh_id(&mut self) -> NodeId {
        while let Some(after) = self.next_id.checked_add(1) {
            let id = NodeId::from(self.next_id);
            self.next_id = after;
            if !self.ids.contains(&id) {
                return id;
            }
        }
        // Counter exhausted by an imported id near u64::MAX: take the lowest free number
        let mut n: u64 = 1;
        loop {
            let id = NodeId::from(n);
            if !self.ids.contains(&id) {
                return id;
            }
            n = n.wrapping_add(1);
        }
    }

    pub fn add_node(
        &mut self,
        label: impl Into<String>,
        color: impl Into<String>,
        profile: impl Into<String>,
    ) -> Node {
        let id = self.fresh_id();
        self.insert(Node::new(id, label, color, profile))
    }

    /// Add a user with the default `User N` label and profile.
    pub fn add_user(&mut self, color: &str) -> Node {
        let id = self.fresh_id();
        self.insert(Node::user(id, color))
    }

    fn insert(&mut self, node: Node) -> Node {
        self.ids.insert(node.id.clone());
        self.nodes.push(node.clone());
        node
    }

    fn validate_edge(&self, source: &NodeId, target: &NodeId, weight: f64) -> ModelResult<()> {
        for endpoint in [source, target] {
            if !self.ids.contains(endpoint) {
                return Err(ModelError::InvalidReference(endpoint.clone()));
            }
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(ModelError::InvalidWeight(weight));
        }
        Ok(())
    }

    /// Connect two existing users. Self-loops are accepted here, only the random
    /// generator refuses them.
    pub fn add_edge(&mut self, source: &NodeId, target: &NodeId, weight: f64) -> ModelResult<Edge> {
        self.validate_edge(source, target, weight)?;
        let edge = Edge::new(source.clone(), target.clone(), weight);
        self.edges.push(edge.clone());
        Ok(edge)
    }

    pub fn add_edge_default(&mut self, source: &NodeId, target: &NodeId) -> ModelResult<Edge> {
        self.add_edge(source, target, DEFAULT_EDGE_WEIGHT)
    }

    /// Connect two distinct users picked uniformly at random.
    /// Returns `None` when there are fewer than two users.
    pub fn add_random_edge<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ModelResult<Option<Edge>> {
        let count = self.nodes.len();
        if count < 2 {
            return Ok(None);
        }
        let source = rng.random_range(0..count);
        // Draw from the remaining count - 1 slots and skip over the source
        let mut target = rng.random_range(0..count - 1);
        if target >= source {
            target += 1;
        }
        let source = self.nodes[source].id.clone();
        let target = self.nodes[target].id.clone();
        self.add_edge_default(&source, &target).map(Some)
    }

    /// Remove the given users and every connection touching them.
    /// Unknown ids are ignored. Returns how many users were removed.
    pub fn remove_nodes<'a, I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a NodeId>,
    {
        let doomed: HashSet<&NodeId> = ids
            .into_iter()
            .filter(|id| self.ids.contains(*id))
            .collect();
        if doomed.is_empty() {
            return 0;
        }
        self.nodes.retain(|node| !doomed.contains(&node.id));
        self.edges
            .retain(|edge| !doomed.contains(&edge.source) && !doomed.contains(&edge.target));
        for id in &doomed {
            self.ids.remove(*id);
        }
        doomed.len()
    }

    /// Remove connections by endpoint pair. Pairs are unordered: `(a, b)` also
    /// removes `b-a`, and every parallel edge between the pair goes.
    /// Returns how many edges were removed.
    pub fn remove_edges<I, K>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: Into<UndirectedEdgeKey>,
    {
        let keys: HashSet<UndirectedEdgeKey> = pairs.into_iter().map(Into::into).collect();
        let before = self.edges.len();
        self.edges.retain(|edge| !keys.contains(&edge.key()));
        before - self.edges.len()
    }

    pub fn set_node_label(&mut self, id: &NodeId, label: impl Into<String>) -> ModelResult<()> {
        self.node_mut(id)?.label = label.into();
        Ok(())
    }

    pub fn set_node_color(&mut self, id: &NodeId, color: impl Into<String>) -> ModelResult<()> {
        self.node_mut(id)?.color = color.into();
        Ok(())
    }

    fn node_mut(&mut self, id: &NodeId) -> ModelResult<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|node| &node.id == id)
            .ok_or_else(|| ModelError::InvalidReference(id.clone()))
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.ids.contains(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }
}
