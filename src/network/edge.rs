use serde::{Deserialize, Serialize};

use crate::network::node::NodeId;

pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// A connection between two users. Stored with the endpoints in the order they
/// were given, but treated as undirected everywhere it matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

fn default_weight() -> f64 {
    DEFAULT_EDGE_WEIGHT
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId, weight: f64) -> Self {
        Edge {
            source,
            target,
            weight,
            label: None,
        }
    }

    pub fn key(&self) -> UndirectedEdgeKey {
        UndirectedEdgeKey::new(self.source.clone(), self.target.clone())
    }

    pub fn touches(&self, id: &NodeId) -> bool {
        &self.source == id || &self.target == id
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Endpoint pair with `a <= b`, so `(x, y)` and `(y, x)` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UndirectedEdgeKey {
    pub a: NodeId,
    pub b: NodeId,
}

impl UndirectedEdgeKey {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        UndirectedEdgeKey { a, b }
    }
}

impl From<(NodeId, NodeId)> for UndirectedEdgeKey {
    fn from((a, b): (NodeId, NodeId)) -> Self {
        UndirectedEdgeKey::new(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ignores_direction() {
        let forward = Edge::new("1".into(), "2".into(), 1.0);
        let backward = Edge::new("2".into(), "1".into(), 3.0);
        assert_eq!(forward.key(), backward.key());
        assert_eq!(forward.key().a, NodeId::from("1"));
        assert_eq!(forward.key().b, NodeId::from("2"));
    }

    #[test]
    fn test_missing_weight_defaults_to_one() {
        let edge: Edge = serde_json::from_str(r#"{"source": "1", "target": "2"}"#).unwrap();
        assert_eq!(edge.weight, 1.0);
        assert!(edge.label.is_none());
        assert!(edge.touches(&"2".into()));
        assert!(!edge.is_self_loop());
    }
}
