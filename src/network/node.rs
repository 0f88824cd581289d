use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub const DEFAULT_NODE_COLOR: &str = "#00bcd4";

/// Identifier of a user in the graph. Serialized as a plain string so exported
/// files stay readable by other graph tools.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the id if it was produced by the id counter.
    pub fn as_number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId(value.to_string())
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        NodeId(value.to_string())
    }
}

/// A simulated user. Color is display-only and kept as the `#rrggbb` string the
/// user picked, the canvas parses it when drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub color: String,
    pub profile: String,
}

impl Node {
    pub fn new(
        id: NodeId,
        label: impl Into<String>,
        color: impl Into<String>,
        profile: impl Into<String>,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            color: color.into(),
            profile: profile.into(),
        }
    }

    /// Default record for a freshly added user, e.g. `User 5` / `Profile of User 5`.
    pub fn user(id: NodeId, color: impl Into<String>) -> Self {
        let label = format!("User {}", id);
        let profile = format!("Profile of {}", label);
        Self::new(id, label, color, profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_defaults() {
        let node = Node::user(NodeId::from(7), DEFAULT_NODE_COLOR);
        assert_eq!(node.id.as_str(), "7");
        assert_eq!(node.label, "User 7");
        assert_eq!(node.profile, "Profile of User 7");
        assert_eq!(node.color, "#00bcd4");
    }

    #[test]
    fn test_node_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&NodeId::from("42")).unwrap();
        assert_eq!(json, "\"42\"");
        assert_eq!(NodeId::from("42").as_number(), Some(42));
        assert_eq!(NodeId::from("alice").as_number(), None);
    }
}
