use std::collections::{HashMap, HashSet};

use eframe::egui::Color32;
use egui::Pos2;
use egui_graphs::Graph;
use petgraph::{Undirected, graph::DefaultIx, graph::NodeIndex, prelude::StableGraph};
use rand::Rng;
use tracing::debug;

use crate::{
    gui::node_shape::UserNodeShape,
    network::{
        edge::{Edge, UndirectedEdgeKey},
        model::Snapshot,
        node::{DEFAULT_NODE_COLOR, NodeId},
    },
};

pub type CanvasGraph = Graph<NodeId, Edge, Undirected, DefaultIx, UserNodeShape>;

/// Parse a `#rrggbb` color, falling back to the default user color.
pub fn parse_color(color: &str) -> Color32 {
    Color32::from_hex(color.trim())
        .or_else(|_| Color32::from_hex(DEFAULT_NODE_COLOR))
        .unwrap_or(Color32::LIGHT_BLUE)
}

pub fn color_to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

/// The canvas-side mirror of a `GraphModel` snapshot.
///
/// Node payloads are only the `NodeId`; everything else is read from the model.
/// node_id_to_index_map maps user ids to canvas indices so positions survive reconciles.
pub struct NetworkGraph {
    pub graph: CanvasGraph,
    pub node_id_to_index_map: HashMap<NodeId, NodeIndex>,
}

impl Default for NetworkGraph {
    fn default() -> Self {
        let graph: StableGraph<NodeId, Edge, Undirected> = StableGraph::default();
        Self {
            graph: egui_graphs::to_graph(&graph),
            node_id_to_index_map: HashMap::new(),
        }
    }
}

impl NetworkGraph {
    pub fn build_new(snapshot: &Snapshot) -> Self {
        let mut graph = Self::default();
        graph.reconcile(snapshot);
        graph
    }

    // Reconcile the canvas in place to match the snapshot (by NodeId).
    // - Keeps positions of surviving users, refreshes label/color
    // - Adds new users at a random position
    // - Removes vanished users
    // - Rebuilds all edges
    pub fn reconcile(&mut self, snapshot: &Snapshot) {
        let mut rng = rand::rng();

        let desired: HashSet<&NodeId> = snapshot.nodes.iter().map(|node| &node.id).collect();

        let to_remove: Vec<NodeId> = self
            .node_id_to_index_map
            .keys()
            .filter(|id| !desired.contains(id))
            .cloned()
            .collect();
        for id in &to_remove {
            if let Some(idx) = self.node_id_to_index_map.remove(id) {
                // Incident edges go with the node
                let _ = self.graph.remove_node(idx);
            }
        }

        let mut added = 0;
        for node in &snapshot.nodes {
            let idx = match self.node_id_to_index_map.get(&node.id) {
                Some(&idx) => idx,
                None => {
                    let idx = self.graph.add_node(node.id.clone());
                    if let Some(n) = self.graph.node_mut(idx) {
                        let pos = Pos2::new(rng.random_range(50.0..500.0), rng.random_range(50.0..500.0));
                        n.set_location(pos);
                    }
                    self.node_id_to_index_map.insert(node.id.clone(), idx);
                    added += 1;
                    idx
                }
            };
            if let Some(n) = self.graph.node_mut(idx) {
                n.set_label(node.label.clone());
                n.set_color(parse_color(&node.color));
            }
        }

        self.clear_all_edges();
        for edge in &snapshot.edges {
            if let (Some(&a), Some(&b)) = (
                self.node_id_to_index_map.get(&edge.source),
                self.node_id_to_index_map.get(&edge.target),
            ) {
                let label = edge.label.clone().unwrap_or_default();
                let ei = self.graph.add_edge(a, b, edge.clone());
                if let Some(e) = self.graph.edge_mut(ei) {
                    e.set_label(label);
                }
            }
        }

        debug!(
            "Canvas reconciled: {} added, {} removed, {} edges",
            added,
            to_remove.len(),
            snapshot.edges.len()
        );
    }

    // Helper: remove all edges from the graph.
    fn clear_all_edges(&mut self) {
        let edge_indices: Vec<_> = self.graph.edges_iter().map(|(ei, _)| ei).collect();
        for ei in edge_indices {
            let _ = self.graph.remove_edge(ei);
        }
    }

    /// Move users to precomputed positions. Users missing from `positions` stay put.
    pub fn apply_positions(&mut self, positions: &HashMap<NodeId, Pos2>) {
        for (id, pos) in positions {
            if let Some(&idx) = self.node_id_to_index_map.get(id)
                && let Some(node) = self.graph.node_mut(idx)
            {
                node.set_location(*pos);
            }
        }
    }

    pub fn id_of(&self, idx: NodeIndex) -> Option<&NodeId> {
        self.graph.node(idx).map(|node| node.payload())
    }

    /// Selected users in selection order.
    pub fn selected_node_ids(&self) -> Vec<NodeId> {
        self.graph
            .selected_nodes()
            .iter()
            .filter_map(|&idx| self.id_of(idx).cloned())
            .collect()
    }

    pub fn selected_edge_keys(&self) -> Vec<UndirectedEdgeKey> {
        self.graph
            .selected_edges()
            .iter()
            .filter_map(|&ei| self.graph.edge(ei))
            .map(|edge| edge.payload().key())
            .collect()
    }
}

#[cfg(test)]
impl NetworkGraph {
    pub fn node_count(&self) -> usize {
        self.node_id_to_index_map.len()
    }

    pub fn location_of(&self, id: &NodeId) -> Option<Pos2> {
        let idx = self.node_id_to_index_map.get(id)?;
        self.graph.node(*idx).map(|node| node.location())
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edges_iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::model::GraphModel;

    #[test]
    fn test_reconcile_tracks_model() {
        let mut model = GraphModel::with_sample_graph(DEFAULT_NODE_COLOR);
        let mut canvas = NetworkGraph::build_new(&model.snapshot());
        assert_eq!(canvas.node_count(), 4);
        assert_eq!(canvas.edge_count(), 4);

        let kept = canvas.location_of(&"1".into()).unwrap();
        model.remove_nodes([&NodeId::from("2")]);
        let eve = model.add_node("Eve", "#ff0000", "").id;
        model.set_node_label(&"1".into(), "Alice").unwrap();
        canvas.reconcile(&model.snapshot());

        assert_eq!(canvas.node_count(), 4);
        assert_eq!(canvas.edge_count(), 2);
        assert!(canvas.location_of(&"2".into()).is_none());
        assert!(canvas.location_of(&eve).is_some());
        // Survivors keep their place
        assert_eq!(canvas.location_of(&"1".into()), Some(kept));

        let idx = canvas.node_id_to_index_map[&NodeId::from("1")];
        assert_eq!(canvas.graph.node(idx).unwrap().label(), "Alice");
    }

    #[test]
    fn test_apply_positions() {
        let model = GraphModel::with_sample_graph(DEFAULT_NODE_COLOR);
        let mut canvas = NetworkGraph::build_new(&model.snapshot());
        let positions = HashMap::from([(NodeId::from("3"), Pos2::new(1.0, 2.0))]);
        canvas.apply_positions(&positions);
        assert_eq!(canvas.location_of(&"3".into()), Some(Pos2::new(1.0, 2.0)));
    }

    #[test]
    fn test_parse_color_falls_back() {
        assert_eq!(parse_color("#ff0000"), Color32::from_rgb(255, 0, 0));
        assert_eq!(parse_color("not a color"), Color32::from_rgb(0x00, 0xbc, 0xd4));
        assert_eq!(color_to_hex(parse_color("#FFCC00")), "#ffcc00");
    }
}
