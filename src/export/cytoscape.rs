use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::{
    export::ExportResult,
    network::{edge::Edge, model::Snapshot, node::Node},
};

/// One canvas element as the cytoscape JSON format writes it. Edges are
/// recognized by their `source` field, nodes by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Element {
    Edge { data: Edge },
    Node { data: Node },
}

pub fn to_elements(snapshot: &Snapshot) -> Vec<Element> {
    let nodes = snapshot
        .nodes
        .iter()
        .cloned()
        .map(|data| Element::Node { data });
    let edges = snapshot
        .edges
        .iter()
        .cloned()
        .map(|data| Element::Edge { data });
    nodes.chain(edges).collect()
}

pub fn from_elements(elements: Vec<Element>) -> Snapshot {
    let mut snapshot = Snapshot::default();
    for element in elements {
        match element {
            Element::Node { data } => snapshot.nodes.push(data),
            Element::Edge { data } => snapshot.edges.push(data),
        }
    }
    snapshot
}

pub fn write<W: Write>(snapshot: &Snapshot, writer: W) -> ExportResult<()> {
    serde_json::to_writer_pretty(writer, &to_elements(snapshot))?;
    Ok(())
}

pub fn read<R: Read>(reader: R) -> ExportResult<Snapshot> {
    let elements: Vec<Element> = serde_json::from_reader(reader)?;
    Ok(from_elements(elements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{model::GraphModel, node::NodeId};

    #[test]
    fn test_read_fixture() {
        let json = include_str!("../../test_data/sample_graph.json");
        let snapshot = read(json.as_bytes()).unwrap();

        assert_eq!(snapshot.nodes.len(), 4);
        assert_eq!(snapshot.edges.len(), 4);
        assert_eq!(snapshot.nodes[0].label, "User 1");
        assert_eq!(snapshot.nodes[3].profile, "Profile of User 4");
        assert_eq!(snapshot.edges[3].source, NodeId::from("4"));
        assert_eq!(snapshot.edges[3].target, NodeId::from("1"));
        // Fixture edge 2-3 carries no weight
        assert_eq!(snapshot.edges[1].weight, 1.0);
        assert_eq!(snapshot.edges[2].label.as_deref(), Some("best friends"));
    }

    #[test]
    fn test_written_shape() {
        let model = GraphModel::with_sample_graph("#00bcd4");
        let mut buffer = Vec::new();
        write(&model.snapshot(), &mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        let elements = value.as_array().unwrap();
        assert_eq!(elements.len(), 8);
        assert_eq!(
            elements[0],
            serde_json::json!({"data": {"id": "1", "label": "User 1", "color": "#00bcd4", "profile": "Profile of User 1"}})
        );
        assert_eq!(
            elements[4],
            serde_json::json!({"data": {"source": "1", "target": "2", "weight": 1.0}})
        );
    }

    #[test]
    fn test_round_trip_preserves_graph() {
        let json = include_str!("../../test_data/sample_graph.json");
        let snapshot = read(json.as_bytes()).unwrap();
        let mut buffer = Vec::new();
        write(&snapshot, &mut buffer).unwrap();
        assert_eq!(read(buffer.as_slice()).unwrap(), snapshot);
    }
}
