use std::io::Write;

use crate::{export::ExportResult, network::model::Snapshot};

pub const HEADER: [&str; 3] = ["Source", "Target", "Label"];

/// One row per edge. Users without connections do not appear.
pub fn write<W: Write>(snapshot: &Snapshot, writer: W) -> ExportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for edge in &snapshot.edges {
        wtr.write_record([
            edge.source.as_str(),
            edge.target.as_str(),
            edge.label.as_deref().unwrap_or(""),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::cytoscape;

    #[test]
    fn test_rows_per_edge() {
        let json = include_str!("../../test_data/sample_graph.json");
        let snapshot = cytoscape::read(json.as_bytes()).unwrap();

        let mut buffer = Vec::new();
        write(&snapshot, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "Source,Target,Label",
                "1,2,",
                "2,3,",
                "3,4,best friends",
                "4,1,",
            ]
        );
    }

    #[test]
    fn test_labels_are_quoted_when_needed() {
        let mut snapshot = Snapshot::default();
        let mut edge = crate::network::edge::Edge::new("a".into(), "b".into(), 1.0);
        edge.label = Some("met at work, 2019".to_string());
        snapshot.edges.push(edge);

        let mut buffer = Vec::new();
        write(&snapshot, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "Source,Target,Label\na,b,\"met at work, 2019\"\n");
    }
}
