/*!
Export and import of the graph.

Structure:
- `cytoscape`: JSON array of `{"data": {...}}` elements, readable back into a `GraphModel`.
- `edge_list`: CSV with a `Source,Target,Label` header, one row per edge. Export only.

`ExportFormat::from_path` picks the format from the file extension chosen in the save dialog.
*/

pub mod cytoscape;
pub mod edge_list;

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use thiserror::Error;
use tracing::info;

use crate::network::model::{GraphModel, ModelError, Snapshot};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid graph: {0}")]
    Model(#[from] ModelError),
    #[error("Unsupported file type: {0} (expected .json or .csv)")]
    UnsupportedFormat(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> ExportResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(ExportFormat::Json),
            Some("csv") => Ok(ExportFormat::Csv),
            _ => Err(ExportError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Serialize the snapshot in the given format.
pub fn write_snapshot<W: Write>(snapshot: &Snapshot, format: ExportFormat, writer: W) -> ExportResult<()> {
    match format {
        ExportFormat::Json => cytoscape::write(snapshot, writer),
        ExportFormat::Csv => edge_list::write(snapshot, writer),
    }
}

pub fn export_to_file(snapshot: &Snapshot, path: &Path) -> ExportResult<ExportFormat> {
    let format = ExportFormat::from_path(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    write_snapshot(snapshot, format, &mut writer)?;
    writer.flush()?;
    info!(
        "Exported {} users and {} connections to {}",
        snapshot.nodes.len(),
        snapshot.edges.len(),
        path.display()
    );
    Ok(format)
}

/// Read a JSON export back into a fresh model.
pub fn import_from_file(path: &Path) -> ExportResult<GraphModel> {
    let reader = BufReader::new(File::open(path)?);
    let snapshot = cytoscape::read(reader)?;
    let model = GraphModel::from_snapshot(snapshot)?;
    info!(
        "Imported {} users and {} connections from {}",
        model.node_count(),
        model.edge_count(),
        path.display()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::node::DEFAULT_NODE_COLOR;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("graph.json")).unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out/GRAPH.CSV")).unwrap(), ExportFormat::Csv);
        assert!(matches!(
            ExportFormat::from_path(Path::new("graph.png")),
            Err(ExportError::UnsupportedFormat(_))
        ));
        assert!(ExportFormat::from_path(Path::new("graph")).is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let mut model = GraphModel::with_sample_graph(DEFAULT_NODE_COLOR);
        let a = model.add_node("Alice", "#ff00ff", "Likes graphs").id;
        model.add_edge(&a, &"1".into(), 2.5).unwrap();
        let snapshot = model.snapshot();

        assert_eq!(export_to_file(&snapshot, &path).unwrap(), ExportFormat::Json);
        let imported = import_from_file(&path).unwrap();
        assert_eq!(imported.snapshot(), snapshot);
    }

    #[test]
    fn test_csv_file_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.csv");
        let snapshot = GraphModel::with_sample_graph(DEFAULT_NODE_COLOR).snapshot();

        assert_eq!(export_to_file(&snapshot, &path).unwrap(), ExportFormat::Csv);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 5);
        assert!(import_from_file(&path).is_err());
    }
}
