/*!
Static layouts for the canvas.

Each layout is a pure function from a snapshot to one position per user, in canvas
coordinates centered on the origin. The graph view fits them to the screen.
*/

use std::{
    collections::{HashMap, HashSet, VecDeque},
    f32::consts::TAU,
    fmt::Display,
    str::FromStr,
};

use egui::{Pos2, Vec2};
use serde::Deserialize;

use crate::network::{model::Snapshot, node::NodeId};

/// Distance between neighbouring users in every layout.
pub const DEFAULT_SPACING: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Circle,
    Grid,
    #[serde(alias = "breadthfirst")]
    Hierarchical,
    #[serde(alias = "concentric")]
    Radial,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 4] = [
        LayoutKind::Circle,
        LayoutKind::Grid,
        LayoutKind::Hierarchical,
        LayoutKind::Radial,
    ];
}

impl Display for LayoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LayoutKind::Circle => "Circle",
            LayoutKind::Grid => "Grid",
            LayoutKind::Hierarchical => "Hierarchical",
            LayoutKind::Radial => "Radial",
        };
        write!(f, "{name}")
    }
}

impl FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circle" => Ok(LayoutKind::Circle),
            "grid" => Ok(LayoutKind::Grid),
            "hierarchical" | "breadthfirst" => Ok(LayoutKind::Hierarchical),
            "radial" | "concentric" => Ok(LayoutKind::Radial),
            other => Err(format!("unknown layout {other}")),
        }
    }
}

pub fn compute(kind: LayoutKind, snapshot: &Snapshot, spacing: f32) -> HashMap<NodeId, Pos2> {
    let ids: Vec<&NodeId> = snapshot.nodes.iter().map(|node| &node.id).collect();
    if ids.is_empty() {
        return HashMap::new();
    }
    match kind {
        LayoutKind::Circle => circle(&ids, spacing),
        LayoutKind::Grid => grid(&ids, spacing),
        LayoutKind::Hierarchical => hierarchical(snapshot, &ids, spacing),
        LayoutKind::Radial => radial(snapshot, &ids, spacing),
    }
}

fn ring(ids: &[&NodeId], radius: f32, out: &mut HashMap<NodeId, Pos2>) {
    if ids.len() == 1 && radius == 0.0 {
        out.insert(ids[0].clone(), Pos2::ZERO);
        return;
    }
    let step = TAU / ids.len() as f32;
    for (i, id) in ids.iter().enumerate() {
        // Start at twelve o'clock
        let angle = step * i as f32 - TAU / 4.0;
        out.insert((*id).clone(), Pos2::new(radius * angle.cos(), radius * angle.sin()));
    }
}

/// Radius at which `count` users sit `spacing` apart along the circumference.
fn min_radius(count: usize, spacing: f32) -> f32 {
    (count as f32 * spacing / TAU).max(spacing)
}

fn circle(ids: &[&NodeId], spacing: f32) -> HashMap<NodeId, Pos2> {
    let mut out = HashMap::with_capacity(ids.len());
    let radius = if ids.len() == 1 { 0.0 } else { min_radius(ids.len(), spacing) };
    ring(ids, radius, &mut out);
    out
}

fn grid(ids: &[&NodeId], spacing: f32) -> HashMap<NodeId, Pos2> {
    let cols = (ids.len() as f32).sqrt().ceil() as usize;
    let rows = ids.len().div_ceil(cols);
    let offset = Vec2::new(
        (cols - 1) as f32 * spacing / 2.0,
        (rows - 1) as f32 * spacing / 2.0,
    );
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            let pos = Pos2::new((i % cols) as f32 * spacing, (i / cols) as f32 * spacing);
            ((*id).clone(), pos - offset)
        })
        .collect()
}

fn adjacency<'a>(snapshot: &'a Snapshot) -> HashMap<&'a NodeId, Vec<&'a NodeId>> {
    let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
    for edge in &snapshot.edges {
        adjacency.entry(&edge.source).or_default().push(&edge.target);
        adjacency.entry(&edge.target).or_default().push(&edge.source);
    }
    adjacency
}

/// Breadth-first levels: every component is rooted at its first user in
/// snapshot order, one row per depth.
fn hierarchical(snapshot: &Snapshot, ids: &[&NodeId], spacing: f32) -> HashMap<NodeId, Pos2> {
    let adjacency = adjacency(snapshot);
    let mut levels: Vec<Vec<&NodeId>> = Vec::new();
    let mut seen: HashSet<&NodeId> = HashSet::new();

    for &root in ids {
        if !seen.insert(root) {
            continue;
        }
        let mut queue = VecDeque::from([(root, 0usize)]);
        while let Some((id, depth)) = queue.pop_front() {
            if levels.len() <= depth {
                levels.push(Vec::new());
            }
            levels[depth].push(id);
            for &next in adjacency.get(id).into_iter().flatten() {
                if seen.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
    }

    let mut out = HashMap::with_capacity(ids.len());
    let top = (levels.len() - 1) as f32 * spacing / 2.0;
    for (depth, level) in levels.iter().enumerate() {
        let left = (level.len() - 1) as f32 * spacing / 2.0;
        for (i, id) in level.iter().enumerate() {
            let pos = Pos2::new(i as f32 * spacing - left, depth as f32 * spacing - top);
            out.insert((*id).clone(), pos);
        }
    }
    out
}

/// Concentric rings by degree, best connected users in the middle.
fn radial(snapshot: &Snapshot, ids: &[&NodeId], spacing: f32) -> HashMap<NodeId, Pos2> {
    let mut by_degree: Vec<(usize, &NodeId)> = ids.iter().map(|id| (snapshot.degree(id), *id)).collect();
    // Stable, so equal degrees keep snapshot order
    by_degree.sort_by(|a, b| b.0.cmp(&a.0));

    let mut rings: Vec<Vec<&NodeId>> = Vec::new();
    let mut current = None;
    for (degree, id) in by_degree {
        if current != Some(degree) {
            rings.push(Vec::new());
            current = Some(degree);
        }
        if let Some(ring) = rings.last_mut() {
            ring.push(id);
        }
    }

    let mut out = HashMap::with_capacity(ids.len());
    let mut radius: Option<f32> = None;
    for members in &rings {
        let r = match radius {
            None if members.len() == 1 => 0.0,
            None => min_radius(members.len(), spacing),
            Some(previous) => (previous + spacing).max(min_radius(members.len(), spacing)),
        };
        ring(members, r, &mut out);
        radius = Some(r);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::model::GraphModel;

    fn star() -> Snapshot {
        // 1 is the hub, 5 hangs off 4, 6 is alone
        let mut model = GraphModel::new();
        let ids: Vec<NodeId> = (0..6).map(|_| model.add_user("#00bcd4").id).collect();
        for leaf in &ids[1..4] {
            model.add_edge_default(&ids[0], leaf).unwrap();
        }
        model.add_edge_default(&ids[3], &ids[4]).unwrap();
        model.snapshot()
    }

    fn assert_covers(snapshot: &Snapshot, positions: &HashMap<NodeId, Pos2>) {
        assert_eq!(positions.len(), snapshot.nodes.len());
        let distinct: HashSet<(i64, i64)> = positions
            .values()
            .map(|p| ((p.x * 100.0).round() as i64, (p.y * 100.0).round() as i64))
            .collect();
        assert_eq!(distinct.len(), positions.len(), "positions overlap");
    }

    #[test]
    fn test_every_layout_places_every_user_once() {
        let snapshot = star();
        for kind in LayoutKind::ALL {
            let positions = compute(kind, &snapshot, DEFAULT_SPACING);
            assert_covers(&snapshot, &positions);
        }
        assert!(compute(LayoutKind::Circle, &Snapshot::default(), DEFAULT_SPACING).is_empty());
    }

    #[test]
    fn test_circle_is_equidistant() {
        let snapshot = star();
        let positions = compute(LayoutKind::Circle, &snapshot, DEFAULT_SPACING);
        let radii: Vec<f32> = positions.values().map(|p| p.to_vec2().length()).collect();
        for r in &radii {
            assert!((r - radii[0]).abs() < 1e-3);
        }
    }

    #[test]
    fn test_hierarchical_rows_follow_bfs_depth() {
        let snapshot = star();
        let positions = compute(LayoutKind::Hierarchical, &snapshot, DEFAULT_SPACING);
        let y = |id: &str| positions[&NodeId::from(id)].y;
        assert!(y("1") < y("2"));
        assert_eq!(y("2"), y("4"));
        assert!(y("4") < y("5"));
        // Separate component starts again at the top row
        assert_eq!(y("6"), y("1"));
    }

    #[test]
    fn test_radial_puts_hub_in_the_middle() {
        let snapshot = star();
        let positions = compute(LayoutKind::Radial, &snapshot, DEFAULT_SPACING);
        let r = |id: &str| positions[&NodeId::from(id)].to_vec2().length();
        assert_eq!(r("1"), 0.0);
        assert!(r("4") < r("2"));
        assert!(r("2") < r("6"));
    }

    #[test]
    fn test_parse_layout_names() {
        assert_eq!("breadthfirst".parse::<LayoutKind>(), Ok(LayoutKind::Hierarchical));
        assert_eq!(" Concentric ".parse::<LayoutKind>(), Ok(LayoutKind::Radial));
        assert!("spiral".parse::<LayoutKind>().is_err());
        assert_eq!(LayoutKind::Grid.to_string(), "Grid");
    }
}
