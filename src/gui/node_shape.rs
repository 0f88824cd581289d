use std::cell::RefCell;
use std::collections::HashSet;

use egui::{Color32, Pos2, Shape, Stroke, Vec2, epaint::CircleShape};
use egui_graphs::{DisplayNode, DrawContext, NodeProps};
use petgraph::{EdgeType, stable_graph::IndexType};

use crate::network::node::NodeId;

const NODE_RADIUS: f32 = 12.0;

// Thread-local overlay collector populated during shapes() and consumed after the GraphView is drawn.
// Labels are painted from it on top of the graph, and the selected entry anchors the node panel.
#[derive(Clone, Debug)]
pub struct LabelOverlay {
    pub id: NodeId,
    pub center: Pos2,
    pub circle_radius: f32,
    pub text: String,
    pub selected: bool,
}

thread_local! {
    static LABEL_OVERLAY: RefCell<Vec<LabelOverlay>> = const { RefCell::new(Vec::new()) };
    static PATH_HIGHLIGHT: RefCell<HashSet<NodeId>> = RefCell::new(HashSet::new());
}

pub fn clear_path_highlight() {
    PATH_HIGHLIGHT.with(|v| v.borrow_mut().clear());
}

pub fn set_path_highlight(ids: impl Iterator<Item = NodeId>) {
    PATH_HIGHLIGHT.with(|v| {
        let mut v = v.borrow_mut();
        v.clear();
        v.extend(ids);
    })
}

pub fn is_path_highlighted(id: &NodeId) -> bool {
    PATH_HIGHLIGHT.with_borrow(|v| v.contains(id))
}

pub fn clear_label_overlays() {
    LABEL_OVERLAY.with(|v| v.borrow_mut().clear());
}

pub fn take_label_overlays() -> Vec<LabelOverlay> {
    LABEL_OVERLAY.with(|v| v.borrow_mut().drain(..).collect())
}

/// Filled circle in the user's color, with a selection stroke and a fading
/// ring while the user is on the last computed shortest path.
#[derive(Clone)]
pub struct UserNodeShape {
    pub id: NodeId,
    pub label: String,
    pub pos: Pos2,
    pub radius: f32,
    pub color: Option<Color32>,
    pub selected: bool,
    pub dragged: bool,
    pub hovered: bool,
}

impl From<NodeProps<NodeId>> for UserNodeShape {
    fn from(node_props: NodeProps<NodeId>) -> Self {
        Self {
            id: node_props.payload.clone(),
            pos: node_props.location(),
            color: node_props.color(),
            label: node_props.label,
            selected: node_props.selected,
            dragged: node_props.dragged,
            hovered: node_props.hovered,
            radius: NODE_RADIUS,
        }
    }
}

impl<E: Clone, Ty: EdgeType, Ix: IndexType> DisplayNode<NodeId, E, Ty, Ix> for UserNodeShape {
    fn closest_boundary_point(&self, dir: Vec2) -> Pos2 {
        closest_point_on_circle(self.pos, self.radius, dir)
    }

    fn is_inside(&self, pos: Pos2) -> bool {
        is_inside_circle(self.pos, self.radius, pos)
    }

    fn shapes(&mut self, ctx: &DrawContext) -> Vec<Shape> {
        let mut res = Vec::with_capacity(3);
        let circle_center = ctx.meta.canvas_to_screen_pos(self.pos);
        let circle_radius = ctx.meta.canvas_to_screen_size(self.radius);

        res.push(
            CircleShape {
                center: circle_center,
                radius: circle_radius,
                fill: self.effective_color(ctx),
                stroke: self.effective_stroke(ctx),
            }
            .into(),
        );

        let fade_path = ctx.ctx.animate_bool(
            egui::Id::new(("path_highlight", self.id.as_str())),
            is_path_highlighted(&self.id),
        );
        if fade_path > 0.01 {
            let ring_radius = circle_radius * (1.3 + 0.1 * fade_path);
            let ring_stroke = Stroke {
                width: 3.0 * fade_path,
                color: Color32::GOLD.linear_multiply(fade_path),
            };
            res.push(
                CircleShape {
                    center: circle_center,
                    radius: ring_radius,
                    fill: Color32::TRANSPARENT,
                    stroke: ring_stroke,
                }
                .into(),
            );
        }

        LABEL_OVERLAY.with(|v| {
            v.borrow_mut().push(LabelOverlay {
                id: self.id.clone(),
                center: circle_center,
                circle_radius,
                text: self.label.clone(),
                selected: self.selected,
            });
        });

        res
    }

    fn update(&mut self, state: &NodeProps<NodeId>) {
        self.id = state.payload.clone();
        self.pos = state.location();
        self.selected = state.selected;
        self.dragged = state.dragged;
        self.hovered = state.hovered;
        self.label = state.label.to_string();
        self.color = state.color();
    }
}

impl UserNodeShape {
    fn is_interacted(&self) -> bool {
        self.selected || self.dragged || self.hovered
    }

    fn effective_color(&self, ctx: &DrawContext) -> Color32 {
        if let Some(c) = self.color {
            return c;
        }
        let style = if self.is_interacted() {
            ctx.ctx.style().visuals.widgets.active
        } else {
            ctx.ctx.style().visuals.widgets.inactive
        };
        style.fg_stroke.color
    }

    fn effective_stroke(&self, ctx: &DrawContext) -> Stroke {
        if self.selected {
            Stroke::new(3.0, ctx.ctx.style().visuals.selection.stroke.color)
        } else if self.hovered || self.dragged {
            Stroke::new(2.0, Color32::WHITE)
        } else {
            Stroke::new(1.0, Color32::from_gray(60))
        }
    }
}

fn closest_point_on_circle(center: Pos2, radius: f32, dir: Vec2) -> Pos2 {
    center + dir.normalized() * (radius + 1.0)
}

fn is_inside_circle(center: Pos2, radius: f32, pos: Pos2) -> bool {
    let dir = pos - center;
    dir.length() <= radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_highlight_replaces_previous_path() {
        set_path_highlight(["1", "2"].into_iter().map(NodeId::from));
        assert!(is_path_highlighted(&"1".into()));

        set_path_highlight(["3"].into_iter().map(NodeId::from));
        assert!(!is_path_highlighted(&"1".into()));
        assert!(is_path_highlighted(&"3".into()));

        clear_path_highlight();
        assert!(!is_path_highlighted(&"3".into()));
    }

    #[test]
    fn test_circle_hit_testing() {
        let center = Pos2::new(10.0, 10.0);
        assert!(is_inside_circle(center, NODE_RADIUS, Pos2::new(15.0, 15.0)));
        assert!(!is_inside_circle(center, NODE_RADIUS, Pos2::new(30.0, 10.0)));
        let edge_point = closest_point_on_circle(center, NODE_RADIUS, Vec2::new(1.0, 0.0));
        assert_eq!(edge_point, Pos2::new(10.0 + NODE_RADIUS + 1.0, 10.0));
    }
}
