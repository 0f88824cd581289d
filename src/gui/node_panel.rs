use egui::{self, CollapsingHeader, Context, Frame, Id, Label, Order, Pos2, Ui, Vec2};

use crate::network::{
    model::Snapshot,
    network_graph::{color_to_hex, parse_color},
    node::Node,
};

/// A floating panel anchored near the selected user on the canvas.
///
/// The header holds an editable label plus pin/close controls; the body is supplied by the caller.
/// The "pinned" flag is persisted per `Id` in egui's memory so a pinned panel can be dragged
/// away from its node and stays where it was put.
#[derive(Debug, Clone)]
pub struct FloatingNodePanel {
    id: Id,
    anchor: Pos2,
    options: NodePanelOptions,
}

/// Rendering and behavior options for the floating panel.
#[derive(Debug, Clone)]
pub struct NodePanelOptions {
    /// Offset applied to the anchor position.
    /// Positive y moves downward. Defaults to slightly above the anchor.
    pub offset: Vec2,
    /// Minimum width of the panel.
    pub min_width: f32,
    /// Egui order for the floating area.
    pub order: Order,
    /// Default pinned state if none persisted yet.
    pub pinned_default: bool,
}

impl Default for NodePanelOptions {
    fn default() -> Self {
        Self {
            offset: Vec2 { x: 16.0, y: -80.0 },
            min_width: 220.0,
            order: Order::Foreground,
            pinned_default: false,
        }
    }
}

/// Response data from the floating panel show call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodePanelResponse {
    /// True if the user clicked the close button in the panel header.
    pub close_clicked: bool,
    /// True if the node label was changed in this frame.
    pub label_changed: bool,
}

/// Edits made in the panel body during one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserEdits {
    pub color: Option<String>,
}

impl FloatingNodePanel {
    /// Create a new floating node panel anchored at a screen-space position.
    pub fn new(id: Id, anchor: Pos2) -> Self {
        Self {
            id,
            anchor,
            options: NodePanelOptions::default(),
        }
    }

    /// Show the panel with `node_label` editable in the header.
    /// `label_changed` in the response tells whether the label mutated this frame.
    pub fn show_with_label<R>(
        &self,
        ctx: &Context,
        node_label: &mut String,
        add_contents: impl FnOnce(&mut Ui, &Context) -> R,
    ) -> NodePanelResponse {
        let pos = self.anchor + self.options.offset;

        let mut pinned_state = persisted_pin(ctx, self.id).unwrap_or(self.options.pinned_default);
        let mut close_clicked = false;
        let mut label_changed = false;

        // Area so the panel floats above the graph and is draggable when pinned.
        let mut area = egui::Area::new(self.id)
            .order(self.options.order)
            .movable(pinned_state)
            .interactable(true)
            .constrain(true);
        if !pinned_state {
            area = area.fixed_pos(pos);
        }
        area.show(ctx, |ui| {
            Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_min_width(self.options.min_width);

                ui.horizontal(|ui| {
                    let resp = ui.add(egui::TextEdit::singleline(node_label).desired_width(140.0));
                    if resp.changed() {
                        label_changed = true;
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add(egui::Button::new("✕").small())
                            .on_hover_text("Close")
                            .clicked()
                        {
                            close_clicked = true;
                        }
                        let pin_label = if pinned_state { "📌" } else { "📍" };
                        if ui
                            .add(egui::Button::new(pin_label).small())
                            .on_hover_text(if pinned_state {
                                "Unpin (panel follows the node)"
                            } else {
                                "Pin (panel becomes draggable)"
                            })
                            .clicked()
                        {
                            pinned_state = !pinned_state;
                        }
                    });
                });

                ui.add_space(6.0);
                add_contents(ui, ctx);
            });
        });

        set_persisted_pin(ctx, self.id, pinned_state);

        NodePanelResponse {
            close_clicked,
            label_changed,
        }
    }
}

/// Body of the panel for one user: id, color picker, profile, connections.
pub fn user_section(ui: &mut Ui, node: &Node, snapshot: &Snapshot) -> UserEdits {
    let mut edits = UserEdits::default();

    ui.add(label_no_wrap(format!("User ID: {}", node.id)));
    ui.horizontal(|ui| {
        ui.label("Color");
        let mut color = parse_color(&node.color);
        if ui.color_edit_button_srgba(&mut color).changed() {
            edits.color = Some(color_to_hex(color));
        }
    });

    collapsible_section(ui, "Profile", true, |ui| {
        ui.label(node.profile.as_str());
    });

    let neighbours: Vec<String> = snapshot
        .edges
        .iter()
        .filter(|edge| edge.touches(&node.id))
        .map(|edge| {
            if edge.source == node.id {
                &edge.target
            } else {
                &edge.source
            }
        })
        .map(|id| {
            let label = snapshot.node(id).map(|n| n.label.as_str()).unwrap_or("?");
            format!("{label} ({id})")
        })
        .collect();
    collapsible_section(
        ui,
        format!("Connections ({})", snapshot.degree(&node.id)),
        false,
        |ui| bullet_list(ui, neighbours),
    );

    edits
}

/// Convenience: Render a collapsible section with a standard grouped frame.
pub fn collapsible_section(
    ui: &mut Ui,
    title: impl Into<egui::WidgetText>,
    default_open: bool,
    add_contents: impl FnOnce(&mut Ui),
) {
    CollapsingHeader::new(title)
        .default_open(default_open)
        .show(ui, |ui| {
            Frame::group(ui.style()).show(ui, |ui| {
                add_contents(ui);
            });
        });
}

pub fn label_no_wrap(text: impl Into<egui::WidgetText>) -> Label {
    Label::new(text).wrap_mode(egui::TextWrapMode::Extend)
}

/// Tiny helper to render a bullet point list.
pub fn bullet_list<I, S>(ui: &mut Ui, items: I)
where
    I: IntoIterator<Item = S>,
    S: ToString,
{
    for s in items {
        ui.horizontal(|ui| {
            ui.label("•");
            ui.label(s.to_string());
        });
    }
}

fn persisted_pin(ctx: &Context, id: Id) -> Option<bool> {
    ctx.data_mut(|d| d.get_persisted::<bool>(id))
}

fn set_persisted_pin(ctx: &Context, id: Id, value: bool) {
    ctx.data_mut(|d| d.insert_persisted(id, value));
}
