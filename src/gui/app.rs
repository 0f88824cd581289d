use std::path::Path;

use eframe::egui;
use egui::{
    Align2, CentralPanel, CollapsingHeader, Color32, ComboBox, Context, FontId, Frame, Id,
    Separator, SidePanel, TopBottomPanel, Ui, Vec2,
};
use egui_extras::{Column, TableBuilder};
use egui_graphs::{
    DefaultEdgeShape, GraphView, LayoutRandom, LayoutStateRandom, SettingsInteraction,
    SettingsNavigation,
};
use petgraph::{Undirected, graph::DefaultIx};
use rand::{SeedableRng, rngs::StdRng};
use tracing::{info, warn};

use crate::{
    config::{AppConfig, ThemeFlavor},
    export::{self, ExportFormat},
    gui::{
        layout::{self, DEFAULT_SPACING, LayoutKind},
        node_panel::{FloatingNodePanel, user_section},
        node_shape::{
            LabelOverlay, UserNodeShape, clear_label_overlays, clear_path_highlight,
            set_path_highlight, take_label_overlays,
        },
    },
    network::{
        edge::{Edge, UndirectedEdgeKey},
        model::GraphModel,
        network_graph::{NetworkGraph, color_to_hex, parse_color},
        node::NodeId,
        path::{ShortestPath, shortest_path_for_selection},
    },
};

const WINDOW_TITLE: &str = "Social Network Simulator";

type CanvasView<'a> = GraphView<
    'a,
    NodeId,
    Edge,
    Undirected,
    DefaultIx,
    UserNodeShape,
    DefaultEdgeShape,
    LayoutStateRandom,
    LayoutRandom,
>;

pub fn main(config: AppConfig) -> eframe::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(|cc| Ok(Box::new(App::new(cc, config)) as Box<dyn eframe::App>)),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    model: GraphModel,
    graph: NetworkGraph,
    rng: StdRng,

    layout: LayoutKind,
    layout_pending: bool,
    auto_layout: bool,

    background: Option<Color32>,
    new_user_color: Color32,
    new_user_name: String,

    selected_nodes: Vec<NodeId>,
    selected_edges: Vec<UndirectedEdgeKey>,
    dismissed_panel: Option<NodeId>,

    last_path: Option<ShortestPath>,
    status: Option<StatusMessage>,
}

impl App {
    fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        catppuccin_egui::set_theme(&cc.egui_ctx, theme_for(config.theme));
        Self::with_config(config)
    }

    pub fn with_config(config: AppConfig) -> Self {
        let model = if config.sample_graph {
            GraphModel::with_sample_graph(&config.node_color)
        } else {
            GraphModel::new()
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        info!(
            "Starting with {} users, layout {}, seed {:?}",
            model.node_count(),
            config.layout,
            config.seed
        );

        let graph = NetworkGraph::build_new(&model.snapshot());
        Self {
            model,
            graph,
            rng,
            layout: config.layout,
            layout_pending: true,
            auto_layout: true,
            background: config.background.as_deref().map(parse_color),
            new_user_color: parse_color(&config.node_color),
            new_user_name: String::new(),
            selected_nodes: Vec::new(),
            selected_edges: Vec::new(),
            dismissed_panel: None,
            last_path: None,
            status: None,
        }
    }

    fn read_data(&mut self) {
        let selected = self.graph.selected_node_ids();
        if selected.first() != self.selected_nodes.first() {
            self.dismissed_panel = None;
        }
        self.selected_nodes = selected;
        self.selected_edges = self.graph.selected_edge_keys();
    }

    fn set_status(&mut self, text: impl Into<String>) {
        let text = text.into();
        info!("[app] {}", text);
        self.status = Some(StatusMessage { text, is_error: false });
    }

    fn report(&mut self, action: &str, err: impl std::fmt::Display) {
        let text = err.to_string();
        warn!("[app] {} failed: {}", action, text);
        self.status = Some(StatusMessage { text, is_error: true });
    }

    /// Push the model to the canvas after a mutation. Any highlighted path is stale now.
    fn sync(&mut self, relayout: bool) {
        self.graph.reconcile(&self.model.snapshot());
        self.last_path = None;
        clear_path_highlight();
        if let Some(id) = &self.dismissed_panel
            && !self.model.contains(id)
        {
            self.dismissed_panel = None;
        }
        if relayout && self.auto_layout {
            self.layout_pending = true;
        }
    }

    fn apply_layout(&mut self) {
        let positions = layout::compute(self.layout, &self.model.snapshot(), DEFAULT_SPACING);
        self.graph.apply_positions(&positions);
        self.layout_pending = false;
    }

    pub fn set_layout(&mut self, kind: LayoutKind) {
        info!("[app] Layout changed to {}", kind);
        self.layout = kind;
        self.layout_pending = true;
    }

    /// Add a user named after the name field, or `User N` when it is blank.
    pub fn add_user(&mut self) {
        let color = color_to_hex(self.new_user_color);
        let name = self.new_user_name.trim();
        let node = if name.is_empty() {
            self.model.add_user(&color)
        } else {
            let profile = format!("Profile of {name}");
            self.model.add_node(name, color, profile)
        };
        self.new_user_name.clear();
        self.sync(true);
        self.set_status(format!("Added {}", node.label));
    }

    pub fn add_connection(&mut self) {
        match self.model.add_random_edge(&mut self.rng) {
            Ok(Some(edge)) => {
                self.sync(false);
                self.set_status(format!("Connected {} and {}", edge.source, edge.target));
            }
            Ok(None) => self.report("Add connection", "Add at least two users before connecting them"),
            Err(e) => self.report("Add connection", e),
        }
    }

    pub fn delete_selected(&mut self, nodes: &[NodeId], edges: &[UndirectedEdgeKey]) {
        if nodes.is_empty() && edges.is_empty() {
            self.report("Delete", "Nothing is selected");
            return;
        }
        let removed_nodes = self.model.remove_nodes(nodes);
        let removed_edges = self.model.remove_edges(edges.iter().cloned());
        self.sync(removed_nodes > 0);
        self.set_status(format!(
            "Deleted {} users and {} connections",
            removed_nodes, removed_edges
        ));
    }

    pub fn find_shortest_path(&mut self, selected: &[NodeId]) {
        match shortest_path_for_selection(&self.model.snapshot(), selected) {
            Ok(path) => {
                set_path_highlight(path.nodes.iter().cloned());
                self.set_status(format!("Shortest path: {}", path));
                self.last_path = Some(path);
            }
            Err(e) => {
                clear_path_highlight();
                self.last_path = None;
                self.report("Shortest path", e);
            }
        }
    }

    pub fn export_to(&mut self, path: &Path) {
        match export::export_to_file(&self.model.snapshot(), path) {
            Ok(ExportFormat::Json) => self.set_status(format!("Graph exported to {}", path.display())),
            Ok(ExportFormat::Csv) => self.set_status(format!("Connections exported to {}", path.display())),
            Err(e) => self.report("Export", e),
        }
    }

    pub fn import_from(&mut self, path: &Path) {
        match export::import_from_file(path) {
            Ok(model) => {
                self.model = model;
                self.sync(true);
                self.layout_pending = true;
                self.set_status(format!("Graph imported from {}", path.display()));
            }
            Err(e) => self.report("Import", e),
        }
    }

    fn export_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .add_filter("CSV", &["csv"])
            .set_file_name("graph.json")
            .save_file()
        {
            self.export_to(&path);
        }
    }

    fn import_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            self.import_from(&path);
        }
    }

    fn render_actions(&mut self, ui: &mut Ui) {
        CollapsingHeader::new("Actions")
            .default_open(true)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.new_user_name)
                            .hint_text("Name (optional)")
                            .desired_width(120.0),
                    );
                    if ui.button("Add User").clicked() {
                        self.add_user();
                    }
                });
                if ui
                    .button("Add Connection")
                    .on_hover_text("Connect two random users")
                    .clicked()
                {
                    self.add_connection();
                }
                if ui.button("Delete Selected").clicked() {
                    let nodes = self.selected_nodes.clone();
                    let edges = self.selected_edges.clone();
                    self.delete_selected(&nodes, &edges);
                }
                if ui
                    .button("Find Shortest Path")
                    .on_hover_text("Select exactly two users first")
                    .clicked()
                {
                    let selected = self.selected_nodes.clone();
                    self.find_shortest_path(&selected);
                }
                ui.horizontal(|ui| {
                    if ui.button("Export Graph").clicked() {
                        self.export_dialog();
                    }
                    if ui.button("Import Graph").clicked() {
                        self.import_dialog();
                    }
                });
            });
    }

    fn render_appearance(&mut self, ui: &mut Ui) {
        CollapsingHeader::new("Appearance")
            .default_open(true)
            .show(ui, |ui| {
                let mut layout = self.layout;
                ComboBox::from_label("Layout")
                    .selected_text(layout.to_string())
                    .show_ui(ui, |ui| {
                        for kind in LayoutKind::ALL {
                            ui.selectable_value(&mut layout, kind, kind.to_string());
                        }
                    });
                if layout != self.layout {
                    self.set_layout(layout);
                }
                ui.horizontal(|ui| {
                    ui.checkbox(&mut self.auto_layout, "Auto layout")
                        .on_hover_text("Re-run the layout after users are added or deleted");
                    if ui.small_button("Re-apply").clicked() {
                        self.layout_pending = true;
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Background");
                    let mut color = self.background.unwrap_or(ui.visuals().panel_fill);
                    if ui.color_edit_button_srgba(&mut color).changed() {
                        info!("[app] Background color set to {}", color_to_hex(color));
                        self.background = Some(color);
                    }
                    if self.background.is_some() && ui.small_button("Reset").clicked() {
                        self.background = None;
                    }
                });
                ui.horizontal(|ui| {
                    ui.label("New user color");
                    ui.color_edit_button_srgba(&mut self.new_user_color);
                });
            });
    }

    fn render_users_table(&mut self, ui: &mut Ui) {
        CollapsingHeader::new(format!(
            "Users ({}) / Connections ({})",
            self.model.node_count(),
            self.model.edge_count()
        ))
        .default_open(false)
        .show(ui, |ui| {
            let snapshot = self.model.snapshot();
            egui::ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .resizable(true)
                    .column(Column::auto().at_least(40.0))
                    .column(Column::auto().at_least(100.0))
                    .column(Column::auto().at_least(50.0))
                    .header(20.0, |mut header| {
                        header.col(|ui| {
                            ui.strong("ID");
                        });
                        header.col(|ui| {
                            ui.strong("Label");
                        });
                        header.col(|ui| {
                            ui.strong("Degree");
                        });
                    })
                    .body(|mut body| {
                        for node in &snapshot.nodes {
                            body.row(20.0, |mut row| {
                                row.col(|ui| {
                                    ui.label(node.id.as_str());
                                });
                                row.col(|ui| {
                                    ui.colored_label(parse_color(&node.color), node.label.as_str());
                                });
                                row.col(|ui| {
                                    ui.label(snapshot.degree(&node.id).to_string());
                                });
                            });
                        }
                    });
            });
        });
    }

    fn render_status(&self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label(format!(
                "Selected: {} users, {} connections",
                self.selected_nodes.len(),
                self.selected_edges.len()
            ));
            ui.add(Separator::default().vertical());
            match &self.status {
                Some(status) if status.is_error => {
                    ui.colored_label(ui.visuals().error_fg_color, status.text.as_str());
                }
                Some(status) => {
                    ui.label(status.text.as_str());
                }
                None => {
                    ui.weak("Select two users and press \"Find Shortest Path\"");
                }
            }
        });
    }

    fn render_canvas(&mut self, ctx: &Context, ui: &mut Ui) {
        clear_label_overlays();

        {
            let widget = &mut CanvasView::new(&mut self.graph.graph)
                .with_navigations(
                    &SettingsNavigation::default()
                        .with_zoom_and_pan_enabled(false)
                        .with_fit_to_screen_enabled(true),
                )
                .with_interactions(
                    &SettingsInteraction::default()
                        .with_dragging_enabled(true)
                        .with_node_selection_enabled(true)
                        .with_node_selection_multi_enabled(true)
                        .with_edge_selection_enabled(true)
                        .with_edge_selection_multi_enabled(true),
                );
            ui.add(widget);
        }

        // The graph view places nodes randomly on its first frame; static layouts go on top afterwards.
        if self.layout_pending {
            self.apply_layout();
            ctx.request_repaint();
        }

        let labels: Vec<LabelOverlay> = take_label_overlays();
        let painter = ui.painter();
        let text_color = ui.visuals().strong_text_color();
        for label in &labels {
            painter.text(
                label.center + Vec2::new(0.0, label.circle_radius + 2.0),
                Align2::CENTER_TOP,
                &label.text,
                FontId::proportional(14.0),
                text_color,
            );
        }

        self.render_node_panel(ctx, &labels);
    }

    fn render_node_panel(&mut self, ctx: &Context, labels: &[LabelOverlay]) {
        let Some(selected) = self.selected_nodes.first().cloned() else {
            return;
        };
        if self.dismissed_panel.as_ref() == Some(&selected) {
            return;
        }
        let Some(anchor) = labels.iter().find(|l| l.selected && l.id == selected) else {
            return;
        };
        let Some(node) = self.model.node(&selected).cloned() else {
            return;
        };
        let snapshot = self.model.snapshot();

        let panel = FloatingNodePanel::new(Id::new(("node_panel", selected.as_str())), anchor.center);
        let mut working_label = node.label.clone();
        let mut edits = None;
        let resp = panel.show_with_label(ctx, &mut working_label, |ui, _ctx| {
            edits = Some(user_section(ui, &node, &snapshot));
        });

        if resp.label_changed {
            match self.model.set_node_label(&selected, working_label) {
                Ok(()) => self.sync(false),
                Err(e) => self.report("Rename", e),
            }
        }
        if let Some(color) = edits.and_then(|e| e.color) {
            match self.model.set_node_color(&selected, color) {
                Ok(()) => self.sync(false),
                Err(e) => self.report("Recolor", e),
            }
        }
        if resp.close_clicked {
            self.dismissed_panel = Some(selected);
        }
    }

    fn render(&mut self, ctx: &Context) {
        TopBottomPanel::top("title").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(WINDOW_TITLE);
            });
        });

        TopBottomPanel::bottom("status").show(ctx, |ui| self.render_status(ui));

        SidePanel::right("right_panel").show(ctx, |ui| {
            self.render_actions(ui);
            ui.add(Separator::default());
            self.render_appearance(ui);
            ui.add(Separator::default());
            self.render_users_table(ui);
            if let Some(path) = &self.last_path
                && !path.is_empty()
                && let (Some(source), Some(target)) = (path.source(), path.target())
            {
                ui.add(Separator::default());
                ui.label(format!(
                    "Last path {} to {}: {} hops, weight {}",
                    source,
                    target,
                    path.len(),
                    path.total_weight
                ));
            }
        });

        let mut frame = Frame::central_panel(&ctx.style());
        if let Some(background) = self.background {
            frame = frame.fill(background);
        }
        CentralPanel::default()
            .frame(frame)
            .show(ctx, |ui| self.render_canvas(ctx, ui));
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        self.read_data();
        self.render(ctx);
    }
}

fn theme_for(flavor: ThemeFlavor) -> catppuccin_egui::Theme {
    match flavor {
        ThemeFlavor::Latte => catppuccin_egui::LATTE,
        ThemeFlavor::Frappe => catppuccin_egui::FRAPPE,
        ThemeFlavor::Macchiato => catppuccin_egui::MACCHIATO,
        ThemeFlavor::Mocha => catppuccin_egui::MOCHA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::with_config(AppConfig {
            seed: Some(1),
            ..AppConfig::default()
        })
    }

    fn status(app: &App) -> &StatusMessage {
        app.status.as_ref().unwrap()
    }

    #[test]
    fn test_add_user_and_connection() {
        let mut app = app();
        app.add_user();
        assert_eq!(app.model.node_count(), 5);
        assert_eq!(app.graph.node_count(), 5);
        assert_eq!(status(&app).text, "Added User 5");

        app.add_connection();
        assert_eq!(app.model.edge_count(), 5);
        assert_eq!(app.graph.edge_count(), 5);
        assert!(!status(&app).is_error);
    }

    #[test]
    fn test_add_user_with_name() {
        let mut app = app();
        app.new_user_name = "  Alice ".to_string();
        app.add_user();
        let alice = app.model.node(&NodeId::from("5")).unwrap();
        assert_eq!(alice.label, "Alice");
        assert_eq!(alice.profile, "Profile of Alice");
        assert!(app.new_user_name.is_empty());
        assert_eq!(status(&app).text, "Added Alice");
    }

    #[test]
    fn test_dismissed_panel_forgotten_when_user_deleted() {
        let mut app = app();
        app.dismissed_panel = Some(NodeId::from("2"));
        app.delete_selected(&[NodeId::from("1")], &[]);
        assert_eq!(app.dismissed_panel, Some(NodeId::from("2")));
        app.delete_selected(&[NodeId::from("2")], &[]);
        assert!(app.dismissed_panel.is_none());
    }

    #[test]
    fn test_connection_needs_two_users() {
        let mut app = App::with_config(AppConfig {
            sample_graph: false,
            ..AppConfig::default()
        });
        app.add_user();
        app.add_connection();
        assert!(status(&app).is_error);
        assert_eq!(app.model.edge_count(), 0);
    }

    #[test]
    fn test_shortest_path_status() {
        let mut app = app();
        app.find_shortest_path(&[NodeId::from("1"), NodeId::from("3")]);
        assert_eq!(status(&app).text, "Shortest path: 1 -> 2 -> 3");
        assert!(app.last_path.is_some());

        app.find_shortest_path(&[NodeId::from("1")]);
        assert!(status(&app).is_error);
        assert!(app.last_path.is_none());
    }

    #[test]
    fn test_delete_selected() {
        let mut app = app();
        app.delete_selected(&[], &[]);
        assert!(status(&app).is_error);

        app.delete_selected(
            &[NodeId::from("2")],
            &[UndirectedEdgeKey::new("1".into(), "4".into())],
        );
        assert_eq!(app.model.node_count(), 3);
        assert_eq!(app.model.edge_count(), 1);
        assert_eq!(app.graph.edge_count(), 1);
        assert_eq!(status(&app).text, "Deleted 1 users and 1 connections");

        app.find_shortest_path(&[NodeId::from("1"), NodeId::from("3")]);
        assert_eq!(status(&app).text, "No path exists between 1 and 3");
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let mut app = app();
        app.add_user();
        app.export_to(&path);
        assert!(!status(&app).is_error);

        let mut other = App::with_config(AppConfig {
            sample_graph: false,
            ..AppConfig::default()
        });
        other.import_from(&path);
        assert_eq!(other.model.snapshot(), app.model.snapshot());
        assert_eq!(other.graph.node_count(), 5);

        other.import_from(&dir.path().join("missing.json"));
        assert!(status(&other).is_error);
        assert_eq!(other.model.node_count(), 5);
    }
}
