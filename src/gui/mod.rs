pub mod app;
pub mod layout;
pub mod node_panel;
pub mod node_shape;
