/*
 * This module defines the social graph: users, connections, the model that owns them,
 * shortest-path search over a snapshot, and the canvas mirror used by the GUI.
 */

pub mod node;
pub mod edge;
pub mod model;
pub mod path;
pub mod network_graph;
