pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod render;
pub mod style;
pub mod theme;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{Config, GraphConfig, LayoutConfig, RenderConfig, load_config};
pub use error::Error;
pub use graph::{DrawEdge, EdgeKind, FamilyGraph, Lineage, Node, NodeId, couple_id};
pub use layout::{
    DagreEngine, LayoutEngine, PositionMap, adjust_union_positions, node_radius,
    orthogonal_projection,
};
#[cfg(feature = "png")]
pub use render::write_output_png;
pub use render::{render_svg, render_tree, write_output_svg};
pub use style::{StyleRule, StyleSheet};
pub use theme::Theme;

#[cfg(feature = "cli")]
pub use cli::run;
