use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub label_key: String,
    pub parents_key: String,
    pub adoptive_parents_key: Option<String>,
    pub records_key: String,
    pub person_node_size: f32,
    pub union_node_size: f32,
}

impl GraphConfig {
    pub fn parentage_keys(&self) -> String {
        match &self.adoptive_parents_key {
            Some(adoptive) => format!("{}/{}", self.parents_key, adoptive),
            None => self.parents_key.clone(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            label_key: "name".to_string(),
            parents_key: "parents".to_string(),
            adoptive_parents_key: Some("adoptive_parents".to_string()),
            records_key: "people".to_string(),
            person_node_size: 300.0,
            union_node_size: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub rankdir: String,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub margin_x: f32,
    pub margin_y: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rankdir: "TB".to_string(),
            node_spacing: 50.0,
            rank_spacing: 60.0,
            margin_x: 8.0,
            margin_y: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub min_width: f32,
    pub min_height: f32,
    pub padding: f32,
    pub label_offset_x: f32,
    pub label_offset_y: f32,
    // Raster target for PNG export.
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            min_width: 200.0,
            min_height: 200.0,
            padding: 40.0,
            label_offset_x: 0.0,
            label_offset_y: 0.0,
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub graph: GraphConfig,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub theme: Theme,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    node_color: Option<String>,
    parentage_color: Option<String>,
    child_color: Option<String>,
    adoptive_color: Option<String>,
    text_color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GraphConfigFile {
    label_key: Option<String>,
    parents_key: Option<String>,
    adoptive_parents_key: Option<String>,
    records_key: Option<String>,
    person_node_size: Option<f32>,
    union_node_size: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    rankdir: Option<String>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    margin_x: Option<f32>,
    margin_y: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    min_width: Option<f32>,
    min_height: Option<f32>,
    padding: Option<f32>,
    label_offset_x: Option<f32>,
    label_offset_y: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    graph: Option<GraphConfigFile>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

// Plain JSON is tried first; JSON5 picks up configs with comments or
// trailing commas.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    apply_config_text(&contents, &mut config)?;
    Ok(config)
}

fn apply_config_text(contents: &str, config: &mut Config) -> anyhow::Result<()> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(contents)?,
    };

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.node_color {
            config.theme.node_color = v;
        }
        if let Some(v) = vars.parentage_color {
            config.theme.parentage_color = v;
        }
        if let Some(v) = vars.child_color {
            config.theme.child_color = v;
        }
        if let Some(v) = vars.adoptive_color {
            config.theme.adoptive_color = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
    }

    if let Some(graph) = parsed.graph {
        if let Some(v) = graph.label_key {
            config.graph.label_key = v;
        }
        if let Some(v) = graph.parents_key {
            config.graph.parents_key = v;
        }
        if let Some(v) = graph.adoptive_parents_key {
            config.graph.adoptive_parents_key = Some(v);
        }
        if let Some(v) = graph.records_key {
            config.graph.records_key = v;
        }
        if let Some(v) = graph.person_node_size {
            config.graph.person_node_size = v;
        }
        if let Some(v) = graph.union_node_size {
            config.graph.union_node_size = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.rankdir {
            config.layout.rankdir = v;
        }
        if let Some(v) = layout.node_spacing {
            config.layout.node_spacing = v;
        }
        if let Some(v) = layout.rank_spacing {
            config.layout.rank_spacing = v;
        }
        if let Some(v) = layout.margin_x {
            config.layout.margin_x = v;
        }
        if let Some(v) = layout.margin_y {
            config.layout.margin_y = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.min_width {
            config.render.min_width = v;
        }
        if let Some(v) = render.min_height {
            config.render.min_height = v;
        }
        if let Some(v) = render.padding {
            config.render.padding = v;
        }
        if let Some(v) = render.label_offset_x {
            config.render.label_offset_x = v;
        }
        if let Some(v) = render.label_offset_y {
            config.render.label_offset_y = v;
        }
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
    }

    Ok(())
}
