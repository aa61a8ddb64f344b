use crate::config::{GraphConfig, load_config};
use crate::graph::{FamilyGraph, Lineage, NodeId};
use crate::layout::DagreEngine;
use crate::render::{render_tree, write_output_svg};
use crate::style::{StyleRule, StyleSheet};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "kinship", version, about = "Family tree renderer (dagre layout, SVG/PNG output)")]
pub struct Args {
    /// Dataset JSON file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON5 file (record keys, spacing, palette)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Person whose node leads the layout ordering
    #[arg(long = "root")]
    pub root: Option<String>,

    /// Color the whole descendant line of this person
    #[arg(long = "highlight")]
    pub highlight: Option<String>,

    /// Fill used with --highlight
    #[arg(long = "highlight-color", default_value = "red")]
    pub highlight_color: String,

    /// Shift labels horizontally, in canvas units
    #[arg(long = "label-offset-x")]
    pub label_offset_x: Option<f32>,

    /// Shift labels vertically, in canvas units
    #[arg(long = "label-offset-y")]
    pub label_offset_y: Option<f32>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(v) = args.label_offset_x {
        config.render.label_offset_x = v;
    }
    if let Some(v) = args.label_offset_y {
        config.render.label_offset_y = v;
    }

    let input = read_input(args.input.as_deref())?;
    let dataset: serde_json::Value = serde_json::from_str(&input)?;
    let records = extract_records(&dataset, &config.graph)?;
    let graph = FamilyGraph::build(records, &config.graph)?;

    let mut styles = StyleSheet::new(config.theme.node_color.clone());
    if let Some(name) = &args.highlight {
        let line = graph.descendants_of(name, Lineage::Both);
        if line.len() == 1 && !graph.contains(&NodeId::person(name.as_str())) {
            tracing::warn!(person = %name, "highlighted person is not in the dataset");
        }
        let color = args.highlight_color.clone();
        styles.push(StyleRule::new(
            move |id: &NodeId| id.as_person().is_some_and(|p| line.contains(p)),
            color,
        ));
    }

    let root = args.root.as_deref().map(NodeId::person);
    if let Some(root) = &root
        && !graph.contains(root)
    {
        tracing::warn!(person = %root, "root person is not in the dataset");
    }

    let engine = DagreEngine::new(config.layout.clone());
    let svg = render_tree(
        &graph,
        &engine,
        &styles,
        &config.theme,
        &config.render,
        root.as_ref(),
    )?;

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        #[cfg(feature = "png")]
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            crate::render::write_output_png(&svg, &output, &config.render, &config.theme)?;
        }
        #[cfg(not(feature = "png"))]
        OutputFormat::Png => {
            return Err(anyhow::anyhow!(
                "PNG output requires a build with the `png` feature"
            ));
        }
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

// A dataset is either a bare array of records or an object keeping them
// under the configured key.
fn extract_records<'a>(
    dataset: &'a serde_json::Value,
    config: &GraphConfig,
) -> Result<&'a [serde_json::Value]> {
    if let Some(records) = dataset.as_array() {
        return Ok(records);
    }
    if let Some(records) = dataset
        .get(config.records_key.as_str())
        .and_then(serde_json::Value::as_array)
    {
        return Ok(records);
    }
    Err(anyhow::anyhow!(
        "dataset must be a JSON array of records or an object with a `{}` array",
        config.records_key
    ))
}

#[cfg(feature = "png")]
fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
