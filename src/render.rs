use crate::config::RenderConfig;
use crate::graph::{EdgeKind, FamilyGraph, NodeId};
use crate::layout::{LayoutEngine, PositionMap, adjust_union_positions, node_radius};
use crate::style::StyleSheet;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_tree(
    graph: &FamilyGraph,
    engine: &dyn LayoutEngine,
    styles: &StyleSheet,
    theme: &Theme,
    config: &RenderConfig,
    root: Option<&NodeId>,
) -> Result<String> {
    let mut positions = engine.compute(graph, root)?;
    adjust_union_positions(graph, &mut positions)?;
    Ok(render_svg(graph, &positions, styles, theme, config))
}

// Edges go down first, then circles, then labels, so text is never buried.
pub fn render_svg(
    graph: &FamilyGraph,
    positions: &PositionMap,
    styles: &StyleSheet,
    theme: &Theme,
    config: &RenderConfig,
) -> String {
    let (offset, width, height) = fit_canvas(graph, positions, config);
    let place = |p: (f32, f32)| (p.0 + offset.0, p.1 + offset.1);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.0} {height:.0}\">",
    ));

    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow-child\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"7\" markerHeight=\"7\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.child_color
    ));
    svg.push_str(&format!(
        "<marker id=\"arrow-adoptive\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"7\" markerHeight=\"7\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.adoptive_color
    ));
    svg.push_str("</defs>");

    for edge in graph.draw_edges() {
        let (Some(&from), Some(&to)) = (positions.get(&edge.from), positions.get(&edge.to))
        else {
            continue;
        };
        let (x1, y1) = place(from);
        let (x2, y2) = place(to);
        let (stroke, marker) = match edge.kind {
            EdgeKind::Parentage => (theme.parentage_color.as_str(), ""),
            EdgeKind::Child => (
                theme.child_color.as_str(),
                " marker-end=\"url(#arrow-child)\"",
            ),
            EdgeKind::AdoptiveChild => (
                theme.adoptive_color.as_str(),
                " marker-end=\"url(#arrow-adoptive)\"",
            ),
        };
        svg.push_str(&format!(
            "<line x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\" stroke=\"{stroke}\" stroke-width=\"1.4\"{marker}/>",
        ));
    }

    for node in graph.nodes() {
        let Some(&center) = positions.get(&node.id) else {
            continue;
        };
        let (cx, cy) = place(center);
        let r = node_radius(node.size);
        svg.push_str(&format!(
            "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"{}\"/>",
            styles.resolve(&node.id)
        ));
    }

    for (id, label) in graph.labels() {
        let Some(&center) = positions.get(id) else {
            continue;
        };
        let (cx, cy) = place(center);
        let x = cx + config.label_offset_x;
        let y = cy + config.label_offset_y + theme.font_size * 0.35;
        svg.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
            theme.font_family,
            theme.font_size,
            theme.text_color,
            escape_xml(label)
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn fit_canvas(
    graph: &FamilyGraph,
    positions: &PositionMap,
    config: &RenderConfig,
) -> ((f32, f32), f32, f32) {
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for node in graph.nodes() {
        let Some(&(x, y)) = positions.get(&node.id) else {
            continue;
        };
        let r = node_radius(node.size);
        min_x = min_x.min(x - r);
        min_y = min_y.min(y - r);
        max_x = max_x.max(x + r);
        max_y = max_y.max(y + r);
    }
    if min_x > max_x {
        return (
            (config.padding, config.padding),
            config.min_width,
            config.min_height,
        );
    }
    let offset = (config.padding - min_x, config.padding - min_y);
    let width = (max_x - min_x + config.padding * 2.0).max(config.min_width);
    let height = (max_y - min_y + config.padding * 2.0).max(config.min_height);
    (offset, width, height)
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    config: &RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .unwrap_or("sans-serif")
        .trim()
        .to_string();
    opt.default_size = usvg::Size::from_wh(config.width, config.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
