use crate::config::LayoutConfig;
use crate::error::Error;
use crate::graph::{FamilyGraph, NodeId};
use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};
use std::collections::{BTreeMap, HashSet};

pub type PositionMap = BTreeMap<NodeId, (f32, f32)>;

// Sizes are scatter areas, so the radius grows with the square root.
pub fn node_radius(size: f32) -> f32 {
    (size.max(0.0) / std::f32::consts::PI).sqrt()
}

/// Produces a centre for every node, in one shared coordinate space.
pub trait LayoutEngine {
    // `root` is an ordering hint for engines that care about rank order.
    fn compute(&self, graph: &FamilyGraph, root: Option<&NodeId>) -> anyhow::Result<PositionMap>;
}

#[derive(Debug, Clone, Default)]
pub struct DagreEngine {
    config: LayoutConfig,
}

impl DagreEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }
}

impl LayoutEngine for DagreEngine {
    fn compute(&self, graph: &FamilyGraph, root: Option<&NodeId>) -> anyhow::Result<PositionMap> {
        // dagre panics on an empty graph.
        if graph.nodes().next().is_none() {
            return Ok(PositionMap::new());
        }

        let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
            DagreGraph::new(Some(GraphOption {
                directed: Some(true),
                multigraph: Some(false),
                compound: Some(false),
            }));

        let mut graph_config = DagreConfig::default();
        graph_config.rankdir = Some(self.config.rankdir.clone());
        graph_config.nodesep = Some(self.config.node_spacing);
        graph_config.ranksep = Some(self.config.rank_spacing);
        graph_config.marginx = Some(self.config.margin_x);
        graph_config.marginy = Some(self.config.margin_y);
        dagre_graph.set_graph(graph_config);

        let mut keys: Vec<(String, NodeId)> = Vec::new();
        for (index, node) in graph.nodes().enumerate() {
            let mut dagre_node = DagreNode::default();
            let diameter = node_radius(node.size) * 2.0;
            dagre_node.width = diameter;
            dagre_node.height = diameter;
            // The requested root sorts first within its rank.
            dagre_node.order = Some(match root {
                Some(root) if *root == node.id => 0,
                _ => index + 1,
            });
            let key = node.id.to_string();
            dagre_graph.set_node(key.clone(), Some(dagre_node));
            keys.push((key, node.id.clone()));
        }

        let mut edge_set: HashSet<(String, String)> = HashSet::new();
        for edge in graph.draw_edges() {
            let from = edge.from.to_string();
            let to = edge.to.to_string();
            if !edge_set.insert((from.clone(), to.clone())) {
                continue;
            }
            let _ = dagre_graph.set_edge(&from, &to, Some(DagreEdge::default()), None);
        }

        dagre_layout::run_layout(&mut dagre_graph);

        let mut positions = PositionMap::new();
        for (key, id) in keys {
            let Some(dagre_node) = dagre_graph.node(&key) else {
                continue;
            };
            positions.insert(id, (dagre_node.x, dagre_node.y));
        }
        tracing::debug!(nodes = positions.len(), "dagre placement done");
        Ok(positions)
    }
}

// Projects `c` onto the infinite line through `a` and `b`. The parameter is
// unconstrained, so a projection beyond either endpoint comes back as-is.
pub fn orthogonal_projection(
    a: (f32, f32),
    b: (f32, f32),
    c: (f32, f32),
) -> Option<(f32, f32)> {
    let ab = (b.0 - a.0, b.1 - a.1);
    let ac = (c.0 - a.0, c.1 - a.1);
    let denom = ab.0 * ab.0 + ab.1 * ab.1;
    if denom == 0.0 {
        return None;
    }
    let t = (ab.0 * ac.0 + ab.1 * ac.1) / denom;
    Some((a.0 + t * ab.0, a.1 + t * ab.1))
}

// Only two-parent unions move; pseudo-unions have no parent pair to
// project onto.
pub fn adjust_union_positions(
    graph: &FamilyGraph,
    positions: &mut PositionMap,
) -> Result<(), Error> {
    let mut corrected = 0usize;
    for (union, parents) in graph.parent_edges() {
        let mut members = parents.iter();
        let (Some(a), Some(b)) = (members.next(), members.next()) else {
            // A self-pair collapses to one member; nothing to straighten.
            continue;
        };
        let (Some(&pa), Some(&pb), Some(&pu)) = (
            positions.get(&NodeId::person(a.as_str())),
            positions.get(&NodeId::person(b.as_str())),
            positions.get(union),
        ) else {
            tracing::warn!(%union, "no position for a union member, leaving it in place");
            continue;
        };
        let projected =
            orthogonal_projection(pa, pb, pu).ok_or_else(|| Error::DegenerateGeometry {
                a: a.clone(),
                b: b.clone(),
            })?;
        positions.insert(union.clone(), projected);
        corrected += 1;
    }
    tracing::debug!(corrected, "union positions straightened");
    Ok(())
}
