use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::Value;
use uuid::Uuid;

use crate::config::GraphConfig;
use crate::error::Error;

// A lone parent stands in for their own union, so single-parent families
// never produce a `Union` value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeId {
    Person(String),
    Union(Uuid),
}

impl NodeId {
    pub fn person(label: impl Into<String>) -> Self {
        Self::Person(label.into())
    }

    pub fn is_union(&self) -> bool {
        matches!(self, Self::Union(_))
    }

    pub fn as_person(&self) -> Option<&str> {
        match self {
            Self::Person(label) => Some(label),
            Self::Union(_) => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Person(label) => f.write_str(label),
            Self::Union(id) => write!(f, "{id}"),
        }
    }
}

/// Identity of a co-parent pair, invariant under argument order.
pub fn couple_id(a: &str, b: &str) -> Uuid {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{lo} {hi}").as_bytes())
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    // Scatter-area units; the renderer derives the radius.
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Parentage,
    Child,
    AdoptiveChild,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lineage {
    Biological,
    Adoptive,
    Both,
}

impl Lineage {
    fn biological(self) -> bool {
        matches!(self, Self::Biological | Self::Both)
    }

    fn adoptive(self) -> bool {
        matches!(self, Self::Adoptive | Self::Both)
    }
}

// Every container is ordered, so iteration and output stay deterministic
// for identical input.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    nodes: BTreeMap<NodeId, Node>,
    labels: BTreeMap<NodeId, String>,
    parent_edges: BTreeMap<NodeId, BTreeSet<String>>,
    child_edges: BTreeMap<NodeId, BTreeSet<String>>,
    adoptive_edges: BTreeMap<NodeId, BTreeSet<String>>,
    unions_by_person: BTreeMap<String, BTreeSet<NodeId>>,
}

impl FamilyGraph {
    // Fails on the first malformed record; no partial graph escapes.
    pub fn build(records: &[Value], config: &GraphConfig) -> Result<Self, Error> {
        let mut graph = Self::default();
        for (index, record) in records.iter().enumerate() {
            let label = record
                .get(&config.label_key)
                .and_then(Value::as_str)
                .ok_or_else(|| Error::MissingLabel {
                    index,
                    key: config.label_key.clone(),
                })?;
            graph.ensure_person(label, config.person_node_size);

            let adoptive_key = config.adoptive_parents_key.as_deref();
            let biological = record.get(&config.parents_key);
            let adoptive = adoptive_key.and_then(|key| record.get(key));
            if biological.is_none() && adoptive.is_none() {
                return Err(Error::MissingParentage {
                    label: label.to_string(),
                    expected: config.parentage_keys(),
                });
            }
            if let Some(value) = biological {
                graph.link_parents(value, label, &config.parents_key, false, config)?;
            }
            if let (Some(key), Some(value)) = (adoptive_key, adoptive) {
                graph.link_parents(value, label, key, true, config)?;
            }
        }
        tracing::debug!(
            persons = graph.labels.len(),
            unions = graph.nodes.len() - graph.labels.len(),
            "family graph built"
        );
        Ok(graph)
    }

    // Two parents become a union node; one parent reuses their own identity.
    fn link_parents(
        &mut self,
        value: &Value,
        child: &str,
        key: &str,
        adoptive: bool,
        config: &GraphConfig,
    ) -> Result<(), Error> {
        let list = value.as_array().ok_or_else(|| Error::InvalidParentList {
            label: child.to_string(),
            key: key.to_string(),
        })?;
        let mut parents = Vec::with_capacity(list.len());
        for entry in list {
            let parent = entry.as_str().ok_or_else(|| Error::InvalidParentList {
                label: child.to_string(),
                key: key.to_string(),
            })?;
            parents.push(parent.to_string());
        }
        parents.sort();

        let union = match parents.as_slice() {
            [solo] => {
                self.ensure_person(solo, config.person_node_size);
                let union = NodeId::person(solo.as_str());
                self.unions_by_person
                    .entry(solo.clone())
                    .or_default()
                    .insert(union.clone());
                union
            }
            [a, b] => {
                let union = NodeId::Union(couple_id(a, b));
                for parent in &parents {
                    self.ensure_person(parent, config.person_node_size);
                    self.parent_edges
                        .entry(union.clone())
                        .or_default()
                        .insert(parent.clone());
                    self.unions_by_person
                        .entry(parent.clone())
                        .or_default()
                        .insert(union.clone());
                }
                self.nodes.entry(union.clone()).or_insert_with(|| Node {
                    id: union.clone(),
                    size: config.union_node_size,
                });
                union
            }
            _ => {
                return Err(Error::InvalidParentCount {
                    label: child.to_string(),
                    key: key.to_string(),
                    count: parents.len(),
                });
            }
        };

        self.ensure_person(child, config.person_node_size);
        let edges = if adoptive {
            &mut self.adoptive_edges
        } else {
            &mut self.child_edges
        };
        edges.entry(union).or_default().insert(child.to_string());
        Ok(())
    }

    // The first registration of a label wins.
    fn ensure_person(&mut self, label: &str, size: f32) {
        let id = NodeId::person(label);
        self.nodes
            .entry(id.clone())
            .or_insert_with(|| Node { id: id.clone(), size });
        self.labels.entry(id).or_insert_with(|| label.to_string());
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn labels(&self) -> impl Iterator<Item = (&NodeId, &str)> {
        self.labels.iter().map(|(id, label)| (id, label.as_str()))
    }

    pub fn parent_edges(&self) -> impl Iterator<Item = (&NodeId, &BTreeSet<String>)> {
        self.parent_edges.iter()
    }

    pub fn parents_of(&self, union: &NodeId) -> Option<&BTreeSet<String>> {
        self.parent_edges.get(union)
    }

    pub fn children_of(&self, union: &NodeId, lineage: Lineage) -> BTreeSet<&str> {
        let mut children = BTreeSet::new();
        if lineage.biological()
            && let Some(set) = self.child_edges.get(union)
        {
            children.extend(set.iter().map(String::as_str));
        }
        if lineage.adoptive()
            && let Some(set) = self.adoptive_edges.get(union)
        {
            children.extend(set.iter().map(String::as_str));
        }
        children
    }

    pub fn unions_of(&self, person: &str) -> impl Iterator<Item = &NodeId> {
        self.unions_by_person.get(person).into_iter().flatten()
    }

    // The visited set doubles as the cycle guard, so a pedigree that loops
    // back on itself still terminates.
    pub fn descendants_of(&self, start: &str, lineage: Lineage) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        let mut pending = vec![start.to_string()];
        while let Some(person) = pending.pop() {
            if !visited.insert(person.clone()) {
                continue;
            }
            for union in self.unions_of(&person) {
                for child in self.children_of(union, lineage) {
                    if !visited.contains(child) {
                        pending.push(child.to_string());
                    }
                }
            }
        }
        visited
    }

    // Fixed order: parentage first, then biological children, then adoptive.
    pub fn draw_edges(&self) -> Vec<DrawEdge> {
        let mut edges = Vec::new();
        for (union, parents) in &self.parent_edges {
            for parent in parents {
                edges.push(DrawEdge {
                    from: NodeId::person(parent.as_str()),
                    to: union.clone(),
                    kind: EdgeKind::Parentage,
                });
            }
        }
        for (union, children) in &self.child_edges {
            for child in children {
                edges.push(DrawEdge {
                    from: union.clone(),
                    to: NodeId::person(child.as_str()),
                    kind: EdgeKind::Child,
                });
            }
        }
        for (union, children) in &self.adoptive_edges {
            for child in children {
                edges.push(DrawEdge {
                    from: union.clone(),
                    to: NodeId::person(child.as_str()),
                    kind: EdgeKind::AdoptiveChild,
                });
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(records: Value) -> Result<FamilyGraph, Error> {
        let records = records.as_array().expect("test records are arrays").clone();
        FamilyGraph::build(&records, &GraphConfig::default())
    }

    #[test]
    fn couple_id_ignores_argument_order() {
        assert_eq!(couple_id("Ask", "Embla"), couple_id("Embla", "Ask"));
        assert_ne!(couple_id("Ask", "Embla"), couple_id("Ask", "Eir"));
    }

    #[test]
    fn two_parent_record_builds_one_union() {
        let graph = build(json!([
            { "name": "Kari", "parents": ["Ask", "Embla"] },
        ]))
        .expect("build should succeed");

        let union = NodeId::Union(couple_id("Ask", "Embla"));
        assert_eq!(graph.nodes().count(), 4);
        assert!(graph.contains(&union));
        assert_eq!(
            graph.parents_of(&union).map(|p| p.len()),
            Some(2),
            "both parents feed the union"
        );
        assert!(graph.children_of(&union, Lineage::Both).contains("Kari"));
        assert_eq!(graph.node(&union).map(|n| n.size), Some(10.0));
        assert_eq!(
            graph.node(&NodeId::person("Ask")).map(|n| n.size),
            Some(300.0)
        );
    }

    #[test]
    fn parent_order_in_records_does_not_matter() {
        let forward = build(json!([
            { "name": "Kari", "parents": ["Ask", "Embla"] },
        ]))
        .expect("build should succeed");
        let reversed = build(json!([
            { "name": "Kari", "parents": ["Embla", "Ask"] },
        ]))
        .expect("build should succeed");

        let union = NodeId::Union(couple_id("Ask", "Embla"));
        assert!(forward.contains(&union));
        assert!(reversed.contains(&union));
        assert_eq!(forward.nodes().count(), reversed.nodes().count());
    }

    #[test]
    fn siblings_share_the_union_node() {
        let graph = build(json!([
            { "name": "Kari", "parents": ["Ask", "Embla"] },
            { "name": "Leif", "parents": ["Embla", "Ask"] },
        ]))
        .expect("build should succeed");

        let union = NodeId::Union(couple_id("Ask", "Embla"));
        assert_eq!(graph.nodes().count(), 5);
        let children = graph.children_of(&union, Lineage::Both);
        assert!(children.contains("Kari") && children.contains("Leif"));
    }

    #[test]
    fn single_parent_gets_no_union_node() {
        let graph = build(json!([
            { "name": "Kari", "parents": ["Ask"] },
        ]))
        .expect("build should succeed");

        assert_eq!(graph.nodes().count(), 2);
        assert!(graph.nodes().all(|n| !n.id.is_union()));
        assert!(graph.parent_edges().next().is_none());
        assert!(
            graph
                .children_of(&NodeId::person("Ask"), Lineage::Both)
                .contains("Kari"),
            "child hangs off the parent directly"
        );
    }

    #[test]
    fn duplicated_parent_collapses_to_solo() {
        // A two-entry list naming the same person once sorted.
        let graph = build(json!([
            { "name": "Kari", "parents": ["Ask", "Ask"] },
        ]))
        .expect("build should succeed");

        let union = NodeId::Union(couple_id("Ask", "Ask"));
        assert!(graph.contains(&union));
        assert_eq!(graph.parents_of(&union).map(|p| p.len()), Some(1));
    }

    #[test]
    fn reinsertion_keeps_first_size() {
        let graph = build(json!([
            { "name": "Kari", "parents": ["Ask", "Embla"] },
            { "name": "Ask", "parents": ["Aud"] },
        ]))
        .expect("build should succeed");

        assert_eq!(graph.nodes().count(), 5);
        assert_eq!(graph.labels().filter(|(_, l)| *l == "Ask").count(), 1);
    }

    #[test]
    fn record_without_parent_keys_is_rejected() {
        let err = build(json!([
            { "name": "Kari" },
        ]))
        .expect_err("build should fail");
        assert_eq!(
            err,
            Error::MissingParentage {
                label: "Kari".to_string(),
                expected: "parents/adoptive_parents".to_string(),
            }
        );
    }

    #[test]
    fn empty_parent_list_is_rejected() {
        let err = build(json!([
            { "name": "Kari", "parents": [] },
        ]))
        .expect_err("build should fail");
        assert_eq!(
            err,
            Error::InvalidParentCount {
                label: "Kari".to_string(),
                key: "parents".to_string(),
                count: 0,
            }
        );
    }

    #[test]
    fn three_parents_are_rejected() {
        let err = build(json!([
            { "name": "Kari", "parents": ["Ask", "Embla", "Aud"] },
        ]))
        .expect_err("build should fail");
        assert_eq!(
            err,
            Error::InvalidParentCount {
                label: "Kari".to_string(),
                key: "parents".to_string(),
                count: 3,
            }
        );
    }

    #[test]
    fn non_string_parent_entries_are_rejected() {
        let err = build(json!([
            { "name": "Kari", "parents": ["Ask", 7] },
        ]))
        .expect_err("build should fail");
        assert!(matches!(err, Error::InvalidParentList { .. }));
    }

    #[test]
    fn record_without_label_is_rejected() {
        let err = build(json!([
            { "name": "Kari", "parents": ["Ask"] },
            { "parents": ["Kari"] },
        ]))
        .expect_err("build should fail");
        assert_eq!(
            err,
            Error::MissingLabel {
                index: 1,
                key: "name".to_string(),
            }
        );
    }

    #[test]
    fn descendants_walk_through_unions() {
        let graph = build(json!([
            { "name": "Kari", "parents": ["Ask", "Embla"] },
            { "name": "Sif", "parents": ["Kari", "Odd"] },
        ]))
        .expect("build should succeed");

        let line = graph.descendants_of("Ask", Lineage::Both);
        assert_eq!(
            line,
            ["Ask", "Kari", "Sif"]
                .into_iter()
                .map(String::from)
                .collect()
        );
        assert_eq!(
            line,
            graph.descendants_of("Ask", Lineage::Both),
            "closure is stable across calls"
        );
        assert_eq!(graph.descendants_of("Sif", Lineage::Both).len(), 1);
    }

    #[test]
    fn descendants_respect_the_lineage_filter() {
        let graph = build(json!([
            { "name": "Kari", "parents": ["Ask", "Embla"] },
            { "name": "Runa", "parents": ["Aud"], "adoptive_parents": ["Ask", "Embla"] },
        ]))
        .expect("build should succeed");

        assert!(
            !graph
                .descendants_of("Ask", Lineage::Biological)
                .contains("Runa")
        );
        assert!(
            graph
                .descendants_of("Ask", Lineage::Adoptive)
                .contains("Runa")
        );
        assert!(graph.descendants_of("Ask", Lineage::Both).contains("Runa"));
        assert!(graph.descendants_of("Aud", Lineage::Both).contains("Runa"));
    }

    #[test]
    fn descendants_terminate_on_cycles() {
        // Deliberately impossible pedigree: each is the other's parent.
        let graph = build(json!([
            { "name": "Vali", "parents": ["Ylva"] },
            { "name": "Ylva", "parents": ["Vali"] },
        ]))
        .expect("build should succeed");

        let line = graph.descendants_of("Vali", Lineage::Both);
        assert_eq!(
            line,
            ["Vali", "Ylva"].into_iter().map(String::from).collect()
        );
    }

    #[test]
    fn descendants_of_unknown_label_is_just_the_label() {
        let graph = build(json!([
            { "name": "Kari", "parents": ["Ask"] },
        ]))
        .expect("build should succeed");
        let line = graph.descendants_of("Nobody", Lineage::Both);
        assert_eq!(line.len(), 1);
        assert!(line.contains("Nobody"));
    }

    #[test]
    fn draw_edges_cover_all_three_relations() {
        let graph = build(json!([
            { "name": "Kari", "parents": ["Ask", "Embla"] },
            { "name": "Runa", "parents": ["Aud"], "adoptive_parents": ["Ask", "Embla"] },
        ]))
        .expect("build should succeed");

        let edges = graph.draw_edges();
        let union = NodeId::Union(couple_id("Ask", "Embla"));
        assert_eq!(
            edges
                .iter()
                .filter(|e| e.kind == EdgeKind::Parentage && e.to == union)
                .count(),
            2
        );
        assert!(edges.contains(&DrawEdge {
            from: union.clone(),
            to: NodeId::person("Kari"),
            kind: EdgeKind::Child,
        }));
        assert!(edges.contains(&DrawEdge {
            from: NodeId::person("Aud"),
            to: NodeId::person("Runa"),
            kind: EdgeKind::Child,
        }));
        assert!(edges.contains(&DrawEdge {
            from: union,
            to: NodeId::person("Runa"),
            kind: EdgeKind::AdoptiveChild,
        }));
    }

    #[test]
    fn build_honours_configured_keys() {
        let config = GraphConfig {
            label_key: "id".to_string(),
            parents_key: "folks".to_string(),
            adoptive_parents_key: None,
            ..GraphConfig::default()
        };
        let records = vec![json!({ "id": "Kari", "folks": ["Ask", "Embla"] })];
        let graph = FamilyGraph::build(&records, &config).expect("build should succeed");
        assert!(graph.contains(&NodeId::Union(couple_id("Ask", "Embla"))));

        let err = FamilyGraph::build(&[json!({ "id": "Odd" })], &config)
            .expect_err("missing parentage should fail");
        assert_eq!(
            err,
            Error::MissingParentage {
                label: "Odd".to_string(),
                expected: "folks".to_string(),
            }
        );
    }
}
