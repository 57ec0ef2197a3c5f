//! Filter/query layer
//!
//! Visibility is a projection computed on demand. The graph itself is never
//! modified, so several views (filtered and unfiltered counts, say) can be
//! derived from the same graph at once.

use crate::graph::OntologyGraph;
use crate::grouping::EdgeKey;
use ontolens_domain::{EvaluationStatus, NodeId};
use std::collections::{BTreeMap, BTreeSet};

/// Which entity types and evaluation buckets are shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphFilter {
    /// Allowed entity types; an empty set hides everything
    pub entity_types: BTreeSet<String>,

    /// Show accepted relations
    pub show_accepted: bool,

    /// Show rejected relations
    pub show_rejected: bool,

    /// Show relations the evaluator was unsure about
    pub show_uncertain: bool,

    /// Show relations that have not been evaluated yet
    pub show_unevaluated: bool,
}

impl GraphFilter {
    /// Allow the given entity types, with every status bucket shown
    pub fn with_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_types: types.into_iter().map(Into::into).collect(),
            show_accepted: true,
            show_rejected: true,
            show_uncertain: true,
            show_unevaluated: true,
        }
    }

    /// Allow every entity type present in the graph and every bucket
    pub fn allow_all(graph: &OntologyGraph) -> Self {
        Self::with_types(graph.entity_types())
    }

    /// Whether an entity type is allowed
    pub fn allows_type(&self, entity_type: &str) -> bool {
        self.entity_types.contains(entity_type)
    }

    /// Whether a status bucket is shown
    pub fn shows(&self, status: EvaluationStatus) -> bool {
        match status {
            EvaluationStatus::Accepted => self.show_accepted,
            EvaluationStatus::Rejected => self.show_rejected,
            EvaluationStatus::Unsure => self.show_uncertain,
            EvaluationStatus::Pending => self.show_unevaluated,
        }
    }
}

/// Per-node and per-edge visibility for one filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visibility {
    nodes: BTreeMap<NodeId, bool>,
    edges: BTreeMap<EdgeKey, bool>,
}

impl Visibility {
    /// Whether a node is visible (unknown ids are not)
    pub fn is_node_visible(&self, id: &NodeId) -> bool {
        self.nodes.get(id).copied().unwrap_or(false)
    }

    /// Whether an edge is visible (unknown keys are not)
    pub fn is_edge_visible(&self, key: &EdgeKey) -> bool {
        self.edges.get(key).copied().unwrap_or(false)
    }

    /// Visible node ids, in id order
    pub fn visible_nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter().filter(|(_, v)| **v).map(|(id, _)| id)
    }

    /// Visible edge keys, in key order
    pub fn visible_edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter().filter(|(_, v)| **v).map(|(key, _)| key)
    }

    /// Number of visible nodes
    pub fn visible_node_count(&self) -> usize {
        self.visible_nodes().count()
    }

    /// Number of visible edges
    pub fn visible_edge_count(&self) -> usize {
        self.visible_edges().count()
    }
}

/// Derive visibility for a graph
///
/// An edge is visible when both endpoint types are allowed and its status
/// bucket is shown. A node is visible when its type is allowed and it either
/// has a visible edge or has no edges at all.
pub fn compute_visibility(graph: &OntologyGraph, filter: &GraphFilter) -> Visibility {
    let type_allowed = |id: &NodeId| {
        graph
            .node(id)
            .map(|node| filter.allows_type(&node.entity_type))
            .unwrap_or(false)
    };

    let mut visibility = Visibility::default();
    let mut has_visible_edge: BTreeSet<&NodeId> = BTreeSet::new();

    for edge in graph.edges() {
        let visible =
            type_allowed(&edge.source) && type_allowed(&edge.target) && filter.shows(edge.status);
        if visible {
            has_visible_edge.insert(&edge.source);
            has_visible_edge.insert(&edge.target);
        }
        visibility.edges.insert(edge.key.clone(), visible);
    }

    for node in graph.nodes() {
        let visible = filter.allows_type(&node.entity_type)
            && (node.degree == 0 || has_visible_edge.contains(&node.id));
        visibility.nodes.insert(node.id.clone(), visible);
    }

    visibility
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphConfig;
    use ontolens_domain::{Entity, EntityRef, Relation};

    fn graph() -> OntologyGraph {
        let entities = vec![
            Entity::new("Issue", "SRE-1"),
            Entity::new("Epic", "EPIC-1"),
            Entity::new("Page", "Runbook"),
            Entity::new("Person", "alice"),
        ];
        let relations = vec![
            Relation::new("r1", EntityRef::new("Issue", "SRE-1"), EntityRef::new("Epic", "EPIC-1"), "belongs_to")
                .with_status(EvaluationStatus::Accepted),
            Relation::new("r2", EntityRef::new("Issue", "SRE-1"), EntityRef::new("Page", "Runbook"), "documented_in")
                .with_status(EvaluationStatus::Rejected),
        ];
        OntologyGraph::build(&entities, &relations, &GraphConfig::default().with_seed(1).without_layout())
    }

    #[test]
    fn test_allow_all_shows_everything() {
        let graph = graph();
        let visibility = compute_visibility(&graph, &GraphFilter::allow_all(&graph));
        assert_eq!(visibility.visible_node_count(), 4);
        assert_eq!(visibility.visible_edge_count(), 2);
    }

    #[test]
    fn test_empty_type_set_hides_everything() {
        let graph = graph();
        let filter = GraphFilter::with_types(Vec::<String>::new());
        let visibility = compute_visibility(&graph, &filter);
        assert_eq!(visibility.visible_node_count(), 0);
        assert_eq!(visibility.visible_edge_count(), 0);
    }

    #[test]
    fn test_hidden_bucket_hides_node_with_only_hidden_edges() {
        let graph = graph();
        let mut filter = GraphFilter::allow_all(&graph);
        filter.show_rejected = false;

        let visibility = compute_visibility(&graph, &filter);
        assert_eq!(visibility.visible_edge_count(), 1);
        // Page only has a rejected edge
        assert!(!visibility.is_node_visible(&NodeId::from_raw("Page::Runbook")));
        // Person has no edges at all and stays visible
        assert!(visibility.is_node_visible(&NodeId::from_raw("Person::alice")));
        assert!(visibility.is_node_visible(&NodeId::from_raw("Issue::SRE-1")));
    }

    #[test]
    fn test_disallowed_endpoint_hides_edge() {
        let graph = graph();
        let filter = GraphFilter::with_types(["Issue", "Page"]);

        let visibility = compute_visibility(&graph, &filter);
        assert_eq!(visibility.visible_edge_count(), 1);
        assert!(!visibility.is_node_visible(&NodeId::from_raw("Epic::EPIC-1")));
    }

    #[test]
    fn test_filter_does_not_mutate_graph() {
        let graph = graph();
        let before = graph.edge_count();
        let _ = compute_visibility(&graph, &GraphFilter::with_types(["Issue"]));
        let _ = compute_visibility(&graph, &GraphFilter::allow_all(&graph));
        assert_eq!(graph.edge_count(), before);
    }
}
