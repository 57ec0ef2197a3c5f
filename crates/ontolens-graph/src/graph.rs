//! The built ontology graph

use crate::config::GraphConfig;
use crate::diagnostics::BuildDiagnostics;
use crate::grouping::{build_edges, unique_relations, DisplayEdge, EdgeKey};
use crate::layout::ForceLayout;
use crate::registry::{GraphNode, NodeRegistry};
use ontolens_domain::{Entity, EvaluationStatus, NodeId, Relation, RelationId};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Nodes, display edges and the raw relations behind them
///
/// A graph is always built wholesale from entities and relations. It is never
/// patched after an evaluation changes: the caller fetches fresh data and
/// builds a new one.
#[derive(Debug, Clone, Default)]
pub struct OntologyGraph {
    nodes: BTreeMap<NodeId, GraphNode>,
    edges: BTreeMap<EdgeKey, DisplayEdge>,
    relations: BTreeMap<RelationId, Relation>,
    diagnostics: BuildDiagnostics,
}

impl OntologyGraph {
    /// A graph with no nodes or edges
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a graph from raw entities and relations
    ///
    /// Node positions are the registry's random starting positions; see
    /// [`OntologyGraph::build_with_layout`] to also run the force layout.
    pub fn build(entities: &[Entity], relations: &[Relation], config: &GraphConfig) -> Self {
        let mut registry = NodeRegistry::new(config.canvas_size, config.seed);
        for entity in entities {
            registry.upsert_entity(entity);
        }

        let edge_build = build_edges(relations, &registry);
        let diagnostics = BuildDiagnostics {
            malformed_entities: registry.malformed_count(),
            duplicate_entities: registry.duplicate_count(),
            unresolved_relations: edge_build.unresolved_relations,
            duplicate_relations: edge_build.duplicate_relations,
        };

        let mut graph = Self {
            nodes: registry.into_nodes(),
            edges: BTreeMap::new(),
            relations: BTreeMap::new(),
            diagnostics,
        };

        for edge in edge_build.edges {
            graph.insert_edge(edge);
        }

        let members: HashSet<&RelationId> = graph
            .edges
            .values()
            .flat_map(|edge| edge.members.iter().map(|m| &m.relation_id))
            .collect();
        let (unique, _) = unique_relations(relations);
        graph.relations = unique
            .into_iter()
            .filter(|(id, _)| members.contains(id))
            .map(|(id, relation)| (id.clone(), relation.clone()))
            .collect();

        graph.update_node_sizes(config.min_node_size, config.max_node_size);

        tracing::debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            relations = graph.relations.len(),
            malformed_entities = diagnostics.malformed_entities,
            duplicate_entities = diagnostics.duplicate_entities,
            unresolved_relations = diagnostics.unresolved_relations,
            duplicate_relations = diagnostics.duplicate_relations,
            "ontology graph built"
        );

        graph
    }

    /// Build a graph and, if enabled in the config, run the force layout
    pub fn build_with_layout(
        entities: &[Entity],
        relations: &[Relation],
        config: &GraphConfig,
    ) -> Self {
        let mut graph = Self::build(entities, relations, config);
        if config.layout.enabled {
            ForceLayout::new(config.layout.clone(), config.canvas_size).apply(&mut graph);
        }
        graph
    }

    /// Insert a display edge
    ///
    /// Returns `false` and leaves the graph untouched when an edge with the
    /// same key already exists.
    pub fn insert_edge(&mut self, edge: DisplayEdge) -> bool {
        if self.edges.contains_key(&edge.key) {
            return false;
        }
        self.edges.insert(edge.key.clone(), edge);
        true
    }

    /// Recompute node degrees and map them linearly onto `[min, max]`
    fn update_node_sizes(&mut self, min_size: f64, max_size: f64) {
        let mut degrees: BTreeMap<&NodeId, usize> = BTreeMap::new();
        for edge in self.edges.values() {
            *degrees.entry(&edge.source).or_insert(0) += 1;
            if !edge.is_self_loop() {
                *degrees.entry(&edge.target).or_insert(0) += 1;
            }
        }

        let max_degree = degrees.values().copied().max().unwrap_or(0);
        let degrees: BTreeMap<NodeId, usize> = degrees
            .into_iter()
            .map(|(id, degree)| (id.clone(), degree))
            .collect();

        for node in self.nodes.values_mut() {
            node.degree = degrees.get(&node.id).copied().unwrap_or(0);
            node.size = if max_degree == 0 {
                min_size
            } else {
                min_size + (node.degree as f64 / max_degree as f64) * (max_size - min_size)
            };
        }
    }

    /// Get a node by id
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Iterate over nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut GraphNode> {
        self.nodes.values_mut()
    }

    /// Get a display edge by key
    pub fn edge(&self, key: &EdgeKey) -> Option<&DisplayEdge> {
        self.edges.get(key)
    }

    /// Iterate over display edges in key order
    pub fn edges(&self) -> impl Iterator<Item = &DisplayEdge> {
        self.edges.values()
    }

    /// Edges touching a node
    pub fn edges_for_node<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a DisplayEdge> + 'a {
        self.edges.values().filter(move |edge| edge.touches(id))
    }

    /// The display edge a relation was grouped into
    pub fn edge_for_relation(&self, id: &RelationId) -> Option<&DisplayEdge> {
        self.edges.values().find(|edge| edge.contains_relation(id))
    }

    /// Get a raw relation by id (only relations that made it into an edge)
    pub fn relation(&self, id: &RelationId) -> Option<&Relation> {
        self.relations.get(id)
    }

    /// Iterate over raw relations in id order
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    /// Current evaluation status of a relation
    pub fn relation_status(&self, id: &RelationId) -> Option<EvaluationStatus> {
        self.relations.get(id).map(Relation::status)
    }

    /// Distinct entity types present in the graph
    pub fn entity_types(&self) -> BTreeSet<String> {
        self.nodes.values().map(|n| n.entity_type.clone()).collect()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of display edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of raw relations behind the display edges
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// What the build skipped or merged
    pub fn diagnostics(&self) -> &BuildDiagnostics {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontolens_domain::EntityRef;

    fn config() -> GraphConfig {
        GraphConfig::default().with_seed(5).without_layout()
    }

    #[test]
    fn test_node_sizes_follow_degree() {
        let entities = vec![
            Entity::new("Issue", "A"),
            Entity::new("Issue", "B"),
            Entity::new("Issue", "C"),
            Entity::new("Issue", "D"),
        ];
        let relations = vec![
            Relation::new("r1", EntityRef::new("Issue", "A"), EntityRef::new("Issue", "B"), "blocks"),
            Relation::new("r2", EntityRef::new("Issue", "A"), EntityRef::new("Issue", "C"), "blocks"),
        ];

        let graph = OntologyGraph::build(&entities, &relations, &config());
        let a = graph.node(&NodeId::from_raw("Issue::A")).unwrap();
        let b = graph.node(&NodeId::from_raw("Issue::B")).unwrap();
        let d = graph.node(&NodeId::from_raw("Issue::D")).unwrap();

        assert_eq!(a.degree, 2);
        assert_eq!(a.size, 16.0);
        assert_eq!(b.degree, 1);
        assert_eq!(b.size, 10.0);
        assert_eq!(d.degree, 0);
        assert_eq!(d.size, 4.0);
    }

    #[test]
    fn test_isolated_nodes_get_min_size() {
        let graph = OntologyGraph::build(&[Entity::new("Issue", "A")], &[], &config());
        assert_eq!(graph.nodes().next().unwrap().size, 4.0);
    }

    #[test]
    fn test_insert_existing_edge_is_noop() {
        let entities = vec![Entity::new("Issue", "A"), Entity::new("Issue", "B")];
        let relations = vec![Relation::new(
            "r1",
            EntityRef::new("Issue", "A"),
            EntityRef::new("Issue", "B"),
            "blocks",
        )];

        let mut graph = OntologyGraph::build(&entities, &relations, &config());
        let mut edge = graph.edges().next().unwrap().clone();
        edge.label = "changed".to_string();

        assert!(!graph.insert_edge(edge));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges().next().unwrap().label, "blocks");
    }

    #[test]
    fn test_relation_lookup() {
        let entities = vec![Entity::new("Issue", "A"), Entity::new("Issue", "B")];
        let relations = vec![
            Relation::new("r1", EntityRef::new("Issue", "A"), EntityRef::new("Issue", "B"), "blocks")
                .with_status(EvaluationStatus::Rejected),
            Relation::new("r2", EntityRef::new("Issue", "A"), EntityRef::new("Issue", "Z"), "blocks"),
        ];

        let graph = OntologyGraph::build(&entities, &relations, &config());
        let r1 = RelationId::from("r1");
        assert_eq!(graph.relation_status(&r1), Some(EvaluationStatus::Rejected));
        assert!(graph.edge_for_relation(&r1).is_some());
        assert!(graph.relation(&RelationId::from("r2")).is_none());
        assert_eq!(graph.diagnostics().unresolved_relations, 1);
    }

    #[test]
    fn test_entity_types() {
        let entities = vec![Entity::new("Issue", "A"), Entity::new("Epic", "E")];
        let graph = OntologyGraph::build(&entities, &[], &config());
        let types: Vec<String> = graph.entity_types().into_iter().collect();
        assert_eq!(types, vec!["Epic".to_string(), "Issue".to_string()]);
    }
}
