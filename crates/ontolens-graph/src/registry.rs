//! Entity/node registry

use ontolens_domain::{Entity, EntityRef, NodeId, PrimaryKey};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// A node in the display graph, one per distinct `(entity_type, primary_key)`
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    /// Deterministic node id
    pub id: NodeId,

    /// Entity type tag
    pub entity_type: String,

    /// Primary key of the entity
    pub primary_key: PrimaryKey,

    /// Display label
    pub label: String,

    /// Entity properties (multi-valued)
    pub properties: BTreeMap<String, Vec<String>>,

    /// Horizontal position
    pub x: f64,

    /// Vertical position
    pub y: f64,

    /// Number of distinct display edges touching this node
    pub degree: usize,

    /// Visual size derived from degree
    pub size: f64,
}

/// Maps entities to unique nodes
///
/// Inserting the same `(entity_type, primary_key)` twice is a no-op, and
/// malformed entities are skipped. Neither case is an error; both are
/// counted for diagnostics.
pub struct NodeRegistry {
    nodes: BTreeMap<NodeId, GraphNode>,
    rng: StdRng,
    canvas_size: f64,
    malformed: usize,
    duplicates: usize,
}

impl NodeRegistry {
    /// Create an empty registry placing new nodes on a square canvas
    ///
    /// With a seed, initial positions are reproducible.
    pub fn new(canvas_size: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            nodes: BTreeMap::new(),
            rng,
            canvas_size,
            malformed: 0,
            duplicates: 0,
        }
    }

    /// Insert an entity, returning its node id
    ///
    /// Returns `None` only for malformed entities (missing type or key).
    ///
    /// # Examples
    ///
    /// ```
    /// use ontolens_domain::Entity;
    /// use ontolens_graph::NodeRegistry;
    ///
    /// let mut registry = NodeRegistry::new(100.0, Some(1));
    /// let a = registry.upsert_entity(&Entity::new("Issue", "SRE-1"));
    /// let b = registry.upsert_entity(&Entity::new("Issue", "SRE-1"));
    /// assert_eq!(a, b);
    /// assert_eq!(registry.len(), 1);
    /// ```
    pub fn upsert_entity(&mut self, entity: &Entity) -> Option<NodeId> {
        if !entity.is_well_formed() {
            self.malformed += 1;
            tracing::trace!(
                entity_type = %entity.entity_type,
                primary_key = %entity.primary_key,
                "skipping malformed entity"
            );
            return None;
        }

        let id = entity.node_id();
        if self.nodes.contains_key(&id) {
            self.duplicates += 1;
            return Some(id);
        }

        let (x, y) = self.random_position();
        self.nodes.insert(
            id.clone(),
            GraphNode {
                id: id.clone(),
                entity_type: entity.entity_type.clone(),
                primary_key: entity.primary_key.clone(),
                label: entity.display_name(),
                properties: entity.properties.clone(),
                x,
                y,
                degree: 0,
                size: 0.0,
            },
        );

        Some(id)
    }

    /// Resolve a relation endpoint to a registered node id
    pub fn resolve(&self, entity: &EntityRef) -> Option<NodeId> {
        let id = entity.node_id();
        self.nodes.contains_key(&id).then_some(id)
    }

    /// Whether a node id is registered
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Get a node by id
    pub fn get(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Number of registered nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no nodes are registered
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Number of malformed entities skipped so far
    pub fn malformed_count(&self) -> usize {
        self.malformed
    }

    /// Number of duplicate insertions ignored so far
    pub fn duplicate_count(&self) -> usize {
        self.duplicates
    }

    /// Consume the registry, yielding its nodes
    pub fn into_nodes(self) -> BTreeMap<NodeId, GraphNode> {
        self.nodes
    }

    fn random_position(&mut self) -> (f64, f64) {
        let half = self.canvas_size / 2.0;
        let x = self.rng.gen::<f64>() * self.canvas_size - half;
        let y = self.rng.gen::<f64>() * self.canvas_size - half;
        (x, y)
    }
}
