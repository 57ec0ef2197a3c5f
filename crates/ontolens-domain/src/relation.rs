//! Relation module - directed, named facts between entities

use crate::{EntityRef, Evaluation, EvaluationStatus};
use std::fmt;

/// Unique identifier of a raw relation, assigned by the backing service
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationId(String);

impl RelationId {
    /// Wrap a relation id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RelationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Correspondence between a property on the source entity and one on the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMapping {
    /// Property on the `from` entity
    pub source_property: String,

    /// Property on the `to` entity
    pub target_property: String,

    /// How the values matched (e.g. `exact`, `fuzzy`)
    pub match_type: String,
}

impl PropertyMapping {
    /// Create a new property mapping
    pub fn new(
        source_property: impl Into<String>,
        target_property: impl Into<String>,
        match_type: impl Into<String>,
    ) -> Self {
        Self {
            source_property: source_property.into(),
            target_property: target_property.into(),
            match_type: match_type.into(),
        }
    }
}

/// One directed edge fact between two entities
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    /// Unique id
    pub relation_id: RelationId,

    /// Source endpoint
    pub from_entity: EntityRef,

    /// Target endpoint
    pub to_entity: EntityRef,

    /// Relation name, e.g. `belongs_to`
    pub relation_name: String,

    /// Current evaluation as reported by the server
    pub evaluation: Evaluation,

    /// Property correspondences supporting the relation
    pub property_mappings: Vec<PropertyMapping>,
}

impl Relation {
    /// Create a pending relation with no property mappings
    pub fn new(
        relation_id: impl Into<RelationId>,
        from_entity: EntityRef,
        to_entity: EntityRef,
        relation_name: impl Into<String>,
    ) -> Self {
        Self {
            relation_id: relation_id.into(),
            from_entity,
            to_entity,
            relation_name: relation_name.into(),
            evaluation: Evaluation::pending(),
            property_mappings: Vec::new(),
        }
    }

    /// Builder-style helper to set the evaluation status
    pub fn with_status(mut self, status: EvaluationStatus) -> Self {
        self.evaluation.result = status;
        self
    }

    /// Current evaluation status
    pub fn status(&self) -> EvaluationStatus {
        self.evaluation.result
    }

    /// Whether both endpoints refer to the same entity
    pub fn is_self_loop(&self) -> bool {
        self.from_entity == self.to_entity
    }
}
