//! Ontolens Domain Layer
//!
//! Value types for the ontology relation graph. This crate has no runtime
//! dependencies and performs no I/O; the graph, client and session crates
//! build on top of it.
//!
//! ## Key Concepts
//!
//! - **Entity**: a domain object identified by `(entity_type, primary_key)`
//! - **Relation**: a directed, named fact between two entities
//! - **Evaluation**: the pending/accepted/rejected/unsure judgment on a relation
//! - **Node id**: the deterministic string identity of an entity in the graph

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entity;
pub mod evaluation;
pub mod relation;

// Re-exports for convenience
pub use entity::{Entity, EntityRef, NodeId, PrimaryKey};
pub use evaluation::{Evaluation, EvaluationAction, EvaluationStatus, SyncStatus};
pub use relation::{PropertyMapping, Relation, RelationId};
