//! Ontolens Graph Model
//!
//! Builds the display graph the ontology view renders: entities become
//! nodes, raw relations are merged into display edges, and a visibility
//! projection and force-directed layout are derived from the result.
//!
//! # Pipeline
//!
//! ```text
//! entities ──► NodeRegistry ──┐
//!                             ├──► build_edges ──► OntologyGraph ──► ForceLayout
//! relations ──────────────────┘                          │
//!                                                        └──► compute_visibility
//! ```
//!
//! Every stage is a full rebuild. Nothing here patches a graph in place
//! after an evaluation changes; callers rebuild from fresh data instead.
//!
//! # Example
//!
//! ```
//! use ontolens_domain::{Entity, EntityRef, EvaluationStatus, Relation};
//! use ontolens_graph::{compute_visibility, GraphConfig, GraphFilter, OntologyGraph};
//!
//! let entities = vec![Entity::new("Issue", "SRE-1"), Entity::new("Epic", "EPIC-1")];
//! let relations = vec![Relation::new(
//!     "r1",
//!     EntityRef::new("Issue", "SRE-1"),
//!     EntityRef::new("Epic", "EPIC-1"),
//!     "belongs_to",
//! )
//! .with_status(EvaluationStatus::Accepted)];
//!
//! let graph = OntologyGraph::build(&entities, &relations, &GraphConfig::default());
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.edge_count(), 1);
//!
//! let visibility = compute_visibility(&graph, &GraphFilter::allow_all(&graph));
//! assert_eq!(visibility.visible_edge_count(), 1);
//! ```

#![warn(missing_docs)]

mod config;
mod diagnostics;
mod filter;
mod graph;
mod grouping;
mod layout;
mod registry;

pub use config::{GraphConfig, LayoutConfig};
pub use diagnostics::BuildDiagnostics;
pub use filter::{compute_visibility, GraphFilter, Visibility};
pub use graph::OntologyGraph;
pub use grouping::{build_edges, DisplayEdge, EdgeBuild, EdgeColor, EdgeKey, EdgeMember};
pub use layout::ForceLayout;
pub use registry::{GraphNode, NodeRegistry};
