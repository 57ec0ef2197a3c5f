//! Ontolens Rust SDK
//!
//! Async client for the ontology service that owns entities, relations and
//! their evaluations. The [`OntologyBackend`] trait is the contract the rest
//! of the workspace codes against; [`OntologyClient`] implements it over HTTP.
//!
//! # Example
//!
//! ```no_run
//! use ontolens_sdk::{OntologyBackend, OntologyClient};
//!
//! # async fn run() -> Result<(), ontolens_sdk::SdkError> {
//! let client = OntologyClient::new("http://localhost:9446")?;
//!
//! let stats = client.graph_stats().await?;
//! println!("{} nodes, {} relations", stats.node_count, stats.relation_count);
//!
//! let entities = client.entities_batch(1000).await?;
//! let relations = client.relations_batch(1000).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod backend;
mod client;
mod error;
mod wire;

pub use backend::{AgentStatus, GraphStats, OntologyBackend, DEFAULT_BATCH_LIMIT};
pub use client::{ClientConfig, OntologyClient};
pub use error::SdkError;
