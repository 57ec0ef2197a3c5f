//! Ontolens graph sessions
//!
//! A [`GraphSession`] owns one ontology graph view on top of an
//! [`OntologyBackend`](ontolens_sdk::OntologyBackend): it loads entities and
//! relations, builds the display graph and runs evaluation actions against the
//! service.
//!
//! # Consistency rules
//!
//! - The service is the source of truth. Actions never edit the local graph;
//!   a successful action triggers a full refresh.
//! - Each refresh takes a generation number. Results older than the published
//!   graph are discarded.
//! - At most one action per relation id runs at a time
//!   ([`SessionError::ActionInFlight`]).
//! - After [`GraphSession::close`] nothing is published.
//!
//! # Usage
//!
//! ```no_run
//! use ontolens_domain::RelationId;
//! use ontolens_graph::GraphFilter;
//! use ontolens_sdk::OntologyClient;
//! use ontolens_session::{GraphSession, SessionConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let session = GraphSession::new(
//!     OntologyClient::new("http://localhost:9446")?,
//!     SessionConfig::default(),
//! );
//!
//! session.refresh().await?;
//! if let Some(graph) = session.graph() {
//!     let filter = GraphFilter::allow_all(&graph);
//!     let visible = session.visibility(&filter).map(|v| v.visible_edge_count());
//!     println!("{} edges, {:?} visible", graph.edge_count(), visible);
//! }
//!
//! session.reject(&RelationId::from("r7"), Some("Names only look alike")).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod inflight;
mod metrics;
mod poller;
mod session;

pub use config::SessionConfig;
pub use error::SessionError;
pub use metrics::SessionMetrics;
pub use poller::AgentStatusPoller;
pub use session::{ActionOutcome, GraphSession, LoadState, RefreshOutcome, RelationDetails};
