//! Error types for graph sessions

use ontolens_domain::RelationId;
use ontolens_sdk::SdkError;
use thiserror::Error;

/// Errors that can occur while loading the graph or acting on relations
#[derive(Error, Debug)]
pub enum SessionError {
    /// The ontology service call failed
    #[error("Backend error: {0}")]
    Backend(#[from] SdkError),

    /// Another action on the same relation has not finished yet
    #[error("An action is already in flight for relation {0}")]
    ActionInFlight(RelationId),

    /// The session was closed
    #[error("Session is closed")]
    Closed,

    /// The relation is not part of the current graph
    #[error("Unknown relation: {0}")]
    UnknownRelation(RelationId),
}
