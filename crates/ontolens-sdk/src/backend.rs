//! The ontology service contract

use crate::error::SdkError;
use async_trait::async_trait;
use ontolens_domain::{Entity, Evaluation, PropertyMapping, Relation, RelationId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Batch size used when the caller has no preference
pub const DEFAULT_BATCH_LIMIT: usize = 1000;

/// Size of the stored ontology graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of entities
    #[serde(default)]
    pub node_count: u64,

    /// Number of relations
    #[serde(default)]
    pub relation_count: u64,
}

/// Activity of the background ontology agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    /// Agent state, e.g. `idle` or `running`
    pub status: String,

    /// Optional human readable detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Optional progress in `[0, 1]` or percent, as reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

impl AgentStatus {
    /// Whether the agent reports being busy
    pub fn is_active(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "running" | "processing" | "evaluating" | "regenerating" | "busy"
        )
    }
}

/// Operations offered by the ontology service
///
/// Implemented over HTTP by [`OntologyClient`](crate::OntologyClient).
/// Evaluation actions return nothing: the service is the source of truth and
/// callers re-fetch the graph to observe the result.
#[async_trait]
pub trait OntologyBackend: Send + Sync {
    /// Cheap existence/size check
    async fn graph_stats(&self) -> Result<GraphStats, SdkError>;

    /// Fetch up to `limit` entities
    async fn entities_batch(&self, limit: usize) -> Result<Vec<Entity>, SdkError>;

    /// Fetch up to `limit` relations
    async fn relations_batch(&self, limit: usize) -> Result<Vec<Relation>, SdkError>;

    /// Rebuild the ontology from the knowledge base
    async fn regenerate(&self) -> Result<(), SdkError>;

    /// Delete the whole ontology
    async fn clear(&self) -> Result<(), SdkError>;

    /// Request a fresh automatic evaluation
    async fn evaluate_relation(&self, id: &RelationId) -> Result<(), SdkError>;

    /// Force a relation to accepted
    async fn accept_relation(
        &self,
        id: &RelationId,
        justification: Option<&str>,
        property_mappings: &[PropertyMapping],
    ) -> Result<(), SdkError>;

    /// Force a relation to rejected
    async fn reject_relation(
        &self,
        id: &RelationId,
        justification: Option<&str>,
    ) -> Result<(), SdkError>;

    /// Return a relation to pending
    async fn undo_relation_evaluation(&self, id: &RelationId) -> Result<(), SdkError>;

    /// Persist a relation's evaluation to the downstream graph store
    async fn sync_relation(&self, id: &RelationId) -> Result<(), SdkError>;

    /// Supporting heuristics, keyed by relation id
    async fn relation_heuristics(
        &self,
        ids: &[RelationId],
    ) -> Result<HashMap<RelationId, serde_json::Value>, SdkError>;

    /// Evaluation records, keyed by relation id
    async fn relation_evaluations(
        &self,
        ids: &[RelationId],
    ) -> Result<HashMap<RelationId, Evaluation>, SdkError>;

    /// Background agent activity
    async fn agent_status(&self) -> Result<AgentStatus, SdkError>;
}

#[async_trait]
impl<B: OntologyBackend + ?Sized> OntologyBackend for Arc<B> {
    async fn graph_stats(&self) -> Result<GraphStats, SdkError> {
        (**self).graph_stats().await
    }

    async fn entities_batch(&self, limit: usize) -> Result<Vec<Entity>, SdkError> {
        (**self).entities_batch(limit).await
    }

    async fn relations_batch(&self, limit: usize) -> Result<Vec<Relation>, SdkError> {
        (**self).relations_batch(limit).await
    }

    async fn regenerate(&self) -> Result<(), SdkError> {
        (**self).regenerate().await
    }

    async fn clear(&self) -> Result<(), SdkError> {
        (**self).clear().await
    }

    async fn evaluate_relation(&self, id: &RelationId) -> Result<(), SdkError> {
        (**self).evaluate_relation(id).await
    }

    async fn accept_relation(
        &self,
        id: &RelationId,
        justification: Option<&str>,
        property_mappings: &[PropertyMapping],
    ) -> Result<(), SdkError> {
        (**self)
            .accept_relation(id, justification, property_mappings)
            .await
    }

    async fn reject_relation(
        &self,
        id: &RelationId,
        justification: Option<&str>,
    ) -> Result<(), SdkError> {
        (**self).reject_relation(id, justification).await
    }

    async fn undo_relation_evaluation(&self, id: &RelationId) -> Result<(), SdkError> {
        (**self).undo_relation_evaluation(id).await
    }

    async fn sync_relation(&self, id: &RelationId) -> Result<(), SdkError> {
        (**self).sync_relation(id).await
    }

    async fn relation_heuristics(
        &self,
        ids: &[RelationId],
    ) -> Result<HashMap<RelationId, serde_json::Value>, SdkError> {
        (**self).relation_heuristics(ids).await
    }

    async fn relation_evaluations(
        &self,
        ids: &[RelationId],
    ) -> Result<HashMap<RelationId, Evaluation>, SdkError> {
        (**self).relation_evaluations(ids).await
    }

    async fn agent_status(&self) -> Result<AgentStatus, SdkError> {
        (**self).agent_status().await
    }
}
