//! HTTP implementation of [`OntologyBackend`].

use crate::backend::{AgentStatus, GraphStats, OntologyBackend};
use crate::error::SdkError;
use crate::wire::{
    decode_evaluations, decode_items, AcceptRequest, EntitiesResponse, EvaluationsResponse,
    HeuristicsResponse, RejectRequest, RelationIdsRequest, RelationsResponse, WireEntity,
    WirePropertyMapping, WireRelation,
};
use async_trait::async_trait;
use ontolens_domain::{Entity, Evaluation, EvaluationAction, PropertyMapping, Relation, RelationId};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Connection settings for [`OntologyClient`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service base URL, e.g. `http://localhost:9446`
    pub base_url: String,

    /// Bearer token sent with every request
    #[serde(default)]
    pub api_token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Settings for `base_url` with no token and the default timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Attach a bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

/// Ontology service client
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct OntologyClient {
    http: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl OntologyClient {
    /// Create a client for `base_url` with default settings
    pub fn new(base_url: &str) -> Result<Self, SdkError> {
        Self::with_config(ClientConfig::new(base_url))
    }

    /// Create a client from explicit settings
    pub fn with_config(config: ClientConfig) -> Result<Self, SdkError> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| SdkError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SdkError::InvalidUrl(config.base_url));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SdkError::ConnectionError(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            api_token: config.api_token.filter(|t| !t.is_empty()),
        })
    }

    /// The base URL requests are resolved against
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url(&self, segments: &[&str]) -> Result<Url, SdkError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SdkError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, SdkError> {
        let url = self.url(segments)?;
        tracing::debug!(%method, %url, "ontology request");
        let builder = self.http.request(method, url);
        Ok(match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, SdkError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            body
        };
        tracing::warn!(status = status.as_u16(), %message, "ontology service returned an error");
        Err(SdkError::ApiError {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        limit: Option<usize>,
    ) -> Result<T, SdkError> {
        let mut builder = self.request(Method::GET, segments)?;
        if let Some(limit) = limit {
            builder = builder.query(&[("limit", limit)]);
        }
        let bytes = self.send(builder).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, SdkError> {
        let builder = self.request(Method::POST, segments)?.json(body);
        let bytes = self.send(builder).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn fire(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<serde_json::Value>,
    ) -> Result<(), SdkError> {
        let mut builder = self.request(method, segments)?;
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        self.send(builder).await?;
        Ok(())
    }

    async fn relation_action(
        &self,
        id: &RelationId,
        action: EvaluationAction,
        body: Option<serde_json::Value>,
    ) -> Result<(), SdkError> {
        self.fire(
            Method::POST,
            &["ontology", "relations", id.as_str(), action.as_str()],
            body,
        )
        .await
    }
}

fn id_strs(ids: &[RelationId]) -> RelationIdsRequest<'_> {
    RelationIdsRequest {
        relation_ids: ids.iter().map(RelationId::as_str).collect(),
    }
}

#[async_trait]
impl OntologyBackend for OntologyClient {
    async fn graph_stats(&self) -> Result<GraphStats, SdkError> {
        self.get_json(&["ontology", "graph", "stats"], None).await
    }

    async fn entities_batch(&self, limit: usize) -> Result<Vec<Entity>, SdkError> {
        let response: EntitiesResponse = self
            .get_json(&["ontology", "graph", "entities"], Some(limit))
            .await?;
        let (entities, skipped) = decode_items::<WireEntity, Entity>(response.entities);
        if skipped > 0 {
            tracing::warn!(skipped, "skipped undecodable entities");
        }
        Ok(entities)
    }

    async fn relations_batch(&self, limit: usize) -> Result<Vec<Relation>, SdkError> {
        let response: RelationsResponse = self
            .get_json(&["ontology", "graph", "relations"], Some(limit))
            .await?;
        let (relations, skipped) = decode_items::<WireRelation, Relation>(response.relations);
        if skipped > 0 {
            tracing::warn!(skipped, "skipped undecodable relations");
        }
        Ok(relations)
    }

    async fn regenerate(&self) -> Result<(), SdkError> {
        self.fire(Method::POST, &["ontology", "regenerate"], None).await
    }

    async fn clear(&self) -> Result<(), SdkError> {
        self.fire(Method::DELETE, &["ontology", "graph"], None).await
    }

    async fn evaluate_relation(&self, id: &RelationId) -> Result<(), SdkError> {
        self.relation_action(id, EvaluationAction::Evaluate, None).await
    }

    async fn accept_relation(
        &self,
        id: &RelationId,
        justification: Option<&str>,
        property_mappings: &[PropertyMapping],
    ) -> Result<(), SdkError> {
        let body = serde_json::to_value(AcceptRequest {
            justification,
            property_mappings: property_mappings
                .iter()
                .map(WirePropertyMapping::from)
                .collect(),
        })?;
        self.relation_action(id, EvaluationAction::Accept, Some(body))
            .await
    }

    async fn reject_relation(
        &self,
        id: &RelationId,
        justification: Option<&str>,
    ) -> Result<(), SdkError> {
        let body = serde_json::to_value(RejectRequest { justification })?;
        self.relation_action(id, EvaluationAction::Reject, Some(body))
            .await
    }

    async fn undo_relation_evaluation(&self, id: &RelationId) -> Result<(), SdkError> {
        self.relation_action(id, EvaluationAction::Undo, None).await
    }

    async fn sync_relation(&self, id: &RelationId) -> Result<(), SdkError> {
        self.relation_action(id, EvaluationAction::Sync, None).await
    }

    async fn relation_heuristics(
        &self,
        ids: &[RelationId],
    ) -> Result<HashMap<RelationId, serde_json::Value>, SdkError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let response: HeuristicsResponse = self
            .post_json(&["ontology", "relations", "heuristics", "batch"], &id_strs(ids))
            .await?;
        Ok(response
            .into_iter()
            .map(|(id, value)| (RelationId::new(id), value))
            .collect())
    }

    async fn relation_evaluations(
        &self,
        ids: &[RelationId],
    ) -> Result<HashMap<RelationId, Evaluation>, SdkError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let response: EvaluationsResponse = self
            .post_json(&["ontology", "relations", "evaluations", "batch"], &id_strs(ids))
            .await?;
        Ok(decode_evaluations(response))
    }

    async fn agent_status(&self) -> Result<AgentStatus, SdkError> {
        self.get_json(&["ontology", "agent", "status"], None).await
    }
}
