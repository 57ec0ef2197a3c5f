//! The graph session: one published graph view plus the bookkeeping that
//! keeps it consistent with the ontology service.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::inflight::InFlight;
use crate::metrics::SessionMetrics;
use ontolens_domain::{Evaluation, EvaluationAction, PropertyMapping, Relation, RelationId};
use ontolens_graph::{compute_visibility, GraphFilter, GraphNode, OntologyGraph, Visibility};
use ontolens_sdk::{AgentStatus, GraphStats, OntologyBackend, SdkError};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Progress of the most recent refresh
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing has been requested yet
    #[default]
    Idle,
    /// A refresh is running
    Loading,
    /// The latest refresh was published
    Ready,
    /// The latest refresh failed; the previous graph, if any, is kept
    Failed(String),
}

/// What happened to a refresh's result
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The graph was published
    Applied(Arc<OntologyGraph>),
    /// A newer refresh was already published, or the session closed
    Discarded,
}

impl RefreshOutcome {
    /// Whether the result was published
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied(_))
    }
}

/// Result of a successful evaluation action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// The relation acted on
    pub relation_id: RelationId,
    /// The action performed
    pub action: EvaluationAction,
    /// Whether the follow-up refresh published a new graph
    pub refreshed: bool,
}

/// Everything known about one relation
#[derive(Debug, Clone)]
pub struct RelationDetails {
    /// The relation as found in the published graph
    pub relation: Relation,
    /// Node the relation starts from
    pub source: Option<GraphNode>,
    /// Node the relation points to
    pub target: Option<GraphNode>,
    /// Supporting evidence reported by the service
    pub heuristics: Option<serde_json::Value>,
    /// Latest evaluation record reported by the service
    pub evaluation: Option<Evaluation>,
}

#[derive(Debug, Default)]
struct SessionState {
    graph: Option<Arc<OntologyGraph>>,
    applied_generation: u64,
    load_state: LoadState,
    metrics: SessionMetrics,
}

/// Owner of one ontology graph view
///
/// All methods take `&self` so a session can be shared between tasks. Each
/// refresh takes a new generation number and its result is published only if
/// no newer refresh has been published first. Evaluation actions never edit
/// the graph locally: on success the session re-fetches and rebuilds.
///
/// # Examples
///
/// ```no_run
/// use ontolens_sdk::OntologyClient;
/// use ontolens_session::{GraphSession, SessionConfig};
/// use ontolens_domain::RelationId;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OntologyClient::new("http://localhost:9446")?;
/// let session = GraphSession::new(client, SessionConfig::default());
///
/// session.refresh().await?;
/// let outcome = session.accept(&RelationId::from("r1"), None, &[]).await?;
/// assert!(outcome.refreshed);
/// # Ok(())
/// # }
/// ```
pub struct GraphSession<B> {
    backend: B,
    config: SessionConfig,
    state: RwLock<SessionState>,
    generation: AtomicU64,
    closed: AtomicBool,
    inflight: InFlight,
}

impl<B: OntologyBackend> GraphSession<B> {
    /// Create a session with no graph loaded
    pub fn new(backend: B, config: SessionConfig) -> Self {
        Self {
            backend,
            config,
            state: RwLock::new(SessionState::default()),
            generation: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            inflight: InFlight::default(),
        }
    }

    /// The backend this session talks to
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Session settings
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        Ok(())
    }

    /// The currently published graph
    pub fn graph(&self) -> Option<Arc<OntologyGraph>> {
        self.read().graph.clone()
    }

    /// Progress of the latest refresh
    pub fn load_state(&self) -> LoadState {
        self.read().load_state.clone()
    }

    /// Generation of the published graph (0 before the first publish)
    pub fn applied_generation(&self) -> u64 {
        self.read().applied_generation
    }

    /// Snapshot of session counters
    pub fn metrics(&self) -> SessionMetrics {
        self.read().metrics.clone()
    }

    /// Whether an action on `id` is running
    pub fn is_in_flight(&self, id: &RelationId) -> bool {
        self.inflight.contains(id)
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Tear the session down; results that arrive afterwards are dropped
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::info!("graph session closed");
        }
    }

    /// Visibility of the published graph under `filter`
    pub fn visibility(&self, filter: &GraphFilter) -> Option<Visibility> {
        self.graph().map(|graph| compute_visibility(&graph, filter))
    }

    /// Size of the stored ontology, straight from the service
    pub async fn stats(&self) -> Result<GraphStats, SessionError> {
        self.ensure_open()?;
        Ok(self.backend.graph_stats().await?)
    }

    /// Background agent activity, straight from the service
    pub async fn agent_status(&self) -> Result<AgentStatus, SessionError> {
        self.ensure_open()?;
        Ok(self.backend.agent_status().await?)
    }

    /// Re-fetch entities and relations and rebuild the graph
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] after [`close`](Self::close) and
    /// [`SessionError::Backend`] when a fetch fails. On failure the previously
    /// published graph stays in place.
    pub async fn refresh(&self) -> Result<RefreshOutcome, SessionError> {
        self.ensure_open()?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.write().load_state = LoadState::Loading;

        match self.fetch_graph().await {
            Ok(graph) => Ok(self.publish(generation, graph)),
            Err(e) => {
                let mut state = self.write();
                state.metrics.refreshes_failed += 1;
                if generation == self.generation.load(Ordering::SeqCst) && !self.is_closed() {
                    state.load_state = LoadState::Failed(e.to_string());
                }
                tracing::warn!(generation, error = %e, "graph refresh failed");
                Err(e.into())
            }
        }
    }

    async fn fetch_graph(&self) -> Result<OntologyGraph, SdkError> {
        let stats = self.backend.graph_stats().await?;
        if stats.node_count == 0 {
            tracing::debug!("service reports an empty ontology; skipping batch fetch");
            return Ok(OntologyGraph::empty());
        }

        let limit = self.config.batch_limit;
        let (entities, relations) = tokio::try_join!(
            self.backend.entities_batch(limit),
            self.backend.relations_batch(limit)
        )?;

        if entities.len() >= limit || relations.len() >= limit {
            tracing::warn!(
                limit,
                entities = entities.len(),
                relations = relations.len(),
                "batch limit reached, graph may be incomplete"
            );
        }

        Ok(OntologyGraph::build_with_layout(
            &entities,
            &relations,
            &self.config.graph,
        ))
    }

    fn publish(&self, generation: u64, graph: OntologyGraph) -> RefreshOutcome {
        let mut state = self.write();
        if self.is_closed() || generation <= state.applied_generation {
            state.metrics.refreshes_discarded += 1;
            tracing::debug!(
                generation,
                applied = state.applied_generation,
                closed = self.is_closed(),
                "discarding stale graph"
            );
            return RefreshOutcome::Discarded;
        }

        let graph = Arc::new(graph);
        state.graph = Some(Arc::clone(&graph));
        state.applied_generation = generation;
        state.metrics.refreshes_applied += 1;
        if generation == self.generation.load(Ordering::SeqCst) {
            state.load_state = LoadState::Ready;
        }
        tracing::info!(
            generation,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            relations = graph.relation_count(),
            "graph published"
        );
        RefreshOutcome::Applied(graph)
    }

    fn check_known(&self, id: &RelationId) -> Result<(), SessionError> {
        match self.graph() {
            Some(graph) if graph.relation(id).is_none() => {
                Err(SessionError::UnknownRelation(id.clone()))
            }
            _ => Ok(()),
        }
    }

    async fn run_action<F, Fut>(
        &self,
        id: &RelationId,
        action: EvaluationAction,
        call: F,
    ) -> Result<ActionOutcome, SessionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), SdkError>>,
    {
        self.ensure_open()?;
        self.check_known(id)?;
        let _guard = self.inflight.acquire(id)?;

        tracing::info!(relation_id = %id, %action, "relation action started");
        if let Err(e) = call().await {
            tracing::error!(relation_id = %id, %action, error = %e, "relation action failed");
            self.write().metrics.record_action(action, false);
            return Err(e.into());
        }
        self.write().metrics.record_action(action, true);

        let refreshed = match self.refresh().await {
            Ok(outcome) => outcome.is_applied(),
            Err(e) => {
                tracing::warn!(relation_id = %id, %action, error = %e, "refresh after action failed");
                false
            }
        };

        Ok(ActionOutcome {
            relation_id: id.clone(),
            action,
            refreshed,
        })
    }

    /// Ask the service to re-run automatic evaluation of a relation
    pub async fn evaluate(&self, id: &RelationId) -> Result<ActionOutcome, SessionError> {
        self.run_action(id, EvaluationAction::Evaluate, || {
            self.backend.evaluate_relation(id)
        })
        .await
    }

    /// Mark a relation accepted, optionally recording property mappings
    pub async fn accept(
        &self,
        id: &RelationId,
        justification: Option<&str>,
        property_mappings: &[PropertyMapping],
    ) -> Result<ActionOutcome, SessionError> {
        self.run_action(id, EvaluationAction::Accept, || {
            self.backend
                .accept_relation(id, justification, property_mappings)
        })
        .await
    }

    /// Mark a relation rejected
    pub async fn reject(
        &self,
        id: &RelationId,
        justification: Option<&str>,
    ) -> Result<ActionOutcome, SessionError> {
        self.run_action(id, EvaluationAction::Reject, || {
            self.backend.reject_relation(id, justification)
        })
        .await
    }

    /// Return a relation to pending
    pub async fn undo(&self, id: &RelationId) -> Result<ActionOutcome, SessionError> {
        self.run_action(id, EvaluationAction::Undo, || {
            self.backend.undo_relation_evaluation(id)
        })
        .await
    }

    /// Push a relation's evaluation to the downstream graph store
    pub async fn sync(&self, id: &RelationId) -> Result<ActionOutcome, SessionError> {
        self.run_action(id, EvaluationAction::Sync, || self.backend.sync_relation(id))
            .await
    }

    /// Rebuild the ontology on the service, then refresh
    ///
    /// Returns whether the follow-up refresh published a graph.
    pub async fn regenerate(&self) -> Result<bool, SessionError> {
        self.ensure_open()?;
        self.backend.regenerate().await.inspect_err(|e| {
            tracing::error!(error = %e, "ontology regeneration failed");
        })?;
        tracing::info!("ontology regeneration requested");
        Ok(self.refresh_after("regenerate").await)
    }

    /// Delete the ontology on the service, then refresh
    ///
    /// Returns whether the follow-up refresh published a graph.
    pub async fn clear(&self) -> Result<bool, SessionError> {
        self.ensure_open()?;
        self.backend.clear().await.inspect_err(|e| {
            tracing::error!(error = %e, "ontology clear failed");
        })?;
        tracing::info!("ontology cleared");
        Ok(self.refresh_after("clear").await)
    }

    async fn refresh_after(&self, operation: &'static str) -> bool {
        match self.refresh().await {
            Ok(outcome) => outcome.is_applied(),
            Err(e) => {
                tracing::warn!(operation, error = %e, "refresh after operation failed");
                false
            }
        }
    }

    /// Relation plus the service's heuristics and evaluation record
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownRelation`] when no published graph contains `id`.
    pub async fn relation_details(&self, id: &RelationId) -> Result<RelationDetails, SessionError> {
        self.ensure_open()?;
        let graph = self
            .graph()
            .ok_or_else(|| SessionError::UnknownRelation(id.clone()))?;
        let relation = graph
            .relation(id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownRelation(id.clone()))?;

        let ids = std::slice::from_ref(id);
        let (mut heuristics, mut evaluations) = tokio::try_join!(
            self.backend.relation_heuristics(ids),
            self.backend.relation_evaluations(ids)
        )?;

        Ok(RelationDetails {
            source: graph.node(&relation.from_entity.node_id()).cloned(),
            target: graph.node(&relation.to_entity.node_id()).cloned(),
            heuristics: heuristics.remove(id),
            evaluation: evaluations.remove(id),
            relation,
        })
    }
}
