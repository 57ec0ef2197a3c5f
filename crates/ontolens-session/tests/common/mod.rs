//! In-memory ontology service shared by the session tests

#![allow(dead_code)]

use async_trait::async_trait;
use ontolens_domain::{
    Entity, EntityRef, Evaluation, EvaluationStatus, PropertyMapping, Relation, RelationId,
};
use ontolens_sdk::{AgentStatus, GraphStats, OntologyBackend, SdkError};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

#[derive(Default)]
struct MockState {
    entities: Vec<Entity>,
    relations: BTreeMap<RelationId, Relation>,
    heuristics: HashMap<RelationId, serde_json::Value>,
    agent_statuses: VecDeque<AgentStatus>,
    fail_actions: bool,
    fail_fetch: bool,
}

/// Hand-written backend with controllable failures and gates
///
/// A gate is a oneshot receiver; the next matching call waits on it before
/// completing.
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
    fetch_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    action_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    pub batch_calls: AtomicUsize,
    pub action_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two issues, one epic, one pending relation `r1` (issue → epic) and one
    /// pending relation `r2` (issue → issue)
    pub fn with_sample_ontology() -> Self {
        let backend = Self::new();
        backend.set_entities(vec![
            Entity::new("Issue", "SRE-1").with_property("title", ["Disk full"]),
            Entity::new("Issue", "SRE-2").with_property("title", ["Pager storm"]),
            Entity::new("Epic", "EPIC-1").with_property("name", ["Reliability"]),
        ]);
        backend.add_relation(Relation::new(
            "r1",
            EntityRef::new("Issue", "SRE-1"),
            EntityRef::new("Epic", "EPIC-1"),
            "belongs_to",
        ));
        backend.add_relation(Relation::new(
            "r2",
            EntityRef::new("Issue", "SRE-2"),
            EntityRef::new("Issue", "SRE-1"),
            "duplicates",
        ));
        backend
    }

    pub fn set_entities(&self, entities: Vec<Entity>) {
        self.state.lock().unwrap().entities = entities;
    }

    pub fn add_relation(&self, relation: Relation) {
        self.state
            .lock()
            .unwrap()
            .relations
            .insert(relation.relation_id.clone(), relation);
    }

    pub fn set_heuristics(&self, id: &str, value: serde_json::Value) {
        self.state
            .lock()
            .unwrap()
            .heuristics
            .insert(RelationId::from(id), value);
    }

    pub fn push_agent_status(&self, status: &str) {
        self.state.lock().unwrap().agent_statuses.push_back(AgentStatus {
            status: status.to_string(),
            message: None,
            progress: None,
        });
    }

    pub fn fail_actions(&self, fail: bool) {
        self.state.lock().unwrap().fail_actions = fail;
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.state.lock().unwrap().fail_fetch = fail;
    }

    pub fn gate_next_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.fetch_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn gate_next_action(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.action_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn stored_status(&self, id: &str) -> Option<EvaluationStatus> {
        self.state
            .lock()
            .unwrap()
            .relations
            .get(&RelationId::from(id))
            .map(Relation::status)
    }

    async fn wait_for(gates: &Mutex<VecDeque<oneshot::Receiver<()>>>) {
        let gate = gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }

    async fn act<F>(&self, id: &RelationId, apply: F) -> Result<(), SdkError>
    where
        F: FnOnce(&mut Relation) + Send,
    {
        self.action_calls.fetch_add(1, Ordering::SeqCst);
        Self::wait_for(&self.action_gates).await;

        let mut state = self.state.lock().unwrap();
        if state.fail_actions {
            return Err(SdkError::ApiError {
                status: 500,
                message: "evaluation service unavailable".to_string(),
            });
        }
        let relation = state.relations.get_mut(id).ok_or_else(|| SdkError::ApiError {
            status: 404,
            message: format!("relation {} not found", id),
        })?;
        apply(relation);
        Ok(())
    }

    fn check_fetch(&self) -> Result<(), SdkError> {
        if self.state.lock().unwrap().fail_fetch {
            return Err(SdkError::ConnectionError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OntologyBackend for MockBackend {
    async fn graph_stats(&self) -> Result<GraphStats, SdkError> {
        self.check_fetch()?;
        let state = self.state.lock().unwrap();
        Ok(GraphStats {
            node_count: state.entities.len() as u64,
            relation_count: state.relations.len() as u64,
        })
    }

    async fn entities_batch(&self, limit: usize) -> Result<Vec<Entity>, SdkError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fetch()?;
        let state = self.state.lock().unwrap();
        Ok(state.entities.iter().take(limit).cloned().collect())
    }

    async fn relations_batch(&self, limit: usize) -> Result<Vec<Relation>, SdkError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Self::wait_for(&self.fetch_gates).await;
        self.check_fetch()?;
        let state = self.state.lock().unwrap();
        Ok(state.relations.values().take(limit).cloned().collect())
    }

    async fn regenerate(&self) -> Result<(), SdkError> {
        let mut state = self.state.lock().unwrap();
        for relation in state.relations.values_mut() {
            relation.evaluation = Evaluation::pending();
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), SdkError> {
        let mut state = self.state.lock().unwrap();
        state.entities.clear();
        state.relations.clear();
        Ok(())
    }

    async fn evaluate_relation(&self, id: &RelationId) -> Result<(), SdkError> {
        self.act(id, |relation| {
            relation.evaluation.result = EvaluationStatus::Unsure;
            relation.evaluation.is_manual = false;
            relation.evaluation.justification = Some("Weak property overlap".to_string());
        })
        .await
    }

    async fn accept_relation(
        &self,
        id: &RelationId,
        justification: Option<&str>,
        property_mappings: &[PropertyMapping],
    ) -> Result<(), SdkError> {
        let justification = justification.map(str::to_string);
        let mappings = property_mappings.to_vec();
        self.act(id, move |relation| {
            relation.evaluation.result = EvaluationStatus::Accepted;
            relation.evaluation.is_manual = true;
            relation.evaluation.justification = justification;
            relation.property_mappings = mappings;
        })
        .await
    }

    async fn reject_relation(
        &self,
        id: &RelationId,
        justification: Option<&str>,
    ) -> Result<(), SdkError> {
        let justification = justification.map(str::to_string);
        self.act(id, move |relation| {
            relation.evaluation.result = EvaluationStatus::Rejected;
            relation.evaluation.is_manual = true;
            relation.evaluation.justification = justification;
        })
        .await
    }

    async fn undo_relation_evaluation(&self, id: &RelationId) -> Result<(), SdkError> {
        self.act(id, |relation| {
            relation.evaluation = Evaluation::pending();
        })
        .await
    }

    async fn sync_relation(&self, id: &RelationId) -> Result<(), SdkError> {
        self.act(id, |relation| {
            relation.evaluation.sync_status.is_synced = true;
            relation.evaluation.sync_status.last_synced = Some(1_714_565_100);
        })
        .await
    }

    async fn relation_heuristics(
        &self,
        ids: &[RelationId],
    ) -> Result<HashMap<RelationId, serde_json::Value>, SdkError> {
        let state = self.state.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| state.heuristics.get(id).map(|v| (id.clone(), v.clone())))
            .collect())
    }

    async fn relation_evaluations(
        &self,
        ids: &[RelationId],
    ) -> Result<HashMap<RelationId, Evaluation>, SdkError> {
        let state = self.state.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| {
                state
                    .relations
                    .get(id)
                    .map(|r| (id.clone(), r.evaluation.clone()))
            })
            .collect())
    }

    async fn agent_status(&self) -> Result<AgentStatus, SdkError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.agent_statuses.pop_front().unwrap_or(AgentStatus {
            status: "idle".to_string(),
            message: None,
            progress: None,
        }))
    }
}
