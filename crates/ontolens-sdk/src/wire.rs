//! JSON shapes exchanged with the ontology service and their conversion
//! into domain types.
//!
//! Decoding is lenient: batch items are decoded one at a time and an item
//! that cannot be read is skipped instead of failing the whole batch.

use chrono::{DateTime, NaiveDateTime};
use ontolens_domain::{
    Entity, EntityRef, Evaluation, EvaluationStatus, PrimaryKey, PropertyMapping, Relation,
    RelationId, SyncStatus,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Formats tried for timestamps that carry no offset (read as UTC)
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Decode batch items one by one, returning the decoded values and the
/// number of items skipped
pub(crate) fn decode_items<W, T>(items: Vec<Value>) -> (Vec<T>, usize)
where
    W: DeserializeOwned,
    T: From<W>,
{
    let mut skipped = 0;
    let decoded = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<W>(item) {
            Ok(wire) => Some(T::from(wire)),
            Err(e) => {
                skipped += 1;
                tracing::debug!(error = %e, "skipping undecodable item");
                None
            }
        })
        .collect();
    (decoded, skipped)
}

/// String form of a scalar; `None` for nulls, arrays and objects
fn scalar(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A primary key as reported: a scalar or an ordered list of scalar parts
///
/// Anything else becomes an empty key, which the registry counts as
/// malformed.
fn primary_key(value: Option<Value>) -> PrimaryKey {
    match value {
        Some(Value::Array(parts)) => PrimaryKey::Composite(
            parts
                .into_iter()
                .map(|part| scalar(part).unwrap_or_default())
                .collect(),
        ),
        Some(other) => PrimaryKey::Single(scalar(other).unwrap_or_default()),
        None => PrimaryKey::Single(String::new()),
    }
}

/// Unix seconds from an RFC 3339 string, an offset-less ISO 8601 string
/// (read as UTC) or a number of seconds
fn timestamp(value: Option<Value>) -> Option<u64> {
    let seconds = match value? {
        Value::Number(n) => return n.as_u64(),
        Value::String(s) => {
            let s = s.trim();
            match DateTime::parse_from_rfc3339(s) {
                Ok(time) => time.timestamp(),
                Err(_) => NAIVE_TIMESTAMP_FORMATS
                    .iter()
                    .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())?
                    .and_utc()
                    .timestamp(),
            }
        }
        _ => return None,
    };
    u64::try_from(seconds).ok()
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireEntity {
    #[serde(default)]
    pub entity_type: Option<Value>,
    #[serde(default)]
    pub primary_key: Option<Value>,
    #[serde(default)]
    pub properties: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub primary_key_properties: Option<Vec<Value>>,
}

impl From<WireEntity> for Entity {
    /// Missing type or key become empty strings; the registry skips them
    fn from(wire: WireEntity) -> Self {
        Entity {
            entity_type: wire.entity_type.and_then(scalar).unwrap_or_default(),
            primary_key: primary_key(wire.primary_key),
            properties: wire
                .properties
                .unwrap_or_default()
                .into_iter()
                .map(|(name, value)| (name, property_values(value)))
                .collect(),
            primary_key_properties: wire
                .primary_key_properties
                .unwrap_or_default()
                .into_iter()
                .filter_map(scalar)
                .collect(),
        }
    }
}

/// Normalise a property value to a list of strings
///
/// Strings are kept as is, scalars are stringified, arrays are flattened one
/// level and nulls become an empty list.
fn property_values(value: Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => vec![s],
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WireEntityRef {
    #[serde(default)]
    pub entity_type: Option<Value>,
    #[serde(default)]
    pub primary_key: Option<Value>,
}

impl From<WireEntityRef> for EntityRef {
    fn from(wire: WireEntityRef) -> Self {
        EntityRef {
            entity_type: wire.entity_type.and_then(scalar).unwrap_or_default(),
            primary_key: primary_key(wire.primary_key),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WireSyncStatus {
    #[serde(default)]
    pub is_synced: Option<bool>,
    #[serde(default)]
    pub last_synced: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WireEvaluation {
    #[serde(default)]
    pub evaluation_result: Option<Value>,
    #[serde(default)]
    pub justification: Option<Value>,
    #[serde(default)]
    pub is_manual: Option<bool>,
    #[serde(default)]
    pub last_evaluated: Option<Value>,
    #[serde(default)]
    pub sync_status: Option<WireSyncStatus>,
}

impl From<WireEvaluation> for Evaluation {
    fn from(wire: WireEvaluation) -> Self {
        let sync = wire.sync_status.unwrap_or_default();
        Evaluation {
            result: wire
                .evaluation_result
                .and_then(scalar)
                .map(|result| EvaluationStatus::parse(&result))
                .unwrap_or_default(),
            justification: wire
                .justification
                .and_then(scalar)
                .filter(|j| !j.trim().is_empty()),
            is_manual: wire.is_manual.unwrap_or(false),
            last_evaluated: timestamp(wire.last_evaluated),
            sync_status: SyncStatus {
                is_synced: sync.is_synced.unwrap_or(false),
                last_synced: timestamp(sync.last_synced),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WirePropertyMapping {
    pub source_property: String,
    pub target_property: String,
    #[serde(default)]
    pub match_type: Option<String>,
}

impl From<WirePropertyMapping> for PropertyMapping {
    fn from(wire: WirePropertyMapping) -> Self {
        PropertyMapping::new(
            wire.source_property,
            wire.target_property,
            wire.match_type.unwrap_or_default(),
        )
    }
}

impl From<&PropertyMapping> for WirePropertyMapping {
    fn from(mapping: &PropertyMapping) -> Self {
        WirePropertyMapping {
            source_property: mapping.source_property.clone(),
            target_property: mapping.target_property.clone(),
            match_type: Some(mapping.match_type.clone()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireRelation {
    pub relation_id: String,
    #[serde(default)]
    pub from_entity: Option<WireEntityRef>,
    #[serde(default)]
    pub to_entity: Option<WireEntityRef>,
    #[serde(default)]
    pub relation_name: Option<String>,
    #[serde(default)]
    pub property_mappings: Option<Vec<Value>>,
    #[serde(flatten)]
    pub evaluation: WireEvaluation,
}

impl From<WireRelation> for Relation {
    /// Missing endpoints become empty references; grouping drops them as
    /// unresolved
    fn from(wire: WireRelation) -> Self {
        let (property_mappings, skipped) = decode_items::<WirePropertyMapping, PropertyMapping>(
            wire.property_mappings.unwrap_or_default(),
        );
        if skipped > 0 {
            tracing::debug!(relation_id = %wire.relation_id, skipped, "skipping malformed property mappings");
        }
        Relation {
            relation_id: RelationId::new(wire.relation_id),
            from_entity: wire.from_entity.unwrap_or_default().into(),
            to_entity: wire.to_entity.unwrap_or_default().into(),
            relation_name: wire.relation_name.unwrap_or_default(),
            evaluation: wire.evaluation.into(),
            property_mappings,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntitiesResponse {
    #[serde(default)]
    pub entities: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelationsResponse {
    #[serde(default)]
    pub relations: Vec<Value>,
}

pub(crate) type HeuristicsResponse = HashMap<String, Value>;

pub(crate) type EvaluationsResponse = HashMap<String, Value>;

/// Decode an evaluations map, skipping entries that cannot be read
pub(crate) fn decode_evaluations(response: EvaluationsResponse) -> HashMap<RelationId, Evaluation> {
    response
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value::<WireEvaluation>(value) {
            Ok(wire) => Some((RelationId::new(id), Evaluation::from(wire))),
            Err(e) => {
                tracing::debug!(relation_id = %id, error = %e, "skipping undecodable evaluation");
                None
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub(crate) struct AcceptRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<&'a str>,
    pub property_mappings: Vec<WirePropertyMapping>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RejectRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RelationIdsRequest<'a> {
    pub relation_ids: Vec<&'a str>,
}
