//! Relation grouping engine
//!
//! Raw relations between the same unordered node pair that share an
//! evaluation status are merged into one display edge. Direction is kept per
//! member; only the label and the grouping key collapse it.

use crate::registry::NodeRegistry;
use ontolens_domain::{EvaluationStatus, NodeId, Relation, RelationId};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// Grouping key of a display edge: sorted node pair plus status bucket
///
/// Compared field by field; the `lo--hi#STATUS` string is only a rendering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
    lo: NodeId,
    hi: NodeId,
    status: EvaluationStatus,
}

impl EdgeKey {
    /// Compute the key for a node pair and status
    ///
    /// The pair is normalised, so `(a, b)` and `(b, a)` give the same key.
    ///
    /// # Examples
    ///
    /// ```
    /// use ontolens_domain::{EvaluationStatus, NodeId};
    /// use ontolens_graph::EdgeKey;
    ///
    /// let a = NodeId::from_raw("Epic::EPIC-1");
    /// let b = NodeId::from_raw("Issue::SRE-1");
    /// let key = EdgeKey::new(&b, &a, EvaluationStatus::Accepted);
    /// assert_eq!(key, EdgeKey::new(&a, &b, EvaluationStatus::Accepted));
    /// assert_eq!(key.to_string(), "Epic::EPIC-1--Issue::SRE-1#ACCEPTED");
    /// ```
    pub fn new(a: &NodeId, b: &NodeId, status: EvaluationStatus) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self {
            lo: lo.clone(),
            hi: hi.clone(),
            status,
        }
    }

    /// Lower node of the pair
    pub fn lo(&self) -> &NodeId {
        &self.lo
    }

    /// Higher node of the pair
    pub fn hi(&self) -> &NodeId {
        &self.hi
    }

    /// Status bucket
    pub fn status(&self) -> EvaluationStatus {
        self.status
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}--{}#{}", self.lo, self.hi, self.status.as_str())
    }
}

/// Edge color, derived purely from the status bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeColor {
    /// Accepted relations
    Neutral,
    /// Rejected relations
    Red,
    /// Unsure relations
    Orange,
    /// Relations with no evaluation yet
    Gray,
}

impl EdgeColor {
    /// Color for a status bucket
    pub fn for_status(status: EvaluationStatus) -> Self {
        match status {
            EvaluationStatus::Accepted => EdgeColor::Neutral,
            EvaluationStatus::Rejected => EdgeColor::Red,
            EvaluationStatus::Unsure => EdgeColor::Orange,
            EvaluationStatus::Pending => EdgeColor::Gray,
        }
    }

    /// Hex RGB value
    pub fn hex(&self) -> &'static str {
        match self {
            EdgeColor::Neutral => "#475569",
            EdgeColor::Red => "#dc2626",
            EdgeColor::Orange => "#f97316",
            EdgeColor::Gray => "#9ca3af",
        }
    }
}

/// One raw relation contributing to a display edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMember {
    /// Relation id, used to drive evaluation actions
    pub relation_id: RelationId,

    /// Relation name
    pub relation_name: String,

    /// Source node of this relation
    pub from: NodeId,

    /// Target node of this relation
    pub to: NodeId,
}

/// A visual aggregate of same-pair, same-status relations
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayEdge {
    /// Grouping key (also the edge id)
    pub key: EdgeKey,

    /// Source node (direction of the first member)
    pub source: NodeId,

    /// Target node (direction of the first member)
    pub target: NodeId,

    /// Relation name, or `"<name> ×N"` for N > 1 members
    pub label: String,

    /// Contributing relations, ordered by relation id
    pub members: Vec<EdgeMember>,

    /// Shared evaluation status
    pub status: EvaluationStatus,

    /// Color derived from status
    pub color: EdgeColor,

    /// True when members run in both directions between the pair
    pub is_bidirectional: bool,
}

impl DisplayEdge {
    /// Ids of the contributing relations, in member order
    pub fn member_relation_ids(&self) -> Vec<&RelationId> {
        self.members.iter().map(|m| &m.relation_id).collect()
    }

    /// Number of contributing relations
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether the edge connects a node to itself
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Whether the edge touches a node
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }

    /// Whether a relation is one of the members
    pub fn contains_relation(&self, id: &RelationId) -> bool {
        self.members.iter().any(|m| &m.relation_id == id)
    }
}

/// Output of [`build_edges`]
#[derive(Debug, Clone, Default)]
pub struct EdgeBuild {
    /// Display edges, ordered by key
    pub edges: Vec<DisplayEdge>,

    /// Relations dropped because an endpoint was not registered
    pub unresolved_relations: usize,

    /// Extra copies of a relation id that lost to another copy
    pub duplicate_relations: usize,
}

/// Group raw relations into display edges
///
/// Relations are deduplicated by id and relations whose endpoints are not in
/// the registry are dropped. The output does not depend on the order of the
/// input.
pub fn build_edges(relations: &[Relation], registry: &NodeRegistry) -> EdgeBuild {
    let mut build = EdgeBuild::default();
    let (unique, duplicates) = unique_relations(relations);
    build.duplicate_relations = duplicates;

    let mut groups: BTreeMap<EdgeKey, (EvaluationStatus, Vec<EdgeMember>)> = BTreeMap::new();
    for relation in unique.into_values() {
        let (Some(from), Some(to)) = (
            registry.resolve(&relation.from_entity),
            registry.resolve(&relation.to_entity),
        ) else {
            build.unresolved_relations += 1;
            tracing::trace!(relation_id = %relation.relation_id, "dropping relation with unknown endpoint");
            continue;
        };

        let status = relation.status();
        groups
            .entry(EdgeKey::new(&from, &to, status))
            .or_insert_with(|| (status, Vec::new()))
            .1
            .push(EdgeMember {
                relation_id: relation.relation_id.clone(),
                relation_name: relation.relation_name.clone(),
                from,
                to,
            });
    }

    build.edges = groups
        .into_iter()
        .filter_map(|(key, (status, members))| make_edge(key, status, members))
        .collect();

    build
}

/// One relation per id, plus the number of extra copies seen
///
/// When an id repeats, the copy with the highest [`precedence`] wins.
pub(crate) fn unique_relations(relations: &[Relation]) -> (BTreeMap<&RelationId, &Relation>, usize) {
    let mut unique: BTreeMap<&RelationId, &Relation> = BTreeMap::new();
    let mut duplicates = 0;
    for relation in relations {
        match unique.entry(&relation.relation_id) {
            Entry::Vacant(slot) => {
                slot.insert(relation);
            }
            Entry::Occupied(mut slot) => {
                duplicates += 1;
                if precedence(relation) > precedence(slot.get()) {
                    slot.insert(relation);
                }
            }
        }
    }
    (unique, duplicates)
}

/// Ranking between copies of the same relation id
///
/// Latest evaluation first, then status order, then name and endpoints.
fn precedence(relation: &Relation) -> (Option<u64>, EvaluationStatus, &str, NodeId, NodeId) {
    (
        relation.evaluation.last_evaluated,
        relation.status(),
        relation.relation_name.as_str(),
        relation.from_entity.node_id(),
        relation.to_entity.node_id(),
    )
}

fn make_edge(key: EdgeKey, status: EvaluationStatus, mut members: Vec<EdgeMember>) -> Option<DisplayEdge> {
    members.sort_by(|a, b| a.relation_id.cmp(&b.relation_id));
    let first = members.first()?;

    let label = if members.len() == 1 {
        first.relation_name.clone()
    } else {
        aggregate_label(&first.relation_name, members.len())
    };

    let is_bidirectional = members
        .iter()
        .any(|m| m.from != m.to && m.from != first.from);
    let source = first.from.clone();
    let target = first.to.clone();

    Some(DisplayEdge {
        key,
        source,
        target,
        label,
        status,
        color: EdgeColor::for_status(status),
        is_bidirectional,
        members,
    })
}

fn aggregate_label(first_name: &str, count: usize) -> String {
    format!("{} ×{}", first_name, count)
}
