//! Integration tests for ontolens-graph
//!
//! Covers the registry, grouping and filter behaviour end to end through
//! `OntologyGraph::build`.

use ontolens_domain::{Entity, EntityRef, EvaluationStatus, Relation, RelationId};
use ontolens_graph::{compute_visibility, DisplayEdge, GraphConfig, GraphFilter, OntologyGraph};
use proptest::prelude::*;

fn config() -> GraphConfig {
    GraphConfig::default().with_seed(17).without_layout()
}

fn sre_entities() -> Vec<Entity> {
    vec![Entity::new("Issue", "SRE-1"), Entity::new("Epic", "EPIC-1")]
}

fn issue_to_epic(id: &str, name: &str, status: EvaluationStatus) -> Relation {
    Relation::new(
        id,
        EntityRef::new("Issue", "SRE-1"),
        EntityRef::new("Epic", "EPIC-1"),
        name,
    )
    .with_status(status)
}

fn member_ids(edge: &DisplayEdge) -> Vec<String> {
    edge.member_relation_ids()
        .into_iter()
        .map(|id| id.to_string())
        .collect()
}

#[test]
fn test_single_accepted_relation() {
    let relations = vec![issue_to_epic("r1", "belongs_to", EvaluationStatus::Accepted)];

    let graph = OntologyGraph::build(&sre_entities(), &relations, &config());

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    let edge = graph.edges().next().unwrap();
    assert_eq!(edge.label, "belongs_to");
    assert_eq!(member_ids(edge), vec!["r1"]);
}

#[test]
fn test_two_accepted_relations_merge() {
    let relations = vec![
        issue_to_epic("r1", "belongs_to", EvaluationStatus::Accepted),
        issue_to_epic("r2", "tracked_in", EvaluationStatus::Accepted),
    ];

    let graph = OntologyGraph::build(&sre_entities(), &relations, &config());

    assert_eq!(graph.edge_count(), 1);
    let edge = graph.edges().next().unwrap();
    assert!(edge.label.ends_with("×2"), "unexpected label {}", edge.label);
    assert_eq!(member_ids(edge), vec!["r1", "r2"]);
}

#[test]
fn test_accepted_and_rejected_stay_apart() {
    let relations = vec![
        issue_to_epic("r1", "belongs_to", EvaluationStatus::Accepted),
        issue_to_epic("r2", "belongs_to", EvaluationStatus::Rejected),
    ];

    let graph = OntologyGraph::build(&sre_entities(), &relations, &config());
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn test_duplicate_entities_resolve_to_one_node() {
    let entities = vec![
        Entity::new("Issue", "SRE-1").with_property("title", ["first"]),
        Entity::new("Issue", "SRE-1").with_property("title", ["retry"]),
    ];

    let graph = OntologyGraph::build(&entities, &[], &config());
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.diagnostics().duplicate_entities, 1);
}

#[test]
fn test_dangling_relation_is_excluded() {
    let relations = vec![Relation::new(
        "r1",
        EntityRef::new("Issue", "SRE-1"),
        EntityRef::new("Epic", "EPIC-404"),
        "belongs_to",
    )];

    let graph = OntologyGraph::build(&sre_entities(), &relations, &config());
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.relation(&RelationId::from("r1")).is_none());
    assert_eq!(graph.diagnostics().unresolved_relations, 1);
}

#[test]
fn test_malformed_entities_do_not_break_build() {
    let entities = vec![
        Entity::new("", "orphan"),
        Entity::new("Issue", ""),
        Entity::new("Issue", "SRE-1"),
    ];

    let graph = OntologyGraph::build(&entities, &[], &config());
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.diagnostics().malformed_entities, 2);
}

#[test]
fn test_empty_allow_set_hides_all() {
    let relations = vec![issue_to_epic("r1", "belongs_to", EvaluationStatus::Accepted)];
    let graph = OntologyGraph::build(&sre_entities(), &relations, &config());

    let visibility = compute_visibility(&graph, &GraphFilter::with_types(Vec::<String>::new()));
    assert_eq!(visibility.visible_node_count(), 0);
    assert_eq!(visibility.visible_edge_count(), 0);
}

fn edge_summary(graph: &OntologyGraph) -> Vec<(String, String, Vec<String>, bool)> {
    graph
        .edges()
        .map(|e| (e.key.to_string(), e.label.clone(), member_ids(e), e.is_bidirectional))
        .collect()
}

#[test]
fn test_duplicate_id_with_changed_status_ignores_order() {
    let accepted = issue_to_epic("r1", "belongs_to", EvaluationStatus::Accepted);
    let rejected = issue_to_epic("r1", "belongs_to", EvaluationStatus::Rejected);

    let forward = OntologyGraph::build(&sre_entities(), &[accepted.clone(), rejected.clone()], &config());
    let backward = OntologyGraph::build(&sre_entities(), &[rejected, accepted], &config());

    assert_eq!(edge_summary(&forward), edge_summary(&backward));
    assert_eq!(
        forward.relation_status(&RelationId::from("r1")),
        backward.relation_status(&RelationId::from("r1"))
    );
    assert_eq!(forward.diagnostics().duplicate_relations, 1);
}

fn status_strategy() -> impl Strategy<Value = EvaluationStatus> {
    prop_oneof![
        Just(EvaluationStatus::Pending),
        Just(EvaluationStatus::Accepted),
        Just(EvaluationStatus::Rejected),
        Just(EvaluationStatus::Unsure),
    ]
}

/// Relations over four nodes; ids repeat, with differing content
fn relations_strategy() -> impl Strategy<Value = Vec<Relation>> {
    let spec = (
        0usize..10,
        0usize..4,
        0usize..4,
        status_strategy(),
        0usize..3,
        prop::option::of(0u64..3),
    );
    prop::collection::vec(spec, 0..24).prop_map(|specs| {
        specs
            .into_iter()
            .map(|(id, from, to, status, name, evaluated)| {
                let mut relation = Relation::new(
                    format!("r{:02}", id),
                    EntityRef::new("Issue", format!("N-{}", from)),
                    EntityRef::new("Issue", format!("N-{}", to)),
                    ["blocks", "relates_to", "duplicates"][name],
                )
                .with_status(status);
                relation.evaluation.last_evaluated = evaluated;
                relation
            })
            .collect()
    })
}

fn distinct_ids(relations: &[Relation]) -> usize {
    relations
        .iter()
        .map(|r| r.relation_id.clone())
        .collect::<std::collections::BTreeSet<_>>()
        .len()
}

fn node_entities() -> Vec<Entity> {
    (0..4).map(|i| Entity::new("Issue", format!("N-{}", i))).collect()
}

proptest! {
    /// Property: rebuilding from the same relations gives identical edges
    #[test]
    fn test_rebuild_is_deterministic(relations in relations_strategy()) {
        let first = OntologyGraph::build(&node_entities(), &relations, &config());
        let second = OntologyGraph::build(&node_entities(), &relations, &config());
        prop_assert_eq!(edge_summary(&first), edge_summary(&second));
    }

    /// Property: grouping does not depend on input order
    #[test]
    fn test_grouping_is_order_independent(
        (relations, shuffled) in relations_strategy()
            .prop_flat_map(|r| (Just(r.clone()), Just(r).prop_shuffle()))
    ) {
        let mut reversed = relations.clone();
        reversed.reverse();

        let forward = OntologyGraph::build(&node_entities(), &relations, &config());
        let backward = OntologyGraph::build(&node_entities(), &reversed, &config());
        let mixed = OntologyGraph::build(&node_entities(), &shuffled, &config());
        prop_assert_eq!(edge_summary(&forward), edge_summary(&backward));
        prop_assert_eq!(edge_summary(&forward), edge_summary(&mixed));

        for relation in forward.relations() {
            prop_assert_eq!(
                Some(relation.status()),
                backward.relation_status(&relation.relation_id)
            );
        }
    }

    /// Property: every distinct relation id lands in exactly one edge
    #[test]
    fn test_every_relation_in_one_edge(relations in relations_strategy()) {
        let graph = OntologyGraph::build(&node_entities(), &relations, &config());
        let total: usize = graph.edges().map(|e| e.member_count()).sum();
        prop_assert_eq!(total, distinct_ids(&relations));
        prop_assert_eq!(graph.relation_count(), distinct_ids(&relations));
        prop_assert_eq!(
            graph.diagnostics().duplicate_relations,
            relations.len() - distinct_ids(&relations)
        );
    }
}
