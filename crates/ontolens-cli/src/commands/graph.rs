//! Graph command implementation.

use crate::cli::GraphArgs;
use crate::error::Result;
use crate::output::Formatter;
use ontolens_graph::{compute_visibility, GraphFilter, OntologyGraph};
use ontolens_sdk::OntologyBackend;
use ontolens_session::GraphSession;

/// Execute the graph command.
pub async fn execute_graph<B: OntologyBackend>(
    args: GraphArgs,
    session: &GraphSession<B>,
    formatter: &Formatter,
) -> Result<()> {
    session.refresh().await?;
    let Some(graph) = session.graph() else {
        println!("{}", formatter.info("No graph loaded"));
        return Ok(());
    };

    let filter = build_filter(&args, &graph);
    let visibility = compute_visibility(&graph, &filter);

    println!("{}", formatter.format_graph(&graph, &visibility, args.layout)?);
    if let Some(warning) = formatter.format_diagnostics(graph.diagnostics()) {
        eprintln!("{}", warning);
    }
    Ok(())
}

/// Turn command-line flags into a graph filter.
///
/// No `--types` means every entity type present in the graph.
fn build_filter(args: &GraphArgs, graph: &OntologyGraph) -> GraphFilter {
    let mut filter = if args.types.is_empty() {
        GraphFilter::allow_all(graph)
    } else {
        GraphFilter::with_types(args.types.iter().map(|t| t.trim().to_string()))
    };
    filter.show_accepted = !args.hide_accepted;
    filter.show_rejected = !args.hide_rejected;
    filter.show_uncertain = !args.hide_unsure;
    filter.show_unevaluated = !args.hide_unevaluated;
    filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontolens_domain::{Entity, EntityRef, EvaluationStatus, Relation};
    use ontolens_graph::GraphConfig;

    fn args(types: &[&str]) -> GraphArgs {
        GraphArgs {
            types: types.iter().map(|t| t.to_string()).collect(),
            hide_accepted: false,
            hide_rejected: true,
            hide_unsure: false,
            hide_unevaluated: false,
            layout: false,
        }
    }

    fn graph() -> OntologyGraph {
        let entities = vec![Entity::new("Issue", "SRE-1"), Entity::new("Epic", "EPIC-1")];
        let relations = vec![Relation::new(
            "r1",
            EntityRef::new("Issue", "SRE-1"),
            EntityRef::new("Epic", "EPIC-1"),
            "belongs_to",
        )
        .with_status(EvaluationStatus::Rejected)];
        OntologyGraph::build(&entities, &relations, &GraphConfig::default().without_layout())
    }

    #[test]
    fn test_default_filter_allows_all_types() {
        let graph = graph();
        let filter = build_filter(&args(&[]), &graph);
        assert!(filter.allows_type("Issue"));
        assert!(filter.allows_type("Epic"));
        assert!(!filter.shows(EvaluationStatus::Rejected));
        assert!(filter.shows(EvaluationStatus::Pending));
    }

    #[test]
    fn test_hidden_bucket_hides_edge() {
        let graph = graph();
        let visibility = compute_visibility(&graph, &build_filter(&args(&[]), &graph));
        assert_eq!(visibility.visible_edge_count(), 0);
        // Both nodes have an edge, none visible
        assert_eq!(visibility.visible_node_count(), 0);
    }

    #[test]
    fn test_type_list() {
        let graph = graph();
        let filter = build_filter(&args(&["Issue", " Epic "]), &graph);
        assert!(filter.allows_type("Epic"));
        assert!(!filter.allows_type("Team"));
    }
}
