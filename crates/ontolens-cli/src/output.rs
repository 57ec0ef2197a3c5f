//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use ontolens_domain::EvaluationStatus;
use ontolens_graph::{BuildDiagnostics, DisplayEdge, GraphNode, OntologyGraph, Visibility};
use ontolens_sdk::{AgentStatus, GraphStats};
use ontolens_session::{ActionOutcome, RelationDetails};
use serde_json::json;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format ontology counts.
    pub fn format_stats(&self, stats: &GraphStats) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(stats)?),
            OutputFormat::Quiet => Ok(format!("{} {}", stats.node_count, stats.relation_count)),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Entities", "Relations"]);
                builder.push_record([stats.node_count.to_string(), stats.relation_count.to_string()]);
                Ok(self.render(builder))
            }
        }
    }

    /// Format the visible part of a graph.
    pub fn format_graph(
        &self,
        graph: &OntologyGraph,
        visibility: &Visibility,
        show_positions: bool,
    ) -> Result<String> {
        let nodes: Vec<&GraphNode> = graph
            .nodes()
            .filter(|n| visibility.is_node_visible(&n.id))
            .collect();
        let edges: Vec<&DisplayEdge> = graph
            .edges()
            .filter(|e| visibility.is_edge_visible(&e.key))
            .collect();

        match self.format {
            OutputFormat::Json => self.format_graph_json(&nodes, &edges, show_positions),
            OutputFormat::Quiet => Ok(edges
                .iter()
                .flat_map(|e| e.member_relation_ids())
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => Ok(self.format_graph_table(&nodes, &edges, show_positions)),
        }
    }

    fn format_graph_json(
        &self,
        nodes: &[&GraphNode],
        edges: &[&DisplayEdge],
        show_positions: bool,
    ) -> Result<String> {
        let nodes: Vec<serde_json::Value> = nodes
            .iter()
            .map(|n| {
                let mut value = json!({
                    "id": n.id.as_str(),
                    "entity_type": n.entity_type,
                    "label": n.label,
                    "degree": n.degree,
                    "size": n.size,
                });
                if show_positions {
                    value["x"] = json!(n.x);
                    value["y"] = json!(n.y);
                }
                value
            })
            .collect();

        let edges: Vec<serde_json::Value> = edges
            .iter()
            .map(|e| {
                json!({
                    "key": e.key.to_string(),
                    "source": e.source.as_str(),
                    "target": e.target.as_str(),
                    "label": e.label,
                    "status": e.status.as_str(),
                    "color": e.color.hex(),
                    "is_bidirectional": e.is_bidirectional,
                    "relation_ids": e.members.iter().map(|m| m.relation_id.as_str()).collect::<Vec<_>>(),
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json!({ "nodes": nodes, "edges": edges }))?)
    }

    fn format_graph_table(
        &self,
        nodes: &[&GraphNode],
        edges: &[&DisplayEdge],
        show_positions: bool,
    ) -> String {
        if nodes.is_empty() {
            return self.colorize("No visible nodes.", "yellow");
        }

        let mut node_table = Builder::default();
        let mut header = vec!["Node", "Type", "Label", "Degree", "Size"];
        if show_positions {
            header.extend(["X", "Y"]);
        }
        node_table.push_record(header);
        for node in nodes {
            let mut row = vec![
                node.id.to_string(),
                node.entity_type.clone(),
                clean_label(&node.label).to_string(),
                node.degree.to_string(),
                format!("{:.1}", node.size),
            ];
            if show_positions {
                row.push(format!("{:.1}", node.x));
                row.push(format!("{:.1}", node.y));
            }
            node_table.push_record(row);
        }

        let mut sections = vec![self.render(node_table)];

        if edges.is_empty() {
            sections.push(self.colorize("No visible edges.", "yellow"));
        } else {
            let mut edge_table = Builder::default();
            edge_table.push_record(["Source", "Target", "Label", "Status", "Relations", "↔"]);
            for edge in edges {
                let ids: Vec<String> = edge
                    .member_relation_ids()
                    .into_iter()
                    .map(|id| id.to_string())
                    .collect();
                edge_table.push_record([
                    edge.source.to_string(),
                    edge.target.to_string(),
                    clean_label(&edge.label).to_string(),
                    self.status(edge.status),
                    ids.join(", "),
                    if edge.is_bidirectional { "yes" } else { "" }.to_string(),
                ]);
            }
            sections.push(self.render(edge_table));
        }

        sections.push(format!("{} node(s), {} edge(s) visible", nodes.len(), edges.len()));
        sections.join("\n")
    }

    /// Format a relation with its evidence.
    pub fn format_relation(&self, details: &RelationDetails) -> Result<String> {
        let relation = &details.relation;
        let evaluation = details.evaluation.as_ref().unwrap_or(&relation.evaluation);

        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "relation_id": relation.relation_id.as_str(),
                "relation_name": relation.relation_name,
                "from": relation.from_entity.node_id().as_str(),
                "to": relation.to_entity.node_id().as_str(),
                "evaluation": {
                    "result": evaluation.result.as_str(),
                    "justification": evaluation.justification,
                    "is_manual": evaluation.is_manual,
                    "last_evaluated": evaluation.last_evaluated,
                    "is_synced": evaluation.sync_status.is_synced,
                },
                "property_mappings": relation.property_mappings.iter().map(|m| json!({
                    "source_property": m.source_property,
                    "target_property": m.target_property,
                    "match_type": m.match_type,
                })).collect::<Vec<_>>(),
                "heuristics": details.heuristics,
            }))?),
            OutputFormat::Quiet => Ok(format!(
                "{} {}",
                relation.relation_id,
                evaluation.result.as_str()
            )),
            OutputFormat::Table => {
                let endpoint = |node: &Option<GraphNode>, fallback: String| {
                    node.as_ref()
                        .map(|n| format!("{} ({})", clean_label(&n.label), n.id))
                        .unwrap_or(fallback)
                };

                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                builder.push_record(["ID".to_string(), relation.relation_id.to_string()]);
                builder.push_record(["Name".to_string(), relation.relation_name.clone()]);
                builder.push_record([
                    "From".to_string(),
                    endpoint(&details.source, relation.from_entity.node_id().to_string()),
                ]);
                builder.push_record([
                    "To".to_string(),
                    endpoint(&details.target, relation.to_entity.node_id().to_string()),
                ]);
                builder.push_record(["Status".to_string(), self.status(evaluation.result)]);
                builder.push_record([
                    "Manual".to_string(),
                    if evaluation.is_manual { "yes" } else { "no" }.to_string(),
                ]);
                builder.push_record([
                    "Synced".to_string(),
                    if evaluation.sync_status.is_synced { "yes" } else { "no" }.to_string(),
                ]);
                if let Some(justification) = &evaluation.justification {
                    builder.push_record(["Justification".to_string(), justification.clone()]);
                }
                for mapping in &relation.property_mappings {
                    builder.push_record([
                        "Mapping".to_string(),
                        format!(
                            "{} = {} ({})",
                            mapping.source_property, mapping.target_property, mapping.match_type
                        ),
                    ]);
                }
                if let Some(heuristics) = &details.heuristics {
                    builder.push_record([
                        "Heuristics".to_string(),
                        serde_json::to_string_pretty(heuristics)?,
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format the result of an evaluation action.
    pub fn format_action(&self, outcome: &ActionOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "relation_id": outcome.relation_id.as_str(),
                "action": outcome.action.as_str(),
                "refreshed": outcome.refreshed,
            }))?),
            OutputFormat::Quiet => Ok(outcome.relation_id.to_string()),
            OutputFormat::Table => {
                let mut lines = vec![self.success(&format!(
                    "{} succeeded for relation {}",
                    capitalize(outcome.action.as_str()),
                    outcome.relation_id
                ))];
                if !outcome.refreshed {
                    lines.push(self.warning("Graph could not be refreshed; run 'graph' to reload"));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format agent activity.
    pub fn format_agent_status(&self, status: &AgentStatus) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string(status)?),
            OutputFormat::Quiet => Ok(status.status.clone()),
            OutputFormat::Table => {
                let mut line = if status.is_active() {
                    self.colorize(&status.status, "cyan")
                } else {
                    status.status.clone()
                };
                if let Some(progress) = status.progress {
                    let percent = if progress <= 1.0 { progress * 100.0 } else { progress };
                    line.push_str(&format!(" {:.0}%", percent));
                }
                if let Some(message) = &status.message {
                    line.push_str(&format!(" - {}", message));
                }
                Ok(line)
            }
        }
    }

    /// Warn about skipped input, if any.
    pub fn format_diagnostics(&self, diagnostics: &BuildDiagnostics) -> Option<String> {
        if diagnostics.is_clean() {
            return None;
        }
        Some(self.warning(&format!(
            "Skipped input: {} malformed entities, {} duplicate entities, {} unresolved relations, {} duplicate relations",
            diagnostics.malformed_entities,
            diagnostics.duplicate_entities,
            diagnostics.unresolved_relations,
            diagnostics.duplicate_relations
        )))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn status(&self, status: EvaluationStatus) -> String {
        let text = match status {
            EvaluationStatus::Pending => "unevaluated",
            EvaluationStatus::Accepted => "accepted",
            EvaluationStatus::Rejected => "rejected",
            EvaluationStatus::Unsure => "unsure",
        };
        let color = match status {
            EvaluationStatus::Pending => "dimmed",
            EvaluationStatus::Accepted => "green",
            EvaluationStatus::Rejected => "red",
            EvaluationStatus::Unsure => "yellow",
        };
        self.colorize(text, color)
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "dimmed" => text.dimmed().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Strip leading symbols (icons, bullets) from a label for terminal display.
///
/// Labels made only of symbols are returned unchanged.
pub fn clean_label(label: &str) -> &str {
    let stripped = label.trim_start_matches(|c: char| !c.is_alphanumeric()).trim_end();
    if stripped.is_empty() {
        label
    } else {
        stripped
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
