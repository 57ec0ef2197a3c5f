//! CLI command definitions and argument parsing.

use crate::error::{CliError, Result};
use clap::{Parser, Subcommand};
use ontolens_domain::PropertyMapping;

/// Ontolens CLI - Inspect and curate an ontology relation graph.
#[derive(Debug, Parser)]
#[command(name = "ontolens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Ontology service URL, overrides the profile
    #[arg(long, env = "ONTOLENS_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token, overrides the profile
    #[arg(long, env = "ONTOLENS_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (ids only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show entity and relation counts
    Stats,

    /// Build the graph and list visible nodes and edges
    Graph(GraphArgs),

    /// Show one relation with its evidence and evaluation
    Relation(RelationArgs),

    /// Ask the service to re-evaluate a relation
    Evaluate(RelationArgs),

    /// Accept a relation
    Accept(AcceptArgs),

    /// Reject a relation
    Reject(RejectArgs),

    /// Return a relation to unevaluated
    Undo(RelationArgs),

    /// Push a relation's evaluation to the graph store
    Sync(RelationArgs),

    /// Rebuild the ontology from the knowledge base
    Regenerate,

    /// Delete the whole ontology
    Clear(ClearArgs),

    /// Show ontology agent status
    Status(StatusArgs),

    /// Manage configuration profiles
    Profile(ProfileArgs),
}

/// Arguments for the graph command.
#[derive(Debug, Parser)]
pub struct GraphArgs {
    /// Entity types to show (comma separated, default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub types: Vec<String>,

    /// Hide accepted relations
    #[arg(long)]
    pub hide_accepted: bool,

    /// Hide rejected relations
    #[arg(long)]
    pub hide_rejected: bool,

    /// Hide relations evaluated as unsure
    #[arg(long)]
    pub hide_unsure: bool,

    /// Hide relations that have not been evaluated
    #[arg(long)]
    pub hide_unevaluated: bool,

    /// Run the force layout and print node positions
    #[arg(long)]
    pub layout: bool,
}

/// Arguments naming a single relation.
#[derive(Debug, Parser)]
pub struct RelationArgs {
    /// Relation ID
    pub id: String,
}

/// Arguments for the accept command.
#[derive(Debug, Parser)]
pub struct AcceptArgs {
    /// Relation ID
    pub id: String,

    /// Why the relation holds
    #[arg(short, long)]
    pub justification: Option<String>,

    /// Property mapping (format: SOURCE=TARGET[:MATCH_TYPE]), repeatable
    #[arg(short, long = "mapping", value_parser = parse_mapping)]
    pub mappings: Vec<PropertyMapping>,
}

/// Arguments for the reject command.
#[derive(Debug, Parser)]
pub struct RejectArgs {
    /// Relation ID
    pub id: String,

    /// Why the relation does not hold
    #[arg(short, long)]
    pub justification: Option<String>,
}

/// Arguments for the clear command.
#[derive(Debug, Parser)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the status command.
#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Poll this many times instead of once
    #[arg(short, long)]
    pub watch: Option<usize>,

    /// Milliseconds between polls (default: 2000)
    #[arg(short, long)]
    pub interval: Option<u64>,
}

/// Arguments for profile management.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set {
        /// Profile name
        name: String,
        /// Ontology service URL
        #[arg(short, long)]
        url: String,
        /// Bearer token
        #[arg(short, long)]
        token: Option<String>,
        /// Maximum entities and relations fetched per refresh
        #[arg(short, long)]
        batch_limit: Option<usize>,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

/// Parse `SOURCE=TARGET[:MATCH_TYPE]` into a property mapping.
///
/// The match type defaults to `exact`.
pub fn parse_mapping(raw: &str) -> Result<PropertyMapping> {
    let invalid = || {
        CliError::InvalidInput(format!(
            "Invalid mapping '{}', expected SOURCE=TARGET[:MATCH_TYPE]",
            raw
        ))
    };

    let (source, rest) = raw.split_once('=').ok_or_else(invalid)?;
    let (target, match_type) = rest.split_once(':').unwrap_or((rest, "exact"));
    let (source, target, match_type) = (source.trim(), target.trim(), match_type.trim());

    if source.is_empty() || target.is_empty() || match_type.is_empty() {
        return Err(invalid());
    }
    Ok(PropertyMapping::new(source, target, match_type))
}
