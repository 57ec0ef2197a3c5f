//! Ontolens CLI - Command-line interface for the ontology relation graph.

use clap::Parser;
use ontolens_cli::commands;
use ontolens_cli::{Cli, CliError, Command, Config, Formatter};
use ontolens_sdk::OntologyClient;
use ontolens_session::GraphSession;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Log to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("ONTOLENS_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> ontolens_cli::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let mut config = Config::load(config_path.as_deref())?;

    if let Some(profile_name) = cli.profile.clone() {
        config.switch_profile(profile_name)?;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let command = match cli.command {
        Command::Profile(args) => {
            return commands::execute_profile(args, &mut config, &formatter).await
        }
        command => command,
    };

    // Commands that talk to the ontology service
    let profile = config.resolve_profile(cli.api_url, cli.api_token)?;
    let client = OntologyClient::with_config(profile.client_config())?;
    let mut session_config = config.session_config(&profile);
    session_config.graph.layout.enabled = matches!(&command, Command::Graph(args) if args.layout);
    session_config.validate().map_err(CliError::Config)?;
    let session = GraphSession::new(client, session_config);
    tracing::debug!(url = %profile.api_url, "using ontology service");

    let result = match command {
        Command::Stats => commands::execute_stats(&session, &formatter).await,
        Command::Graph(args) => commands::execute_graph(args, &session, &formatter).await,
        Command::Relation(args) => commands::execute_relation(args, &session, &formatter).await,
        Command::Evaluate(args) => commands::execute_evaluate(args, &session, &formatter).await,
        Command::Accept(args) => commands::execute_accept(args, &session, &formatter).await,
        Command::Reject(args) => commands::execute_reject(args, &session, &formatter).await,
        Command::Undo(args) => commands::execute_undo(args, &session, &formatter).await,
        Command::Sync(args) => commands::execute_sync(args, &session, &formatter).await,
        Command::Regenerate => commands::execute_regenerate(&session, &formatter).await,
        Command::Clear(args) => commands::execute_clear(args, &session, &formatter).await,
        Command::Status(args) => commands::execute_status(args, &session, &formatter).await,
        Command::Profile(_) => Ok(()),
    };

    session.close();
    result
}
