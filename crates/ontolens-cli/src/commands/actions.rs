//! Evaluation action commands: evaluate, accept, reject, undo, sync.

use crate::cli::{AcceptArgs, RejectArgs, RelationArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use ontolens_domain::RelationId;
use ontolens_sdk::OntologyBackend;
use ontolens_session::{ActionOutcome, GraphSession};

/// Validate a relation id argument.
fn relation_id(raw: &str) -> Result<RelationId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::InvalidInput("Relation ID must not be empty".to_string()));
    }
    Ok(RelationId::from(trimmed))
}

/// Load the graph so the id can be checked before the service is called.
async fn prepare<B: OntologyBackend>(session: &GraphSession<B>, raw: &str) -> Result<RelationId> {
    let id = relation_id(raw)?;
    session.refresh().await?;
    Ok(id)
}

fn report(outcome: &ActionOutcome, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.format_action(outcome)?);
    Ok(())
}

/// Execute the evaluate command.
pub async fn execute_evaluate<B: OntologyBackend>(
    args: RelationArgs,
    session: &GraphSession<B>,
    formatter: &Formatter,
) -> Result<()> {
    let id = prepare(session, &args.id).await?;
    let outcome = session.evaluate(&id).await?;
    report(&outcome, formatter)?;

    // The service decides the result; show it
    if let Some(status) = session.graph().and_then(|g| g.relation_status(&id)) {
        println!("{}", formatter.info(&format!("Relation {} is now {}", id, status)));
    }
    Ok(())
}

/// Execute the accept command.
pub async fn execute_accept<B: OntologyBackend>(
    args: AcceptArgs,
    session: &GraphSession<B>,
    formatter: &Formatter,
) -> Result<()> {
    let id = prepare(session, &args.id).await?;
    let outcome = session
        .accept(&id, args.justification.as_deref(), &args.mappings)
        .await?;
    report(&outcome, formatter)
}

/// Execute the reject command.
pub async fn execute_reject<B: OntologyBackend>(
    args: RejectArgs,
    session: &GraphSession<B>,
    formatter: &Formatter,
) -> Result<()> {
    let id = prepare(session, &args.id).await?;
    let outcome = session.reject(&id, args.justification.as_deref()).await?;
    report(&outcome, formatter)
}

/// Execute the undo command.
pub async fn execute_undo<B: OntologyBackend>(
    args: RelationArgs,
    session: &GraphSession<B>,
    formatter: &Formatter,
) -> Result<()> {
    let id = prepare(session, &args.id).await?;
    let outcome = session.undo(&id).await?;
    report(&outcome, formatter)
}

/// Execute the sync command.
pub async fn execute_sync<B: OntologyBackend>(
    args: RelationArgs,
    session: &GraphSession<B>,
    formatter: &Formatter,
) -> Result<()> {
    let id = prepare(session, &args.id).await?;
    let outcome = session.sync(&id).await?;
    report(&outcome, formatter)
}
