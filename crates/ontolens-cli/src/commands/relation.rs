//! Relation command implementation.

use crate::cli::RelationArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use ontolens_domain::RelationId;
use ontolens_sdk::OntologyBackend;
use ontolens_session::GraphSession;

/// Execute the relation command.
pub async fn execute_relation<B: OntologyBackend>(
    args: RelationArgs,
    session: &GraphSession<B>,
    formatter: &Formatter,
) -> Result<()> {
    let id = args.id.trim();
    if id.is_empty() {
        return Err(CliError::InvalidInput("Relation ID must not be empty".to_string()));
    }

    session.refresh().await?;
    let details = session.relation_details(&RelationId::from(id)).await?;
    println!("{}", formatter.format_relation(&details)?);
    Ok(())
}
