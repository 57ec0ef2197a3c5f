//! Stats command implementation.

use crate::error::Result;
use crate::output::Formatter;
use ontolens_sdk::OntologyBackend;
use ontolens_session::GraphSession;

/// Execute the stats command.
pub async fn execute_stats<B: OntologyBackend>(
    session: &GraphSession<B>,
    formatter: &Formatter,
) -> Result<()> {
    let stats = session.stats().await?;
    println!("{}", formatter.format_stats(&stats)?);
    Ok(())
}
