//! Regenerate and clear command implementations.

use crate::cli::ClearArgs;
use crate::error::Result;
use crate::output::Formatter;
use ontolens_sdk::OntologyBackend;
use ontolens_session::GraphSession;
use std::io::{self, BufRead, Write};

/// Execute the regenerate command.
pub async fn execute_regenerate<B: OntologyBackend>(
    session: &GraphSession<B>,
    formatter: &Formatter,
) -> Result<()> {
    let refreshed = session.regenerate().await?;
    println!("{}", formatter.success("Ontology regeneration requested"));
    if refreshed {
        if let Some(graph) = session.graph() {
            println!(
                "{}",
                formatter.info(&format!(
                    "{} node(s), {} relation(s) loaded",
                    graph.node_count(),
                    graph.relation_count()
                ))
            );
        }
    } else {
        println!("{}", formatter.warning("Graph could not be refreshed"));
    }
    Ok(())
}

/// Execute the clear command.
pub async fn execute_clear<B: OntologyBackend>(
    args: ClearArgs,
    session: &GraphSession<B>,
    formatter: &Formatter,
) -> Result<()> {
    if !args.yes {
        let stats = session.stats().await?;
        print!(
            "About to delete {} entities and {} relations. Continue? [y/N] ",
            stats.node_count, stats.relation_count
        );
        io::stdout().flush()?;

        if !confirm(io::stdin().lock())? {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }
    }

    session.clear().await?;
    println!("{}", formatter.success("Ontology cleared"));
    Ok(())
}

/// Read one line and accept only `y` or `yes`.
fn confirm(mut input: impl BufRead) -> Result<bool> {
    let mut response = String::new();
    input.read_line(&mut response)?;
    let response = response.trim();
    Ok(response.eq_ignore_ascii_case("y") || response.eq_ignore_ascii_case("yes"))
}
