//! Status command implementation.

use crate::cli::StatusArgs;
use crate::error::Result;
use crate::output::Formatter;
use ontolens_sdk::OntologyBackend;
use ontolens_session::{AgentStatusPoller, GraphSession};
use std::time::Duration;

/// Execute the status command.
pub async fn execute_status<B: OntologyBackend>(
    args: StatusArgs,
    session: &GraphSession<B>,
    formatter: &Formatter,
) -> Result<()> {
    let Some(cycles) = args.watch.filter(|n| *n > 0) else {
        let status = session.agent_status().await?;
        println!("{}", formatter.format_agent_status(&status)?);
        return Ok(());
    };

    let interval = args
        .interval
        .map(Duration::from_millis)
        .unwrap_or_else(|| session.config().agent_poll_interval());
    let poller = AgentStatusPoller::new(interval);

    let mut render_error = None;
    poller
        .poll_cycles(session, cycles, |status| {
            match formatter.format_agent_status(status) {
                Ok(line) => println!("{}", line),
                Err(e) => render_error = Some(e),
            }
        })
        .await?;

    match render_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
