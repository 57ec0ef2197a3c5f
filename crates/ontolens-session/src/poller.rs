//! Background polling of the ontology agent

use crate::error::SessionError;
use crate::session::GraphSession;
use ontolens_sdk::{AgentStatus, OntologyBackend};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;

/// Polls agent status on a schedule and refreshes the session when the
/// agent finishes a run
///
/// The latest status is published on a [`watch`] channel; subscribe with
/// [`subscribe`](Self::subscribe).
///
/// # Examples
///
/// ```no_run
/// use ontolens_sdk::OntologyClient;
/// use ontolens_session::{AgentStatusPoller, GraphSession, SessionConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = SessionConfig::default();
///     let poller = AgentStatusPoller::new(config.agent_poll_interval());
///     let session = GraphSession::new(OntologyClient::new("http://localhost:9446")?, config);
///
///     // Run until Ctrl+C
///     poller.run(&session).await?;
///     Ok(())
/// }
/// ```
pub struct AgentStatusPoller {
    interval: Duration,
    sender: watch::Sender<Option<AgentStatus>>,
}

impl AgentStatusPoller {
    /// Create a poller that asks the service every `interval`
    pub fn new(interval: Duration) -> Self {
        let (sender, _) = watch::channel(None);
        Self { interval, sender }
    }

    /// Receive every status the poller observes
    pub fn subscribe(&self) -> watch::Receiver<Option<AgentStatus>> {
        self.sender.subscribe()
    }

    /// The most recent status, if any poll has succeeded
    pub fn latest(&self) -> Option<AgentStatus> {
        self.sender.borrow().clone()
    }

    /// Poll once, publish the status and refresh the session if the agent
    /// just went idle
    pub async fn poll_once<B: OntologyBackend>(
        &self,
        session: &GraphSession<B>,
    ) -> Result<AgentStatus, SessionError> {
        let status = session.agent_status().await?;
        let was_active = self
            .sender
            .borrow()
            .as_ref()
            .is_some_and(AgentStatus::is_active);

        self.sender.send_replace(Some(status.clone()));

        if was_active && !status.is_active() {
            tracing::info!(status = %status.status, "agent finished, refreshing graph");
            if let Err(e) = session.refresh().await {
                tracing::warn!(error = %e, "refresh after agent run failed");
            }
        }
        Ok(status)
    }

    /// Run until Ctrl+C or until the session is closed
    ///
    /// Poll failures are logged and polling continues.
    pub async fn run<B: OntologyBackend>(&self, session: &GraphSession<B>) -> Result<(), SessionError> {
        let mut ticker = interval(self.interval);
        tracing::info!("Agent status poller started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if session.is_closed() {
                        break;
                    }
                    if let Err(e) = self.poll_once(session).await {
                        tracing::warn!(error = %e, "agent status poll failed");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping poller");
                    break;
                }
            }
        }

        tracing::info!("Agent status poller stopped");
        Ok(())
    }

    /// Poll a fixed number of times, calling `on_status` after each poll
    ///
    /// Stops at the first failure.
    pub async fn poll_cycles<B, F>(
        &self,
        session: &GraphSession<B>,
        cycles: usize,
        mut on_status: F,
    ) -> Result<(), SessionError>
    where
        B: OntologyBackend,
        F: FnMut(&AgentStatus),
    {
        let mut ticker = interval(self.interval);
        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Agent status poll {}/{}", cycle + 1, cycles);
            let status = self.poll_once(session).await?;
            on_status(&status);
        }
        Ok(())
    }
}
