//! Configuration for graph sessions

use ontolens_graph::GraphConfig;
use ontolens_sdk::DEFAULT_BATCH_LIMIT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`GraphSession`](crate::GraphSession)
///
/// # Examples
///
/// ```
/// use ontolens_session::SessionConfig;
///
/// let config = SessionConfig::default();
/// assert_eq!(config.batch_limit, 1000);
/// assert_eq!(config.agent_poll_interval().as_millis(), 2000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum entities and relations fetched per refresh
    /// Default: 1000
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,

    /// How often the agent status poller asks the service (in milliseconds)
    /// Default: 2000
    #[serde(default = "default_agent_poll_interval_ms")]
    pub agent_poll_interval_ms: u64,

    /// Graph construction and layout settings
    #[serde(default)]
    pub graph: GraphConfig,
}

fn default_batch_limit() -> usize {
    DEFAULT_BATCH_LIMIT
}

fn default_agent_poll_interval_ms() -> u64 {
    2000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            batch_limit: default_batch_limit(),
            agent_poll_interval_ms: default_agent_poll_interval_ms(),
            graph: GraphConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Poll interval as a [`Duration`], never shorter than 10ms
    pub fn agent_poll_interval(&self) -> Duration {
        Duration::from_millis(self.agent_poll_interval_ms.max(10))
    }

    /// Replace the batch limit
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit;
        self
    }

    /// Replace the graph settings
    pub fn with_graph(mut self, graph: GraphConfig) -> Self {
        self.graph = graph;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_limit == 0 {
            return Err("batch_limit must be greater than 0".to_string());
        }
        self.graph.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SessionConfig = toml::from_str("batch_limit = 250").unwrap();
        assert_eq!(config.batch_limit, 250);
        assert_eq!(config.agent_poll_interval_ms, 2000);
        assert_eq!(config.graph, GraphConfig::default());
    }

    #[test]
    fn test_nested_graph_section() {
        let config: SessionConfig = toml::from_str(
            r#"
            [graph]
            canvas_size = 400.0

            [graph.layout]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.graph.canvas_size, 400.0);
        assert!(!config.graph.layout.enabled);
    }

    #[test]
    fn test_validate() {
        assert!(SessionConfig::default().validate().is_ok());
        assert!(SessionConfig::default().with_batch_limit(0).validate().is_err());

        let mut graph = GraphConfig::default();
        graph.canvas_size = -1.0;
        assert!(SessionConfig::default().with_graph(graph).validate().is_err());
    }

    #[test]
    fn test_poll_interval_floor() {
        let config = SessionConfig {
            agent_poll_interval_ms: 0,
            ..SessionConfig::default()
        };
        assert_eq!(config.agent_poll_interval(), Duration::from_millis(10));
    }
}
