//! Counters for session activity

use ontolens_domain::EvaluationAction;
use std::collections::BTreeMap;

/// Metrics collected by a [`GraphSession`](crate::GraphSession)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionMetrics {
    /// Refreshes whose graph was published
    pub refreshes_applied: usize,

    /// Refreshes whose result was dropped because a newer one won or the
    /// session closed
    pub refreshes_discarded: usize,

    /// Refreshes that failed to fetch
    pub refreshes_failed: usize,

    /// Successful actions per action name
    pub actions_succeeded: BTreeMap<&'static str, usize>,

    /// Failed actions per action name
    pub actions_failed: BTreeMap<&'static str, usize>,
}

impl SessionMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_action(&mut self, action: EvaluationAction, ok: bool) {
        let bucket = if ok {
            &mut self.actions_succeeded
        } else {
            &mut self.actions_failed
        };
        *bucket.entry(action.as_str()).or_insert(0) += 1;
    }

    /// Total successful actions
    pub fn total_succeeded(&self) -> usize {
        self.actions_succeeded.values().sum()
    }

    /// Total failed actions
    pub fn total_failed(&self) -> usize {
        self.actions_failed.values().sum()
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Session Metrics Summary".to_string(),
            "=======================".to_string(),
            format!(
                "Refreshes: {} applied, {} discarded, {} failed",
                self.refreshes_applied, self.refreshes_discarded, self.refreshes_failed
            ),
        ];

        if !self.actions_succeeded.is_empty() || !self.actions_failed.is_empty() {
            lines.push("Actions:".to_string());
            let names: std::collections::BTreeSet<_> = self
                .actions_succeeded
                .keys()
                .chain(self.actions_failed.keys())
                .collect();
            for name in names {
                lines.push(format!(
                    "  {}: {} ok, {} failed",
                    name,
                    self.actions_succeeded.get(name).copied().unwrap_or(0),
                    self.actions_failed.get(name).copied().unwrap_or(0)
                ));
            }
        }

        lines.join("\n")
    }
}
