//! Configuration for graph construction and layout

use serde::{Deserialize, Serialize};

/// Configuration for building an [`OntologyGraph`](crate::OntologyGraph)
///
/// # Examples
///
/// ```
/// use ontolens_graph::GraphConfig;
///
/// let config = GraphConfig::default();
/// assert_eq!(config.min_node_size, 4.0);
/// assert_eq!(config.max_node_size, 16.0);
///
/// // Small canvas, short layout run
/// let config = GraphConfig::compact();
/// assert!(config.canvas_size < GraphConfig::default().canvas_size);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Visual size of nodes with no relations
    /// Default: 4.0
    #[serde(default = "default_min_node_size")]
    pub min_node_size: f64,

    /// Visual size of the highest-degree node
    /// Default: 16.0
    #[serde(default = "default_max_node_size")]
    pub max_node_size: f64,

    /// Width and height of the square canvas, centred on the origin
    /// Default: 1000.0
    #[serde(default = "default_canvas_size")]
    pub canvas_size: f64,

    /// Seed for initial node positions (random when unset)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Force layout settings
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Force-directed layout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Run the layout after every rebuild
    /// Default: true
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Number of simulation steps
    /// Default: 150
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Pull towards the canvas centre, keeps disconnected components close
    /// Default: 0.05
    #[serde(default = "default_gravity")]
    pub gravity: f64,

    /// Maximum displacement in the first step, as a fraction of the canvas
    /// Default: 0.1
    #[serde(default = "default_initial_temperature")]
    pub initial_temperature: f64,
}

fn default_min_node_size() -> f64 {
    4.0
}

fn default_max_node_size() -> f64 {
    16.0
}

fn default_canvas_size() -> f64 {
    1000.0
}

fn default_true() -> bool {
    true
}

fn default_iterations() -> usize {
    150
}

fn default_gravity() -> f64 {
    0.05
}

fn default_initial_temperature() -> f64 {
    0.1
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            min_node_size: default_min_node_size(),
            max_node_size: default_max_node_size(),
            canvas_size: default_canvas_size(),
            seed: None,
            layout: LayoutConfig::default(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            iterations: default_iterations(),
            gravity: default_gravity(),
            initial_temperature: default_initial_temperature(),
        }
    }
}

impl GraphConfig {
    /// Small canvas and a short layout run, for quick previews
    pub fn compact() -> Self {
        Self {
            min_node_size: 2.0,
            max_node_size: 8.0,
            canvas_size: 400.0,
            seed: None,
            layout: LayoutConfig {
                iterations: 50,
                ..LayoutConfig::default()
            },
        }
    }

    /// Large canvas and a long layout run, for dense graphs
    pub fn detailed() -> Self {
        Self {
            min_node_size: 4.0,
            max_node_size: 24.0,
            canvas_size: 2000.0,
            seed: None,
            layout: LayoutConfig {
                iterations: 400,
                gravity: 0.02,
                ..LayoutConfig::default()
            },
        }
    }

    /// Same configuration with a fixed seed (reproducible positions)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Same configuration with the layout step switched off
    pub fn without_layout(mut self) -> Self {
        self.layout.enabled = false;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.canvas_size.is_finite() && self.canvas_size > 0.0) {
            return Err("canvas_size must be a positive number".to_string());
        }
        if !(self.min_node_size.is_finite() && self.min_node_size >= 0.0) {
            return Err("min_node_size must be a non-negative number".to_string());
        }
        if !(self.max_node_size.is_finite() && self.max_node_size >= self.min_node_size) {
            return Err("max_node_size cannot be less than min_node_size".to_string());
        }
        if !(self.layout.gravity.is_finite() && self.layout.gravity >= 0.0) {
            return Err("layout.gravity must be a non-negative number".to_string());
        }
        if !(self.layout.initial_temperature.is_finite() && self.layout.initial_temperature > 0.0) {
            return Err("layout.initial_temperature must be a positive number".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GraphConfig::default();
        assert_eq!(config.canvas_size, 1000.0);
        assert_eq!(config.seed, None);
        assert!(config.layout.enabled);
        assert_eq!(config.layout.iterations, 150);
    }

    #[test]
    fn test_presets() {
        let compact = GraphConfig::compact();
        let detailed = GraphConfig::detailed();
        assert!(compact.layout.iterations < detailed.layout.iterations);
        assert!(compact.max_node_size < detailed.max_node_size);
    }

    #[test]
    fn test_builders() {
        let config = GraphConfig::default().with_seed(7).without_layout();
        assert_eq!(config.seed, Some(7));
        assert!(!config.layout.enabled);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(GraphConfig::default().validate().is_ok());
        assert!(GraphConfig::compact().validate().is_ok());
        assert!(GraphConfig::detailed().validate().is_ok());
    }

    #[test]
    fn test_invalid_canvas_size() {
        let mut config = GraphConfig::default();
        config.canvas_size = -10.0;
        assert!(config.validate().is_err());
        config.canvas_size = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_node_sizes() {
        let mut config = GraphConfig::default();
        config.max_node_size = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: GraphConfig = toml::from_str(
            r#"
            max_node_size = 30.0

            [layout]
            iterations = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.max_node_size, 30.0);
        assert_eq!(config.min_node_size, 4.0);
        assert_eq!(config.layout.iterations, 10);
        assert!(config.layout.enabled);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = GraphConfig::detailed().with_seed(42);
        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: GraphConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }
}
