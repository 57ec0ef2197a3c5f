//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use ontolens_graph::GraphConfig;
use ontolens_sdk::{ClientConfig, DEFAULT_BATCH_LIMIT};
use ontolens_session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name
    #[serde(default = "default_profile")]
    pub active_profile: String,

    /// Available profiles
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Graph construction and layout settings
    #[serde(default)]
    pub graph: GraphConfig,

    /// File this configuration was loaded from
    #[serde(skip)]
    path: Option<PathBuf>,
}

/// Connection profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Ontology service URL
    pub api_url: String,

    /// Bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Maximum entities and relations fetched per refresh
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_limit: Option<usize>,

    /// Per-request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Profile {
    /// Profile pointing at `api_url` with service defaults
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_token: None,
            batch_limit: None,
            timeout_secs: None,
        }
    }

    /// Client settings for this profile
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.api_url);
        config.api_token = self.api_token.clone();
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = timeout;
        }
        config
    }
}

impl Config {
    /// Default configuration file path (`~/.ontolens/config.toml`).
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".ontolens").join("config.toml"))
    }

    /// Load configuration from `path` (or the default path), falling back to
    /// defaults when the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config = toml::from_str::<Config>(&contents)?;
            config.graph.validate().map_err(|e| {
                CliError::Config(format!("Invalid [graph] section in {}: {}", path.display(), e))
            })?;
            config
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        config.path = Some(path);
        Ok(config)
    }

    /// Save configuration to the file it was loaded from.
    pub fn save(&self) -> Result<()> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => Self::default_path()?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Get the active profile.
    pub fn get_active_profile(&self) -> Result<&Profile> {
        self.profiles
            .get(&self.active_profile)
            .ok_or_else(|| CliError::Config(format!("Profile '{}' not found", self.active_profile)))
    }

    /// Active profile with command-line or environment overrides applied.
    pub fn resolve_profile(
        &self,
        api_url: Option<String>,
        api_token: Option<String>,
    ) -> Result<Profile> {
        let mut profile = self.get_active_profile()?.clone();
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            profile.api_url = url;
        }
        if let Some(token) = api_token.filter(|t| !t.is_empty()) {
            profile.api_token = Some(token);
        }
        Ok(profile)
    }

    /// Session settings for `profile`.
    pub fn session_config(&self, profile: &Profile) -> SessionConfig {
        SessionConfig::default()
            .with_batch_limit(profile.batch_limit.unwrap_or(DEFAULT_BATCH_LIMIT))
            .with_graph(self.graph.clone())
    }

    /// Add or update a profile.
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Switch to a different profile.
    pub fn switch_profile(&mut self, name: String) -> Result<()> {
        if !self.profiles.contains_key(&name) {
            return Err(CliError::Config(format!("Profile '{}' does not exist", name)));
        }
        self.active_profile = name;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "default".to_string(),
            Profile::new("http://localhost:9446"),
        );

        Self {
            active_profile: "default".to_string(),
            profiles,
            settings: Settings::default(),
            graph: GraphConfig::default(),
            path: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.active_profile, "default");
        assert!(config.profiles.contains_key("default"));
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
    }

    #[test]
    fn test_profile_management() {
        let mut config = Config::default();

        let mut profile = Profile::new("http://ontology.internal:9446");
        profile.batch_limit = Some(200);
        config.set_profile("staging".to_string(), profile);
        assert!(config.profiles.contains_key("staging"));

        config.switch_profile("staging".to_string()).unwrap();
        assert_eq!(config.active_profile, "staging");

        let profile = config.get_active_profile().unwrap();
        assert_eq!(config.session_config(profile).batch_limit, 200);
    }

    #[test]
    fn test_switch_to_nonexistent_profile() {
        let mut config = Config::default();
        let result = config.switch_profile("nonexistent".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::load(Some(&path)).unwrap();
        let mut profile = Profile::new("http://localhost:7000");
        profile.api_token = Some("t0ken".to_string());
        config.set_profile("local".to_string(), profile.clone());
        config.switch_profile("local".to_string()).unwrap();
        config.settings.color = false;
        config.save().unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.active_profile, "local");
        assert_eq!(loaded.get_active_profile().unwrap(), &profile);
        assert!(!loaded.settings.color);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            active_profile = "default"

            [profiles.default]
            api_url = "http://localhost:9446"

            [graph]
            canvas_size = 400.0
            "#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.graph.canvas_size, 400.0);
        assert_eq!(config.graph.max_node_size, GraphConfig::default().max_node_size);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "active_profile = [").unwrap();

        assert!(matches!(Config::load(Some(&path)), Err(CliError::Toml(_))));
    }

    #[test]
    fn test_invalid_graph_section_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [graph]
            canvas_size = -400.0
            "#,
        )
        .unwrap();

        assert!(matches!(Config::load(Some(&path)), Err(CliError::Config(_))));
    }

    #[test]
    fn test_overrides_apply_to_resolved_profile() {
        let config = Config::default();

        let profile = config
            .resolve_profile(Some("http://override:1234".to_string()), Some("abc".to_string()))
            .unwrap();
        assert_eq!(profile.api_url, "http://override:1234");
        assert_eq!(profile.client_config().api_token.as_deref(), Some("abc"));

        let untouched = config.resolve_profile(Some("  ".to_string()), None).unwrap();
        assert_eq!(untouched.api_url, "http://localhost:9446");
    }
}
