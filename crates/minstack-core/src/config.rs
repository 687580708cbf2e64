//! Configuration types for the min-stack system
//!
//! This module defines how a [`Registry`](crate::Registry) discovers
//! implementations beyond the built-in catalog.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name resolved by `stack_init`-style callers that do not pick one
pub const DEFAULT_IMPLEMENTATION: &str = "generic";

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Directory holding loadable artifacts (no dynamic discovery when absent)
    #[serde(default)]
    pub plugin_dir: Option<PathBuf>,

    /// File suffix identifying artifacts, leading dot included
    #[serde(default = "default_artifact_suffix")]
    pub artifact_suffix: String,

    /// How artifacts are located in `plugin_dir`
    #[serde(default)]
    pub discovery: DiscoveryStrategy,

    /// Implementation used when the caller does not name one
    #[serde(default = "default_implementation")]
    pub default_implementation: String,
}

impl RegistryConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            plugin_dir: None,
            artifact_suffix: default_artifact_suffix(),
            discovery: DiscoveryStrategy::default(),
            default_implementation: default_implementation(),
        }
    }

    /// Set the artifact directory
    pub fn with_plugin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugin_dir = Some(dir.into());
        self
    }

    /// Set the discovery strategy
    pub fn with_discovery(mut self, discovery: DiscoveryStrategy) -> Self {
        self.discovery = discovery;
        self
    }

    /// Load configuration from environment variables
    ///
    /// - `MINSTACK_PLUGIN_DIR`: artifact directory
    /// - `MINSTACK_ARTIFACT_SUFFIX`: artifact suffix (e.g. `.so`)
    /// - `MINSTACK_DISCOVERY`: `direct_path`, `scan` or `builtin_only`
    /// - `MINSTACK_DEFAULT_IMPL`: default implementation name
    pub fn from_env() -> Result<Self, crate::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, crate::Error> {
        let mut config = Self::new();

        if let Some(dir) = lookup("MINSTACK_PLUGIN_DIR").filter(|s| !s.is_empty()) {
            config.plugin_dir = Some(PathBuf::from(dir));
        }
        if let Some(suffix) = lookup("MINSTACK_ARTIFACT_SUFFIX") {
            config.artifact_suffix = suffix;
        }
        if let Some(discovery) = lookup("MINSTACK_DISCOVERY") {
            config.discovery = discovery.parse()?;
        }
        if let Some(name) = lookup("MINSTACK_DEFAULT_IMPL") {
            config.default_implementation = name;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.artifact_suffix.is_empty() {
            return Err(crate::Error::config("artifact suffix cannot be empty"));
        }
        if !self.artifact_suffix.starts_with('.') {
            return Err(crate::Error::config(format!(
                "artifact suffix must start with '.', got '{}'",
                self.artifact_suffix
            )));
        }
        if self.default_implementation.is_empty() {
            return Err(crate::Error::config("default implementation cannot be empty"));
        }
        if let Some(dir) = &self.plugin_dir
            && dir.as_os_str().is_empty()
        {
            return Err(crate::Error::config("plugin directory cannot be empty"));
        }
        Ok(())
    }

    /// `true` when artifacts may be loaded from disk
    pub fn loads_artifacts(&self) -> bool {
        self.discovery != DiscoveryStrategy::BuiltinOnly && self.plugin_dir.is_some()
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// How artifacts are located
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStrategy {
    /// Open `<plugin_dir>/<name><suffix>` directly
    #[default]
    DirectPath,
    /// Try every artifact in `plugin_dir` until one answers to the name
    Scan,
    /// Never load artifacts
    BuiltinOnly,
}

impl std::fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DiscoveryStrategy::DirectPath => "direct_path",
            DiscoveryStrategy::Scan => "scan",
            DiscoveryStrategy::BuiltinOnly => "builtin_only",
        })
    }
}

impl std::str::FromStr for DiscoveryStrategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct_path" | "direct" => Ok(DiscoveryStrategy::DirectPath),
            "scan" => Ok(DiscoveryStrategy::Scan),
            "builtin_only" | "builtin" => Ok(DiscoveryStrategy::BuiltinOnly),
            other => Err(crate::Error::config(format!(
                "discovery strategy '{}' is not supported. \
                Supported strategies: direct_path, scan, builtin_only",
                other
            ))),
        }
    }
}

fn default_artifact_suffix() -> String {
    std::env::consts::DLL_SUFFIX.to_string()
}

fn default_implementation() -> String {
    DEFAULT_IMPLEMENTATION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_loads_nothing() {
        let config = RegistryConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.loads_artifacts());
        assert_eq!(config.default_implementation, "generic");
        assert_eq!(config.artifact_suffix, std::env::consts::DLL_SUFFIX);
    }

    #[test]
    fn test_from_lookup() {
        let config = RegistryConfig::from_lookup(lookup(&[
            ("MINSTACK_PLUGIN_DIR", "/opt/minstack"),
            ("MINSTACK_DISCOVERY", "scan"),
            ("MINSTACK_ARTIFACT_SUFFIX", ".plugin"),
        ]))
        .unwrap();

        assert_eq!(config.plugin_dir, Some(PathBuf::from("/opt/minstack")));
        assert_eq!(config.discovery, DiscoveryStrategy::Scan);
        assert_eq!(config.artifact_suffix, ".plugin");
        assert!(config.loads_artifacts());
    }

    #[test]
    fn test_from_lookup_rejects_unknown_strategy() {
        let config = RegistryConfig::from_lookup(lookup(&[("MINSTACK_DISCOVERY", "scan")])).unwrap();
        assert!(!config.loads_artifacts());

        let err = RegistryConfig::from_lookup(lookup(&[("MINSTACK_DISCOVERY", "hotload")]));
        assert!(matches!(err, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_validate_suffix() {
        let mut config = RegistryConfig::default();
        config.artifact_suffix = "so".to_string();
        assert!(config.validate().is_err());

        config.artifact_suffix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: RegistryConfig =
            serde_json::from_str(r#"{"plugin_dir": "/plugins", "discovery": "scan"}"#).unwrap();

        assert_eq!(config.plugin_dir, Some(PathBuf::from("/plugins")));
        assert_eq!(config.discovery, DiscoveryStrategy::Scan);
        assert_eq!(config.default_implementation, DEFAULT_IMPLEMENTATION);
        assert!(config.validate().is_ok());
    }
}
