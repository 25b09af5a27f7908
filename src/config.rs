//! Configuration management for Vault-Tec.
//!
//! Settings come from an optional TOML file, then environment variables
//! (including a `.env` file loaded at startup), then command-line flags.

use crate::error::{Result, VaultError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tenant used when overseer mode skips the login flow.
pub const DEFAULT_TENANT: &str = "test-1756112139";

/// Username used when overseer mode skips the login flow.
pub const DEFAULT_USERNAME: &str = "root";

/// Main configuration structure for Vault-Tec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path or name of the monk executable.
    pub monk_binary: String,

    /// Skip authentication and open the overseer console directly.
    pub overseer_always: bool,

    /// Verbose logging.
    pub debug: bool,

    /// Tenant assumed in overseer mode.
    pub default_tenant: String,

    /// Username assumed in overseer mode.
    pub default_username: String,

    /// Screen to open first, for development.
    pub dev_start_screen: Option<String>,

    /// Treat every session as authenticated, for development.
    pub dev_mock_auth: bool,

    /// Bound on each monk invocation, in seconds.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monk_binary: crate::monk::DEFAULT_EXECUTABLE.to_string(),
            overseer_always: true,
            debug: false,
            default_tenant: DEFAULT_TENANT.to_string(),
            default_username: DEFAULT_USERNAME.to_string(),
            dev_start_screen: None,
            dev_mock_auth: false,
            timeout_secs: 5,
        }
    }
}

/// Parses a boolean environment value, falling back to `default` for anything unrecognised.
pub fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vault-tec")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| VaultError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            VaultError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Loads the file layer and applies the process environment on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        let mut config = Self::load_from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(binary) = lookup("MONK_BINARY").filter(|v| !v.trim().is_empty()) {
            self.monk_binary = binary;
        }
        if let Some(value) = lookup("OVERSEER_ALWAYS") {
            self.overseer_always = parse_bool(&value, self.overseer_always);
        }
        if let Some(value) = lookup("DEBUG") {
            self.debug = parse_bool(&value, self.debug);
        }
        if let Some(tenant) = lookup("DEFAULT_TENANT").filter(|v| !v.is_empty()) {
            self.default_tenant = tenant;
        }
        if let Some(user) = lookup("DEFAULT_USERNAME").filter(|v| !v.is_empty()) {
            self.default_username = user;
        }
        if let Some(screen) = lookup("DEV_START_SCREEN") {
            let screen = screen.trim().to_ascii_lowercase();
            self.dev_start_screen = (!screen.is_empty()).then_some(screen);
        }
        if let Some(value) = lookup("DEV_MOCK_AUTH") {
            self.dev_mock_auth = parse_bool(&value, self.dev_mock_auth);
        }
        if let Some(value) = lookup("MONK_TIMEOUT") {
            self.timeout_secs = value.trim().parse().map_err(|_| {
                VaultError::config(format!("invalid value for MONK_TIMEOUT: '{value}'"))
            })?;
        }
        self.validate()
    }

    /// Rejects settings the bridge cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(VaultError::config("timeout must be at least 1 second"));
        }
        if self.monk_binary.trim().is_empty() {
            return Err(VaultError::config("monk executable must not be empty"));
        }
        Ok(())
    }

    /// Bound on each monk invocation.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.monk_binary, "monk");
        assert!(config.overseer_always);
        assert!(!config.debug);
        assert_eq!(config.default_tenant, "test-1756112139");
        assert_eq!(config.default_username, "root");
        assert_eq!(config.dev_start_screen, None);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_bool() {
        for yes in ["true", "1", "yes", "on", "TRUE", " On "] {
            assert!(parse_bool(yes, false), "{yes}");
        }
        for no in ["false", "0", "no", "off", "Off"] {
            assert!(!parse_bool(no, true), "{no}");
        }
        assert!(parse_bool("maybe", true));
        assert!(!parse_bool("maybe", false));
    }

    #[test]
    fn test_parse_file() {
        let toml = r#"
monk_binary = "/usr/local/bin/monk"
overseer_always = false
default_tenant = "vault-101"
timeout_secs = 10
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.monk_binary, "/usr/local/bin/monk");
        assert!(!config.overseer_always);
        assert_eq!(config.default_tenant, "vault-101");
        assert_eq!(config.default_username, "root");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_file(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_invalid_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        let err = Config::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config: Config = toml::from_str("monk_binary = \"from-file\"").unwrap();
        config
            .apply_env(env(&[
                ("MONK_BINARY", "/opt/monk"),
                ("OVERSEER_ALWAYS", "off"),
                ("DEBUG", "yes"),
                ("DEFAULT_TENANT", "vault-111"),
                ("DEV_START_SCREEN", " Schema "),
                ("DEV_MOCK_AUTH", "1"),
                ("MONK_TIMEOUT", "12"),
            ]))
            .unwrap();

        assert_eq!(config.monk_binary, "/opt/monk");
        assert!(!config.overseer_always);
        assert!(config.debug);
        assert_eq!(config.default_tenant, "vault-111");
        assert_eq!(config.dev_start_screen.as_deref(), Some("schema"));
        assert!(config.dev_mock_auth);
        assert_eq!(config.timeout_secs, 12);
    }

    #[test]
    fn test_unrecognised_bool_keeps_current_value() {
        let mut config = Config::default();
        config
            .apply_env(env(&[("OVERSEER_ALWAYS", "sometimes")]))
            .unwrap();
        assert!(config.overseer_always);
    }

    #[test]
    fn test_invalid_timeout_is_config_error() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("MONK_TIMEOUT", "soon")]))
            .unwrap_err();
        assert_eq!(err.category(), "Configuration Error");

        let err = config.apply_env(env(&[("MONK_TIMEOUT", "0")])).unwrap_err();
        assert!(err.to_string().contains("at least 1 second"));
    }
}
