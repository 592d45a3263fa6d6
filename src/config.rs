use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AgentError, Result};

pub const ENV_PROJECT_ENDPOINT: &str = "AZURE_AI_PROJECT_ENDPOINT";
pub const ENV_MODEL_DEPLOYMENT: &str = "MODEL_DEPLOYMENT_NAME";
pub const ENV_GATEWAY_URL: &str = "APIM_GATEWAY_URL";
pub const ENV_GITHUB_MCP_URL: &str = "GITHUB_MCP_URL";
pub const ENV_GITHUB_MCP_CONNECTION: &str = "GITHUB_MCP_CONNECTION_NAME";
pub const ENV_RUST_LOG: &str = "RUST_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub project_endpoint: String,
    pub model: String,
    pub gateway_url: String,
    pub github_mcp_url: String,
    pub github_mcp_connection: String,
    pub agent_name: String,
    pub api_version: String,
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            project_endpoint: "https://roeyzalta-resource.services.ai.azure.com/api/projects/roeyzalta".to_string(),
            model: "gpt-4o".to_string(),
            gateway_url: "https://apim-zjb46ckkogdgm.azure-api.net".to_string(),
            github_mcp_url: "https://api.githubcopilot.com/mcp/".to_string(),
            github_mcp_connection: "github-mcp".to_string(),
            agent_name: "apim-mcp-gateway-agent".to_string(),
            api_version: "2025-11-15-preview".to_string(),
            timeout_ms: 300000,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file(config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AgentError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| AgentError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        log::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Override fields from environment variables; empty values are ignored
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides: [(&str, &mut String); 5] = [
            (ENV_PROJECT_ENDPOINT, &mut self.project_endpoint),
            (ENV_MODEL_DEPLOYMENT, &mut self.model),
            (ENV_GATEWAY_URL, &mut self.gateway_url),
            (ENV_GITHUB_MCP_URL, &mut self.github_mcp_url),
            (ENV_GITHUB_MCP_CONNECTION, &mut self.github_mcp_connection),
        ];

        for (key, field) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                log::debug!("{} overridden from environment", key);
                *field = value;
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Logger filter: a non-empty RUST_LOG wins over `log_level`
    pub fn log_filter(&self, rust_log: Option<&str>) -> String {
        rust_log
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| self.log_level.as_deref().map(str::trim).filter(|v| !v.is_empty()))
            .unwrap_or("info")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_log_filter_precedence() {
        let mut config = Config::default();
        assert_eq!(config.log_filter(None), "info");

        config.log_level = Some("debug".to_string());
        assert_eq!(config.log_filter(None), "debug");
        assert_eq!(config.log_filter(Some("  ")), "debug");
        assert_eq!(config.log_filter(Some("gateway_agent=trace")), "gateway_agent=trace");

        config.log_level = None;
        assert_eq!(config.log_filter(None), "info");
    }

    #[test]
    fn test_log_level_from_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "log_level: warn").unwrap();
        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.log_filter(None), "warn");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.github_mcp_url, "https://api.githubcopilot.com/mcp/");
        assert_eq!(config.github_mcp_connection, "github-mcp");
        assert_eq!(config.agent_name, "apim-mcp-gateway-agent");
        assert_eq!(config.timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_apply_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_MODEL_DEPLOYMENT, "gpt-4.1"),
            (ENV_GATEWAY_URL, "https://gw.example.net"),
            (ENV_GITHUB_MCP_CONNECTION, "gh-conn"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.gateway_url, "https://gw.example.net");
        assert_eq!(config.github_mcp_connection, "gh-conn");
        assert_eq!(config.project_endpoint, Config::default().project_endpoint);
    }

    #[test]
    fn test_apply_env_ignores_empty_values() {
        let mut config = Config::default();
        config.apply_env(|key| (key == ENV_MODEL_DEPLOYMENT).then(|| "  ".to_string()));
        assert_eq!(config.model, "gpt-4o");
    }

    #[test]
    fn test_load_from_yaml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "model: gpt-4o-mini").unwrap();
        writeln!(file, "agent_name: test-agent").unwrap();
        writeln!(file, "timeout_ms: 1000").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.agent_name, "test-agent");
        assert_eq!(config.timeout_ms, 1000);
        // Unspecified fields keep their defaults
        assert_eq!(config.github_mcp_connection, "github-mcp");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let path = PathBuf::from("/nonexistent/gateway-agent.yml");
        let result = Config::load_file(Some(&path));
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "timeout_ms: [not, a, number]").unwrap();
        assert!(Config::load_from_file(file.path()).is_err());
    }
}
