use crate::auth::{EnvSecretSource, FileSecretSource, SecretSource, StaticSecretSource};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Rate limit: requests per minute per API key, 0 disables it
    #[serde(default)]
    pub rate_limit_per_minute: u32,

    /// Static API keys
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Environment variable holding extra comma-separated API keys
    #[serde(default = "default_api_keys_env")]
    pub api_keys_env: Option<String>,

    /// Mounted secret file holding API keys, comma or newline separated
    #[serde(default)]
    pub api_keys_file: Option<PathBuf>,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Apply `offset` after the store has already applied `limit`.
    ///
    /// Keeps the historical paging behaviour where `offset >= limit` returns an
    /// empty page. Set to `false` to page correctly.
    #[serde(default = "default_true")]
    pub legacy_offset_slicing: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            rate_limit_per_minute: 0,
            api_keys: Vec::new(),
            api_keys_env: default_api_keys_env(),
            api_keys_file: None,
            enable_cors: default_true(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            legacy_offset_slicing: default_true(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server.*` file and
    /// `DOCGATE_SERVER__*` environment variables
    pub fn load() -> anyhow::Result<Self> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(
                config::Environment::with_prefix("DOCGATE_SERVER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("api_keys")
                    .try_parsing(true),
            );

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Every enabled credential source, static list first
    pub fn credential_sources(&self) -> Vec<Box<dyn SecretSource>> {
        let mut sources: Vec<Box<dyn SecretSource>> =
            vec![Box::new(StaticSecretSource::new(self.api_keys.clone()))];
        if let Some(var) = &self.api_keys_env {
            sources.push(Box::new(EnvSecretSource::new(var.clone())));
        }
        if let Some(path) = &self.api_keys_file {
            sources.push(Box::new(FileSecretSource::new(path.clone())));
        }
        sources
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    10
}

fn default_api_keys_env() -> Option<String> {
    Some("API_KEYS".to_string())
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_body_size_mb, 10);
        assert_eq!(cfg.rate_limit_per_minute, 0);
        assert_eq!(cfg.api_keys_env.as_deref(), Some("API_KEYS"));
        assert!(cfg.api_keys.is_empty());
        assert!(cfg.enable_cors);
        assert!(cfg.metrics_enabled);
        assert!(cfg.legacy_offset_slicing);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_max_body_size() {
        let cfg = ServerConfig {
            max_body_size_mb: 2,
            ..ServerConfig::default()
        };
        assert_eq!(cfg.max_body_size(), 2 * 1024 * 1024);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_credential_sources_follow_config() {
        let mut cfg = ServerConfig {
            api_keys_env: None,
            ..ServerConfig::default()
        };
        assert_eq!(cfg.credential_sources().len(), 1);

        cfg.api_keys_env = Some("MY_KEYS".into());
        cfg.api_keys_file = Some(PathBuf::from("/run/secrets/api-keys"));
        let names: Vec<_> = cfg
            .credential_sources()
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "static".to_string(),
                "env:MY_KEYS".to_string(),
                "file:/run/secrets/api-keys".to_string()
            ]
        );
    }

    #[test]
    fn test_deserialize_partial_config() {
        let cfg: ServerConfig =
            serde_json::from_str(r#"{"port": 9000, "api_keys": ["k1"], "legacy_offset_slicing": false}"#)
                .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.api_keys, vec!["k1".to_string()]);
        assert!(!cfg.legacy_offset_slicing);
        assert_eq!(cfg.log_level, "info");
    }
}
