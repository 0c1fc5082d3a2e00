use crate::auth::{CredentialError, CredentialSet};
use crate::config::ServerConfig;
use dashmap::DashMap;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::{Duration, Instant};
use store::{DocumentStore, InMemoryStore};

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// API keys loaded at startup, read-only afterwards
    pub credentials: Arc<CredentialSet>,

    /// Document store behind every data route
    pub store: Arc<dyn DocumentStore>,

    /// Rate limit tracking: API key -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, Instant)>>,

    /// Prometheus render handle, present when the recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Build state from configuration with the bundled in-memory store.
    ///
    /// Fails when the configured credential sources produce no usable key.
    pub fn new(config: ServerConfig) -> Result<Self, CredentialError> {
        let credentials = CredentialSet::from_sources(&config.credential_sources())?;
        Ok(Self::with_store(
            config,
            credentials,
            Arc::new(InMemoryStore::new()),
        ))
    }

    /// Build state around an existing store.
    pub fn with_store(
        config: ServerConfig,
        credentials: CredentialSet,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            credentials: Arc::new(credentials),
            store,
            rate_limiter: Arc::new(DashMap::new()),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Fixed one-minute window per key. Always passes when the limit is 0.
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let limit = self.config.rate_limit_per_minute;
        if limit == 0 {
            return true;
        }

        let now = Instant::now();
        let window = Duration::from_secs(60);

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}
