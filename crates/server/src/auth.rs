//! API key credentials
//!
//! The [`CredentialSet`] is built once at startup from every enabled
//! [`SecretSource`] and then only read. Keys are trimmed and de-duplicated at
//! load time; request-time comparison is exact and constant-time per key.

use std::collections::BTreeSet;
use std::path::PathBuf;

use subtle::{Choice, ConstantTimeEq};
use thiserror::Error;

/// Header carrying the API key. Header names are matched case-insensitively.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no API keys configured: at least one key must be provided")]
    Empty,

    #[error("failed to read API keys from {source_name}: {reason}")]
    Source { source_name: String, reason: String },
}

/// A place API keys can be loaded from at startup.
pub trait SecretSource: Send + Sync {
    /// Human readable origin, used in logs and errors. Never contains key material.
    fn name(&self) -> String;

    /// Raw key entries. Blank entries are allowed and dropped later.
    fn load(&self) -> Result<Vec<String>, CredentialError>;
}

/// Keys listed directly in configuration.
#[derive(Debug, Clone)]
pub struct StaticSecretSource {
    keys: Vec<String>,
}

impl StaticSecretSource {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }
}

impl SecretSource for StaticSecretSource {
    fn name(&self) -> String {
        "static".to_string()
    }

    fn load(&self) -> Result<Vec<String>, CredentialError> {
        Ok(self.keys.clone())
    }
}

/// Comma separated keys in an environment variable. An unset variable yields no keys.
#[derive(Debug, Clone)]
pub struct EnvSecretSource {
    var: String,
}

impl EnvSecretSource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl SecretSource for EnvSecretSource {
    fn name(&self) -> String {
        format!("env:{}", self.var)
    }

    fn load(&self) -> Result<Vec<String>, CredentialError> {
        match std::env::var(&self.var) {
            Ok(raw) => Ok(raw.split(',').map(str::to_string).collect()),
            Err(std::env::VarError::NotPresent) => Ok(Vec::new()),
            Err(err) => Err(CredentialError::Source {
                source_name: self.name(),
                reason: err.to_string(),
            }),
        }
    }
}

/// A mounted secret file (e.g. from a secret manager), comma or newline separated.
#[derive(Debug, Clone)]
pub struct FileSecretSource {
    path: PathBuf,
}

impl FileSecretSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SecretSource for FileSecretSource {
    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn load(&self) -> Result<Vec<String>, CredentialError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|err| CredentialError::Source {
            source_name: self.name(),
            reason: err.to_string(),
        })?;
        Ok(raw
            .split(|c: char| c == ',' || c == '\n')
            .map(str::to_string)
            .collect())
    }
}

/// Immutable allow-list of API keys.
#[derive(Clone)]
pub struct CredentialSet {
    keys: Vec<String>,
}

impl std::fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSet")
            .field("keys", &self.keys.len())
            .finish()
    }
}

impl CredentialSet {
    /// Trim, drop blanks and de-duplicate. Fails when nothing is left.
    pub fn new<I, S>(keys: I) -> Result<Self, CredentialError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: BTreeSet<String> = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keys.is_empty() {
            return Err(CredentialError::Empty);
        }
        Ok(Self {
            keys: keys.into_iter().collect(),
        })
    }

    /// Collect keys from every source. Any unreadable source is fatal.
    pub fn from_sources(sources: &[Box<dyn SecretSource>]) -> Result<Self, CredentialError> {
        let mut collected = Vec::new();
        for source in sources {
            let keys = source.load()?;
            tracing::debug!(source = %source.name(), entries = keys.len(), "read credential source");
            collected.extend(keys);
        }
        let set = Self::new(collected)?;
        tracing::info!(
            sources = sources.len(),
            keys = set.len(),
            "loaded API credentials"
        );
        Ok(set)
    }

    /// True iff `candidate` is non-empty and exactly matches a configured key.
    pub fn authorize(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }
        let mut found = Choice::from(0);
        for key in &self.keys {
            found |= key.as_bytes().ct_eq(candidate.as_bytes());
        }
        found.into()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
