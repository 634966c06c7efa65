//! Configuration Management
//!
//! Handles persistent configuration storage for azwb. Secrets are never
//! stored here; they come from the environment only.

use crate::azure::auth::DEFAULT_AUTHORITY_HOST;
use crate::azure::client::{DEFAULT_ENDPOINT, WORKBOOKS_API_VERSION};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Per-operation timeouts, in seconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timeouts {
    #[serde(default = "Timeouts::default_write")]
    pub create_update: u64,
    #[serde(default = "Timeouts::default_read")]
    pub read: u64,
    #[serde(default = "Timeouts::default_write")]
    pub delete: u64,
}

impl Timeouts {
    fn default_write() -> u64 {
        30 * 60
    }

    fn default_read() -> u64 {
        5 * 60
    }

    pub fn create_update(&self) -> Duration {
        Duration::from_secs(self.create_update)
    }

    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read)
    }

    pub fn delete(&self) -> Duration {
        Duration::from_secs(self.delete)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create_update: Self::default_write(),
            read: Self::default_read(),
            delete: Self::default_write(),
        }
    }
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    /// Resource Manager endpoint, for sovereign clouds
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub authority_host: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
    /// Where applied identities are recorded
    #[serde(default)]
    pub state_path: Option<PathBuf>,
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// First non-empty environment variable among `names`
fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("azwb").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Get effective subscription (config > AZURE_SUBSCRIPTION_ID > ARM_SUBSCRIPTION_ID)
    ///
    /// CLI flags are applied by the caller before this is consulted.
    pub fn effective_subscription(&self) -> Result<String> {
        let subscription = self
            .subscription_id
            .clone()
            .or_else(|| env_first(&["AZURE_SUBSCRIPTION_ID", "ARM_SUBSCRIPTION_ID"]))
            .context("No subscription configured. Set AZURE_SUBSCRIPTION_ID or use --subscription")?;

        if uuid::Uuid::parse_str(&subscription).is_err() {
            bail!("Subscription id {:?} is not a UUID", subscription);
        }
        Ok(subscription)
    }

    pub fn effective_tenant(&self) -> Option<String> {
        self.tenant_id
            .clone()
            .or_else(|| env_first(&["AZURE_TENANT_ID", "ARM_TENANT_ID"]))
    }

    pub fn effective_client_id(&self) -> Option<String> {
        self.client_id
            .clone()
            .or_else(|| env_first(&["AZURE_CLIENT_ID", "ARM_CLIENT_ID"]))
    }

    /// Resource Manager endpoint, validated as an absolute http(s) URL
    pub fn effective_endpoint(&self) -> Result<String> {
        let endpoint = self
            .endpoint
            .clone()
            .or_else(|| env_first(&["AZURE_RESOURCE_MANAGER_ENDPOINT"]))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        validate_url(&endpoint)?;
        Ok(endpoint)
    }

    pub fn effective_authority_host(&self) -> Result<String> {
        let host = self
            .authority_host
            .clone()
            .or_else(|| env_first(&["AZURE_AUTHORITY_HOST"]))
            .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string());
        validate_url(&host)?;
        Ok(host)
    }

    pub fn effective_api_version(&self) -> String {
        self.api_version
            .clone()
            .unwrap_or_else(|| WORKBOOKS_API_VERSION.to_string())
    }

    /// State file (config > ./azwb-state.json)
    pub fn effective_state_path(&self) -> PathBuf {
        self.state_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("azwb-state.json"))
    }

    /// Set one key from `azwb config set`
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let opt = || (!value.is_empty()).then(|| value.to_string());
        match key {
            "subscription_id" => self.subscription_id = opt(),
            "tenant_id" => self.tenant_id = opt(),
            "client_id" => self.client_id = opt(),
            "endpoint" => {
                if !value.is_empty() {
                    validate_url(value)?;
                }
                self.endpoint = opt();
            }
            "authority_host" => {
                if !value.is_empty() {
                    validate_url(value)?;
                }
                self.authority_host = opt();
            }
            "api_version" => self.api_version = opt(),
            "state_path" => self.state_path = opt().map(PathBuf::from),
            "timeouts.create_update" => self.timeouts.create_update = parse_secs(value)?,
            "timeouts.read" => self.timeouts.read = parse_secs(value)?,
            "timeouts.delete" => self.timeouts.delete = parse_secs(value)?,
            _ => bail!("Unknown config key {:?}", key),
        }
        Ok(())
    }
}

fn parse_secs(value: &str) -> Result<u64> {
    let secs: u64 = value
        .parse()
        .with_context(|| format!("Expected a number of seconds, got {:?}", value))?;
    if secs == 0 {
        bail!("Timeout must be greater than zero");
    }
    Ok(secs)
}

fn validate_url(value: &str) -> Result<()> {
    let url = url::Url::parse(value).with_context(|| format!("Invalid URL {:?}", value))?;
    if !matches!(url.scheme(), "https" | "http") {
        bail!("URL {:?} must use http or https", value);
    }
    Ok(())
}
