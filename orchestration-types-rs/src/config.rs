// orchestration-types-rs/src/config.rs
// Configuration loader for the disruption orchestrator

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::model::{CapabilityTag, DisruptionCategory, EndpointDescriptor};

static ORCHESTRATOR_CONFIG: OnceCell<Arc<OrchestratorConfig>> = OnceCell::new();

pub const CONFIG_PATH_VAR: &str = "DISRUPTION_ORCH_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "./config/orchestrator.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration not initialized")]
    NotInitialized,

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OrchestratorConfig {
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default, rename = "endpoint")]
    pub endpoints: Vec<EndpointConfig>,
}

/// Decision policy, read once per event
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Minimum composite confidence for a Resolved disposition
    pub policy_threshold: f64,
    pub per_request_timeout_ms: u64,
    /// Deadline budget applied by intake helpers when an event carries none
    pub event_budget_ms: u64,
    /// Consecutive failures that move a Degraded endpoint to Unreachable
    pub failure_threshold: u32,
    /// Per-category replacement of the default capability mapping
    pub routing: BTreeMap<String, Vec<CapabilityTag>>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            policy_threshold: 0.7,
            per_request_timeout_ms: 10_000,
            event_budget_ms: 30_000,
            failure_threshold: 3,
            routing: BTreeMap::new(),
        }
    }
}

impl PolicyConfig {
    pub fn per_request_timeout(&self) -> Duration {
        Duration::from_millis(self.per_request_timeout_ms)
    }

    pub fn event_budget(&self) -> Duration {
        Duration::from_millis(self.event_budget_ms)
    }

    /// Routing overrides keyed by parsed category
    pub fn routing_overrides(&self) -> Result<Vec<(DisruptionCategory, Vec<CapabilityTag>)>, ConfigError> {
        self.routing
            .iter()
            .map(|(name, tags)| {
                let category = DisruptionCategory::ALL
                    .into_iter()
                    .find(|c| c.as_str() == name.as_str())
                    .ok_or_else(|| {
                        ConfigError::InvalidValue(format!("unknown category in routing table: {}", name))
                    })?;
                if tags.is_empty() {
                    return Err(ConfigError::InvalidValue(format!(
                        "routing entry for {} lists no capabilities",
                        name
                    )));
                }
                Ok((category, tags.clone()))
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.policy_threshold.is_finite() || !(0.0..=1.0).contains(&self.policy_threshold) {
            return Err(ConfigError::InvalidValue(format!(
                "policy_threshold must be within [0, 1], got {}",
                self.policy_threshold
            )));
        }
        if self.per_request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("per_request_timeout_ms must be positive".to_string()));
        }
        if self.event_budget_ms == 0 {
            return Err(ConfigError::InvalidValue("event_budget_ms must be positive".to_string()));
        }
        if self.failure_threshold == 0 {
            return Err(ConfigError::InvalidValue("failure_threshold must be at least 1".to_string()));
        }
        self.routing_overrides()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
    pub service_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            service_name: "disruption-orchestrator".to_string(),
        }
    }
}

/// One `[[endpoint]]` table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EndpointConfig {
    pub id: String,
    pub address: String,
    #[serde(default)]
    pub model: Option<String>,
    pub capabilities: Vec<CapabilityTag>,
    pub weight: f64,
}

impl EndpointConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::InvalidValue("endpoint id must not be empty".to_string()));
        }
        if self.address.trim().is_empty() {
            return Err(ConfigError::InvalidValue(format!("endpoint {} has no address", self.id)));
        }
        if self.capabilities.is_empty() {
            return Err(ConfigError::InvalidValue(format!(
                "endpoint {} declares no capabilities",
                self.id
            )));
        }
        if !self.weight.is_finite() || !(0.0..=1.0).contains(&self.weight) {
            return Err(ConfigError::InvalidValue(format!(
                "endpoint {} weight must be within [0, 1], got {}",
                self.id, self.weight
            )));
        }
        Ok(())
    }

    pub fn to_descriptor(&self) -> EndpointDescriptor {
        let descriptor = EndpointDescriptor::new(
            self.id.clone(),
            self.address.clone(),
            self.capabilities.iter().copied(),
            self.weight,
        );
        match &self.model {
            Some(model) => descriptor.with_model(model.clone()),
            None => descriptor,
        }
    }
}

impl OrchestratorConfig {
    /// Load from `DISRUPTION_ORCH_CONFIG` (or the default path), apply
    /// environment overrides, validate, and cache globally.
    pub fn load() -> Result<Arc<OrchestratorConfig>, ConfigError> {
        if let Some(config) = ORCHESTRATOR_CONFIG.get() {
            return Ok(Arc::clone(config));
        }

        dotenv::dotenv().ok();

        let config_path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let config = Self::from_file(&config_path)?;

        let config_arc = Arc::new(config);
        ORCHESTRATOR_CONFIG
            .set(Arc::clone(&config_arc))
            .map_err(|_| ConfigError::InvalidValue("Config already initialized".to_string()))?;

        tracing::info!(
            path = %config_path,
            endpoints = config_arc.endpoints.len(),
            "Loaded orchestrator configuration"
        );

        Ok(config_arc)
    }

    /// Get the cached configuration
    pub fn global() -> Result<Arc<OrchestratorConfig>, ConfigError> {
        ORCHESTRATOR_CONFIG
            .get()
            .map(Arc::clone)
            .ok_or(ConfigError::NotInitialized)
    }

    /// Read a file, apply environment overrides and validate, without caching
    pub fn from_file(path: impl AsRef<Path>) -> Result<OrchestratorConfig, ConfigError> {
        let path = PathBuf::from(path.as_ref());
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = fs::read_to_string(&path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate TOML text; the environment is not consulted
    pub fn from_toml_str(contents: &str) -> Result<OrchestratorConfig, ConfigError> {
        let config = Self::parse(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn parse(contents: &str) -> Result<OrchestratorConfig, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply `ORCH_*` environment overrides on top of file values
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = env_override::<f64>("ORCH_POLICY_THRESHOLD")? {
            self.policy.policy_threshold = v;
        }
        if let Some(v) = env_override::<u64>("ORCH_PER_REQUEST_TIMEOUT_MS")? {
            self.policy.per_request_timeout_ms = v;
        }
        if let Some(v) = env_override::<u64>("ORCH_EVENT_BUDGET_MS")? {
            self.policy.event_budget_ms = v;
        }
        if let Some(v) = env_override::<u32>("ORCH_FAILURE_THRESHOLD")? {
            self.policy.failure_threshold = v;
        }
        if let Ok(level) = env::var("ORCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;

        let mut seen = HashSet::new();
        for endpoint in &self.endpoints {
            endpoint.validate()?;
            if !seen.insert(endpoint.id.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "duplicate endpoint id: {}",
                    endpoint.id
                )));
            }
        }
        Ok(())
    }
}

fn env_override<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(format!("{}={}: {}", name, raw, e))),
        Err(_) => Ok(None),
    }
}
