//! Agent configuration.
//!
//! [`AgentOptions`] holds the raw operator input. It is validated once
//! into an immutable [`AgentConfig`], which fixes the service id and the
//! check definition before anything is sent to the registry.

use std::time::Duration;

use consulate_registry::{CheckDefinition, ServiceRegistration};
use tracing::info;

use crate::error::ConfigError;

pub const DEFAULT_REGISTRY_ADDR: &str = "localhost:8500";
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
/// Longest accepted heartbeat interval.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Raw operator input.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub registry_addr: String,
    pub name: String,
    pub id: Option<String>,
    pub port: Option<u16>,
    /// Comma-delimited tag list.
    pub tags: Option<String>,
    /// TTL of the generated check. Ignored when `check` is given.
    pub ttl: Duration,
    pub interval: Duration,
    /// JSON check definition replacing the generated TTL check.
    pub check: Option<String>,
    /// Command to supervise, program first. Empty means none.
    pub command: Vec<String>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            registry_addr: DEFAULT_REGISTRY_ADDR.to_string(),
            name: String::new(),
            id: None,
            port: None,
            tags: None,
            ttl: DEFAULT_TTL,
            interval: DEFAULT_INTERVAL,
            check: None,
            command: Vec::new(),
        }
    }
}

/// Validated, immutable agent configuration.
///
/// Only [`AgentConfig::from_options`] builds one, so every instance has
/// passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    registry_addr: String,
    name: String,
    /// Resolved once; never recomputed.
    service_id: String,
    tags: Vec<String>,
    port: Option<u16>,
    check: CheckDefinition,
    heartbeat_interval: Duration,
    command: Option<Vec<String>>,
}

impl AgentConfig {
    pub fn from_options(options: AgentOptions) -> Result<Self, ConfigError> {
        if options.name.is_empty() {
            return Err(ConfigError::MissingName);
        }
        let heartbeat_interval = validate_interval(options.interval)?;

        let port = options.port.filter(|p| *p > 0);
        let service_id = resolve_service_id(&options.name, options.id.as_deref(), port);
        if options.id.as_deref().unwrap_or_default().is_empty() && port.is_some() {
            info!(%service_id, "derived service id from name and port");
        }

        let check = match options.check.as_deref() {
            Some(json) if !json.is_empty() => parse_check(json)?,
            _ => default_ttl_check(options.ttl),
        };

        let command = if options.command.is_empty() {
            None
        } else {
            Some(options.command)
        };

        Ok(Self {
            registry_addr: options.registry_addr,
            name: options.name,
            service_id,
            tags: parse_tags(options.tags.as_deref().unwrap_or_default()),
            port,
            check,
            heartbeat_interval,
            command,
        })
    }

    pub fn registry_addr(&self) -> &str {
        &self.registry_addr
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn check(&self) -> &CheckDefinition {
        &self.check
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    /// Command to supervise, program first.
    pub fn command(&self) -> Option<&[String]> {
        self.command.as_deref()
    }

    /// The registration request for this service.
    pub fn registration(&self) -> ServiceRegistration {
        ServiceRegistration {
            name: self.name.clone(),
            id: self.service_id.clone(),
            tags: self.tags.clone(),
            port: self.port,
            check: Some(self.check.clone()),
        }
    }
}

/// Accept intervals in `(0, MAX_INTERVAL]`.
pub fn validate_interval(interval: Duration) -> Result<Duration, ConfigError> {
    if interval.is_zero() || interval > MAX_INTERVAL {
        return Err(ConfigError::InvalidInterval {
            interval,
            max: MAX_INTERVAL,
        });
    }
    Ok(interval)
}

/// Explicit id if non-empty, else `name:port` when a port is set, else the name.
pub fn resolve_service_id(name: &str, id: Option<&str>, port: Option<u16>) -> String {
    match (id, port) {
        (Some(id), _) if !id.is_empty() => id.to_string(),
        (_, Some(port)) if port > 0 => format!("{name}:{port}"),
        _ => name.to_string(),
    }
}

/// Split a comma-delimited tag list, dropping blank entries.
pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a JSON object of string values, e.g. `{"HTTP": "...", "Interval": "10s"}`.
pub fn parse_check(json: &str) -> Result<CheckDefinition, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::InvalidCheck(e.to_string()))
}

/// `{"TTL": "<seconds>s"}`.
pub fn default_ttl_check(ttl: Duration) -> CheckDefinition {
    CheckDefinition::from([("TTL".to_string(), format!("{}s", ttl.as_secs()))])
}

/// Parse a duration string like "5s", "500ms", "1m", or a bare number of seconds.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let trimmed = s.trim();
    let parsed = if let Some(ms) = trimmed.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = trimmed.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = trimmed.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        trimmed.parse::<u64>().ok().map(Duration::from_secs)
    };
    parsed.ok_or_else(|| ConfigError::InvalidDuration(s.to_string()))
}
