//! Registry domain types.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Health-check policy sent along with a registration, e.g. `{"TTL": "30s"}`.
pub type CheckDefinition = BTreeMap<String, String>;

/// Prefix the agent gives to a service's own check.
const CHECK_ID_PREFIX: &str = "service:";

/// Check identifier the agent assigns to the check registered with a service.
pub fn check_id_for(service_id: &str) -> String {
    format!("{CHECK_ID_PREFIX}{service_id}")
}

/// Status pushed to a TTL check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    /// Path segment used by the agent's check endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A service registration request.
///
/// Serializes to the agent's registration body. Empty or unset optional
/// fields are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRegistration {
    pub name: String,
    /// Empty means "use the name".
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<CheckDefinition>,
}

impl ServiceRegistration {
    /// The id the service is registered under.
    pub fn resolved_id(&self) -> &str {
        if self.id.is_empty() { &self.name } else { &self.id }
    }
}

/// Identifiers returned by a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub service_id: String,
    pub check_id: String,
}
