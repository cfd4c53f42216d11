//! Deployment mode: the one environment-derived value the core consumes.
//!
//! Decided once per process. It picks the initial sync state of every
//! remote-capable collection and the fail-open/fail-closed default of the
//! provider send gate.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::storage::SyncState;

/// Execution context the process runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Operator runs the proxy on this machine; remote store is reachable.
    Local,
    /// Hosted/stateless deployment; the local cache is the only store.
    Hosted,
}

impl DeploymentMode {
    /// Detect the mode from the remote base URL host.
    ///
    /// `localhost`, `127.0.0.1` and `[::1]` mean local development; anything
    /// else is treated as a hosted deployment.
    pub fn detect(base_url: &str) -> Self {
        let without_scheme = base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(base_url);
        let authority = without_scheme.split('/').next().unwrap_or_default();
        let host = if authority.starts_with('[') {
            authority
                .split_once(']')
                .map(|(h, _)| &h[1..])
                .unwrap_or(authority)
        } else {
            authority.split(':').next().unwrap_or(authority)
        };

        match host.to_ascii_lowercase().as_str() {
            "localhost" | "127.0.0.1" | "::1" => DeploymentMode::Local,
            _ => DeploymentMode::Hosted,
        }
    }

    /// Sync state a remote-capable collection starts in.
    pub fn initial_sync_state(&self) -> SyncState {
        match self {
            DeploymentMode::Local => SyncState::RemoteBacked,
            DeploymentMode::Hosted => SyncState::LocalOnly,
        }
    }

    /// Value of the provider "configured" flag when the status check fails.
    ///
    /// Local mode fails closed (the operator controls the proxy, so an
    /// unreachable proxy means it is not running). Hosted mode fails open.
    pub fn configured_on_check_failure(&self) -> bool {
        match self {
            DeploymentMode::Local => false,
            DeploymentMode::Hosted => true,
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::Local => write!(f, "local"),
            DeploymentMode::Hosted => write!(f, "hosted"),
        }
    }
}

/// Deployment mode as written in `config.toml` or on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentSetting {
    /// Detect from the remote base URL.
    #[default]
    Auto,
    Local,
    Hosted,
}

impl DeploymentSetting {
    pub fn resolve(&self, base_url: &str) -> DeploymentMode {
        match self {
            DeploymentSetting::Auto => DeploymentMode::detect(base_url),
            DeploymentSetting::Local => DeploymentMode::Local,
            DeploymentSetting::Hosted => DeploymentMode::Hosted,
        }
    }
}

impl FromStr for DeploymentSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(DeploymentSetting::Auto),
            "local" => Ok(DeploymentSetting::Local),
            "hosted" => Ok(DeploymentSetting::Hosted),
            other => Err(format!("invalid deployment mode: '{other}'")),
        }
    }
}
