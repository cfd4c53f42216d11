//! Send gate: the cached "provider configured" flag.
//!
//! Refreshed opportunistically via the status check, so it can be stale by
//! one check. It only gates chat sends and never influences storage routing.

use chrono::{DateTime, Utc};
use quill_types::deployment::DeploymentMode;

use crate::llm::ChatProvider;

const LOCAL_UNREACHABLE: &str =
    "Cannot reach the local proxy. Start the server and check again.";
const HOSTED_UNKNOWN: &str = "Provider status unknown; sending anyway.";

#[derive(Debug, Clone)]
pub struct SendGate {
    mode: DeploymentMode,
    configured: bool,
    message: String,
    checked_at: Option<DateTime<Utc>>,
}

impl SendGate {
    /// A gate that has not checked yet. Starts at the mode's failure default.
    pub fn new(mode: DeploymentMode) -> Self {
        Self {
            mode,
            configured: mode.configured_on_check_failure(),
            message: Self::failure_message(mode).to_string(),
            checked_at: None,
        }
    }

    fn failure_message(mode: DeploymentMode) -> &'static str {
        match mode {
            DeploymentMode::Local => LOCAL_UNREACHABLE,
            DeploymentMode::Hosted => HOSTED_UNKNOWN,
        }
    }

    /// Check the provider and update the flag. Returns the new value.
    ///
    /// A failed check fails closed in local mode and open in hosted mode.
    pub async fn refresh<P: ChatProvider>(&mut self, provider: &P) -> bool {
        match provider.check().await {
            Ok(status) => {
                self.configured = status.configured;
                self.message = status.message;
            }
            Err(e) => {
                tracing::warn!(mode = %self.mode, error = %e, "Provider status check failed");
                self.configured = self.mode.configured_on_check_failure();
                self.message = Self::failure_message(self.mode).to_string();
            }
        }
        self.checked_at = Some(Utc::now());
        tracing::debug!(configured = self.configured, "Provider status refreshed");
        self.configured
    }

    pub fn is_open(&self) -> bool {
        self.configured
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn checked_at(&self) -> Option<DateTime<Utc>> {
        self.checked_at
    }
}
