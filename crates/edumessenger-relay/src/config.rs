// Copyright 2024-Present eduMessenger. https://edumessenger.org/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::time::Duration;

use crate::error::RelayError;

/// Name under which the relay appears in the platform's log store list.
pub const STORE_NAME: &str = "edumessenger";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Long-poll style timeout for installations behind slow middleboxes.
const EXTENDED_REQUEST_TIMEOUT_SECS: u64 = 400;

/// Configuration for the eduMessenger relay
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    /// Upstream eduMessenger endpoint receiving the action payloads.
    pub server_url: String,
    /// Site credential sent as `ctoken` in the registration action.
    pub admin_token: String,
    /// Etherpad installation advertised to the service, if any.
    pub etherpad_url: Option<String>,
    /// Whether the service may register new users for this site.
    pub allow_registration: bool,
    /// Whether the service may create courses on this site.
    pub allow_course_creation: bool,
    pub base_category: Option<i64>,
    pub base_course: Option<i64>,
    /// Raises the request timeout to 400s and drops the connect timeout.
    pub extended_timeout: bool,
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
}

impl RelayConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, RelayError> {
        let server_url = env::var("EDUMESSENGER_SERVER_URL").unwrap_or_default();
        let admin_token = env::var("EDUMESSENGER_ADMIN_TOKEN").unwrap_or_default();
        let etherpad_url = env::var("EDUMESSENGER_ETHERPAD_URL").ok();
        let allow_registration = flag_from_env("EDUMESSENGER_ALLOW_REGISTRATION");
        let allow_course_creation = flag_from_env("EDUMESSENGER_ALLOW_COURSE_CREATION");
        let base_category = env::var("EDUMESSENGER_BASE_CATEGORY")
            .ok()
            .and_then(|val| val.parse::<i64>().ok());
        let base_course = env::var("EDUMESSENGER_BASE_COURSE")
            .ok()
            .and_then(|val| val.parse::<i64>().ok());
        let extended_timeout = flag_from_env("EDUMESSENGER_EXTENDED_TIMEOUT");
        let https_proxy = env::var("EDUMESSENGER_PROXY_HTTPS")
            .or_else(|_| env::var("HTTPS_PROXY"))
            .ok();

        let config = Self {
            server_url,
            admin_token,
            etherpad_url,
            allow_registration,
            allow_course_creation,
            base_category,
            base_course,
            extended_timeout,
            https_proxy,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.server_url.trim().is_empty() {
            return Err(RelayError::InvalidConfig(
                "server URL is not set".to_string(),
            ));
        }
        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(RelayError::InvalidConfig(format!(
                "server URL '{}' must be an absolute http(s) URL",
                self.server_url
            )));
        }
        if self.admin_token.trim().is_empty() {
            return Err(RelayError::InvalidConfig(
                "admin token is not set".to_string(),
            ));
        }
        Ok(())
    }

    /// Total request timeout for a flush.
    pub fn request_timeout(&self) -> Duration {
        if self.extended_timeout {
            Duration::from_secs(EXTENDED_REQUEST_TIMEOUT_SECS)
        } else {
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        }
    }
}

fn flag_from_env(name: &str) -> bool {
    env::var(name)
        .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
