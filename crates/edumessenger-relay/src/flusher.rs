// Copyright 2024-Present eduMessenger. https://edumessenger.org/
// SPDX-License-Identifier: Apache-2.0

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::event::RelayPayload;

/// How much of an unexpected response body is kept in the error.
const RESPONSE_SNIPPET_LEN: usize = 40;

/// Transmits a serialized batch of actions to eduMessenger.
#[async_trait]
pub trait ActionFlusher: Send + Sync {
    /// Sends the payload once. No retries; the caller decides what happens
    /// to a failed batch.
    async fn send(&self, payload: &RelayPayload) -> Result<(), RelayError>;
}

/// Flusher that POSTs the payload as JSON to the configured endpoint.
pub struct HttpActionFlusher {
    client: reqwest::Client,
    server_url: String,
}

impl HttpActionFlusher {
    pub fn new(config: &RelayConfig) -> Self {
        let client = build_client(config).unwrap_or_else(|e| {
            error!("Unable to apply HTTP client configuration: {e}, using defaults");
            reqwest::Client::new()
        });
        HttpActionFlusher {
            client,
            server_url: config.server_url.clone(),
        }
    }

    /// Flusher backed by a caller-supplied client, e.g. to share a
    /// connection pool with the host.
    pub fn with_client(config: &RelayConfig, client: reqwest::Client) -> Self {
        HttpActionFlusher {
            client,
            server_url: config.server_url.clone(),
        }
    }
}

#[async_trait]
impl ActionFlusher for HttpActionFlusher {
    async fn send(&self, payload: &RelayPayload) -> Result<(), RelayError> {
        let time = Instant::now();
        let response = self
            .client
            .post(&self.server_url)
            .json(payload)
            .send()
            .await?;
        let body = response.text().await?;

        // The service acknowledges with a bare "ok" body; anything else is a
        // failure, whatever the status code says.
        if body != "ok" {
            return Err(RelayError::UnexpectedResponse(snippet(&body)));
        }

        debug!(
            "Sent {} actions in {} ms",
            payload.actions.len(),
            time.elapsed().as_millis()
        );
        Ok(())
    }
}

fn build_client(config: &RelayConfig) -> Result<reqwest::Client, RelayError> {
    let mut builder = reqwest::Client::builder().timeout(config.request_timeout());
    if let Some(proxy) = config.https_proxy.as_deref() {
        builder = builder.proxy(reqwest::Proxy::https(proxy)?);
    }
    Ok(builder.build()?)
}

fn snippet(body: &str) -> String {
    body.chars().take(RESPONSE_SNIPPET_LEN).collect()
}
