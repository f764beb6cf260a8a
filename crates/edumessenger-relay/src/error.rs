// Copyright 2024-Present eduMessenger. https://edumessenger.org/
// SPDX-License-Identifier: Apache-2.0

use crate::platform::PlatformError;

/// Errors that can occur while relaying activity events
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Platform lookup failed: {0}")]
    Platform(#[from] PlatformError),

    #[error("Failed to reach eduMessenger: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected eduMessenger response: {0}")]
    UnexpectedResponse(String),

    #[error("Failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}
