// Copyright 2024-Present eduMessenger. https://edumessenger.org/
// SPDX-License-Identifier: Apache-2.0

//! Host-platform collaborator seams.
//!
//! The relay never talks to the platform's database, settings storage, or
//! file storage directly. The host hands implementations of these traits to
//! [`Relay::connect`](crate::relay::Relay::connect); everything the relay
//! needs from the platform goes through them.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

/// Errors surfaced by the host-platform collaborators
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Record lookup failed: {0}")]
    Lookup(String),

    #[error("Settings storage failed: {0}")]
    Settings(String),

    #[error("File storage failed: {0}")]
    Storage(String),
}

/// Site-level facts forwarded in the registration action.
#[derive(Debug, Clone)]
pub struct SiteInfo {
    /// Public root URL of the platform installation.
    pub root_url: String,
    /// Full name of the site course.
    pub site_name: String,
    pub support_email: String,
}

/// Record lookups against the platform database.
///
/// Record-shaped results are returned as the platform stores them; the relay
/// passes them through untouched apart from the enrichment rules.
#[async_trait]
pub trait PlatformDirectory: Send + Sync {
    async fn site_info(&self) -> Result<SiteInfo, PlatformError>;

    async fn course_name(&self, course_id: i64) -> Result<Option<String>, PlatformError>;

    async fn forum(&self, forum_id: i64) -> Result<Option<Value>, PlatformError>;

    /// Every discussion of the given forum.
    async fn forum_discussions(&self, forum_id: i64) -> Result<Vec<Value>, PlatformError>;

    async fn discussion(&self, discussion_id: i64) -> Result<Option<Value>, PlatformError>;

    /// Every post of the given discussion.
    async fn discussion_posts(&self, discussion_id: i64) -> Result<Vec<Value>, PlatformError>;

    async fn group(&self, group_id: i64) -> Result<Option<Value>, PlatformError>;

    async fn user(&self, user_id: i64) -> Result<Option<Value>, PlatformError>;
}

/// Plugin-scoped settings storage.
#[async_trait]
pub trait PlatformSettings: Send + Sync {
    /// Comma-separated list of log store names the platform has switched on.
    async fn enabled_log_stores(&self) -> Result<String, PlatformError>;

    /// Fingerprint of the last registration sent upstream, if any.
    async fn last_registration_fingerprint(&self) -> Result<Option<String>, PlatformError>;

    async fn store_registration_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<(), PlatformError>;
}

/// Site logo file storage.
#[async_trait]
pub trait LogoStore: Send + Sync {
    /// Content hash of the site logo, if one is set. Cheap; used for the
    /// registration fingerprint.
    async fn content_hash(&self) -> Result<Option<String>, PlatformError>;

    /// Raw logo file content. Only read when a registration is actually
    /// sent.
    async fn content(&self) -> Result<Option<Bytes>, PlatformError>;
}
