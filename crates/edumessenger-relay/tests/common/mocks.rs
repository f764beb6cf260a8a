// Copyright 2024-Present eduMessenger. https://edumessenger.org/
// SPDX-License-Identifier: Apache-2.0

//! Fake host-platform collaborators

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};

use edumessenger_relay::platform::{
    LogoStore, PlatformDirectory, PlatformError, PlatformSettings, SiteInfo,
};

/// In-memory platform directory seeded with a small campus.
pub struct FakeDirectory {
    pub course_names: HashMap<i64, String>,
    pub forums: HashMap<i64, Value>,
    pub discussions_by_forum: HashMap<i64, Vec<Value>>,
    pub discussions: HashMap<i64, Value>,
    pub posts_by_discussion: HashMap<i64, Vec<Value>>,
    pub groups: HashMap<i64, Value>,
    pub users: HashMap<i64, Value>,
    /// Makes `site_info` fail, so relay setup fails.
    pub fail_site_info: bool,
}

impl Default for FakeDirectory {
    fn default() -> Self {
        let mut directory = FakeDirectory {
            course_names: HashMap::new(),
            forums: HashMap::new(),
            discussions_by_forum: HashMap::new(),
            discussions: HashMap::new(),
            posts_by_discussion: HashMap::new(),
            groups: HashMap::new(),
            users: HashMap::new(),
            fail_site_info: false,
        };
        directory
            .course_names
            .insert(5, "Rocket Science 101".to_string());
        directory
            .groups
            .insert(31, json!({"id": 31, "courseid": 5, "name": "Blue team"}));
        directory.users.insert(
            12,
            json!({"id": 12, "username": "astrid", "password": "$2y$10$abcdef"}),
        );
        directory
    }
}

#[async_trait]
impl PlatformDirectory for FakeDirectory {
    async fn site_info(&self) -> Result<SiteInfo, PlatformError> {
        if self.fail_site_info {
            return Err(PlatformError::Lookup("site course unavailable".to_string()));
        }
        Ok(SiteInfo {
            root_url: "https://lms.example.org".to_string(),
            site_name: "Example Campus".to_string(),
            support_email: "support@example.org".to_string(),
        })
    }

    async fn course_name(&self, course_id: i64) -> Result<Option<String>, PlatformError> {
        Ok(self.course_names.get(&course_id).cloned())
    }

    async fn forum(&self, forum_id: i64) -> Result<Option<Value>, PlatformError> {
        Ok(self.forums.get(&forum_id).cloned())
    }

    async fn forum_discussions(&self, forum_id: i64) -> Result<Vec<Value>, PlatformError> {
        Ok(self
            .discussions_by_forum
            .get(&forum_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn discussion(&self, discussion_id: i64) -> Result<Option<Value>, PlatformError> {
        Ok(self.discussions.get(&discussion_id).cloned())
    }

    async fn discussion_posts(&self, discussion_id: i64) -> Result<Vec<Value>, PlatformError> {
        Ok(self
            .posts_by_discussion
            .get(&discussion_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn group(&self, group_id: i64) -> Result<Option<Value>, PlatformError> {
        Ok(self.groups.get(&group_id).cloned())
    }

    async fn user(&self, user_id: i64) -> Result<Option<Value>, PlatformError> {
        Ok(self.users.get(&user_id).cloned())
    }
}

/// Settings storage keeping the fingerprint in memory.
pub struct FakeSettings {
    enabled: String,
    fingerprint: Mutex<Option<String>>,
}

impl FakeSettings {
    pub fn new(enabled: &str) -> Self {
        FakeSettings {
            enabled: enabled.to_string(),
            fingerprint: Mutex::new(None),
        }
    }

    pub fn stored_fingerprint(&self) -> Option<String> {
        self.fingerprint.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformSettings for FakeSettings {
    async fn enabled_log_stores(&self) -> Result<String, PlatformError> {
        Ok(self.enabled.clone())
    }

    async fn last_registration_fingerprint(&self) -> Result<Option<String>, PlatformError> {
        Ok(self.fingerprint.lock().unwrap().clone())
    }

    async fn store_registration_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<(), PlatformError> {
        *self.fingerprint.lock().unwrap() = Some(fingerprint.to_string());
        Ok(())
    }
}

/// Logo storage with an optional fixed file.
pub struct FakeLogo {
    pub hash: Option<String>,
    pub content: Option<Bytes>,
}

impl FakeLogo {
    pub fn with_logo() -> Self {
        FakeLogo {
            hash: Some("9b13b839c4e6ab9f".to_string()),
            content: Some(Bytes::from_static(b"LOGO-BYTES")),
        }
    }

    pub fn none() -> Self {
        FakeLogo {
            hash: None,
            content: None,
        }
    }
}

#[async_trait]
impl LogoStore for FakeLogo {
    async fn content_hash(&self) -> Result<Option<String>, PlatformError> {
        Ok(self.hash.clone())
    }

    async fn content(&self) -> Result<Option<Bytes>, PlatformError> {
        Ok(self.content.clone())
    }
}
