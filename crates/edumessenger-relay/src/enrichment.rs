// Copyright 2024-Present eduMessenger. https://edumessenger.org/
// SPDX-License-Identifier: Apache-2.0

//! Per-event-type enrichment.
//!
//! Before an event is buffered, the records it refers to (forum, discussion,
//! post, group, member) are pulled from the platform and attached under
//! `other`, so the service never has to call back into the site. Lookup
//! failures are tolerated: the event is relayed without the missing record.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::event::{ActivityEvent, EventKind};
use crate::platform::{PlatformDirectory, PlatformError};

/// Attaches related platform records to an event before it is relayed.
pub struct Enricher {
    directory: Arc<dyn PlatformDirectory>,
}

impl Enricher {
    pub fn new(directory: Arc<dyn PlatformDirectory>) -> Self {
        Enricher { directory }
    }

    /// Enriches a supported event; returns `None` when the event kind is not
    /// relayed.
    pub async fn enrich(&self, mut event: ActivityEvent) -> Option<ActivityEvent> {
        let kind = match EventKind::classify(&event.eventname) {
            Some(kind) => kind,
            None => {
                debug!("Skipping unsupported event {}", event.eventname);
                return None;
            }
        };

        normalize_other(&mut event);

        if let Some(course_id) = event.courseid {
            match self.directory.course_name(course_id).await {
                Ok(name) => event.coursename = name,
                Err(err) => debug!("Course name lookup failed for {course_id}: {err}"),
            }
        }

        use EventKind::*;
        match kind {
            DiscussionCreated | DiscussionUpdated | DiscussionDeleted => {
                self.attach_discussion_records(&mut event).await;
            }
            PostCreated | PostUpdated | PostDeleted => {
                self.attach_post_records(&mut event).await;
            }
            GroupCreated | GroupUpdated | GroupDeleted => {
                if let Some(group_id) = event.objectid {
                    attach(&mut event, "group", self.directory.group(group_id).await);
                }
            }
            GroupMemberAdded | GroupMemberRemoved => {
                self.attach_member_records(&mut event).await;
            }
            // Role, course lifecycle and message events already carry
            // everything the service needs.
            RoleAssigned | RoleUnassigned | RoleDeleted | CourseCreated | CourseUpdated
            | CourseDeleted | MessageSent => {}
        }

        Some(event)
    }

    async fn attach_discussion_records(&self, event: &mut ActivityEvent) {
        let Some(forum_id) = other_id(event, "forumid") else {
            return;
        };
        if let Some(discussion) = self.find_discussion(forum_id, event.objectid).await {
            set_other(event, "discussion", discussion);
        }
        attach(event, "forum", self.directory.forum(forum_id).await);
    }

    async fn attach_post_records(&self, event: &mut ActivityEvent) {
        if let Some(discussion_id) = other_id(event, "discussionid") {
            if let Some(post) = self.find_post(discussion_id, event.objectid).await {
                set_other(event, "post", post);
            }
            attach(
                event,
                "discussion",
                self.directory.discussion(discussion_id).await,
            );
        }
        if let Some(forum_id) = other_id(event, "forumid") {
            attach(event, "forum", self.directory.forum(forum_id).await);
        }
    }

    async fn attach_member_records(&self, event: &mut ActivityEvent) {
        if let Some(user_id) = event.relateduserid {
            match self.directory.user(user_id).await {
                Ok(Some(mut user)) => {
                    // Credentials never leave the platform.
                    if let Some(fields) = user.as_object_mut() {
                        fields.remove("password");
                    }
                    set_other(event, "user", user);
                }
                Ok(None) => {}
                Err(err) => debug!("Member lookup failed for {user_id}: {err}"),
            }
        }
        if let Some(group_id) = event.objectid {
            attach(event, "group", self.directory.group(group_id).await);
        }
    }

    async fn find_discussion(&self, forum_id: i64, objectid: Option<i64>) -> Option<Value> {
        let target = objectid?;
        match self.directory.forum_discussions(forum_id).await {
            Ok(discussions) => discussions
                .into_iter()
                .find(|discussion| record_id(discussion) == Some(target)),
            Err(err) => {
                debug!("Discussion listing failed for forum {forum_id}: {err}");
                None
            }
        }
    }

    async fn find_post(&self, discussion_id: i64, objectid: Option<i64>) -> Option<Value> {
        let target = objectid?;
        match self.directory.discussion_posts(discussion_id).await {
            Ok(posts) => posts.into_iter().find(|post| record_id(post) == Some(target)),
            Err(err) => {
                debug!("Post listing failed for discussion {discussion_id}: {err}");
                None
            }
        }
    }
}

/// Platform hosts occasionally hand `other` over serialized; recover the
/// structured form when possible, and make sure records can be attached.
fn normalize_other(event: &mut ActivityEvent) {
    if let Value::String(raw) = &event.other {
        if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
            event.other = parsed;
        }
    }
    if event.other.is_null() {
        event.other = Value::Object(Map::new());
    }
}

fn set_other(event: &mut ActivityEvent, key: &str, value: Value) {
    if !event.other.is_object() {
        event.other = Value::Object(Map::new());
    }
    if let Some(fields) = event.other.as_object_mut() {
        fields.insert(key.to_string(), value);
    }
}

fn attach(event: &mut ActivityEvent, key: &str, result: Result<Option<Value>, PlatformError>) {
    match result {
        Ok(Some(record)) => set_other(event, key, record),
        Ok(None) => {}
        Err(err) => debug!("Related {key} lookup failed: {err}"),
    }
}

/// Reads a numeric id out of `other`, whether the platform sent it as a
/// number or a string.
fn other_id(event: &ActivityEvent, key: &str) -> Option<i64> {
    event.other.get(key).and_then(value_as_id)
}

fn record_id(record: &Value) -> Option<i64> {
    record.get("id").and_then(value_as_id)
}

fn value_as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
