// Copyright 2024-Present eduMessenger. https://edumessenger.org/
// SPDX-License-Identifier: Apache-2.0

//! Wire model: platform activity events and the outbound action payloads.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// A platform-internal record describing a user or system action.
///
/// The field set mirrors the platform's standard log entry; anything the
/// platform includes beyond the known fields is passed through untouched via
/// the flattened map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Fully-qualified event name, e.g. `\mod_forum\event\post_created`.
    pub eventname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectid: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userid: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courseid: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relateduserid: Option<i64>,
    /// Event-specific payload; enrichment attaches related records here.
    #[serde(default)]
    pub other: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timecreated: Option<i64>,
    /// Resolved from `courseid` during enrichment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coursename: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Classification of the event names the relay forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    DiscussionCreated,
    DiscussionUpdated,
    DiscussionDeleted,
    PostCreated,
    PostUpdated,
    PostDeleted,
    GroupCreated,
    GroupUpdated,
    GroupDeleted,
    GroupMemberAdded,
    GroupMemberRemoved,
    RoleAssigned,
    RoleUnassigned,
    RoleDeleted,
    CourseCreated,
    CourseUpdated,
    CourseDeleted,
    MessageSent,
}

impl EventKind {
    /// Classifies a fully-qualified platform event name. Leading and
    /// trailing backslashes are ignored; every unknown name is unsupported
    /// and the event is not relayed.
    pub fn classify(eventname: &str) -> Option<Self> {
        match eventname.trim_matches('\\') {
            "mod_forum\\event\\discussion_created" => Some(Self::DiscussionCreated),
            "mod_forum\\event\\discussion_updated" => Some(Self::DiscussionUpdated),
            "mod_forum\\event\\discussion_deleted" => Some(Self::DiscussionDeleted),
            "mod_forum\\event\\post_created" => Some(Self::PostCreated),
            "mod_forum\\event\\post_updated" => Some(Self::PostUpdated),
            "mod_forum\\event\\post_deleted" => Some(Self::PostDeleted),
            "core\\event\\group_created" => Some(Self::GroupCreated),
            "core\\event\\group_updated" => Some(Self::GroupUpdated),
            "core\\event\\group_deleted" => Some(Self::GroupDeleted),
            "core\\event\\group_member_added" => Some(Self::GroupMemberAdded),
            "core\\event\\group_member_removed" => Some(Self::GroupMemberRemoved),
            "core\\event\\role_assigned" => Some(Self::RoleAssigned),
            "core\\event\\role_unassigned" => Some(Self::RoleUnassigned),
            "core\\event\\role_deleted" => Some(Self::RoleDeleted),
            "core\\event\\course_created" => Some(Self::CourseCreated),
            "core\\event\\course_updated" => Some(Self::CourseUpdated),
            "core\\event\\course_deleted" => Some(Self::CourseDeleted),
            "core\\event\\message_sent" => Some(Self::MessageSent),
            _ => None,
        }
    }
}

/// One-time site registration sent as a `manage` action.
///
/// Field order is fixed: the registration fingerprint is computed over the
/// serialized form.
#[derive(Debug, Clone, Serialize)]
pub struct ManageRegistration {
    /// Public root URL of the platform installation.
    pub host: String,
    pub ctoken: String,
    pub active: String,
    pub title: String,
    pub contact: String,
    pub etherpadurl: Option<String>,
    /// Content hash while fingerprinting; base64 file content on the wire.
    pub logo: Option<String>,
    pub description: String,
    #[serde(serialize_with = "flag")]
    pub allow_registration: bool,
    #[serde(serialize_with = "flag")]
    pub allow_course_creation: bool,
    pub base_category: Option<i64>,
    pub base_course: Option<i64>,
}

/// What the buffer holds: the registration or a wrapped activity event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum OutboundAction {
    Manage(ManageRegistration),
    Event { event: ActivityEvent },
}

/// JSON body of a flush.
#[derive(Debug, Clone, Serialize)]
pub struct RelayPayload {
    pub actions: Vec<OutboundAction>,
}

/// Policy flags travel in the platform's native config encoding.
fn flag<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "1" } else { "0" })
}
