// Copyright 2024-Present eduMessenger. https://edumessenger.org/
// SPDX-License-Identifier: Apache-2.0

//! Builders shared across the integration tests

use serde_json::{json, Value};

use edumessenger_relay::{ActivityEvent, RelayConfig};

use super::mock_server::ReceivedRequest;

pub fn relay_config(server_url: String) -> RelayConfig {
    RelayConfig {
        server_url,
        admin_token: "_not_a_real_token_".to_string(),
        ..Default::default()
    }
}

pub fn course_created_event(course_id: i64) -> ActivityEvent {
    ActivityEvent {
        eventname: "\\core\\event\\course_created".to_string(),
        objectid: Some(course_id),
        courseid: Some(course_id),
        other: json!({"fullname": format!("Course {course_id}")}),
        ..Default::default()
    }
}

pub fn member_added_event(group_id: i64, user_id: i64, course_id: i64) -> ActivityEvent {
    ActivityEvent {
        eventname: "\\core\\event\\group_member_added".to_string(),
        objectid: Some(group_id),
        courseid: Some(course_id),
        relateduserid: Some(user_id),
        ..Default::default()
    }
}

pub fn unsupported_event() -> ActivityEvent {
    ActivityEvent {
        eventname: "\\core\\event\\user_loggedin".to_string(),
        ..Default::default()
    }
}

/// Decodes a captured flush body into its action list.
pub fn decode_actions(request: &ReceivedRequest) -> Vec<Value> {
    let payload: Value =
        serde_json::from_slice(&request.body).expect("flush body is not valid JSON");
    payload["actions"]
        .as_array()
        .expect("flush body has no actions array")
        .clone()
}
