use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Trait for getting the wire-level event name of a server event.
pub trait EventName {
    fn event_name(&self) -> &'static str;
}

/// Server-to-client events, serialized as the wire envelope
/// `{"event": <name>, "data": <payload>}`.
///
/// Field names are camelCased on the wire because that is the contract the
/// web client already speaks.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum Event {
    /// Handshake acknowledgement sent to the connecting client only.
    #[serde(rename = "connected")]
    Connected {
        user_id: String,
        connection_id: String,
    },

    // Feature events, routed to a single target user
    #[serde(rename = "notification:new")]
    NotificationNew {
        notification: Value,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "message:new")]
    MessageNew {
        message: Value,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "like:new")]
    LikeNew {
        post_id: String,
        liked_by: Value,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "comment:new")]
    CommentNew {
        post_id: String,
        comment: Value,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "follow:new")]
    FollowNew {
        follower: Value,
        timestamp: DateTime<Utc>,
    },

    // Presence transitions, broadcast to everyone else
    #[serde(rename = "user:online")]
    UserOnline { user_id: String },
    #[serde(rename = "user:offline")]
    UserOffline { user_id: String },

    // Control responses
    #[serde(rename = "pong")]
    Pong { timestamp: DateTime<Utc> },
    #[serde(rename = "users:online:list")]
    UsersOnlineList { users: Vec<String> },
}

impl EventName for Event {
    fn event_name(&self) -> &'static str {
        match self {
            Event::Connected { .. } => "connected",
            Event::NotificationNew { .. } => "notification:new",
            Event::MessageNew { .. } => "message:new",
            Event::LikeNew { .. } => "like:new",
            Event::CommentNew { .. } => "comment:new",
            Event::FollowNew { .. } => "follow:new",
            Event::UserOnline { .. } => "user:online",
            Event::UserOffline { .. } => "user:offline",
            Event::Pong { .. } => "pong",
            Event::UsersOnlineList { .. } => "users:online:list",
        }
    }
}

/// Client-to-server control messages. Anything that fails to parse as one of
/// these is ignored by the socket loop.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event")]
pub enum ClientMessage {
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "users:online")]
    UsersOnline,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn like_event_serializes_to_the_wire_envelope() {
        let event = Event::LikeNew {
            post_id: "post-1".to_string(),
            liked_by: json!({"username": "bob"}),
            timestamp: Utc::now(),
        };

        let value: Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "like:new");
        assert_eq!(value["data"]["postId"], "post-1");
        assert_eq!(value["data"]["likedBy"]["username"], "bob");
        assert!(value["data"]["timestamp"].is_string());
    }

    #[test]
    fn presence_events_carry_camel_cased_user_id() {
        let value: Value = serde_json::to_value(Event::UserOnline {
            user_id: "u-1".to_string(),
        })
        .unwrap();
        assert_eq!(value["event"], "user:online");
        assert_eq!(value["data"]["userId"], "u-1");
    }

    #[test]
    fn event_name_matches_serialized_tag() {
        let event = Event::Pong {
            timestamp: Utc::now(),
        };
        let value: Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], event.event_name());
    }

    #[test]
    fn client_control_messages_parse_from_tagged_json() {
        assert_eq!(
            serde_json::from_str::<ClientMessage>(r#"{"event":"ping"}"#).unwrap(),
            ClientMessage::Ping
        );
        assert_eq!(
            serde_json::from_str::<ClientMessage>(r#"{"event":"users:online"}"#).unwrap(),
            ClientMessage::UsersOnline
        );
        assert!(serde_json::from_str::<ClientMessage>(r#"{"event":"nonsense"}"#).is_err());
    }
}
