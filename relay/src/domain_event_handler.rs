use crate::message::Event;
use crate::Manager;
use async_trait::async_trait;
use chrono::Utc;
use events::{DomainEvent, EventHandler};
use log::*;
use std::sync::Arc;

/// Handles domain events by converting them to wire events and pushing them
/// to the affected user's live connection.
///
/// The feature service determines who should be notified and includes that
/// user's ID in the event. This handler stamps the delivery time and routes;
/// an offline target simply misses the event (best-effort delivery).
pub struct RelayDomainEventHandler {
    manager: Arc<Manager>,
}

impl RelayDomainEventHandler {
    pub fn new(manager: Arc<Manager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl EventHandler for RelayDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        let target = event.notify_user_id().to_string();
        let timestamp = Utc::now();

        let wire_event = match event {
            DomainEvent::PostLiked {
                post_id, liked_by, ..
            } => Event::LikeNew {
                post_id: post_id.to_string(),
                liked_by: liked_by.clone(),
                timestamp,
            },
            DomainEvent::CommentAdded {
                post_id, comment, ..
            } => Event::CommentNew {
                post_id: post_id.to_string(),
                comment: comment.clone(),
                timestamp,
            },
            DomainEvent::FollowCreated { follower, .. } => Event::FollowNew {
                follower: follower.clone(),
                timestamp,
            },
            DomainEvent::MessageSent { message, .. } => Event::MessageNew {
                message: message.clone(),
                timestamp,
            },
            DomainEvent::NotificationCreated { notification, .. } => Event::NotificationNew {
                notification: notification.clone(),
                timestamp,
            },
        };

        debug!("Routing {event:?} to user {target}");
        self.manager.notify(&target, wire_event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events::EventPublisher;
    use serde_json::{json, Value};
    use tokio::sync::mpsc;
    use uuid::Uuid;

    #[tokio::test]
    async fn post_liked_reaches_the_author_as_like_new() {
        let manager = Arc::new(Manager::new());
        let publisher =
            EventPublisher::new().with_handler(Arc::new(RelayDomainEventHandler::new(
                manager.clone(),
            )));

        let author = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.register_connection(
            author.to_string(),
            crate::connection::ConnectionId::new(),
            tx,
        );

        let post_id = Uuid::new_v4();
        publisher
            .publish(DomainEvent::PostLiked {
                post_id,
                liked_by: json!({"username": "bob"}),
                notify_user_id: author,
            })
            .await;

        let frame = rx.recv().await.unwrap();
        let event: Value = match frame {
            axum::extract::ws::Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected text frame, got {other:?}"),
        };
        assert_eq!(event["event"], "like:new");
        assert_eq!(event["data"]["postId"], post_id.to_string());
        assert_eq!(event["data"]["likedBy"]["username"], "bob");
        assert!(event["data"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn events_for_offline_users_are_dropped_silently() {
        let manager = Arc::new(Manager::new());
        let handler = RelayDomainEventHandler::new(manager.clone());

        handler
            .handle(&DomainEvent::MessageSent {
                message: json!({"content": "hello"}),
                notify_user_id: Uuid::new_v4(),
            })
            .await;
        // No registration, no panic, nothing delivered.
    }
}
