//! Event system infrastructure for the Ripple platform.
//!
//! This crate provides the event system that enables loose coupling between
//! feature services (likes, comments, follows, messages, notifications) and
//! infrastructure concerns like the realtime relay.
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing all business events in the system
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on internal crates (domain, relay, etc.),
//! avoiding circular dependencies. Entity data is carried as serialized JSON values.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// A type alias that represents any entity's internal id field data type.
pub type Id = Uuid;

/// Domain events that represent business-level changes in the system.
/// These events are emitted when a feature service completes a write
/// operation that another user should hear about in real time.
///
/// Events include the target user ID for notification routing. The feature
/// service is responsible for determining who should be notified (e.g. the
/// author of the liked post).
///
/// Entity data is carried as `serde_json::Value` to avoid dependencies on
/// a persistence crate.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// Emitted when a user likes a post. Routed to the post's author.
    PostLiked {
        /// ID of the post that was liked.
        post_id: Id,
        /// Serialized summary of the liking user (id, username, avatar).
        liked_by: Value,
        /// User ID to receive the realtime event (the post author).
        notify_user_id: Id,
    },
    /// Emitted when a user comments on a post. Routed to the post's author.
    CommentAdded {
        /// ID of the commented post.
        post_id: Id,
        /// Complete serialized comment entity.
        comment: Value,
        /// User ID to receive the realtime event (the post author).
        notify_user_id: Id,
    },
    /// Emitted when a user starts following another user.
    FollowCreated {
        /// Serialized summary of the new follower.
        follower: Value,
        /// User ID to receive the realtime event (the followed user).
        notify_user_id: Id,
    },
    /// Emitted when a direct message is sent. Routed to the recipient.
    MessageSent {
        /// Complete serialized message entity.
        message: Value,
        /// User ID to receive the realtime event (the message recipient).
        notify_user_id: Id,
    },
    /// Emitted when a persistent notification record is created, so that
    /// online recipients see it without polling.
    NotificationCreated {
        /// Complete serialized notification entity.
        notification: Value,
        /// User ID to receive the realtime event.
        notify_user_id: Id,
    },
}

impl DomainEvent {
    /// The user who should receive this event over their live connection.
    pub fn notify_user_id(&self) -> Id {
        match self {
            DomainEvent::PostLiked { notify_user_id, .. }
            | DomainEvent::CommentAdded { notify_user_id, .. }
            | DomainEvent::FollowCreated { notify_user_id, .. }
            | DomainEvent::MessageSent { notify_user_id, .. }
            | DomainEvent::NotificationCreated { notify_user_id, .. } => *notify_user_id,
        }
    }
}

/// Trait for handling domain events.
/// Implementations can perform side effects like pushing realtime events,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Publish an event to all registered handlers.
    /// Handlers are called sequentially. Delivery is fire-and-forget: the
    /// publisher never surfaces a handler's outcome back to the caller.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        seen: AtomicUsize,
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _event: &DomainEvent) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn publish_reaches_all_registered_handlers() {
        let first = Arc::new(CountingHandler {
            seen: AtomicUsize::new(0),
        });
        let second = Arc::new(CountingHandler {
            seen: AtomicUsize::new(0),
        });

        let publisher = EventPublisher::new()
            .with_handler(first.clone())
            .with_handler(second.clone());

        publisher
            .publish(DomainEvent::FollowCreated {
                follower: json!({"username": "bob"}),
                notify_user_id: Uuid::new_v4(),
            })
            .await;

        assert_eq!(first.seen.load(Ordering::SeqCst), 1);
        assert_eq!(second.seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn notify_user_id_returns_the_routing_target() {
        let target = Uuid::new_v4();
        let event = DomainEvent::PostLiked {
            post_id: Uuid::new_v4(),
            liked_by: json!({"username": "bob"}),
            notify_user_id: target,
        };
        assert_eq!(event.notify_user_id(), target);
    }
}
