use crate::connection::{ConnectionId, ConnectionRegistry, UserId};
use crate::message::{Event, EventName};
use axum::extract::ws::Message;
use log::*;
use std::sync::Arc;

/// The relay: an explicitly owned component constructed once at process
/// start and shared by handle. Tracks which users hold a live connection
/// and delivers events to them, best-effort and at-most-once.
pub struct Manager {
    registry: Arc<ConnectionRegistry>,
}

impl Manager {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }

    /// Register a connection for a user and announce the presence
    /// transition to every other connection. The caller owns the connection
    /// id, so anything it queued on the sender beforehand stays ahead of
    /// deliveries that observe this registration.
    pub fn register_connection(
        &self,
        user_id: UserId,
        connection_id: ConnectionId,
        sender: tokio::sync::mpsc::UnboundedSender<Message>,
    ) {
        self.registry
            .register(user_id.clone(), connection_id.clone(), sender);
        info!("Registered realtime connection for user {user_id}");

        self.broadcast_except(Some(&connection_id), Event::UserOnline { user_id });
    }

    /// Unregister a connection. Only clears the registration if it still
    /// belongs to this connection; a stale disconnect of a superseded
    /// connection is a no-op and announces nothing.
    pub fn unregister_connection(&self, user_id: &UserId, connection_id: &ConnectionId) {
        if self.registry.unregister(user_id, connection_id) {
            info!("Unregistered realtime connection for user {user_id}");
            self.broadcast_except(
                None,
                Event::UserOffline {
                    user_id: user_id.clone(),
                },
            );
        } else {
            debug!(
                "Ignoring stale disconnect of {} for user {user_id}",
                connection_id.as_str()
            );
        }
    }

    /// Deliver an event to the user's live connection, if any. Fire and
    /// forget: an offline target is a silent no-op and no delivery result
    /// is surfaced to the caller.
    pub fn notify(&self, user_id: &UserId, event: Event) {
        if !self.registry.is_online(user_id) {
            debug!(
                "User {user_id} is offline, {} event not delivered",
                event.event_name()
            );
            return;
        }

        if let Some(message) = Self::encode(&event) {
            self.registry.send_to_user(user_id, message);
            debug!("Delivered {} event to user {user_id}", event.event_name());
        }
    }

    fn broadcast_except(&self, exclude: Option<&ConnectionId>, event: Event) {
        if let Some(message) = Self::encode(&event) {
            self.registry.broadcast_except(exclude, message);
        }
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.registry.is_online(user_id)
    }

    pub fn online_users(&self) -> Vec<UserId> {
        self.registry.online_users()
    }

    /// Serialize an event into a websocket text frame.
    pub fn encode(event: &Event) -> Option<Message> {
        match serde_json::to_string(event) {
            Ok(json) => Some(Message::Text(json)),
            Err(e) => {
                error!("Failed to serialize {} event: {e}", event.event_name());
                None
            }
        }
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn decode(message: Message) -> Value {
        match message {
            Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    async fn next_event(rx: &mut UnboundedReceiver<Message>) -> Value {
        decode(rx.recv().await.expect("expected a frame"))
    }

    #[tokio::test]
    async fn notify_delivers_exactly_once_to_the_registered_connection() {
        let manager = Manager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.register_connection("alice".to_string(), ConnectionId::new(), tx);

        manager.notify(
            &"alice".to_string(),
            Event::LikeNew {
                post_id: "post-1".to_string(),
                liked_by: json!({"username": "bob"}),
                timestamp: chrono::Utc::now(),
            },
        );

        let event = next_event(&mut rx).await;
        assert_eq!(event["event"], "like:new");
        assert_eq!(event["data"]["postId"], "post-1");
        assert!(rx.try_recv().is_err(), "exactly one delivery expected");
    }

    #[tokio::test]
    async fn notify_is_a_no_op_for_offline_users() {
        let manager = Manager::new();
        manager.notify(
            &"carol".to_string(),
            Event::FollowNew {
                follower: json!({"username": "bob"}),
                timestamp: chrono::Utc::now(),
            },
        );
        assert!(!manager.is_online(&"carol".to_string()));
    }

    #[tokio::test]
    async fn presence_transitions_are_announced_to_other_connections() {
        let manager = Manager::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let conn_a = ConnectionId::new();
        manager.register_connection("alice".to_string(), conn_a.clone(), tx_a);

        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        manager.register_connection("bob".to_string(), ConnectionId::new(), tx_b);

        // Alice hears that bob came online; bob does not hear about himself.
        let online = next_event(&mut rx_a).await;
        assert_eq!(online["event"], "user:online");
        assert_eq!(online["data"]["userId"], "bob");

        manager.unregister_connection(&"alice".to_string(), &conn_a);
        assert!(!manager.is_online(&"alice".to_string()));
        assert_eq!(manager.online_users(), vec!["bob".to_string()]);
    }

    #[tokio::test]
    async fn stale_unregister_announces_nothing() {
        let manager = Manager::new();
        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        let conn_a = ConnectionId::new();
        manager.register_connection("alice".to_string(), conn_a.clone(), tx_a);

        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        manager.register_connection("alice".to_string(), ConnectionId::new(), tx_b);

        let (tx_c, mut rx_c) = mpsc::unbounded_channel();
        manager.register_connection("carol".to_string(), ConnectionId::new(), tx_c);

        // Drain carol's queue of the events from registration ordering.
        while rx_c.try_recv().is_ok() {}

        // A's stale disconnect must not clear alice or broadcast an offline
        // transition.
        manager.unregister_connection(&"alice".to_string(), &conn_a);
        assert!(manager.is_online(&"alice".to_string()));
        assert!(rx_c.try_recv().is_err());
    }
}
