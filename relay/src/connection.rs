use axum::extract::ws::{close_code, CloseFrame, Message};
use dashmap::DashMap;
use log::*;
use tokio::sync::mpsc::UnboundedSender;

// Type alias for user IDs (web layer converts domain::Id to String)
pub type UserId = String;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// A live registration: the connection currently owning delivery for a user.
#[derive(Debug, Clone)]
pub struct Registration {
    pub connection_id: ConnectionId,
    pub sender: UnboundedSender<Message>,
}

/// Registry mapping each user to at most one live connection.
///
/// Invariants:
/// - last-connect-wins: a newer connection for the same user replaces the
///   older registration, and the superseded socket is told to close;
/// - compare-and-clear: removal only happens when the entry still belongs to
///   the disconnecting connection, so a stale disconnect of a superseded
///   connection never clears a newer registration.
///
/// All mutation goes through DashMap's per-entry atomic operations, which is
/// what serializes the connect/disconnect race for a single user.
pub struct ConnectionRegistry {
    registrations: DashMap<UserId, Registration>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            registrations: DashMap::new(),
        }
    }

    /// Register a connection for `user_id`, superseding any earlier one.
    /// The caller supplies the connection id so it can queue frames on the
    /// sender before the registration becomes visible to other tasks.
    pub fn register(
        &self,
        user_id: UserId,
        connection_id: ConnectionId,
        sender: UnboundedSender<Message>,
    ) {
        let previous = self.registrations.insert(
            user_id.clone(),
            Registration {
                connection_id,
                sender,
            },
        );

        if let Some(superseded) = previous {
            debug!(
                "User {} reconnected; closing superseded connection {}",
                user_id,
                superseded.connection_id.as_str()
            );
            // The older socket no longer owns delivery. Ask it to close;
            // if its outbound task is already gone the send just fails.
            let _ = superseded.sender.send(Message::Close(Some(CloseFrame {
                code: close_code::AWAY,
                reason: "superseded by a newer connection".into(),
            })));
        }
    }

    /// Compare-and-clear removal: succeeds only if the registration still
    /// points at `connection_id`. Returns whether an entry was removed.
    pub fn unregister(&self, user_id: &UserId, connection_id: &ConnectionId) -> bool {
        self.registrations
            .remove_if(user_id, |_, registration| {
                registration.connection_id == *connection_id
            })
            .is_some()
    }

    /// Send a message to the user's current connection, if any. Best-effort:
    /// an offline user or a closed channel is not an error.
    pub fn send_to_user(&self, user_id: &UserId, message: Message) {
        if let Some(registration) = self.registrations.get(user_id) {
            if let Err(e) = registration.sender.send(message) {
                warn!(
                    "Failed to send event to connection {}: {}. Connection will be cleaned up.",
                    registration.connection_id.as_str(),
                    e
                );
            }
        }
    }

    /// Send a message to every connection except `exclude` (used for
    /// presence transitions, which go to all *other* users).
    pub fn broadcast_except(&self, exclude: Option<&ConnectionId>, message: Message) {
        for entry in self.registrations.iter() {
            if Some(&entry.value().connection_id) == exclude {
                continue;
            }
            if let Err(e) = entry.value().sender.send(message.clone()) {
                warn!(
                    "Failed to send broadcast to connection {}: {}",
                    entry.value().connection_id.as_str(),
                    e
                );
            }
        }
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.registrations.contains_key(user_id)
    }

    /// Point-in-time snapshot of every registered user.
    pub fn online_users(&self) -> Vec<UserId> {
        self.registrations
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn later_registration_supersedes_and_closes_the_earlier_one() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();

        registry.register("alice".to_string(), ConnectionId::new(), tx_a);
        registry.register("alice".to_string(), ConnectionId::new(), tx_b);

        // Exactly one registration survives.
        assert_eq!(registry.online_users(), vec!["alice".to_string()]);

        // The superseded connection was asked to close.
        match rx_a.recv().await {
            Some(Message::Close(_)) => {}
            other => panic!("expected close frame for superseded connection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stale_disconnect_does_not_clear_a_newer_registration() {
        let registry = ConnectionRegistry::new();
        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        let conn_a = ConnectionId::new();
        let conn_b = ConnectionId::new();
        registry.register("alice".to_string(), conn_a.clone(), tx_a);
        registry.register("alice".to_string(), conn_b.clone(), tx_b);

        // A's delayed disconnect handler fires after B took over.
        assert!(!registry.unregister(&"alice".to_string(), &conn_a));
        assert!(registry.is_online(&"alice".to_string()));

        // B still receives deliveries.
        registry.send_to_user(&"alice".to_string(), Message::Text("hi".to_string()));
        // Skip the close frame B never got; first message must be the delivery.
        assert_eq!(rx_b.recv().await, Some(Message::Text("hi".to_string())));

        // B's own disconnect clears the entry.
        assert!(registry.unregister(&"alice".to_string(), &conn_b));
        assert!(!registry.is_online(&"alice".to_string()));
    }

    #[tokio::test]
    async fn send_to_offline_user_is_a_no_op() {
        let registry = ConnectionRegistry::new();
        // No registration for bob; nothing to assert beyond "does not panic".
        registry.send_to_user(&"bob".to_string(), Message::Text("hello".to_string()));
        assert!(!registry.is_online(&"bob".to_string()));
    }

    #[tokio::test]
    async fn broadcast_except_skips_the_excluded_connection() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        let conn_a = ConnectionId::new();
        registry.register("alice".to_string(), conn_a.clone(), tx_a);
        registry.register("bob".to_string(), ConnectionId::new(), tx_b);

        registry.broadcast_except(Some(&conn_a), Message::Text("online".to_string()));

        assert_eq!(rx_b.recv().await, Some(Message::Text("online".to_string())));
        assert!(rx_a.try_recv().is_err());
    }
}
