//! Presence & event relay: realtime infrastructure for pushing events from
//! the backend to authenticated users over a WebSocket channel.
//!
//! # Architecture
//!
//! - **One connection per user**: each authenticated user holds at most one
//!   registration; a newer connection supersedes (and closes) the older one.
//! - **Owned component**: the [`Manager`] is constructed once at process
//!   start and passed by handle through the application state. Nothing here
//!   is a global, which keeps every unit test able to build a fresh relay.
//! - **Best-effort delivery**: events are ephemeral. If the target user is
//!   offline at the moment of sending, the event is dropped - not queued,
//!   not retried, not persisted. Clients see fresh data on their next fetch.
//! - **Process-local**: the registry lives in this process's memory. In a
//!   multi-process deployment `notify` only reaches users connected to the
//!   same process; cross-process pub/sub is a deliberate scope boundary.
//!
//! # Message flow
//!
//! 1. Client opens the WebSocket endpoint with its access token
//! 2. The web layer verifies the token and registers the connection here
//! 3. A feature service completes a write (like, comment, follow, message)
//!    and publishes a `DomainEvent`
//! 4. [`RelayDomainEventHandler`] converts it to a wire event and calls
//!    [`Manager::notify`], which looks up the target's registration and
//!    pushes the frame onto that connection's outbound queue
//! 5. The socket task drains the queue into the socket
//!
//! # Modules
//!
//! - `connection`: [`ConnectionRegistry`] with last-connect-wins insert and
//!   compare-and-clear removal
//! - `manager`: high-level routing and presence announcements
//! - `message`: typed wire events and client control messages
//! - `domain_event_handler`: bridge from the `events` crate into the relay

pub mod connection;
pub mod domain_event_handler;
pub mod manager;
pub mod message;

pub use domain_event_handler::RelayDomainEventHandler;
pub use manager::Manager;
