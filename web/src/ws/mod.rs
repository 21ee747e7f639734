//! WebSocket HTTP handler for the web layer.
//!
//! This module contains only the axum handler for the realtime endpoint:
//! handshake authentication, the upgrade, and the per-connection socket
//! loop. The core relay infrastructure (Manager, ConnectionRegistry, wire
//! message types) lives in the `relay` crate to avoid circular dependencies.

pub(crate) mod handler;
