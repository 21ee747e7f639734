//! HTTP and WebSocket surface of the realtime core: the axum router, the
//! controllers behind it, bearer-token authentication, and the socket
//! lifecycle that feeds the relay.

use domain::token::Tokens;
use domain::user::UserDirectory;
use events::EventPublisher;
use log::*;
use std::sync::Arc;

pub(crate) mod controller;
pub mod error;
pub(crate) mod extractors;
pub(crate) mod params;
pub mod router;
pub(crate) mod ws;

use service::config::Config;

/// Application state shared with every handler via axum's `State`.
///
/// Everything mutable in here is behind an `Arc`: the state itself is cloned
/// per request. The relay is the only component with interior mutability and
/// it owns that registry exclusively; handlers only reach it through its API.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tokens: Arc<Tokens>,
    pub relay: Arc<relay::Manager>,
    pub event_publisher: EventPublisher,
    pub user_directory: Arc<UserDirectory>,
}

impl AppState {
    pub fn new(
        config: Config,
        relay: Arc<relay::Manager>,
        event_publisher: EventPublisher,
        user_directory: Arc<UserDirectory>,
    ) -> Self {
        let tokens = Arc::new(Tokens::new(&config));
        Self {
            config,
            tokens,
            relay,
            event_publisher,
            user_directory,
        }
    }
}

/// Binds the configured interface/port and serves the router until the
/// process is stopped.
pub async fn init_server(app_state: AppState) -> Result<(), std::io::Error> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = app_state.config.port;

    let listener = tokio::net::TcpListener::bind(format!("{interface}:{port}")).await?;
    info!("Server starting... listening for connections on http://{interface}:{port}");

    axum::serve(listener, router::define_routes(app_state)).await
}
