use events::EventPublisher;
use log::*;
use relay::RelayDomainEventHandler;
use service::config::Config;
use service::logging::Logger;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!("Starting Ripple platform backend ({})", config.runtime_env());

    // The relay is the process's single owner of the connection registry;
    // everything else reaches it through this handle.
    let relay = Arc::new(relay::Manager::new());

    let event_publisher =
        EventPublisher::new().with_handler(Arc::new(RelayDomainEventHandler::new(relay.clone())));

    let user_directory = Arc::new(domain::user::UserDirectory::new());

    if !config.is_production() {
        match user_directory.seed_dev_user().await {
            Ok(user) => info!("Seeded development user {} ({})", user.username, user.id),
            Err(e) => warn!("Failed to seed development user: {e}"),
        }
    }

    let app_state = web::AppState::new(config, relay, event_publisher, user_directory);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server error: {e}");
    }
}
