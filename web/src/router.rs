use crate::controller::{
    engagement_controller, health_check_controller, presence_controller, session_controller,
};
use crate::{params, ws, AppState};
use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Ripple Platform API"
        ),
        paths(
            session_controller::login,
            session_controller::register,
            session_controller::refresh,
            presence_controller::index,
            presence_controller::read,
            engagement_controller::create_like,
            engagement_controller::create_comment,
            engagement_controller::create_follow,
            engagement_controller::create_message,
            health_check_controller::health_check,
        ),
        components(
            schemas(
                params::session::LoginParams,
                params::session::RegisterParams,
                params::session::RefreshParams,
                params::engagement::LikeParams,
                params::engagement::CommentParams,
                params::engagement::MessageParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "ripple_platform", description = "Ripple social platform realtime API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our bearer-token authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(session_routes(app_state.clone()))
        .merge(presence_routes(app_state.clone()))
        .merge(engagement_routes(app_state.clone()))
        .merge(realtime_routes(app_state.clone()))
        .merge(health_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .layer(cors_layer(&app_state))
}

fn session_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(session_controller::login))
        .route("/auth/register", post(session_controller::register))
        .route("/auth/refresh", post(session_controller::refresh))
        .with_state(app_state)
}

fn presence_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/presence", get(presence_controller::index))
        .route("/presence/:user_id", get(presence_controller::read))
        .with_state(app_state)
}

fn engagement_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/posts/:post_id/likes",
            post(engagement_controller::create_like),
        )
        .route(
            "/posts/:post_id/comments",
            post(engagement_controller::create_comment),
        )
        .route(
            "/users/:user_id/follows",
            post(engagement_controller::create_follow),
        )
        .route("/messages", post(engagement_controller::create_message))
        .with_state(app_state)
}

fn realtime_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws::handler::ws_handler))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn cors_layer(app_state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}
