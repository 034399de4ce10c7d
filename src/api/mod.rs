pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    settings: Arc<Settings>,
) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // Identity routes
        .nest("/auth", auth_routes(app_state.clone()))

        // Signed-in user routes
        .nest("/api", api_routes(app_state.clone()))

        // Admin routes
        .nest("/admin", admin_routes(app_state.clone()))

        // Add state to the router
        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        // Only /me needs a live session
        .merge(Router::new()
            .route("/me", get(handlers::auth::me))
            .route_layer(axum::middleware::from_fn_with_state(
                state,
                middleware::auth::require_auth,
            ))
        )
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(handlers::profile::get).put(handlers::profile::update))
        .route("/donations", get(handlers::donations::list).post(handlers::donations::create))
        .route("/donations/presets", get(handlers::donations::presets))
        .route("/donations/:id", get(handlers::donations::get))
        .route("/donations/:id/payment", post(handlers::donations::submit_payment))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::admin::stats))
        .route("/donations", get(handlers::admin::list_donations))
        .route("/donations/export", get(handlers::admin::export_donations))
        .route("/profiles", get(handlers::admin::list_profiles))
        .route("/profiles/export", get(handlers::admin::export_profiles))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
