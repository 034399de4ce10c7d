use std::sync::Arc;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use donatrack::{
    api,
    config::Settings,
    payments::SandboxGateway,
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "donatrack=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting Donatrack server on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let service_context = Arc::new(ServiceContext::from_pool(
        db_pool,
        Arc::new(SandboxGateway::new()),
        &settings,
    ));

    match service_context.auth_service.cleanup_expired_sessions().await {
        Ok(0) => {}
        Ok(removed) => tracing::info!("Removed {} expired sessions", removed),
        Err(e) => tracing::warn!("Session cleanup failed: {}", e),
    }

    tracing::info!(
        "Payment gateway: {} ({})",
        service_context.payment_gateway.name(),
        settings.donations.currency
    );

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on {}", settings.server.base_url);

    axum::serve(listener, app).await?;

    Ok(())
}
