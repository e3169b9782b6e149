use reviewdb::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    notifier::{LogNotifier, NotifierState},
    repository::{PostgresRepository, RepositoryState},
    tokens::{JwtTokenIssuer, TokenIssuerState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Asynchronous entry point: configuration, logging, database, collaborator
/// services, and the HTTP server, in that order.
#[tokio::main]
async fn main() {
    // 1. Configuration & environment loading (fail-fast on missing secrets).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging filter: RUST_LOG wins, otherwise sensible defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "reviewdb=debug,tower_http=info,axum=trace".into());

    // 3. Log format switched by environment: pretty for humans locally,
    //    JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database initialization (Postgres connection pool).
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 5. Collaborator services: token issuer and code notifier.
    let tokens = Arc::new(JwtTokenIssuer::from_config(&config)) as TokenIssuerState;
    let notifier = Arc::new(LogNotifier) as NotifierState;

    // 6. Unified state assembly and router construction.
    let app_state = AppState {
        repo,
        tokens,
        notifier,
        config,
    };
    let app = create_router(app_state);

    // 7. Server startup.
    let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("API documentation (Swagger UI) available at: http://localhost:3000/swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
