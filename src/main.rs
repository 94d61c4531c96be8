use book_lending::{
    adapters::{
        SystemClock,
        memory::{InMemoryCatalogStore, InMemoryLoanStore},
        postgres::{PostgresCatalogStore, PostgresLoanStore},
    },
    api::{AppState, create_router},
    application::{ServiceDependencies, loan::run_overdue_sweeper},
    config::AppConfig,
    ports::{CatalogStore, LoanStore},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "book_lending=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Initialize adapters
    let (catalog_store, loan_store): (Arc<dyn CatalogStore>, Arc<dyn LoanStore>) =
        match &config.database_url {
            Some(database_url) => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(config.database_max_connections)
                    .connect(database_url)
                    .await
                    .expect("Failed to connect to database");

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .expect("Failed to run migrations");

                tracing::info!("Using PostgreSQL stores");
                (
                    Arc::new(PostgresCatalogStore::new(pool.clone())),
                    Arc::new(PostgresLoanStore::new(pool)),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL is not set, using in-memory stores");
                (
                    Arc::new(InMemoryCatalogStore::new()),
                    Arc::new(InMemoryLoanStore::new()),
                )
            }
        };

    let service_deps = ServiceDependencies::new(catalog_store, loan_store, Arc::new(SystemClock));

    // Overdue sweeper
    tokio::spawn(run_overdue_sweeper(
        service_deps.clone(),
        config.overdue_sweep_interval,
    ));

    // Create router
    let app = create_router(Arc::new(AppState { service_deps }));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
