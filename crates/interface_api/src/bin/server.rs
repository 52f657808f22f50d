//! Cash System - API Server Binary
//!
//! Starts the HTTP API over PostgreSQL-backed adapters.
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - Token expiration in seconds (default: 1800)
//! * `API_DATABASE_URL` / `DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level (default: info)
//! * `API_BOOTSTRAP_ADMIN_PASSWORD` - Password for the seeded admin account

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_access::{AccessService, PasswordHasher, PermissionGrants, Role, User, UserStore};
use domain_billing::{BillingService, LedgerService, SaleService};
use domain_registry::{BrIdentityValidator, ClientService, ProductService};
use infra_db::{
    create_pool, run_migrations, DatabaseConfig, PgAuditLog, PgBillStore, PgClientStore,
    PgLedgerStore, PgProductStore, PgSaleStore, PgUserStore,
};
use interface_api::config::ApiConfig;
use interface_api::render::CsvReportRenderer;
use interface_api::security::Argon2Hasher;
use interface_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting cash system API server"
    );

    let pool = create_pool(&DatabaseConfig::new(config.database_url.clone())).await?;
    run_migrations(&pool).await?;
    tracing::info!("Database ready");

    let state = build_state(pool, config.clone());
    seed_bootstrap_admin(&state, &config).await?;

    let app = create_router(state);
    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration, falling back to individual env vars / defaults
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|_| ApiConfig {
        host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
        port: std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080),
        jwt_secret: std::env::var("API_JWT_SECRET")
            .unwrap_or_else(|_| "dev-secret-change-in-production".to_string()),
        jwt_expiration_secs: std::env::var("API_JWT_EXPIRATION_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1800),
        database_url: std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("API_DATABASE_URL"))
            .unwrap_or_else(|_| "postgres://localhost/caixa".to_string()),
        log_level: std::env::var("API_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string()),
        bootstrap_admin_password: std::env::var("API_BOOTSTRAP_ADMIN_PASSWORD")
            .unwrap_or_else(|_| "admin123".to_string()),
    })
}

/// Initializes the tracing subscriber for structured logging
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Wires every Postgres adapter into the application state
fn build_state(pool: sqlx::PgPool, config: ApiConfig) -> AppState {
    let audit = Arc::new(PgAuditLog::new(pool.clone()));
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
    let products_store = Arc::new(PgProductStore::new(pool.clone()));
    let clients_store = Arc::new(PgClientStore::new(pool.clone()));
    let bills_store = Arc::new(PgBillStore::new(pool.clone()));
    let ledger_store = Arc::new(PgLedgerStore::new(pool.clone()));
    let sales_store = Arc::new(PgSaleStore::new(pool));

    let access = AccessService::new(users.clone(), Arc::new(Argon2Hasher::new()), audit.clone());
    let products = ProductService::new(products_store.clone(), audit.clone());
    let clients = ClientService::new(
        clients_store.clone(),
        Arc::new(BrIdentityValidator::new()),
        audit.clone(),
    );
    let billing = BillingService::new(
        bills_store.clone(),
        products_store.clone(),
        clients_store.clone(),
        audit.clone(),
    );
    let ledger = LedgerService::new(
        ledger_store,
        bills_store,
        clients_store,
        products_store.clone(),
        audit.clone(),
        Arc::new(CsvReportRenderer::new()),
    );
    let sales = SaleService::new(sales_store, products_store, audit);

    AppState {
        config,
        users,
        access,
        products,
        clients,
        billing,
        ledger,
        sales,
    }
}

/// Seeds the protected `admin` account when it does not exist yet
async fn seed_bootstrap_admin(state: &AppState, config: &ApiConfig) -> anyhow::Result<()> {
    if state.users.get_by_username("admin").await?.is_some() {
        return Ok(());
    }

    let hasher = Argon2Hasher::new();
    let hash = hasher.hash(&config.bootstrap_admin_password)?;
    let admin = User::new(
        "admin",
        "admin@sistema.com",
        hash,
        Role::Administrator,
        PermissionGrants::none(),
        None,
    );
    state.users.insert(&admin).await?;

    tracing::info!("Bootstrap admin account created");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
