//! HTTP API Layer
//!
//! The REST surface of the cash system, built on Axum.
//!
//! # Architecture
//!
//! - **Handlers**: thin translators between DTOs and the domain services
//! - **Middleware**: bearer-token authentication resolving an
//!   [`domain_access::Actor`], plus structured request logging
//! - **Services**: all business decisions (including authorization) live in
//!   the domain crates; the API layer never re-implements a rule
//! - **State**: every collaborator is injected at startup through
//!   [`AppState`]: the binary wires Postgres adapters, tests wire the
//!   in-memory ones
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod render;
pub mod security;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_access::{AccessService, UserStore};
use domain_billing::{BillingService, LedgerService, SaleService};
use domain_registry::{ClientService, ProductService};

use crate::config::ApiConfig;
use crate::handlers::{
    activity, auth as auth_handlers, bills, clients, health, products, sales, transactions,
    users,
};
use crate::middleware::{auth_middleware, request_log_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    /// Raw user store; the auth middleware resolves bearer tokens with it
    pub users: Arc<dyn UserStore>,
    pub access: AccessService,
    pub products: ProductService,
    pub clients: ClientService,
    pub billing: BillingService,
    pub ledger: LedgerService,
    pub sales: SaleService,
}

/// Creates the main API router
///
/// `/health` and `/api/login` are public; everything else requires a valid
/// bearer token and passes the permission matrix inside the services.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/login", post(auth_handlers::login));

    let user_routes = Router::new()
        .route("/", post(users::create_user))
        .route("/", get(users::list_users))
        .route("/:id", put(users::update_user))
        .route("/:id", delete(users::delete_user))
        .route("/:id/password", put(users::reset_password));

    let product_routes = Router::new()
        .route("/", post(products::create_product))
        .route("/", get(products::list_products))
        .route("/:id", put(products::update_product))
        .route("/:id", delete(products::deactivate_product));

    let client_routes = Router::new()
        .route("/", post(clients::create_client))
        .route("/", get(clients::list_clients))
        .route("/:id", get(clients::get_client))
        .route("/:id", put(clients::update_client));

    let bill_routes = Router::new()
        .route("/", post(bills::create_bill))
        .route("/", get(bills::list_bills))
        .route("/:id/installments", get(bills::bill_installments))
        .route("/:id/cancel", delete(bills::cancel_bill))
        .route("/:id/pay-all", put(bills::pay_all));

    let installment_routes = Router::new()
        .route("/pending", get(bills::pending_installments))
        .route("/:id/pay", put(bills::pay_installment))
        .route("/:id/payment", delete(bills::cancel_installment_payment));

    let transaction_routes = Router::new()
        .route("/", post(transactions::create_transaction))
        .route("/", get(transactions::list_transactions))
        .route("/summary", get(transactions::summary))
        .route("/client-payment", post(transactions::client_payment))
        .route("/:id", delete(transactions::cancel_transaction));

    let sale_routes = Router::new()
        .route("/", post(sales::create_sale))
        .route("/", get(sales::list_sales))
        .route("/my-reports", get(sales::my_reports));

    let protected_routes = Router::new()
        .route("/me", get(auth_handlers::me))
        .route("/me/password", put(auth_handlers::change_password))
        .nest("/users", user_routes)
        .nest("/products", product_routes)
        .nest("/clients", client_routes)
        .nest("/bills", bill_routes)
        .nest("/installments", installment_routes)
        .nest("/transactions", transaction_routes)
        .nest("/sales", sale_routes)
        .route("/reports/transactions", get(transactions::export_report))
        .route("/activity-logs", get(activity::list_activity))
        .layer(axum_middleware::from_fn(request_log_middleware))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .nest("/api", protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
