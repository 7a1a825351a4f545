//! ERP Backend
//!
//! Multi-tenant REST backend for HR, leave, payroll, catalog and the employee
//! portal, with SQLite persistence.

mod api;
mod config;
mod context;
mod db;
mod errors;
mod models;
mod seed;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use db::Repository;
use models::{
    Announcement, Brand, Department, Employee, EmployeePayroll, LeaveBalance, LeaveRequest,
    LeaveType, PayrollBatch, Payslip, PriceList, Product, ServiceRequest,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_tracing(&config);

    tracing::info!("Starting ERP backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Default tenant: {}", config.default_tenant);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(env_filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let default_tenant = state.config.default_tenant.clone();

    // Generic record surfaces
    let mut api_routes = Router::new();
    api_routes = api::crud_routes::<Department>(api_routes, "/departments");
    api_routes = api::crud_routes::<Employee>(api_routes, "/employees");
    api_routes = api::crud_routes::<LeaveType>(api_routes, "/leave-types");
    api_routes = api::crud_routes::<LeaveBalance>(api_routes, "/leave-balances");
    api_routes = api::crud_routes::<Payslip>(api_routes, "/payslips");
    api_routes = api::crud_routes::<PayrollBatch>(api_routes, "/payroll-batches");
    api_routes = api::crud_routes::<EmployeePayroll>(api_routes, "/employee-payrolls");
    api_routes = api::crud_routes::<Brand>(api_routes, "/brands");
    api_routes = api::crud_routes::<Product>(api_routes, "/products");
    api_routes = api::crud_routes::<PriceList>(api_routes, "/price-lists");
    api_routes = api::crud_routes::<Announcement>(api_routes, "/announcements");
    api_routes = api::crud_routes::<ServiceRequest>(api_routes, "/service-requests");
    api_routes = api::read_routes::<LeaveRequest>(api_routes, "/leave-requests");

    let api_routes = api_routes
        // Seed
        .route(
            "/seed/egyptian-all",
            get(api::seed_egyptian_status)
                .post(api::seed_egyptian_all)
                .delete(api::wipe_egyptian_all),
        )
        // Leave
        .route("/leave-requests", post(api::create_leave_request))
        .route("/leave-requests/{id}/approve", post(api::approve_leave_request))
        .route("/leave-requests/{id}/reject", post(api::reject_leave_request))
        .route("/leave-requests/{id}/cancel", post(api::cancel_leave_request))
        .route("/leave-balances/summary", get(api::leave_balance_summary))
        // Payroll
        .route("/payroll-batches/{id}/generate", post(api::generate_payroll))
        .route("/payroll-batches/{id}/recalculate", post(api::recalculate_payroll))
        .route("/payroll-batches/{id}/payslips", post(api::issue_payslips))
        // Organization chart
        .route("/organization-chart", get(api::get_organization_chart))
        .route("/organization-chart/stats", get(api::get_organization_stats))
        .route("/organization-chart/path/{node_id}", get(api::get_organization_path))
        .route("/organization-chart/rebuild", post(api::rebuild_organization_chart))
        // Invitations
        .route(
            "/invitations",
            get(api::list_invitations).post(api::create_invitation),
        )
        .route("/invitations/verify", get(api::verify_invitation))
        .route("/invitations/accept", post(api::accept_invitation))
        .route("/invitations/{id}", get(api::get_invitation))
        .route("/invitations/{id}/revoke", post(api::revoke_invitation))
        // Catalog
        .route(
            "/price-lists/{id}/price/{product_id}",
            get(api::quote_price),
        )
        // Portal
        .route("/portal/{employee_id}", get(api::get_portal))
        // Status badges
        .route("/status-badges/{kind}/{status}", get(api::get_status_badge))
        // Resolve tenant and actor
        .layer(middleware::from_fn(move |req, next| {
            context::request_context_layer(default_tenant.clone(), req, next)
        }));

    // Health check (no tenant required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
