use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod fallback;
pub mod mock;
pub mod pricing;
pub mod routes;
pub mod schemas;
pub mod store;

use crate::config::Config;
use crate::db::Database;
use crate::error::AppError;
use crate::pricing::PriceOracle;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub prices: PriceOracle,
}

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(AppState {
            db: Database::new(config.database.clone()),
            prices: PriceOracle::new(&config.pricing)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok` when the process is serving
    status: String,
    /// `connected` once a database handshake has succeeded
    database: String,
}

/// Health check endpoint. Reports the connection flag without dialing the database.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = if state.db.is_connected() { "connected" } else { "not_connected" };
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            database: database.to_string(),
        }),
    )
}

async fn not_found() -> AppError {
    AppError::NotFound("no such route".to_string())
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CareerBridge API",
        version = "0.1.0",
        description = "Onboarding, funding proposals, marketplace and donation tracking"
    ),
    paths(
        health_check,
        routes::onboarding::submit_onboarding,
        routes::onboarding::get_onboarding,
        routes::proposals::submit_proposal,
        routes::proposals::get_proposal,
        routes::marketplace::list_marketplace,
        routes::marketplace::get_marketplace_item,
        routes::blockchain::create_connection,
        routes::blockchain::get_connection,
        routes::blockchain::append_transaction,
        routes::currency::convert_currency,
        routes::currency::eth_usd_rate
    ),
    components(schemas(
        HealthResponse,
        error::FieldViolation,
        entities::onboarding_record::Model,
        entities::OnboardingRole,
        entities::proposal::Model,
        entities::ProposalStatus,
        entities::marketplace_item::Model,
        entities::blockchain_connection::Model,
        entities::blockchain_transaction::Model,
        store::ProposalSubmission,
        store::OnboardingSubmission,
        store::ConnectionRequest,
        store::TransactionRequest,
        store::ConnectionView,
        routes::currency::ConversionResponse,
        routes::currency::RateResponse,
        pricing::Currency
    ))
)]
pub struct ApiDoc;

/// Create the application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/onboarding/{role}", post(routes::submit_onboarding))
        .route("/api/onboarding/{role}/{user_id}", get(routes::get_onboarding))
        .route("/api/proposals", post(routes::submit_proposal))
        .route("/api/proposals/{id}", get(routes::get_proposal))
        .route("/api/marketplace", get(routes::list_marketplace))
        .route("/api/marketplace/{id}", get(routes::get_marketplace_item))
        .route("/api/blockchain/connections", post(routes::create_connection))
        .route("/api/blockchain/connections/{proposal_id}", get(routes::get_connection))
        .route(
            "/api/blockchain/connections/{proposal_id}/transactions",
            post(routes::append_transaction),
        )
        .route("/api/currency/convert", get(routes::convert_currency))
        .route("/api/currency/eth-usd", get(routes::eth_usd_rate))
        .with_state(state);

    let docs_router = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(api_routes)
        .merge(docs_router)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
