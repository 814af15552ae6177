use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use crate::error::AppError;
use crate::routes::{json_object, Envelope};
use crate::store::{ConnectionRequest, ConnectionView, TransactionRequest};
use crate::{schemas, store, AppState};

/// Link a proposal to its on-chain proposal id
#[utoipa::path(
    post,
    path = "/api/blockchain/connections",
    request_body = ConnectionRequest,
    responses(
        (status = 201, description = "Link created", body = ConnectionView),
        (status = 400, description = "Missing required field or schema violation"),
        (status = 409, description = "Proposal already linked; body `data` holds the original link"),
        (status = 500, description = "Database unavailable")
    )
)]
#[tracing::instrument(skip(state, payload))]
pub async fn create_connection(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let document = json_object(payload)?;
    schemas::require_fields(&document, schemas::CONNECTION_REQUIRED)?;

    let conn = state.db.connect().await?;
    let view = store::create_connection(conn, document).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(view).with_message("Blockchain connection created")),
    ))
}

/// Fetch a proposal's ledger link and its donations in the order recorded
#[utoipa::path(
    get,
    path = "/api/blockchain/connections/{proposal_id}",
    params(("proposal_id" = String, Path, description = "Application proposal id")),
    responses(
        (status = 200, description = "Link with transactions", body = ConnectionView),
        (status = 404, description = "Proposal is not linked"),
        (status = 500, description = "Database unavailable")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_connection(
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let conn = state.db.connect().await?;
    let view = store::find_connection(conn, &proposal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("blockchain connection for proposal {}", proposal_id)))?;

    Ok(Json(Envelope::new(view)))
}

/// Record a donation transaction against a linked proposal
#[utoipa::path(
    post,
    path = "/api/blockchain/connections/{proposal_id}/transactions",
    params(("proposal_id" = String, Path, description = "Application proposal id")),
    request_body = TransactionRequest,
    responses(
        (status = 200, description = "Transaction appended; returns the updated link", body = ConnectionView),
        (status = 400, description = "Missing required field or schema violation"),
        (status = 404, description = "Proposal is not linked"),
        (status = 500, description = "Database unavailable")
    )
)]
#[tracing::instrument(skip(state, payload))]
pub async fn append_transaction(
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let document = json_object(payload)?;
    schemas::require_fields(&document, schemas::TRANSACTION_REQUIRED)?;

    let conn = state.db.connect().await?;
    let view = store::append_transaction(conn, &proposal_id, document).await?;

    Ok(Json(Envelope::new(view).with_message("Transaction recorded")))
}
