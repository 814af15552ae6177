use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::proposal;
use crate::error::AppError;
use crate::fallback::{with_fallback, FetchedBody};
use crate::routes::{json_object, Envelope};
use crate::store::ProposalSubmission;
use crate::{mock, schemas, store, AppState};

/// Submit a funding proposal
#[utoipa::path(
    post,
    path = "/api/proposals",
    request_body = ProposalSubmission,
    responses(
        (status = 201, description = "Proposal stored with status `submitted`", body = proposal::Model),
        (status = 400, description = "Missing required field or schema violation"),
        (status = 500, description = "Database unavailable")
    ),
    description = "Accepts personal info, funding goal and optional financial info, essays and documents. The proposal always starts in the `submitted` state."
)]
#[tracing::instrument(skip(state, payload))]
pub async fn submit_proposal(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let document = json_object(payload)?;
    schemas::require_fields(&document, schemas::PROPOSAL_REQUIRED)?;

    let conn = state.db.connect().await?;
    let stored = store::insert_proposal(conn, document).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(stored).with_message("Proposal submitted successfully")),
    ))
}

/// Fetch a proposal, or sample data when it cannot be read
#[utoipa::path(
    get,
    path = "/api/proposals/{id}",
    params(("id" = String, Path, description = "Proposal UUID")),
    responses(
        (status = 200, description = "Live proposal, or mock proposal with `fallback: true` and a `warning`", body = proposal::Model),
        (status = 400, description = "Malformed proposal id")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_proposal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|e| AppError::InvalidRequest(format!("invalid proposal id '{}': {}", id, e)))?;
    let lookup = format!("proposal_id={}", id);

    let fetched = with_fallback(&lookup, mock::proposal(), || async move {
        let conn = state.db.connect().await?;
        store::find_proposal(conn, id).await
    })
    .await;

    Ok(Json(FetchedBody::from(fetched)))
}
