use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use crate::entities::{onboarding_record, OnboardingRole};
use crate::error::AppError;
use crate::fallback::{with_fallback, FetchedBody};
use crate::routes::{json_object, Envelope};
use crate::store::OnboardingSubmission;
use crate::{mock, schemas, store, AppState};

fn parse_role(raw: &str) -> Result<OnboardingRole, AppError> {
    raw.parse::<OnboardingRole>().map_err(AppError::InvalidRequest)
}

fn required_fields(role: OnboardingRole) -> &'static [&'static str] {
    match role {
        OnboardingRole::Student => schemas::STUDENT_REQUIRED,
        OnboardingRole::Investor => schemas::INVESTOR_REQUIRED,
    }
}

/// Record a student's or investor's onboarding form
#[utoipa::path(
    post,
    path = "/api/onboarding/{role}",
    params(("role" = String, Path, description = "`student` or `investor`")),
    request_body = OnboardingSubmission,
    responses(
        (status = 201, description = "Onboarding record stored", body = onboarding_record::Model),
        (status = 400, description = "Missing required field or schema violation"),
        (status = 409, description = "User already completed onboarding for this role"),
        (status = 500, description = "Database unavailable")
    )
)]
#[tracing::instrument(skip(state, payload))]
pub async fn submit_onboarding(
    State(state): State<AppState>,
    Path(role): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let role = parse_role(&role)?;
    let document = json_object(payload)?;
    schemas::require_fields(&document, required_fields(role))?;

    let conn = state.db.connect().await?;
    let record = store::insert_onboarding(conn, role, document).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(record).with_message("Onboarding completed successfully")),
    ))
}

/// Fetch a user's onboarding record, or sample data when it cannot be read
#[utoipa::path(
    get,
    path = "/api/onboarding/{role}/{user_id}",
    params(
        ("role" = String, Path, description = "`student` or `investor`"),
        ("user_id" = String, Path, description = "Identity provider user id")
    ),
    responses(
        (status = 200, description = "Live record, or mock record with `fallback: true` and a `warning`", body = onboarding_record::Model),
        (status = 400, description = "Unknown role")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_onboarding(
    State(state): State<AppState>,
    Path((role, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let role = parse_role(&role)?;
    let lookup = format!("role={} user_id={}", role, user_id);

    let fetched = with_fallback(&lookup, mock::onboarding(role, &user_id), || async move {
        let conn = state.db.connect().await?;
        store::find_onboarding(conn, role, &user_id).await
    })
    .await;

    Ok(Json(FetchedBody::from(fetched)))
}
