use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::pricing::{Conversion, Currency, Quote};
use crate::routes::Envelope;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConvertQuery {
    /// Amount to convert
    amount: f64,
    /// Source currency: `usd` or `eth`
    from: String,
    /// Target currency: `usd` or `eth`
    to: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversionResponse {
    pub amount: f64,
    pub from: Currency,
    pub to: Currency,
    /// USD per ETH used for the conversion
    pub rate: f64,
    pub result: f64,
    /// Provider that supplied the rate, or `fallback`
    pub source: String,
    /// True when no provider answered and the static rate was used
    pub fallback: bool,
}

impl From<Conversion> for ConversionResponse {
    fn from(c: Conversion) -> Self {
        ConversionResponse {
            amount: c.amount,
            from: c.from,
            to: c.to,
            rate: c.quote.rate,
            result: c.result,
            source: c.quote.source.label().to_string(),
            fallback: c.quote.is_fallback(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RateResponse {
    /// USD per ETH
    pub rate: f64,
    pub source: String,
    pub fallback: bool,
}

impl From<Quote> for RateResponse {
    fn from(q: Quote) -> Self {
        RateResponse {
            rate: q.rate,
            source: q.source.label().to_string(),
            fallback: q.is_fallback(),
        }
    }
}

/// Convert between USD and ETH at the current market rate
#[utoipa::path(
    get,
    path = "/api/currency/convert",
    params(ConvertQuery),
    responses(
        (status = 200, description = "Conversion result; `fallback` marks the static rate", body = ConversionResponse),
        (status = 400, description = "Unsupported currency or invalid amount")
    ),
    description = "Price providers are tried in a fixed order. If none answers, the documented fallback rate is used instead of failing."
)]
#[tracing::instrument(skip(state, query))]
pub async fn convert_currency(
    State(state): State<AppState>,
    query: Result<Query<ConvertQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
    let from = Currency::parse(&query.from)
        .ok_or_else(|| AppError::InvalidRequest(format!("unsupported currency '{}'", query.from)))?;
    let to = Currency::parse(&query.to)
        .ok_or_else(|| AppError::InvalidRequest(format!("unsupported currency '{}'", query.to)))?;
    if !query.amount.is_finite() || query.amount < 0.0 {
        return Err(AppError::InvalidRequest(format!("invalid amount {}", query.amount)));
    }

    let conversion = state.prices.convert(query.amount, from, to).await;
    Ok(Json(Envelope::new(ConversionResponse::from(conversion))))
}

/// Current USD price of one ETH
#[utoipa::path(
    get,
    path = "/api/currency/eth-usd",
    responses(
        (status = 200, description = "Current rate; `fallback` marks the static rate", body = RateResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn eth_usd_rate(State(state): State<AppState>) -> impl IntoResponse {
    let quote = state.prices.eth_usd_rate().await;
    Json(Envelope::new(RateResponse::from(quote)))
}
