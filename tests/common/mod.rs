#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use careerbridge::config::{DbSettings, PricingSettings};
use careerbridge::db::Database;
use careerbridge::pricing::PriceOracle;
use careerbridge::{create_app, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

// Nothing listens on the discard port, so every provider call fails fast.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

pub fn pricing(coingecko: &str, cryptocompare: &str, coinbase: &str) -> PricingSettings {
    PricingSettings {
        coingecko_url: coingecko.to_string(),
        coingecko_api_key: None,
        cryptocompare_url: cryptocompare.to_string(),
        cryptocompare_api_key: None,
        coinbase_url: coinbase.to_string(),
        timeout: Duration::from_secs(2),
    }
}

pub fn offline_pricing() -> PricingSettings {
    pricing(UNREACHABLE, UNREACHABLE, UNREACHABLE)
}

/// In-memory SQLite; a single pooled connection keeps every query on the same database.
pub fn memory_db() -> Database {
    let mut settings = DbSettings::new("sqlite::memory:");
    settings.max_connections = 1;
    settings.max_retries = 0;
    settings.retry_delay = Duration::from_millis(10);
    Database::new(settings)
}

/// A database whose URL no driver accepts, so every connect attempt fails.
pub fn broken_db() -> Database {
    let mut settings = DbSettings::new("nosuchdriver://localhost/careerbridge");
    settings.max_retries = 1;
    settings.retry_delay = Duration::from_millis(10);
    settings.connect_timeout = Duration::from_millis(200);
    Database::new(settings)
}

pub fn state_with(db: Database) -> AppState {
    AppState {
        db,
        prices: PriceOracle::new(&offline_pricing()).unwrap(),
    }
}

pub fn test_app() -> (Router, AppState) {
    let state = state_with(memory_db());
    (create_app(state.clone()), state)
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub fn student_onboarding(user_id: &str) -> Value {
    json!({
        "userId": user_id,
        "profile": {
            "fullName": "Asha Rao",
            "email": "asha@example.com",
            "educationLevel": "undergraduate",
            "skills": ["Python"]
        }
    })
}

pub fn investor_onboarding(user_id: &str) -> Value {
    json!({
        "userId": user_id,
        "profile": {
            "fullName": "Lee Park",
            "email": "lee@fund.example",
            "organization": "Park Capital"
        },
        "additionalData": { "referral": "newsletter" }
    })
}

pub fn proposal() -> Value {
    json!({
        "userId": "user-1",
        "personalInfo": {
            "firstName": "Asha",
            "lastName": "Rao",
            "email": "asha@example.com"
        },
        "fundingGoal": {
            "amount": 1200,
            "currency": "USD",
            "purpose": "Cloud certification course"
        },
        "documents": [{ "name": "transcript.pdf", "url": "https://files.example/transcript.pdf" }]
    })
}

pub fn tx_hash(n: u8) -> String {
    format!("0x{:064x}", n)
}

pub const SENDER: &str = "0x52908400098527886E0F7030069857D2E4169EE7";
