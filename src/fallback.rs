use serde::Serialize;
use std::fmt;
use std::future::Future;

use crate::error::AppError;

/// Why a read was answered with sample data instead of a live record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The store answered, but nothing matched the lookup.
    NotFound,
    /// The store could not be reached or the query failed.
    Unavailable(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NotFound => write!(f, "record not found"),
            FallbackReason::Unavailable(msg) => write!(f, "database unavailable ({})", msg),
        }
    }
}

/// Result of a read that may have been substituted with mock data.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Live(T),
    Fallback { data: T, reason: FallbackReason },
}

impl<T> Fetched<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Fetched::Fallback { .. })
    }
}

/// Wire shape of a `Fetched` value.
#[derive(Debug, Serialize)]
pub struct FetchedBody<T> {
    pub success: bool,
    pub data: T,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<T> From<Fetched<T>> for FetchedBody<T> {
    fn from(fetched: Fetched<T>) -> Self {
        match fetched {
            Fetched::Live(data) => FetchedBody {
                success: true,
                data,
                fallback: false,
                warning: None,
            },
            Fetched::Fallback { data, reason } => FetchedBody {
                success: true,
                data,
                fallback: true,
                warning: Some(format!("Showing sample data: {}", reason)),
            },
        }
    }
}

/// Runs `op`; on a miss or any error, substitutes `mock` instead of failing.
///
/// `lookup` describes the query parameters and only feeds the log line.
pub async fn with_fallback<T, F, Fut>(lookup: &str, mock: T, op: F) -> Fetched<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>, AppError>>,
{
    match op().await {
        Ok(Some(data)) => Fetched::Live(data),
        Ok(None) => {
            tracing::info!(lookup, "No live record, serving mock data");
            Fetched::Fallback {
                data: mock,
                reason: FallbackReason::NotFound,
            }
        }
        Err(e) => {
            tracing::warn!(lookup, error = %e, "Live read failed, serving mock data");
            let reason = match e {
                AppError::DatabaseUnavailable(msg) => FallbackReason::Unavailable(msg),
                other => FallbackReason::Unavailable(other.to_string()),
            };
            Fetched::Fallback { data: mock, reason }
        }
    }
}
