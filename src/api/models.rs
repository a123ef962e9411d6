use crate::storage::{DataStore, Record, StoreError};
use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

/// Table holding every rating, whatever category the item belongs to.
pub const RATINGS_TABLE: &str = "avaliacoes";

/// Remote procedure backing `/api/busca`.
pub const SEARCH_PROCEDURE: &str = "search_items";

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub store_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn DataStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Run a single backing-store call under the request deadline.
    pub async fn call<T, F>(&self, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => Err(AppError::Store(StoreError::Timeout(self.store_timeout))),
        }
    }
}

/// Body of `POST /api/avaliar`, forwarded to the store as-is.
#[derive(Debug)]
pub struct RatingSubmission(pub Record);

impl RatingSubmission {
    /// Accept any JSON object carrying a truthy `item_id` and `nota`.
    pub fn validate(body: Value) -> Result<Self, String> {
        let Value::Object(fields) = body else {
            return Err(INCOMPLETE_DATA.to_string());
        };

        let present = |name: &str| fields.get(name).is_some_and(is_truthy);
        if !present("item_id") || !present("nota") {
            return Err(INCOMPLETE_DATA.to_string());
        }

        Ok(Self(fields))
    }
}

pub const INCOMPLETE_DATA: &str = "Dados incompletos";
pub const ITEM_NOT_FOUND: &str = "Item não encontrado";

/// Null, false, zero and empty containers do not count as a value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Response after a rating is stored
#[derive(Debug, Serialize)]
pub struct SubmitRatingResponse {
    pub mensagem: String,
    pub dados: Vec<Record>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub erro: String,
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::Api { status, message }) => {
                error!(upstream_status = *status, error = %message, "Data store rejected call");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Store(e) => {
                error!(error = %e, "Data store call failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse { erro: self.to_string() })).into_response()
    }
}
