use crate::api::models::*;
use crate::storage::{Record, Select};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::{info, warn};

/// `{item_id, nota}` for every rating of items in `tabela`.
pub async fn rating_summary_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Record>>, AppError> {
    let Path(tabela) = path?;
    let query = Select::from(RATINGS_TABLE)
        .columns("item_id,nota")
        .eq("tabela_item", &tabela);

    let rows = state.call(state.store.select(&query)).await?;
    Ok(Json(rows))
}

/// Full rating rows for one item, newest first.
pub async fn rating_detail_handler(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Vec<Record>>, AppError> {
    let Path((tabela, item_id)) = path?;
    let query = Select::from(RATINGS_TABLE)
        .eq("tabela_item", &tabela)
        .eq("item_id", &item_id)
        .order_desc("created_at");

    let rows = state.call(state.store.select(&query)).await?;
    Ok(Json(rows))
}

pub async fn submit_rating_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitRatingResponse>), AppError> {
    let body = match body {
        Ok(Json(body)) => body,
        Err(e) => {
            warn!(error = %e, "Rejected rating body");
            return Err(AppError::BadRequest(INCOMPLETE_DATA.to_string()));
        }
    };

    let RatingSubmission(fields) = RatingSubmission::validate(body).map_err(AppError::BadRequest)?;

    let dados = state
        .call(state.store.insert(RATINGS_TABLE, Value::Object(fields)))
        .await?;

    info!(rows = dados.len(), "Rating stored");

    Ok((
        StatusCode::CREATED,
        Json(SubmitRatingResponse {
            mensagem: "Sucesso!".to_string(),
            dados,
        }),
    ))
}
