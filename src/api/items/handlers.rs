use crate::api::models::*;
use crate::storage::{Record, Select};
use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use tracing::info;

pub async fn list_items_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Record>>, AppError> {
    let Path(tabela) = path?;
    let rows = state.call(state.store.select(&Select::from(&tabela))).await?;

    info!(table = %tabela, rows = rows.len(), "Listed items");

    Ok(Json(rows))
}

pub async fn get_item_handler(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Record>, AppError> {
    let Path((tabela, id)) = path?;
    let query = Select::from(&tabela).eq("id", &id);
    let rows = state.call(state.store.select(&query)).await?;

    // Only the first match is returned
    rows.into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(ITEM_NOT_FOUND.to_string()))
}
