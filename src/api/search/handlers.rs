use crate::api::models::*;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

pub async fn search_handler(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(params) = query?;

    // A repeated `q` keeps its first value
    let termo = params
        .into_iter()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value)
        .filter(|q| !q.is_empty());

    let Some(termo) = termo else {
        return Ok(Json(json!([])));
    };

    info!(query = %termo, "Searching");

    let result = state
        .call(
            state
                .store
                .rpc(SEARCH_PROCEDURE, json!({ "search_term": termo })),
        )
        .await?;

    Ok(Json(result))
}
