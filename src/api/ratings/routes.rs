use crate::api::models::AppState;
use crate::api::ratings::handlers::{
    rating_detail_handler, rating_summary_handler, submit_rating_handler,
};
use axum::{
    routing::{get, post},
    Router,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/avaliacoes/resumo/{tabela}", get(rating_summary_handler))
        .route("/avaliacoes/detalhe/{tabela}/{item_id}", get(rating_detail_handler))
        .route("/avaliar", post(submit_rating_handler))
}
