use crate::api::items::handlers::{get_item_handler, list_items_handler};
use crate::api::models::AppState;
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items/{tabela}", get(list_items_handler))
        .route("/item/{tabela}/{id}", get(get_item_handler))
}
