use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};

pub fn new() -> Router<AppState> {
    Router::new().route("/", get(index))
}

pub async fn index() -> Json<&'static str> {
    Json("staff rota api")
}

pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "api not found")
}
