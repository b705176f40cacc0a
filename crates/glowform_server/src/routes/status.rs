use axum::{http::StatusCode, response::IntoResponse};

pub const STATUS_TEXT: &str = "App is up and running";

pub async fn status_handler() -> impl IntoResponse {
    (StatusCode::OK, STATUS_TEXT)
}
