use axum::{response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

pub fn about_handler() -> Router {
    Router::new().route("/", get(about))
}

async fn about() -> impl IntoResponse {
    Json(json!({
        "title": "About",
        "description": "A small blog: read what people publish, sign up to write your own.",
        "contact": "hello@quillblog.dev"
    }))
}
