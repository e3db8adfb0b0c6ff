use std::sync::Arc;

use axum::{middleware::from_fn, Extension, Router};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{about::about_handler, auth::auth_handler, posts::posts_handler},
    middleware::attach_user,
    AppState,
};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/posts", posts_handler())
        .nest("/about", about_handler())
        .layer(from_fn(attach_user))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new().nest("/api", api_route)
}
