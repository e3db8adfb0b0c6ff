use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    middleware::{visitor_key, CurrentUser},
    models::{
        posts::{CreatePostDto, UpdatePostDto},
        query::PageQueryDto,
    },
    AppState, Result,
};

pub fn posts_handler() -> Router {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/user/{username}", get(user_posts))
        .route(
            "/{id}",
            get(post_detail).put(update_post).delete(delete_post),
        )
}

async fn list_posts(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<PageQueryDto>,
) -> Result<impl IntoResponse> {
    let page = app_state
        .posts_service
        .list_posts(query.page.unwrap_or(1))
        .await?;

    Ok((StatusCode::OK, Json(page)))
}

async fn user_posts(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<PageQueryDto>,
) -> Result<impl IntoResponse> {
    let page = app_state
        .posts_service
        .list_posts_by_author(&username, query.page.unwrap_or(1))
        .await?;

    Ok((StatusCode::OK, Json(page)))
}

async fn post_detail(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let key = visitor_key(&headers, addr, current_user.0.as_ref());

    let detail = app_state
        .posts_service
        .get_post(post_id, Some(&key))
        .await?;

    Ok((StatusCode::OK, Json(detail)))
}

async fn create_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(new_post): Json<CreatePostDto>,
) -> Result<impl IntoResponse> {
    new_post.validate()?;

    let post = app_state
        .posts_service
        .create_post(current_user.0.as_ref(), new_post)
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/posts/{}", post.id))],
        Json(post),
    ))
}

async fn update_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(post_id): Path<Uuid>,
    Json(update): Json<UpdatePostDto>,
) -> Result<impl IntoResponse> {
    update.validate()?;

    let post = app_state
        .posts_service
        .update_post(current_user.0.as_ref(), post_id, update)
        .await?;

    Ok((StatusCode::OK, Json(post)))
}

async fn delete_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    app_state
        .posts_service
        .delete_post(current_user.0.as_ref(), post_id)
        .await?;

    Ok(Redirect::to("/api/posts"))
}
