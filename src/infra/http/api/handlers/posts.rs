//! Posts handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::posts::{CreatePostCommand, ReadAccess, UpdatePostCommand};

use super::{json_to_api, post_to_api};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{AuthenticatedAuthor, Viewer};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_posts(
    State(state): State<ApiState>,
    Viewer(viewer): Viewer,
    Query(query): Query<PostListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let access = ReadAccess::for_viewer(viewer.as_ref());
    let posts = state
        .posts
        .list(access, query.published_only())
        .await
        .map_err(post_to_api)?;

    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<ApiState>,
    Viewer(viewer): Viewer,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_post_id(&id)?;
    let post = state
        .posts
        .get(id, ReadAccess::for_viewer(viewer.as_ref()))
        .await
        .map_err(post_to_api)?;

    Ok(Json(post))
}

pub async fn create_post(
    State(state): State<ApiState>,
    AuthenticatedAuthor(author): AuthenticatedAuthor,
    payload: Result<Json<PostCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(json_to_api)?;
    let post = state
        .posts
        .create(&author, CreatePostCommand::from(payload))
        .await
        .map_err(post_to_api)?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<ApiState>,
    AuthenticatedAuthor(author): AuthenticatedAuthor,
    Path(id): Path<String>,
    payload: Result<Json<PostUpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_post_id(&id)?;
    let Json(payload) = payload.map_err(json_to_api)?;
    let post = state
        .posts
        .update(&author, id, UpdatePostCommand::from(payload))
        .await
        .map_err(post_to_api)?;

    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<ApiState>,
    AuthenticatedAuthor(author): AuthenticatedAuthor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_post_id(&id)?;
    state
        .posts
        .delete(&author, id)
        .await
        .map_err(post_to_api)?;

    Ok(Json(DeleteResponse { success: true }))
}

/// Ids that are not UUIDs cannot name a post.
fn parse_post_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Post not found"))
}
