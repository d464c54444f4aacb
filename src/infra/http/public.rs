use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use time::OffsetDateTime;

use crate::{
    application::{
        error::HttpError,
        posts::{PostError, PostService, ReadAccess},
        repos::HealthRepo,
    },
    presentation::views::{
        IndexTemplate, PostCard, PostDetailView, PostTemplate, render_not_found_response,
        render_template_response,
    },
};

use super::{RouterState, db_health_response, repo_error_to_http};

#[derive(Clone)]
pub struct HttpState {
    pub posts: Arc<PostService>,
    pub health: Arc<dyn HealthRepo>,
}

pub fn build_router(state: RouterState) -> Router<RouterState> {
    Router::new()
        .route("/", get(index))
        .route("/blog/{slug}", get(post_detail))
        .route("/_health/db", get(public_health))
        .fallback(fallback_router)
        .with_state(state)
}

async fn index(State(state): State<HttpState>) -> Response {
    match state.posts.list(ReadAccess::PublishedOnly, true).await {
        Ok(posts) => {
            let now = OffsetDateTime::now_utc();
            let posts = posts
                .iter()
                .map(|post| PostCard::from_post(post, now))
                .collect();
            render_template_response(IndexTemplate { posts }, StatusCode::OK)
        }
        Err(err) => post_error_to_response("infra::http::public::index", err),
    }
}

async fn post_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    match state.posts.render_for_display(&slug).await {
        Ok(rendered) => {
            let post = PostDetailView::from_rendered(rendered, OffsetDateTime::now_utc());
            render_template_response(PostTemplate { post }, StatusCode::OK)
        }
        Err(err) => post_error_to_response("infra::http::public::post_detail", err),
    }
}

async fn fallback_router() -> Response {
    render_not_found_response()
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.health.ping().await)
}

fn post_error_to_response(source: &'static str, err: PostError) -> Response {
    match err {
        PostError::NotFound => render_not_found_response(),
        PostError::Repo(repo) => repo_error_to_http(source, repo).into_response(),
        other => HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to load post",
            &other,
        )
        .into_response(),
    }
}
