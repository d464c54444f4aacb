pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod rate_limit;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    routing::{get, post},
};

use crate::infra::http::RouterState;

pub fn build_api_router(state: RouterState) -> Router<RouterState> {
    Router::new()
        .route(
            "/api/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/api/posts/{id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/session", get(handlers::current_session))
        .with_state(state)
}
