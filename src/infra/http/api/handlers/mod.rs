//! API handlers organized by resource type.
//!
//! Error conversions shared by the resource modules live here.

mod auth;
mod posts;

pub use auth::*;
pub use posts::*;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;

use crate::application::auth::AuthError;
use crate::application::posts::PostError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

use super::error::{ApiError, codes};

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::CONFLICT,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(msg) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            None,
        )
        .with_detail(msg),
    }
}

pub(crate) fn post_to_api(err: PostError) -> ApiError {
    match err {
        PostError::NotFound => ApiError::not_found("Post not found"),
        PostError::Conflict { slug } => ApiError::new(
            StatusCode::CONFLICT,
            codes::CONFLICT,
            "A post with this slug already exists",
            Some(format!("slug `{slug}` is taken; choose a different title")),
        ),
        PostError::Validation(DomainError::Validation { message }) => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid post",
            Some(message),
        ),
        PostError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn auth_to_api(err: AuthError) -> ApiError {
    match err {
        AuthError::Missing | AuthError::Invalid => ApiError::unauthorized(),
        AuthError::Expired => ApiError::session_expired(),
        AuthError::InvalidCredentials => ApiError::invalid_credentials(),
        AuthError::Hashing(message) => ApiError::internal(message),
        AuthError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn json_to_api(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request("Malformed request body", Some(rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_failures_keep_driver_text_out_of_the_hint() {
        let err = repo_to_api(RepoError::Persistence(
            "error returned from database: connection reset".into(),
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), codes::REPO);
        assert_eq!(err.hint(), None);

        let hashing = auth_to_api(AuthError::Hashing("task panicked".into()));
        assert_eq!(hashing.code(), codes::INTERNAL);
        assert_eq!(hashing.hint(), None);
    }
}
