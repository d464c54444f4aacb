//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{AuthorRecord, PostWithAuthor, PostRecord, SessionRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Unique constraint guarding `posts.slug`.
pub const POSTS_SLUG_CONSTRAINT: &str = "posts_slug_key";
/// Unique constraint guarding `authors.email`.
pub const AUTHORS_EMAIL_CONSTRAINT: &str = "authors_email_key";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostListFilter {
    pub published_only: bool,
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub published: bool,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub author_id: Uuid,
}

/// Partial update: `None` leaves a column untouched, `Some(None)` clears a
/// nullable column.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostParams {
    pub id: Uuid,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub published: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct CreateAuthorParams {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct CreateSessionParams {
    pub author_id: Uuid,
    pub prefix: String,
    pub hashed_secret: Vec<u8>,
    pub expires_at: OffsetDateTime,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Newest `created_at` first, ties broken by id descending.
    async fn list_posts(&self, filter: PostListFilter) -> Result<Vec<PostWithAuthor>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError>;

    async fn find_by_slug(
        &self,
        slug: &str,
        published_only: bool,
    ) -> Result<Option<PostWithAuthor>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    /// Fails with [`RepoError::NotFound`] when no row has `params.id`.
    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    /// Fails with [`RepoError::NotFound`] when no row was deleted.
    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait AuthorsRepo: Send + Sync {
    async fn find_author_by_email(&self, email: &str) -> Result<Option<AuthorRecord>, RepoError>;

    async fn find_author_by_id(&self, id: Uuid) -> Result<Option<AuthorRecord>, RepoError>;

    async fn create_author(&self, params: CreateAuthorParams) -> Result<AuthorRecord, RepoError>;
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    async fn create_session(&self, params: CreateSessionParams)
    -> Result<SessionRecord, RepoError>;

    async fn find_session_by_prefix(&self, prefix: &str)
    -> Result<Option<SessionRecord>, RepoError>;

    /// Idempotent: deleting an unknown prefix succeeds.
    async fn delete_session_by_prefix(&self, prefix: &str) -> Result<(), RepoError>;

    /// Remove every session whose expiry is at or before `now`; returns the count.
    async fn delete_expired_sessions(&self, now: OffsetDateTime) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
