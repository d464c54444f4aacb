use quillpost_api_types::{PostCreateRequest, PostUpdateRequest};
use thiserror::Error;

use crate::{
    application::{auth::Identity, repos::RepoError},
    domain::{entities::PostWithAuthor, error::DomainError},
};

#[derive(Debug, Error)]
pub enum PostError {
    #[error("post not found")]
    NotFound,
    #[error("a post with slug `{slug}` already exists")]
    Conflict { slug: String },
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Repo(RepoError),
}

impl PostError {
    /// Classify a write failure; `slug` is the value the write tried to store.
    pub(crate) fn from_write(err: RepoError, slug: Option<&str>) -> Self {
        match err {
            RepoError::NotFound => Self::NotFound,
            RepoError::Duplicate { .. } => Self::Conflict {
                slug: slug.unwrap_or_default().to_string(),
            },
            other => Self::Repo(other),
        }
    }
}

impl From<RepoError> for PostError {
    fn from(err: RepoError) -> Self {
        Self::from_write(err, None)
    }
}

/// Which posts a read may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadAccess {
    PublishedOnly,
    IncludeDrafts,
}

impl ReadAccess {
    /// Drafts are visible to any authenticated author, never to anonymous readers.
    pub fn for_viewer(identity: Option<&Identity>) -> Self {
        match identity {
            Some(_) => Self::IncludeDrafts,
            None => Self::PublishedOnly,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreatePostCommand {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub published: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
}

impl From<PostCreateRequest> for CreatePostCommand {
    fn from(request: PostCreateRequest) -> Self {
        Self {
            title: request.title,
            content: request.content,
            excerpt: request.excerpt,
            published: request.published,
            tags: request.tags,
            featured_image: request.featured_image,
        }
    }
}

/// Partial update; `None` leaves a field as stored.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostCommand {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub published: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<Option<String>>,
}

impl From<PostUpdateRequest> for UpdatePostCommand {
    fn from(request: PostUpdateRequest) -> Self {
        Self {
            title: request.title,
            content: request.content,
            excerpt: request.excerpt,
            published: request.published,
            tags: request.tags,
            featured_image: request.featured_image,
        }
    }
}

/// A published post together with its display HTML.
#[derive(Debug, Clone)]
pub struct RenderedPost {
    pub post: PostWithAuthor,
    pub content_html: String,
}
