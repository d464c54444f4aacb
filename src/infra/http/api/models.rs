//! Wire models for the JSON API.

pub use quillpost_api_types::{
    DeleteResponse, LoginRequest, LoginResponse, PostCreateRequest, PostUpdateRequest,
    SessionAuthor, SessionResponse,
};
use serde::Deserialize;

use crate::application::auth::Identity;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostListQuery {
    pub published: Option<String>,
}

impl PostListQuery {
    /// Only the literal `true` narrows the listing.
    pub fn published_only(&self) -> bool {
        self.published.as_deref() == Some("true")
    }
}

pub fn session_author(identity: &Identity) -> SessionAuthor {
    SessionAuthor {
        id: identity.author_id,
        name: identity.name.clone(),
        email: identity.email.clone(),
    }
}
