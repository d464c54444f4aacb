//! One-shot creation of the first author account.

use thiserror::Error;
use tracing::info;

use crate::application::auth::{AuthError, hash_password_blocking};
use crate::application::repos::{AuthorsRepo, CreateAuthorParams, RepoError};
use crate::domain::entities::AuthorRecord;

pub const ADMIN_NAME: &str = "Admin";

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Please set ADMIN_EMAIL and ADMIN_PASSWORD environment variables")]
    MissingCredentials,
    #[error(transparent)]
    Hashing(#[from] AuthError),
    #[error(transparent)]
    Repo(RepoError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapOutcome {
    Created(AuthorRecord),
    AlreadyExists { email: String },
}

/// Login credentials for the bootstrap account.
#[derive(Clone)]
pub struct AdminCredentials {
    email: String,
    password: String,
}

impl AdminCredentials {
    /// Blank values count as missing.
    pub fn resolve(email: Option<&str>, password: Option<&str>) -> Result<Self, BootstrapError> {
        let email = email.map(str::trim).filter(|value| !value.is_empty());
        let password = password.filter(|value| !value.is_empty());
        match (email, password) {
            (Some(email), Some(password)) => Ok(Self {
                email: email.to_string(),
                password: password.to_string(),
            }),
            _ => Err(BootstrapError::MissingCredentials),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Create the `Admin` author unless one with the same email already exists.
pub async fn create_admin(
    authors: &dyn AuthorsRepo,
    credentials: AdminCredentials,
) -> Result<BootstrapOutcome, BootstrapError> {
    let AdminCredentials { email, password } = credentials;
    let password_hash = hash_password_blocking(password).await?;

    match authors
        .create_author(CreateAuthorParams {
            name: ADMIN_NAME.to_string(),
            email: email.clone(),
            password_hash,
        })
        .await
    {
        Ok(author) => {
            info!(
                target = "quillpost::bootstrap",
                author_id = %author.id,
                email = %author.email,
                "Admin user created"
            );
            Ok(BootstrapOutcome::Created(author))
        }
        Err(RepoError::Duplicate { .. }) => {
            info!(
                target = "quillpost::bootstrap",
                email = %email,
                "Admin user already exists"
            );
            Ok(BootstrapOutcome::AlreadyExists { email })
        }
        Err(err) => Err(BootstrapError::Repo(err)),
    }
}
