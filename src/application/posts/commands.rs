use tracing::info;
use uuid::Uuid;

use crate::application::auth::Identity;
use crate::application::repos::{CreatePostParams, UpdatePostParams};
use crate::domain::entities::PostRecord;
use crate::domain::posts::{normalize_excerpt, normalize_tags, validate_featured_image};
use crate::domain::slug::derive_slug;
use crate::infra::telemetry::{POSTS_CREATED_TOTAL, POSTS_DELETED_TOTAL, POSTS_UPDATED_TOTAL};

use super::service::PostService;
use super::types::{CreatePostCommand, PostError, UpdatePostCommand};

impl PostService {
    pub async fn create(
        &self,
        author: &Identity,
        command: CreatePostCommand,
    ) -> Result<PostRecord, PostError> {
        let featured_image = validate_featured_image(command.featured_image)?;
        let slug = derive_slug(&command.title);

        let params = CreatePostParams {
            title: command.title,
            slug: slug.clone(),
            content: command.content,
            excerpt: normalize_excerpt(command.excerpt),
            published: command.published.unwrap_or(false),
            tags: command.tags.map(normalize_tags).unwrap_or_default(),
            featured_image,
            author_id: author.author_id,
        };

        let post = self
            .writer
            .create_post(params)
            .await
            .map_err(|err| PostError::from_write(err, Some(&slug)))?;

        metrics::counter!(POSTS_CREATED_TOTAL).increment(1);
        info!(
            target = "quillpost::posts",
            post_id = %post.id,
            slug = %post.slug,
            published = post.published,
            author_id = %author.author_id,
            "post created"
        );

        Ok(post)
    }

    /// Apply the supplied fields. A title re-derives the slug even when the
    /// derived value is unchanged.
    pub async fn update(
        &self,
        author: &Identity,
        id: Uuid,
        command: UpdatePostCommand,
    ) -> Result<PostRecord, PostError> {
        let featured_image = match command.featured_image {
            Some(value) => Some(validate_featured_image(value)?),
            None => None,
        };
        let slug = command.title.as_deref().map(derive_slug);

        let params = UpdatePostParams {
            id,
            title: command.title,
            slug: slug.clone(),
            content: command.content,
            excerpt: command.excerpt.map(normalize_excerpt),
            published: command.published,
            tags: command.tags.map(normalize_tags),
            featured_image,
        };

        let post = self
            .writer
            .update_post(params)
            .await
            .map_err(|err| PostError::from_write(err, slug.as_deref()))?;

        metrics::counter!(POSTS_UPDATED_TOTAL).increment(1);
        info!(
            target = "quillpost::posts",
            post_id = %post.id,
            slug = %post.slug,
            published = post.published,
            author_id = %author.author_id,
            "post updated"
        );

        Ok(post)
    }

    pub async fn delete(&self, author: &Identity, id: Uuid) -> Result<(), PostError> {
        self.writer
            .delete_post(id)
            .await
            .map_err(|err| PostError::from_write(err, None))?;

        metrics::counter!(POSTS_DELETED_TOTAL).increment(1);
        info!(
            target = "quillpost::posts",
            post_id = %id,
            author_id = %author.author_id,
            "post deleted"
        );

        Ok(())
    }
}
