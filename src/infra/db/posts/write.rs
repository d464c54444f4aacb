use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreatePostParams, PostsWriteRepo, RepoError, UpdatePostParams};
use crate::domain::entities::PostRecord;
use crate::infra::db::{PostgresRepositories, map_sqlx_error};

use super::RETURNING_POST;
use super::types::PostRow;

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let CreatePostParams {
            title,
            slug,
            content,
            excerpt,
            published,
            tags,
            featured_image,
            author_id,
        } = params;

        let now = OffsetDateTime::now_utc();
        let sql = format!(
            "INSERT INTO posts (id, title, slug, content, excerpt, published, tags, \
             featured_image, author_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10){RETURNING_POST}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(title)
            .bind(slug)
            .bind(content)
            .bind(excerpt)
            .bind(published)
            .bind(tags)
            .bind(featured_image)
            .bind(author_id)
            .bind(now)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let UpdatePostParams {
            id,
            title,
            slug,
            content,
            excerpt,
            published,
            tags,
            featured_image,
        } = params;

        let mut qb = QueryBuilder::new("UPDATE posts SET updated_at = ");
        qb.push_bind(OffsetDateTime::now_utc());
        if let Some(title) = title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(slug) = slug {
            qb.push(", slug = ").push_bind(slug);
        }
        if let Some(content) = content {
            qb.push(", content = ").push_bind(content);
        }
        if let Some(excerpt) = excerpt {
            qb.push(", excerpt = ").push_bind(excerpt);
        }
        if let Some(published) = published {
            qb.push(", published = ").push_bind(published);
        }
        if let Some(tags) = tags {
            qb.push(", tags = ").push_bind(tags);
        }
        if let Some(featured_image) = featured_image {
            qb.push(", featured_image = ").push_bind(featured_image);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(RETURNING_POST);

        let row = qb
            .build_query_as::<PostRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)?;

        Ok(PostRecord::from(row))
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
