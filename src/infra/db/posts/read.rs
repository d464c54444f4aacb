use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::application::repos::{PostListFilter, PostsRepo, RepoError};
use crate::domain::entities::PostWithAuthor;
use crate::infra::db::{PostgresRepositories, map_sqlx_error};

use super::POST_COLUMNS;
use super::types::PostWithAuthorRow;

fn select_with_author<'q>() -> QueryBuilder<'q, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(POST_COLUMNS);
    qb.push(
        ", a.name AS author_name, a.email AS author_email \
         FROM posts p INNER JOIN authors a ON a.id = p.author_id WHERE 1=1",
    );
    qb
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_posts(&self, filter: PostListFilter) -> Result<Vec<PostWithAuthor>, RepoError> {
        let mut qb = select_with_author();
        if filter.published_only {
            qb.push(" AND p.published");
        }
        qb.push(" ORDER BY p.created_at DESC, p.id DESC");

        let rows = qb
            .build_query_as::<PostWithAuthorRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostWithAuthor::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        let mut qb = select_with_author();
        qb.push(" AND p.id = ");
        qb.push_bind(id);

        let row = qb
            .build_query_as::<PostWithAuthorRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostWithAuthor::from))
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        published_only: bool,
    ) -> Result<Option<PostWithAuthor>, RepoError> {
        let mut qb = select_with_author();
        qb.push(" AND p.slug = ");
        qb.push_bind(slug);
        if published_only {
            qb.push(" AND p.published");
        }

        let row = qb
            .build_query_as::<PostWithAuthorRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostWithAuthor::from))
    }
}
