use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{AuthorSummary, PostRecord, PostWithAuthor};

#[derive(sqlx::FromRow)]
pub(crate) struct PostRow {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) published: bool,
    pub(crate) tags: Vec<String>,
    pub(crate) featured_image: Option<String>,
    pub(crate) author_id: Uuid,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) updated_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            content: row.content,
            excerpt: row.excerpt,
            published: row.published,
            tags: row.tags,
            featured_image: row.featured_image,
            author_id: row.author_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PostWithAuthorRow {
    #[sqlx(flatten)]
    pub(crate) post: PostRow,
    pub(crate) author_name: String,
    pub(crate) author_email: String,
}

impl From<PostWithAuthorRow> for PostWithAuthor {
    fn from(row: PostWithAuthorRow) -> Self {
        Self {
            post: PostRecord::from(row.post),
            author: AuthorSummary {
                name: row.author_name,
                email: row.author_email,
            },
        }
    }
}
