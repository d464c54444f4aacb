use uuid::Uuid;

use crate::application::repos::PostListFilter;
use crate::domain::entities::PostWithAuthor;

use super::service::PostService;
use super::types::{PostError, ReadAccess, RenderedPost};

impl PostService {
    /// Newest first. `published_only` narrows further; it can never widen
    /// what `access` allows.
    pub async fn list(
        &self,
        access: ReadAccess,
        published_only: bool,
    ) -> Result<Vec<PostWithAuthor>, PostError> {
        let filter = PostListFilter {
            published_only: published_only || access == ReadAccess::PublishedOnly,
        };
        Ok(self.reader.list_posts(filter).await?)
    }

    pub async fn get(&self, id: Uuid, access: ReadAccess) -> Result<PostWithAuthor, PostError> {
        let post = self.reader.find_by_id(id).await?.ok_or(PostError::NotFound)?;
        if access == ReadAccess::PublishedOnly && !post.post.published {
            return Err(PostError::NotFound);
        }
        Ok(post)
    }

    pub async fn get_by_slug(
        &self,
        slug: &str,
        published_only: bool,
    ) -> Result<PostWithAuthor, PostError> {
        self.reader
            .find_by_slug(slug, published_only)
            .await?
            .ok_or(PostError::NotFound)
    }

    /// Fetch a published post by slug and render its markdown body.
    pub async fn render_for_display(&self, slug: &str) -> Result<RenderedPost, PostError> {
        let post = self.get_by_slug(slug, true).await?;
        let content_html = self.renderer.render(&post.post.content);
        Ok(RenderedPost { post, content_html })
    }
}
