mod read;
mod types;
mod write;

const POST_COLUMNS: &str = "p.id, p.title, p.slug, p.content, p.excerpt, p.published, p.tags, \
     p.featured_image, p.author_id, p.created_at, p.updated_at";

const RETURNING_POST: &str = " RETURNING id, title, slug, content, excerpt, published, tags, \
     featured_image, author_id, created_at, updated_at";
