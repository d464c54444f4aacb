use std::sync::Arc;

use crate::application::render::MarkdownRenderer;
use crate::application::repos::{PostsRepo, PostsWriteRepo};

#[derive(Clone)]
pub struct PostService {
    pub(crate) reader: Arc<dyn PostsRepo>,
    pub(crate) writer: Arc<dyn PostsWriteRepo>,
    pub(crate) renderer: Arc<MarkdownRenderer>,
}

impl PostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        renderer: Arc<MarkdownRenderer>,
    ) -> Self {
        Self {
            reader,
            writer,
            renderer,
        }
    }
}
