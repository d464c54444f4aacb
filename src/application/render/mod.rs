//! Markdown to HTML for post bodies.
//!
//! Rendering never fails: CommonMark accepts every input, so malformed markdown
//! degrades to best-effort HTML. Whether raw HTML embedded in a post survives
//! is decided once at construction from `render.allow_raw_html`.

mod config;

use comrak::markdown_to_html;

use crate::config::RenderSettings;

use config::{build_post_sanitizer, markdown_options};

/// Comrak-based renderer with GitHub-flavoured extensions and an optional
/// Ammonia sanitisation pass.
pub struct MarkdownRenderer {
    options: comrak::Options<'static>,
    sanitizer: Option<ammonia::Builder<'static>>,
}

impl MarkdownRenderer {
    /// Untrusted authors: raw HTML omitted, output sanitised.
    pub fn sanitizing() -> Self {
        Self {
            options: markdown_options(false),
            sanitizer: Some(build_post_sanitizer()),
        }
    }

    /// Fully trusted authors: raw HTML passes through verbatim.
    pub fn trusted() -> Self {
        Self {
            options: markdown_options(true),
            sanitizer: None,
        }
    }

    pub fn from_settings(settings: &RenderSettings) -> Self {
        if settings.allow_raw_html {
            Self::trusted()
        } else {
            Self::sanitizing()
        }
    }

    pub fn allows_raw_html(&self) -> bool {
        self.sanitizer.is_none()
    }

    pub fn render(&self, markdown: &str) -> String {
        let html = markdown_to_html(markdown, &self.options);
        match &self.sanitizer {
            Some(sanitizer) => sanitizer.clean(&html).to_string(),
            None => html,
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::sanitizing()
    }
}
