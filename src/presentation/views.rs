use crate::application::error::{ErrorReport, HttpError};
use crate::application::posts::RenderedPost;
use crate::domain::entities::PostWithAuthor;
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response() -> Response {
    let mut response = render_template_response(NotFoundTemplate, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct PostCard {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub author_name: String,
    pub age: String,
    pub iso_date: String,
    pub tags: Vec<String>,
}

impl PostCard {
    pub fn from_post(post: &PostWithAuthor, now: OffsetDateTime) -> Self {
        let record = &post.post;
        Self {
            slug: record.slug.clone(),
            title: record.title.clone(),
            excerpt: record.excerpt.clone(),
            author_name: post.author.name.clone(),
            age: humanize_age(record.created_at, now),
            iso_date: iso_date(record.created_at),
            tags: record.tags.clone(),
        }
    }
}

pub struct PostDetailView {
    pub title: String,
    pub author_name: String,
    pub age: String,
    pub iso_date: String,
    pub tags: Vec<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    /// Already sanitised by the markdown renderer.
    pub content_html: String,
}

impl PostDetailView {
    pub fn from_rendered(rendered: RenderedPost, now: OffsetDateTime) -> Self {
        let RenderedPost { post, content_html } = rendered;
        let PostWithAuthor { post, author } = post;
        Self {
            age: humanize_age(post.created_at, now),
            iso_date: iso_date(post.created_at),
            title: post.title,
            author_name: author.name,
            tags: post.tags,
            excerpt: post.excerpt,
            featured_image: post.featured_image,
            content_html,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub posts: Vec<PostCard>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub post: PostDetailView,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate;

fn iso_date(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_default()
}

/// Approximate distance from `then` to `now`, e.g. "3 days ago".
///
/// Buckets follow the familiar "about 2 hours" / "over 1 year" phrasing.
/// Timestamps in the future read as "less than a minute ago".
pub fn humanize_age(then: OffsetDateTime, now: OffsetDateTime) -> String {
    let seconds = (now - then).whole_seconds().max(0);
    let minutes = (seconds + 30) / 60;

    let distance = if seconds < 30 {
        "less than a minute".to_string()
    } else if minutes < 45 {
        plural(minutes, "minute")
    } else if minutes < 90 {
        "about 1 hour".to_string()
    } else if minutes < MINUTES_PER_DAY {
        format!("about {}", plural(round_div(minutes, 60), "hour"))
    } else if minutes < 2520 {
        "1 day".to_string()
    } else if minutes < MINUTES_PER_MONTH {
        plural(round_div(minutes, MINUTES_PER_DAY), "day")
    } else if minutes < 2 * MINUTES_PER_MONTH {
        format!("about {}", plural(round_div(minutes, MINUTES_PER_MONTH), "month"))
    } else {
        let months = minutes / MINUTES_PER_MONTH;
        if months < 12 {
            plural(months, "month")
        } else {
            let years = months / 12;
            match months % 12 {
                0..3 => format!("about {}", plural(years, "year")),
                3..9 => format!("over {}", plural(years, "year")),
                _ => format!("almost {}", plural(years + 1, "year")),
            }
        }
    };

    format!("{distance} ago")
}

const MINUTES_PER_DAY: i64 = 1440;
const MINUTES_PER_MONTH: i64 = 43_200;

fn round_div(value: i64, divisor: i64) -> i64 {
    (value + divisor / 2) / divisor
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}
