//! Field rules applied to post input before it reaches storage.

use url::Url;

use crate::domain::error::DomainError;

/// Trim each tag and drop the empty ones, keeping the submitted order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .filter_map(|tag| {
            let trimmed = tag.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect()
}

/// Blank excerpts are stored as absent.
pub fn normalize_excerpt(excerpt: Option<String>) -> Option<String> {
    excerpt.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Accept an absolute `http(s)` URL or a root-relative path; blank clears the image.
pub fn validate_featured_image(value: Option<String>) -> Result<Option<String>, DomainError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.starts_with('/') && !trimmed.starts_with("//") {
        return Ok(Some(trimmed.to_string()));
    }

    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(Some(trimmed.to_string()))
        }
        Ok(url) => Err(DomainError::validation(format!(
            "featuredImage must use http or https, got `{}`",
            url.scheme()
        ))),
        Err(err) => Err(DomainError::validation(format!(
            "featuredImage is not a valid URL: {err}"
        ))),
    }
}
