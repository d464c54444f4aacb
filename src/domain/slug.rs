//! Deterministic slug derivation for post titles.
//!
//! A slug is the lower-cased title with every run of characters outside
//! `[a-z0-9]` collapsed into one hyphen, and hyphens trimmed from both ends.
//! Non-ASCII letters count as separators; nothing is transliterated, so the
//! mapping from title to slug never depends on locale tables.
//!
//! The function is total. A title without any ASCII alphanumerics maps to the
//! empty string, which is stored as-is; the unique index on `posts.slug`
//! decides whether another such post may exist.

/// Derive the URL slug for `title`.
pub fn derive_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        } else {
            pending_separator = true;
        }
    }

    slug
}
