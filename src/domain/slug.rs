//! Slug validation for post lookups and slug derivation for local fixtures.
//!
//! Route parameters reach us in several broken shapes: empty strings,
//! serialized `undefined`/`null` from client code, or unexpanded route
//! templates such as `[slug]`. All of them are rejected up front so that no
//! lookup is ever issued for a value that cannot name a post.

use std::fmt;

use slug::slugify;
use thiserror::Error;

const PLACEHOLDERS: &[&str] = &["undefined", "null", "[slug]", ":slug", "{slug}"];
const MAX_SLUG_LEN: usize = 200;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug is missing")]
    Missing,
    #[error("slug `{0}` is a placeholder, not a post identifier")]
    Placeholder(String),
    #[error("slug `{0}` is not URL-safe")]
    NotUrlSafe(String),
    #[error("slug exceeds {MAX_SLUG_LEN} characters")]
    TooLong,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
}

/// A slug that passed [`normalize_slug`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slug(String);

impl Slug {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a raw slug taken from a route or caller.
///
/// Surrounding whitespace and slashes are trimmed. The result must consist of
/// URL-unreserved characters only.
pub fn normalize_slug(raw: Option<&str>) -> Result<Slug, SlugError> {
    let raw = raw.ok_or(SlugError::Missing)?;
    let trimmed = raw.trim().trim_matches('/').trim();

    if trimmed.is_empty() {
        return Err(SlugError::Missing);
    }

    if PLACEHOLDERS
        .iter()
        .any(|placeholder| trimmed.eq_ignore_ascii_case(placeholder))
    {
        return Err(SlugError::Placeholder(trimmed.to_string()));
    }

    if trimmed.len() > MAX_SLUG_LEN {
        return Err(SlugError::TooLong);
    }

    if !trimmed.chars().all(is_unreserved) {
        return Err(SlugError::NotUrlSafe(trimmed.to_string()));
    }

    Ok(Slug(trimmed.to_string()))
}

/// Derive a slug from a human-readable title.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::Missing);
    }

    let candidate = slugify(input);
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

fn is_unreserved(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '~')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_kebab_case_slugs() {
        let slug = normalize_slug(Some("understanding-react-hooks")).expect("slug");
        assert_eq!(slug.as_str(), "understanding-react-hooks");
    }

    #[test]
    fn trims_whitespace_and_slashes() {
        let slug = normalize_slug(Some("  /building-scalable-apps/ ")).expect("slug");
        assert_eq!(slug.as_str(), "building-scalable-apps");
    }

    #[test]
    fn rejects_missing_and_empty() {
        assert_eq!(normalize_slug(None), Err(SlugError::Missing));
        assert_eq!(normalize_slug(Some("")), Err(SlugError::Missing));
        assert_eq!(normalize_slug(Some("  / ")), Err(SlugError::Missing));
    }

    #[test]
    fn rejects_placeholders() {
        for raw in ["undefined", "NULL", "[slug]", ":slug"] {
            assert!(
                matches!(normalize_slug(Some(raw)), Err(SlugError::Placeholder(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_unsafe_characters() {
        assert!(matches!(
            normalize_slug(Some("hello world")),
            Err(SlugError::NotUrlSafe(_))
        ));
        assert!(matches!(
            normalize_slug(Some("a/b")),
            Err(SlugError::NotUrlSafe(_))
        ));
    }

    #[test]
    fn rejects_overlong_slugs() {
        let long = "a".repeat(MAX_SLUG_LEN + 1);
        assert_eq!(normalize_slug(Some(&long)), Err(SlugError::TooLong));
    }

    #[test]
    fn derive_slug_from_title() {
        assert_eq!(
            derive_slug("UI Design Principles").expect("slug"),
            "ui-design-principles"
        );
        assert_eq!(derive_slug("   "), Err(SlugError::Missing));
    }
}
