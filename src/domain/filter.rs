//! Filter descriptors: partial matches combined with AND.
//!
//! Every field is three-state. `None` means the field does not take part in
//! matching, `Some(value)` requires exact equality.

use crate::domain::entities::{BlogPost, Project};

/// A descriptor that can decide whether an entity matches it.
pub trait Matches<T> {
    fn matches(&self, item: &T) -> bool;
}

/// Filter over blog posts.
///
/// The default lists published posts only; use [`PostFilter::any`] to lift the
/// publication gate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostFilter {
    pub published: Option<bool>,
    pub category: Option<String>,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            published: Some(true),
            category: None,
        }
    }
}

impl PostFilter {
    pub fn any() -> Self {
        Self {
            published: None,
            category: None,
        }
    }

    pub fn with_published(mut self, published: bool) -> Self {
        self.published = Some(published);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

impl Matches<BlogPost> for PostFilter {
    fn matches(&self, post: &BlogPost) -> bool {
        self.published.is_none_or(|wanted| post.published == wanted)
            && self
                .category
                .as_deref()
                .is_none_or(|wanted| post.category.as_deref() == Some(wanted))
    }
}

/// Filter over projects. The default matches every project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProjectFilter {
    pub featured: Option<bool>,
    pub category: Option<String>,
}

impl ProjectFilter {
    pub fn featured() -> Self {
        Self {
            featured: Some(true),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

impl Matches<Project> for ProjectFilter {
    fn matches(&self, project: &Project) -> bool {
        self.featured.is_none_or(|wanted| project.featured == wanted)
            && self
                .category
                .as_deref()
                .is_none_or(|wanted| project.category.as_deref() == Some(wanted))
    }
}
