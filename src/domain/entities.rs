//! Content entities. The wire types double as domain records since this
//! service never mutates content.

use std::fmt;

pub use folio_api_types::{AssetRef, BlogPost, PostContent, Project};

/// Kind of entity a list query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Posts,
    Projects,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Posts => "posts",
            EntityKind::Projects => "projects",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities that carry an optional category label.
pub trait Categorized {
    fn category(&self) -> Option<&str>;
}

impl Categorized for BlogPost {
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

impl Categorized for Project {
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}
