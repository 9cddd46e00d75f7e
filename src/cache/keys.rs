//! Cache key definitions.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::application::query::{PostQuery, ProjectQuery};

/// Identifies one cached query result.
///
/// Listing keys carry the whole validated query, so two callers share an entry
/// exactly when they would send the same backend request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    PostList(PostQuery),
    ProjectList(ProjectQuery),
    PostBySlug(String),
}

impl CacheKey {
    /// Metric label for the entry family.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PostList(_) => "post_list",
            Self::ProjectList(_) => "project_list",
            Self::PostBySlug(_) => "post_by_slug",
        }
    }
}

/// Compute a hash for any hashable value.
pub fn hash_value<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::{PostFilter, ProjectFilter};

    #[test]
    fn equal_queries_share_a_key() {
        let first = CacheKey::PostList(PostQuery::new(&PostFilter::default(), None).expect("q"));
        let second =
            CacheKey::PostList(PostQuery::new(&PostFilter::default(), Some(10)).expect("q"));
        assert_eq!(first, second);
        assert_eq!(hash_value(&first), hash_value(&second));
    }

    #[test]
    fn filter_and_limit_distinguish_keys() {
        let base = PostQuery::new(&PostFilter::default(), None).expect("q");
        let narrower = PostQuery::new(&PostFilter::default().with_category("Design"), None)
            .expect("q");
        let shorter = PostQuery::new(&PostFilter::default(), Some(3)).expect("q");
        assert_ne!(CacheKey::PostList(base.clone()), CacheKey::PostList(narrower));
        assert_ne!(CacheKey::PostList(base), CacheKey::PostList(shorter));
    }

    #[test]
    fn kind_labels() {
        let projects =
            CacheKey::ProjectList(ProjectQuery::new(&ProjectFilter::default(), None).expect("q"));
        assert_eq!(projects.kind(), "project_list");
        assert_eq!(CacheKey::PostBySlug("a".into()).kind(), "post_by_slug");
    }
}
