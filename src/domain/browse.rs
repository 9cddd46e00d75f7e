//! Browsing helpers applied to already-fetched lists: category chips and
//! free-text search.

use std::collections::HashSet;

use crate::domain::entities::{BlogPost, Categorized};

/// Category chosen in a browse view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategorySelection {
    #[default]
    All,
    Named(String),
}

impl CategorySelection {
    /// `"All"` (any case) and blank input select everything.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::All,
            Some(value) if value.eq_ignore_ascii_case("all") => Self::All,
            Some(value) => Self::Named(value.to_string()),
        }
    }

    pub fn admits<T: Categorized>(&self, item: &T) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => item.category() == Some(name.as_str()),
        }
    }
}

/// Distinct, non-empty categories in first-seen order.
pub fn categories<T: Categorized>(items: &[T]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(Categorized::category)
        .filter(|category| !category.trim().is_empty())
        .filter(|category| seen.insert(*category))
        .map(str::to_string)
        .collect()
}

/// Case-insensitive substring match on title or excerpt.
pub fn matches_search(post: &BlogPost, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    post.title.to_lowercase().contains(&needle) || post.excerpt.to_lowercase().contains(&needle)
}

/// Apply search and category selection, preserving input order.
pub fn browse_posts(
    posts: &[BlogPost],
    term: &str,
    selection: &CategorySelection,
) -> Vec<BlogPost> {
    posts
        .iter()
        .filter(|post| matches_search(post, term) && selection.admits(*post))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::content::memory::{demo_posts, demo_projects};

    #[test]
    fn categories_are_distinct_in_first_seen_order() {
        let mut projects = demo_projects();
        projects.push(projects[0].clone());
        let found = categories(&projects);
        assert_eq!(
            found,
            ["E-commerce", "Mobile App", "SaaS", "Web Application"]
        );
    }

    #[test]
    fn search_matches_title_or_excerpt_ignoring_case() {
        let posts = demo_posts();
        let hits = browse_posts(&posts, "SCALABLE", &CategorySelection::All);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug, "building-scalable-apps");

        let hits = browse_posts(&posts, "best practices", &CategorySelection::All);
        assert_eq!(hits[0].slug, "understanding-react-hooks");
    }

    #[test]
    fn blank_search_and_all_category_keep_everything() {
        let posts = demo_posts();
        assert_eq!(
            browse_posts(&posts, "  ", &CategorySelection::parse(Some("All"))).len(),
            posts.len()
        );
    }

    #[test]
    fn named_category_narrows_results() {
        let posts = demo_posts();
        let selection = CategorySelection::parse(Some("Design"));
        let hits = browse_posts(&posts, "", &selection);
        assert!(hits.iter().all(|post| post.category.as_deref() == Some("Design")));
        assert!(!hits.is_empty());
    }
}
