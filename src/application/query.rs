//! Query builder: typed filters to canonical backend parameters.
//!
//! A query renders two ways. Provider parameters target the content delivery
//! API directly (`fields.*` names, `content_type`, `order`). Proxy parameters
//! target this service's own `/api/content/*` routes.

use std::num::NonZeroU32;

use crate::application::error::ContentError;
use crate::domain::filter::{PostFilter, ProjectFilter};
use crate::domain::listing::{PostSortField, ProjectSortField, SortDirection, SortKey};
use crate::domain::slug::Slug;

pub const DEFAULT_POST_LIMIT: u32 = 10;
/// Largest page the content delivery API serves in one response.
pub const MAX_LIMIT: u32 = 1000;

/// Ordered key/value parameters, in the order they were added.
pub type QueryParams = Vec<(String, String)>;

/// A validated positive result limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Limit(NonZeroU32);

impl Limit {
    pub fn new(raw: i64) -> Result<Self, ContentError> {
        if raw <= 0 {
            return Err(ContentError::validation(format!(
                "limit must be a positive integer, got {raw}"
            )));
        }
        let value = u32::try_from(raw)
            .ok()
            .filter(|value| *value <= MAX_LIMIT)
            .ok_or_else(|| {
                ContentError::validation(format!("limit must not exceed {MAX_LIMIT}, got {raw}"))
            })?;
        NonZeroU32::new(value)
            .map(Self)
            .ok_or_else(|| ContentError::validation("limit must be a positive integer"))
    }

    /// Parse a limit from its textual query-string form.
    pub fn parse(raw: &str) -> Result<Self, ContentError> {
        let value: i64 = raw.trim().parse().map_err(|_| {
            ContentError::validation(format!("limit must be a positive integer, got `{raw}`"))
        })?;
        Self::new(value)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn as_usize(self) -> usize {
        self.0.get() as usize
    }
}

/// Blog post listing query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostQuery {
    pub filter: PostFilter,
    pub limit: Limit,
    pub order: SortKey<PostSortField>,
}

impl PostQuery {
    /// Build a listing query. A missing limit falls back to
    /// [`DEFAULT_POST_LIMIT`].
    pub fn new(filter: &PostFilter, limit: Option<i64>) -> Result<Self, ContentError> {
        let limit = match limit {
            Some(raw) => Limit::new(raw)?,
            None => Limit::new(i64::from(DEFAULT_POST_LIMIT))?,
        };
        Ok(Self {
            filter: filter.clone(),
            limit,
            order: Self::default_order(),
        })
    }

    /// Newest first.
    pub fn default_order() -> SortKey<PostSortField> {
        SortKey::descending(PostSortField::PublishedDate)
    }

    pub fn with_order(mut self, order: SortKey<PostSortField>) -> Self {
        self.order = order;
        self
    }

    pub fn provider_params(&self, content_type: &str) -> QueryParams {
        let mut params = QueryParams::new();
        push(&mut params, "content_type", content_type);
        push(&mut params, "order", provider_order(&self.order));
        push(&mut params, "limit", self.limit.get());
        if let Some(published) = self.filter.published {
            push(&mut params, "fields.published", published);
        }
        if let Some(category) = self.filter.category.as_deref() {
            push(&mut params, "fields.category", category);
        }
        params
    }

    pub fn proxy_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        push(&mut params, "limit", self.limit.get());
        if let Some(published) = self.filter.published {
            push(&mut params, "published", published);
        }
        if let Some(category) = self.filter.category.as_deref() {
            push(&mut params, "category", category);
        }
        if self.order != Self::default_order() {
            push(&mut params, "order", &self.order);
        }
        params
    }
}

/// Project listing query. Projects have no default limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectQuery {
    pub filter: ProjectFilter,
    pub limit: Option<Limit>,
    pub order: SortKey<ProjectSortField>,
}

impl ProjectQuery {
    pub fn new(filter: &ProjectFilter, limit: Option<i64>) -> Result<Self, ContentError> {
        Ok(Self {
            filter: filter.clone(),
            limit: limit.map(Limit::new).transpose()?,
            order: Self::default_order(),
        })
    }

    /// Most recently completed first.
    pub fn default_order() -> SortKey<ProjectSortField> {
        SortKey::descending(ProjectSortField::CompletionDate)
    }

    pub fn with_order(mut self, order: SortKey<ProjectSortField>) -> Self {
        self.order = order;
        self
    }

    pub fn provider_params(&self, content_type: &str) -> QueryParams {
        let mut params = QueryParams::new();
        push(&mut params, "content_type", content_type);
        push(&mut params, "order", provider_order(&self.order));
        if let Some(limit) = self.limit {
            push(&mut params, "limit", limit.get());
        }
        if let Some(featured) = self.filter.featured {
            push(&mut params, "fields.featured", featured);
        }
        if let Some(category) = self.filter.category.as_deref() {
            push(&mut params, "fields.category", category);
        }
        params
    }

    pub fn proxy_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(limit) = self.limit {
            push(&mut params, "limit", limit.get());
        }
        if let Some(featured) = self.filter.featured {
            push(&mut params, "featured", featured);
        }
        if let Some(category) = self.filter.category.as_deref() {
            push(&mut params, "category", category);
        }
        if self.order != Self::default_order() {
            push(&mut params, "order", &self.order);
        }
        params
    }
}

/// Point lookup of a post by slug.
pub fn slug_lookup_params(content_type: &str, slug: &Slug) -> QueryParams {
    let mut params = QueryParams::new();
    push(&mut params, "content_type", content_type);
    push(&mut params, "fields.slug", slug.as_str());
    push(&mut params, "limit", 1);
    params
}

fn push(params: &mut QueryParams, key: &str, value: impl ToString) {
    params.push((key.to_string(), value.to_string()));
}

fn provider_order<F: std::fmt::Display>(key: &SortKey<F>) -> String {
    let marker = match key.direction {
        SortDirection::Ascending => "",
        SortDirection::Descending => "-",
    };
    format!("{marker}fields.{}", key.field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::slug::normalize_slug;

    fn pairs(params: &QueryParams) -> Vec<(&str, &str)> {
        params
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect()
    }

    #[test]
    fn post_query_defaults_to_published_and_ten() {
        let query = PostQuery::new(&PostFilter::default(), None).expect("query");
        assert_eq!(
            pairs(&query.provider_params("personalBlog")),
            [
                ("content_type", "personalBlog"),
                ("order", "-fields.publishedDate"),
                ("limit", "10"),
                ("fields.published", "true"),
            ]
        );
    }

    #[test]
    fn absent_keys_are_omitted_and_false_is_sent() {
        let query = PostQuery::new(&PostFilter::any().with_published(false), Some(3))
            .expect("query");
        assert_eq!(
            pairs(&query.proxy_params()),
            [("limit", "3"), ("published", "false")]
        );

        let query = PostQuery::new(&PostFilter::any(), Some(3)).expect("query");
        assert_eq!(pairs(&query.proxy_params()), [("limit", "3")]);
    }

    #[test]
    fn project_query_orders_by_completion_date() {
        let filter = ProjectFilter::featured().with_category("SaaS");
        let query = ProjectQuery::new(&filter, Some(6)).expect("query");
        assert_eq!(
            pairs(&query.provider_params("personalProjects")),
            [
                ("content_type", "personalProjects"),
                ("order", "-fields.completionDate"),
                ("limit", "6"),
                ("fields.featured", "true"),
                ("fields.category", "SaaS"),
            ]
        );
    }

    #[test]
    fn custom_order_is_forwarded_to_the_proxy() {
        let order: SortKey<PostSortField> = "title".parse().expect("sort key");
        let query = PostQuery::new(&PostFilter::default(), Some(2))
            .expect("query")
            .with_order(order);
        assert_eq!(
            pairs(&query.proxy_params()),
            [("limit", "2"), ("published", "true"), ("order", "title")]
        );
        assert_eq!(
            pairs(&query.provider_params("personalBlog"))[1],
            ("order", "fields.title")
        );
    }

    #[test]
    fn project_query_without_limit_sends_none() {
        let query = ProjectQuery::new(&ProjectFilter::default(), None).expect("query");
        assert!(query.proxy_params().is_empty());
    }

    #[test]
    fn non_positive_limits_are_rejected() {
        for raw in [0, -1, i64::from(MAX_LIMIT) + 1] {
            assert!(matches!(
                PostQuery::new(&PostFilter::default(), Some(raw)),
                Err(ContentError::Validation(_))
            ));
        }
        assert!(matches!(
            ProjectQuery::new(&ProjectFilter::default(), Some(0)),
            Err(ContentError::Validation(_))
        ));
    }

    #[test]
    fn limit_parse_rejects_text() {
        assert!(Limit::parse("abc").is_err());
        assert!(Limit::parse("2.5").is_err());
        assert_eq!(Limit::parse(" 6 ").expect("limit").get(), 6);
    }

    #[test]
    fn slug_lookup_requests_a_single_entry() {
        let slug = normalize_slug(Some("ui-design-principles")).expect("slug");
        assert_eq!(
            pairs(&slug_lookup_params("personalBlog", &slug)),
            [
                ("content_type", "personalBlog"),
                ("fields.slug", "ui-design-principles"),
                ("limit", "1"),
            ]
        );
    }
}
