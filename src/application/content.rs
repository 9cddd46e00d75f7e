//! Fetch functions for posts and projects.
//!
//! Services validate their input, then make exactly one call to the configured
//! [`ContentSource`]. Nothing is retried here.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use tracing::{debug, warn};

use crate::application::error::ContentError;
use crate::application::query::{PostQuery, ProjectQuery};
use crate::domain::entities::{BlogPost, EntityKind, Project};
use crate::domain::filter::{PostFilter, ProjectFilter};
use crate::domain::slug::{Slug, normalize_slug};

pub(crate) const METRIC_CONTENT_FETCH: &str = "folio_content_fetch_total";
pub(crate) const METRIC_CONTENT_FETCH_FAILED: &str = "folio_content_fetch_failed_total";

/// A backend that can answer content queries.
///
/// A slug lookup that matches nothing returns `Ok(None)`.
#[async_trait]
pub trait ContentSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<BlogPost>, ContentError>;

    async fn find_post_by_slug(&self, slug: &Slug) -> Result<Option<BlogPost>, ContentError>;

    async fn list_projects(&self, query: &ProjectQuery) -> Result<Vec<Project>, ContentError>;
}

#[derive(Clone)]
pub struct PostService {
    source: Arc<dyn ContentSource>,
}

impl PostService {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    pub async fn list(
        &self,
        filter: &PostFilter,
        limit: Option<i64>,
    ) -> Result<Vec<BlogPost>, ContentError> {
        let query = PostQuery::new(filter, limit)?;
        self.list_query(&query).await
    }

    pub async fn list_query(&self, query: &PostQuery) -> Result<Vec<BlogPost>, ContentError> {
        observe(
            self.source.name(),
            EntityKind::Posts,
            self.source.list_posts(query),
        )
        .await
    }

    /// Look up one post. The slug is validated before any backend call.
    pub async fn get_by_slug(&self, raw: Option<&str>) -> Result<Option<BlogPost>, ContentError> {
        let slug = normalize_slug(raw)?;
        self.find(&slug).await
    }

    pub async fn find(&self, slug: &Slug) -> Result<Option<BlogPost>, ContentError> {
        let found = observe(
            self.source.name(),
            EntityKind::Posts,
            self.source.find_post_by_slug(slug),
        )
        .await?;
        if found.is_none() {
            debug!(slug = %slug, source = self.source.name(), "post not found");
        }
        Ok(found)
    }
}

#[derive(Clone)]
pub struct ProjectService {
    source: Arc<dyn ContentSource>,
}

impl ProjectService {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    pub async fn list(
        &self,
        filter: &ProjectFilter,
        limit: Option<i64>,
    ) -> Result<Vec<Project>, ContentError> {
        let query = ProjectQuery::new(filter, limit)?;
        self.list_query(&query).await
    }

    pub async fn list_query(&self, query: &ProjectQuery) -> Result<Vec<Project>, ContentError> {
        observe(
            self.source.name(),
            EntityKind::Projects,
            self.source.list_projects(query),
        )
        .await
    }
}

async fn observe<T>(
    source: &'static str,
    kind: EntityKind,
    call: impl Future<Output = Result<T, ContentError>>,
) -> Result<T, ContentError> {
    counter!(METRIC_CONTENT_FETCH, "source" => source, "kind" => kind.as_str()).increment(1);
    let result = call.await;
    if let Err(error) = &result {
        counter!(METRIC_CONTENT_FETCH_FAILED, "source" => source, "kind" => kind.as_str())
            .increment(1);
        warn!(source, kind = kind.as_str(), error = %error, "content fetch failed");
    }
    result
}
