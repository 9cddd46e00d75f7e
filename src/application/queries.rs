//! Cached query hooks over the fetch services.
//!
//! Each hook resolves through a [`QueryCache`], so concurrent callers share
//! one in-flight request per key and repeated calls inside the freshness
//! window never reach the backend.
//!
//! The `peek_*` variants are for embedding callers that render from whatever
//! is already cached (a prefetching page shell, for instance); the HTTP layer
//! always goes through the loading hooks.

use std::sync::Arc;

use crate::application::content::{ContentSource, PostService, ProjectService};
use crate::application::error::ContentError;
use crate::application::query::{MAX_LIMIT, PostQuery, ProjectQuery};
use crate::cache::{CacheConfig, CacheKey, QueryCache, QueryState};
use crate::domain::browse;
use crate::domain::entities::{BlogPost, Project};
use crate::domain::filter::{PostFilter, ProjectFilter};
use crate::domain::slug::{Slug, normalize_slug};

#[derive(Clone)]
pub struct ContentQueries {
    posts: PostService,
    projects: ProjectService,
    post_lists: QueryCache<Vec<BlogPost>>,
    post_lookups: QueryCache<Option<BlogPost>>,
    project_lists: QueryCache<Vec<Project>>,
    config: CacheConfig,
}

impl ContentQueries {
    pub fn new(source: Arc<dyn ContentSource>, config: CacheConfig) -> Self {
        Self {
            posts: PostService::new(Arc::clone(&source)),
            projects: ProjectService::new(source),
            post_lists: QueryCache::new(config.clone()),
            post_lookups: QueryCache::new(config.clone()),
            project_lists: QueryCache::new(config.clone()),
            config,
        }
    }

    pub fn post_service(&self) -> &PostService {
        &self.posts
    }

    pub fn project_service(&self) -> &ProjectService {
        &self.projects
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub async fn posts(&self, filter: &PostFilter, limit: Option<i64>) -> QueryState<Vec<BlogPost>> {
        match PostQuery::new(filter, limit) {
            Ok(query) => self.posts_query(query).await,
            Err(error) => QueryState::failed(error, None),
        }
    }

    pub async fn posts_query(&self, query: PostQuery) -> QueryState<Vec<BlogPost>> {
        let service = self.posts.clone();
        let key = CacheKey::PostList(query.clone());
        self.post_lists
            .load(key, self.config.list_ttl, move || async move {
                service.list_query(&query).await
            })
            .await
    }

    /// Single post by slug. `None` or a blank slug is skipped without a fetch.
    pub async fn post_by_slug(&self, slug: Option<&str>) -> QueryState<BlogPost> {
        let slug = match lookup_slug(slug) {
            Ok(Some(slug)) => slug,
            Ok(None) => return QueryState::idle(),
            Err(error) => return QueryState::failed(error, None),
        };
        let key = CacheKey::PostBySlug(slug.as_str().to_string());
        let service = self.posts.clone();
        self.post_lookups
            .load(key, self.config.post_ttl, move || async move {
                service.find(&slug).await
            })
            .await
            .flatten()
    }

    pub async fn projects(
        &self,
        filter: &ProjectFilter,
        limit: Option<i64>,
    ) -> QueryState<Vec<Project>> {
        match ProjectQuery::new(filter, limit) {
            Ok(query) => self.projects_query(query).await,
            Err(error) => QueryState::failed(error, None),
        }
    }

    pub async fn projects_query(&self, query: ProjectQuery) -> QueryState<Vec<Project>> {
        let service = self.projects.clone();
        let key = CacheKey::ProjectList(query.clone());
        self.project_lists
            .load(key, self.config.list_ttl, move || async move {
                service.list_query(&query).await
            })
            .await
    }

    /// Distinct categories across published posts, newest post first.
    pub async fn post_categories(&self) -> QueryState<Vec<String>> {
        self.posts(&PostFilter::default(), Some(i64::from(MAX_LIMIT)))
            .await
            .map(|posts| browse::categories(&posts))
    }

    pub async fn project_categories(&self) -> QueryState<Vec<String>> {
        self.projects(&ProjectFilter::default(), None)
            .await
            .map(|projects| browse::categories(&projects))
    }

    pub fn peek_posts(&self, filter: &PostFilter, limit: Option<i64>) -> QueryState<Vec<BlogPost>> {
        match PostQuery::new(filter, limit) {
            Ok(query) => self.post_lists.peek(&CacheKey::PostList(query)),
            Err(error) => QueryState::failed(error, None),
        }
    }

    pub fn peek_post_by_slug(&self, slug: Option<&str>) -> QueryState<BlogPost> {
        match lookup_slug(slug) {
            Ok(Some(slug)) => self
                .post_lookups
                .peek(&CacheKey::PostBySlug(slug.into_inner()))
                .flatten(),
            Ok(None) => QueryState::idle(),
            Err(error) => QueryState::failed(error, None),
        }
    }

    pub fn peek_projects(
        &self,
        filter: &ProjectFilter,
        limit: Option<i64>,
    ) -> QueryState<Vec<Project>> {
        match ProjectQuery::new(filter, limit) {
            Ok(query) => self.project_lists.peek(&CacheKey::ProjectList(query)),
            Err(error) => QueryState::failed(error, None),
        }
    }
}

fn lookup_slug(slug: Option<&str>) -> Result<Option<Slug>, ContentError> {
    match slug.filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => Ok(Some(normalize_slug(Some(raw))?)),
        None => Ok(None),
    }
}
