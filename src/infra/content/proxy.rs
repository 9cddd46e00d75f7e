//! Content source that goes through another folio instance's
//! `/api/content/*` routes.
//!
//! The proxy routes list published posts unless told otherwise, so a post
//! query without a publication constraint behaves like `published = true`.

use std::time::Duration;

use async_trait::async_trait;
use folio_api_types::ApiErrorBody;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::application::content::ContentSource;
use crate::application::error::ContentError;
use crate::application::query::{PostQuery, ProjectQuery, QueryParams};
use crate::domain::entities::{BlogPost, Project};
use crate::domain::slug::Slug;
use crate::infra::contentful::{transport_error, user_agent};

#[derive(Debug, Clone)]
pub struct ProxySource {
    http: Client,
    base: Url,
}

impl ProxySource {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, ContentError> {
        if base.cannot_be_a_base() {
            return Err(ContentError::config(format!(
                "content.proxy_url `{base}` cannot be a base URL"
            )));
        }
        let http = Client::builder()
            .user_agent(user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| ContentError::config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { http, base })
    }

    fn url(&self, segments: &[&str], params: &QueryParams) -> Result<Url, ContentError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ContentError::config("content.proxy_url cannot be a base URL"))?
            .pop_if_empty()
            .extend(["api", "content"])
            .extend(segments);
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, ContentError> {
        let response = self.http.get(url).send().await.map_err(transport_error)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let bytes = response.bytes().await.map_err(transport_error)?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(ContentError::fetch(Some(status.as_u16()), message));
        }
        serde_json::from_slice(&bytes).map_err(|err| {
            ContentError::fetch(
                Some(status.as_u16()),
                format!("failed to parse response body: {err}"),
            )
        })
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, ContentError> {
        self.get::<Vec<T>>(url).await?.ok_or_else(|| {
            ContentError::fetch(Some(StatusCode::NOT_FOUND.as_u16()), "listing route missing")
        })
    }
}

#[async_trait]
impl ContentSource for ProxySource {
    fn name(&self) -> &'static str {
        "proxy"
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<BlogPost>, ContentError> {
        let url = self.url(&["posts"], &query.proxy_params())?;
        self.get_list(url).await
    }

    async fn find_post_by_slug(&self, slug: &Slug) -> Result<Option<BlogPost>, ContentError> {
        let url = self.url(&["posts", slug.as_str()], &QueryParams::new())?;
        // A 404 answers `null`; both decode to `None`.
        Ok(self.get::<Option<BlogPost>>(url).await?.flatten())
    }

    async fn list_projects(&self, query: &ProjectQuery) -> Result<Vec<Project>, ContentError> {
        let url = self.url(&["projects"], &query.proxy_params())?;
        self.get_list(url).await
    }
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;

    use super::*;
    use crate::domain::filter::{PostFilter, ProjectFilter};
    use crate::domain::slug::normalize_slug;

    fn source(server: &MockServer) -> ProxySource {
        ProxySource::new(
            Url::parse(&server.base_url()).expect("url"),
            Duration::from_secs(5),
        )
        .expect("proxy")
    }

    #[tokio::test]
    async fn listing_uses_proxy_parameter_names() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/api/content/posts")
                    .query_param("limit", "3")
                    .query_param("published", "true")
                    .query_param("category", "Design");
                then.status(200)
                    .header("content-type", "application/json")
                    .body("[]");
            })
            .await;

        let query =
            PostQuery::new(&PostFilter::default().with_category("Design"), Some(3)).expect("query");
        let posts = source(&server).list_posts(&query).await.expect("posts");

        mock.assert_async().await;
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn not_found_slug_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/api/content/posts/gone");
                then.status(404)
                    .header("content-type", "application/json")
                    .body("null");
            })
            .await;

        let slug = normalize_slug(Some("gone")).expect("slug");
        assert_eq!(source(&server).find_post_by_slug(&slug).await, Ok(None));
    }

    #[tokio::test]
    async fn gateway_errors_surface_the_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/api/content/projects");
                then.status(502)
                    .header("content-type", "application/json")
                    .body(r#"{"error":{"code":"fetch_failed","message":"backend down"}}"#);
            })
            .await;

        let query = ProjectQuery::new(&ProjectFilter::default(), None).expect("query");
        let error = source(&server)
            .list_projects(&query)
            .await
            .expect_err("gateway error");
        assert_eq!(
            error,
            ContentError::fetch(Some(502), "backend down")
        );
    }
}
