use async_trait::async_trait;

use crate::application::content::ContentSource;
use crate::application::error::ContentError;
use crate::application::query::{PostQuery, ProjectQuery, slug_lookup_params};
use crate::domain::entities::{BlogPost, Project};
use crate::domain::slug::Slug;
use crate::infra::contentful::ContentClient;
use crate::infra::contentful::mapping::{PostFields, ProjectFields, into_posts, into_projects};

pub const DEFAULT_POST_CONTENT_TYPE: &str = "personalBlog";
pub const DEFAULT_PROJECT_CONTENT_TYPE: &str = "personalProjects";

/// Talks to the content delivery API directly.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: ContentClient,
    post_content_type: String,
    project_content_type: String,
}

impl RemoteSource {
    pub fn new(
        client: ContentClient,
        post_content_type: impl Into<String>,
        project_content_type: impl Into<String>,
    ) -> Self {
        Self {
            client,
            post_content_type: post_content_type.into(),
            project_content_type: project_content_type.into(),
        }
    }
}

#[async_trait]
impl ContentSource for RemoteSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<BlogPost>, ContentError> {
        let params = query.provider_params(&self.post_content_type);
        let collection = self.client.get_entries::<PostFields>(&params).await?;
        Ok(into_posts(collection))
    }

    async fn find_post_by_slug(&self, slug: &Slug) -> Result<Option<BlogPost>, ContentError> {
        let params = slug_lookup_params(&self.post_content_type, slug);
        let collection = self.client.get_entries::<PostFields>(&params).await?;
        Ok(into_posts(collection).into_iter().next())
    }

    async fn list_projects(&self, query: &ProjectQuery) -> Result<Vec<Project>, ContentError> {
        let params = query.provider_params(&self.project_content_type);
        let collection = self.client.get_entries::<ProjectFields>(&params).await?;
        Ok(into_projects(collection))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::MockServer;
    use reqwest::Url;

    use super::*;
    use crate::domain::filter::{PostFilter, ProjectFilter};
    use crate::domain::slug::normalize_slug;
    use crate::infra::contentful::ContentClientConfig;

    fn source(server: &MockServer) -> RemoteSource {
        let client = ContentClient::new(ContentClientConfig {
            space_id: "space".into(),
            access_token: "token".into(),
            environment: "master".into(),
            base_url: Url::parse(&server.base_url()).expect("url"),
            timeout: Duration::from_secs(5),
        })
        .expect("client");
        RemoteSource::new(client, DEFAULT_POST_CONTENT_TYPE, DEFAULT_PROJECT_CONTENT_TYPE)
    }

    #[tokio::test]
    async fn post_listing_sends_default_filter() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/spaces/space/environments/master/entries")
                    .query_param("content_type", "personalBlog")
                    .query_param("order", "-fields.publishedDate")
                    .query_param("limit", "10")
                    .query_param("fields.published", "true");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(
                        r#"{"items":[{"sys":{"id":"1"},"fields":{"title":"Building Scalable Apps","slug":"building-scalable-apps","published":true}}]}"#,
                    );
            })
            .await;

        let query = PostQuery::new(&PostFilter::default(), None).expect("query");
        let posts = source(&server).list_posts(&query).await.expect("posts");

        mock.assert_async().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "building-scalable-apps");
    }

    #[tokio::test]
    async fn zero_matches_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET").query_param("fields.slug", "missing-post");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"items":[]}"#);
            })
            .await;

        let slug = normalize_slug(Some("missing-post")).expect("slug");
        let found = source(&server).find_post_by_slug(&slug).await;
        assert_eq!(found, Ok(None));
    }

    #[tokio::test]
    async fn project_listing_sends_featured_flag() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .query_param("content_type", "personalProjects")
                    .query_param("order", "-fields.completionDate")
                    .query_param("fields.featured", "true")
                    .query_param("limit", "6");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"items":[]}"#);
            })
            .await;

        let query = ProjectQuery::new(&ProjectFilter::featured(), Some(6)).expect("query");
        let projects = source(&server).list_projects(&query).await.expect("projects");

        mock.assert_async().await;
        assert!(projects.is_empty());
    }
}
