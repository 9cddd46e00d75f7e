//! `/api/content/*` handlers backed by the cached query hooks.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::application::error::ContentError;
use crate::application::query::{Limit, PostQuery, ProjectQuery};
use crate::domain::browse::{self, CategorySelection};
use crate::domain::entities::{BlogPost, Project};
use crate::domain::filter::{PostFilter, ProjectFilter};
use crate::domain::listing::{SortKey, UnknownSortField};
use crate::domain::slug::normalize_slug;

use super::{HttpState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PostListParams {
    limit: Option<String>,
    published: Option<String>,
    category: Option<String>,
    search: Option<String>,
    order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ProjectListParams {
    limit: Option<String>,
    featured: Option<String>,
    category: Option<String>,
    order: Option<String>,
}

pub(super) async fn list_posts(
    State(state): State<HttpState>,
    Query(params): Query<PostListParams>,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    let limit = parse_limit(params.limit.as_deref())?;
    let published = parse_flag("published", params.published.as_deref())?.unwrap_or(true);

    let mut filter = PostFilter::default().with_published(published);
    if let CategorySelection::Named(category) = CategorySelection::parse(params.category.as_deref())
    {
        filter = filter.with_category(category);
    }

    let mut query = PostQuery::new(&filter, limit)?;
    if let Some(order) = parse_order(params.order.as_deref())? {
        query = query.with_order(order);
    }

    let posts = state
        .queries
        .posts_query(query)
        .await
        .into_result()?
        .unwrap_or_default();

    let posts = match params.search.as_deref() {
        Some(term) => browse::browse_posts(&posts, term, &CategorySelection::All),
        None => posts,
    };
    Ok(Json(posts))
}

pub(super) async fn post_by_slug(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Result<Response, ApiError> {
    // The hook treats a blank slug as "nothing to look up"; over HTTP it is a bad request.
    let slug = normalize_slug(Some(&slug)).map_err(ContentError::from)?;
    match state
        .queries
        .post_by_slug(Some(slug.as_str()))
        .await
        .into_result()?
    {
        Some(post) => Ok(Json(post).into_response()),
        None => Ok((StatusCode::NOT_FOUND, Json(serde_json::Value::Null)).into_response()),
    }
}

pub(super) async fn list_projects(
    State(state): State<HttpState>,
    Query(params): Query<ProjectListParams>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let limit = parse_limit(params.limit.as_deref())?;

    let mut filter = ProjectFilter::default();
    filter.featured = parse_flag("featured", params.featured.as_deref())?;
    if let CategorySelection::Named(category) = CategorySelection::parse(params.category.as_deref())
    {
        filter = filter.with_category(category);
    }

    let mut query = ProjectQuery::new(&filter, limit)?;
    if let Some(order) = parse_order(params.order.as_deref())? {
        query = query.with_order(order);
    }

    let projects = state
        .queries
        .projects_query(query)
        .await
        .into_result()?
        .unwrap_or_default();
    Ok(Json(projects))
}

pub(super) async fn post_categories(
    State(state): State<HttpState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let categories = state.queries.post_categories().await.into_result()?;
    Ok(Json(categories.unwrap_or_default()))
}

pub(super) async fn project_categories(
    State(state): State<HttpState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let categories = state.queries.project_categories().await.into_result()?;
    Ok(Json(categories.unwrap_or_default()))
}

fn parse_limit(raw: Option<&str>) -> Result<Option<i64>, ContentError> {
    Ok(raw
        .map(Limit::parse)
        .transpose()?
        .map(|limit| i64::from(limit.get())))
}

/// Parse the `-fieldName` sort form.
fn parse_order<F>(raw: Option<&str>) -> Result<Option<SortKey<F>>, ContentError>
where
    F: FromStr<Err = UnknownSortField>,
{
    raw.map(|raw| {
        raw.parse()
            .map_err(|err: UnknownSortField| ContentError::validation(err.to_string()))
    })
    .transpose()
}

fn parse_flag(name: &str, raw: Option<&str>) -> Result<Option<bool>, ContentError> {
    match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        None => Ok(None),
        Some("true" | "1") => Ok(Some(true)),
        Some("false" | "0") => Ok(Some(false)),
        Some(other) => Err(ContentError::validation(format!(
            "{name} must be true or false, got `{other}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::PostSortField;

    #[test]
    fn limits_are_validated_at_the_edge() {
        assert_eq!(parse_limit(None), Ok(None));
        assert_eq!(parse_limit(Some("3")), Ok(Some(3)));
        assert!(parse_limit(Some("abc")).is_err());
        assert!(parse_limit(Some("0")).is_err());
    }

    #[test]
    fn order_accepts_both_field_spellings() {
        let order: Option<SortKey<PostSortField>> =
            parse_order(Some("-read_time")).expect("order");
        assert_eq!(order.map(|key| key.to_string()), Some("-readTime".to_string()));
        assert!(parse_order::<PostSortField>(Some("-colour")).is_err());
    }

    #[test]
    fn flags_accept_boolean_spellings() {
        assert_eq!(parse_flag("featured", Some("TRUE")), Ok(Some(true)));
        assert_eq!(parse_flag("featured", Some("0")), Ok(Some(false)));
        let err = parse_flag("featured", Some("maybe")).expect_err("not a flag");
        assert!(err.to_string().contains("featured must be true or false"));
    }
}
