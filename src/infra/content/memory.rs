//! In-process content source backed by a fixed data set.
//!
//! The data set is either the built-in demo content or a TOML fixture file.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::application::content::ContentSource;
use crate::application::error::ContentError;
use crate::application::query::{PostQuery, ProjectQuery};
use crate::domain::entities::{AssetRef, BlogPost, PostContent, Project};
use crate::domain::listing::{filter, paginate, sort};
use crate::domain::slug::{Slug, derive_slug};
use crate::infra::error::InfraError;

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    posts: Vec<BlogPost>,
    projects: Vec<Project>,
}

impl InMemorySource {
    pub fn new(posts: Vec<BlogPost>, projects: Vec<Project>) -> Self {
        Self { posts, projects }
    }

    pub fn demo() -> Self {
        Self::new(demo_posts(), demo_projects())
    }

    /// Load posts and projects from a TOML fixture.
    pub fn from_fixture(path: &Path) -> Result<Self, InfraError> {
        let data = std::fs::read_to_string(path)
            .map_err(|err| InfraError::fixture(path, format!("unreadable: {err}")))?;
        let fixture: Fixture = toml::from_str(&data)
            .map_err(|err| InfraError::fixture(path, format!("invalid toml: {err}")))?;
        fixture
            .into_source()
            .map_err(|message| InfraError::fixture(path, message))
    }
}

#[async_trait]
impl ContentSource for InMemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<BlogPost>, ContentError> {
        let matched = filter(self.posts.clone(), &query.filter);
        Ok(paginate(
            sort(matched, query.order),
            Some(query.limit.as_usize()),
        ))
    }

    async fn find_post_by_slug(&self, slug: &Slug) -> Result<Option<BlogPost>, ContentError> {
        let mut matching = self.posts.iter().filter(|post| post.slug == slug.as_str());
        let first = matching.next();
        // Drafts may reuse a published slug; the published post wins.
        let published = first
            .into_iter()
            .chain(matching)
            .find(|post| post.published);
        Ok(published.or(first).cloned())
    }

    async fn list_projects(&self, query: &ProjectQuery) -> Result<Vec<Project>, ContentError> {
        let matched = filter(self.projects.clone(), &query.filter);
        Ok(paginate(
            sort(matched, query.order),
            query.limit.map(|limit| limit.as_usize()),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    posts: Vec<FixturePost>,
    #[serde(default)]
    projects: Vec<FixtureProject>,
}

#[derive(Debug, Deserialize)]
struct FixturePost {
    id: Option<String>,
    slug: Option<String>,
    title: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    content: String,
    category: Option<String>,
    cover_image: Option<String>,
    published_date: Option<String>,
    read_time: Option<u32>,
    #[serde(default = "default_published")]
    published: bool,
}

#[derive(Debug, Deserialize)]
struct FixtureProject {
    id: Option<String>,
    title: String,
    #[serde(default)]
    description: String,
    long_description: Option<String>,
    image: Option<String>,
    project_url: Option<String>,
    github_url: Option<String>,
    #[serde(default)]
    technologies: Vec<String>,
    category: Option<String>,
    #[serde(default)]
    featured: bool,
    completion_date: Option<String>,
    client: Option<String>,
}

fn default_published() -> bool {
    true
}

impl Fixture {
    fn into_source(self) -> Result<InMemorySource, String> {
        let mut posts = Vec::with_capacity(self.posts.len());
        let mut published_slugs = HashSet::new();

        for entry in self.posts {
            let slug = match entry.slug {
                Some(slug) => slug,
                None => derive_slug(&entry.title)
                    .map_err(|err| format!("post `{}`: {err}", entry.title))?,
            };
            if entry.published && !published_slugs.insert(slug.clone()) {
                return Err(format!("duplicate published slug `{slug}`"));
            }
            posts.push(BlogPost {
                id: entry.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                slug,
                title: entry.title,
                excerpt: entry.excerpt,
                content: PostContent::Markdown(entry.content),
                category: entry.category,
                cover_image: entry.cover_image.map(asset),
                published_date: entry.published_date,
                read_time: entry.read_time,
                published: entry.published,
            });
        }

        let projects = self
            .projects
            .into_iter()
            .map(|entry| Project {
                id: entry.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                title: entry.title,
                description: entry.description,
                long_description: entry.long_description,
                image: entry.image.map(asset),
                project_url: entry.project_url,
                github_url: entry.github_url,
                technologies: entry.technologies,
                category: entry.category,
                featured: entry.featured,
                completion_date: entry.completion_date,
                client: entry.client,
            })
            .collect();

        Ok(InMemorySource::new(posts, projects))
    }
}

fn asset(url: String) -> AssetRef {
    AssetRef { url, title: None }
}

fn demo_post(
    id: &str,
    title: &str,
    excerpt: &str,
    category: &str,
    published_date: &str,
    read_time: u32,
    published: bool,
) -> BlogPost {
    let slug = derive_slug(title).unwrap_or_else(|_| id.to_string());
    BlogPost {
        id: id.to_string(),
        content: PostContent::Markdown(format!("# {title}\n\n{excerpt}")),
        cover_image: Some(asset(format!("https://example.com/image{id}.jpg"))),
        slug,
        title: title.to_string(),
        excerpt: excerpt.to_string(),
        category: Some(category.to_string()),
        published_date: Some(published_date.to_string()),
        read_time: Some(read_time),
        published,
    }
}

/// Demo posts: three published articles and one unpublished draft.
pub fn demo_posts() -> Vec<BlogPost> {
    vec![
        demo_post(
            "1",
            "Understanding React Hooks",
            "A deep dive into React hooks and best practices.",
            "Development",
            "2023-01-15",
            8,
            true,
        ),
        demo_post(
            "2",
            "Building Scalable Apps",
            "Tips for building scalable web applications.",
            "Technology",
            "2023-02-20",
            10,
            true,
        ),
        demo_post(
            "3",
            "UI Design Principles",
            "Essential principles for modern UI design.",
            "Design",
            "2023-03-10",
            6,
            true,
        ),
        demo_post(
            "4",
            "Notes on Career Growth",
            "Work in progress.",
            "Career",
            "2023-08-01",
            4,
            false,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn demo_project(
    id: &str,
    title: &str,
    description: &str,
    technologies: &[&str],
    category: &str,
    featured: bool,
    completion_date: &str,
    client: &str,
) -> Project {
    Project {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        long_description: Some(format!("Detailed description of the {title}.")),
        image: Some(asset(format!("https://example.com/project{id}.jpg"))),
        project_url: Some(format!("https://example.com/project{id}")),
        github_url: Some(format!("https://github.com/user/project{id}")),
        technologies: technologies.iter().map(|tech| tech.to_string()).collect(),
        category: Some(category.to_string()),
        featured,
        completion_date: Some(completion_date.to_string()),
        client: Some(client.to_string()),
    }
}

pub fn demo_projects() -> Vec<Project> {
    vec![
        demo_project(
            "1",
            "E-commerce Platform",
            "A full-featured online store.",
            &["React", "Node.js", "MongoDB"],
            "E-commerce",
            true,
            "2023-04-01",
            "Client A",
        ),
        demo_project(
            "2",
            "Mobile Banking App",
            "Secure mobile banking application.",
            &["React Native", "Firebase"],
            "Mobile App",
            true,
            "2023-05-15",
            "Client B",
        ),
        demo_project(
            "3",
            "SaaS Dashboard",
            "Analytics dashboard for SaaS.",
            &["Next.js", "PostgreSQL"],
            "SaaS",
            false,
            "2023-06-20",
            "Client C",
        ),
        demo_project(
            "4",
            "Portfolio Website",
            "Personal portfolio site.",
            &["Next.js", "Tailwind CSS"],
            "Web Application",
            true,
            "2023-07-10",
            "Self",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::filter::{PostFilter, ProjectFilter};
    use crate::domain::slug::normalize_slug;

    #[test]
    fn demo_slugs_are_derived_from_titles() {
        let slugs: Vec<_> = demo_posts().into_iter().map(|post| post.slug).collect();
        assert_eq!(
            slugs,
            [
                "understanding-react-hooks",
                "building-scalable-apps",
                "ui-design-principles",
                "notes-on-career-growth",
            ]
        );
    }

    #[tokio::test]
    async fn featured_projects_latest_first() {
        let source = InMemorySource::demo();
        let query = ProjectQuery::new(&ProjectFilter::featured(), Some(6)).expect("query");
        let titles: Vec<_> = source
            .list_projects(&query)
            .await
            .expect("projects")
            .into_iter()
            .map(|project| project.title)
            .collect();
        assert_eq!(
            titles,
            ["Portfolio Website", "Mobile Banking App", "E-commerce Platform"]
        );
    }

    #[tokio::test]
    async fn drafts_only_listed_on_request() {
        let source = InMemorySource::demo();
        let published = PostQuery::new(&PostFilter::default(), None).expect("query");
        assert_eq!(source.list_posts(&published).await.expect("posts").len(), 3);

        let drafts =
            PostQuery::new(&PostFilter::any().with_published(false), None).expect("query");
        let listed = source.list_posts(&drafts).await.expect("posts");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].slug, "notes-on-career-growth");
    }

    #[tokio::test]
    async fn fixture_file_is_loaded_with_derived_slugs() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            r#"
[[posts]]
title = "Hello Rust World"
excerpt = "First post"
category = "Development"
published_date = "2024-05-01"

[[projects]]
title = "Folio"
featured = true
technologies = ["Rust", "axum"]
"#
        )
        .expect("write fixture");

        let source = InMemorySource::from_fixture(file.path()).expect("fixture");
        let slug = normalize_slug(Some("hello-rust-world")).expect("slug");
        let post = source
            .find_post_by_slug(&slug)
            .await
            .expect("lookup")
            .expect("post");
        assert!(post.published);
        assert_eq!(post.category.as_deref(), Some("Development"));

        let query = ProjectQuery::new(&ProjectFilter::featured(), None).expect("query");
        assert_eq!(source.list_projects(&query).await.expect("projects").len(), 1);
    }

    #[test]
    fn duplicate_published_slugs_are_rejected() {
        let fixture: Fixture = toml::from_str(
            r#"
[[posts]]
title = "Same"
[[posts]]
title = "Other"
slug = "same"
"#,
        )
        .expect("fixture parses");
        let err = fixture.into_source().expect_err("duplicate slug");
        assert_eq!(err, "duplicate published slug `same`");
    }
}
