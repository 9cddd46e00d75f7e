//! Delivery API payloads and their mapping onto content entities.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::entities::{AssetRef, BlogPost, PostContent, Project};

#[derive(Debug, Deserialize)]
pub struct EntryCollection<F> {
    #[serde(default = "Vec::new")]
    pub items: Vec<Entry<F>>,
    #[serde(default)]
    pub includes: Includes,
}

#[derive(Debug, Deserialize)]
pub struct Entry<F> {
    pub sys: Sys,
    pub fields: F,
}

#[derive(Debug, Deserialize)]
pub struct Sys {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Includes {
    #[serde(default, rename = "Asset")]
    pub assets: Vec<Entry<AssetFields>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetFields {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file: Option<AssetFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetFile {
    pub url: String,
}

/// Asset field on an entry: either a bare link to `includes.Asset` or an
/// already resolved asset.
#[derive(Debug, Deserialize)]
pub struct AssetLink {
    pub sys: Sys,
    #[serde(default)]
    pub fields: Option<AssetFields>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFields {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cover_image: Option<AssetLink>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub read_time: Option<u32>,
    #[serde(default)]
    pub published: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFields {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub image_url: Option<AssetLink>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub completion_date: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
}

impl Includes {
    fn resolve(&self, link: &AssetLink) -> Option<AssetRef> {
        let fields = match &link.fields {
            Some(fields) => Some(fields),
            None => self
                .assets
                .iter()
                .find(|asset| asset.sys.id == link.sys.id)
                .map(|asset| &asset.fields),
        }?;
        let file = fields.file.as_ref()?;
        Some(AssetRef {
            url: absolute_asset_url(&file.url),
            title: fields.title.clone(),
        })
    }
}

/// Asset URLs come back protocol-relative (`//images.ctfassets.net/...`).
pub fn absolute_asset_url(url: &str) -> String {
    match url.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}

pub fn into_posts(collection: EntryCollection<PostFields>) -> Vec<BlogPost> {
    let EntryCollection { items, includes } = collection;
    items
        .into_iter()
        .filter_map(|entry| {
            let Entry { sys, fields } = entry;
            if fields.slug.trim().is_empty() {
                warn!(entry_id = %sys.id, "skipping post entry without slug");
                return None;
            }
            Some(BlogPost {
                cover_image: fields
                    .cover_image
                    .as_ref()
                    .and_then(|link| includes.resolve(link)),
                content: match fields.content {
                    Some(Value::String(markdown)) => PostContent::Markdown(markdown),
                    Some(Value::Null) | None => PostContent::default(),
                    Some(document) => PostContent::Document(document),
                },
                id: sys.id,
                slug: fields.slug,
                title: fields.title,
                excerpt: fields.excerpt,
                category: fields.category,
                published_date: fields.published_date,
                read_time: fields.read_time,
                published: fields.published.unwrap_or(false),
            })
        })
        .collect()
}

pub fn into_projects(collection: EntryCollection<ProjectFields>) -> Vec<Project> {
    let EntryCollection { items, includes } = collection;
    items
        .into_iter()
        .map(|Entry { sys, fields }| Project {
            image: fields
                .image_url
                .as_ref()
                .and_then(|link| includes.resolve(link)),
            id: sys.id,
            title: fields.title,
            description: fields.description,
            long_description: fields.long_description,
            project_url: fields.project_url,
            github_url: fields.github_url,
            technologies: fields.technologies,
            category: fields.category,
            featured: fields.featured.unwrap_or(false),
            completion_date: fields.completion_date,
            client: fields.client,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSTS: &str = r#"{
        "items": [
            {
                "sys": { "id": "post-1" },
                "fields": {
                    "title": "UI Design Principles",
                    "slug": "ui-design-principles",
                    "excerpt": "Essential principles for modern UI design.",
                    "content": { "nodeType": "document", "content": [] },
                    "coverImage": { "sys": { "type": "Link", "linkType": "Asset", "id": "asset-1" } },
                    "category": "Design",
                    "publishedDate": "2023-03-10",
                    "readTime": 6,
                    "published": true
                }
            },
            {
                "sys": { "id": "post-2" },
                "fields": { "title": "No slug yet" }
            }
        ],
        "includes": {
            "Asset": [
                {
                    "sys": { "id": "asset-1" },
                    "fields": {
                        "title": "Cover",
                        "file": { "url": "//images.ctfassets.net/space/asset-1/cover.png" }
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn linked_assets_are_resolved_from_includes() {
        let collection: EntryCollection<PostFields> =
            serde_json::from_str(POSTS).expect("payload parses");
        let posts = into_posts(collection);

        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.id, "post-1");
        assert_eq!(post.read_time, Some(6));
        assert!(matches!(post.content, PostContent::Document(_)));
        assert_eq!(
            post.cover_image,
            Some(AssetRef {
                url: "https://images.ctfassets.net/space/asset-1/cover.png".into(),
                title: Some("Cover".into()),
            })
        );
    }

    #[test]
    fn projects_default_missing_flags() {
        let collection: EntryCollection<ProjectFields> = serde_json::from_str(
            r#"{ "items": [ { "sys": { "id": "p" }, "fields": {
                "title": "SaaS Dashboard",
                "imageUrl": { "sys": { "id": "missing" } },
                "technologies": ["Next.js", "PostgreSQL"]
            } } ] }"#,
        )
        .expect("payload parses");
        let projects = into_projects(collection);

        assert!(!projects[0].featured);
        assert_eq!(projects[0].image, None);
        assert_eq!(projects[0].technologies, ["Next.js", "PostgreSQL"]);
    }

    #[test]
    fn absolute_urls_are_left_alone() {
        assert_eq!(
            absolute_asset_url("https://example.com/a.png"),
            "https://example.com/a.png"
        );
    }
}
