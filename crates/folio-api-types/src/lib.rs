//! Wire types shared by the folio server and its HTTP clients.
//!
//! Field names follow the camelCase convention the page layer expects
//! (`coverImage`, `publishedDate`, `readTime`, ...).

use serde::{Deserialize, Serialize};

/// Reference to an image asset hosted by the content backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Body of a blog post: a structured rich-text document or plain markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostContent {
    Markdown(String),
    Document(serde_json::Value),
}

impl Default for PostContent {
    fn default() -> Self {
        Self::Markdown(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: PostContent,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cover_image: Option<AssetRef>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub read_time: Option<u32>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub image: Option<AssetRef>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub completion_date: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
}

/// Payload accepted by `POST /api/email/send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// Payload accepted by `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendAck {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendFailure {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blog_post_uses_camel_case_fields() {
        let post = BlogPost {
            id: "1".into(),
            slug: "hello".into(),
            title: "Hello".into(),
            excerpt: String::new(),
            content: PostContent::Markdown("# Hello".into()),
            category: None,
            cover_image: Some(AssetRef {
                url: "https://images.example/cover.png".into(),
                title: None,
            }),
            published_date: Some("2023-01-15".into()),
            read_time: Some(8),
            published: true,
        };

        let value = serde_json::to_value(&post).expect("serialize post");
        assert_eq!(value["publishedDate"], "2023-01-15");
        assert_eq!(value["readTime"], 8);
        assert_eq!(value["coverImage"]["url"], "https://images.example/cover.png");
        assert_eq!(value["content"], "# Hello");
    }

    #[test]
    fn rich_text_content_stays_structured() {
        let raw = serde_json::json!({
            "id": "2",
            "slug": "doc",
            "title": "Doc",
            "content": {"nodeType": "document", "content": []},
            "published": true
        });
        let post: BlogPost = serde_json::from_value(raw).expect("deserialize post");
        assert!(matches!(post.content, PostContent::Document(_)));
        assert!(post.category.is_none());
    }

    #[test]
    fn email_request_reads_reply_to() {
        let raw = r#"{"to":"me@example.com","subject":"Hi","body":"Hello","replyTo":"you@example.com"}"#;
        let request: EmailRequest = serde_json::from_str(raw).expect("deserialize email");
        assert_eq!(request.reply_to.as_deref(), Some("you@example.com"));
    }
}
