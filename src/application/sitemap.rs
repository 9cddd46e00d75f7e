//! Sitemap service for sitemap.xml and robots.txt generation.

use thiserror::Error;
use time::Date;
use time::macros::format_description;
use url::Url;

use crate::application::error::ContentError;
use crate::application::queries::ContentQueries;
use crate::application::query::MAX_LIMIT;
use crate::domain::filter::PostFilter;

const STATIC_PATHS: &[&str] = &["/", "/about", "/projects", "/blog"];
const CHANGEFREQ: &str = "weekly";
const STATIC_PRIORITY: &str = "0.7";
const POST_PRIORITY: &str = "0.8";

#[derive(Clone)]
pub struct SitemapService {
    queries: ContentQueries,
    public_url: Url,
}

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("failed to list posts: {0}")]
    Posts(#[from] ContentError),
}

impl SitemapService {
    pub fn new(queries: ContentQueries, public_url: Url) -> Self {
        Self {
            queries,
            public_url,
        }
    }

    /// Static pages followed by every published post under `/blog/{slug}`.
    pub async fn sitemap_xml(&self) -> Result<String, SitemapError> {
        let base = self.public_url.as_str().trim_end_matches('/');
        let posts = self
            .queries
            .posts(&PostFilter::default(), Some(i64::from(MAX_LIMIT)))
            .await
            .into_result()?
            .unwrap_or_default();

        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );
        for path in STATIC_PATHS {
            xml.push_str(&sitemap_entry(base, path, None, STATIC_PRIORITY));
        }
        for post in posts.iter().filter(|post| post.published) {
            let lastmod = post.published_date.as_deref().and_then(parse_date);
            xml.push_str(&sitemap_entry(
                base,
                &format!("/blog/{}", post.slug),
                lastmod,
                POST_PRIORITY,
            ));
        }
        xml.push_str("</urlset>\n");
        Ok(xml)
    }

    pub fn robots_txt(&self) -> String {
        let base = self.public_url.as_str().trim_end_matches('/');
        format!("User-agent: *\nAllow: /\nSitemap: {base}/sitemap.xml\n")
    }
}

fn parse_date(raw: &str) -> Option<Date> {
    let day = raw.get(..10)?;
    Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
}

fn sitemap_entry(base: &str, path: &str, lastmod: Option<Date>, priority: &str) -> String {
    let loc = canonical_url(base, path);
    let lastmod = lastmod
        .and_then(|date| date.format(format_description!("[year]-[month]-[day]")).ok())
        .map(|date| format!("<lastmod>{date}</lastmod>"))
        .unwrap_or_default();
    format!(
        "  <url><loc>{loc}</loc>{lastmod}<changefreq>{CHANGEFREQ}</changefreq><priority>{priority}</priority></url>\n"
    )
}

fn canonical_url(base: &str, path: &str) -> String {
    if path == "/" {
        base.to_string()
    } else {
        format!("{base}{path}")
    }
}
