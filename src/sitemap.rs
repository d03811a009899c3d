//! XML sitemap for search engines.

use std::fmt::Write as _;
use std::sync::LazyLock;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::content;
use crate::markup::escape;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const CACHE_CONTROL: &str = "public, max-age=86400, s-maxage=86400";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Weekly,
    Monthly,
}

impl ChangeFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: Option<NaiveDate>,
    pub change_frequency: ChangeFrequency,
    pub priority: f64,
}

const STATIC_PAGES: &[(&str, f64, ChangeFrequency)] = &[
    ("/", 1.0, ChangeFrequency::Weekly),
    ("/services", 0.9, ChangeFrequency::Monthly),
    ("/about", 0.8, ChangeFrequency::Monthly),
    ("/contact", 0.8, ChangeFrequency::Monthly),
    ("/insights", 0.7, ChangeFrequency::Monthly),
    ("/affiliations", 0.7, ChangeFrequency::Monthly),
    ("/blog", 0.9, ChangeFrequency::Weekly),
    ("/services/sell-side-ma", 0.8, ChangeFrequency::Monthly),
    ("/services/capital-raise", 0.8, ChangeFrequency::Monthly),
    ("/services/strategic-advisory", 0.8, ChangeFrequency::Monthly),
    ("/resources/playbook", 0.8, ChangeFrequency::Monthly),
];

/// Slug for category and tag pages: lower-cased, each space a dash.
fn taxonomy_slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Slug for affiliation pages: lower-cased, whitespace runs collapsed to a dash.
pub fn affiliation_slug(name: &str) -> String {
    WHITESPACE.replace_all(&name.to_lowercase(), "-").into_owned()
}

/// All sitemap entries. Static pages are stamped with `today`.
pub fn entries(base_url: &str, today: NaiveDate) -> Vec<SitemapEntry> {
    let base = base_url.trim_end_matches('/');
    let mut entries = Vec::new();

    for (path, priority, change_frequency) in STATIC_PAGES {
        entries.push(SitemapEntry {
            url: format!("{base}{path}"),
            last_modified: Some(today),
            change_frequency: *change_frequency,
            priority: *priority,
        });
    }

    for post in content::blog_posts() {
        let last_modified = NaiveDate::parse_from_str(post.date, "%Y-%m-%d")
            .map_err(|e| warn!(slug = post.slug, error = %e, "Unparseable blog post date"))
            .ok();
        entries.push(SitemapEntry {
            url: format!("{base}/blog/{}", post.slug),
            last_modified,
            change_frequency: ChangeFrequency::Monthly,
            priority: 0.7,
        });
    }

    for category in content::blog_categories() {
        entries.push(SitemapEntry {
            url: format!("{base}/blog/category/{}", taxonomy_slug(category)),
            last_modified: None,
            change_frequency: ChangeFrequency::Weekly,
            priority: 0.6,
        });
    }

    for tag in content::blog_tags() {
        entries.push(SitemapEntry {
            url: format!("{base}/blog/tag/{}", taxonomy_slug(tag)),
            last_modified: None,
            change_frequency: ChangeFrequency::Weekly,
            priority: 0.6,
        });
    }

    for affiliation in content::affiliations() {
        entries.push(SitemapEntry {
            url: format!("{base}/affiliations/{}", affiliation_slug(affiliation.name)),
            last_modified: None,
            change_frequency: ChangeFrequency::Monthly,
            priority: 0.6,
        });
    }

    entries
}

/// Render entries as a sitemaps.org `urlset`.
pub fn render_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    for entry in entries {
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{}</loc>", escape(&entry.url));
        if let Some(date) = entry.last_modified {
            let _ = writeln!(xml, "    <lastmod>{}</lastmod>", date.format("%Y-%m-%d"));
        }
        let _ = writeln!(
            xml,
            "    <changefreq>{}</changefreq>",
            entry.change_frequency.as_str()
        );
        let _ = writeln!(xml, "    <priority>{:.1}</priority>", entry.priority);
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>");
    xml
}

/// Shared state for the sitemap route.
#[derive(Clone)]
pub struct SitemapRouteState {
    pub base_url: String,
}

/// GET /sitemap.xml
async fn sitemap_xml(State(state): State<SitemapRouteState>) -> impl IntoResponse {
    let today = chrono::Utc::now().date_naive();
    let xml = render_xml(&entries(&state.base_url, today));
    (
        [
            (header::CONTENT_TYPE, "application/xml"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        xml,
    )
}

/// Build the sitemap route.
pub fn sitemap_routes(state: SitemapRouteState) -> Router {
    Router::new()
        .route("/sitemap.xml", get(sitemap_xml))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    const BASE: &str = "https://structuredpartners.com";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn urls() -> Vec<String> {
        entries(BASE, today()).into_iter().map(|e| e.url).collect()
    }

    #[test]
    fn every_static_route_is_listed_with_today() {
        let entries = entries(BASE, today());
        for (path, _, _) in STATIC_PAGES {
            let url = format!("{BASE}{path}");
            let entry = entries.iter().find(|e| e.url == url).unwrap();
            assert_eq!(entry.last_modified, Some(today()));
        }
        assert_eq!(entries[0].url, format!("{BASE}/"));
        assert_eq!(entries[0].priority, 1.0);
    }

    #[test]
    fn blog_posts_use_their_own_date() {
        let entries = entries(BASE, today());
        let post = entries
            .iter()
            .find(|e| e.url.ends_with("/blog/founders-guide-strategic-exits"))
            .unwrap();
        assert_eq!(post.last_modified, NaiveDate::from_ymd_opt(2023, 5, 15));
        assert_eq!(post.change_frequency, ChangeFrequency::Monthly);
    }

    #[test]
    fn taxonomy_pages_are_slugged() {
        let urls = urls();
        assert!(urls.contains(&format!("{BASE}/blog/category/m&a-process")));
        assert!(urls.contains(&format!("{BASE}/blog/category/exit-strategy")));
        assert!(urls.contains(&format!("{BASE}/blog/tag/private-equity")));
        assert!(urls.contains(&format!("{BASE}/blog/tag/due-diligence")));
    }

    #[test]
    fn affiliations_collapse_whitespace() {
        assert_eq!(
            affiliation_slug("U.S. Green  Building\tCouncil"),
            "u.s.-green-building-council"
        );
        let urls = urls();
        assert!(urls.contains(&format!("{BASE}/affiliations/vistage-international")));
        assert_eq!(
            urls.iter().filter(|u| u.contains("/affiliations/")).count(),
            content::affiliations().len()
        );
    }

    #[test]
    fn xml_escapes_and_formats_priority() {
        let xml = render_xml(&entries(BASE, today()));
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.ends_with("</urlset>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(xml.contains("<lastmod>2024-06-01</lastmod>"));
        assert!(xml.contains("/blog/category/m&amp;a-process</loc>"));
        assert!(!xml.contains("m&a-process"));
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let entries = entries("https://example.com/", today());
        assert_eq!(entries[1].url, "https://example.com/services");
    }

    #[tokio::test]
    async fn route_sets_headers() {
        let app = sitemap_routes(SitemapRouteState {
            base_url: BASE.to_string(),
        });
        let resp = app
            .oneshot(Request::get("/sitemap.xml").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/xml");
        assert_eq!(resp.headers()[header::CACHE_CONTROL], CACHE_CONTROL);
        let body = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let xml = String::from_utf8(body.to_vec()).unwrap();
        assert!(xml.contains(&format!("<loc>{BASE}/contact</loc>")));
    }
}
