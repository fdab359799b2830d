use super::LinkPreviewer;
use crate::errors::FetchError;
use crate::records::Preview;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::time::Duration;

const FETCH_TIMEOUT_SECS: u64 = 15;
const MAX_REDIRECTS: usize = 3;
const USER_AGENT: &str = "Mozilla/5.0 (compatible; link-builder/0.1)";

/// Default previewer: fetches the page over HTTP and extracts title,
/// description, and Open Graph / Twitter card metadata from its meta tags.
pub struct HttpPreviewer {
    client: reqwest::Client,
}

impl HttpPreviewer {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .expect("HTTP client for previews");
        Self { client }
    }
}

impl Default for HttpPreviewer {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkPreviewer for HttpPreviewer {
    async fn parse(&mut self, url: &str) -> Result<Preview, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let body = response.text().await?;
        Ok(parse_document(&body))
    }
}

/// Extracts preview metadata from an HTML document.
///
/// Title prefers `og:title` over the `<title>` element; description
/// prefers `og:description` over `meta[name=description]`. The og and
/// twitter maps hold every matching meta tag, keyed without their prefix,
/// and are absent when the page has none.
pub fn parse_document(html: &str) -> Preview {
    let document = Html::parse_document(html);

    let og_meta = collect_meta(&document, "meta[property^='og:']", "property", "og:");
    let twitter_meta = collect_meta(&document, "meta[name^='twitter:']", "name", "twitter:");

    let title = og_meta
        .get("title")
        .cloned()
        .or_else(|| title_text(&document))
        .unwrap_or_default();
    let description = og_meta
        .get("description")
        .cloned()
        .or_else(|| meta_content(&document, "meta[name='description']"))
        .unwrap_or_default();

    Preview {
        title,
        description,
        og_meta: (!og_meta.is_empty()).then_some(og_meta),
        twitter_meta: (!twitter_meta.is_empty()).then_some(twitter_meta),
    }
}

/// Collects `content` attributes of all meta tags matching the selector,
/// keyed by their property/name with the given prefix stripped. The first
/// occurrence of a key wins.
fn collect_meta(
    document: &Html,
    selector: &str,
    key_attr: &str,
    prefix: &str,
) -> BTreeMap<String, String> {
    let selector = Selector::parse(selector).expect("static selector");
    let mut meta = BTreeMap::new();
    for element in document.select(&selector) {
        let (Some(key), Some(content)) = (
            element.value().attr(key_attr),
            element.value().attr("content"),
        ) else {
            continue;
        };
        if content.is_empty() {
            continue;
        }
        if let Some(stripped) = key.strip_prefix(prefix) {
            meta.entry(stripped.to_string())
                .or_insert_with(|| content.to_string());
        }
    }
    meta
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).expect("static selector");
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.to_string())
}

fn title_text(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").expect("static selector");
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_with_og_and_twitter_tags() {
        let html = r#"<html><head>
            <title>Fallback title</title>
            <meta property="og:title" content="OG title">
            <meta property="og:description" content="OG description">
            <meta property="og:image" content="https://example.com/card.png">
            <meta name="twitter:card" content="summary">
            <meta name="twitter:site" content="@example">
        </head><body></body></html>"#;

        let preview = parse_document(html);

        assert_eq!(preview.title, "OG title");
        assert_eq!(preview.description, "OG description");

        let og = preview.og_meta.unwrap();
        assert_eq!(og.get("image").unwrap(), "https://example.com/card.png");

        let twitter = preview.twitter_meta.unwrap();
        assert_eq!(twitter.get("card").unwrap(), "summary");
        assert_eq!(twitter.get("site").unwrap(), "@example");
    }

    #[test]
    fn test_parse_document_falls_back_to_title_and_meta_description() {
        let html = r#"<html><head>
            <title> Plain page </title>
            <meta name="description" content="A plain description">
        </head><body></body></html>"#;

        let preview = parse_document(html);

        assert_eq!(preview.title, "Plain page");
        assert_eq!(preview.description, "A plain description");
        assert!(preview.og_meta.is_none());
        assert!(preview.twitter_meta.is_none());
    }

    #[test]
    fn test_parse_document_empty_page_yields_empty_preview() {
        let preview = parse_document("<html><head></head><body>no metadata</body></html>");
        assert!(preview.is_empty());
    }

    #[test]
    fn test_collect_meta_first_occurrence_wins() {
        let html = r#"<html><head>
            <meta property="og:title" content="First">
            <meta property="og:title" content="Second">
        </head></html>"#;

        let preview = parse_document(html);

        assert_eq!(preview.title, "First");
    }

    #[test]
    fn test_collect_meta_skips_empty_content() {
        let html = r#"<html><head>
            <meta property="og:title" content="">
        </head></html>"#;

        let preview = parse_document(html);

        assert!(preview.is_empty());
    }
}
