//! Search-provider client
//!
//! Issues paginated queries against a Google Custom Search compatible
//! endpoint and normalizes the loosely-shaped response items into candidate
//! nodes for the merge engine.

use anyhow::{Context, Result};
use searchlens_core::{Node, extract_keywords};
use serde::Deserialize;
use std::env;
use url::Url;

const DEFAULT_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Results requested per page.
const PER_PAGE: usize = 10;
/// Upper bound on results fetched per query.
const MAX_RESULTS: usize = 8;

/// One raw result item as returned by the provider.
///
/// Optional nested fields are modeled explicitly; absence is handled, never
/// guessed at.
#[derive(Debug, Deserialize, Clone)]
pub struct RawItem {
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    pub link: String,
    #[serde(default)]
    pub pagemap: Option<PageMap>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PageMap {
    #[serde(default)]
    pub cse_thumbnail: Vec<Thumbnail>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Thumbnail {
    pub src: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Option<Vec<RawItem>>,
}

impl RawItem {
    /// First thumbnail URL, when the provider supplied one.
    pub fn thumbnail(&self) -> Option<&str> {
        self.pagemap
            .as_ref()?
            .cse_thumbnail
            .first()
            .map(|thumb| thumb.src.as_str())
    }
}

/// Boundary consumed by the session controller; implemented by the HTTP
/// client below and by test stubs.
pub trait SearchProvider {
    async fn search(&self, query: &str) -> Result<Vec<RawItem>>;
}

/// HTTP client for a Google Custom Search compatible API.
pub struct GoogleSearchProvider {
    client: reqwest::Client,
    api_key: String,
    engine_id: String,
    endpoint: Url,
}

impl GoogleSearchProvider {
    pub fn new(api_key: String, engine_id: String, endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).context("invalid search endpoint URL")?;
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "Mozilla/5.0 (compatible; searchlens/{})",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            api_key,
            engine_id,
            endpoint,
        })
    }

    /// Build a provider from `SEARCHLENS_API_KEY`, `SEARCHLENS_ENGINE_ID`
    /// and the optional `SEARCHLENS_SEARCH_URL` override.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("SEARCHLENS_API_KEY").context("SEARCHLENS_API_KEY is not set")?;
        let engine_id =
            env::var("SEARCHLENS_ENGINE_ID").context("SEARCHLENS_ENGINE_ID is not set")?;
        let endpoint =
            env::var("SEARCHLENS_SEARCH_URL").unwrap_or_else(|_| DEFAULT_SEARCH_URL.to_string());
        Self::new(api_key, engine_id, &endpoint)
    }
}

impl SearchProvider for GoogleSearchProvider {
    async fn search(&self, query: &str) -> Result<Vec<RawItem>> {
        let mut results = Vec::new();
        let mut start = 1;

        while start <= MAX_RESULTS {
            let num = PER_PAGE.to_string();
            let start_param = start.to_string();
            log::debug!("fetching page starting at {start} for query {query:?}");

            let response = self
                .client
                .get(self.endpoint.clone())
                .query(&[
                    ("key", self.api_key.as_str()),
                    ("cx", self.engine_id.as_str()),
                    ("q", query),
                    ("num", num.as_str()),
                    ("start", start_param.as_str()),
                ])
                .send()
                .await
                .context("search request failed")?
                .error_for_status()
                .context("search request rejected")?;

            let page: SearchResponse = response
                .json()
                .await
                .context("failed to decode search response")?;

            let Some(items) = page.items else { break };
            let short_page = items.len() < PER_PAGE;
            results.extend(items);

            // Stop once the provider returns a short page.
            if short_page {
                break;
            }
            start += PER_PAGE;
        }

        Ok(results)
    }
}

/// Normalize raw items into candidate nodes.
///
/// Candidates enter the graph without an id; the merge pass assigns a
/// depth-qualified one. Keywords are derived up front so activated nodes
/// can seed re-queries.
pub fn candidate_nodes(items: Vec<RawItem>) -> Vec<Node> {
    items
        .into_iter()
        .map(|item| {
            let keywords = extract_keywords(&item.title, &item.link);
            Node {
                id: String::new(),
                title: item.title.clone(),
                description: item.snippet.clone(),
                image: item.thumbnail().map(str::to_string),
                keywords,
                link: item.link,
                depth: 0,
                visible: true,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_item_with_thumbnail() {
        let json = r#"{
            "title": "Rust Programming Language",
            "snippet": "A language empowering everyone.",
            "link": "https://www.rust-lang.org/",
            "pagemap": {
                "cse_thumbnail": [{"src": "https://img.example.com/rust.png"}]
            }
        }"#;

        let item: RawItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.title, "Rust Programming Language");
        assert_eq!(item.thumbnail(), Some("https://img.example.com/rust.png"));
    }

    #[test]
    fn deserializes_item_without_pagemap() {
        let json = r#"{"title": "Bare", "snippet": "s", "link": "http://a.com"}"#;
        let item: RawItem = serde_json::from_str(json).unwrap();
        assert!(item.pagemap.is_none());
        assert!(item.thumbnail().is_none());
    }

    #[test]
    fn deserializes_empty_thumbnail_array() {
        let json = r#"{
            "title": "No thumb",
            "link": "http://a.com",
            "pagemap": {"cse_thumbnail": []}
        }"#;
        let item: RawItem = serde_json::from_str(json).unwrap();
        assert!(item.thumbnail().is_none());
        assert_eq!(item.snippet, "");
    }

    #[test]
    fn response_without_items_field_decodes() {
        let page: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_none());
    }

    #[test]
    fn candidates_carry_keywords_but_no_id() {
        let items = vec![RawItem {
            title: "The Cat".to_string(),
            snippet: "feline".to_string(),
            link: "http://example.com/cat".to_string(),
            pagemap: None,
        }];

        let candidates = candidate_nodes(items);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].id.is_empty());
        assert_eq!(candidates[0].keywords, vec!["cat"]);
        assert_eq!(candidates[0].description, "feline");
        assert!(candidates[0].image.is_none());
    }
}
