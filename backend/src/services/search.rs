//! Web search enrichment
//!
//! A keyword heuristic decides whether a message is about something
//! time-sensitive; if so the configured provider is asked for a handful
//! of result URLs. Search is best effort: provider failures are logged
//! and degrade to "no results", they never reach the caller.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use super::language::LanguageCode;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Search provider returned HTTP {0}")]
    BadStatus(u16),

    #[error("Could not parse search results: {0}")]
    Parse(String),
}

/// Anything that can turn a query into an ordered list of result URLs
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<String>, SearchError>;

    fn provider_name(&self) -> &str;
}

/// True iff the message contains one of the language's trigger keywords.
pub fn should_search(message: &str, language: LanguageCode) -> bool {
    if message.is_empty() {
        return false;
    }
    let lowered = message.to_lowercase();
    language.profile().search_keywords.iter().any(|keyword| lowered.contains(keyword))
}

/// Ask `provider` for up to `num_results` URLs, swallowing any failure.
pub async fn fetch_search_results(
    provider: &dyn SearchProvider,
    query: &str,
    num_results: usize,
) -> Vec<String> {
    tracing::info!("Searching {} for: {}", provider.provider_name(), query);
    match provider.search(query, num_results).await {
        Ok(mut urls) => {
            urls.truncate(num_results);
            tracing::info!("Found {} search results", urls.len());
            urls
        },
        Err(e) => {
            tracing::error!("Search error from {}: {}", provider.provider_name(), e);
            Vec::new()
        },
    }
}

// ============================================================================
// DuckDuckGo HTML provider
// ============================================================================

// Result links are wrapped in a redirect: //duckduckgo.com/l/?uddg=<encoded target>&rut=...
static RESULT_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"class="result__a"[^>]*href="([^"]+)""#).expect("result link pattern is valid")
});
static REDIRECT_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]uddg=([^&]+)").expect("redirect pattern is valid"));

/// DuckDuckGo HTML search (no API key required)
pub struct DuckDuckGoSearch {
    http_client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ai-chat-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http_client, endpoint: endpoint.into() })
    }

    /// Pull result URLs out of a DuckDuckGo HTML results page, in page order.
    pub fn extract_result_urls(html: &str, num_results: usize) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for caps in RESULT_LINK.captures_iter(html) {
            let href = html_escape::decode_html_entities(&caps[1]).into_owned();
            let target = match REDIRECT_TARGET.captures(&href) {
                Some(redirect) => match urlencoding::decode(&redirect[1]) {
                    Ok(decoded) => decoded.into_owned(),
                    Err(_) => continue,
                },
                None => href,
            };
            if !target.starts_with("http") || urls.contains(&target) {
                continue;
            }
            urls.push(target);
            if urls.len() >= num_results {
                break;
            }
        }
        urls
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<String>, SearchError> {
        let response = self.http_client.get(&self.endpoint).query(&[("q", query)]).send().await?;

        if !response.status().is_success() {
            return Err(SearchError::BadStatus(response.status().as_u16()));
        }

        let html = response.text().await?;
        if !html.contains("result") {
            return Err(SearchError::Parse("response is not a results page".to_string()));
        }
        Ok(Self::extract_result_urls(&html, num_results))
    }

    fn provider_name(&self) -> &str {
        "DuckDuckGo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    #[async_trait]
    impl SearchProvider for FailingProvider {
        async fn search(&self, _query: &str, _n: usize) -> Result<Vec<String>, SearchError> {
            Err(SearchError::BadStatus(503))
        }

        fn provider_name(&self) -> &str {
            "failing"
        }
    }

    struct FixedProvider(Vec<String>);

    #[async_trait]
    impl SearchProvider for FixedProvider {
        async fn search(&self, _query: &str, _n: usize) -> Result<Vec<String>, SearchError> {
            Ok(self.0.clone())
        }

        fn provider_name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_should_search_matches_keywords_case_insensitively() {
        assert!(should_search("what is the weather today", LanguageCode::En));
        assert!(should_search("LATEST iPhone", LanguageCode::En));
        assert!(should_search("Thời tiết Hà Nội", LanguageCode::Vi));
        assert!(should_search("今天天气怎么样", LanguageCode::Zh));
    }

    #[test]
    fn test_should_search_uses_resolved_language_list() {
        // "weather" is only an English keyword
        assert!(!should_search("weather", LanguageCode::Zh));
        assert!(!should_search("tell me a joke", LanguageCode::En));
        assert!(!should_search("", LanguageCode::En));
    }

    #[tokio::test]
    async fn test_fetch_swallows_provider_errors() {
        let urls = fetch_search_results(&FailingProvider, "news", 3).await;
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_truncates_to_requested_count() {
        let provider = FixedProvider((1..=5).map(|i| format!("https://r{}.example", i)).collect());
        let urls = fetch_search_results(&provider, "news", 3).await;
        assert_eq!(urls, vec!["https://r1.example", "https://r2.example", "https://r3.example"]);
    }

    #[test]
    fn test_extract_result_urls_decodes_redirects() {
        let html = r#"
            <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fnews%3Fid%3D1&amp;rut=abc">One</a>
            <a class="result__url" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fignored.example">skip</a>
            <a rel="nofollow" class="result__a" href="https://direct.example/page">Two</a>
            <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fnews%3Fid%3D1">Dup</a>
            <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fthird.example">Three</a>
            <a rel="nofollow" class="result__a" href="https://entities.example/?a=1&#38;b=2&amp;c=3">Four</a>
        "#;

        let urls = DuckDuckGoSearch::extract_result_urls(html, 10);
        assert_eq!(
            urls,
            vec![
                "https://example.com/news?id=1",
                "https://direct.example/page",
                "https://third.example",
                "https://entities.example/?a=1&b=2&c=3",
            ]
        );

        let limited = DuckDuckGoSearch::extract_result_urls(html, 1);
        assert_eq!(limited, vec!["https://example.com/news?id=1"]);
    }
}
