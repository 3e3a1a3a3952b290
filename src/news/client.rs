use std::time::Duration;

use axum::async_trait;
use serde::Deserialize;
use tracing::debug;

const TOP_HEADLINES_URL: &str = "https://newsapi.org/v2/top-headlines";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// One headline as the upstream provider reports it. Everything is optional;
/// the importer decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "urlToImage")]
    pub url_to_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HeadlinesResponse {
    #[serde(default)]
    articles: Vec<ExternalArticle>,
}

/// Upstream failure kinds, kept distinct so callers can report them apart.
#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("Failed to reach the news provider: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("News provider returned HTTP {status}: {details}")]
    Status { status: u16, details: String },
    #[error("No articles found")]
    Empty,
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Top headlines for a provider category, at most `count` items.
    async fn top_headlines(
        &self,
        api_key: &str,
        category: &str,
        count: i64,
    ) -> Result<Vec<ExternalArticle>, NewsError>;
}

pub struct NewsApiClient {
    http: reqwest::Client,
}

impl NewsApiClient {
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("newsdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn top_headlines(
        &self,
        api_key: &str,
        category: &str,
        count: i64,
    ) -> Result<Vec<ExternalArticle>, NewsError> {
        let page_size = count.to_string();
        let response = self
            .http
            .get(TOP_HEADLINES_URL)
            .header("X-Api-Key", api_key)
            .query(&[
                ("category", category),
                ("pageSize", page_size.as_str()),
                ("language", "en"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let details = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str().map(String::from)))
                .unwrap_or(body);
            return Err(NewsError::Status {
                status: status.as_u16(),
                details,
            });
        }

        let payload: HeadlinesResponse = response.json().await?;
        debug!(category, count = payload.articles.len(), "fetched headlines");
        Ok(payload.articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_provider_payload() {
        let json = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {
                    "source": {"id": null, "name": "Example"},
                    "author": "Jane Doe",
                    "title": "Quantum Breakthrough",
                    "description": "Scientists achieve a milestone",
                    "url": "https://example.com/quantum",
                    "urlToImage": "https://example.com/quantum.jpg",
                    "publishedAt": "2024-05-01T12:00:00Z",
                    "content": "Scientists achieve quantum computing milestone..."
                },
                {"title": null, "description": null}
            ]
        }"#;
        let payload: HeadlinesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(payload.articles.len(), 2);
        assert_eq!(
            payload.articles[0].url_to_image.as_deref(),
            Some("https://example.com/quantum.jpg")
        );
        assert!(payload.articles[1].title.is_none());
    }

    #[test]
    fn missing_articles_field_defaults_to_empty() {
        let payload: HeadlinesResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert!(payload.articles.is_empty());
    }

    #[test]
    fn error_kinds_stay_distinct_in_messages() {
        let status = NewsError::Status {
            status: 401,
            details: "Your API key is invalid".into(),
        };
        assert!(status.to_string().contains("401"));
        assert_eq!(NewsError::Empty.to_string(), "No articles found");
    }
}
