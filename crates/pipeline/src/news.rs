//! News service client.
//!
//! [`NewsSource`] is the seam the ingestor fetches through;
//! [`NewsApiClient`] is the production implementation against the
//! `/v2/everything` endpoint.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::Deserialize;
use veille_core::types::Timestamp;

use crate::config::NewsConfig;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    /// Network, TLS, timeout or body decode failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("News API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("NEWS_API_KEY is not configured")]
    MissingApiKey,
}

// ---------------------------------------------------------------------------
// Query and response
// ---------------------------------------------------------------------------

/// One search against the news service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    /// Search terms already joined with `+`.
    pub q: String,
    /// Lower bound on publication time.
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

impl NewsQuery {
    /// Query string parameters, excluding the API key.
    ///
    /// Form encoding turns spaces into `+`, so the `+`-joined terms are
    /// handed over space-separated to arrive as `q=a+b` on the wire.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", self.q.replace('+', " "))];
        if let Some(from) = self.from {
            params.push(("from", from.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(to) = self.to {
            params.push(("to", to.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        params
    }
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

/// An article as the news service returns it. Every field may be missing
/// or null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub url: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
}

/// An article with every default applied, ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub url: String,
    pub description: String,
    pub published_at: Timestamp,
    pub title: String,
    pub author: String,
}

impl RawArticle {
    /// Apply defaults. `now` stands in for a missing or unparseable
    /// publication time.
    pub fn normalize(self, now: Timestamp) -> Article {
        let published_at = self
            .published_at
            .as_deref()
            .and_then(parse_published_at)
            .unwrap_or(now);

        Article {
            url: self.url.unwrap_or_else(|| "No URL".to_string()),
            description: self
                .description
                .unwrap_or_else(|| "No description".to_string()),
            published_at,
            title: self.title.unwrap_or_else(|| "No Title".to_string()),
            author: self
                .author
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// RFC 3339, or an ISO-8601 local time without offset read as UTC.
fn parse_published_at(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// NewsSource
// ---------------------------------------------------------------------------

#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn search(&self, query: &NewsQuery) -> Result<Vec<RawArticle>, NewsError>;
}

pub struct NewsApiClient {
    client: reqwest::Client,
    config: NewsConfig,
}

impl NewsApiClient {
    pub fn new(config: NewsConfig) -> Result<Self, NewsError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn build_request(
        &self,
        query: &NewsQuery,
        api_key: &str,
    ) -> Result<reqwest::Request, reqwest::Error> {
        self.client
            .get(format!("{}/v2/everything", self.config.base_url))
            .query(&query.params())
            .query(&[("apiKey", api_key)])
            .build()
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn search(&self, query: &NewsQuery) -> Result<Vec<RawArticle>, NewsError> {
        let api_key = self.config.api_key.as_deref().ok_or(NewsError::MissingApiKey)?;

        let request = self.build_request(query, api_key)?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(NewsError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body: EverythingResponse = response.json().await?;
        Ok(body.articles)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn missing_fields_take_defaults() {
        let article = RawArticle::default().normalize(now());
        assert_eq!(article.url, "No URL");
        assert_eq!(article.description, "No description");
        assert_eq!(article.title, "No Title");
        assert_eq!(article.author, "Unknown");
        assert_eq!(article.published_at, now());
    }

    #[test]
    fn blank_author_is_unknown() {
        let raw = RawArticle {
            author: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(raw.normalize(now()).author, "Unknown");
    }

    #[test]
    fn published_at_is_parsed_as_rfc3339() {
        let raw = RawArticle {
            published_at: Some("2024-04-30T08:15:00+02:00".into()),
            ..Default::default()
        };
        assert_eq!(
            raw.normalize(now()).published_at,
            Utc.with_ymd_and_hms(2024, 4, 30, 6, 15, 0).unwrap()
        );
    }

    #[test]
    fn published_at_without_offset_is_utc() {
        let raw = RawArticle {
            published_at: Some("2024-04-30T08:15:00".into()),
            ..Default::default()
        };
        assert_eq!(
            raw.normalize(now()).published_at,
            Utc.with_ymd_and_hms(2024, 4, 30, 8, 15, 0).unwrap()
        );
    }

    #[test]
    fn unparseable_published_at_falls_back_to_now() {
        let raw = RawArticle {
            published_at: Some("yesterday".into()),
            ..Default::default()
        };
        assert_eq!(raw.normalize(now()).published_at, now());
    }

    #[test]
    fn response_decodes_null_fields() {
        let body = r#"{"status":"ok","articles":[
            {"url":"https://a.example","description":null,"publishedAt":"2024-04-30T08:15:00Z","title":"Breach","author":null}
        ]}"#;
        let parsed: EverythingResponse = serde_json::from_str(body).unwrap();
        let article = parsed.articles[0].clone().normalize(now());
        assert_eq!(article.url, "https://a.example");
        assert_eq!(article.description, "No description");
        assert_eq!(article.title, "Breach");
    }

    #[test]
    fn window_bounds_are_iso8601() {
        let query = NewsQuery {
            q: "bank+breach".into(),
            from: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            to: Some(now()),
        };
        assert_eq!(
            query.params(),
            vec![
                ("q", "bank breach".to_string()),
                ("from", "2024-01-01T00:00:00Z".to_string()),
                ("to", "2024-05-01T12:00:00Z".to_string()),
            ]
        );
    }

    fn client() -> NewsApiClient {
        NewsApiClient::new(NewsConfig {
            api_key: Some("k".into()),
            base_url: "https://newsapi.org".into(),
            timeout: std::time::Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn joined_terms_go_out_space_separated() {
        let query = NewsQuery {
            q: "bank+breach".into(),
            from: None,
            to: None,
        };
        let request = client().build_request(&query, "k").unwrap();
        assert_eq!(request.url().path(), "/v2/everything");
        assert_eq!(request.url().query(), Some("q=bank+breach&apiKey=k"));
    }

    #[test]
    fn single_term_query_is_unchanged() {
        let query = NewsQuery {
            q: "ransomware".into(),
            from: None,
            to: None,
        };
        let request = client().build_request(&query, "k").unwrap();
        assert_eq!(request.url().query(), Some("q=ransomware&apiKey=k"));
    }
}
