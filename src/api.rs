use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Article, BackendStatistics, FilterConfig, Source, UpdateSummary};

const USER_AGENT: &str = concat!("cybernews/", env!("CARGO_PKG_VERSION"), " (Rust; TUI)");

/// Remote operations the store and the CLI rely on.
#[async_trait]
pub trait NewsService: Send + Sync {
    async fn list_articles(&self, filter: &FilterConfig) -> Result<Vec<Article>>;
    async fn trigger_update(&self) -> Result<UpdateSummary>;
    async fn list_sources(&self) -> Result<Vec<Source>>;
    async fn fetch_statistics(&self) -> Result<BackendStatistics>;
}

/// Every backend response shares this envelope. It is only decoded for 2xx
/// responses; `success: false` inside it is an application failure.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Deserialize)]
struct NewsBody {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct SourcesBody {
    #[serde(default)]
    sources: Vec<Source>,
}

#[derive(Debug, Deserialize)]
struct StatisticsBody {
    #[serde(default)]
    statistics: Option<BackendStatistics>,
}

/// Query pairs for `GET /api/news`; the category is left out when empty.
pub fn news_query(filter: &FilterConfig) -> Vec<(&'static str, String)> {
    let mut query = vec![("days", filter.days_back.to_string())];
    if !filter.category.is_empty() {
        query.push(("categories", filter.category.clone()));
    }
    query.push(("limit", filter.limit.to_string()));
    query
}

#[derive(Debug, Clone)]
pub struct NewsClient {
    client: Client,
    base_url: String,
}

impl NewsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("could not build HTTP client: {e}")))?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends `request` and applies the transport check, then the
    /// application check, returning the envelope body.
    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder, action: &str) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            warn!(action, error = %e, "request failed");
            Error::Transport(format!("Failed to {action}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let reason = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_u16().to_string());
            warn!(action, %status, "backend returned non-success status");
            return Err(Error::Transport(format!("Failed to {action}: {reason}")));
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            warn!(action, error = %e, "could not decode response body");
            Error::Transport(format!("Failed to {action}: invalid response body ({e})"))
        })?;

        if !envelope.success {
            let message = envelope
                .error
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("Failed to {action}"));
            warn!(action, %message, "backend reported failure");
            return Err(Error::Application(message));
        }

        Ok(envelope.body)
    }
}

#[async_trait]
impl NewsService for NewsClient {
    async fn list_articles(&self, filter: &FilterConfig) -> Result<Vec<Article>> {
        let query = news_query(filter);
        debug!(?query, "GET /api/news");
        let request = self.client.get(self.endpoint("/api/news")).query(&query);
        let body: NewsBody = self.call(request, "fetch news").await?;
        Ok(body.articles)
    }

    async fn trigger_update(&self) -> Result<UpdateSummary> {
        debug!("POST /api/update");
        let request = self.client.post(self.endpoint("/api/update"));
        self.call(request, "update news").await
    }

    async fn list_sources(&self) -> Result<Vec<Source>> {
        debug!("GET /api/sources");
        let request = self.client.get(self.endpoint("/api/sources"));
        let body: SourcesBody = self.call(request, "fetch sources").await?;
        Ok(body.sources)
    }

    async fn fetch_statistics(&self) -> Result<BackendStatistics> {
        debug!("GET /api/statistics");
        let request = self.client.get(self.endpoint("/api/statistics"));
        let body: StatisticsBody = self.call(request, "fetch statistics").await?;
        body.statistics
            .ok_or_else(|| Error::Application("Failed to fetch statistics".to_string()))
    }
}
