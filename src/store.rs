//! Session state for the news client: filter, current articles and fetch status.
//!
//! Every `load`/`update` stamps a generation number when it starts. A result
//! is applied only if no newer operation has started in the meantime, so the
//! most recently initiated operation always determines the final state.

use std::io;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::NewsService;
use crate::error::{Error, Result};
use crate::export;
use crate::model::{Article, FilterConfig, FilterPatch, UpdateSummary};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// What a `load` did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    Failed(String),
    /// A newer operation started before this one finished; its result was dropped.
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    pub summary: UpdateSummary,
    pub load: LoadOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub filter: FilterConfig,
    pub articles: Vec<Article>,
    pub status: FetchStatus,
}

#[derive(Debug, Default)]
struct StoreState {
    filter: FilterConfig,
    articles: Vec<Article>,
    status: FetchStatus,
    generation: u64,
}

pub struct NewsStore<S> {
    service: S,
    state: Mutex<StoreState>,
}

impl<S: NewsService> NewsStore<S> {
    pub fn new(service: S) -> Self {
        Self::with_filter(service, FilterConfig::default())
    }

    pub fn with_filter(service: S, filter: FilterConfig) -> Self {
        Self {
            service,
            state: Mutex::new(StoreState { filter, ..StoreState::default() }),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Merges `patch` into the filter. Does not fetch.
    pub async fn set_filter(&self, patch: FilterPatch) {
        let mut state = self.state.lock().await;
        state.filter.merge(patch);
        debug!(filter = ?state.filter, "filter changed");
    }

    pub async fn filter(&self) -> FilterConfig {
        self.state.lock().await.filter.clone()
    }

    pub async fn articles(&self) -> Vec<Article> {
        self.state.lock().await.articles.clone()
    }

    pub async fn status(&self) -> FetchStatus {
        self.state.lock().await.status.clone()
    }

    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().await;
        Snapshot {
            filter: state.filter.clone(),
            articles: state.articles.clone(),
            status: state.status.clone(),
        }
    }

    /// Starts a new operation: bumps the generation and enters `Loading`.
    async fn begin(&self) -> (u64, FilterConfig) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.status = FetchStatus::Loading;
        (state.generation, state.filter.clone())
    }

    /// Fetches articles for the current filter. Failures end up in the
    /// status, never in the return value's error channel.
    pub async fn load(&self) -> LoadOutcome {
        let (generation, filter) = self.begin().await;
        let result = self.service.list_articles(&filter).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(generation, latest = state.generation, "discarding stale load result");
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(articles) => {
                let count = articles.len();
                state.articles = articles;
                state.status = FetchStatus::Success;
                info!(count, filter = ?filter, "articles loaded");
                LoadOutcome::Loaded(count)
            }
            Err(e) => {
                let message = e.message();
                warn!(error = %message, "loading articles failed");
                state.status = FetchStatus::Error(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Asks the backend to refresh its sources, then reloads. A failed
    /// trigger is recorded in the status and returned to the caller.
    pub async fn update(&self) -> Result<UpdateReport> {
        let (generation, _) = self.begin().await;

        let summary = match self.service.trigger_update().await {
            Ok(summary) => summary,
            Err(e) => {
                let mut state = self.state.lock().await;
                if state.generation == generation {
                    state.status = FetchStatus::Error(e.message());
                }
                warn!(error = %e, "update failed");
                return Err(e);
            }
        };

        info!(message = %summary.message, count = summary.article_count, "backend update finished");
        let load = self.load().await;
        Ok(UpdateReport { summary, load })
    }

    /// Exports the current articles into `dir`. Refuses when there is
    /// nothing loaded.
    pub async fn export_current(&self, dir: &Path) -> Result<PathBuf> {
        let articles = self.articles().await;
        if articles.is_empty() {
            return Err(Error::EmptyExport);
        }
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || export::export_to_dir(&articles, &dir))
            .await
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::Other, e)))?
    }
}
