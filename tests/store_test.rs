use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use cybernews::api::NewsService;
use cybernews::model::{Article, BackendStatistics, FilterConfig, FilterPatch, Source, UpdateSummary};
use cybernews::store::{FetchStatus, LoadOutcome, NewsStore};
use cybernews::{Error, Result};
use serde_json::Number;
use tokio::sync::oneshot;

fn article(id: &str, source: &str, score: i64) -> Article {
    Article {
        id: id.into(),
        title: format!("Article {id}"),
        url: format!("https://example.com/{id}"),
        source: source.into(),
        category: "threats".into(),
        published_date: "2024-01-15T10:30:00".into(),
        summary: String::new(),
        keywords: vec![],
        priority_score: Number::from(score),
        received: None,
    }
}

/// In-memory backend. Each `list_articles` call takes the next scripted
/// response; gated responses wait until the test releases them.
#[derive(Default)]
struct FakeService {
    responses: Mutex<VecDeque<Response>>,
    updates: Mutex<VecDeque<UpdateResponse>>,
    seen_filters: Mutex<Vec<FilterConfig>>,
}

enum Response {
    Ready(Result<Vec<Article>>),
    Gated(oneshot::Receiver<Result<Vec<Article>>>),
}

enum UpdateResponse {
    Ready(Result<UpdateSummary>),
    Gated(oneshot::Receiver<Result<UpdateSummary>>),
}

impl FakeService {
    fn respond(self, r: Result<Vec<Article>>) -> Self {
        self.responses.lock().unwrap().push_back(Response::Ready(r));
        self
    }

    fn gated(self) -> (Self, oneshot::Sender<Result<Vec<Article>>>) {
        let (tx, rx) = oneshot::channel();
        self.responses.lock().unwrap().push_back(Response::Gated(rx));
        (self, tx)
    }

    fn update_result(self, r: Result<UpdateSummary>) -> Self {
        self.updates.lock().unwrap().push_back(UpdateResponse::Ready(r));
        self
    }

    fn gated_update(self) -> (Self, oneshot::Sender<Result<UpdateSummary>>) {
        let (tx, rx) = oneshot::channel();
        self.updates.lock().unwrap().push_back(UpdateResponse::Gated(rx));
        (self, tx)
    }

    fn seen_filters(&self) -> Vec<FilterConfig> {
        self.seen_filters.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsService for FakeService {
    async fn list_articles(&self, filter: &FilterConfig) -> Result<Vec<Article>> {
        self.seen_filters.lock().unwrap().push(filter.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Response::Ready(r)) => r,
            Some(Response::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(Error::Transport("gate dropped".into()))),
            None => Err(Error::Transport("no scripted response".into())),
        }
    }

    async fn trigger_update(&self) -> Result<UpdateSummary> {
        let next = self.updates.lock().unwrap().pop_front();
        match next {
            Some(UpdateResponse::Ready(r)) => r,
            Some(UpdateResponse::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(Error::Transport("gate dropped".into()))),
            None => Err(Error::Transport("no scripted update".into())),
        }
    }

    async fn list_sources(&self) -> Result<Vec<Source>> {
        Ok(vec![])
    }

    async fn fetch_statistics(&self) -> Result<BackendStatistics> {
        Err(Error::Application("not scripted".into()))
    }
}

fn ids(articles: &[Article]) -> Vec<&str> {
    articles.iter().map(|a| a.id.as_str()).collect()
}

#[tokio::test]
async fn test_new_store_is_idle_with_default_filter() {
    let store = NewsStore::new(FakeService::default());
    assert_eq!(store.status().await, FetchStatus::Idle);
    assert_eq!(store.filter().await, FilterConfig { days_back: 1, category: String::new(), limit: 50 });
    assert!(store.articles().await.is_empty());
}

#[tokio::test]
async fn test_set_filter_merges_without_fetching() {
    let service = FakeService::default();
    let store = NewsStore::with_filter(
        service,
        FilterConfig { days_back: 3, category: String::new(), limit: 50 },
    );

    store.set_filter(FilterPatch::category("x")).await;

    assert_eq!(store.filter().await, FilterConfig { days_back: 3, category: "x".into(), limit: 50 });
    assert!(store.service().seen_filters().is_empty());
    assert_eq!(store.status().await, FetchStatus::Idle);
}

#[tokio::test]
async fn test_set_filter_passes_out_of_range_values_through() {
    let service = FakeService::default().respond(Ok(vec![]));
    let store = NewsStore::new(service);

    store
        .set_filter(FilterPatch { days_back: Some(30), category: Some("unknown".into()), limit: Some(100_000) })
        .await;
    store.load().await;

    assert_eq!(
        store.service().seen_filters(),
        vec![FilterConfig { days_back: 30, category: "unknown".into(), limit: 100_000 }]
    );
}

#[tokio::test]
async fn test_load_success_replaces_articles() {
    let service = FakeService::default()
        .respond(Ok(vec![article("a", "s1", 1)]))
        .respond(Ok(vec![article("b", "s1", 1), article("c", "s2", 1)]));
    let store = NewsStore::new(service);

    assert_eq!(store.load().await, LoadOutcome::Loaded(1));
    assert_eq!(store.load().await, LoadOutcome::Loaded(2));

    assert_eq!(store.status().await, FetchStatus::Success);
    assert_eq!(ids(&store.articles().await), vec!["b", "c"]);
}

#[tokio::test]
async fn test_load_failure_keeps_stale_articles() {
    let service = FakeService::default()
        .respond(Ok(vec![article("a", "s1", 1)]))
        .respond(Err(Error::Transport("Failed to fetch news: Internal Server Error".into())));
    let store = NewsStore::new(service);

    store.load().await;
    let outcome = store.load().await;

    assert_eq!(outcome, LoadOutcome::Failed("Failed to fetch news: Internal Server Error".into()));
    assert_eq!(
        store.status().await,
        FetchStatus::Error("Failed to fetch news: Internal Server Error".into())
    );
    assert_eq!(ids(&store.articles().await), vec!["a"]);
}

#[tokio::test]
async fn test_application_failure_message_reaches_status() {
    let service = FakeService::default().respond(Err(Error::Application("rate limited".into())));
    let store = NewsStore::new(service);

    store.load().await;

    assert_eq!(store.status().await.error_message(), Some("rate limited"));
}

#[tokio::test]
async fn test_status_is_loading_while_in_flight_then_terminal() {
    let (service, gate) = FakeService::default().gated();
    let store = NewsStore::new(service);

    let (outcome, observed) = tokio::join!(store.load(), async {
        let during = store.status().await;
        gate.send(Ok(vec![])).ok();
        during
    });

    assert_eq!(observed, FetchStatus::Loading);
    assert_eq!(outcome, LoadOutcome::Loaded(0));
    assert_eq!(store.status().await, FetchStatus::Success);
}

#[tokio::test]
async fn test_new_load_clears_previous_error() {
    let (service, gate) = FakeService::default()
        .respond(Err(Error::Application("down".into())))
        .gated();
    let store = NewsStore::new(service);

    store.load().await;
    assert!(store.status().await.error_message().is_some());

    let (_, during) = tokio::join!(store.load(), async {
        let s = store.status().await;
        gate.send(Ok(vec![])).ok();
        s
    });
    assert_eq!(during, FetchStatus::Loading);
    assert_eq!(store.status().await, FetchStatus::Success);
}

#[tokio::test]
async fn test_latest_load_wins_when_older_response_arrives_last() {
    let (service, first_gate) = FakeService::default().gated();
    let (service, second_gate) = service.gated();
    let store = NewsStore::new(service);

    let (first, second, ()) = tokio::join!(
        store.load(),
        async {
            store.set_filter(FilterPatch::category("threats")).await;
            store.load().await
        },
        async {
            second_gate.send(Ok(vec![article("new", "s", 1)])).ok();
            tokio::task::yield_now().await;
            first_gate.send(Ok(vec![article("old", "s", 1)])).ok();
        }
    );

    assert_eq!(first, LoadOutcome::Superseded);
    assert_eq!(second, LoadOutcome::Loaded(1));
    assert_eq!(ids(&store.articles().await), vec!["new"]);
    assert_eq!(store.status().await, FetchStatus::Success);

    let filters = store.service().seen_filters();
    assert_eq!(filters[0].category, "");
    assert_eq!(filters[1].category, "threats");
}

#[tokio::test]
async fn test_latest_load_wins_when_older_response_arrives_first() {
    let (service, first_gate) = FakeService::default().gated();
    let (service, second_gate) = service.gated();
    let store = NewsStore::new(service);

    let (first, second, ()) = tokio::join!(
        store.load(),
        async {
            store.set_filter(FilterPatch::days_back(7)).await;
            store.load().await
        },
        async {
            first_gate.send(Ok(vec![article("old", "s", 1)])).ok();
            tokio::task::yield_now().await;
            second_gate.send(Ok(vec![article("new", "s", 1)])).ok();
        }
    );

    assert_eq!(first, LoadOutcome::Superseded);
    assert_eq!(second, LoadOutcome::Loaded(1));
    assert_eq!(ids(&store.articles().await), vec!["new"]);
}

#[tokio::test]
async fn test_stale_failure_does_not_override_newer_success() {
    let (service, first_gate) = FakeService::default().gated();
    let (service, second_gate) = service.gated();
    let store = NewsStore::new(service);

    tokio::join!(store.load(), store.load(), async {
        second_gate.send(Ok(vec![article("fresh", "s", 1)])).ok();
        tokio::task::yield_now().await;
        first_gate.send(Err(Error::Transport("late failure".into()))).ok();
    });

    assert_eq!(store.status().await, FetchStatus::Success);
    assert_eq!(ids(&store.articles().await), vec!["fresh"]);
}

#[tokio::test]
async fn test_update_success_reloads() {
    let service = FakeService::default()
        .update_result(Ok(UpdateSummary { message: "Successfully updated 2 articles".into(), article_count: 2 }))
        .respond(Ok(vec![article("a", "s1", 25), article("b", "s2", 15)]));
    let store = NewsStore::new(service);

    let report = store.update().await.unwrap();

    assert_eq!(report.summary.article_count, 2);
    assert_eq!(report.load, LoadOutcome::Loaded(2));
    assert_eq!(store.status().await, FetchStatus::Success);
    assert_eq!(store.service().seen_filters().len(), 1);
}

#[tokio::test]
async fn test_update_failure_sets_status_and_reaches_caller() {
    let service = FakeService::default()
        .respond(Ok(vec![article("a", "s1", 1)]))
        .update_result(Err(Error::Application("update already running".into())));
    let store = NewsStore::new(service);
    store.load().await;

    let err = store.update().await.unwrap_err();

    assert!(matches!(err, Error::Application(ref m) if m == "update already running"));
    assert_eq!(store.status().await, FetchStatus::Error("update already running".into()));
    assert_eq!(ids(&store.articles().await), vec!["a"]);
    // no reload after a failed trigger
    assert_eq!(store.service().seen_filters().len(), 1);
}

#[tokio::test]
async fn test_update_with_failing_reload_still_succeeds() {
    let service = FakeService::default()
        .update_result(Ok(UpdateSummary::default()))
        .respond(Err(Error::Transport("Failed to fetch news: Bad Gateway".into())));
    let store = NewsStore::new(service);

    let report = store.update().await.unwrap();

    assert!(matches!(report.load, LoadOutcome::Failed(_)));
    assert_eq!(store.status().await.error_message(), Some("Failed to fetch news: Bad Gateway"));
}

#[tokio::test]
async fn test_load_during_update_is_overtaken_by_update_reload() {
    let (service, trigger_gate) = FakeService::default().gated_update();
    let service = service
        .respond(Ok(vec![article("during", "s", 1)]))
        .respond(Ok(vec![article("after-update", "s", 1)]));
    let store = NewsStore::new(service);

    let (report, during, ()) = tokio::join!(store.update(), store.load(), async {
        trigger_gate
            .send(Ok(UpdateSummary { message: "Successfully updated 1 articles".into(), article_count: 1 }))
            .ok();
    });

    // the load started while the trigger was in flight and applied first
    assert_eq!(during, LoadOutcome::Loaded(1));
    // the reload after the trigger started later, so it decides the final state
    let report = report.unwrap();
    assert_eq!(report.load, LoadOutcome::Loaded(1));
    assert_eq!(ids(&store.articles().await), vec!["after-update"]);
    assert_eq!(store.status().await, FetchStatus::Success);
}

#[tokio::test]
async fn test_failed_update_does_not_clobber_newer_load() {
    let (service, trigger_gate) = FakeService::default().gated_update();
    let service = service.respond(Ok(vec![article("fresh", "s", 1)]));
    let store = NewsStore::new(service);

    let (update, load, ()) = tokio::join!(store.update(), store.load(), async {
        trigger_gate.send(Err(Error::Application("update already running".into()))).ok();
    });

    // the caller still sees the failure
    assert!(matches!(update, Err(Error::Application(ref m)) if m == "update already running"));
    assert_eq!(load, LoadOutcome::Loaded(1));
    // but the newer load owns the status
    assert_eq!(store.status().await, FetchStatus::Success);
    assert_eq!(ids(&store.articles().await), vec!["fresh"]);
    assert_eq!(store.service().seen_filters().len(), 1);
}

#[tokio::test]
async fn test_export_with_no_articles_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let store = NewsStore::new(FakeService::default());

    let err = store.export_current(dir.path()).await.unwrap_err();

    assert!(matches!(err, Error::EmptyExport));
    assert_eq!(err.message(), "No articles to export. Load news first.");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(store.status().await, FetchStatus::Idle);
}

#[tokio::test]
async fn test_export_writes_current_articles() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::default().respond(Ok(vec![article("a", "s1", 25), article("b", "s2", 5)]));
    let store = NewsStore::new(service);
    store.load().await;

    let path = store.export_current(dir.path()).await.unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("cybernews_export_") && name.ends_with(".json"));
    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, serde_json::to_value(store.articles().await).unwrap());
    assert_eq!(written[0]["id"], "a");
    assert_eq!(store.status().await, FetchStatus::Success);
}
