//! Accident Chart Component
//!
//! Mount lifecycle for the accidents/deaths chart: two concurrent cached
//! queries feed a single reducer task, which publishes the current
//! [`ViewState`] on a watch channel.
//!
//! ```text
//! fetch accidents ─┐
//!                  ├─► reducer (ViewModelBuilder) ─► watch<ViewState> ─► render
//! fetch deaths ────┘
//! ```
//!
//! Dropping the component aborts whatever is still in flight.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::{ChartConfig, Config};
use crate::data::AccidentDataByMonth;
use crate::fetch::{FetchError, HttpSource, MonthlySource, QueryCache, QueryKey};
use crate::render::{render, RenderedView};
use crate::view::{QueryState, ViewModelBuilder, ViewState};

/// Cache key prefix of the accidents query
pub const ACCIDENTS_QUERY: &str = "accidentsChartData";

/// Cache key prefix of the deaths query
pub const DEATHS_QUERY: &str = "deathChartData";

/// Services injected into every chart instance
#[derive(Clone)]
pub struct ChartDeps {
    pub cache: QueryCache<AccidentDataByMonth>,
    pub source: Arc<dyn MonthlySource>,
}

impl ChartDeps {
    pub fn new(cache: QueryCache<AccidentDataByMonth>, source: Arc<dyn MonthlySource>) -> Self {
        Self { cache, source }
    }

    /// Fresh cache plus an HTTP source using the configured timeout
    pub fn http(config: &Config) -> Result<Self, FetchError> {
        let source = HttpSource::new(config.source.request_timeout())?;
        Ok(Self::new(QueryCache::new(), Arc::new(source)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Query {
    Accidents,
    Deaths,
}

struct QueryPlan {
    query: Query,
    key: QueryKey,
    url: String,
}

type QueryUpdate = (Query, QueryState<AccidentDataByMonth>);

/// A mounted chart instance
pub struct AccidentChart {
    state: watch::Receiver<ViewState>,
    chart: ChartConfig,
    tasks: Vec<JoinHandle<()>>,
}

impl AccidentChart {
    /// Mount the chart and start both queries
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount(deps: &ChartDeps, config: &Config) -> Self {
        let source_config = &config.source;
        let period = source_config.period.as_str();

        let accidents = QueryPlan {
            query: Query::Accidents,
            key: QueryKey::new([ACCIDENTS_QUERY, period]),
            url: source_config.accidents_url(),
        };
        let deaths = QueryPlan {
            query: Query::Deaths,
            key: QueryKey::new([DEATHS_QUERY, period]),
            url: source_config.deaths_url(),
        };

        if accidents.url == deaths.url {
            tracing::debug!(
                url = %deaths.url,
                "Deaths query repeats the accidents endpoint; its payload is not used for the chart"
            );
        }

        tracing::debug!(%period, "Mounting accident chart");

        let (state_tx, state_rx) = watch::channel(ViewState::Loading);
        let (update_tx, update_rx) = mpsc::channel(2);
        let timeout = source_config.request_timeout();

        let tasks = vec![
            tokio::spawn(reduce_updates(update_rx, state_tx)),
            tokio::spawn(run_query(
                deps.cache.clone(),
                Arc::clone(&deps.source),
                accidents,
                timeout,
                update_tx.clone(),
            )),
            tokio::spawn(run_query(
                deps.cache.clone(),
                Arc::clone(&deps.source),
                deaths,
                timeout,
                update_tx,
            )),
        ];

        Self {
            state: state_rx,
            chart: config.chart.clone(),
            tasks,
        }
    }

    /// Current view state
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every view state change
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    /// Wait until the view leaves `Loading`
    ///
    /// Returns the last published state if the reducer stops first.
    pub async fn settled(&self) -> ViewState {
        let mut rx = self.state.clone();
        let result = rx.wait_for(|state| !state.is_loading()).await.map(|s| s.clone());
        match result {
            Ok(state) => state,
            Err(_) => rx.borrow().clone(),
        }
    }

    /// Render the current state
    pub fn render(&self) -> RenderedView {
        render(&self.state.borrow(), &self.chart)
    }

    /// Tear down the chart, cancelling in-flight queries
    pub fn unmount(self) {
        tracing::debug!("Unmounting accident chart");
    }
}

impl Drop for AccidentChart {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Mount a chart over HTTP, wait for it to settle and render the result
///
/// A failed fetch is not an error here: it renders as the error view.
pub async fn fetch_and_render(config: &Config) -> crate::Result<RenderedView> {
    let deps = ChartDeps::http(config)?;
    let chart = AccidentChart::mount(&deps, config);
    chart.settled().await;

    let view = chart.render();
    chart.unmount();
    Ok(view)
}

/// Resolve one query through the cache and report its settled state
async fn run_query(
    cache: QueryCache<AccidentDataByMonth>,
    source: Arc<dyn MonthlySource>,
    plan: QueryPlan,
    timeout: Duration,
    updates: mpsc::Sender<QueryUpdate>,
) {
    let url = plan.url.clone();
    let result = cache
        .get_or_fetch(&plan.key, move || async move {
            match tokio::time::timeout(timeout, source.fetch(&url)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout),
            }
        })
        .await;

    let state = match result {
        Ok(data) => QueryState::Settled(data),
        Err(e) => {
            tracing::warn!(
                url = %plan.url,
                kind = failure_kind(&e),
                error = %e,
                "Monthly statistics query failed"
            );
            QueryState::Failed(e.to_string())
        }
    };

    // The reducer is gone only if the chart was unmounted
    let _ = updates.send((plan.query, state)).await;
}

fn failure_kind(e: &FetchError) -> &'static str {
    if e.is_decode() {
        "decode"
    } else {
        "transport"
    }
}

/// Fold query updates into view states, one at a time
async fn reduce_updates(mut updates: mpsc::Receiver<QueryUpdate>, state: watch::Sender<ViewState>) {
    let mut builder = ViewModelBuilder::new();
    let mut accidents = QueryState::Pending;
    let mut deaths = QueryState::Pending;

    while let Some((query, update)) = updates.recv().await {
        match query {
            Query::Accidents => accidents = update,
            Query::Deaths => deaths = update,
        }

        let view = builder.reduce(&accidents, &deaths);
        match &view {
            ViewState::Loading => {}
            ViewState::Error => tracing::warn!(
                accidents_failed = accidents.is_failed(),
                deaths_failed = deaths.is_failed(),
                "Accident chart failed to load"
            ),
            ViewState::Ready(model) => tracing::info!(
                months = model.categories.len(),
                "Accident chart ready"
            ),
        }
        state.send_replace(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MonthlyAccidentRecord, MonthlyDeathRecord};
    use crate::fetch::QueryStatus;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ACCIDENTS_URL: &str = "http://stats.test/api/accidents_by_month";
    const DEATHS_URL: &str = "http://stats.test/api/deaths_by_month";

    #[derive(Clone)]
    enum Behavior {
        Respond(AccidentDataByMonth),
        Fail,
        Hang,
    }

    struct MockSource {
        calls: AtomicUsize,
        behaviors: HashMap<String, Behavior>,
    }

    impl MockSource {
        fn new(accidents: Behavior, deaths: Behavior) -> Arc<Self> {
            let mut behaviors = HashMap::new();
            behaviors.insert(ACCIDENTS_URL.to_string(), accidents);
            behaviors.insert(DEATHS_URL.to_string(), deaths);
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                behaviors,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MonthlySource for MockSource {
        async fn fetch(&self, url: &str) -> Result<AccidentDataByMonth, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviors.get(url).cloned() {
                Some(Behavior::Respond(data)) => Ok(data),
                Some(Behavior::Fail) | None => Err(FetchError::Unavailable),
                Some(Behavior::Hang) => std::future::pending().await,
            }
        }
    }

    fn payload() -> AccidentDataByMonth {
        AccidentDataByMonth::new(
            vec![MonthlyAccidentRecord::new("2023-01", 10)],
            vec![MonthlyDeathRecord::new("2023-01", 2)],
        )
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.source.base_url = "http://stats.test".to_string();
        config.source.deaths_path = "/api/deaths_by_month".to_string();
        config
    }

    fn deps(source: Arc<MockSource>) -> ChartDeps {
        ChartDeps::new(QueryCache::new(), source)
    }

    async fn wait_for_calls(source: &MockSource, n: usize) {
        for _ in 0..200 {
            if source.calls() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {} fetch calls, saw {}", n, source.calls());
    }

    #[tokio::test]
    async fn test_pending_renders_loading() {
        let source = MockSource::new(Behavior::Hang, Behavior::Hang);
        let chart = AccidentChart::mount(&deps(Arc::clone(&source)), &config());

        wait_for_calls(&source, 2).await;
        assert_eq!(chart.state(), ViewState::Loading);
        assert!(matches!(chart.render(), RenderedView::Loading));
    }

    #[tokio::test]
    async fn test_ready_with_both_series() {
        let source = MockSource::new(
            Behavior::Respond(payload()),
            Behavior::Respond(AccidentDataByMonth::default()),
        );
        let chart = AccidentChart::mount(&deps(source), &config());

        let state = chart.settled().await;
        let model = state.model().expect("ready");
        assert_eq!(model.series[0].name, "Total accidents");
        assert_eq!(model.series[0].data, vec![10.0]);
        assert_eq!(model.series[1].name, "Total deaths");
        assert_eq!(model.series[1].data, vec![2.0]);
        assert_eq!(model.categories, vec!["2023-01"]);
        assert!(chart.render().is_chart());
    }

    #[tokio::test]
    async fn test_deaths_failure_is_error() {
        let source = MockSource::new(Behavior::Respond(payload()), Behavior::Fail);
        let chart = AccidentChart::mount(&deps(source), &config());

        assert_eq!(chart.settled().await, ViewState::Error);
        assert!(matches!(chart.render(), RenderedView::Error { .. }));
    }

    #[tokio::test]
    async fn test_accidents_failure_is_error() {
        let source = MockSource::new(Behavior::Fail, Behavior::Respond(payload()));
        let chart = AccidentChart::mount(&deps(source), &config());

        assert_eq!(chart.settled().await, ViewState::Error);
    }

    #[tokio::test]
    async fn test_failure_waits_for_pending_query() {
        let source = MockSource::new(Behavior::Fail, Behavior::Hang);
        let chart = AccidentChart::mount(&deps(Arc::clone(&source)), &config());

        wait_for_calls(&source, 2).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(chart.state(), ViewState::Loading);
    }

    #[tokio::test]
    async fn test_timeout_settles_as_error() {
        let source = MockSource::new(Behavior::Hang, Behavior::Respond(payload()));
        let mut config = config();
        config.source.request_timeout_ms = 30;

        let chart = AccidentChart::mount(&deps(source), &config);
        assert_eq!(chart.settled().await, ViewState::Error);
    }

    #[tokio::test]
    async fn test_second_mount_reuses_cache() {
        let source = MockSource::new(
            Behavior::Respond(payload()),
            Behavior::Respond(payload()),
        );
        let deps = deps(Arc::clone(&source));

        let first = AccidentChart::mount(&deps, &config());
        let first_state = first.settled().await;
        first.unmount();
        assert_eq!(source.calls(), 2);

        let second = AccidentChart::mount(&deps, &config());
        let second_state = second.settled().await;
        assert_eq!(second_state, first_state);
        assert_eq!(source.calls(), 2);

        let key = QueryKey::new([ACCIDENTS_QUERY, "2023"]);
        assert_eq!(deps.cache.fetch_count(&key), 1);
        assert_eq!(
            deps.cache.fetch_count(&QueryKey::new([DEATHS_QUERY, "2023"])),
            1
        );
    }

    #[tokio::test]
    async fn test_concurrent_mounts_fetch_once_per_key() {
        let source = MockSource::new(
            Behavior::Respond(payload()),
            Behavior::Respond(payload()),
        );
        let deps = deps(Arc::clone(&source));

        let a = AccidentChart::mount(&deps, &config());
        let b = AccidentChart::mount(&deps, &config());
        let (sa, sb) = tokio::join!(a.settled(), b.settled());

        assert!(sa.model().is_some());
        assert_eq!(sa, sb);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_unmount_cancels_in_flight_queries() {
        let source = MockSource::new(Behavior::Hang, Behavior::Hang);
        let deps = deps(Arc::clone(&source));
        let chart = AccidentChart::mount(&deps, &config());
        let mut rx = chart.subscribe();

        wait_for_calls(&source, 2).await;
        let key = QueryKey::new([ACCIDENTS_QUERY, "2023"]);
        assert_eq!(deps.cache.entry(&key).unwrap().status, QueryStatus::Pending);

        chart.unmount();

        // Reducer exits, closing the channel
        assert!(rx.changed().await.is_err());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(deps.cache.entry(&key).is_none());
    }

    #[tokio::test]
    async fn test_fetch_and_render_unreachable_api() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut config = Config::default();
        config.source.base_url = format!("http://{}", addr);
        config.source.request_timeout_ms = 2000;

        let view = fetch_and_render(&config).await.unwrap();
        assert!(matches!(view, RenderedView::Error { .. }));
    }

    #[tokio::test]
    async fn test_fetch_and_render_over_http() {
        use axum::{routing::get, Router};

        let router = Router::new().route(
            "/api/accidents_by_month",
            get(|| async {
                r#"{"accidents":[{"year_month":"2023-01","total_accidents":10}],
                    "deaths":[{"year_month":"2023-01","total_deaths":2}]}"#
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let mut config = Config::default();
        config.source.base_url = format!("http://{}", addr);
        config.source.request_timeout_ms = 2000;

        let view = fetch_and_render(&config).await.unwrap();
        match view {
            RenderedView::Chart { series, .. } => {
                assert_eq!(series.len(), 2);
                assert_eq!(series[0].data, vec![10.0]);
                assert_eq!(series[1].data, vec![2.0]);
            }
            other => panic!("expected chart, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_kind_separates_decode_errors() {
        assert_eq!(failure_kind(&FetchError::Decode("eof".to_string())), "decode");
        assert_eq!(failure_kind(&FetchError::Timeout), "transport");
        assert_eq!(failure_kind(&FetchError::Unavailable), "transport");
    }

    #[tokio::test]
    async fn test_shared_endpoint_uses_combined_payload() {
        let source = MockSource::new(Behavior::Respond(payload()), Behavior::Fail);
        let mut config = config();
        config.source.deaths_path = config.source.accidents_path.clone();

        let chart = AccidentChart::mount(&deps(Arc::clone(&source)), &config);
        let state = chart.settled().await;

        // Both queries hit the same endpoint, under separate cache keys
        assert_eq!(source.calls(), 2);
        assert_eq!(state.model().unwrap().series[1].data, vec![2.0]);
    }
}
