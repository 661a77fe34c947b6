//! Job list refresher
//!
//! Re-fetches one page of the job list at a fixed cadence while subscribed.
//! Unlike the per-job watcher there is no terminal condition, and a failed
//! refresh does not stop the loop: the error is published and the next tick
//! tries again.

use popstruct_core::domain::page::JobPage;
use popstruct_core::dto::job::JobQuery;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::source::JobSource;
use crate::state::WatchFailure;

/// Latest outcome of the list refresh
#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading,
    Ready(JobPage),
    /// The last refresh failed; `last_page` is the most recent good page
    Error {
        failure: WatchFailure,
        last_page: Option<JobPage>,
    },
}

impl ListState {
    /// Page to display, stale or not
    pub fn page(&self) -> Option<&JobPage> {
        match self {
            ListState::Loading => None,
            ListState::Ready(page) => Some(page),
            ListState::Error { last_page, .. } => last_page.as_ref(),
        }
    }
}

/// Starts list refresh loops
#[derive(Clone)]
pub struct JobListRefresher {
    source: Arc<dyn JobSource>,
    interval: Duration,
}

impl JobListRefresher {
    pub fn new(source: Arc<dyn JobSource>, config: &WatchConfig) -> Self {
        Self {
            source,
            interval: config.list_refresh_interval,
        }
    }

    /// Starts refreshing the page described by `query`
    pub fn start(&self, query: JobQuery) -> ListSubscription {
        let (state_tx, state_rx) = watch::channel(ListState::Loading);
        let cancel = CancellationToken::new();
        let refresh = Arc::new(Notify::new());

        tokio::spawn(refresh_loop(
            Arc::clone(&self.source),
            query,
            self.interval,
            cancel.clone(),
            Arc::clone(&refresh),
            state_tx,
        ));

        ListSubscription {
            state: state_rx,
            cancel,
            refresh,
        }
    }
}

/// Handle on a running list refresh; dropping it stops the loop
pub struct ListSubscription {
    state: watch::Receiver<ListState>,
    cancel: CancellationToken,
    refresh: Arc<Notify>,
}

impl ListSubscription {
    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Waits for the next refresh outcome
    pub async fn changed(&mut self) -> Option<ListState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Refreshes now instead of waiting for the next tick
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for ListSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn refresh_loop(
    source: Arc<dyn JobSource>,
    query: JobQuery,
    interval: Duration,
    cancel: CancellationToken,
    refresh: Arc<Notify>,
    state: watch::Sender<ListState>,
) {
    info!(
        "Refreshing job list page {} every {:?}",
        query.page, interval
    );
    let mut last_page: Option<JobPage> = None;

    loop {
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            fetched = source.list_jobs(&query) => fetched,
        };

        let next = match fetched {
            Ok(page) => {
                debug!("Job list refreshed: {} of {} job(s)", page.jobs.len(), page.total);
                last_page = Some(page.clone());
                ListState::Ready(page)
            }
            Err(e) => {
                warn!("Failed to refresh job list: {}", e);
                ListState::Error {
                    failure: WatchFailure::from(&e),
                    last_page: last_page.clone(),
                }
            }
        };

        if cancel.is_cancelled() {
            break;
        }
        state.send_replace(next);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = refresh.notified() => debug!("Job list refresh requested"),
            _ = time::sleep(interval) => {}
        }
    }

    debug!("Job list refresh stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockSource, Step, job};
    use popstruct_client::ErrorKind;
    use popstruct_core::domain::job::JobStatus;
    use std::sync::atomic::Ordering;

    fn page(ids: &[i64]) -> JobPage {
        JobPage {
            jobs: ids.iter().map(|id| job(*id, JobStatus::Running)).collect(),
            total: ids.len() as u64,
            page: 1,
            page_size: 10,
        }
    }

    fn refresher(source: &Arc<MockSource>) -> JobListRefresher {
        let source: Arc<dyn JobSource> = source.clone();
        JobListRefresher::new(source, &WatchConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_keeps_refreshing_at_interval() {
        let source = MockSource::new();
        source.push_listing(Step::Ok(page(&[1, 2])));
        source.push_listing(Step::Ok(page(&[1, 2, 3])));

        let mut sub = refresher(&source).start(JobQuery::new(1, 10));

        let first = sub.changed().await.expect("first page");
        assert_eq!(first.page().map(|p| p.jobs.len()), Some(2));

        let second = sub.changed().await.expect("second page");
        assert_eq!(second.page().map(|p| p.jobs.len()), Some(3));

        time::sleep(Duration::from_secs(12)).await;
        assert!(source.list_fetches.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_error_does_not_stop_refresh() {
        let source = MockSource::new();
        source.push_listing(Step::Ok(page(&[1])));
        source.push_listing(Step::Fail(503, "Service Unavailable"));
        source.push_listing(Step::Ok(page(&[1, 2])));

        let mut sub = refresher(&source).start(JobQuery::default());

        assert!(matches!(sub.changed().await, Some(ListState::Ready(_))));

        match sub.changed().await {
            Some(ListState::Error { failure, last_page }) => {
                assert_eq!(failure.kind, ErrorKind::Transient);
                assert_eq!(last_page.map(|p| p.jobs.len()), Some(1));
            }
            other => panic!("unexpected state: {:?}", other),
        }

        match sub.changed().await {
            Some(ListState::Ready(page)) => assert_eq!(page.jobs.len(), 2),
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_list_stops_fetching() {
        let source = MockSource::new();

        let mut sub = refresher(&source).start(JobQuery::default());
        sub.changed().await;
        sub.cancel();

        let fetches = source.list_fetches.load(Ordering::SeqCst);
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.list_fetches.load(Ordering::SeqCst), fetches);
        assert!(sub.changed().await.is_none());
    }
}
