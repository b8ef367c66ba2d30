//! Feed controller: filter state, fetch supersession and connectivity.

use std::sync::Arc;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use mostpop_core::constants::NO_ARTICLES_MESSAGE;
use mostpop_core::error::FeedError;
use mostpop_core::traits::ConnectivitySignal;
use mostpop_core::types::{EndpointKind, FilterSpec, Period, ResultBatch, ShareKind};
use mostpop_repo::{ArticleStream, ArticlesRepository, CancelHandle};

use crate::state::ViewState;

/// Drives one feed view.
///
/// At most one result stream is active at a time; starting a new fetch
/// cancels the previous one. Methods that start fetches spawn onto the
/// current Tokio runtime.
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct FeedController {
    core: Arc<Core>,
}

struct Core {
    repository: Arc<ArticlesRepository>,
    connectivity: Arc<dyn ConnectivitySignal>,
    session: Mutex<Session>,
    state: watch::Sender<ViewState>,
}

#[derive(Default)]
struct Session {
    filter: FilterSpec,
    active: Option<CancelHandle>,
    task: Option<JoinHandle<()>>,
}

impl FeedController {
    /// Creates an idle controller for the default filter.
    pub fn new(repository: Arc<ArticlesRepository>, connectivity: Arc<dyn ConnectivitySignal>) -> Self {
        Self::with_filter(repository, connectivity, FilterSpec::default())
    }

    /// Creates an idle controller for `filter`.
    pub fn with_filter(
        repository: Arc<ArticlesRepository>,
        connectivity: Arc<dyn ConnectivitySignal>,
        filter: FilterSpec,
    ) -> Self {
        let (state, _) = watch::channel(ViewState::Idle);
        Self {
            core: Arc::new(Core {
                repository,
                connectivity,
                session: Mutex::new(Session {
                    filter,
                    ..Session::default()
                }),
                state,
            }),
        }
    }

    /// Current view state.
    pub fn state(&self) -> ViewState {
        self.core.state.borrow().clone()
    }

    /// Subscribes to view state changes.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.core.state.subscribe()
    }

    /// Current filter.
    pub fn filter(&self) -> FilterSpec {
        self.core.session.lock().filter.clone()
    }

    /// Changes endpoint and/or period. Returns true if a new fetch started.
    pub fn update_filter(&self, endpoint: Option<EndpointKind>, period: Option<Period>) -> bool {
        self.core.change_filter(|filter| {
            let mut changed = false;
            if let Some(endpoint) = endpoint.filter(|e| *e != filter.endpoint) {
                filter.endpoint = endpoint;
                changed = true;
            }
            if let Some(period) = period.filter(|p| *p != filter.period) {
                filter.period = period;
                changed = true;
            }
            changed
        })
    }

    /// Changes the share kind. Returns true if a new fetch started.
    pub fn set_share(&self, share: Option<ShareKind>) -> bool {
        self.core.change_filter(|filter| {
            if filter.share == share {
                return false;
            }
            filter.share = share;
            true
        })
    }

    /// Changes the section. Returns true if a new fetch started.
    pub fn set_section(&self, section: impl Into<String>) -> bool {
        let section = section.into();
        self.core.change_filter(|filter| {
            if filter.section == section {
                return false;
            }
            filter.section = section;
            true
        })
    }

    /// Restarts the fetch for the current filter.
    pub fn refresh(&self) {
        let mut session = self.core.session.lock();
        self.core.start_fetch(&mut session);
    }

    /// Cancels the in-flight fetch, if any. The state is left as is.
    pub fn cancel(&self) {
        let mut session = self.core.session.lock();
        Core::cancel_active(&mut session);
    }

    /// Waits until the most recently started fetch has finished or was
    /// cancelled.
    pub async fn settled(&self) {
        let task = self.core.session.lock().task.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Feed task ended abnormally");
            }
        }
    }

    /// Follows the connectivity signal until it is dropped.
    ///
    /// Going offline cancels the in-flight fetch and shows `Offline`. Coming
    /// back online while `Offline` shows `Loading` and fetches again.
    pub fn watch_connectivity(&self) -> JoinHandle<()> {
        let core = self.core.clone();
        let mut rx = core.connectivity.subscribe();

        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                core.on_connectivity(online);
            }
            debug!("Connectivity signal closed");
        })
    }
}

impl Core {
    fn change_filter(self: &Arc<Self>, apply: impl FnOnce(&mut FilterSpec) -> bool) -> bool {
        let mut session = self.session.lock();
        if !apply(&mut session.filter) {
            return false;
        }

        info!(key = %session.filter.cache_key(), "Filter changed");
        self.publish(ViewState::Loading);
        self.start_fetch(&mut session);
        true
    }

    fn start_fetch(self: &Arc<Self>, session: &mut Session) {
        Self::cancel_active(session);

        if !self.connectivity.is_online() {
            debug!("Offline, not fetching");
            self.publish(ViewState::Offline);
            return;
        }

        if self.state.borrow().articles().is_empty() {
            self.publish(ViewState::Loading);
        }

        let stream = self.repository.fetch_articles(&session.filter);
        let handle = stream.cancel_handle();
        session.active = Some(handle.clone());
        session.task = Some(tokio::spawn(self.clone().drive(stream, handle)));
    }

    fn cancel_active(session: &mut Session) {
        if let Some(handle) = session.active.take() {
            handle.cancel();
        }
    }

    async fn drive(self: Arc<Self>, mut stream: ArticleStream, handle: CancelHandle) {
        while let Some(item) = stream.next().await {
            if !self.apply(&handle, item) {
                return;
            }
        }
    }

    /// Folds one emission into the state. Returns false once superseded.
    fn apply(&self, handle: &CancelHandle, item: mostpop_core::Result<ResultBatch>) -> bool {
        // Held so a concurrent supersession cannot interleave.
        let _session = self.session.lock();
        if handle.is_cancelled() {
            return false;
        }

        match item {
            Ok(batch) => self.apply_batch(batch),
            Err(e) => self.apply_error(&e),
        }
        true
    }

    fn apply_batch(&self, batch: ResultBatch) {
        if batch.is_empty() {
            self.publish(ViewState::Failure(NO_ARTICLES_MESSAGE.to_string()));
            return;
        }
        if self.state.borrow().articles() == batch.as_slice() {
            debug!("Batch unchanged, skipping");
            return;
        }
        debug!(articles = batch.len(), "Showing batch");
        self.publish(ViewState::Success(batch));
    }

    fn apply_error(&self, error: &FeedError) {
        if self.state.borrow().articles().is_empty() {
            warn!(error = %error, "Feed failed");
            self.publish(ViewState::Failure(error.to_string()));
        } else {
            warn!(error = %error, "Refresh failed, keeping displayed articles");
        }
    }

    fn on_connectivity(self: &Arc<Self>, online: bool) {
        let mut session = self.session.lock();
        if online {
            if *self.state.borrow() == ViewState::Offline {
                self.publish(ViewState::Loading);
                self.start_fetch(&mut session);
            }
        } else {
            Self::cancel_active(&mut session);
            self.publish(ViewState::Offline);
        }
    }

    fn publish(&self, next: ViewState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::ConnectivityMonitor;
    use chrono::Utc;
    use mostpop_cache::{CacheEntry, ResponseCache};
    use mostpop_core::traits::Transport;
    use mostpop_core::types::ArticleApiResponse;
    use mostpop_repo::testing::{sample_response, GatedTransport, ScriptedTransport};
    use std::time::Duration;

    struct Fixture {
        controller: FeedController,
        monitor: Arc<ConnectivityMonitor>,
        repository: Arc<ArticlesRepository>,
    }

    fn fixture(transport: Arc<dyn Transport>, online: bool) -> Fixture {
        let repository = Arc::new(ArticlesRepository::new(transport, Arc::new(ResponseCache::new())));
        let monitor = Arc::new(ConnectivityMonitor::new(online));
        let controller = FeedController::new(repository.clone(), monitor.clone());
        Fixture {
            controller,
            monitor,
            repository,
        }
    }

    async fn wait_for(controller: &FeedController, predicate: impl FnMut(&ViewState) -> bool) -> ViewState {
        let mut rx = controller.subscribe();
        let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
            .await
            .expect("timed out waiting for state")
            .expect("state channel closed");
        state.clone()
    }

    fn ids(state: &ViewState) -> Vec<u64> {
        state.articles().iter().map(|a| a.id).collect()
    }

    #[tokio::test]
    async fn test_offline_start_skips_repository() {
        let transport = Arc::new(ScriptedTransport::succeeding(sample_response(&[1])));
        let f = fixture(transport.clone(), false);

        f.controller.refresh();
        f.controller.settled().await;

        assert_eq!(f.controller.state(), ViewState::Offline);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_shows_articles() {
        let transport = Arc::new(ScriptedTransport::succeeding(sample_response(&[1, 2])));
        let f = fixture(transport, true);
        assert_eq!(f.controller.state(), ViewState::Idle);

        f.controller.refresh();
        assert_eq!(f.controller.state(), ViewState::Loading);
        f.controller.settled().await;

        assert_eq!(ids(&f.controller.state()), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_unchanged_filter_is_noop() {
        let transport = Arc::new(ScriptedTransport::succeeding(sample_response(&[1])));
        let f = fixture(transport.clone(), true);
        let current = f.controller.filter();

        assert!(!f.controller.update_filter(Some(current.endpoint), Some(current.period)));
        assert!(!f.controller.update_filter(None, None));
        assert!(!f.controller.set_share(None));
        assert!(!f.controller.set_section(current.section));

        assert_eq!(f.controller.state(), ViewState::Idle);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_filter_change_fetches_new_path() {
        let transport = Arc::new(ScriptedTransport::succeeding(sample_response(&[3])));
        let f = fixture(transport.clone(), true);

        assert!(f.controller.update_filter(Some(EndpointKind::Shared), Some(Period::Month)));
        assert!(f.controller.set_share(Some(ShareKind::Twitter)));
        f.controller.settled().await;

        assert_eq!(ids(&f.controller.state()), vec![3]);
        assert_eq!(
            transport.last_request().unwrap().path,
            "/svc/mostpopular/v2/shared/30/twitter.json"
        );
        assert_eq!(f.controller.filter().share, Some(ShareKind::Twitter));
    }

    #[tokio::test]
    async fn test_section_change_fetches_under_own_cache_key() {
        let transport = Arc::new(ScriptedTransport::succeeding(sample_response(&[5])));
        let f = fixture(transport.clone(), true);

        f.controller.refresh();
        f.controller.settled().await;
        assert_eq!(transport.calls(), 1);

        assert!(f.controller.set_section("sports"));
        f.controller.settled().await;

        let sports = FilterSpec::default().with_section("sports");
        assert_eq!(f.controller.filter(), sports);
        assert_eq!(transport.calls(), 2);
        // The section never reaches the request path.
        assert_eq!(
            transport.last_request().unwrap().path,
            "/svc/mostpopular/v2/viewed/7.json"
        );
        assert_ne!(sports.cache_key(), FilterSpec::default().cache_key());

        let entry: Option<CacheEntry<ArticleApiResponse>> =
            f.repository.cache().get(&sports.cache_key()).await;
        assert_eq!(entry.unwrap().value.results.len(), 1);
        assert_eq!(ids(&f.controller.state()), vec![5]);
    }

    #[tokio::test]
    async fn test_empty_batch_is_failure() {
        let transport = Arc::new(ScriptedTransport::succeeding(sample_response(&[])));
        let f = fixture(transport, true);

        f.controller.refresh();
        f.controller.settled().await;

        assert_eq!(f.controller.state(), ViewState::Failure("No articles found.".into()));
    }

    #[tokio::test]
    async fn test_error_without_content_is_failure() {
        let transport = Arc::new(ScriptedTransport::failing(|| FeedError::HttpStatus { code: 500 }));
        let f = fixture(transport, true);

        f.controller.refresh();
        f.controller.settled().await;

        assert_eq!(
            f.controller.state().failure(),
            Some("The API returned an invalid response: Status Code 500.")
        );
    }

    #[tokio::test]
    async fn test_error_after_stale_content_keeps_it() {
        let transport = Arc::new(ScriptedTransport::failing(|| FeedError::Network("down".into())));
        let f = fixture(transport.clone(), true);
        let stale = CacheEntry::with_creation_time(
            sample_response(&[7]),
            Utc::now() - chrono::Duration::hours(1),
        );
        f.repository
            .cache()
            .put_entry::<ArticleApiResponse>(&f.controller.filter().cache_key(), &stale)
            .await;

        f.controller.refresh();
        f.controller.settled().await;

        assert_eq!(transport.calls(), 1);
        assert_eq!(ids(&f.controller.state()), vec![7]);
    }

    #[tokio::test]
    async fn test_refresh_keeps_content_while_loading() {
        let transport = Arc::new(ScriptedTransport::succeeding(sample_response(&[1])));
        let f = fixture(transport, true);
        f.controller.refresh();
        f.controller.settled().await;

        // Displayed articles stay up while the next fetch runs.
        f.controller.refresh();
        assert_eq!(ids(&f.controller.state()), vec![1]);
        f.controller.settled().await;
        assert_eq!(ids(&f.controller.state()), vec![1]);
    }

    #[tokio::test]
    async fn test_new_fetch_supersedes_previous() {
        let transport = Arc::new(GatedTransport::new(sample_response(&[1])));
        let f = fixture(transport.clone(), true);

        f.controller.refresh();
        wait_until_calls(&transport, 1).await;

        assert!(f.controller.update_filter(Some(EndpointKind::Emailed), None));
        wait_until_calls(&transport, 2).await;

        transport.release();
        let state = wait_for(&f.controller, |s| !s.articles().is_empty()).await;
        assert_eq!(ids(&state), vec![1]);

        // Only the emailed feed was cached; the superseded fetch was dropped.
        let viewed: Option<CacheEntry<ArticleApiResponse>> = f
            .repository
            .cache()
            .get(&FilterSpec::default().cache_key())
            .await;
        assert!(viewed.is_none());
    }

    #[tokio::test]
    async fn test_connectivity_round_trip() {
        let transport = Arc::new(GatedTransport::new(sample_response(&[4])));
        let f = fixture(transport.clone(), true);
        let watcher = f.controller.watch_connectivity();

        f.controller.refresh();
        wait_until_calls(&transport, 1).await;

        f.monitor.set_online(false);
        wait_for(&f.controller, |s| *s == ViewState::Offline).await;

        transport.release();
        f.monitor.set_online(true);
        let state = wait_for(&f.controller, |s| !s.articles().is_empty()).await;
        assert_eq!(ids(&state), vec![4]);
        assert_eq!(transport.calls(), 2);

        watcher.abort();
    }

    #[tokio::test]
    async fn test_online_without_offline_state_does_not_refetch() {
        let transport = Arc::new(ScriptedTransport::succeeding(sample_response(&[1])));
        let monitor = Arc::new(ConnectivityMonitor::new(false));
        let repository = Arc::new(ArticlesRepository::new(transport.clone(), Arc::new(ResponseCache::new())));
        let controller = FeedController::new(repository, monitor.clone());
        let watcher = controller.watch_connectivity();

        // Still Idle, so regaining connectivity does not fetch on its own.
        monitor.set_online(true);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(controller.state(), ViewState::Idle);
        assert_eq!(transport.calls(), 0);
        watcher.abort();
    }

    async fn wait_until_calls(transport: &GatedTransport, calls: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while transport.calls() < calls {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("transport was never called");
    }
}
