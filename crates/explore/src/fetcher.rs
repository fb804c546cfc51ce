use crate::service::ZoneService;
use crate::state::{Completion, RequestOrchestrator, ZoneRequestState};
use rezoning_protocol::{Resource, ZoneRequestParams};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Global "busy" indicator shown while zones are being generated.
///
/// `show` and `hide` strictly alternate. They run with the fetcher's lock held, so
/// implementations must not call back into the fetcher.
pub trait LoadingIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIndicator;

impl LoadingIndicator for NoopIndicator {
    fn show(&self) {}
    fn hide(&self) {}
}

/// Runs zone requests against a [`ZoneService`] and publishes every state change.
///
/// Cheap to clone; clones share one orchestrator.
#[derive(Clone)]
pub struct ZoneFetcher {
    inner: Arc<FetcherInner>,
}

struct FetcherInner {
    service: Arc<dyn ZoneService>,
    indicator: Arc<dyn LoadingIndicator>,
    orchestrator: Mutex<RequestOrchestrator>,
    state_tx: watch::Sender<ZoneRequestState>,
}

impl ZoneFetcher {
    pub fn new(service: Arc<dyn ZoneService>) -> Self {
        Self::with_indicator(service, Arc::new(NoopIndicator))
    }

    pub fn with_indicator(
        service: Arc<dyn ZoneService>,
        indicator: Arc<dyn LoadingIndicator>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ZoneRequestState::Idle);
        Self {
            inner: Arc::new(FetcherInner {
                service,
                indicator,
                orchestrator: Mutex::new(RequestOrchestrator::new()),
                state_tx,
            }),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ZoneRequestState> {
        self.inner.state_tx.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> ZoneRequestState {
        self.inner.state_tx.borrow().clone()
    }

    #[must_use]
    pub fn zones_generated(&self) -> bool {
        self.inner.lock().zones_generated()
    }

    #[must_use]
    pub fn input_touched(&self) -> bool {
        self.inner.lock().input_touched()
    }

    pub fn touch_input(&self) {
        self.inner.lock().touch_input();
    }

    /// Dispatch a zone request, superseding any request still in flight.
    ///
    /// Must be called within a tokio runtime. The handle resolves to whether the
    /// response was applied or discarded as stale.
    pub fn generate_zones(&self, params: ZoneRequestParams) -> JoinHandle<Completion> {
        let dispatch = {
            let mut orchestrator = self.inner.lock();
            let was_loading = orchestrator.is_loading();
            let dispatch = orchestrator.begin(params);
            self.inner.settle(&orchestrator, was_loading);
            dispatch
        };
        log::info!(
            "Generating zones for {} ({}) #{}",
            dispatch.params().area_id,
            dispatch.params().resource,
            dispatch.ticket().get()
        );

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = inner.service.generate_zones(dispatch.params()).await;
            let mut orchestrator = inner.lock();
            let was_loading = orchestrator.is_loading();
            let completion = orchestrator.complete(&dispatch, outcome);
            if completion == Completion::Applied || was_loading != orchestrator.is_loading() {
                inner.settle(&orchestrator, was_loading);
            }
            completion
        })
    }

    /// Record the active area/resource selection. A change drops the in-flight
    /// request, and later responses for another selection are discarded.
    pub fn select(&self, area_id: Option<&str>, resource: Option<Resource>) {
        let mut orchestrator = self.inner.lock();
        let was_loading = orchestrator.is_loading();
        if orchestrator.select(area_id, resource) {
            self.inner.settle(&orchestrator, was_loading);
        }
    }

    /// Forget the in-flight request, if any, and go back to idle.
    pub fn invalidate(&self) {
        let mut orchestrator = self.inner.lock();
        let was_loading = orchestrator.is_loading();
        orchestrator.invalidate();
        self.inner.settle(&orchestrator, was_loading);
    }
}

impl std::fmt::Debug for ZoneFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneFetcher")
            .field("state", &self.inner.state_tx.borrow().name())
            .finish_non_exhaustive()
    }
}

impl FetcherInner {
    fn lock(&self) -> MutexGuard<'_, RequestOrchestrator> {
        self.orchestrator.lock().unwrap_or_else(|poisoned| {
            log::warn!("zone orchestrator lock poisoned");
            poisoned.into_inner()
        })
    }

    /// Publish the new state and move the indicator if loading started or ended.
    /// Runs under the orchestrator lock so indicator calls keep dispatch order.
    fn settle(&self, orchestrator: &RequestOrchestrator, was_loading: bool) {
        self.state_tx.send_replace(orchestrator.state().clone());
        match (was_loading, orchestrator.is_loading()) {
            (false, true) => self.indicator.show(),
            (true, false) => self.indicator.hide(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ZoneFetchError;
    use async_trait::async_trait;
    use rezoning_protocol::{Extent, LcoeParams, Resource, Weights, ZonePayload};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Empty;

    #[async_trait]
    impl ZoneService for Empty {
        async fn generate_zones(
            &self,
            _params: &ZoneRequestParams,
        ) -> std::result::Result<ZonePayload, ZoneFetchError> {
            Ok(ZonePayload::default())
        }
    }

    struct Hanging;

    #[async_trait]
    impl ZoneService for Hanging {
        async fn generate_zones(
            &self,
            _params: &ZoneRequestParams,
        ) -> std::result::Result<ZonePayload, ZoneFetchError> {
            std::future::pending().await
        }
    }

    #[derive(Default)]
    struct Counting {
        shown: AtomicUsize,
        hidden: AtomicUsize,
    }

    impl LoadingIndicator for Counting {
        fn show(&self) {
            self.shown.fetch_add(1, Ordering::SeqCst);
        }
        fn hide(&self) {
            self.hidden.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn params() -> ZoneRequestParams {
        ZoneRequestParams {
            area_id: "AAA".into(),
            resource: Resource::Wind,
            extent: Extent::new(0.0, 0.0, 1.0, 1.0),
            grid: None,
            filters: String::new(),
            weights: Weights::default(),
            lcoe: LcoeParams::default(),
        }
    }

    #[tokio::test]
    async fn indicator_is_raised_and_cleared_once() {
        let indicator = Arc::new(Counting::default());
        let fetcher = ZoneFetcher::with_indicator(Arc::new(Empty), indicator.clone());
        let mut states = fetcher.subscribe();

        let completion = fetcher.generate_zones(params()).await.unwrap();
        assert_eq!(completion, Completion::Applied);
        assert_eq!(indicator.shown.load(Ordering::SeqCst), 1);
        assert_eq!(indicator.hidden.load(Ordering::SeqCst), 1);

        states.changed().await.unwrap();
        assert_eq!(states.borrow_and_update().name(), "fetched");
        assert!(fetcher.zones_generated());
        assert!(!fetcher.input_touched());
    }

    #[tokio::test]
    async fn invalidate_without_request_leaves_indicator_alone() {
        let indicator = Arc::new(Counting::default());
        let fetcher = ZoneFetcher::with_indicator(Arc::new(Empty), indicator.clone());
        fetcher.invalidate();
        assert_eq!(indicator.hidden.load(Ordering::SeqCst), 0);
        assert!(fetcher.state().is_idle());
    }

    #[tokio::test]
    async fn selection_change_clears_a_hanging_request() {
        let indicator = Arc::new(Counting::default());
        let fetcher = ZoneFetcher::with_indicator(Arc::new(Hanging), indicator.clone());
        fetcher.select(Some("AAA"), Some(Resource::Wind));
        let pending = fetcher.generate_zones(params());
        fetcher.generate_zones(params());
        assert!(fetcher.state().is_loading());
        assert_eq!(indicator.shown.load(Ordering::SeqCst), 1);

        fetcher.select(Some("AAA"), Some(Resource::Wind));
        assert!(fetcher.state().is_loading());

        fetcher.select(Some("AAA"), Some(Resource::SolarPv));
        assert!(fetcher.state().is_idle());
        assert_eq!(indicator.hidden.load(Ordering::SeqCst), 1);
        pending.abort();
    }

    #[test]
    fn show_and_hide_alternate_across_threads() {
        #[derive(Default)]
        struct Flag(std::sync::Mutex<Vec<bool>>);

        impl LoadingIndicator for Flag {
            fn show(&self) {
                self.0.lock().unwrap().push(true);
            }
            fn hide(&self) {
                self.0.lock().unwrap().push(false);
            }
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .build()
            .unwrap();
        let indicator = Arc::new(Flag::default());
        let fetcher = ZoneFetcher::with_indicator(Arc::new(Empty), indicator.clone());
        runtime.block_on(async {
            let handles: Vec<_> = (0..64).map(|_| fetcher.generate_zones(params())).collect();
            for handle in handles {
                handle.await.unwrap();
            }
        });

        let calls = indicator.0.lock().unwrap().clone();
        assert!(!calls.is_empty());
        assert!(calls.iter().step_by(2).all(|shown| *shown));
        assert!(calls.iter().skip(1).step_by(2).all(|shown| !*shown));
        assert_eq!(calls.last(), Some(&false));
        assert!(fetcher.state().zones().is_some());
    }
}
