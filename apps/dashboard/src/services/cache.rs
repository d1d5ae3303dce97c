//! Request deduplication for GeoJSON datasets.
//!
//! One entry per endpoint: either a request that is still running, which new
//! callers join, or a settled collection, which is handed out without a
//! network call while it is younger than the dedupe interval. Failures are
//! dropped so a later explicit load can try again.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, FutureExt, LocalBoxFuture, Shared};
use geojson::FeatureCollection;
use time::OffsetDateTime;

use crate::api::{ClientError, GeoJsonSource};

pub type LoadResult = Result<Arc<FeatureCollection>, Arc<ClientError>>;
pub type SharedLoad = Shared<LocalBoxFuture<'static, LoadResult>>;

type Clock = Rc<dyn Fn() -> OffsetDateTime>;

enum Entry {
    InFlight(SharedLoad),
    Ready {
        data: Arc<FeatureCollection>,
        fetched_at: OffsetDateTime,
    },
}

struct CacheInner<S> {
    source: S,
    dedupe_interval: Duration,
    clock: Clock,
    entries: RefCell<HashMap<String, Entry>>,
    fetches: Cell<u64>,
}

pub struct DataCache<S> {
    inner: Rc<CacheInner<S>>,
}

impl<S> Clone for DataCache<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S> PartialEq for DataCache<S> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<S: GeoJsonSource + 'static> DataCache<S> {
    pub fn new(source: S, dedupe_interval: Duration) -> Self {
        Self::with_clock(source, dedupe_interval, Rc::new(OffsetDateTime::now_utc))
    }

    fn with_clock(source: S, dedupe_interval: Duration, clock: Clock) -> Self {
        Self {
            inner: Rc::new(CacheInner {
                source,
                dedupe_interval,
                clock,
                entries: RefCell::new(HashMap::new()),
                fetches: Cell::new(0),
            }),
        }
    }

    /// Resolves `endpoint`, issuing at most one network request for all
    /// callers that arrive while it is running or within the dedupe window.
    ///
    /// The entry is registered before this returns, so two calls made in the
    /// same tick always share one request.
    pub fn load(&self, endpoint: &str) -> SharedLoad {
        let now = (self.inner.clock)();
        let mut entries = self.inner.entries.borrow_mut();

        match entries.get(endpoint) {
            Some(Entry::InFlight(pending)) => {
                tracing::debug!(endpoint, "joining in-flight request");
                return pending.clone();
            }
            Some(Entry::Ready { data, fetched_at }) if self.is_fresh(now, *fetched_at) => {
                let data = Arc::clone(data);
                return future::ready(Ok(data)).boxed_local().shared();
            }
            _ => {}
        }

        self.inner.fetches.set(self.inner.fetches.get() + 1);
        tracing::info!(endpoint, "requesting dataset");

        let request = self.inner.source.fetch_geojson(endpoint);
        let owner: Weak<CacheInner<S>> = Rc::downgrade(&self.inner);
        let key = endpoint.to_string();

        let pending = async move {
            let outcome: LoadResult = request.await.map(Arc::new).map_err(Arc::new);
            if let Some(inner) = owner.upgrade() {
                inner.settle(&key, &outcome);
            }
            outcome
        }
        .boxed_local()
        .shared();

        entries.insert(endpoint.to_string(), Entry::InFlight(pending.clone()));
        pending
    }

    /// Number of network requests issued since construction.
    pub fn fetch_count(&self) -> u64 {
        self.inner.fetches.get()
    }

    pub fn is_pending(&self, endpoint: &str) -> bool {
        matches!(
            self.inner.entries.borrow().get(endpoint),
            Some(Entry::InFlight(_))
        )
    }

    fn is_fresh(&self, now: OffsetDateTime, fetched_at: OffsetDateTime) -> bool {
        let age_ms = (now - fetched_at).whole_milliseconds();
        age_ms < self.inner.dedupe_interval.as_millis() as i128
    }
}

impl<S> CacheInner<S> {
    fn settle(&self, endpoint: &str, outcome: &LoadResult) {
        let mut entries = self.entries.borrow_mut();
        match outcome {
            Ok(data) => {
                entries.insert(
                    endpoint.to_string(),
                    Entry::Ready {
                        data: Arc::clone(data),
                        fetched_at: (self.clock)(),
                    },
                );
            }
            Err(err) => {
                tracing::warn!(endpoint, %err, "dataset request failed");
                entries.remove(endpoint);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ClientResult;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use reqwest::StatusCode;
    use std::collections::VecDeque;

    #[derive(Clone, Default)]
    struct MockSource {
        calls: Rc<RefCell<Vec<String>>>,
        gates: Rc<RefCell<VecDeque<oneshot::Receiver<()>>>>,
        fail: Rc<Cell<bool>>,
    }

    impl MockSource {
        fn gate_next(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.borrow_mut().push_back(rx);
            tx
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl GeoJsonSource for MockSource {
        fn fetch_geojson(
            &self,
            endpoint: &str,
        ) -> LocalBoxFuture<'static, ClientResult<FeatureCollection>> {
            self.calls.borrow_mut().push(endpoint.to_string());
            let gate = self.gates.borrow_mut().pop_front();
            let fail = self.fail.get();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                if fail {
                    Err(ClientError::UnexpectedStatus {
                        status: StatusCode::SERVICE_UNAVAILABLE,
                        body: Vec::new(),
                    })
                } else {
                    Ok(FeatureCollection {
                        bbox: None,
                        features: Vec::new(),
                        foreign_members: None,
                    })
                }
            }
            .boxed_local()
        }
    }

    const FIVE_MINUTES: Duration = Duration::from_secs(300);

    #[test]
    fn repeated_loads_share_one_request() {
        let source = MockSource::default();
        let cache = DataCache::new(source.clone(), FIVE_MINUTES);

        let first = block_on(cache.load("/economy/contracts/geojson")).unwrap();
        let second = block_on(cache.load("/economy/contracts/geojson")).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.fetch_count(), 1);
        assert_eq!(source.call_count(), 1);
    }

    #[test]
    fn concurrent_loads_join_the_in_flight_request() {
        let source = MockSource::default();
        let release = source.gate_next();
        let cache = DataCache::new(source.clone(), FIVE_MINUTES);

        let a = cache.load("/politics/elections/geojson");
        let b = cache.load("/politics/elections/geojson");
        assert!(cache.is_pending("/politics/elections/geojson"));
        release.send(()).unwrap();

        let (a, b) = block_on(future::join(a, b));
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(source.call_count(), 1);
        assert!(!cache.is_pending("/politics/elections/geojson"));
    }

    #[test]
    fn distinct_endpoints_fetch_independently() {
        let source = MockSource::default();
        let cache = DataCache::new(source.clone(), FIVE_MINUTES);

        block_on(cache.load("/economy/contracts/geojson")).unwrap();
        block_on(cache.load("/environment/deforestation")).unwrap();

        assert_eq!(
            *source.calls.borrow(),
            vec!["/economy/contracts/geojson", "/environment/deforestation"]
        );
    }

    #[test]
    fn failures_are_not_memoized() {
        let source = MockSource::default();
        source.fail.set(true);
        let cache = DataCache::new(source.clone(), FIVE_MINUTES);

        let err = block_on(cache.load("/environment/deforestation")).unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!cache.is_pending("/environment/deforestation"));

        source.fail.set(false);
        assert!(block_on(cache.load("/environment/deforestation")).is_ok());
        assert_eq!(cache.fetch_count(), 2);
    }

    #[test]
    fn stale_entries_are_fetched_again() {
        let source = MockSource::default();
        let now = Rc::new(Cell::new(OffsetDateTime::UNIX_EPOCH));
        let clock_now = Rc::clone(&now);
        let cache = DataCache::with_clock(
            source.clone(),
            FIVE_MINUTES,
            Rc::new(move || clock_now.get()),
        );

        block_on(cache.load("/economy/contracts/geojson")).unwrap();
        now.set(OffsetDateTime::UNIX_EPOCH + time::Duration::minutes(4));
        block_on(cache.load("/economy/contracts/geojson")).unwrap();
        assert_eq!(cache.fetch_count(), 1);

        now.set(OffsetDateTime::UNIX_EPOCH + time::Duration::minutes(6));
        block_on(cache.load("/economy/contracts/geojson")).unwrap();
        assert_eq!(cache.fetch_count(), 2);
    }
}
