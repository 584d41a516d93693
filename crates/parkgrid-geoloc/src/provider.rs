//! Observable location state: a watch-channel cell fed by sequenced,
//! timeout-bounded resolution requests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use parkgrid_core::Coordinate;

use crate::error::LocationError;
use crate::source::LocationSource;

/// The provider's externally visible state.
///
/// Transitions: `Idle` → `Loading` → `Ready` or `Failed`. A new request
/// moves any state back to `Loading`.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationState {
    Idle,
    Loading,
    Ready { position: Coordinate },
    Failed { message: String },
}

impl LocationState {
    /// The resolved position, if the last request succeeded.
    #[must_use]
    pub fn position(&self) -> Option<Coordinate> {
        match self {
            LocationState::Ready { position } => Some(*position),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, LocationState::Loading)
    }

    /// The failure message, if the last request failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            LocationState::Failed { message } => Some(message),
            _ => None,
        }
    }
}

struct ProviderInner<S> {
    source: S,
    tx: watch::Sender<LocationState>,
    /// Monotonic request counter. A resolution only publishes its outcome if
    /// it still holds the latest sequence number, so overlapping requests
    /// settle on the newest one and late fixes are discarded.
    seq: AtomicU64,
    request_timeout: Duration,
}

/// Observable cell around a [`LocationSource`].
///
/// Subscribers watch [`LocationState`] transitions through a
/// `tokio::sync::watch` channel instead of polling; dropped subscribers are
/// harmless. Each resolution is bounded by `request_timeout` and surfaces as
/// [`LocationError::Timeout`] when exceeded.
pub struct LocationProvider<S> {
    inner: Arc<ProviderInner<S>>,
}

impl<S> Clone for LocationProvider<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> LocationProvider<S>
where
    S: LocationSource + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(source: S, request_timeout: Duration) -> Self {
        let (tx, _rx) = watch::channel(LocationState::Idle);
        Self {
            inner: Arc::new(ProviderInner {
                source,
                tx,
                seq: AtomicU64::new(0),
                request_timeout,
            }),
        }
    }

    /// Subscribe to state transitions.
    ///
    /// The receiver immediately holds the current state; `changed().await`
    /// wakes on each transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LocationState> {
        self.inner.tx.subscribe()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> LocationState {
        self.inner.tx.borrow().clone()
    }

    /// Fire-and-forget refresh: publishes `Loading` now and the outcome from
    /// a spawned task.
    ///
    /// Calling again while a request is in flight supersedes it — the older
    /// request's outcome is discarded when it eventually resolves, never
    /// published.
    pub fn request_location(&self) {
        let inner = Arc::clone(&self.inner);
        let seq = inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
        inner.tx.send_replace(LocationState::Loading);

        tokio::spawn(async move {
            let outcome = resolve(&inner.source, inner.request_timeout).await;
            publish_if_current(&inner, seq, outcome);
        });
    }

    /// Resolve once and wait for the outcome.
    ///
    /// Publishes the same state transitions as [`Self::request_location`]
    /// and returns the result to the caller. A concurrent
    /// `request_location` call can still supersede this one, in which case
    /// the result is returned but not published.
    ///
    /// # Errors
    ///
    /// Returns the [`LocationError`] the source (or the timeout bound)
    /// produced.
    pub async fn refresh(&self) -> Result<Coordinate, LocationError> {
        let inner = &self.inner;
        let seq = inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
        inner.tx.send_replace(LocationState::Loading);

        let outcome = resolve(&inner.source, inner.request_timeout).await;
        publish_if_current(inner, seq, outcome.as_ref().copied().map_err(ToString::to_string));
        outcome
    }
}

async fn resolve<S: LocationSource>(
    source: &S,
    request_timeout: Duration,
) -> Result<Coordinate, LocationError> {
    match tokio::time::timeout(request_timeout, source.current_position()).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::Timeout {
            timeout_secs: request_timeout.as_secs(),
        }),
    }
}

fn publish_if_current<S>(
    inner: &ProviderInner<S>,
    seq: u64,
    outcome: Result<Coordinate, impl ToString>,
) {
    if inner.seq.load(Ordering::SeqCst) != seq {
        tracing::debug!(seq, "stale location fix discarded");
        return;
    }

    let next = match outcome {
        Ok(position) => LocationState::Ready { position },
        Err(e) => {
            let message = e.to_string();
            tracing::warn!(error = %message, "location request failed");
            LocationState::Failed { message }
        }
    };
    inner.tx.send_replace(next);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use tokio::sync::Notify;

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).expect("test coordinate should be valid")
    }

    struct FixedSource {
        result: Result<Coordinate, &'static str>,
    }

    impl LocationSource for FixedSource {
        async fn current_position(&self) -> Result<Coordinate, LocationError> {
            match self.result {
                Ok(position) => Ok(position),
                Err(reason) => Err(LocationError::PositionUnavailable {
                    reason: reason.to_owned(),
                }),
            }
        }
    }

    /// First call parks on the gate and returns (1, 1); later calls return
    /// (2, 2) immediately.
    struct GatedSource {
        calls: AtomicU32,
        gate: Arc<Notify>,
    }

    impl LocationSource for GatedSource {
        async fn current_position(&self) -> Result<Coordinate, LocationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                self.gate.notified().await;
                Ok(coord(1.0, 1.0))
            } else {
                Ok(coord(2.0, 2.0))
            }
        }
    }

    struct HangingSource;

    impl LocationSource for HangingSource {
        async fn current_position(&self) -> Result<Coordinate, LocationError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn starts_idle() {
        let provider = LocationProvider::new(
            FixedSource {
                result: Ok(coord(12.9344, 77.6146)),
            },
            Duration::from_secs(5),
        );
        assert_eq!(provider.state(), LocationState::Idle);
        assert!(provider.state().position().is_none());
    }

    #[tokio::test]
    async fn refresh_transitions_to_ready() {
        let provider = LocationProvider::new(
            FixedSource {
                result: Ok(coord(12.9344, 77.6146)),
            },
            Duration::from_secs(5),
        );
        let position = provider.refresh().await.expect("refresh should succeed");
        assert!((position.latitude - 12.9344).abs() < 1e-9);
        assert_eq!(provider.state().position(), Some(position));
    }

    #[tokio::test]
    async fn refresh_failure_publishes_message() {
        let provider = LocationProvider::new(
            FixedSource {
                result: Err("gps cold start"),
            },
            Duration::from_secs(5),
        );
        let err = provider.refresh().await.unwrap_err();
        assert!(matches!(err, LocationError::PositionUnavailable { .. }));
        let message = provider.state().error_message().map(str::to_owned);
        assert!(
            message.as_deref().is_some_and(|m| m.contains("gps cold start")),
            "unexpected state message: {message:?}"
        );
    }

    #[tokio::test]
    async fn request_location_publishes_loading_then_ready() {
        let provider = LocationProvider::new(
            FixedSource {
                result: Ok(coord(12.9344, 77.6146)),
            },
            Duration::from_secs(5),
        );
        let mut rx = provider.subscribe();

        provider.request_location();
        assert!(provider.state().is_loading());

        while rx.borrow_and_update().position().is_none() {
            rx.changed().await.expect("provider should stay alive");
        }
        assert_eq!(provider.state().position(), Some(coord(12.9344, 77.6146)));
    }

    #[tokio::test]
    async fn newer_request_supersedes_stale_fix() {
        let gate = Arc::new(Notify::new());
        let provider = LocationProvider::new(
            GatedSource {
                calls: AtomicU32::new(0),
                gate: Arc::clone(&gate),
            },
            Duration::from_secs(5),
        );
        let mut rx = provider.subscribe();

        // First request parks inside the source.
        provider.request_location();
        tokio::task::yield_now().await;

        // Second request resolves immediately to (2, 2).
        provider.request_location();
        while rx.borrow_and_update().position().is_none() {
            rx.changed().await.expect("provider should stay alive");
        }
        assert_eq!(provider.state().position(), Some(coord(2.0, 2.0)));

        // Release the first request; its fix is stale and must not publish.
        gate.notify_one();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(provider.state().position(), Some(coord(2.0, 2.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_source_times_out() {
        let provider = LocationProvider::new(HangingSource, Duration::from_secs(10));
        let err = provider.refresh().await.unwrap_err();
        assert!(
            matches!(err, LocationError::Timeout { timeout_secs: 10 }),
            "expected Timeout, got {err:?}"
        );
        let message = provider.state().error_message().map(str::to_owned);
        assert!(
            message.as_deref().is_some_and(|m| m.contains("timed out")),
            "unexpected state message: {message:?}"
        );
    }

    #[tokio::test]
    async fn dropped_subscribers_do_not_break_publishing() {
        let provider = LocationProvider::new(
            FixedSource {
                result: Ok(coord(1.0, 2.0)),
            },
            Duration::from_secs(5),
        );
        drop(provider.subscribe());
        assert!(provider.refresh().await.is_ok());
        assert_eq!(provider.state().position(), Some(coord(1.0, 2.0)));
    }
}
