// ── Update coordinator ──
//
// Owns the single polling job for one device. Scheduled ticks, manual
// refresh requests, and switch verification loops all funnel through
// `Coordinator::refresh`, which keeps at most one fetch on the wire and
// lets late arrivals share the in-flight result. The last good payload is
// kept across failures so readers can still show last-known values while
// reporting the device as unavailable.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use electrochlor_api::{DeviceEndpoint, ElectrochlorClient, Payload, TransportConfig};

use crate::config::DeviceConfig;
use crate::error::{CoreError, PollError};

/// Outcome of a single poll: the normalized payload or why there is none.
pub type PollResult = Result<Arc<Payload>, PollError>;

// ── CoordinatorState ─────────────────────────────────────────────

/// Everything readers may ask about the device's data, replaced as a unit
/// every time a poll completes.
#[derive(Debug, Clone)]
pub struct CoordinatorState {
    /// Last successfully fetched payload. Survives failed polls.
    pub data: Option<Arc<Payload>>,
    /// Outcome of the most recent poll.
    pub last_result: PollResult,
    /// When the last successful poll completed.
    pub last_success_at: Option<DateTime<Utc>>,
    /// When the last poll (of any outcome) completed.
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// Number of completed polls.
    pub poll_count: u64,
}

impl Default for CoordinatorState {
    fn default() -> Self {
        Self {
            data: None,
            last_result: Err(PollError::NotPolled),
            last_success_at: None,
            last_attempt_at: None,
            poll_count: 0,
        }
    }
}

impl CoordinatorState {
    /// Whether the most recent poll succeeded. Entities use this as their
    /// availability.
    pub fn last_update_success(&self) -> bool {
        self.last_result.is_ok()
    }

    pub fn last_error(&self) -> Option<&PollError> {
        self.last_result.as_ref().err()
    }

    /// The last good payload, if any poll has ever succeeded.
    pub fn data(&self) -> Option<&Payload> {
        self.data.as_deref()
    }
}

// ── Coordinator ──────────────────────────────────────────────────

/// Poller and cache for one device.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Independent of every other
/// coordinator; multiple devices never share state.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    name: String,
    client: ElectrochlorClient,
    endpoint: ArcSwap<DeviceEndpoint>,
    scan_interval: watch::Sender<Duration>,
    state: watch::Sender<CoordinatorState>,
    /// Held for the duration of a fetch; waiters coalesce onto its result.
    fetch_lock: Mutex<()>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a coordinator from configuration. Does NOT poll -- call
    /// [`first_refresh()`](Self::first_refresh) and [`start()`](Self::start).
    pub fn new(config: &DeviceConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.request_timeout);
        let client = ElectrochlorClient::new(&transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Create a coordinator around an existing client.
    pub fn with_client(config: &DeviceConfig, client: ElectrochlorClient) -> Self {
        let (scan_interval, _) = watch::channel(config.scan_interval);
        let (state, _) = watch::channel(CoordinatorState::default());

        Self {
            inner: Arc::new(CoordinatorInner {
                name: format!("Electrochlor {}", config.host),
                client,
                endpoint: ArcSwap::from_pointee(config.endpoint()),
                scan_interval,
                state,
                fetch_lock: Mutex::new(()),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn client(&self) -> &ElectrochlorClient {
        &self.inner.client
    }

    /// The endpoint currently polled.
    pub fn endpoint(&self) -> Arc<DeviceEndpoint> {
        self.inner.endpoint.load_full()
    }

    pub fn scan_interval(&self) -> Duration {
        *self.inner.scan_interval.borrow()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Poll once during setup, failing if the device cannot be read.
    ///
    /// Hosts use this to defer setup ("not ready, retry later") instead of
    /// registering entities against a device that never answered. A device
    /// that answers with its error flag set is reachable, so setup proceeds
    /// and the error surfaces through the entities.
    pub async fn first_refresh(&self) -> Result<(), CoreError> {
        match self.refresh().await {
            Ok(_) => Ok(()),
            Err(err @ PollError::DeviceError { .. }) => {
                warn!(device = %self.inner.name, error = %err, "device reported an error during setup");
                Ok(())
            }
            Err(err) => {
                warn!(device = %self.inner.name, error = %err, "initial poll failed");
                Err(err.into())
            }
        }
    }

    /// Spawn the scheduled polling job. Calling it again is a no-op.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() || self.inner.cancel.is_cancelled() {
            return;
        }
        let coordinator = self.clone();
        let interval_rx = self.inner.scan_interval.subscribe();
        let cancel = self.inner.cancel.clone();
        handles.push(tokio::spawn(refresh_task(coordinator, interval_rx, cancel)));
        debug!(device = %self.inner.name, interval = ?self.scan_interval(), "polling started");
    }

    /// Stop the polling job and any command verification in progress.
    ///
    /// Later refreshes return [`PollError::ShutDown`] without touching the
    /// network.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!(device = %self.inner.name, "coordinator shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Token cancelled on shutdown, for loops that must stop with the
    /// coordinator.
    pub(crate) fn cancellation(&self) -> &CancellationToken {
        &self.inner.cancel
    }

    /// Point the coordinator at a new address and/or interval, then poll.
    ///
    /// A changed interval re-arms the schedule from now.
    pub async fn reconfigure(&self, config: &DeviceConfig) -> PollResult {
        let endpoint = config.endpoint();
        if *self.inner.endpoint.load_full() != endpoint {
            info!(device = %self.inner.name, %endpoint, "device endpoint changed");
            self.inner.endpoint.store(Arc::new(endpoint));
        }
        self.inner.scan_interval.send_if_modified(|current| {
            if *current == config.scan_interval {
                false
            } else {
                *current = config.scan_interval;
                true
            }
        });
        self.refresh().await
    }

    // ── Polling ──────────────────────────────────────────────────

    /// Fetch fresh data now, or share the result of a fetch already running.
    ///
    /// A caller that arrives while another fetch is in flight waits for it
    /// and returns its outcome instead of issuing a second request. The
    /// cached state is updated before any waiter is released.
    pub async fn refresh(&self) -> PollResult {
        if self.is_shut_down() {
            return Err(PollError::ShutDown);
        }

        let seen = self.inner.state.borrow().poll_count;
        let _fetching = self.inner.fetch_lock.lock().await;
        {
            let state = self.inner.state.borrow();
            if state.poll_count != seen {
                debug!(device = %self.inner.name, "joined in-flight poll");
                return state.last_result.clone();
            }
        }

        let endpoint = self.inner.endpoint.load_full();
        let result = self
            .inner
            .client
            .fetch_status(&endpoint)
            .await
            .map(Arc::new)
            .map_err(PollError::from);

        self.record(&result);
        result
    }

    fn record(&self, result: &PollResult) {
        let now = Utc::now();
        let was_ok = self.inner.state.borrow().last_update_success();

        match result {
            Ok(_) if !was_ok && self.inner.state.borrow().poll_count > 0 => {
                info!(device = %self.inner.name, "device data available again");
            }
            Ok(_) => debug!(device = %self.inner.name, "poll succeeded"),
            Err(err) if was_ok => {
                warn!(device = %self.inner.name, error = %err, "poll failed, keeping last data");
            }
            Err(err) => debug!(device = %self.inner.name, error = %err, "poll still failing"),
        }

        self.inner.state.send_modify(|state| {
            state.poll_count += 1;
            state.last_attempt_at = Some(now);
            if let Ok(payload) = result {
                state.data = Some(Arc::clone(payload));
                state.last_success_at = Some(now);
            }
            state.last_result = result.clone();
        });
    }

    // ── State observation ────────────────────────────────────────

    /// Snapshot of the current state (cheap: the payload is shared).
    pub fn state(&self) -> CoordinatorState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state changes; fires once per completed poll.
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.inner.state.subscribe()
    }

    /// Last good payload.
    pub fn data(&self) -> Option<Arc<Payload>> {
        self.inner.state.borrow().data.clone()
    }

    pub fn last_update_success(&self) -> bool {
        self.inner.state.borrow().last_update_success()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Poll on the configured interval until cancelled.
///
/// Manual refreshes do not shift the schedule; an interval change re-arms
/// it. A zero interval parks the task until the interval changes.
async fn refresh_task(
    coordinator: Coordinator,
    mut interval_rx: watch::Receiver<Duration>,
    cancel: CancellationToken,
) {
    loop {
        let period = *interval_rx.borrow_and_update();

        if period.is_zero() {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                changed = interval_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    continue;
                }
            }
        }

        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                changed = interval_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    debug!(device = %coordinator.name(), "scan interval changed");
                    break;
                }
                _ = interval.tick() => {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return,
                        _ = coordinator.refresh() => {}
                    }
                }
            }
        }
    }
}
