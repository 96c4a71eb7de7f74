use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::view_data::ViewData;
use crate::client::{BoxFuture, ClientResult};

/// A refresh request bound to a concrete (location, target) pair. The owning
/// view rebuilds the closure whenever either changes and restarts the
/// scheduler with it.
pub type FetchFn<T> = Arc<dyn Fn() -> BoxFuture<ClientResult<T>> + Send + Sync>;

struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Recurring asynchronous refresh owned by a single view: one immediate
/// request on start, then one request per period. At most one worker task
/// and one timer exist per instance; stopping tears the worker down
/// deterministically and marks any in-flight response stale through the
/// epoch counter, so a superseded response can never overwrite newer state.
pub struct Scheduler<T> {
    name: &'static str,
    period: Duration,
    shared: Arc<Mutex<ViewData<T>>>,
    epoch: Arc<AtomicU64>,
    refresh: Arc<Notify>,
    worker: Option<WorkerHandle>,
}

impl<T: Send + 'static> Scheduler<T> {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Scheduler {
            name,
            period,
            shared: Arc::new(Mutex::new(ViewData::default())),
            epoch: Arc::new(AtomicU64::new(0)),
            refresh: Arc::new(Notify::new()),
            worker: None,
        }
    }

    pub fn snapshot(&self) -> ViewData<T>
    where
        T: Clone,
    {
        self.shared
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_active(&self) -> bool {
        self.worker.is_some()
    }

    /// Starts (or restarts) the refresh cycle for a new (location, target)
    /// binding. Any previous worker is stopped first and the held value is
    /// cleared, since it belonged to the previous binding.
    pub async fn start(&mut self, fetch: FetchFn<T>) {
        self.stop().await;

        *self.shared.lock().unwrap_or_else(|e| e.into_inner()) = ViewData::default();
        let my_epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let (stop_tx, mut stop_rx) = oneshot::channel();
        let shared = self.shared.clone();
        let epoch = self.epoch.clone();
        let refresh = self.refresh.clone();
        let period = self.period;
        let name = self.name;

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // The first tick completes immediately, so activation issues
                // one request right away. Manual refreshes coalesce through
                // the Notify permit and never add a second timer.
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = refresh.notified() => {}
                    _ = &mut stop_rx => break,
                }
                tokio::select! {
                    _ = run_once(name, &shared, &epoch, my_epoch, &fetch) => {}
                    _ = &mut stop_rx => break,
                }
                if epoch.load(Ordering::SeqCst) != my_epoch {
                    break;
                }
            }
        });

        self.worker = Some(WorkerHandle { stop_tx, join });
    }

    /// Stops the worker and joins it. Bumping the epoch first makes any
    /// response still in flight stale before the worker can observe the stop
    /// signal.
    pub async fn stop(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.join.await;
        }
    }

    /// User-triggered refresh. Safe to call while a request is in flight:
    /// the worker picks the permit up after the current request completes.
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }
}

impl<T> Drop for Scheduler<T> {
    fn drop(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            worker.join.abort();
        }
    }
}

async fn run_once<T>(
    name: &'static str,
    shared: &Arc<Mutex<ViewData<T>>>,
    epoch: &Arc<AtomicU64>,
    my_epoch: u64,
    fetch: &FetchFn<T>,
) {
    let _guard = super::view_data::LoadingGuard::engage(shared);

    let result = fetch().await;

    let mut locked = shared.lock().unwrap_or_else(|e| e.into_inner());
    if epoch.load(Ordering::SeqCst) != my_epoch {
        // Superseded while in flight; discard silently.
        return;
    }
    match result {
        Ok(value) => locked.apply_success(value),
        Err(e) => {
            log::warn!("{} refresh failed: {}", name, e);
            locked.apply_failure();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::scheduler::view_data::Freshness;
    use std::sync::atomic::AtomicU32;

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        for _ in 0..1000 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        panic!("condition not met in time");
    }

    fn counting_fetch(counter: Arc<AtomicU32>) -> FetchFn<u32> {
        Arc::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Box::pin(async move { Ok(n) })
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_immediately_then_on_period() {
        let mut scheduler = Scheduler::new("test", Duration::from_secs(30));
        let counter = Arc::new(AtomicU32::new(0));
        scheduler.start(counting_fetch(counter.clone())).await;

        wait_until(|| scheduler.snapshot().value == Some(1)).await;
        assert_eq!(scheduler.snapshot().freshness, Freshness::Fresh);

        wait_until(|| counter.load(Ordering::SeqCst) >= 2).await;
        scheduler.stop().await;
        assert!(!scheduler.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_refresh_does_not_wait_for_tick() {
        let mut scheduler = Scheduler::new("test", Duration::from_secs(3600));
        let counter = Arc::new(AtomicU32::new(0));
        scheduler.start(counting_fetch(counter.clone())).await;

        wait_until(|| scheduler.snapshot().value == Some(1)).await;
        scheduler.refresh_now();
        wait_until(|| scheduler.snapshot().value == Some(2)).await;
        // Far from the hour tick, so only the two requests happened.
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn switching_targets_discards_the_old_response() {
        let mut scheduler = Scheduler::new("test", Duration::from_secs(3600));

        let (release_tx, release_rx) = oneshot::channel::<()>();
        let release_rx = Arc::new(Mutex::new(Some(release_rx)));
        let slow_a: FetchFn<u32> = Arc::new(move || {
            let rx = release_rx.lock().unwrap().take();
            Box::pin(async move {
                if let Some(rx) = rx {
                    let _ = rx.await;
                }
                Ok(111)
            })
        });

        scheduler.start(slow_a).await;
        wait_until(|| scheduler.snapshot().loading).await;

        // Retarget while A's request is still in flight.
        let fast_b: FetchFn<u32> = Arc::new(|| Box::pin(async { Ok(222) }));
        scheduler.start(fast_b).await;
        let _ = release_tx.send(());

        wait_until(|| scheduler.snapshot().value == Some(222)).await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(scheduler.snapshot().value, Some(222));
        assert!(scheduler.is_active());
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_previous_value_as_stale() {
        let mut scheduler = Scheduler::new("test", Duration::from_secs(30));
        let counter = Arc::new(AtomicU32::new(0));
        let flaky: FetchFn<u32> = {
            let counter = counter.clone();
            Arc::new(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move {
                    if n == 0 {
                        Ok(5)
                    } else {
                        Err(ClientError::Service("/api/track"))
                    }
                })
            })
        };
        scheduler.start(flaky).await;

        wait_until(|| scheduler.snapshot().value == Some(5)).await;
        wait_until(|| scheduler.snapshot().freshness == Freshness::Stale).await;

        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.value, Some(5));
        assert!(!snapshot.loading);
        scheduler.stop().await;
    }
}
