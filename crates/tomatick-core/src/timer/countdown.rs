//! Countdown driver.
//!
//! A countdown ticks once per period from its duration down to zero on the
//! tokio timer, reporting every value to `on_tick` and finishing with a single
//! `on_complete`. Callbacks run on the countdown's own task, so they should
//! hand their data off (a channel send, an atomic store) rather than block.
//!
//! ## State Transitions
//!
//! ```text
//! Running -> Completed
//! Running -> Cancelled
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let driver = CountdownDriver::new();
//! let handle = driver.begin(1500, |remaining| render(remaining), || next_session());
//! // later:
//! driver.cancel(&handle);
//! ```

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Default wall-clock spacing between two ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Slot value meaning "no countdown running".
const IDLE: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CountdownState {
    Running = 0,
    Completed = 1,
    Cancelled = 2,
}

impl CountdownState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => CountdownState::Running,
            1 => CountdownState::Completed,
            _ => CountdownState::Cancelled,
        }
    }
}

#[derive(Debug)]
struct Shared {
    id: u64,
    state: AtomicU8,
    remaining: AtomicU64,
    /// Wakes the tick task early on cancel.
    wake: Notify,
    /// The owning driver's active slot; holds `id` while this countdown runs.
    slot: Arc<AtomicU64>,
}

impl Shared {
    fn state(&self) -> CountdownState {
        CountdownState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Leave `Running` for `to`. Returns false if another transition won.
    fn finish(&self, to: CountdownState) -> bool {
        let left = self
            .state
            .compare_exchange(
                CountdownState::Running as u8,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if left {
            // Only clear the slot if a newer countdown hasn't claimed it.
            let _ = self
                .slot
                .compare_exchange(self.id, IDLE, Ordering::AcqRel, Ordering::Acquire);
        }
        left
    }
}

/// Handle to one countdown, returned by [`CountdownDriver::begin`].
///
/// Cheap to clone; all clones refer to the same countdown.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    shared: Arc<Shared>,
}

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn state(&self) -> CountdownState {
        self.shared.state()
    }

    /// Last value reported to `on_tick`.
    pub fn remaining(&self) -> u64 {
        self.shared.remaining.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.state() == CountdownState::Running
    }
}

/// Drives at most one countdown at a time.
#[derive(Debug)]
pub struct CountdownDriver {
    period: Duration,
    active: Arc<AtomicU64>,
    next_id: AtomicU64,
}

impl Default for CountdownDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownDriver {
    /// Driver ticking once per second.
    pub fn new() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    /// Driver ticking once per `period`.
    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            active: Arc::new(AtomicU64::new(IDLE)),
            next_id: AtomicU64::new(1),
        }
    }

    /// True when no countdown of this driver is running.
    pub fn is_idle(&self) -> bool {
        self.active.load(Ordering::Acquire) == IDLE
    }

    /// Start counting `duration_secs` down to zero.
    ///
    /// `on_tick(duration_secs)` runs before this returns; every later tick and
    /// `on_complete` run on a spawned tokio task.
    ///
    /// # Panics
    ///
    /// Panics if a countdown of this driver is still running, or if called
    /// outside a tokio runtime.
    pub fn begin<T, C>(&self, duration_secs: u64, mut on_tick: T, on_complete: C) -> TimerHandle
    where
        T: FnMut(u64) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Err(running) =
            self.active
                .compare_exchange(IDLE, id, Ordering::AcqRel, Ordering::Acquire)
        {
            panic!("countdown {running} is still running; cancel it before beginning another");
        }

        let shared = Arc::new(Shared {
            id,
            state: AtomicU8::new(CountdownState::Running as u8),
            remaining: AtomicU64::new(duration_secs),
            wake: Notify::new(),
            slot: Arc::clone(&self.active),
        });
        debug!(id, duration_secs, "countdown started");
        on_tick(duration_secs);

        let task = Arc::clone(&shared);
        let period = self.period;
        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            // Late wakes are delivered back to back; no value is skipped.
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

            let mut remaining = duration_secs;
            while remaining > 0 {
                tokio::select! {
                    biased;
                    _ = task.wake.notified() => return,
                    _ = interval.tick() => {}
                }
                if task.state() != CountdownState::Running {
                    return;
                }
                remaining -= 1;
                task.remaining.store(remaining, Ordering::Release);
                trace!(id = task.id, remaining, "tick");
                on_tick(remaining);
            }

            if task.finish(CountdownState::Completed) {
                debug!(id = task.id, "countdown completed");
                on_complete();
            }
        });

        TimerHandle { shared }
    }

    /// Stop a countdown. No-op if it already completed or was cancelled.
    pub fn cancel(&self, handle: &TimerHandle) {
        if handle.shared.finish(CountdownState::Cancelled) {
            handle.shared.wake.notify_one();
            debug!(
                id = handle.id(),
                remaining = handle.remaining(),
                "countdown cancelled"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    fn recorder() -> (Arc<Mutex<Vec<u64>>>, impl FnMut(u64) + Send + 'static) {
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&ticks);
        (ticks, move |remaining| sink.lock().unwrap().push(remaining))
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_to_zero_then_completes_once() {
        let driver = CountdownDriver::new();
        let (ticks, on_tick) = recorder();
        let (done_tx, done_rx) = oneshot::channel();
        let started = Instant::now();

        let handle = driver.begin(3, on_tick, move || done_tx.send(()).unwrap());
        assert_eq!(*ticks.lock().unwrap(), vec![3]);

        done_rx.await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(3));
        assert_eq!(*ticks.lock().unwrap(), vec![3, 2, 1, 0]);
        assert_eq!(handle.state(), CountdownState::Completed);
        assert!(driver.is_idle());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.lock().unwrap().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_first_tick_stops_everything() {
        let driver = CountdownDriver::new();
        let (ticks, on_tick) = recorder();
        let completed = Arc::new(AtomicU8::new(0));
        let flag = Arc::clone(&completed);

        let handle = driver.begin(5, on_tick, move || {
            flag.fetch_add(1, Ordering::SeqCst);
        });
        driver.cancel(&handle);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(*ticks.lock().unwrap(), vec![5]);
        assert_eq!(completed.load(Ordering::SeqCst), 0);
        assert_eq!(handle.state(), CountdownState::Cancelled);
        assert!(driver.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_mid_countdown_keeps_remaining() {
        let driver = CountdownDriver::new();
        let (ticks, on_tick) = recorder();
        let handle = driver.begin(10, on_tick, || {});

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        driver.cancel(&handle);
        tokio::time::sleep(Duration::from_secs(20)).await;

        assert_eq!(*ticks.lock().unwrap(), vec![10, 9, 8]);
        assert_eq!(handle.remaining(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent_and_ignores_finished_handles() {
        let driver = CountdownDriver::new();
        let (done_tx, done_rx) = oneshot::channel();
        let first = driver.begin(1, |_| {}, move || done_tx.send(()).unwrap());
        done_rx.await.unwrap();

        driver.cancel(&first);
        driver.cancel(&first);
        assert_eq!(first.state(), CountdownState::Completed);

        let second = driver.begin(2, |_| {}, || {});
        // Cancelling a stale handle must not free the slot of the new one.
        driver.cancel(&first);
        assert!(!driver.is_idle());
        assert!(second.is_running());

        driver.cancel(&second);
        driver.cancel(&second);
        assert!(driver.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_completes_without_waiting() {
        let driver = CountdownDriver::new();
        let (ticks, on_tick) = recorder();
        let (done_tx, done_rx) = oneshot::channel();
        let started = Instant::now();

        driver.begin(0, on_tick, move || done_tx.send(()).unwrap());
        done_rx.await.unwrap();

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(*ticks.lock().unwrap(), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_period_spaces_ticks() {
        let driver = CountdownDriver::with_period(Duration::from_millis(10));
        let (done_tx, done_rx) = oneshot::channel();
        let started = Instant::now();

        driver.begin(4, |_| {}, move || done_tx.send(()).unwrap());
        done_rx.await.unwrap();

        assert_eq!(started.elapsed(), Duration::from_millis(40));
    }

    #[tokio::test]
    #[should_panic(expected = "still running")]
    async fn second_begin_while_running_panics() {
        let driver = CountdownDriver::new();
        let _first = driver.begin(60, |_| {}, || {});
        let _second = driver.begin(60, |_| {}, || {});
    }
}
