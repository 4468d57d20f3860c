//! Tick scheduler
//!
//! Owns every repeating timer and fires them on a single logical execution
//! context. Timers are registered through a weak [`SchedulerHandle`] and
//! identified by generational [`TimerId`]s, so cancelling a timer that has
//! already finished is a harmless no-op.
//!
//! The scheduler keeps a virtual clock. It can be driven three ways:
//! - `advance(dt)` - move the clock by an explicit amount (deterministic)
//! - `tick()` - move the clock by the wall-clock time since the last tick
//! - `start_background()` - call `tick()` from a dedicated thread
//!
//! Callbacks run while the scheduler lock is held. Cancelling a timer from
//! another thread therefore waits for any in-flight firing to finish, and once
//! `cancel_timer` returns the callback never runs again. Callbacks must not
//! call back into the scheduler.

use slotmap::{new_key_type, SlotMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Shortest interval a timer may repeat at
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Default sleep between background ticks
pub const DEFAULT_RESOLUTION: Duration = Duration::from_millis(4);

new_key_type! {
    /// Handle to a registered repeating timer
    pub struct TimerId;
}

/// Returned by a timer callback to keep or stop its timer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickControl {
    /// Fire again after the next interval
    Continue,
    /// Remove the timer; it will not fire again
    Stop,
}

/// Callback invoked each time a timer fires
pub type TickCallback = Box<dyn FnMut() -> TickControl + Send>;

struct RepeatingTimer {
    interval: Duration,
    next_due: Duration,
    callback: TickCallback,
}

/// Internal state of the tick scheduler
struct SchedulerInner {
    timers: SlotMap<TimerId, RepeatingTimer>,
    /// Virtual clock, advanced by `advance`/`tick`
    now: Duration,
    /// Wall-clock instant of the last `tick`, once wall-clock driving started
    last_tick: Option<Instant>,
}

impl SchedulerInner {
    /// Catch the virtual clock up with wall-clock time without firing anything
    ///
    /// Only applies once the scheduler is wall-clock driven; a manually
    /// advanced scheduler stays fully deterministic.
    fn sync_clock(&mut self) {
        if let Some(last) = self.last_tick {
            let real = Instant::now();
            self.now += real.saturating_duration_since(last);
            self.last_tick = Some(real);
        }
    }

    fn advance(&mut self, dt: Duration) -> bool {
        self.now += dt;
        let now = self.now;

        let mut finished = Vec::new();
        for (id, timer) in self.timers.iter_mut() {
            while timer.next_due <= now {
                timer.next_due += timer.interval;
                if (timer.callback)() == TickControl::Stop {
                    finished.push(id);
                    break;
                }
            }
        }

        for id in finished {
            tracing::trace!("TickScheduler: timer {:?} finished", id);
            self.timers.remove(id);
        }

        !self.timers.is_empty()
    }
}

fn lock(inner: &Mutex<SchedulerInner>) -> MutexGuard<'_, SchedulerInner> {
    // A panicking callback must not wedge every other timer
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The scheduler that fires all registered repeating timers
///
/// Typically owned by the host's event loop and shared with components via
/// [`SchedulerHandle`].
///
/// # Background Thread Mode
///
/// ```ignore
/// let mut scheduler = TickScheduler::new();
/// scheduler.start_background(); // ticks every 4ms on its own thread
/// ```
pub struct TickScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
    /// Stop signal for background thread
    stop_flag: Arc<AtomicBool>,
    /// Background thread handle (if running)
    thread_handle: Option<JoinHandle<()>>,
    resolution: Duration,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                timers: SlotMap::with_key(),
                now: Duration::ZERO,
                last_tick: None,
            })),
            stop_flag: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
            resolution: DEFAULT_RESOLUTION,
        }
    }

    /// Set how long the background thread sleeps between ticks
    ///
    /// Takes effect the next time the background thread is started.
    pub fn set_resolution(&mut self, resolution: Duration) {
        self.resolution = resolution.max(MIN_INTERVAL);
    }

    pub fn resolution(&self) -> Duration {
        self.resolution
    }

    /// Start ticking on a background thread
    ///
    /// Timers keep firing at their cadence without the host having to pump
    /// `tick()` itself.
    pub fn start_background(&mut self) {
        if self.thread_handle.is_some() {
            return; // Already running
        }

        let inner = Arc::clone(&self.inner);
        let stop_flag = Arc::clone(&self.stop_flag);
        let resolution = self.resolution;

        tracing::debug!(
            "TickScheduler: starting background thread ({:?} resolution)",
            resolution
        );

        self.thread_handle = Some(thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                let start = Instant::now();
                tick_inner(&inner);

                let elapsed = start.elapsed();
                if elapsed < resolution {
                    thread::sleep(resolution - elapsed);
                }
            }
        }));
    }

    /// Stop the background thread
    pub fn stop_background(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                tracing::warn!("TickScheduler: background thread panicked");
            }
        }
        self.stop_flag.store(false, Ordering::Relaxed);
    }

    /// Check if the background thread is running
    pub fn is_background_running(&self) -> bool {
        self.thread_handle.is_some()
    }

    /// Get a handle to this scheduler for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Fire every timer that came due since the previous `tick`
    ///
    /// Returns true if any timers remain registered.
    pub fn tick(&self) -> bool {
        tick_inner(&self.inner)
    }

    /// Move the clock forward by `dt`, firing every timer that comes due
    ///
    /// A timer due several times within `dt` fires that many times, in order.
    /// Returns true if any timers remain registered.
    pub fn advance(&self, dt: Duration) -> bool {
        lock(&self.inner).advance(dt)
    }

    /// Current reading of the virtual clock
    pub fn elapsed(&self) -> Duration {
        lock(&self.inner).now
    }

    /// Check if any timers are registered
    pub fn has_active_timers(&self) -> bool {
        !lock(&self.inner).timers.is_empty()
    }

    /// Get the number of registered timers
    pub fn timer_count(&self) -> usize {
        lock(&self.inner).timers.len()
    }
}

fn tick_inner(inner: &Mutex<SchedulerInner>) -> bool {
    let mut guard = lock(inner);
    let now = Instant::now();
    let dt = match guard.last_tick {
        Some(last) => now.saturating_duration_since(last),
        None => Duration::ZERO,
    };
    guard.last_tick = Some(now);
    guard.advance(dt)
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        // Stop background thread when scheduler is dropped
        self.stop_background();
    }
}

/// A weak handle to the tick scheduler
///
/// This is passed to components that need timers. It won't prevent the
/// scheduler from being dropped; operations on a dead handle do nothing.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Register a repeating timer and return its ID
    ///
    /// The first firing happens one full `interval` after registration.
    /// Returns `None` if the scheduler has been dropped.
    pub fn register_timer<F>(&self, interval: Duration, callback: F) -> Option<TimerId>
    where
        F: FnMut() -> TickControl + Send + 'static,
    {
        let inner = self.inner.upgrade()?;
        let mut guard = lock(&inner);
        guard.sync_clock();

        let interval = interval.max(MIN_INTERVAL);
        let next_due = guard.now + interval;
        let id = guard.timers.insert(RepeatingTimer {
            interval,
            next_due,
            callback: Box::new(callback),
        });
        tracing::trace!("TickScheduler: registered timer {:?} every {:?}", id, interval);
        Some(id)
    }

    /// Cancel a timer
    ///
    /// Returns true if the timer was still registered. Once this returns the
    /// callback will not be invoked again.
    pub fn cancel_timer(&self, id: TimerId) -> bool {
        match self.inner.upgrade() {
            Some(inner) => lock(&inner).timers.remove(id).is_some(),
            None => false,
        }
    }

    /// Check if a timer is still registered
    pub fn is_timer_active(&self, id: TimerId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| lock(&inner).timers.contains_key(id))
            .unwrap_or(false)
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}
