//! Host primitives: wall-clock time and periodic timers.
//!
//! The countdown never sleeps or spawns on its own. It asks a [`TimerHost`]
//! for an interval and keeps the returned [`Interval`] handle; dropping or
//! cancelling that handle is the only way ticks stop.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::error::{CoreError, Result};

/// Source of the current instant.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// What a tick callback asks of its interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    Stop,
}

/// Callback run on every interval firing.
pub type TickFn = Box<dyn FnMut() -> TickFlow + Send + 'static>;

/// A scheduled periodic callback owned by whoever scheduled it.
pub trait Interval: Send {
    /// Stop the interval. Once this returns the callback never runs again.
    /// Calling it more than once is a no-op.
    fn cancel(&mut self);
}

/// A host able to run a callback on a fixed period.
pub trait TimerHost: Send + Sync {
    fn set_interval(&self, period: Duration, tick: TickFn) -> Result<Box<dyn Interval>>;
}

// ========== THREAD TIMER ==========

/// Timer host backed by one worker thread per interval.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadTimer;

#[derive(Debug, Default)]
struct IntervalSignal {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

/// Handle to an interval running on its own thread.
pub struct ThreadInterval {
    signal: Arc<IntervalSignal>,
    worker: Option<JoinHandle<()>>,
}

impl fmt::Debug for ThreadInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadInterval")
            .field("running", &self.worker.is_some())
            .finish()
    }
}

impl TimerHost for ThreadTimer {
    fn set_interval(&self, period: Duration, mut tick: TickFn) -> Result<Box<dyn Interval>> {
        if period.is_zero() {
            return Err(CoreError::invalid("period", "interval period must be non-zero"));
        }

        let signal = Arc::new(IntervalSignal::default());
        let worker_signal = Arc::clone(&signal);

        let worker = thread::Builder::new()
            .name("ember-interval".to_string())
            .spawn(move || {
                let mut cancelled = worker_signal
                    .cancelled
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                let mut deadline = Instant::now() + period;

                loop {
                    while !*cancelled {
                        let now = Instant::now();
                        if now >= deadline {
                            break;
                        }
                        cancelled = match worker_signal.wake.wait_timeout(cancelled, deadline - now)
                        {
                            Ok((guard, _)) => guard,
                            Err(poisoned) => poisoned.into_inner().0,
                        };
                    }
                    if *cancelled {
                        return;
                    }

                    // The lock stays held while ticking so cancel() cannot
                    // return in the middle of a tick.
                    if tick() == TickFlow::Stop {
                        *cancelled = true;
                        return;
                    }

                    let now = Instant::now();
                    deadline += period;
                    if deadline < now {
                        deadline = now + period;
                    }
                }
            })
            .map_err(|e| {
                warn!("timer thread spawn failed: {e}");
                CoreError::HostUnavailable(format!("cannot spawn timer thread: {e}"))
            })?;

        debug!("interval scheduled every {}ms", period.as_millis());
        Ok(Box::new(ThreadInterval {
            signal,
            worker: Some(worker),
        }))
    }
}

impl Interval for ThreadInterval {
    fn cancel(&mut self) {
        {
            let mut cancelled = self
                .signal
                .cancelled
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *cancelled = true;
        }
        self.signal.wake.notify_all();

        if let Some(worker) = self.worker.take()
            && worker.thread().id() != thread::current().id()
        {
            let _ = worker.join();
        }
    }
}

impl Drop for ThreadInterval {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ========== MANUAL TIMER ==========

/// Timer host fired explicitly by the owner's own loop.
///
/// Every call to [`ManualTimer::fire`] runs each live interval once, in
/// scheduling order. Useful for hosts that already run a frame loop and for
/// driving the countdown deterministically.
#[derive(Clone, Default)]
pub struct ManualTimer {
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Default)]
struct ManualState {
    next_id: u64,
    entries: Vec<ManualEntry>,
    fired: u64,
}

struct ManualEntry {
    id: u64,
    period: Duration,
    tick: TickFn,
}

/// Handle returned by [`ManualTimer`]. Holds only a weak link to the host.
#[derive(Debug)]
pub struct ManualInterval {
    id: u64,
    host: Weak<Mutex<ManualState>>,
}

impl fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualTimer")
            .field("active", &self.active())
            .field("fired", &self.fired())
            .finish()
    }
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run every live interval once. Returns how many callbacks ran.
    pub fn fire(&self) -> usize {
        let mut state = self.state();
        let mut ran = 0;
        state.entries.retain_mut(|entry| {
            ran += 1;
            (entry.tick)() == TickFlow::Continue
        });
        state.fired += ran as u64;
        ran
    }

    /// Number of intervals still scheduled.
    pub fn active(&self) -> usize {
        self.state().entries.len()
    }

    /// Total callbacks run since creation.
    pub fn fired(&self) -> u64 {
        self.state().fired
    }

    /// Periods of the live intervals, in scheduling order.
    pub fn periods(&self) -> Vec<Duration> {
        self.state().entries.iter().map(|e| e.period).collect()
    }
}

impl TimerHost for ManualTimer {
    fn set_interval(&self, period: Duration, tick: TickFn) -> Result<Box<dyn Interval>> {
        if period.is_zero() {
            return Err(CoreError::invalid("period", "interval period must be non-zero"));
        }
        let mut state = self.state();
        let id = state.next_id;
        state.next_id += 1;
        state.entries.push(ManualEntry { id, period, tick });
        Ok(Box::new(ManualInterval {
            id,
            host: Arc::downgrade(&self.inner),
        }))
    }
}

impl Interval for ManualInterval {
    fn cancel(&mut self) {
        if let Some(host) = self.host.upgrade() {
            let mut state = host.lock().unwrap_or_else(PoisonError::into_inner);
            state.entries.retain(|e| e.id != self.id);
        }
    }
}

impl Drop for ManualInterval {
    fn drop(&mut self) {
        self.cancel();
    }
}
