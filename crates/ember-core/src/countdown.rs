//! Countdown to a fixed target instant.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::error::{CoreError, Result};
use crate::host::{Interval, SystemTime, ThreadTimer, TickFlow, TimeSource, TimerHost};

/// Tick period used when the host does not pick one.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(1000);

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Remaining time broken down into whole units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Remaining {
    pub days: u64,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Remaining {
    pub const ZERO: Remaining = Remaining {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Break a distance in milliseconds into days, hours, minutes and seconds.
    /// Each unit truncates; leftover milliseconds are dropped. Non-positive
    /// distances yield [`Remaining::ZERO`].
    pub fn from_millis(distance: i64) -> Self {
        if distance <= 0 {
            return Self::ZERO;
        }
        Self {
            days: (distance / MS_PER_DAY) as u64,
            hours: ((distance % MS_PER_DAY) / MS_PER_HOUR) as u32,
            minutes: ((distance % MS_PER_HOUR) / MS_PER_MINUTE) as u32,
            seconds: ((distance % MS_PER_MINUTE) / MS_PER_SECOND) as u32,
        }
    }

    /// Total whole milliseconds represented by this snapshot.
    pub fn total_millis(&self) -> u128 {
        self.days as u128 * MS_PER_DAY as u128
            + self.hours as u128 * MS_PER_HOUR as u128
            + self.minutes as u128 * MS_PER_MINUTE as u128
            + self.seconds as u128 * MS_PER_SECOND as u128
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[derive(Debug, Default)]
struct ClockState {
    remaining: Remaining,
    finished: bool,
}

/// Recompute the snapshot against `now`. Returns whether the timer should keep going.
fn tick(state: &Mutex<ClockState>, target: DateTime<Utc>, time: &dyn TimeSource) -> TickFlow {
    let distance = (target - time.now()).num_milliseconds();
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);

    if state.finished {
        return TickFlow::Stop;
    }
    if distance <= 0 {
        state.remaining = Remaining::ZERO;
        state.finished = true;
        info!("countdown reached target {target}");
        return TickFlow::Stop;
    }

    state.remaining = Remaining::from_millis(distance);
    TickFlow::Continue
}

/// Periodically recomputed countdown to a target instant.
///
/// The clock owns the interval handle it obtained from its [`TimerHost`].
/// [`CountdownClock::stop`] (and dropping the clock) cancels it; after that
/// the snapshot never changes again.
pub struct CountdownClock {
    target: DateTime<Utc>,
    tick_period: Duration,
    timer: Arc<dyn TimerHost>,
    time: Arc<dyn TimeSource>,
    state: Arc<Mutex<ClockState>>,
    interval: Option<Box<dyn Interval>>,
}

impl fmt::Debug for CountdownClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownClock")
            .field("target", &self.target)
            .field("tick_period", &self.tick_period)
            .field("remaining", &self.current())
            .field("running", &self.is_running())
            .finish()
    }
}

impl CountdownClock {
    /// Create a stopped clock. The snapshot reads zero until the first tick.
    pub fn new(
        target: DateTime<Utc>,
        tick_period: Duration,
        timer: Arc<dyn TimerHost>,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self> {
        if tick_period.is_zero() {
            return Err(CoreError::invalid(
                "tick_period",
                "tick period must be greater than zero",
            ));
        }
        Ok(Self {
            target,
            tick_period,
            timer,
            time,
            state: Arc::new(Mutex::new(ClockState::default())),
            interval: None,
        })
    }

    /// Clock driven by a worker thread and the system wall clock.
    pub fn system(target: DateTime<Utc>, tick_period: Duration) -> Result<Self> {
        Self::new(
            target,
            tick_period,
            Arc::new(ThreadTimer),
            Arc::new(SystemTime),
        )
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin ticking.
    ///
    /// The first tick runs immediately so the snapshot is fresh on return.
    /// Calling this while running, or after the target was reached, does
    /// nothing.
    pub fn start(&mut self) -> Result<()> {
        if self.interval.is_some() || self.state().finished {
            return Ok(());
        }

        if tick(&self.state, self.target, self.time.as_ref()) == TickFlow::Stop {
            return Ok(());
        }

        let state = Arc::clone(&self.state);
        let time = Arc::clone(&self.time);
        let target = self.target;
        let interval = self.timer.set_interval(
            self.tick_period,
            Box::new(move || tick(&state, target, time.as_ref())),
        )?;

        debug!(
            "countdown to {} started, ticking every {}ms",
            self.target,
            self.tick_period.as_millis()
        );
        self.interval = Some(interval);
        Ok(())
    }

    /// Cancel ticking. Safe to call when not started.
    pub fn stop(&mut self) {
        if let Some(mut interval) = self.interval.take() {
            interval.cancel();
            debug!("countdown to {} stopped", self.target);
        }
    }

    /// Latest snapshot.
    pub fn current(&self) -> Remaining {
        self.state().remaining
    }

    /// Whether a timer is scheduled and the target has not been reached.
    pub fn is_running(&self) -> bool {
        self.interval.is_some() && !self.state().finished
    }

    /// Whether the target instant has been reached.
    pub fn is_finished(&self) -> bool {
        self.state().finished
    }

    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }
}

impl Drop for CountdownClock {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ManualTimer;
    use chrono::TimeZone;

    struct FixedTime(DateTime<Utc>);

    impl TimeSource for FixedTime {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 23, h, m, s).unwrap()
    }

    #[test]
    fn test_decomposition() {
        let r = Remaining::from_millis(90_061_000);
        assert_eq!(
            r,
            Remaining {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1
            }
        );
    }

    #[test]
    fn test_decomposition_truncates() {
        let r = Remaining::from_millis(MS_PER_HOUR * 2 + 59_999);
        assert_eq!(r.hours, 2);
        assert_eq!(r.minutes, 0);
        assert_eq!(r.seconds, 59);
        assert_eq!(Remaining::from_millis(999), Remaining::ZERO);
    }

    #[test]
    fn test_non_positive_distance_is_zero() {
        assert_eq!(Remaining::from_millis(0), Remaining::ZERO);
        assert_eq!(Remaining::from_millis(-5_000), Remaining::ZERO);
    }

    #[test]
    fn test_total_millis() {
        let r = Remaining::from_millis(90_061_000);
        assert_eq!(r.total_millis(), 90_061_000);
    }

    #[test]
    fn test_display() {
        let r = Remaining::from_millis(90_061_000);
        assert_eq!(r.to_string(), "01d 01h 01m 01s");
    }

    #[test]
    fn test_zero_tick_period_rejected() {
        let err = CountdownClock::new(
            at(9, 0, 0),
            Duration::ZERO,
            Arc::new(ManualTimer::new()),
            Arc::new(FixedTime(at(8, 0, 0))),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidArgument {
                name: "tick_period",
                ..
            }
        ));
    }

    #[test]
    fn test_start_takes_immediate_snapshot() {
        let timer = ManualTimer::new();
        let mut clock = CountdownClock::new(
            at(10, 1, 1),
            DEFAULT_TICK_PERIOD,
            Arc::new(timer.clone()),
            Arc::new(FixedTime(at(9, 0, 0))),
        )
        .unwrap();

        assert_eq!(clock.current(), Remaining::ZERO);
        assert!(!clock.is_running());

        clock.start().unwrap();
        assert!(clock.is_running());
        assert_eq!(
            clock.current(),
            Remaining {
                days: 0,
                hours: 1,
                minutes: 1,
                seconds: 1
            }
        );
        assert_eq!(timer.periods(), vec![DEFAULT_TICK_PERIOD]);
    }

    #[test]
    fn test_past_target_never_schedules() {
        let timer = ManualTimer::new();
        let mut clock = CountdownClock::new(
            at(8, 0, 0),
            DEFAULT_TICK_PERIOD,
            Arc::new(timer.clone()),
            Arc::new(FixedTime(at(9, 0, 0))),
        )
        .unwrap();

        clock.start().unwrap();
        assert_eq!(clock.current(), Remaining::ZERO);
        assert!(clock.is_finished());
        assert!(!clock.is_running());
        assert_eq!(timer.active(), 0);
    }

    #[test]
    fn test_start_is_idempotent() {
        let timer = ManualTimer::new();
        let mut clock = CountdownClock::new(
            at(10, 0, 0),
            DEFAULT_TICK_PERIOD,
            Arc::new(timer.clone()),
            Arc::new(FixedTime(at(9, 0, 0))),
        )
        .unwrap();

        clock.start().unwrap();
        clock.start().unwrap();
        assert_eq!(timer.active(), 1);
    }

    #[test]
    fn test_stop_before_start_is_safe() {
        let mut clock = CountdownClock::new(
            at(10, 0, 0),
            DEFAULT_TICK_PERIOD,
            Arc::new(ManualTimer::new()),
            Arc::new(FixedTime(at(9, 0, 0))),
        )
        .unwrap();
        clock.stop();
        clock.stop();
        assert!(!clock.is_running());
    }

    #[test]
    fn test_drop_cancels_interval() {
        let timer = ManualTimer::new();
        {
            let mut clock = CountdownClock::new(
                at(10, 0, 0),
                DEFAULT_TICK_PERIOD,
                Arc::new(timer.clone()),
                Arc::new(FixedTime(at(9, 0, 0))),
            )
            .unwrap();
            clock.start().unwrap();
            assert_eq!(timer.active(), 1);
        }
        assert_eq!(timer.active(), 0);
    }
}
