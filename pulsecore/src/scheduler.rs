//! PulseScheduler: the adaptive-rate tick.
//!
//! Each tick flips the heart, tells subscribers, then samples the BPM ramp
//! *at that moment* and arms the next tick with the matching interval. The
//! cadence coasts at each momentary rate until the next toggle, which keeps
//! it smooth while the BPM slides without any high-frequency polling.
//!
//! The scheduler does not own a thread. Whatever event loop drives it calls
//! [`PulseScheduler::poll`] and sleeps (or schedules a repaint) until
//! [`PulseScheduler::next_deadline`].

use crate::clock::{Clock, SystemClock};
use crate::config::PulseConfig;
use crate::event::{PulseEvent, Subscribers, SubscriptionId};
use crate::timer::TimerSlot;
use crate::trajectory::{Trajectory, TrajectorySnapshot};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

pub struct PulseScheduler<C: Clock = SystemClock> {
    clock: C,
    trajectory: Trajectory,
    defaults: PulseConfig,
    timer: TimerSlot,
    icon_on: bool,
    ticks: u64,
    subscribers: Subscribers,
}

impl PulseScheduler<SystemClock> {
    /// Start pulsing on the wall clock.
    pub fn new(defaults: PulseConfig) -> Self {
        Self::with_clock(defaults, SystemClock)
    }
}

impl<C: Clock> PulseScheduler<C> {
    /// Start pulsing on `clock`. The ramp begins now and the first tick is
    /// armed immediately.
    pub fn with_clock(defaults: PulseConfig, clock: C) -> Self {
        let now = clock.now();
        let trajectory = Trajectory::new(
            defaults.initial_bpm,
            defaults.target_bpm,
            defaults.slope_secs(),
            now,
        );
        let mut scheduler = Self {
            clock,
            trajectory,
            defaults,
            timer: TimerSlot::new(),
            icon_on: true,
            ticks: 0,
            subscribers: Subscribers::default(),
        };
        scheduler.arm(now);
        info!(
            initial_bpm = scheduler.trajectory.initial_bpm(),
            target_bpm = scheduler.trajectory.target_bpm(),
            slope_secs = scheduler.trajectory.slope_secs(),
            "pulse started"
        );
        scheduler
    }

    /// Current time on the scheduler's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn icon_on(&self) -> bool {
        self.icon_on
    }

    /// Number of ticks fired since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed(&self) -> Duration {
        self.trajectory.elapsed(self.clock.now())
    }

    pub fn current_bpm(&self) -> f64 {
        self.trajectory.bpm_at(self.elapsed())
    }

    pub fn progress(&self) -> f64 {
        self.trajectory.progress_at(self.elapsed())
    }

    pub fn snapshot(&self) -> TrajectorySnapshot {
        self.trajectory.snapshot(self.clock.now())
    }

    /// Delay before the next toggle at the current BPM: `60 / bpm` seconds.
    pub fn current_interval(&self) -> Duration {
        self.trajectory.interval_at(self.elapsed())
    }

    /// When the pending tick is due, if one is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Time left until the pending tick. Zero if it is overdue.
    pub fn time_until_next_tick(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.timer
            .deadline()
            .map(|d| d.saturating_duration_since(now))
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_armed()
    }

    /// Fire the pending tick if its deadline has passed.
    ///
    /// Fires at most once per call, even if the loop overslept several
    /// intervals; the next deadline is measured from now.
    pub fn poll(&mut self) -> bool {
        if self.timer.take_due(self.clock.now()) {
            self.tick();
            true
        } else {
            false
        }
    }

    /// Flip the heart, notify, and re-arm at the freshly sampled interval.
    pub fn tick(&mut self) {
        self.icon_on = !self.icon_on;
        self.ticks += 1;
        trace!(icon_on = self.icon_on, tick = self.ticks, "pulse");
        self.subscribers.emit(&PulseEvent::Toggled {
            icon_on: self.icon_on,
        });
        let now = self.clock.now();
        self.arm(now);
    }

    /// Takes effect at the next natural tick; the pending one is left alone.
    pub fn set_initial_bpm(&mut self, bpm: f64) {
        if self.trajectory.set_initial_bpm(bpm) {
            debug!(initial_bpm = self.trajectory.initial_bpm(), "initial bpm set");
            self.publish_change();
        } else {
            warn!("ignoring non-numeric initial bpm");
        }
    }

    /// Takes effect at the next natural tick; the pending one is left alone.
    pub fn set_target_bpm(&mut self, bpm: f64) {
        if self.trajectory.set_target_bpm(bpm) {
            debug!(target_bpm = self.trajectory.target_bpm(), "target bpm set");
            self.publish_change();
        } else {
            warn!("ignoring non-numeric target bpm");
        }
    }

    /// Slope in seconds. Takes effect at the next natural tick.
    pub fn set_slope_duration(&mut self, secs: f64) {
        if self.trajectory.set_slope_secs(secs) {
            debug!(slope_secs = self.trajectory.slope_secs(), "slope duration set");
            self.publish_change();
        } else {
            warn!("ignoring non-numeric slope duration");
        }
    }

    /// Restart the ramp from now with the default initial BPM and slope.
    /// The target BPM is kept.
    pub fn reset(&mut self) {
        let now = self.clock.now();
        self.timer.cancel();
        self.trajectory.restart(now);
        self.trajectory.set_initial_bpm(self.defaults.initial_bpm);
        self.trajectory.set_slope_secs(self.defaults.slope_secs());
        self.arm(now);
        info!(
            initial_bpm = self.trajectory.initial_bpm(),
            target_bpm = self.trajectory.target_bpm(),
            slope_secs = self.trajectory.slope_secs(),
            "pulse reset"
        );
        self.publish_change();
    }

    /// Cancel the pending tick. Nothing fires until `reset`.
    pub fn stop(&mut self) {
        if self.timer.cancel() {
            info!(ticks = self.ticks, "pulse stopped");
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&PulseEvent) + 'static) -> SubscriptionId {
        self.subscribers.add(Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn arm(&mut self, now: Instant) {
        let interval = self.trajectory.interval_at(self.trajectory.elapsed(now));
        self.timer.arm(now, interval);
    }

    fn publish_change(&mut self) {
        let snapshot = self.trajectory.snapshot(self.clock.now());
        self.subscribers
            .emit(&PulseEvent::TrajectoryChanged(snapshot));
    }
}

impl<C: Clock> Drop for PulseScheduler<C> {
    fn drop(&mut self) {
        self.timer.cancel();
    }
}

impl<C: Clock> std::fmt::Debug for PulseScheduler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PulseScheduler")
            .field("trajectory", &self.trajectory)
            .field("icon_on", &self.icon_on)
            .field("ticks", &self.ticks)
            .field("timer", &self.timer)
            .field("subscribers", &self.subscribers)
            .finish()
    }
}
