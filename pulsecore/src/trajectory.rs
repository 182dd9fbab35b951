//! BPM trajectory: where the pulse starts, where it settles, and how long
//! the slide between them takes.

use std::time::{Duration, Instant};

/// Lowest pulse rate the trajectory will hold.
pub const MIN_BPM: f64 = 50.0;
/// Highest pulse rate the trajectory will hold.
pub const MAX_BPM: f64 = 150.0;
/// Shortest slope, 20 minutes.
pub const MIN_SLOPE_SECS: f64 = 1200.0;
/// Longest slope, 60 minutes.
pub const MAX_SLOPE_SECS: f64 = 3600.0;

pub const DEFAULT_INITIAL_BPM: f64 = 135.0;
pub const DEFAULT_TARGET_BPM: f64 = 60.0;
pub const DEFAULT_SLOPE_SECS: f64 = 1800.0;

/// Clamp a BPM into `[MIN_BPM, MAX_BPM]`. NaN yields `None`.
pub fn clamp_bpm(bpm: f64) -> Option<f64> {
    if bpm.is_nan() {
        None
    } else {
        Some(bpm.clamp(MIN_BPM, MAX_BPM))
    }
}

/// Clamp a slope into `[MIN_SLOPE_SECS, MAX_SLOPE_SECS]`. NaN yields `None`.
pub fn clamp_slope_secs(secs: f64) -> Option<f64> {
    if secs.is_nan() {
        None
    } else {
        Some(secs.clamp(MIN_SLOPE_SECS, MAX_SLOPE_SECS))
    }
}

/// The linear BPM ramp.
///
/// Fields are private so every value that gets in has been clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    initial_bpm: f64,
    target_bpm: f64,
    slope_secs: f64,
    start_time: Instant,
}

/// Plain copy of the trajectory parameters, handed to subscribers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySnapshot {
    pub initial_bpm: f64,
    pub target_bpm: f64,
    pub slope_secs: f64,
    /// Fraction of the slope already covered, in `[0, 1]`.
    pub progress: f64,
    pub current_bpm: f64,
}

impl Trajectory {
    /// Build a trajectory starting at `start_time`. Out-of-range values are
    /// clamped; NaN falls back to the built-in default for that field.
    pub fn new(initial_bpm: f64, target_bpm: f64, slope_secs: f64, start_time: Instant) -> Self {
        Self {
            initial_bpm: clamp_bpm(initial_bpm).unwrap_or(DEFAULT_INITIAL_BPM),
            target_bpm: clamp_bpm(target_bpm).unwrap_or(DEFAULT_TARGET_BPM),
            slope_secs: clamp_slope_secs(slope_secs).unwrap_or(DEFAULT_SLOPE_SECS),
            start_time,
        }
    }

    pub fn initial_bpm(&self) -> f64 {
        self.initial_bpm
    }

    pub fn target_bpm(&self) -> f64 {
        self.target_bpm
    }

    pub fn slope_secs(&self) -> f64 {
        self.slope_secs
    }

    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    /// Returns `false` when the input was NaN and nothing changed.
    pub fn set_initial_bpm(&mut self, bpm: f64) -> bool {
        match clamp_bpm(bpm) {
            Some(v) => {
                self.initial_bpm = v;
                true
            }
            None => false,
        }
    }

    pub fn set_target_bpm(&mut self, bpm: f64) -> bool {
        match clamp_bpm(bpm) {
            Some(v) => {
                self.target_bpm = v;
                true
            }
            None => false,
        }
    }

    pub fn set_slope_secs(&mut self, secs: f64) -> bool {
        match clamp_slope_secs(secs) {
            Some(v) => {
                self.slope_secs = v;
                true
            }
            None => false,
        }
    }

    /// Restart the ramp at `now`.
    pub fn restart(&mut self, now: Instant) {
        self.start_time = now;
    }

    /// Time since the ramp started. Never negative.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start_time)
    }

    /// Fraction of the slope covered after `elapsed`, capped at 1.
    pub fn progress_at(&self, elapsed: Duration) -> f64 {
        (elapsed.as_secs_f64() / self.slope_secs).min(1.0)
    }

    /// Instantaneous BPM after `elapsed`.
    ///
    /// Holds exactly at the target once the slope is over.
    pub fn bpm_at(&self, elapsed: Duration) -> f64 {
        let progress = self.progress_at(elapsed);
        if progress >= 1.0 {
            return self.target_bpm;
        }
        self.initial_bpm - (self.initial_bpm - self.target_bpm) * progress
    }

    /// Seconds between toggles after `elapsed`. Always within `[0.4, 1.2]`.
    pub fn interval_at(&self, elapsed: Duration) -> Duration {
        Duration::from_secs_f64(60.0 / self.bpm_at(elapsed))
    }

    pub fn snapshot(&self, now: Instant) -> TrajectorySnapshot {
        let elapsed = self.elapsed(now);
        TrajectorySnapshot {
            initial_bpm: self.initial_bpm,
            target_bpm: self.target_bpm,
            slope_secs: self.slope_secs,
            progress: self.progress_at(elapsed),
            current_bpm: self.bpm_at(elapsed),
        }
    }
}
