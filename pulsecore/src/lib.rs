//! pulsecore — the adaptive pulse-rate scheduler behind slowPulse
//!
//! A heart toggles at a rate that slides linearly from an initial BPM to a
//! target BPM over a slope duration. Every tick recomputes the next delay
//! from the instantaneous BPM, so the cadence decays smoothly without a
//! polling loop.

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod scheduler;
pub mod timer;
pub mod trajectory;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::PulseConfig;
pub use error::ConfigError;
pub use event::{PulseEvent, SubscriptionId};
pub use scheduler::PulseScheduler;
pub use trajectory::{Trajectory, TrajectorySnapshot};
