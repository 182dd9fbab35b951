//! The single pending tick.
//!
//! The scheduler never owns more than one registration: arming always
//! replaces whatever deadline was armed before, so a replaced or cancelled
//! deadline can never fire.

use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct TimerSlot {
    deadline: Option<Instant>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the current registration (if any) and arm a new one that is
    /// due `after` from `now`.
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    /// Drop the pending registration. Returns whether one existed.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Take the registration if its deadline has passed. The slot is empty
    /// afterwards until the next `arm`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearm_replaces() {
        let now = Instant::now();
        let mut slot = TimerSlot::new();
        slot.arm(now, Duration::from_secs(1));
        slot.arm(now, Duration::from_secs(3));
        assert_eq!(slot.deadline(), Some(now + Duration::from_secs(3)));

        // The replaced one-second deadline must not fire.
        assert!(!slot.take_due(now + Duration::from_secs(2)));
        assert!(slot.take_due(now + Duration::from_secs(3)));
        assert!(!slot.is_armed());
        assert!(!slot.take_due(now + Duration::from_secs(4)));
    }

    #[test]
    fn test_cancel() {
        let now = Instant::now();
        let mut slot = TimerSlot::new();
        assert!(!slot.cancel());
        slot.arm(now, Duration::from_millis(400));
        assert!(slot.cancel());
        assert!(!slot.take_due(now + Duration::from_secs(10)));
        assert_eq!(slot.deadline(), None);
    }
}
