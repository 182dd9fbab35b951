//! Wake controller: the event-loop side of the pulse timer
//!
//! egui only runs `update()` when something asks it to. The pulse needs a
//! frame at each tick deadline and nowhere else, so instead of continuous
//! repainting the app tells this controller when the next tick is due and
//! the controller asks egui for exactly one repaint at that moment.
//!
//! Per frame:
//! 1. `begin_frame()` records why we woke up.
//! 2. The app polls the scheduler and draws. A tick is drawn in the frame
//!    that fired it, so it needs nothing more. Only a change made after the
//!    affected widgets were painted calls `mark_needs_repaint()`.
//! 3. `end_frame()` hands egui the next deadline.
//!
//! Both ends take `now` from the scheduler's clock so deadlines and the
//! current time are measured the same way.

use std::time::{Duration, Instant};

/// Why this frame is being painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// First frame — always paint.
    Init,
    /// User input (mouse move, click, key).
    Input,
    /// A tick deadline was reached.
    Deadline,
    /// Something else woke egui (resize, focus, OS).
    Other,
}

pub struct WakeController {
    /// When the scheduler next wants to run.
    next_wake: Option<Instant>,
    /// One-shot repaint request (state changed after it was drawn).
    needs_repaint: bool,
    frame: u64,
    reason: WakeReason,
}

impl Default for WakeController {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeController {
    pub fn new() -> Self {
        Self {
            next_wake: None,
            needs_repaint: false,
            frame: 0,
            reason: WakeReason::Init,
        }
    }

    /// Ask for a frame at `deadline`, or cancel with `None`.
    pub fn wake_at(&mut self, deadline: Option<Instant>) {
        self.next_wake = deadline;
    }

    pub fn mark_needs_repaint(&mut self) {
        self.needs_repaint = true;
    }

    pub fn reason(&self) -> WakeReason {
        self.reason
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Call at the start of `update()`.
    pub fn begin_frame(&mut self, ctx: &egui::Context, now: Instant) {
        let had_input = ctx.input(|i| {
            !i.events.is_empty()
                || i.pointer.any_pressed()
                || i.pointer.any_released()
                || i.pointer.is_moving()
        });
        self.reason = self.classify(had_input, now);
        self.needs_repaint = false;
    }

    fn classify(&self, had_input: bool, now: Instant) -> WakeReason {
        if self.frame == 0 {
            WakeReason::Init
        } else if had_input {
            WakeReason::Input
        } else if self.next_wake.is_some_and(|d| now >= d) {
            WakeReason::Deadline
        } else {
            WakeReason::Other
        }
    }

    /// Delay to hand egui, if any. A pending one-shot wins over the
    /// deadline.
    fn repaint_delay(&self, now: Instant) -> Option<Duration> {
        if self.needs_repaint {
            Some(Duration::ZERO)
        } else {
            self.next_wake.map(|d| d.saturating_duration_since(now))
        }
    }

    /// Call at the end of `update()`. Returns the delay handed to egui.
    pub fn end_frame(&mut self, ctx: &egui::Context, now: Instant) -> Option<Duration> {
        self.frame += 1;
        let delay = self.repaint_delay(now);
        match delay {
            Some(Duration::ZERO) => ctx.request_repaint(),
            Some(d) => ctx.request_repaint_after(d),
            None => {}
        }
        delay
    }
}
