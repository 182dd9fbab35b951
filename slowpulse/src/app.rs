//! slowPulse - a heart that slows down with you
//!
//! The heart toggles at a BPM that slides from the initial rate to the
//! target rate over the slope duration.

use crate::heart;
use crate::theme::{consume_zoom_keys, menu_bar, status_bar, SlowColors};
use crate::wake::WakeController;
use egui::{Context, Key, Pos2};
use pulsecore::trajectory::{MAX_BPM, MAX_SLOPE_SECS, MIN_BPM, MIN_SLOPE_SECS};
use pulsecore::{Clock, PulseConfig, PulseScheduler, SystemClock};
use std::time::Duration;
use tracing::trace;

/// BPM change per click
const BPM_STEP: f64 = 5.0;
/// Slope change per click, in minutes
const MINUTES_STEP: f64 = 5.0;

/// Next BPM after a `-`/`+` click, kept within the UI bounds.
fn step_bpm(current: f64, delta: f64) -> f64 {
    (current + delta).clamp(MIN_BPM, MAX_BPM)
}

/// Next slope in minutes after a `-`/`+` click.
fn step_minutes(current: f64, delta: f64) -> f64 {
    (current + delta).clamp(MIN_SLOPE_SECS / 60.0, MAX_SLOPE_SECS / 60.0)
}

/// Which way a stepper row was clicked.
#[derive(Clone, Copy, PartialEq, Debug)]
enum Step {
    Down,
    Up,
}

impl Step {
    fn sign(self) -> f64 {
        match self {
            Step::Down => -1.0,
            Step::Up => 1.0,
        }
    }
}

/// A labelled value with `-` and `+` buttons underneath.
fn stepper(ui: &mut egui::Ui, label: &str, down: &str, up: &str) -> Option<Step> {
    let mut step = None;
    ui.vertical_centered(|ui| {
        ui.label(label);
        ui.horizontal(|ui| {
            // center the pair of buttons
            let width = 2.0 * 72.0 + ui.spacing().item_spacing.x;
            ui.add_space(((ui.available_width() - width) / 2.0).max(0.0));
            if ui.add_sized([72.0, 20.0], egui::Button::new(down)).clicked() {
                step = Some(Step::Down);
            }
            if ui.add_sized([72.0, 20.0], egui::Button::new(up)).clicked() {
                step = Some(Step::Up);
            }
        });
    });
    step
}

pub struct SlowPulseApp<C: Clock = SystemClock> {
    scheduler: PulseScheduler<C>,
    show_about: bool,
    wake: WakeController,
}

impl SlowPulseApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: PulseConfig) -> Self {
        Self::with_scheduler(PulseScheduler::new(config))
    }
}

impl<C: Clock> SlowPulseApp<C> {
    pub fn with_scheduler(scheduler: PulseScheduler<C>) -> Self {
        Self {
            scheduler,
            show_about: false,
            wake: WakeController::new(),
        }
    }

    fn step_initial(&mut self, step: Step) {
        let bpm = step_bpm(self.scheduler.trajectory().initial_bpm(), step.sign() * BPM_STEP);
        self.scheduler.set_initial_bpm(bpm);
    }

    fn step_target(&mut self, step: Step) {
        let bpm = step_bpm(self.scheduler.trajectory().target_bpm(), step.sign() * BPM_STEP);
        self.scheduler.set_target_bpm(bpm);
    }

    fn step_slope(&mut self, step: Step) {
        let minutes = step_minutes(
            self.scheduler.trajectory().slope_secs() / 60.0,
            step.sign() * MINUTES_STEP,
        );
        self.scheduler.set_slope_duration(minutes * 60.0);
    }

    fn status_text(&self) -> String {
        let elapsed = self.scheduler.elapsed().as_secs();
        format!(
            "{:.0} bpm  |  {}:{:02}  |  {:.0}%",
            self.scheduler.current_bpm(),
            elapsed / 60,
            elapsed % 60,
            self.scheduler.progress() * 100.0
        )
    }

    /// Draw one frame. Returns the delay handed to egui for the next one.
    fn frame(&mut self, ctx: &Context) -> Option<Duration> {
        self.wake.begin_frame(ctx, self.scheduler.now());
        trace!(reason = ?self.wake.reason(), frame = self.wake.frame(), "frame");
        consume_zoom_keys(ctx);

        self.scheduler.poll();

        // Changes made before the panels below are drawn show up this frame.
        // Clicks inside the central panel land after the status bar and
        // labels were painted, so those need one more frame.
        let mut changed_after_paint = false;
        let mut quit = false;
        ctx.input(|i| {
            if i.key_pressed(Key::R) {
                self.scheduler.reset();
            }
            if i.key_pressed(Key::Escape) {
                quit = true;
            }
        });

        // Menu bar
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            menu_bar(ui, |ui| {
                ui.menu_button("file", |ui| {
                    if ui.button("reset      r").clicked() {
                        self.scheduler.reset();
                        ui.close_menu();
                    }
                    if ui.button("quit       esc").clicked() {
                        quit = true;
                        ui.close_menu();
                    }
                });
                ui.menu_button("help", |ui| {
                    if ui.button("about").clicked() {
                        self.show_about = true;
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            status_bar(ui, &self.status_text());
        });

        // Main content
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(SlowColors::WHITE))
            .show(ctx, |ui| {
                let full_rect = ui.available_rect_before_wrap();
                let heart_size = (full_rect.width() * 0.35).min(96.0);
                let heart_center = Pos2::new(full_rect.center().x, full_rect.min.y + 16.0 + heart_size / 2.0);
                heart::paint(ui.painter(), heart_center, heart_size, self.scheduler.icon_on());
                ui.add_space(heart_size + 32.0);

                let trajectory = self.scheduler.trajectory().clone();
                if let Some(step) = stepper(
                    ui,
                    &format!("initial bpm: {:.0}", trajectory.initial_bpm()),
                    "-5 bpm",
                    "+5 bpm",
                ) {
                    self.step_initial(step);
                    changed_after_paint = true;
                }
                ui.add_space(4.0);
                if let Some(step) = stepper(
                    ui,
                    &format!("target bpm: {:.0}", trajectory.target_bpm()),
                    "-5 bpm",
                    "+5 bpm",
                ) {
                    self.step_target(step);
                    changed_after_paint = true;
                }
                ui.add_space(4.0);
                if let Some(step) = stepper(
                    ui,
                    &format!("slope duration: {:.0} minutes", trajectory.slope_secs() / 60.0),
                    "-5 min",
                    "+5 min",
                ) {
                    self.step_slope(step);
                    changed_after_paint = true;
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(4.0);
                ui.vertical_centered(|ui| {
                    if ui.button("reset to defaults").clicked() {
                        self.scheduler.reset();
                        changed_after_paint = true;
                    }
                    if ui.button("quit").clicked() {
                        quit = true;
                    }
                });
            });

        // About dialog
        if self.show_about {
            egui::Window::new("about slowPulse")
                .collapsible(false)
                .resizable(false)
                .default_width(280.0)
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("slowPulse");
                        ui.label(format!("version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        ui.label("a heart that slows down with you");
                    });
                    ui.add_space(8.0);
                    ui.separator();
                    ui.label("the heart starts at the initial bpm and");
                    ui.label("eases to the target over the slope duration.");
                    ui.label("changes apply from the next beat.");
                    ui.add_space(4.0);
                    ui.label("controls:");
                    ui.label("  r: reset to defaults");
                    ui.label("  esc: quit");
                    ui.add_space(8.0);
                    ui.vertical_centered(|ui| {
                        if ui.button("ok").clicked() {
                            self.show_about = false;
                            changed_after_paint = true;
                        }
                    });
                });
        }

        if quit {
            self.scheduler.stop();
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        if changed_after_paint {
            self.wake.mark_needs_repaint();
        }
        self.wake.wake_at(self.scheduler.next_deadline());
        self.wake.end_frame(ctx, self.scheduler.now())
    }
}

impl<C: Clock> eframe::App for SlowPulseApp<C> {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.frame(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsecore::ManualClock;

    #[test]
    fn test_step_bpm_bounds() {
        assert_eq!(step_bpm(135.0, 5.0), 140.0);
        assert_eq!(step_bpm(150.0, 5.0), 150.0);
        assert_eq!(step_bpm(50.0, -5.0), 50.0);
        assert_eq!(step_bpm(52.0, -5.0), 50.0);
    }

    #[test]
    fn test_step_minutes_bounds() {
        assert_eq!(step_minutes(30.0, 5.0), 35.0);
        assert_eq!(step_minutes(60.0, 5.0), 60.0);
        assert_eq!(step_minutes(20.0, -5.0), 20.0);
    }

    fn run_frame(
        ctx: &Context,
        app: &mut SlowPulseApp<ManualClock>,
        input: egui::RawInput,
    ) -> Option<Duration> {
        let mut delay = None;
        let _ = ctx.run(input, |ctx| delay = app.frame(ctx));
        delay
    }

    fn test_app() -> (SlowPulseApp<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let scheduler = PulseScheduler::with_clock(PulseConfig::default(), clock.clone());
        (SlowPulseApp::with_scheduler(scheduler), clock)
    }

    #[test]
    fn test_tick_frame_waits_for_next_deadline() {
        let ctx = Context::default();
        let (mut app, clock) = test_app();

        let first = run_frame(&ctx, &mut app, egui::RawInput::default());
        assert_eq!(first, app.scheduler.time_until_next_tick());

        clock.advance_secs(0.5);
        let delay = run_frame(&ctx, &mut app, egui::RawInput::default());
        assert_eq!(app.scheduler.ticks(), 1);
        assert!(!app.scheduler.icon_on());
        // the toggle was drawn in this frame; the next wake is the next tick
        assert_eq!(delay, app.scheduler.time_until_next_tick());
        assert_eq!(delay, Some(app.scheduler.current_interval()));
        assert!(delay.is_some_and(|d| d > Duration::ZERO));
    }

    #[test]
    fn test_idle_frame_does_not_repaint_early() {
        let ctx = Context::default();
        let (mut app, clock) = test_app();
        run_frame(&ctx, &mut app, egui::RawInput::default());
        clock.advance_secs(0.2);
        let delay = run_frame(&ctx, &mut app, egui::RawInput::default());
        assert_eq!(app.scheduler.ticks(), 0);
        let remaining = Duration::from_secs_f64(60.0 / 135.0) - Duration::from_millis(200);
        assert_eq!(delay, Some(remaining));
    }

    #[test]
    fn test_reset_key_is_drawn_same_frame() {
        let ctx = Context::default();
        let (mut app, clock) = test_app();
        run_frame(&ctx, &mut app, egui::RawInput::default());
        app.scheduler.set_initial_bpm(90.0);
        clock.advance_secs(100.0);

        let mut input = egui::RawInput::default();
        input.events.push(egui::Event::Key {
            key: Key::R,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        });
        let delay = run_frame(&ctx, &mut app, input);
        assert_eq!(app.scheduler.trajectory().initial_bpm(), 135.0);
        assert_eq!(app.scheduler.elapsed(), Duration::ZERO);
        assert_eq!(delay, Some(Duration::from_secs_f64(60.0 / 135.0)));
    }

    #[test]
    fn test_step_sign() {
        assert_eq!(Step::Down.sign() * BPM_STEP, -5.0);
        assert_eq!(Step::Up.sign() * MINUTES_STEP, 5.0);
    }
}
