//! Terminal driver: the same scheduler on a plain sleeping loop.

use pulsecore::{Clock, PulseConfig, PulseEvent, PulseScheduler};
use std::time::Duration;
use tracing::info;

/// Sleep used when nothing is armed.
const IDLE_WAIT: Duration = Duration::from_millis(100);

/// Run until the process is killed, logging every toggle.
pub fn run(config: PulseConfig) {
    let mut scheduler = PulseScheduler::new(config);
    scheduler.subscribe(|event| {
        if let PulseEvent::Toggled { icon_on } = event {
            info!("{}", if *icon_on { "♥" } else { "♡" });
        }
    });

    let mut last_report = 0u64;
    loop {
        std::thread::sleep(wait_time(&scheduler));
        step(&mut scheduler, &mut last_report);
    }
}

/// How long the loop should sleep before the next `step`.
fn wait_time<C: Clock>(scheduler: &PulseScheduler<C>) -> Duration {
    scheduler.time_until_next_tick().unwrap_or(IDLE_WAIT)
}

/// Poll once. On a tick that lands in a new minute, log progress and return
/// that minute.
fn step<C: Clock>(scheduler: &mut PulseScheduler<C>, last_report: &mut u64) -> Option<u64> {
    if !scheduler.poll() {
        return None;
    }
    let minute = scheduler.elapsed().as_secs() / 60;
    if minute == *last_report {
        return None;
    }
    *last_report = minute;
    info!(
        bpm = %format!("{:.1}", scheduler.current_bpm()),
        progress = %format!("{:.0}%", scheduler.progress() * 100.0),
        "minute {}",
        minute
    );
    Some(minute)
}
