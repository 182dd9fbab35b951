//! slowPulse - a pulsing heart pacer for the Slow Computer

mod app;
mod headless;
mod heart;
mod theme;
mod wake;

use app::SlowPulseApp;
use eframe::NativeOptions;
use pulsecore::PulseConfig;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Default, PartialEq)]
struct Args {
    headless: bool,
    config: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Args {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--headless" => parsed.headless = true,
            "--config" => parsed.config = args.next().map(PathBuf::from),
            other => warn!("ignoring unknown argument {:?}", other),
        }
    }
    parsed
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pulsecore=info,slowpulse=info"));
    fmt().with_env_filter(filter).init();
}

/// Failed sources are logged and skipped; the rest still apply.
fn load_config(path: Option<&std::path::Path>) -> PulseConfig {
    let (config, errors) = PulseConfig::resolve(path);
    for e in &errors {
        warn!("config: {}, skipped", e);
    }
    config
}

fn main() -> eframe::Result<()> {
    init_logging();
    let args = parse_args(std::env::args().skip(1));
    let config = load_config(args.config.as_deref());

    if args.headless {
        headless::run(config);
        return Ok(());
    }

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([300.0, 420.0])
            .with_resizable(false)
            .with_title("pulse"),
        ..Default::default()
    };

    eframe::run_native(
        "slowPulse",
        options,
        Box::new(move |cc| {
            theme::SlowTheme::default().apply(&cc.egui_ctx);
            Box::new(SlowPulseApp::new(cc, config))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Args {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_args_opens_window() {
        assert_eq!(args(&[]), Args::default());
    }

    #[test]
    fn test_headless_and_config() {
        let parsed = args(&["--config", "/tmp/pulse.json", "--headless"]);
        assert!(parsed.headless);
        assert_eq!(parsed.config, Some(PathBuf::from("/tmp/pulse.json")));
    }

    #[test]
    fn test_config_without_path() {
        assert_eq!(args(&["--config"]).config, None);
    }
}
