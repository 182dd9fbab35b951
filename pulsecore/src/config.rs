//! Startup defaults for the pulse.
//!
//! Read once at launch from an optional `config.json` and the environment.
//! Nothing here is ever written back: adjustments made while running are
//! gone after exit.

use crate::error::{ConfigError, Result};
use crate::trajectory::{DEFAULT_INITIAL_BPM, DEFAULT_SLOPE_SECS, DEFAULT_TARGET_BPM};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_INITIAL_BPM: &str = "SLOWPULSE_INITIAL_BPM";
pub const ENV_TARGET_BPM: &str = "SLOWPULSE_TARGET_BPM";
pub const ENV_SLOPE_MINUTES: &str = "SLOWPULSE_SLOPE_MINUTES";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub initial_bpm: f64,
    pub target_bpm: f64,
    pub slope_minutes: f64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            initial_bpm: DEFAULT_INITIAL_BPM,
            target_bpm: DEFAULT_TARGET_BPM,
            slope_minutes: DEFAULT_SLOPE_SECS / 60.0,
        }
    }
}

impl PulseConfig {
    pub fn slope_secs(&self) -> f64 {
        self.slope_minutes * 60.0
    }

    /// Parse a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Ok(serde_json::from_str(&contents)?)
    }

    /// Override fields from `SLOWPULSE_*` variables in the process
    /// environment. Bad values are skipped and returned.
    pub fn apply_env(self) -> (Self, Vec<ConfigError>) {
        self.apply_env_with(|var| std::env::var(var).ok())
    }

    /// Override fields from whatever `lookup` returns for each variable.
    ///
    /// A variable that does not parse leaves its field alone; the others
    /// still apply.
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<ConfigError>) {
        let mut errors = Vec::new();
        let fields: [(&str, &mut f64); 3] = [
            (ENV_INITIAL_BPM, &mut self.initial_bpm),
            (ENV_TARGET_BPM, &mut self.target_bpm),
            (ENV_SLOPE_MINUTES, &mut self.slope_minutes),
        ];
        for (var, field) in fields {
            match parse_var(&lookup, var) {
                Ok(Some(v)) => *field = v,
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }
        (self, errors)
    }

    /// Built-in defaults, then the file at `path` (or the platform default),
    /// then the environment.
    pub fn resolve(path: Option<&Path>) -> (Self, Vec<ConfigError>) {
        Self::resolve_with(path, |var| std::env::var(var).ok())
    }

    /// Like [`PulseConfig::resolve`] with a custom environment lookup.
    ///
    /// Every source that fails is reported and skipped, so one bad source
    /// never discards the others. A `path` given explicitly must exist.
    pub fn resolve_with(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> (Self, Vec<ConfigError>) {
        let mut errors = Vec::new();
        let base = match path {
            Some(p) if !p.exists() => {
                errors.push(ConfigError::NotFound(p.to_path_buf()));
                Self::default()
            }
            Some(p) => Self::load(p).unwrap_or_else(|e| {
                errors.push(e);
                Self::default()
            }),
            None => Self::load(&config_path()).unwrap_or_else(|e| {
                errors.push(e);
                Self::default()
            }),
        };
        let (config, env_errors) = base.apply_env_with(lookup);
        errors.extend(env_errors);
        (config, errors)
    }
}

fn parse_var(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Result<Option<f64>> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(ConfigError::InvalidEnv {
            var: var.to_string(),
            value: raw,
        }),
    }
}

/// Config directory for slowPulse
pub fn config_dir() -> PathBuf {
    directories::ProjectDirs::from("co", "slowcomputer", "slowpulse")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("slowpulse-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let c = PulseConfig::default();
        assert_eq!(c.initial_bpm, 135.0);
        assert_eq!(c.target_bpm, 60.0);
        assert_eq!(c.slope_minutes, 30.0);
        assert_eq!(c.slope_secs(), 1800.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let c: PulseConfig = serde_json::from_str(r#"{ "target_bpm": 70 }"#).unwrap();
        assert_eq!(c.initial_bpm, 135.0);
        assert_eq!(c.target_bpm, 70.0);
        assert_eq!(c.slope_minutes, 30.0);
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("slowpulse-definitely-missing.json");
        let c = PulseConfig::load(&path).unwrap();
        assert_eq!(c, PulseConfig::default());
    }

    #[test]
    fn test_load_file() {
        let path = temp_file("good.json", r#"{ "initial_bpm": 120, "slope_minutes": 45 }"#);
        let c = PulseConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(c.initial_bpm, 120.0);
        assert_eq!(c.slope_minutes, 45.0);
    }

    #[test]
    fn test_load_malformed_file() {
        let path = temp_file("bad.json", "{ initial_bpm: ");
        let err = PulseConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_env_overrides() {
        let (c, errors) = PulseConfig::default()
            .apply_env_with(env(&[(ENV_INITIAL_BPM, "110"), (ENV_SLOPE_MINUTES, " 20 ")]));
        assert!(errors.is_empty());
        assert_eq!(c.initial_bpm, 110.0);
        assert_eq!(c.target_bpm, 60.0);
        assert_eq!(c.slope_minutes, 20.0);
    }

    #[test]
    fn test_env_invalid_is_skipped() {
        let (c, errors) = PulseConfig::default().apply_env_with(env(&[
            (ENV_TARGET_BPM, "slow"),
            (ENV_INITIAL_BPM, "NaN"),
            (ENV_SLOPE_MINUTES, "40"),
        ]));
        assert_eq!(c.initial_bpm, 135.0);
        assert_eq!(c.target_bpm, 60.0);
        assert_eq!(c.slope_minutes, 40.0);
        assert_eq!(errors.len(), 2);
        match &errors[1] {
            ConfigError::InvalidEnv { var, value } => {
                assert_eq!(var, ENV_TARGET_BPM);
                assert_eq!(value, "slow");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(errors[0], ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_bad_env_keeps_file_values() {
        let path = temp_file("file-then-env.json", r#"{ "initial_bpm": 120 }"#);
        let (c, errors) = PulseConfig::resolve_with(
            Some(&path),
            env(&[(ENV_TARGET_BPM, "abc"), (ENV_SLOPE_MINUTES, "50")]),
        );
        std::fs::remove_file(&path).ok();
        assert_eq!(c.initial_bpm, 120.0);
        assert_eq!(c.target_bpm, 60.0);
        assert_eq!(c.slope_minutes, 50.0);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_explicit_missing_path_is_reported() {
        let path = std::env::temp_dir().join("slowpulse-explicit-missing.json");
        let (c, errors) = PulseConfig::resolve_with(Some(&path), env(&[(ENV_TARGET_BPM, "65")]));
        assert_eq!(c.initial_bpm, 135.0);
        assert_eq!(c.target_bpm, 65.0);
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            ConfigError::NotFound(p) => assert_eq!(p, &path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_file_still_applies_env() {
        let path = temp_file("bad-then-env.json", "[1, 2");
        let (c, errors) = PulseConfig::resolve_with(Some(&path), env(&[(ENV_INITIAL_BPM, "100")]));
        std::fs::remove_file(&path).ok();
        assert_eq!(c.initial_bpm, 100.0);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ConfigError::Json(_)));
    }
}
