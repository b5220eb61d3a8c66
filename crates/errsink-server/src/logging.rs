//! Logging configuration and initialization.
//!
//! Diagnostics go through `tracing` with `errsink::*` targets:
//! - `errsink::startup`: configuration and bind results
//! - `errsink::collector`: accept loop, swallowed accept/session errors
//! - `errsink::session`: per-connection progress
//! - `errsink::api` / `errsink::ws`: viewer-facing HTTP and websocket traffic
//!
//! `RUST_LOG` overrides everything; otherwise a preset picked from CLI flags
//! is combined with per-target `--log target=level` overrides.

use clap::ValueEnum;
use std::collections::BTreeMap;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const TARGET_PREFIX: &str = "errsink::";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging preset levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Connections and errors, no per-chunk noise
    #[default]
    Production,
    Verbose,
    Debug,
    Trace,
    /// Warnings and errors only
    Quiet,
}

impl LogPreset {
    /// Pick a preset from CLI flags. Quieter flags win over louder ones.
    pub fn from_flags(verbose: bool, debug: bool, trace: bool, quiet: bool) -> Self {
        if quiet {
            LogPreset::Quiet
        } else if trace {
            LogPreset::Trace
        } else if debug {
            LogPreset::Debug
        } else if verbose {
            LogPreset::Verbose
        } else {
            LogPreset::Production
        }
    }

    fn directives(self) -> &'static [&'static str] {
        match self {
            LogPreset::Production => &[
                "errsink::startup=info",
                "errsink::collector=info",
                "errsink::session=info",
                "errsink::api=warn",
                "errsink::ws=info",
                "tower_http=warn",
            ],
            LogPreset::Verbose => &["errsink=info", "tower_http=info"],
            LogPreset::Debug => &["errsink=debug", "tower_http=debug"],
            LogPreset::Trace => &["errsink=trace", "tower_http=trace"],
            LogPreset::Quiet => &["errsink=warn", "tower_http=error"],
        }
    }
}

/// Logging configuration built from CLI arguments.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// Per-target level overrides, keyed by full target name
    pub overrides: BTreeMap<String, Level>,
    pub format: LogFormat,
}

impl LogConfig {
    /// Build from a preset and raw `--log` values.
    ///
    /// Each value is a comma-separated list of `target=level`. Short targets
    /// get the `errsink::` prefix; malformed entries are skipped.
    pub fn new(preset: LogPreset, log_overrides: &[String], format: LogFormat) -> Self {
        let overrides = log_overrides
            .iter()
            .flat_map(|value| value.split(','))
            .filter_map(|part| {
                let (target, level) = part.split_once('=')?;
                let level = parse_level(level.trim())?;
                Some((qualify_target(target.trim()), level))
            })
            .collect();

        Self {
            preset,
            overrides,
            format,
        }
    }

    /// Build an EnvFilter from this configuration.
    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }
        EnvFilter::try_new(self.filter_directives()).unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Directive string for the preset plus overrides (overrides last, so they win).
    pub fn filter_directives(&self) -> String {
        self.preset
            .directives()
            .iter()
            .map(|d| d.to_string())
            .chain(
                self.overrides
                    .iter()
                    .map(|(target, level)| format!("{}={}", target, level_to_str(*level))),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn qualify_target(target: &str) -> String {
    if target.starts_with(TARGET_PREFIX) || target == "errsink" || target == "tower_http" {
        target.to_string()
    } else {
        format!("{TARGET_PREFIX}{target}")
    }
}

/// Parse a level string (case-insensitive).
fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn level_to_str(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Initialize the tracing subscriber with the given configuration.
pub fn init(config: &LogConfig) {
    let filter = config.build_filter();

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_thread_ids(false))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_priority() {
        assert_eq!(LogPreset::from_flags(true, true, true, true), LogPreset::Quiet);
        assert_eq!(LogPreset::from_flags(true, true, true, false), LogPreset::Trace);
        assert_eq!(LogPreset::from_flags(true, true, false, false), LogPreset::Debug);
        assert_eq!(LogPreset::from_flags(true, false, false, false), LogPreset::Verbose);
        assert_eq!(LogPreset::from_flags(false, false, false, false), LogPreset::Production);
    }

    #[test]
    fn test_overrides_parsing() {
        let config = LogConfig::new(
            LogPreset::Production,
            &["session=debug".into(), "collector=trace, api=WARNING".into()],
            LogFormat::Text,
        );

        assert_eq!(config.overrides.get("errsink::session"), Some(&Level::DEBUG));
        assert_eq!(config.overrides.get("errsink::collector"), Some(&Level::TRACE));
        assert_eq!(config.overrides.get("errsink::api"), Some(&Level::WARN));
    }

    #[test]
    fn test_full_targets_pass_through_and_bad_entries_skipped() {
        let config = LogConfig::new(
            LogPreset::Production,
            &["errsink::ws=debug".into(), "tower_http=trace".into(), "session=loud".into(), "noequals".into()],
            LogFormat::Json,
        );

        assert_eq!(config.overrides.len(), 2);
        assert_eq!(config.overrides.get("errsink::ws"), Some(&Level::DEBUG));
        assert_eq!(config.overrides.get("tower_http"), Some(&Level::TRACE));
    }

    #[test]
    fn test_overrides_come_after_preset() {
        let config = LogConfig::new(LogPreset::Quiet, &["session=debug".into()], LogFormat::Text);
        assert_eq!(
            config.filter_directives(),
            "errsink=warn,tower_http=error,errsink::session=debug"
        );
    }
}
