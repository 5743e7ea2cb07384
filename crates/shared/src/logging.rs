//! Logging infrastructure for the anime catalogue.
//!
//! Structured logging with daily file rotation, an optional console layer
//! and per-crate log levels.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Crates of this workspace that log at the configured level
const WORKSPACE_TARGETS: &[&str] = &["anime_catalogue", "jikan_api", "shared"];

/// Noisy dependencies capped at `warn`
const QUIET_TARGETS: &[&str] = &["hyper", "reqwest", "h2"];

/// Resolved logging settings for one process
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_dir: String,
    /// Log file prefix; also gets its own filter directive
    pub component: String,
    pub default_level: Level,
    /// Console output goes to stderr
    pub console: bool,
    pub file: bool,
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "data/logs".to_string(),
            component: "anime-catalogue".to_string(),
            default_level: Level::INFO,
            console: false,
            file: true,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Settings from the `[logging]` table, with `level` overriding the
    /// configured default
    pub fn from_settings(settings: &LoggingConfig, component: &str, level: Level) -> Self {
        Self {
            log_dir: settings.log_dir.clone(),
            component: component.to_string(),
            default_level: level,
            console: settings.console,
            file: settings.file,
            json_format: settings.json_format,
        }
    }

    /// `EnvFilter` directives used when `RUST_LOG` is not set
    pub fn filter_directives(&self) -> String {
        let component = self.component.replace('-', "_");
        let mut targets = vec![component.as_str()];
        targets.extend(WORKSPACE_TARGETS.iter().filter(|t| **t != component));

        targets
            .into_iter()
            .map(|target| format!("{}={}", target, self.default_level))
            .chain(QUIET_TARGETS.iter().map(|target| format!("{}=warn", target)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn console_layer() -> BoxedLayer {
    fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .boxed()
}

fn file_layer(config: &LogConfig) -> Result<BoxedLayer> {
    let log_dir = Path::new(&config.log_dir);
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", config.log_dir))?;

    let appender = tracing_appender::rolling::daily(log_dir, &config.component);

    let layer = if config.json_format {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(appender)
            .boxed()
    } else {
        fmt::layer()
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(appender)
            .boxed()
    };
    Ok(layer)
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over [`LogConfig::filter_directives`].
/// Fails if a subscriber is already installed.
pub fn init(config: LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directives()));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.console {
        layers.push(console_layer());
    }
    if config.file {
        layers.push(file_layer(&config)?);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::info!(
        component = %config.component,
        log_dir = %config.log_dir,
        console = config.console,
        file = config.file,
        "Logging initialized"
    );

    Ok(())
}
