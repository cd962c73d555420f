use std::sync::Once;

use env_logger::{Builder, WriteStyle};
use log::LevelFilter;

/// Filter applied when neither the config nor `RUST_LOG` names one.
///
/// wgpu logs device internals at info, so its crates start at warn.
const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger configuration.
///
/// `env_filter` uses `env_logger` directive syntax, e.g.
/// `"prism_engine=trace"` to see every presented frame.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Overrides `RUST_LOG`.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// The directives in effect: config, then `RUST_LOG`, then the default.
    pub(crate) fn resolve_filter(&self, rust_log: Option<String>) -> String {
        self.env_filter
            .clone()
            .or(rust_log)
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }
}

static INIT: Once = Once::new();

/// Installs the `env_logger` backend. Only the first call has an effect.
///
/// Call before `Runtime::new` so bootstrap failures are logged.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolve_filter(std::env::var("RUST_LOG").ok());

        let mut builder = Builder::new();
        builder
            .filter_level(LevelFilter::Info)
            .parse_filters(&filter)
            .write_style(config.write_style);

        // A test harness may already own the global logger.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized ({filter})");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_filter_beats_rust_log() {
        let c = LoggingConfig::default().with_filter("debug");
        assert_eq!(c.resolve_filter(Some("warn".into())), "debug");
    }

    #[test]
    fn rust_log_beats_default() {
        let c = LoggingConfig::default();
        assert_eq!(c.resolve_filter(Some("prism_engine=trace".into())), "prism_engine=trace");
    }

    #[test]
    fn empty_filter_falls_back_to_default() {
        let c = LoggingConfig::default();
        assert_eq!(c.resolve_filter(None), DEFAULT_FILTER);
        assert_eq!(c.resolve_filter(Some("  ".into())), DEFAULT_FILTER);
    }
}
