use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// Filter precedence: `env_filter`, then `RUST_LOG`, then `default_level`.
/// Filters use the `env_logger` syntax (e.g. "argon_engine=debug,warn").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Shorthand for an explicit filter string, ignoring `RUST_LOG`.
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }

    fn build(&self, rust_log: Option<String>) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();
        match self.env_filter.clone().or(rust_log) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(self.default_level);
            }
        }
        builder.write_style(self.write_style);
        builder
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` as the global logger, once per process.
///
/// Later calls do nothing. Call early in `main`, before any shader or texture
/// is built, so construction diagnostics reach the sink.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = config.build(std::env::var("RUST_LOG").ok());

        // A host may already have its own logger.
        if builder.try_init().is_err() {
            log::debug!("a global logger was already installed; keeping it");
            return;
        }
        log::debug!("logging initialized");
    });
}
