//! Observability utilities.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::types::ObservabilityConfig;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Initialize tracing subscriber once for the process.
///
/// Log format defaults to plain text and can be switched to JSON via
/// `TOOLGATE_LOG_FORMAT=json` or `json_logs`. Filter comes from `RUST_LOG`,
/// falling back to the configured level.
pub fn init_tracing(config: &ObservabilityConfig) {
    TRACING_INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| configured_filter(&config.log_level));
        let json = wants_json(std::env::var("TOOLGATE_LOG_FORMAT").ok().as_deref(), config);

        let result = if json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact())
                .try_init()
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}

/// Filter for the configured level, `info` if it does not parse.
fn configured_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The env var wins over the config flag when set.
fn wants_json(format_var: Option<&str>, config: &ObservabilityConfig) -> bool {
    match format_var {
        Some(v) => v.eq_ignore_ascii_case("json"),
        None => config.json_logs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    // Never install the global subscriber here; other tests capture logs.

    #[test]
    fn configured_filter_falls_back_to_info() {
        assert_eq!(
            configured_filter("debug").max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            configured_filter("toolgate=loud").max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }

    #[test]
    fn format_var_overrides_config() {
        let mut config = ObservabilityConfig::default();
        assert!(!wants_json(None, &config));
        assert!(wants_json(Some("JSON"), &config));

        config.json_logs = true;
        assert!(wants_json(None, &config));
        assert!(!wants_json(Some("text"), &config));
    }
}
