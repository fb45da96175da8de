//! Telemetry and Observability
//!
//! Sets up `tracing-subscriber` for structured logging.
//! Supports config-driven log levels, environment variable overrides,
//! and format switching between pretty (debug) and JSON (release).

use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Crates whose logs follow the configured level
const OWN_TARGETS: [&str; 3] = ["advisor_engine", "web_form", "crop_advisor"];

/// Build the default filter directive for a log level.
///
/// Third-party crates stay at `warn` unless the level is more severe.
fn default_directive(log_level: &str) -> String {
    let base = match log_level {
        "error" => "error",
        _ => "warn",
    };

    let mut directive = base.to_string();
    for target in OWN_TARGETS {
        directive.push_str(&format!(",{}={}", target, log_level));
    }
    directive.push_str(&format!(",tower_http={}", log_level));
    directive
}

/// Handle to the installed filter, for changing the level once config is loaded
pub struct Telemetry {
    filter: reload::Handle<EnvFilter, Registry>,
    env_override: bool,
}

impl Telemetry {
    /// Switch to `log_level`. No-op when `RUST_LOG` chose the filter.
    pub fn set_level(&self, log_level: &str) {
        if self.env_override {
            return;
        }
        if let Err(e) = self.filter.reload(EnvFilter::new(default_directive(log_level))) {
            tracing::warn!("Could not change log level: {}", e);
        }
    }
}

fn reloadable(
    filter: EnvFilter,
    env_override: bool,
) -> (reload::Layer<EnvFilter, Registry>, Telemetry) {
    let (layer, handle) = reload::Layer::new(filter);
    (
        layer,
        Telemetry {
            filter: handle,
            env_override,
        },
    )
}

/// Initialize the tracing subscriber with the given log level.
///
/// Priority: `RUST_LOG` env var > `log_level` parameter
///
/// In debug builds: pretty-printed terminal output.
/// In release builds: JSON structured output with spans.
///
/// Only the first call installs a subscriber; later calls are no-ops.
pub fn init_telemetry_with_level(log_level: &str) -> Telemetry {
    let (env_filter, env_override) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(default_directive(log_level)), false),
    };
    let (filter_layer, telemetry) = reloadable(env_filter, env_override);

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt::layer().pretty().with_target(false))
            .try_init()
            .ok();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
            .ok();
    }

    telemetry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_scopes_own_crates() {
        let directive = default_directive("debug");
        assert!(directive.starts_with("warn,"));
        assert!(directive.contains("advisor_engine=debug"));
        assert!(directive.contains("web_form=debug"));
    }

    #[test]
    fn test_error_level_silences_dependencies() {
        assert!(default_directive("error").starts_with("error,"));
    }

    #[test]
    fn test_set_level_after_startup() {
        let (layer, telemetry) = reloadable(EnvFilter::new(default_directive("warn")), false);
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            assert!(!tracing::enabled!(target: "advisor_engine", tracing::Level::DEBUG));

            telemetry.set_level("debug");
            assert!(tracing::enabled!(target: "advisor_engine", tracing::Level::DEBUG));
        });
    }

    #[test]
    fn test_env_filter_is_not_overridden() {
        let (layer, telemetry) = reloadable(EnvFilter::new("warn"), true);
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            telemetry.set_level("trace");
            assert!(!tracing::enabled!(target: "advisor_engine", tracing::Level::DEBUG));
        });
    }
}
