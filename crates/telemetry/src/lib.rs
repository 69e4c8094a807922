//! Logging and tracing bootstrap.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

use library_kernel::settings::{LogFormat, TelemetrySettings};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `telemetry.log_level`. Fails if a
/// subscriber is already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = build_filter(settings)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::info!(
        target: "library-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}

fn build_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.log_level)
            .map_err(|e| anyhow!("invalid log level '{}': {e}", settings.log_level)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_log_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let settings = TelemetrySettings {
            log_level: "library=loud".to_string(),
            ..TelemetrySettings::default()
        };
        assert!(build_filter(&settings).is_err());
    }

    #[test]
    fn accepts_directive_lists() {
        let settings = TelemetrySettings {
            log_level: "info,library_http=debug".to_string(),
            ..TelemetrySettings::default()
        };
        assert!(build_filter(&settings).is_ok());
    }
}
