//! # Contact Telemetry
//!
//! Logging and metrics for the contact book contract.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with an `EnvFilter`, pretty or JSON output
//! - **Metrics**: Prometheus counters, gauge and histogram for contract activity
//!
//! ## Usage
//!
//! ```rust,ignore
//! use contact_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env()?;
//! let _guard = init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` / `CB_SERVICE_NAME` | `contact-book` | Service name |
//! | `CB_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `CB_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `CB_JSON_LOGS` | `false` | JSON log lines |
//! | `CB_METRICS_PORT` | `9100` | Prometheus port |
//! | `CB_NETWORK` | `sandbox` | Network name |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{encode_metrics, register_metrics};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metrics registry failure.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// An environment variable does not parse.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
///
/// # Errors
///
/// See [`init_logging`] and [`register_metrics`].
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    init_logging(config)?;

    tracing::info!(
        service = %config.full_service_name(),
        metrics_port = config.metrics_port,
        "Telemetry initialized"
    );
    Ok(TelemetryGuard {
        service: config.full_service_name(),
    })
}

/// Guard that keeps telemetry active. Logs shutdown on drop.
pub struct TelemetryGuard {
    service: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service, "Shutting down telemetry");
    }
}
