//! Telemetry configuration from environment variables.

use crate::TelemetryError;
use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log filter directive (trace, debug, info, warn, error, or a full
    /// `EnvFilter` expression)
    pub log_level: String,

    /// Whether to write logs to stdout
    pub console_output: bool,

    /// Whether to format logs as JSON
    pub json_logs: bool,

    /// Prometheus metrics port
    pub metrics_port: u16,

    /// Network identifier (sandbox, testnet, mainnet)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "contact-book".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_port: 9100,
            network: "sandbox".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME` or `CB_SERVICE_NAME`: Service name (default: contact-book)
    /// - `CB_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `CB_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `CB_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `CB_METRICS_PORT`: Prometheus metrics port (default: 9100)
    /// - `CB_NETWORK`: Network name (default: sandbox)
    ///
    /// # Errors
    ///
    /// `TelemetryError::Config` if a boolean or the port does not parse.
    pub fn from_env() -> Result<Self, TelemetryError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`TelemetryConfig::from_env`] with a custom variable source.
    ///
    /// # Errors
    ///
    /// `TelemetryError::Config` if a boolean or the port does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TelemetryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Ok(Self {
            service_name: lookup("OTEL_SERVICE_NAME")
                .or_else(|| lookup("CB_SERVICE_NAME"))
                .unwrap_or(defaults.service_name),

            log_level: lookup("CB_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: lookup("CB_CONSOLE_OUTPUT")
                .map(|v| parse_bool("CB_CONSOLE_OUTPUT", &v))
                .transpose()?
                .unwrap_or(defaults.console_output),

            json_logs: lookup("CB_JSON_LOGS")
                .map(|v| parse_bool("CB_JSON_LOGS", &v))
                .transpose()?
                .unwrap_or(is_container),

            metrics_port: lookup("CB_METRICS_PORT")
                .map(|v| {
                    v.trim()
                        .parse()
                        .map_err(|_| TelemetryError::Config(format!("CB_METRICS_PORT={v}")))
                })
                .transpose()?
                .unwrap_or(defaults.metrics_port),

            network: lookup("CB_NETWORK").unwrap_or(defaults.network),
        })
    }

    /// Service name qualified with the network, e.g. `contact-book-testnet`.
    pub fn full_service_name(&self) -> String {
        format!("{}-{}", self.service_name, self.network)
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, TelemetryError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TelemetryError::Config(format!("{name}={value}"))),
    }
}
