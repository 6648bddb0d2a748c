//! Prometheus metrics for the contact book contract.
//!
//! All metrics follow the naming convention: `cb_contract_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Inbound messages by kind and outcome (`ok` or an error label)
    pub static ref MESSAGES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("cb_contract_messages_total", "Inbound messages processed"),
        &["kind", "outcome"]
    ).expect("metric creation failed");

    /// Outgoing messages emitted by committed transitions
    pub static ref OUTGOING_MESSAGES: Counter = Counter::new(
        "cb_contract_outgoing_messages_total",
        "Outgoing messages emitted"
    ).expect("metric creation failed");

    /// Contacts currently stored
    pub static ref CONTACTS_STORED: Gauge = Gauge::new(
        "cb_contract_contacts_stored",
        "Number of contacts in the book"
    ).expect("metric creation failed");

    /// Recipients per broadcast
    pub static ref BROADCAST_FANOUT: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "cb_contract_broadcast_fanout",
            "Messages emitted by one broadcast"
        ).buckets(exponential_buckets(1.0, 2.0, 12).expect("valid buckets"))
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry. Safe to call twice.
///
/// # Errors
///
/// `TelemetryError::MetricsInit` on any registry error other than a
/// duplicate registration.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(MESSAGES_TOTAL.clone()),
        Box::new(OUTGOING_MESSAGES.clone()),
        Box::new(CONTACTS_STORED.clone()),
        Box::new(BROADCAST_FANOUT.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
///
/// # Errors
///
/// `TelemetryError::MetricsInit` if encoding fails.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Count one inbound message.
pub fn record_message(kind: &str, outcome: &str) {
    MESSAGES_TOTAL.with_label_values(&[kind, outcome]).inc();
}

/// Count outgoing messages.
#[allow(clippy::cast_precision_loss)]
pub fn record_outgoing(count: usize) {
    OUTGOING_MESSAGES.inc_by(count as f64);
}

/// Set the contacts gauge.
#[allow(clippy::cast_precision_loss)]
pub fn set_contacts_stored(count: usize) {
    CONTACTS_STORED.set(count as f64);
}

/// Observe one broadcast's fan-out.
#[allow(clippy::cast_precision_loss)]
pub fn observe_broadcast_fanout(recipients: usize) {
    BROADCAST_FANOUT.observe(recipients as f64);
}
