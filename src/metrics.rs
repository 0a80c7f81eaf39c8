use crate::report::ReportRow;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Registry, opts, register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, register_int_gauge_vec_with_registry,
    register_int_gauge_with_registry,
};
use std::{fs, path::Path, sync::LazyLock};

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

trait ResultExt<T> {
    fn or_exit(self, context: &str) -> T;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn or_exit(self, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                eprintln!("failed to initialize metric ({context}): {err}");
                std::process::exit(1);
            }
        }
    }
}

pub static HOSTNAMES: LazyLock<IntGauge> = LazyLock::new(|| {
    register_int_gauge_with_registry!(
        "zonecert_hostnames",
        "Hostnames extracted from the zone file",
        &REGISTRY
    )
    .or_exit("metric can be created")
});

pub static ZONE_PARSE_ERRORS: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter_with_registry!(
        "zonecert_zone_parse_errors_total",
        "Zone files that failed to parse",
        &REGISTRY
    )
    .or_exit("metric can be created")
});

pub static PROBES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec_with_registry!(
        opts!(
            "zonecert_probes_total",
            "Certificate probes by record type and outcome"
        ),
        &["record_type", "status"],
        &REGISTRY
    )
    .or_exit("metric can be created")
});

pub static PROBE_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    register_histogram_with_registry!(
        HistogramOpts::new(
            "zonecert_probe_duration_seconds",
            "Connect plus TLS handshake duration in seconds"
        ),
        &REGISTRY
    )
    .or_exit("metric can be created")
});

pub static CERT_EXPIRY_DAYS: LazyLock<IntGaugeVec> = LazyLock::new(|| {
    register_int_gauge_vec_with_registry!(
        opts!(
            "zonecert_cert_expiry_days",
            "Days until certificate expiration (negative if expired)"
        ),
        &["hostname"],
        &REGISTRY
    )
    .or_exit("metric can be created")
});

/// Count a report row and, when known, record its days to expiry
pub fn record_row(row: &ReportRow, today: NaiveDate) {
    let status = if row.is_success() {
        "success"
    } else {
        "error"
    };
    PROBES
        .with_label_values(&[row.record_type.as_str(), status])
        .inc();

    if let Some(expiration) = row.expiration_date {
        CERT_EXPIRY_DAYS
            .with_label_values(&[row.hostname.as_str()])
            .set((expiration - today).num_days());
    }
}

/// Encode and return metrics in the prometheus text format
///
/// # Errors
///
/// Returns an error if metrics encoding fails
pub fn encode_metrics() -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    let encoder = prometheus::TextEncoder::new();

    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| format!("could not encode custom metrics: {e}"))?;

    Ok(buffer)
}

/// Write the encoded metrics to `path` for a textfile collector
///
/// # Errors
///
/// Returns an error if encoding or writing fails
pub fn write_textfile(path: &Path) -> Result<()> {
    let buffer = encode_metrics().map_err(|e| anyhow!(e))?;
    fs::write(path, buffer)
        .with_context(|| format!("failed to write metrics to {}", path.display()))
}
