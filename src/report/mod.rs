//! Report assembly
//!
//! Drives the extracted hostnames through the prober one at a time and
//! yields one [`ReportRow`] per hostname, in extraction order.

pub mod writer;

pub use writer::{OutputFormat, ReportWriter};

use crate::{
    metrics,
    tls::{CertificateProbeResult, Prober, SUCCESS_MARKER},
    zone::{HostnameMap, HostnameRecord, RecordType},
};
use chrono::NaiveDate;
use futures::stream::{self, Stream, StreamExt};
use serde::{Serialize, Serializer};
use std::time::Instant;

/// One line of the report, fields in column order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub hostname: String,
    pub record_type: RecordType,
    pub common_name: String,
    pub issued_name: String,
    #[serde(serialize_with = "serialize_date")]
    pub expiration_date: Option<NaiveDate>,
    pub serial_number: String,
    pub status: String,
}

impl ReportRow {
    #[must_use]
    pub fn new(record: HostnameRecord, result: CertificateProbeResult) -> Self {
        Self {
            hostname: record.fqdn,
            record_type: record.record_type,
            common_name: result.common_name,
            issued_name: result.issued_name,
            expiration_date: result.expiration_date,
            serial_number: result.serial_number,
            status: result.status.to_string(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_MARKER
    }

    /// `YYYY-MM-DD`, or empty when the expiration is unknown
    #[must_use]
    pub fn expiration(&self) -> String {
        self.expiration_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

#[allow(clippy::ref_option)]
fn serialize_date<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serializer.collect_str(&date.format("%Y-%m-%d")),
        None => serializer.serialize_str(""),
    }
}

/// Probe every hostname in `hostnames`, sequentially, yielding a row as each
/// probe completes.
pub fn assemble(prober: &Prober, hostnames: HostnameMap) -> impl Stream<Item = ReportRow> + '_ {
    stream::iter(hostnames).then(move |record| async move {
        let start = Instant::now();
        let result = prober.probe(&record.fqdn).await;
        metrics::PROBE_DURATION.observe(start.elapsed().as_secs_f64());
        ReportRow::new(record, result)
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::tls::{ProbeConfig, ProbeStatus, TlsVerification};
    use std::time::Duration;

    fn record(fqdn: &str, record_type: RecordType) -> HostnameRecord {
        HostnameRecord {
            fqdn: fqdn.to_string(),
            record_type,
        }
    }

    #[test]
    fn test_row_from_success() {
        let result = CertificateProbeResult {
            common_name: "www.example.com".to_string(),
            issued_name: "Example CA".to_string(),
            serial_number: "0A1B".to_string(),
            expiration_date: NaiveDate::from_ymd_opt(2030, 1, 1),
            status: ProbeStatus::Success,
        };
        let row = ReportRow::new(record("www.example.com", RecordType::A), result);
        assert_eq!(row.hostname, "www.example.com");
        assert_eq!(row.record_type, RecordType::A);
        assert_eq!(row.expiration(), "2030-01-01");
        assert_eq!(row.status, "200");
        assert!(row.is_success());
    }

    #[test]
    fn test_row_from_connection_error() {
        let result = CertificateProbeResult::connection_error("example.com", "refused");
        let row = ReportRow::new(record("*.example.com", RecordType::Cname), result);
        assert_eq!(row.hostname, "*.example.com");
        assert_eq!(row.expiration(), "");
        assert!(!row.is_success());
        assert_eq!(row.status, "ERROR: Connection error for example.com: refused.");
    }

    #[test]
    fn test_row_serializes_in_column_order() {
        let result = CertificateProbeResult::connection_error("example.com", "refused");
        let row = ReportRow::new(record("@.example.com", RecordType::Ns), result);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"hostname":"@.example.com","record_type":"NS","common_name":"","issued_name":"","expiration_date":"","serial_number":"","status":"ERROR: Connection error for example.com: refused."}"#
        );
    }

    #[tokio::test]
    async fn test_assemble_one_row_per_hostname_in_order() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let prober = Prober::new(&ProbeConfig {
            port,
            timeout: Duration::from_secs(2),
            verification: TlsVerification::Disabled,
        })
        .unwrap();

        let mut hostnames = HostnameMap::new();
        hostnames.insert("127.0.0.1".to_string(), RecordType::A);
        hostnames.insert("*.127.0.0.1".to_string(), RecordType::Cname);
        hostnames.insert("@.127.0.0.1".to_string(), RecordType::Ns);

        let rows: Vec<ReportRow> = assemble(&prober, hostnames).collect().await;
        let names: Vec<&str> = rows.iter().map(|r| r.hostname.as_str()).collect();
        assert_eq!(names, vec!["127.0.0.1", "*.127.0.0.1", "@.127.0.0.1"]);
        assert!(rows.iter().all(|r| r.status.starts_with("ERROR: ")));
    }

    #[tokio::test]
    async fn test_assemble_empty_map() {
        let prober = Prober::new(&ProbeConfig::default()).unwrap();
        let rows: Vec<ReportRow> = assemble(&prober, HostnameMap::new()).collect().await;
        assert!(rows.is_empty());
    }
}
