use crate::{
    metrics,
    report::{self, OutputFormat, ReportWriter},
    tls::{ProbeConfig, Prober},
    zone::{ExtractOptions, HostnameMap, decode_zone, extract_with},
};
use anyhow::{Context, Result};
use chrono::Utc;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::{
    path::{Path, PathBuf},
    pin::pin,
};

/// Everything one inventory run needs
#[derive(Debug, Clone)]
pub struct InventoryOptions {
    pub inputfile: PathBuf,
    pub domain: String,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub header: bool,
    pub probe: ProbeConfig,
    pub extract: ExtractOptions,
    pub metrics_file: Option<PathBuf>,
    pub progress: bool,
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventorySummary {
    pub hostnames: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub zone_parse_failed: bool,
}

/// Read the zone file and extract its hostnames.
///
/// A malformed zone is logged and yields an empty map; the run continues.
///
/// # Errors
///
/// Returns an error if the file cannot be read
pub async fn load_hostnames(
    path: &Path,
    domain: &str,
    options: &ExtractOptions,
) -> Result<(HostnameMap, bool)> {
    info!("Parsing {} for domain {domain}", path.display());

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read zone file {}", path.display()))?;

    match decode_zone(&bytes).and_then(|contents| extract_with(contents, domain, options)) {
        Ok(hostnames) => Ok((hostnames, false)),
        Err(err) => {
            error!("{}: {err}", path.display());
            metrics::ZONE_PARSE_ERRORS.inc();
            Ok((HostnameMap::new(), true))
        }
    }
}

fn progress_bar(len: usize, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(u64::try_from(len).unwrap_or(u64::MAX));
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("=>-"));
    }
    bar
}

/// Extract, probe and write the report.
///
/// Rows are written as each probe completes, in extraction order.
///
/// # Errors
///
/// Returns an error if the zone file cannot be read or the report or
/// metrics file cannot be written
pub async fn run(options: &InventoryOptions) -> Result<InventorySummary> {
    let (hostnames, zone_parse_failed) =
        load_hostnames(&options.inputfile, &options.domain, &options.extract).await?;

    let mut summary = InventorySummary {
        hostnames: hostnames.len(),
        zone_parse_failed,
        ..InventorySummary::default()
    };
    metrics::HOSTNAMES.set(i64::try_from(summary.hostnames).unwrap_or(i64::MAX));

    info!("Getting certificates for {} domains...", summary.hostnames);

    let mut writer = ReportWriter::create(&options.output, options.format, options.header)?;
    let prober = Prober::new(&options.probe)?;
    let progress = progress_bar(summary.hostnames, options.progress);
    let today = Utc::now().date_naive();

    let mut rows = pin!(report::assemble(&prober, hostnames));
    while let Some(row) = rows.next().await {
        metrics::record_row(&row, today);
        if row.is_success() {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }

        writer.write_row(&row)?;
        progress.set_message(row.hostname);
        progress.inc(1);
    }
    progress.finish_and_clear();

    writer.finish()?;
    info!(
        "wrote {} rows to {} ({} ok, {} failed)",
        summary.hostnames,
        options.output.display(),
        summary.succeeded,
        summary.failed
    );

    if let Some(path) = &options.metrics_file {
        metrics::write_textfile(path)?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::{tls::TlsVerification, zone::RecordType};
    use std::{fs, time::Duration};

    fn options(dir: &Path, zone: &str, port: u16) -> InventoryOptions {
        let inputfile = dir.join("db.example");
        fs::write(&inputfile, zone).unwrap();
        InventoryOptions {
            inputfile,
            domain: "127.0.0.1".to_string(),
            output: dir.join("output").join("domains.csv"),
            format: OutputFormat::Csv,
            header: false,
            probe: ProbeConfig {
                port,
                timeout: Duration::from_secs(2),
                verification: TlsVerification::Disabled,
            },
            extract: ExtractOptions::default(),
            metrics_file: Some(dir.join("zonecert.prom")),
            progress: false,
        }
    }

    fn closed_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_load_hostnames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.example");
        fs::write(&path, "www IN A 192.0.2.1\n").unwrap();

        let (map, failed) = load_hostnames(&path, "example.com", &ExtractOptions::default())
            .await
            .unwrap();
        assert!(!failed);
        assert_eq!(map.get("www.example.com"), Some(RecordType::A));
    }

    #[tokio::test]
    async fn test_load_hostnames_malformed_zone_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.example");
        fs::write(&path, "www IN A not-an-address\n").unwrap();

        let (map, failed) = load_hostnames(&path, "example.com", &ExtractOptions::default())
            .await
            .unwrap();
        assert!(failed);
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_load_hostnames_invalid_utf8_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.example");
        fs::write(&path, b"www IN A 192.0.2.1\ntxt IN TXT \"caf\xE9\"\n").unwrap();

        let (map, failed) = load_hostnames(&path, "example.com", &ExtractOptions::default())
            .await
            .unwrap();
        assert!(failed);
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_load_hostnames_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_hostnames(
            &dir.path().join("missing"),
            "example.com",
            &ExtractOptions::default(),
        )
        .await;
        assert!(result.unwrap_err().to_string().contains("failed to read zone file"));
    }

    #[tokio::test]
    async fn test_run_writes_a_row_per_hostname() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), "@ IN NS ns1\n* IN A 192.0.2.1\n", closed_port());

        let summary = run(&opts).await.unwrap();
        assert_eq!(summary.hostnames, 2);
        assert_eq!(summary.failed, 2);
        assert!(!summary.zone_parse_failed);

        let report = fs::read_to_string(&opts.output).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.first().unwrap().starts_with(
            "@.127.0.0.1,NS,,,,,ERROR: Connection error for 127.0.0.1: "
        ));
        assert!(lines.get(1).unwrap().starts_with("*.127.0.0.1,A,,,,,ERROR: "));
        assert!(
            fs::read_to_string(dir.path().join("zonecert.prom"))
                .unwrap()
                .contains("zonecert_probes_total")
        );
    }

    #[tokio::test]
    async fn test_run_invalid_utf8_writes_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), "", closed_port());
        fs::write(&opts.inputfile, b"www IN TXT \"\xFF\"\n").unwrap();

        let summary = run(&opts).await.unwrap();
        assert!(summary.zone_parse_failed);
        assert_eq!(summary.hostnames, 0);
        assert_eq!(fs::read_to_string(&opts.output).unwrap(), "");
    }

    #[tokio::test]
    async fn test_run_malformed_zone_writes_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), "www IN BOGUS data\n", closed_port());

        let summary = run(&opts).await.unwrap();
        assert!(summary.zone_parse_failed);
        assert_eq!(summary.hostnames, 0);
        assert_eq!(fs::read_to_string(&opts.output).unwrap(), "");
    }
}
