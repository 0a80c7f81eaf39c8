use crate::{
    cli::actions::Action,
    inventory::InventoryOptions,
    report::OutputFormat,
    tls::{ProbeConfig, TlsVerification},
    zone::ExtractOptions,
};
use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use std::{path::PathBuf, time::Duration};

/// Convert `ArgMatches` into typed Action enum with validation
///
/// # Errors
///
/// Returns an error if a required argument is missing or a value is invalid
pub fn dispatch(matches: &ArgMatches) -> Result<Action> {
    let inputfile = matches
        .get_one::<String>("inputfile")
        .map(PathBuf::from)
        .context("input file is required")?;

    let domain = matches
        .get_one::<String>("domain")
        .cloned()
        .context("domain is required")?;

    let output = matches
        .get_one::<String>("output")
        .map_or_else(|| PathBuf::from("output/domains.csv"), PathBuf::from);

    let format = matches
        .get_one::<String>("format")
        .map(|f| f.parse::<OutputFormat>().map_err(|e| anyhow!(e)))
        .transpose()?
        .unwrap_or_default();

    let port = matches.get_one::<u16>("port").copied().unwrap_or(443);
    let timeout = matches.get_one::<u16>("timeout").copied().unwrap_or(3);

    let verification = if matches.get_flag("verify") {
        TlsVerification::WebPki
    } else {
        TlsVerification::Disabled
    };

    let metrics_file = matches.get_one::<String>("metrics-file").map(PathBuf::from);

    Ok(Action::Inventory(InventoryOptions {
        inputfile,
        domain,
        output,
        format,
        header: matches.get_flag("header"),
        probe: ProbeConfig {
            port,
            timeout: Duration::from_secs(u64::from(timeout)),
            verification,
        },
        extract: ExtractOptions {
            check_origin: matches.get_flag("check-origin"),
        },
        metrics_file,
        progress: !matches.get_flag("no-progress"),
    }))
}
