use super::{
    CertificateProbeResult, ProbeConfig, ProbeStatus, build_verifier, expiry::expiration_date,
};
use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use rustls::{ClientConfig, pki_types::ServerName};
use std::{
    fmt::Write,
    net::IpAddr,
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::{net::TcpStream, time::timeout};
use tokio_rustls::{TlsConnector, client::TlsStream};
use x509_parser::prelude::{AttributeTypeAndValue, FromDer, X509Certificate};

static CRYPTO_PROVIDER_INIT: OnceLock<()> = OnceLock::new();

/// Ensure the rustls crypto provider is initialized
///
/// Safe to call multiple times; installation happens once per process.
pub fn ensure_crypto_provider() {
    CRYPTO_PROVIDER_INIT.get_or_init(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("rustls crypto provider already installed");
        }
    });
}

/// Drop a leading `*.` or `@.` so wildcard and apex owners resolve
#[must_use]
pub fn strip_wildcard(hostname: &str) -> &str {
    hostname
        .strip_prefix("*.")
        .or_else(|| hostname.strip_prefix("@."))
        .unwrap_or(hostname)
}

/// TLS certificate prober
///
/// One instance is built per run and reused for every hostname.
#[derive(Clone)]
pub struct Prober {
    connector: TlsConnector,
    port: u16,
    timeout: Duration,
}

impl Prober {
    /// Build a prober from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate verifier cannot be built
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        ensure_crypto_provider();

        let verifier = build_verifier(config.verification)
            .context("failed to build certificate verifier")?;
        let tls_config = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(verifier)
            .with_no_client_auth();

        if config.verification.is_enabled() {
            info!("certificate verification enabled (webpki roots)");
        } else {
            debug!("certificate verification disabled, any served certificate is accepted");
        }

        Ok(Self {
            connector: TlsConnector::from(Arc::new(tls_config)),
            port: config.port,
            timeout: config.timeout,
        })
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Probe one hostname. Never fails: network and TLS errors end up in
    /// [`ProbeStatus::ConnectionError`].
    pub async fn probe(&self, hostname: &str) -> CertificateProbeResult {
        let host = strip_wildcard(hostname);

        match timeout(self.timeout, self.handshake(host)).await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                debug!("probe of {host}:{} failed: {err:#}", self.port);
                CertificateProbeResult::connection_error(host, format!("{err:#}"))
            }
            Err(_) => {
                debug!("probe of {host}:{} timed out", self.port);
                CertificateProbeResult::connection_error(
                    host,
                    format!("timed out after {:?}", self.timeout),
                )
            }
        }
    }

    async fn handshake(&self, host: &str) -> Result<CertificateProbeResult> {
        let server_name = server_name_from_host(host)?;

        let stream = TcpStream::connect((host, self.port))
            .await
            .with_context(|| format!("failed to connect to {host}:{}", self.port))?;

        let tls_stream = self
            .connector
            .connect(server_name, stream)
            .await
            .context("TLS handshake failed")?;

        let result = certificate_from_stream(&tls_stream);
        drop(tls_stream);

        Ok(result)
    }
}

fn server_name_from_host(host: &str) -> Result<ServerName<'static>> {
    host.parse::<IpAddr>().map_or_else(
        |_| {
            ServerName::try_from(host.to_string())
                .map_err(|_| anyhow!("invalid server name: {host}"))
        },
        |ip| Ok(ServerName::from(ip)),
    )
}

fn certificate_from_stream(stream: &TlsStream<TcpStream>) -> CertificateProbeResult {
    let (_, connection) = stream.get_ref();
    let Some(cert) = connection
        .peer_certificates()
        .and_then(|certs| certs.first())
    else {
        warn!("handshake completed without a peer certificate");
        return CertificateProbeResult::empty_success();
    };

    extract_certificate(cert.as_ref()).unwrap_or_else(|err| {
        warn!("{err:#}");
        CertificateProbeResult::empty_success()
    })
}

/// Read subject CN, issuer O, serial and expiration from a DER certificate
///
/// # Errors
///
/// Returns an error if the certificate cannot be parsed
pub fn extract_certificate(cert_der: &[u8]) -> Result<CertificateProbeResult> {
    let (_, cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| anyhow!("failed to parse certificate: {e}"))?;

    Ok(CertificateProbeResult {
        common_name: last_attribute(cert.subject().iter_common_name()),
        issued_name: last_attribute(cert.issuer().iter_organization()),
        serial_number: serial_hex(cert.raw_serial()),
        expiration_date: expiration_date(&cert.validity().not_after),
        status: ProbeStatus::Success,
    })
}

fn last_attribute<'a, 'b: 'a>(
    attributes: impl Iterator<Item = &'a AttributeTypeAndValue<'b>>,
) -> String {
    attributes
        .filter_map(|attr| attr.as_str().ok())
        .last()
        .map(str::to_string)
        .unwrap_or_default()
}

// DER integers carry a leading zero byte when the high bit is set
fn serial_hex(raw: &[u8]) -> String {
    let start = raw
        .iter()
        .position(|&b| b != 0)
        .unwrap_or_else(|| raw.len().saturating_sub(1));

    raw.get(start..)
        .unwrap_or_default()
        .iter()
        .fold(String::new(), |mut out, byte| {
            let _ = write!(out, "{byte:02X}");
            out
        })
}
