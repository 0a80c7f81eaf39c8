use std::{str::FromStr, time::Duration};

/// Port probed on every hostname
pub const DEFAULT_PORT: u16 = 443;

/// Upper bound for TCP connect plus TLS handshake
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Configuration handed to [`super::Prober::new`]
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub port: u16,
    pub timeout: Duration,
    pub verification: TlsVerification,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            verification: TlsVerification::default(),
        }
    }
}

/// How the prober treats the certificate a server presents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVerification {
    /// Accept any certificate, hostname not checked. The probe observes what
    /// is served rather than judging it.
    #[default]
    Disabled,
    /// Validate the chain and hostname against the `webpki-roots` trust anchors;
    /// a failure is reported as a connection error
    WebPki,
}

impl FromStr for TlsVerification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disabled" | "none" => Ok(Self::Disabled),
            "webpki" => Ok(Self::WebPki),
            _ => Err(format!("Invalid TLS verification: {s}")),
        }
    }
}

impl TlsVerification {
    /// Check if certificates are validated
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}
