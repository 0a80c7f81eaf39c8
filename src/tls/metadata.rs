use chrono::NaiveDate;
use std::fmt;

/// Marker written in the status column for a successful probe
pub const SUCCESS_MARKER: &str = "200";

/// Outcome of a probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Success,
    ConnectionError(String),
}

impl ProbeStatus {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str(SUCCESS_MARKER),
            Self::ConnectionError(message) => f.write_str(message),
        }
    }
}

/// Certificate fields observed on one hostname.
///
/// Fields the certificate does not carry stay empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateProbeResult {
    /// Subject commonName
    pub common_name: String,
    /// Issuer organizationName
    pub issued_name: String,
    /// Serial number, uppercase hex
    pub serial_number: String,
    /// Date part of notAfter
    pub expiration_date: Option<NaiveDate>,
    pub status: ProbeStatus,
}

impl CertificateProbeResult {
    /// A failed probe: every certificate field empty
    #[must_use]
    pub fn connection_error(host: &str, cause: impl fmt::Display) -> Self {
        Self {
            common_name: String::new(),
            issued_name: String::new(),
            serial_number: String::new(),
            expiration_date: None,
            status: ProbeStatus::ConnectionError(format!(
                "ERROR: Connection error for {host}: {cause}."
            )),
        }
    }

    /// A completed handshake whose certificate could not be read
    #[must_use]
    pub const fn empty_success() -> Self {
        Self {
            common_name: String::new(),
            issued_name: String::new(),
            serial_number: String::new(),
            expiration_date: None,
            status: ProbeStatus::Success,
        }
    }
}
