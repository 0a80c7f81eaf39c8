//! Certificate probing over TLS
//!
//! A [`Prober`] connects to each hostname, completes a TLS handshake and
//! reads the leaf certificate the server presents.
//!
//! # Module Organization
//!
//! - `config` - Port, timeout and verification mode
//! - `metadata` - Probe result and status
//! - `probe` - Connection, handshake and certificate extraction
//! - `verifier` - Certificate verifiers for each verification mode
//! - `expiry` - notAfter to calendar date
//!
//! # Example
//!
//! ```rust,no_run
//! use zonecert::tls::{ProbeConfig, Prober};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let prober = Prober::new(&ProbeConfig::default())?;
//! let result = prober.probe("*.example.com").await;
//! println!("{} {}", result.common_name, result.status);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod expiry;
pub mod metadata;
pub mod probe;
pub mod verifier;

pub use config::{DEFAULT_PORT, DEFAULT_TIMEOUT, ProbeConfig, TlsVerification};
pub use expiry::{expiration_date, parse_not_after};
pub use metadata::{CertificateProbeResult, ProbeStatus, SUCCESS_MARKER};
pub use probe::{Prober, ensure_crypto_provider, extract_certificate, strip_wildcard};
pub use verifier::{NoVerifier, build_verifier};
