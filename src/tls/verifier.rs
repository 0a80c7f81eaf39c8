use super::TlsVerification;
use anyhow::{Result, anyhow};
use rustls::{
    DigitallySignedStruct, RootCertStore, SignatureScheme,
    client::{
        WebPkiServerVerifier,
        danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier},
    },
    pki_types::{CertificateDer, ServerName, UnixTime},
};
use std::sync::Arc;

/// Build the certificate verifier for a verification mode.
///
/// `Disabled` accepts whatever the server presents, so expired, self-signed
/// and mismatched certificates are still inventoried. `WebPki` validates chain
/// and hostname against the bundled `webpki-roots` anchors.
///
/// # Errors
///
/// Returns an error if the `WebPKI` verifier cannot be built
pub fn build_verifier(verification: TlsVerification) -> Result<Arc<dyn ServerCertVerifier>> {
    match verification {
        TlsVerification::Disabled => Ok(Arc::new(NoVerifier)),
        TlsVerification::WebPki => {
            let root_store: RootCertStore =
                webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();
            let verifier: Arc<dyn ServerCertVerifier> =
                WebPkiServerVerifier::builder(Arc::new(root_store))
                    .build()
                    .map_err(|e| anyhow!("failed to build WebPKI verifier: {e}"))?;
            Ok(verifier)
        }
    }
}

/// Certificate verifier that accepts any certificate without validation.
#[derive(Debug)]
pub struct NoVerifier;

impl ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::tls::ensure_crypto_provider;

    #[test]
    fn test_build_disabled_verifier() {
        let verifier = build_verifier(TlsVerification::Disabled).unwrap();
        assert!(format!("{verifier:?}").contains("NoVerifier"));
    }

    #[test]
    fn test_build_webpki_verifier() {
        ensure_crypto_provider();
        let verifier = build_verifier(TlsVerification::WebPki).unwrap();
        assert!(!verifier.supported_verify_schemes().is_empty());
    }

    #[test]
    fn test_no_verifier_accepts_anything() {
        let verifier = NoVerifier;
        let cert = CertificateDer::from(vec![0u8; 4]);
        let name = ServerName::try_from("example.com").unwrap();
        let result = verifier.verify_server_cert(&cert, &[], &name, &[], UnixTime::now());
        assert!(result.is_ok());
    }

    #[test]
    fn test_no_verifier_supported_schemes() {
        let schemes = NoVerifier.supported_verify_schemes();
        assert!(schemes.contains(&SignatureScheme::RSA_PKCS1_SHA256));
        assert!(schemes.contains(&SignatureScheme::ED25519));
    }
}
