//! Signer identity extraction from certificates.
//!
//! The display identity is the subject common name, the signer's email
//! addresses and the issuing organization. When the Subject Alternative Name
//! extension lists at least one email address, that list replaces the subject
//! `emailAddress` entirely rather than being merged with it.

use crate::adapters::backend::CertificateParser;
use crate::domain::{ParsedCertificate, SignerCertificate, SignerIdentity};
use crate::infra::error::{SmimeError, SmimeResult};

/// Turns signer certificates into display identities.
pub struct CertificateInfoExtractor<P> {
    parser: P,
}

impl<P: CertificateParser> CertificateInfoExtractor<P> {
    #[must_use]
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    /// Parse `certificate` and derive the signer identity from it.
    pub fn extract(&self, certificate: &SignerCertificate) -> SmimeResult<SignerIdentity> {
        let parsed = self.parser.parse(certificate.as_bytes())?;
        identity_from_certificate(&parsed)
    }
}

/// Derive the signer identity from already parsed certificate fields.
///
/// Fails when the certificate names no email address at all, since a
/// successful verdict must always identify the signer by address.
pub fn identity_from_certificate(parsed: &ParsedCertificate) -> SmimeResult<SignerIdentity> {
    let name = parsed.subject.get("CN").map(str::to_string);

    let from_san = parsed
        .subject_alt_name
        .as_deref()
        .map(san_emails)
        .unwrap_or_default();

    let emails = if from_san.is_empty() {
        parsed
            .subject
            .get("emailAddress")
            .map(|e| vec![e.to_string()])
            .unwrap_or_default()
    } else {
        from_san
    };

    if emails.is_empty() {
        return Err(SmimeError::CertificateError(
            "Signer certificate carries no email address".to_string(),
        ));
    }

    let issuer_org = parsed.issuer.get("O").map(str::to_string);

    Ok(SignerIdentity {
        name,
        emails,
        issuer_org,
    })
}

/// Collect `email:` entries from a `type:value, type:value` SAN listing.
#[must_use]
pub fn san_emails(subject_alt_name: &str) -> Vec<String> {
    subject_alt_name
        .split(',')
        .filter_map(|entry| entry.trim().split_once(':'))
        .filter(|(kind, _)| kind.trim().eq_ignore_ascii_case("email"))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}
