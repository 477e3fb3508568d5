//! OpenSSL-backed PKCS#7 verification and certificate parsing.
//!
//! `Pkcs7::from_smime` failures (the buffer is not a readable S/MIME entity)
//! are reported as indeterminate; a failing `Pkcs7::verify` is an explicit
//! failure. Error lines from every `ErrorStack` are queued until drained.

use crate::adapters::backend::{CertificateParser, Pkcs7Verifier, TrustMode, VerifyOutcome};
use crate::domain::{NameAttributes, ParsedCertificate, SignerCertificate};
use crate::infra::config::TrustConfig;
use crate::infra::error::{SmimeError, SmimeResult};
use crate::services::diagnostics::join_lines;
use openssl::error::ErrorStack;
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::ssl::SslFiletype;
use openssl::stack::Stack;
use openssl::x509::store::{X509Lookup, X509Store, X509StoreBuilder};
use openssl::x509::{GeneralNameRef, X509NameRef, X509};
use std::fs;
use std::net::{Ipv4Addr, Ipv6Addr};

/// PKCS#7 primitive backed by `PKCS7_verify`.
pub struct OpenSslPkcs7Verifier {
    store: X509Store,
    queued: Vec<String>,
}

impl OpenSslPkcs7Verifier {
    /// Verifier trusting exactly the anchors in `store`.
    #[must_use]
    pub fn new(store: X509Store) -> Self {
        Self {
            store,
            queued: Vec::new(),
        }
    }

    /// Build the trust store described by `trust`.
    pub fn from_config(trust: &TrustConfig) -> SmimeResult<Self> {
        let mut builder = X509StoreBuilder::new()?;

        if trust.use_system_roots {
            builder.set_default_paths()?;
        }

        if let Some(ca_file) = &trust.ca_file {
            let pem = fs::read(ca_file).map_err(|e| {
                SmimeError::ConfigurationError(format!(
                    "Failed to read CA file {}: {e}",
                    ca_file.display()
                ))
            })?;
            let anchors = X509::stack_from_pem(&pem).map_err(|e| {
                SmimeError::CertificateError(format!(
                    "Failed to parse CA file {}: {e}",
                    ca_file.display()
                ))
            })?;
            log::debug!(
                "Loaded {} trust anchors from {}",
                anchors.len(),
                ca_file.display()
            );
            for anchor in anchors {
                builder.add_cert(anchor)?;
            }
        }

        if let Some(ca_dir) = &trust.ca_dir {
            let dir = ca_dir.to_str().ok_or_else(|| {
                SmimeError::ConfigurationError(format!(
                    "CA directory is not valid UTF-8: {}",
                    ca_dir.display()
                ))
            })?;
            builder
                .add_lookup(X509Lookup::hash_dir())?
                .add_dir(dir, SslFiletype::PEM)?;
        }

        Ok(Self::new(builder.build()))
    }

    /// Verifier trusting only `anchors`.
    pub fn with_anchors<I>(anchors: I) -> SmimeResult<Self>
    where
        I: IntoIterator<Item = X509>,
    {
        let mut builder = X509StoreBuilder::new()?;
        for anchor in anchors {
            builder.add_cert(anchor)?;
        }
        Ok(Self::new(builder.build()))
    }

    fn queue(&mut self, errors: &ErrorStack) {
        self.queued
            .extend(errors.errors().iter().map(ToString::to_string));
    }
}

impl Pkcs7Verifier for OpenSslPkcs7Verifier {
    fn verify(&mut self, buffer: &[u8], trust: TrustMode) -> VerifyOutcome {
        let (pkcs7, content) = match Pkcs7::from_smime(buffer) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.queue(&e);
                return VerifyOutcome::Indeterminate;
            }
        };

        let flags = match trust {
            TrustMode::Chain => Pkcs7Flags::empty(),
            TrustMode::NoChain => Pkcs7Flags::NOVERIFY,
        };

        let extra_certs = match Stack::<X509>::new() {
            Ok(stack) => stack,
            Err(e) => {
                self.queue(&e);
                return VerifyOutcome::Indeterminate;
            }
        };

        if let Err(e) = pkcs7.verify(
            &extra_certs,
            &self.store,
            content.as_deref(),
            None,
            flags,
        ) {
            self.queue(&e);
            return VerifyOutcome::ExplicitFailure;
        }

        let signers = match pkcs7.signers(&extra_certs, Pkcs7Flags::empty()) {
            Ok(signers) => signers,
            Err(e) => {
                self.queue(&e);
                return VerifyOutcome::Indeterminate;
            }
        };

        let Some(signer) = signers.iter().next() else {
            self.queued
                .push("Signature verified but carries no signer certificate".to_string());
            return VerifyOutcome::Indeterminate;
        };

        match signer.to_der() {
            Ok(der) => VerifyOutcome::Success(SignerCertificate::from_bytes(der)),
            Err(e) => {
                self.queue(&e);
                VerifyOutcome::Indeterminate
            }
        }
    }

    fn drain_diagnostics(&mut self) -> Option<String> {
        // Pick up anything OpenSSL left on the thread-local queue as well.
        let leftover = ErrorStack::get();
        self.queue(&leftover);
        join_lines(self.queued.drain(..))
    }
}

/// Certificate parser backed by `X509`. Accepts DER or PEM.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSslCertificateParser;

impl CertificateParser for OpenSslCertificateParser {
    fn parse(&self, bytes: &[u8]) -> SmimeResult<ParsedCertificate> {
        let certificate = X509::from_der(bytes)
            .or_else(|_| X509::from_pem(bytes))
            .map_err(|e| {
                SmimeError::CertificateError(format!("Failed to parse certificate: {e}"))
            })?;

        Ok(ParsedCertificate {
            subject: name_attributes(certificate.subject_name()),
            issuer: name_attributes(certificate.issuer_name()),
            subject_alt_name: certificate.subject_alt_names().map(|names| {
                names
                    .iter()
                    .filter_map(render_general_name)
                    .collect::<Vec<_>>()
                    .join(", ")
            }),
        })
    }
}

fn name_attributes(name: &X509NameRef) -> NameAttributes {
    NameAttributes::new(
        name.entries()
            .filter_map(|entry| {
                let key = entry.object().nid().short_name().ok()?;
                let value = entry.data().to_string().ok()?;
                Some((key.to_string(), value))
            })
            .collect(),
    )
}

fn render_general_name(name: &GeneralNameRef) -> Option<String> {
    if let Some(email) = name.email() {
        return Some(format!("email:{email}"));
    }
    if let Some(dns) = name.dnsname() {
        return Some(format!("DNS:{dns}"));
    }
    if let Some(uri) = name.uri() {
        return Some(format!("URI:{uri}"));
    }
    let ip = name.ipaddress()?;
    match ip.len() {
        4 => {
            let octets: [u8; 4] = ip.try_into().ok()?;
            Some(format!("IP Address:{}", Ipv4Addr::from(octets)))
        }
        16 => {
            let octets: [u8; 16] = ip.try_into().ok()?;
            Some(format!("IP Address:{}", Ipv6Addr::from(octets)))
        }
        _ => None,
    }
}
