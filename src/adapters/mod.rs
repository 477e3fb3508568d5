//! Adapter layer modules for external system integration.
//!
//! Provides adapters for:
//! - The collaborator interfaces the verification core depends on
//! - OpenSSL PKCS#7 verification and X.509 certificate parsing
//! - RFC 822 message parsing and verbatim part access via `mailparse`

pub mod backend;
pub mod eml;
pub mod openssl_backend;

pub use backend::{
    CertificateParser, MailStore, Pkcs7Verifier, TrustMode, VerbatimPart, VerifyOutcome,
};
pub use eml::EmlMessage;
pub use openssl_backend::{OpenSslCertificateParser, OpenSslPkcs7Verifier};
