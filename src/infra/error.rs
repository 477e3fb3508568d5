//! Error types for S/MIME verification operations.
//!
//! Verification itself never fails (the cascade always yields a verdict); these
//! errors cover the collaborator boundary: mail-store access, certificate
//! parsing, MIME structure parsing and configuration.

use thiserror::Error;

/// Result type for verification operations
pub type SmimeResult<T> = Result<T, SmimeError>;

/// Error types for S/MIME verification operations
#[derive(Error, Debug, miette::Diagnostic)]
pub enum SmimeError {
    #[error("Mail store error: {0}")]
    StoreError(String),

    #[error("Unknown message part: {0}")]
    UnknownPart(String),

    #[error("Certificate error: {0}")]
    CertificateError(String),

    #[error("Cryptographic error: {0}")]
    CryptographicError(String),

    #[error("MIME parsing error: {0}")]
    MimeError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<openssl::error::ErrorStack> for SmimeError {
    fn from(error: openssl::error::ErrorStack) -> Self {
        SmimeError::CryptographicError(error.to_string())
    }
}

impl From<mailparse::MailParseError> for SmimeError {
    fn from(error: mailparse::MailParseError) -> Self {
        SmimeError::MimeError(error.to_string())
    }
}

impl From<std::io::Error> for SmimeError {
    fn from(error: std::io::Error) -> Self {
        SmimeError::IoError(error.to_string())
    }
}
