//! Collaborator interfaces required by the verification core.
//!
//! The core never touches a mailbox or an ASN.1 parser directly. It talks to:
//! - a [`MailStore`] that serves raw message bytes and verbatim part bytes
//! - a [`Pkcs7Verifier`] primitive that checks one S/MIME buffer
//! - a [`CertificateParser`] that exposes the signer certificate's name fields

use crate::domain::{MessageId, ParsedCertificate, PartId, SignerCertificate};
use crate::infra::error::SmimeResult;

/// How much of the signer certificate the primitive should trust-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustMode {
    /// Signature must match and the certificate must chain to a trust anchor.
    Chain,
    /// Only check that the signature matches its content.
    NoChain,
}

/// Outcome of one call to the PKCS#7 primitive.
#[derive(Debug, Clone)]
pub enum VerifyOutcome {
    /// Signature verified; carries the signer certificate.
    Success(SignerCertificate),
    /// Signature or certificate check failed cryptographically.
    ExplicitFailure,
    /// The buffer could not be parsed or processed.
    Indeterminate,
}

/// External "verify PKCS#7 signature" primitive.
pub trait Pkcs7Verifier {
    /// Verify the S/MIME entity in `buffer`.
    ///
    /// Never fails: every problem is expressed as an outcome, with details
    /// available from [`Pkcs7Verifier::drain_diagnostics`].
    fn verify(&mut self, buffer: &[u8], trust: TrustMode) -> VerifyOutcome;

    /// Take the diagnostic text queued by the most recent calls, if any.
    fn drain_diagnostics(&mut self) -> Option<String>;
}

/// Exact, non-normalized bytes of one message part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbatimPart {
    /// Header block, ending with the last header's line break.
    pub headers: Vec<u8>,
    pub body: Vec<u8>,
}

impl VerbatimPart {
    /// Reassemble the part as it was signed: headers, a blank line, body.
    #[must_use]
    pub fn reconstruct(&self) -> Vec<u8> {
        let eol: &[u8] = if self.headers.windows(2).any(|w| w == b"\r\n") {
            b"\r\n"
        } else {
            b"\n"
        };

        let mut out = Vec::with_capacity(self.headers.len() + self.body.len() + 4);
        out.extend_from_slice(&self.headers);
        if !self.headers.is_empty() && !self.headers.ends_with(b"\n") {
            out.extend_from_slice(eol);
        }
        out.extend_from_slice(eol);
        out.extend_from_slice(&self.body);
        out
    }
}

/// Read access to stored messages.
pub trait MailStore {
    /// Full raw message as stored.
    fn fetch_raw_message(&self, message: &MessageId) -> SmimeResult<Vec<u8>>;

    /// Headers and body of one part, bypassing any transfer-encoding
    /// normalization the store applies to full-message fetches.
    fn fetch_verbatim_part(&self, message: &MessageId, part: &PartId)
        -> SmimeResult<VerbatimPart>;
}

/// Parses raw certificate bytes into the fields identity extraction needs.
pub trait CertificateParser {
    fn parse(&self, bytes: &[u8]) -> SmimeResult<ParsedCertificate>;
}
