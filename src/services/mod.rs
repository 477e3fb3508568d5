//! Service layer module root.
//! Contains the verification cascade, identity extraction and the
//! part-to-verdict association used while rendering a message.

pub mod banner;
pub mod cert_info;
pub mod coordinator;
pub mod diagnostics;
pub mod signed_parts;
pub mod verifier;

pub use banner::{Banner, BannerFormatter, BannerSeverity};
pub use cert_info::{identity_from_certificate, san_emails, CertificateInfoExtractor};
pub use coordinator::{CoordinatorState, SignatureCoordinator};
pub use diagnostics::Diagnostics;
pub use signed_parts::{SignedPartIndex, VerdictStore};
pub use verifier::SignatureVerifier;
