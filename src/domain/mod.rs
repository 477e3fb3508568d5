//! Domain types shared by the verification services.
//!
//! - Message structure: part identifiers and the borrowed part arena
//! - Verdicts: validity classes, signer identity, stage diagnostics
//! - Certificates: raw signer certificate bytes and parsed name fields

pub mod certificate;
pub mod part;
pub mod verdict;

pub use certificate::{NameAttributes, ParsedCertificate, SignerCertificate};
pub use part::{MessageId, MimePart, PartId, PartIndex, PartTree};
pub use verdict::{SignatureVerdict, SignerIdentity, StageDiagnostic, Validity};
