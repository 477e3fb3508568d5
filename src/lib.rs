//! S/MIME Verification Library
//!
//! Verifies detached S/MIME (PKCS#7) signatures inside MIME messages and
//! associates each verdict with the message parts it covers, so a renderer
//! can annotate every signed subtree exactly once.

pub mod adapters;
pub mod domain;
pub mod infra;
pub mod pipelines;
pub mod services;

pub use adapters::{
    CertificateParser, EmlMessage, MailStore, OpenSslCertificateParser, OpenSslPkcs7Verifier,
    Pkcs7Verifier, TrustMode, VerbatimPart, VerifyOutcome,
};
pub use domain::{MessageId, PartId, PartTree, SignatureVerdict, SignerIdentity, Validity};
pub use infra::config::{BannerTexts, ConfigManager, TrustConfig, VerifierConfiguration};
pub use infra::error::{SmimeError, SmimeResult};
pub use pipelines::inspect::{InspectReport, InspectWorkflow};
pub use services::{Banner, BannerSeverity, SignatureCoordinator, SignatureVerifier};
