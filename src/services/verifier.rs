//! Four-stage detached signature verification cascade.
//!
//! A full-message fetch can differ byte-for-byte from what was originally
//! signed (line-ending normalization, re-wrapping, the container being nested
//! inside another multipart). The cascade therefore tries the stored message
//! first and then the container's verbatim bytes, each with and without
//! certificate-chain validation:
//!
//! | stage   | buffer         | trust   | success      | explicit failure |
//! |---------|----------------|---------|--------------|------------------|
//! | verify1 | full message   | chain   | `Valid`      | next stage       |
//! | verify2 | full message   | none    | `Unverified` | `Invalid`        |
//! | verify3 | reconstructed  | chain   | `Valid`      | next stage       |
//! | verify4 | reconstructed  | none    | `Unverified` | `Invalid`        |
//!
//! An indeterminate result always moves on; running out of stages yields
//! `Error`. Certificate extraction failures count as indeterminate.

use crate::adapters::backend::{
    CertificateParser, MailStore, Pkcs7Verifier, TrustMode, VerifyOutcome,
};
use crate::domain::{MessageId, PartId, SignatureVerdict, SignerIdentity, Validity};
use crate::services::cert_info::CertificateInfoExtractor;
use crate::services::diagnostics::Diagnostics;
use std::ops::ControlFlow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BufferSource {
    FullMessage,
    Reconstructed,
}

#[derive(Debug, Clone, Copy)]
struct Stage {
    label: &'static str,
    source: BufferSource,
    trust: TrustMode,
}

const CASCADE: [Stage; 4] = [
    Stage {
        label: "verify1",
        source: BufferSource::FullMessage,
        trust: TrustMode::Chain,
    },
    Stage {
        label: "verify2",
        source: BufferSource::FullMessage,
        trust: TrustMode::NoChain,
    },
    Stage {
        label: "verify3",
        source: BufferSource::Reconstructed,
        trust: TrustMode::Chain,
    },
    Stage {
        label: "verify4",
        source: BufferSource::Reconstructed,
        trust: TrustMode::NoChain,
    },
];

enum Terminal {
    Verified(Validity, SignerIdentity),
    Invalid,
}

/// Lazily fetched stage inputs. Dropped when `verify` returns.
struct StageBuffers<'a, S: ?Sized> {
    store: &'a S,
    message: &'a MessageId,
    container: &'a PartId,
    full: Option<Result<Vec<u8>, String>>,
    reconstructed: Option<Result<Vec<u8>, String>>,
}

impl<'a, S: MailStore + ?Sized> StageBuffers<'a, S> {
    fn new(store: &'a S, message: &'a MessageId, container: &'a PartId) -> Self {
        Self {
            store,
            message,
            container,
            full: None,
            reconstructed: None,
        }
    }

    fn get(&mut self, source: BufferSource) -> Result<&[u8], &str> {
        let (store, message, container) = (self.store, self.message, self.container);
        let slot = match source {
            BufferSource::FullMessage => &mut self.full,
            BufferSource::Reconstructed => &mut self.reconstructed,
        };
        let loaded = slot.get_or_insert_with(|| match source {
            BufferSource::FullMessage => store
                .fetch_raw_message(message)
                .map_err(|e| format!("Failed to fetch message {message}: {e}")),
            BufferSource::Reconstructed => store
                .fetch_verbatim_part(message, container)
                .map(|part| part.reconstruct())
                .map_err(|e| format!("Failed to fetch part {container} of {message}: {e}")),
        });
        loaded.as_deref().map_err(String::as_str)
    }
}

/// Runs the verification cascade for one signed container.
pub struct SignatureVerifier<V, P> {
    primitive: V,
    extractor: CertificateInfoExtractor<P>,
}

impl<V: Pkcs7Verifier, P: CertificateParser> SignatureVerifier<V, P> {
    #[must_use]
    pub fn new(primitive: V, parser: P) -> Self {
        Self {
            primitive,
            extractor: CertificateInfoExtractor::new(parser),
        }
    }

    /// Access the underlying primitive.
    #[must_use]
    pub fn primitive(&self) -> &V {
        &self.primitive
    }

    /// Verify the signed container `container` of `message`.
    ///
    /// Never fails; the worst outcome is an `Error` verdict carrying the
    /// diagnostics of every stage.
    pub fn verify<S: MailStore + ?Sized>(
        &mut self,
        store: &S,
        message: &MessageId,
        container: &PartId,
    ) -> SignatureVerdict {
        log::info!("Verifying signed part {container} of message {message}");

        let mut buffers = StageBuffers::new(store, message, container);
        let mut diagnostics = Diagnostics::new();

        let flow = CASCADE.iter().try_fold((), |(), stage| {
            match self.run_stage(stage, &mut buffers, &mut diagnostics) {
                Some(terminal) => ControlFlow::Break(terminal),
                None => ControlFlow::Continue(()),
            }
        });

        let verdict = match flow {
            ControlFlow::Break(Terminal::Verified(validity, identity)) => {
                if !diagnostics.is_empty() {
                    log::debug!(
                        "Discarding {} diagnostics from earlier stages",
                        diagnostics.len()
                    );
                }
                SignatureVerdict::verified(container.clone(), validity, identity)
            }
            ControlFlow::Break(Terminal::Invalid) => {
                SignatureVerdict::invalid(container.clone(), diagnostics.into_vec())
            }
            ControlFlow::Continue(()) => {
                SignatureVerdict::error(container.clone(), diagnostics.into_vec())
            }
        };

        match verdict.validity() {
            Validity::Valid | Validity::Unverified => log::info!(
                "Signature on part {container} is {} ({})",
                verdict.validity(),
                verdict.signer_emails().join(", ")
            ),
            Validity::Invalid | Validity::Error => log::warn!(
                "Signature on part {container} is {} ({} diagnostics)",
                verdict.validity(),
                verdict.diagnostics().len()
            ),
        }

        verdict
    }

    fn run_stage<S: MailStore + ?Sized>(
        &mut self,
        stage: &Stage,
        buffers: &mut StageBuffers<'_, S>,
        diagnostics: &mut Diagnostics,
    ) -> Option<Terminal> {
        log::debug!(
            "Stage {}: {:?} with {:?}",
            stage.label,
            stage.source,
            stage.trust
        );

        let outcome = match buffers.get(stage.source) {
            Ok(buffer) => self.primitive.verify(buffer, stage.trust),
            Err(e) => {
                diagnostics.record(stage.label, Some(e.to_string()));
                return None;
            }
        };
        diagnostics.record(stage.label, self.primitive.drain_diagnostics());

        match outcome {
            VerifyOutcome::Success(certificate) => match self.extractor.extract(&certificate) {
                Ok(identity) => {
                    let validity = match stage.trust {
                        TrustMode::Chain => Validity::Valid,
                        TrustMode::NoChain => Validity::Unverified,
                    };
                    Some(Terminal::Verified(validity, identity))
                }
                Err(e) => {
                    diagnostics.record(stage.label, Some(e.to_string()));
                    None
                }
            },
            VerifyOutcome::ExplicitFailure if stage.trust == TrustMode::NoChain => {
                Some(Terminal::Invalid)
            }
            VerifyOutcome::ExplicitFailure | VerifyOutcome::Indeterminate => None,
        }
    }
}
