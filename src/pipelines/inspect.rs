//! `InspectWorkflow`: verify and annotate one message end to end.
//!
//! Steps:
//! 1. Structure pass: report every part to a fresh `SignatureCoordinator`
//!    (verifies each signed container and indexes its payload)
//! 2. Render pass: ask the coordinator for a banner for each displayed
//!    (leaf) part in document order

use crate::adapters::{EmlMessage, OpenSslCertificateParser, OpenSslPkcs7Verifier, Pkcs7Verifier};
use crate::domain::{PartId, SignatureVerdict};
use crate::infra::config::VerifierConfiguration;
use crate::services::{Banner, BannerFormatter, SignatureCoordinator, SignatureVerifier};
use crate::SmimeResult;
use serde::Serialize;

/// Annotation of one displayed part.
#[derive(Debug, Clone, Serialize)]
pub struct PartAnnotation {
    pub part_id: PartId,
    pub media_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Banner>,
}

/// Outcome of inspecting one message.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub message_id: String,
    /// One verdict per supported signed container, in document order.
    pub verdicts: Vec<SignatureVerdict>,
    pub parts: Vec<PartAnnotation>,
}

impl InspectReport {
    /// Banners in render order.
    pub fn banners(&self) -> impl Iterator<Item = &Banner> {
        self.parts.iter().filter_map(|p| p.banner.as_ref())
    }
}

/// Orchestrates the structure and render passes for one message.
pub struct InspectWorkflow {
    config: VerifierConfiguration,
}

impl Default for InspectWorkflow {
    fn default() -> Self {
        Self::new(VerifierConfiguration::default())
    }
}

impl InspectWorkflow {
    #[must_use]
    pub fn new(config: VerifierConfiguration) -> Self {
        Self { config }
    }

    /// Inspect `message` using the configured trust anchors.
    pub fn run(&self, message: &EmlMessage) -> SmimeResult<InspectReport> {
        let primitive = OpenSslPkcs7Verifier::from_config(&self.config.trust)?;
        Ok(self.run_with(message, primitive))
    }

    /// Inspect `message` with an explicit PKCS#7 primitive.
    pub fn run_with<V: Pkcs7Verifier>(&self, message: &EmlMessage, primitive: V) -> InspectReport {
        let tree = message.tree();
        let mut coordinator = SignatureCoordinator::new(
            message,
            message.id().clone(),
            SignatureVerifier::new(primitive, OpenSslCertificateParser),
            BannerFormatter::new(self.config.banner.clone()),
        );

        let order = tree.depth_first();

        let mut verdicts = Vec::new();
        for &index in &order {
            let part = tree.part(index);
            if coordinator.on_structure_seen(tree, index, &part.media_type) {
                if let Some(verdict) = coordinator.verdict(&part.id) {
                    verdicts.push(verdict.clone());
                }
            }
        }

        let parts = order
            .into_iter()
            .map(|index| tree.part(index))
            .filter(|part| part.is_leaf())
            .map(|part| PartAnnotation {
                part_id: part.id.clone(),
                media_type: part.media_type.clone(),
                banner: coordinator.on_render_part(&part.id),
            })
            .collect();

        log::info!(
            "Inspected message {}: {} signed containers",
            message.id(),
            verdicts.len()
        );

        InspectReport {
            message_id: message.id().to_string(),
            verdicts,
            parts,
        }
    }
}
