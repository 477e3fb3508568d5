//! Request-scoped signature coordination.
//!
//! One [`SignatureCoordinator`] lives for exactly one message-render request.
//! The structure pass reports every part through
//! [`SignatureCoordinator::on_structure_seen`]; signed containers are verified
//! there and their payload subtree is indexed. The render pass then asks
//! [`SignatureCoordinator::on_render_part`] for each part and receives the
//! container's banner the first time any covered part is rendered.

use crate::adapters::backend::{CertificateParser, MailStore, Pkcs7Verifier};
use crate::domain::part::normalize_media_type;
use crate::domain::{MessageId, PartId, PartIndex, PartTree, SignatureVerdict};
use crate::services::banner::{Banner, BannerFormatter};
use crate::services::signed_parts::{SignedPartIndex, VerdictStore};
use crate::services::verifier::SignatureVerifier;

pub const SIGNED_MULTIPART: &str = "multipart/signed";
pub const PKCS7_SIGNATURE_TYPES: [&str; 2] = [
    "application/pkcs7-signature",
    "application/x-pkcs7-signature",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    StructureSeen,
    Verified,
    Rendered,
}

pub struct SignatureCoordinator<'a, S: ?Sized, V, P> {
    store: &'a S,
    message: MessageId,
    verifier: SignatureVerifier<V, P>,
    formatter: BannerFormatter,
    verdicts: VerdictStore,
    index: SignedPartIndex,
    state: CoordinatorState,
}

impl<'a, S, V, P> SignatureCoordinator<'a, S, V, P>
where
    S: MailStore + ?Sized,
    V: Pkcs7Verifier,
    P: CertificateParser,
{
    #[must_use]
    pub fn new(
        store: &'a S,
        message: MessageId,
        verifier: SignatureVerifier<V, P>,
        formatter: BannerFormatter,
    ) -> Self {
        Self {
            store,
            message,
            verifier,
            formatter,
            verdicts: VerdictStore::new(),
            index: SignedPartIndex::new(),
            state: CoordinatorState::Idle,
        }
    }

    /// Handle one part discovered during structure inspection.
    ///
    /// Only `multipart/signed` containers whose second child is a PKCS#7
    /// signature are acted on; anything else is silently ignored. Returns
    /// whether a verdict was created.
    pub fn on_structure_seen(
        &mut self,
        tree: &PartTree,
        part: PartIndex,
        declared_media_type: &str,
    ) -> bool {
        if self.state == CoordinatorState::Idle {
            self.state = CoordinatorState::StructureSeen;
        }

        if normalize_media_type(declared_media_type) != SIGNED_MULTIPART {
            return false;
        }

        let container = tree.part(part);
        let Some(signature) = tree.child(part, 1) else {
            log::debug!("Signed part {} has no signature child", container.id);
            return false;
        };
        let signature_type = &tree.part(signature).media_type;
        if !PKCS7_SIGNATURE_TYPES.contains(&signature_type.as_str()) {
            log::debug!(
                "Signed part {} uses unsupported signature type {signature_type}",
                container.id
            );
            return false;
        }
        let Some(payload) = tree.child(part, 0) else {
            return false;
        };

        let verdict = self
            .verifier
            .verify(self.store, &self.message, &container.id);
        self.verdicts.insert(verdict);
        self.index.build(tree, payload, &container.id);
        self.state = CoordinatorState::Verified;
        true
    }

    /// Banner for `part`, if it is covered by a verdict not yet displayed.
    pub fn on_render_part(&mut self, part: &PartId) -> Option<Banner> {
        let verdict = self.index.lookup_and_consume(part, &mut self.verdicts)?;
        self.state = CoordinatorState::Rendered;
        Some(self.formatter.format(&verdict))
    }

    /// Verdict for `container`, if created and not yet consumed.
    #[must_use]
    pub fn verdict(&self, container: &PartId) -> Option<&SignatureVerdict> {
        self.verdicts.get(container)
    }

    /// Number of verdicts created but not yet rendered.
    #[must_use]
    pub fn pending_verdicts(&self) -> usize {
        self.verdicts.len()
    }

    #[must_use]
    pub fn index(&self) -> &SignedPartIndex {
        &self.index
    }

    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    #[must_use]
    pub fn message(&self) -> &MessageId {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::backend::VerifyOutcome;
    use crate::domain::Validity;
    use crate::services::banner::BannerSeverity;
    use crate::services::verifier::test_support::{alice, ScriptedPrimitive, StubParser, StubStore};

    fn coordinator<'a>(
        store: &'a StubStore,
        script: Vec<(VerifyOutcome, Option<&'static str>)>,
    ) -> SignatureCoordinator<'a, StubStore, ScriptedPrimitive, StubParser> {
        SignatureCoordinator::new(
            store,
            MessageId::new("7"),
            SignatureVerifier::new(ScriptedPrimitive::new(script), StubParser),
            BannerFormatter::default(),
        )
    }

    fn inspect_all<S, V, P>(c: &mut SignatureCoordinator<'_, S, V, P>, tree: &PartTree)
    where
        S: MailStore + ?Sized,
        V: Pkcs7Verifier,
        P: CertificateParser,
    {
        for index in tree.depth_first() {
            let media_type = tree.part(index).media_type.clone();
            c.on_structure_seen(tree, index, &media_type);
        }
    }

    /// multipart/mixed
    ///   1 multipart/signed
    ///     1.1 multipart/alternative
    ///       1.1.1 text/plain
    ///       1.1.2 text/html
    ///     1.2 <signature_type>
    ///   2 text/plain (unsigned footer)
    fn nested_tree(signature_type: &str) -> PartTree {
        let mut tree = PartTree::new("multipart/mixed");
        let signed = tree.add_child(tree.root(), "multipart/signed");
        let alternative = tree.add_child(signed, "multipart/alternative");
        tree.add_child(alternative, "text/plain");
        tree.add_child(alternative, "text/html");
        tree.add_child(signed, signature_type);
        tree.add_child(tree.root(), "text/plain");
        tree
    }

    #[test]
    fn unsigned_message_creates_no_verdict() {
        let store = StubStore::new();
        let mut c = coordinator(&store, vec![(alice(), None)]);
        let mut tree = PartTree::new("multipart/alternative");
        tree.add_child(tree.root(), "text/plain");
        tree.add_child(tree.root(), "text/html");

        inspect_all(&mut c, &tree);

        assert_eq!(c.state(), CoordinatorState::StructureSeen);
        assert_eq!(c.pending_verdicts(), 0);
        assert!(c.verifier.primitive().calls.is_empty());
        for index in tree.depth_first() {
            assert!(c.on_render_part(&tree.part(index).id).is_none());
        }
    }

    #[test]
    fn non_pkcs7_signature_is_ignored() {
        let store = StubStore::new();
        let mut c = coordinator(&store, vec![(alice(), None)]);
        let tree = nested_tree("application/pgp-signature");

        inspect_all(&mut c, &tree);

        assert_eq!(c.pending_verdicts(), 0);
        assert!(c.index().is_empty());
        assert!(c.verifier.primitive().calls.is_empty());
    }

    #[test]
    fn signed_container_without_signature_child_is_ignored() {
        let store = StubStore::new();
        let mut c = coordinator(&store, vec![(alice(), None)]);
        let mut tree = PartTree::new("multipart/signed");
        tree.add_child(tree.root(), "text/plain");

        assert!(!c.on_structure_seen(&tree, tree.root(), "multipart/signed"));
        assert_eq!(c.pending_verdicts(), 0);
    }

    #[test]
    fn banner_is_rendered_once_per_container() {
        let store = StubStore::new();
        let mut c = coordinator(&store, vec![(alice(), None)]);
        let tree = nested_tree("application/x-pkcs7-signature");

        inspect_all(&mut c, &tree);
        assert_eq!(c.state(), CoordinatorState::Verified);
        assert_eq!(
            c.verdict(&PartId::from("1")).map(SignatureVerdict::validity),
            Some(Validity::Valid)
        );

        let banners: Vec<_> = ["1.1.1", "1.1.2", "1.1", "2"]
            .into_iter()
            .map(|id| c.on_render_part(&PartId::from(id)))
            .collect();

        assert_eq!(banners[0].as_ref().map(|b| b.severity), Some(BannerSeverity::Notice));
        assert!(banners[1..].iter().all(Option::is_none));
        assert_eq!(c.state(), CoordinatorState::Rendered);
        assert_eq!(c.pending_verdicts(), 0);
    }

    #[test]
    fn declared_type_parameters_and_case_are_ignored() {
        let store = StubStore::new();
        let mut c = coordinator(&store, vec![(alice(), None)]);
        let tree = nested_tree("application/pkcs7-signature");
        let signed = tree.child(tree.root(), 0).unwrap();

        assert!(c.on_structure_seen(
            &tree,
            signed,
            "Multipart/Signed; protocol=\"application/pkcs7-signature\"; micalg=sha-256"
        ));
        assert_eq!(c.index().len(), 3);
    }

    #[test]
    fn error_verdict_renders_error_banner() {
        let store = StubStore::new();
        let mut c = coordinator(&store, Vec::new());
        let tree = nested_tree("application/pkcs7-signature");

        inspect_all(&mut c, &tree);
        let banner = c.on_render_part(&PartId::from("1.1")).unwrap();
        assert_eq!(banner.severity, BannerSeverity::Error);
        assert!(!banner.text.contains("alice"));
    }
}
