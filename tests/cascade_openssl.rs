//! Verification cascade against real OpenSSL-produced S/MIME messages.

mod common;

use common::{CountingVerifier, CONTENT};
use smime_verify::{
    EmlMessage, MessageId, OpenSslCertificateParser, OpenSslPkcs7Verifier, PartId,
    SignatureVerdict, SignatureVerifier, TrustMode, Validity,
};

fn verify(
    raw: Vec<u8>,
    container: &str,
    primitive: OpenSslPkcs7Verifier,
) -> (SignatureVerdict, Vec<TrustMode>) {
    let message = EmlMessage::parse(MessageId::new("42"), raw).expect("message should parse");
    let mut verifier =
        SignatureVerifier::new(CountingVerifier::new(primitive), OpenSslCertificateParser);
    let verdict = verifier.verify(&message, message.id(), &PartId::from(container));
    (verdict, verifier.primitive().calls.clone())
}

#[test]
fn trusted_signer_is_valid_on_first_stage() {
    let alice = common::alice();
    let primitive = OpenSslPkcs7Verifier::with_anchors([alice.cert.clone()]).unwrap();

    let (verdict, calls) = verify(common::signed_message(&alice, CONTENT), "0", primitive);

    assert_eq!(verdict.validity(), Validity::Valid);
    assert_eq!(verdict.container_id().as_str(), "0");
    assert_eq!(verdict.signer_name(), Some("Alice"));
    assert_eq!(verdict.signer_emails(), ["alice@example.com".to_string()]);
    assert_eq!(verdict.issuer_org(), Some("ExampleCA"));
    assert!(verdict.diagnostics().is_empty());
    assert_eq!(calls, vec![TrustMode::Chain]);
}

#[test]
fn untrusted_signer_is_unverified_on_second_stage() {
    let alice = common::alice();
    let primitive = OpenSslPkcs7Verifier::with_anchors(Vec::new()).unwrap();

    let (verdict, calls) = verify(common::signed_message(&alice, CONTENT), "0", primitive);

    assert_eq!(verdict.validity(), Validity::Unverified);
    assert_eq!(verdict.signer_name(), Some("Alice"));
    assert_eq!(calls, vec![TrustMode::Chain, TrustMode::NoChain]);
}

#[test]
fn tampered_content_is_invalid() {
    let alice = common::alice();
    let primitive = OpenSslPkcs7Verifier::with_anchors([alice.cert.clone()]).unwrap();

    let signed = common::signed_message(&alice, CONTENT);
    let text = String::from_utf8(signed).unwrap();
    assert!(text.contains("see you tomorrow"));
    let tampered = text.replace("see you tomorrow", "see you at noon").into_bytes();

    let (verdict, calls) = verify(tampered, "0", primitive);

    assert_eq!(verdict.validity(), Validity::Invalid);
    assert!(verdict.signer().is_none());
    assert!(!verdict.diagnostics().is_empty());
    assert_eq!(calls.len(), 2);
}

#[test]
fn nested_container_verifies_from_reconstructed_entity() {
    let alice = common::alice();
    let primitive = OpenSslPkcs7Verifier::with_anchors([alice.cert.clone()]).unwrap();

    let (verdict, calls) = verify(common::nested_message(&alice, CONTENT), "1", primitive);

    assert_eq!(verdict.validity(), Validity::Valid);
    assert_eq!(verdict.container_id().as_str(), "1");
    assert_eq!(verdict.signer_name(), Some("Alice"));
    assert_eq!(
        calls,
        vec![TrustMode::Chain, TrustMode::NoChain, TrustMode::Chain]
    );
}

#[test]
fn nested_container_without_anchor_is_unverified() {
    let alice = common::alice();
    let primitive = OpenSslPkcs7Verifier::with_anchors(Vec::new()).unwrap();

    let (verdict, calls) = verify(common::nested_message(&alice, CONTENT), "1", primitive);

    assert_eq!(verdict.validity(), Validity::Unverified);
    assert_eq!(calls.len(), 4);
}

#[test]
fn subject_alternative_name_emails_are_reported() {
    let bob = common::signer(
        "Bob",
        "bob@example.com",
        "Example Corp",
        &["bob@example.org", "b.builder@example.org"],
    );
    let primitive = OpenSslPkcs7Verifier::with_anchors([bob.cert.clone()]).unwrap();

    let (verdict, _) = verify(common::signed_message(&bob, CONTENT), "0", primitive);

    assert_eq!(verdict.validity(), Validity::Valid);
    assert_eq!(
        verdict.signer_emails(),
        [
            "bob@example.org".to_string(),
            "b.builder@example.org".to_string()
        ]
    );
    assert_eq!(verdict.issuer_org(), Some("Example Corp"));
}

#[test]
fn unparseable_signature_exhausts_cascade() {
    let primitive = OpenSslPkcs7Verifier::with_anchors(Vec::new()).unwrap();

    let (verdict, calls) = verify(common::garbage_signature_message(), "0", primitive);

    assert_eq!(verdict.validity(), Validity::Error);
    assert_eq!(calls.len(), 4);
    assert!(!verdict.diagnostics().is_empty());
    assert!(verdict.diagnostics().len() <= 4);
    assert!(verdict
        .diagnostics()
        .iter()
        .all(|d| d.stage.starts_with("verify")));
}
