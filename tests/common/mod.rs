//! Shared fixtures: self-signed signer certificates and detached S/MIME
//! messages produced with OpenSSL.

#![allow(dead_code)]

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::stack::Stack;
use openssl::x509::extension::SubjectAlternativeName;
use openssl::x509::{X509Builder, X509NameBuilder, X509};
use smime_verify::{Pkcs7Verifier, TrustMode, VerifyOutcome};

pub const CONTENT: &[u8] =
    b"Content-Type: text/plain; charset=us-ascii\r\n\r\nHello Bob,\r\nsee you tomorrow.\r\n";

pub struct TestSigner {
    pub cert: X509,
    pub key: PKey<Private>,
}

/// Self-signed signer certificate.
pub fn signer(cn: &str, email: &str, org: &str, san_emails: &[&str]) -> TestSigner {
    let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", cn).unwrap();
    name.append_entry_by_text("O", org).unwrap();
    name.append_entry_by_text("emailAddress", email).unwrap();
    let name = name.build();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(1).unwrap())
        .unwrap();
    builder.set_pubkey(&key).unwrap();

    if !san_emails.is_empty() {
        let mut san = SubjectAlternativeName::new();
        for email in san_emails {
            san.email(email);
        }
        san.dns("mail.example.com");
        let extension = san.build(&builder.x509v3_context(None, None)).unwrap();
        builder.append_extension(extension).unwrap();
    }

    builder.sign(&key, MessageDigest::sha256()).unwrap();
    TestSigner {
        cert: builder.build(),
        key,
    }
}

pub fn alice() -> TestSigner {
    signer("Alice", "alice@example.com", "ExampleCA", &[])
}

/// Detached `multipart/signed` entity over `content`.
pub fn signed_entity(signer: &TestSigner, content: &[u8]) -> Vec<u8> {
    let certs = Stack::<X509>::new().unwrap();
    let flags = Pkcs7Flags::DETACHED;
    let pkcs7 = Pkcs7::sign(&signer.cert, &signer.key, &certs, content, flags).unwrap();
    pkcs7.to_smime(content, flags).unwrap()
}

/// Top-level signed message.
pub fn signed_message(signer: &TestSigner, content: &[u8]) -> Vec<u8> {
    let mut message = b"From: alice@example.com\r\nTo: bob@example.com\r\nSubject: signed\r\n".to_vec();
    message.extend_from_slice(&signed_entity(signer, content));
    message
}

/// Signed entity wrapped as the first part of a `multipart/mixed` message,
/// followed by a mailing-list footer.
pub fn nested_message(signer: &TestSigner, content: &[u8]) -> Vec<u8> {
    let mut message = b"From: list@example.com\r\n\
Subject: [list] signed\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"outer-boundary\"\r\n\
\r\n\
--outer-boundary\r\n"
        .to_vec();
    message.extend_from_slice(&signed_entity(signer, content));
    message.extend_from_slice(
        b"\r\n--outer-boundary\r\n\
Content-Type: text/plain\r\n\
\r\n\
List footer\r\n\
--outer-boundary--\r\n",
    );
    message
}

/// Message whose signature part is not a PKCS#7 structure.
pub fn garbage_signature_message() -> Vec<u8> {
    b"From: mallory@example.com\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/signed; protocol=\"application/pkcs7-signature\"; micalg=sha-256; boundary=\"sig\"\r\n\
\r\n\
--sig\r\n\
Content-Type: text/plain\r\n\
\r\n\
Trust me.\r\n\
--sig\r\n\
Content-Type: application/pkcs7-signature; name=smime.p7s\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
bm90IGEgc2lnbmF0dXJl\r\n\
--sig--\r\n"
        .to_vec()
}

pub fn unsigned_message() -> Vec<u8> {
    b"From: bob@example.com\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/alternative; boundary=\"alt\"\r\n\
\r\n\
--alt\r\n\
Content-Type: text/plain\r\n\
\r\n\
plain\r\n\
--alt\r\n\
Content-Type: text/html\r\n\
\r\n\
<p>html</p>\r\n\
--alt--\r\n"
        .to_vec()
}

pub fn pgp_signed_message() -> Vec<u8> {
    b"From: carol@example.com\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/signed; protocol=\"application/pgp-signature\"; micalg=pgp-sha256; boundary=\"pgp\"\r\n\
\r\n\
--pgp\r\n\
Content-Type: text/plain\r\n\
\r\n\
hi\r\n\
--pgp\r\n\
Content-Type: application/pgp-signature\r\n\
\r\n\
-----BEGIN PGP SIGNATURE-----\r\n\
-----END PGP SIGNATURE-----\r\n\
--pgp--\r\n"
        .to_vec()
}

/// Records the trust mode of every call before delegating.
pub struct CountingVerifier<V> {
    pub inner: V,
    pub calls: Vec<TrustMode>,
}

impl<V> CountingVerifier<V> {
    pub fn new(inner: V) -> Self {
        Self {
            inner,
            calls: Vec::new(),
        }
    }
}

impl<V: Pkcs7Verifier> Pkcs7Verifier for CountingVerifier<V> {
    fn verify(&mut self, buffer: &[u8], trust: TrustMode) -> VerifyOutcome {
        self.calls.push(trust);
        self.inner.verify(buffer, trust)
    }

    fn drain_diagnostics(&mut self) -> Option<String> {
        self.inner.drain_diagnostics()
    }
}
