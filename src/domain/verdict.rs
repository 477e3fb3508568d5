//! Verification verdict domain types.
//!
//! A [`SignatureVerdict`] records the outcome of verifying one
//! `multipart/signed` container. Identity claims only exist on successful
//! verdicts; the constructors are the only way to build one, so a failure
//! verdict can never carry signer fields.

use crate::domain::part::PartId;
use serde::Serialize;
use std::fmt;

/// Outcome class of a signature verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    /// Signature matches and the certificate chains to a trusted root.
    Valid,
    /// Signature matches but the certificate could not be chain-validated.
    Unverified,
    /// Signature does not match the signed content.
    Invalid,
    /// The signature could not be processed at all.
    Error,
}

impl Validity {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Validity::Valid => "valid",
            Validity::Unverified => "unverified",
            Validity::Invalid => "invalid",
            Validity::Error => "error",
        }
    }

    /// Whether the verdict carries a signer identity.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Validity::Valid | Validity::Unverified)
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display identity of a signer, taken from its certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignerIdentity {
    #[serde(rename = "signer_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Never empty.
    #[serde(rename = "signer_emails")]
    pub emails: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_org: Option<String>,
}

/// Raw diagnostic text collected from one cascade stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageDiagnostic {
    pub stage: &'static str,
    pub message: String,
}

/// Outcome of verifying one signed container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureVerdict {
    container_id: PartId,
    validity: Validity,
    #[serde(flatten)]
    signer: Option<SignerIdentity>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<StageDiagnostic>,
}

impl SignatureVerdict {
    /// Successful verification. `validity` must be `Valid` or `Unverified`.
    #[must_use]
    pub fn verified(container_id: PartId, validity: Validity, signer: SignerIdentity) -> Self {
        debug_assert!(validity.is_success());
        debug_assert!(!signer.emails.is_empty());
        Self {
            container_id,
            validity,
            signer: Some(signer),
            diagnostics: Vec::new(),
        }
    }

    /// The signature explicitly failed to match its content.
    #[must_use]
    pub fn invalid(container_id: PartId, diagnostics: Vec<StageDiagnostic>) -> Self {
        Self {
            container_id,
            validity: Validity::Invalid,
            signer: None,
            diagnostics,
        }
    }

    /// No stage could process the signature.
    #[must_use]
    pub fn error(container_id: PartId, diagnostics: Vec<StageDiagnostic>) -> Self {
        Self {
            container_id,
            validity: Validity::Error,
            signer: None,
            diagnostics,
        }
    }

    #[must_use]
    pub fn container_id(&self) -> &PartId {
        &self.container_id
    }

    #[must_use]
    pub fn validity(&self) -> Validity {
        self.validity
    }

    #[must_use]
    pub fn signer(&self) -> Option<&SignerIdentity> {
        self.signer.as_ref()
    }

    #[must_use]
    pub fn signer_name(&self) -> Option<&str> {
        self.signer.as_ref().and_then(|s| s.name.as_deref())
    }

    #[must_use]
    pub fn signer_emails(&self) -> &[String] {
        self.signer.as_ref().map_or(&[], |s| s.emails.as_slice())
    }

    #[must_use]
    pub fn issuer_org(&self) -> Option<&str> {
        self.signer.as_ref().and_then(|s| s.issuer_org.as_deref())
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[StageDiagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> SignerIdentity {
        SignerIdentity {
            name: Some("Alice".to_string()),
            emails: vec!["alice@example.com".to_string()],
            issuer_org: Some("ExampleCA".to_string()),
        }
    }

    #[test]
    fn serialized_verdict_flattens_identity_and_omits_empty_diagnostics() {
        let verdict = SignatureVerdict::verified(PartId::from("1"), Validity::Valid, alice());
        let json = serde_json::to_value(&verdict).unwrap();

        assert_eq!(json["container_id"], "1");
        assert_eq!(json["validity"], "valid");
        assert_eq!(json["signer_name"], "Alice");
        assert_eq!(json["signer_emails"][0], "alice@example.com");
        assert_eq!(json["issuer_org"], "ExampleCA");
        assert!(json.get("diagnostics").is_none());
    }

    #[test]
    fn failure_verdict_has_no_identity() {
        let verdict = SignatureVerdict::error(
            PartId::root(),
            vec![StageDiagnostic {
                stage: "verify1",
                message: "bad asn1".to_string(),
            }],
        );
        assert!(verdict.signer().is_none());
        assert!(verdict.signer_emails().is_empty());

        let json = serde_json::to_value(&verdict).unwrap();
        assert!(json.get("signer_emails").is_none());
        assert_eq!(json["diagnostics"][0]["stage"], "verify1");
    }
}
