//! Verdict banner formatting.

use crate::domain::{SignatureVerdict, Validity};
use crate::infra::config::{BannerTexts, ISSUER_PLACEHOLDER, SENDER_PLACEHOLDER};
use serde::Serialize;

/// Element id shared by every verdict banner.
pub const BANNER_ELEMENT_ID: &str = "smime-message";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerSeverity {
    Notice,
    Warning,
    Error,
}

impl BannerSeverity {
    #[must_use]
    pub fn for_validity(validity: Validity) -> Self {
        match validity {
            Validity::Valid => BannerSeverity::Notice,
            Validity::Unverified => BannerSeverity::Warning,
            Validity::Invalid | Validity::Error => BannerSeverity::Error,
        }
    }

    #[must_use]
    pub fn css_class(&self) -> &'static str {
        match self {
            BannerSeverity::Notice => "smime-notice",
            BannerSeverity::Warning => "smime-warning",
            BannerSeverity::Error => "smime-error",
        }
    }
}

/// A rendered verdict annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub severity: BannerSeverity,
    /// Plain message text.
    pub text: String,
    /// Escaped markup ready to prefix the part body.
    pub html: String,
}

/// Formats verdicts using localized texts.
#[derive(Debug, Clone, Default)]
pub struct BannerFormatter {
    texts: BannerTexts,
}

impl BannerFormatter {
    #[must_use]
    pub fn new(texts: BannerTexts) -> Self {
        Self { texts }
    }

    #[must_use]
    pub fn format(&self, verdict: &SignatureVerdict) -> Banner {
        let severity = BannerSeverity::for_validity(verdict.validity());

        let text = match (verdict.validity(), verdict.signer()) {
            (Validity::Valid, Some(_)) => self.with_identity(&self.texts.valid, verdict),
            (Validity::Unverified, Some(_)) => self.with_identity(&self.texts.unverified, verdict),
            _ => self.texts.invalid.clone(),
        };

        let html = format!(
            "<div id=\"{BANNER_ELEMENT_ID}\" class=\"{}\">{}</div>",
            severity.css_class(),
            html_escape::encode_text(&text)
        );

        Banner {
            severity,
            text,
            html,
        }
    }

    /// `Name <a@x>` or, with several addresses, `Name <a@x>, <b@x>`.
    #[must_use]
    pub fn sender(&self, verdict: &SignatureVerdict) -> String {
        let addresses = verdict
            .signer_emails()
            .iter()
            .map(|e| format!("<{e}>"))
            .collect::<Vec<_>>()
            .join(&self.texts.email_separator);
        match verdict.signer_name() {
            Some(name) => format!("{name} {addresses}"),
            None => addresses,
        }
    }

    fn with_identity(&self, template: &str, verdict: &SignatureVerdict) -> String {
        let sender = self.sender(verdict);
        let issuer = verdict
            .issuer_org()
            .unwrap_or(self.texts.unknown_issuer.as_str());
        interpolate(
            template,
            &[(SENDER_PLACEHOLDER, &sender), (ISSUER_PLACEHOLDER, issuer)],
        )
    }
}

/// Single-pass placeholder substitution; substituted values are never rescanned.
fn interpolate(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let next = vars
            .iter()
            .filter_map(|(key, value)| rest.find(key).map(|pos| (pos, *key, *value)))
            .min_by_key(|(pos, _, _)| *pos);
        match next {
            Some((pos, key, value)) => {
                out.push_str(&rest[..pos]);
                out.push_str(value);
                rest = &rest[pos + key.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}
