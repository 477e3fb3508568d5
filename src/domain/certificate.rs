use std::fmt;

/// Signer certificate as written out by the PKCS#7 primitive (DER or PEM).
#[derive(Clone)]
pub struct SignerCertificate {
    bytes: Box<[u8]>,
}

impl SignerCertificate {
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into_boxed_slice(),
        }
    }
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SignerCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignerCertificate(len={})", self.bytes.len())
    }
}

/// Distinguished-name attributes in certificate order, keyed by short name
/// (`CN`, `O`, `emailAddress`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameAttributes(Vec<(String, String)>);

impl NameAttributes {
    #[must_use]
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self(entries)
    }

    /// First value of attribute `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The certificate fields identity extraction needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCertificate {
    pub subject: NameAttributes,
    pub issuer: NameAttributes,
    /// Subject Alternative Name extension in `type:value, type:value` form.
    pub subject_alt_name: Option<String>,
}
