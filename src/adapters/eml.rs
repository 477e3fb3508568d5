//! RFC 822 message adapter backed by `mailparse`.
//!
//! Parses one raw message into a [`PartTree`] and serves it as a
//! [`MailStore`]: the raw message is returned byte-for-byte and every part's
//! verbatim bytes are kept exactly as they appear in the source.

use crate::adapters::backend::{MailStore, VerbatimPart};
use crate::domain::{MessageId, PartId, PartIndex, PartTree};
use crate::infra::error::{SmimeError, SmimeResult};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A parsed message held in memory.
pub struct EmlMessage {
    id: MessageId,
    raw: Vec<u8>,
    tree: PartTree,
    parts: HashMap<PartId, Vec<u8>>,
}

impl EmlMessage {
    /// Parse `raw` as message `id`.
    pub fn parse(id: MessageId, raw: Vec<u8>) -> SmimeResult<Self> {
        let (tree, parts) = {
            let mail = mailparse::parse_mail(&raw)?;
            let mut tree = PartTree::new(&mail.ctype.mimetype);
            let mut parts = HashMap::new();

            let mut stack: Vec<(&mailparse::ParsedMail<'_>, PartIndex)> =
                vec![(&mail, tree.root())];
            while let Some((node, index)) = stack.pop() {
                parts.insert(tree.part(index).id.clone(), node.raw_bytes.to_vec());
                for sub in &node.subparts {
                    let child = tree.add_child(index, &sub.ctype.mimetype);
                    stack.push((sub, child));
                }
            }
            (tree, parts)
        };

        log::debug!("Parsed message {id} into {} parts", tree.len());
        Ok(Self {
            id,
            raw,
            tree,
            parts,
        })
    }

    /// Read and parse a message file; its file name becomes the message id.
    pub fn open<P: AsRef<Path>>(path: P) -> SmimeResult<Self> {
        let path = path.as_ref();
        let raw = fs::read(path).map_err(|e| {
            SmimeError::IoError(format!("Failed to read message {}: {e}", path.display()))
        })?;
        let id = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self::parse(MessageId::new(id), raw)
    }

    #[must_use]
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    #[must_use]
    pub fn tree(&self) -> &PartTree {
        &self.tree
    }

    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn check_id(&self, message: &MessageId) -> SmimeResult<()> {
        if message == &self.id {
            Ok(())
        } else {
            Err(SmimeError::StoreError(format!("Unknown message: {message}")))
        }
    }
}

impl MailStore for EmlMessage {
    fn fetch_raw_message(&self, message: &MessageId) -> SmimeResult<Vec<u8>> {
        self.check_id(message)?;
        Ok(self.raw.clone())
    }

    fn fetch_verbatim_part(&self, message: &MessageId, part: &PartId) -> SmimeResult<VerbatimPart> {
        self.check_id(message)?;
        let bytes = self
            .parts
            .get(part)
            .ok_or_else(|| SmimeError::UnknownPart(part.to_string()))?;
        Ok(split_part(bytes))
    }
}

/// Split verbatim part bytes at the blank line ending the header block.
/// The header half keeps the last header's line break.
#[must_use]
pub fn split_part(bytes: &[u8]) -> VerbatimPart {
    if let Some(body) = bytes.strip_prefix(b"\r\n") {
        return VerbatimPart {
            headers: Vec::new(),
            body: body.to_vec(),
        };
    }
    if let Some(body) = bytes.strip_prefix(b"\n") {
        return VerbatimPart {
            headers: Vec::new(),
            body: body.to_vec(),
        };
    }

    let crlf = find(bytes, b"\r\n\r\n").map(|i| (i + 2, i + 4));
    let lf = find(bytes, b"\n\n").map(|i| (i + 1, i + 2));
    let split = match (crlf, lf) {
        (Some(c), Some(l)) => Some(if c.0 <= l.0 { c } else { l }),
        (c, l) => c.or(l),
    };

    match split {
        Some((header_end, body_start)) => VerbatimPart {
            headers: bytes[..header_end].to_vec(),
            body: bytes[body_start..].to_vec(),
        },
        None => VerbatimPart {
            headers: bytes.to_vec(),
            body: Vec::new(),
        },
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
