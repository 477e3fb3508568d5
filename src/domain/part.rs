//! Message-structure domain types.
//!
//! The structure collaborator owns the part tree as a flat arena; the core
//! borrows it and only ever records identifier facts about its parts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one message as known to the mail store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Section path of a part within one message (`0` for the root, `1.2` for
/// the second child of the first child of the root).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(String);

impl PartId {
    pub const ROOT: &'static str = "0";

    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    /// Id of the `position`-th (zero based) child of this part.
    #[must_use]
    pub fn child(&self, position: usize) -> Self {
        if self.0 == Self::ROOT {
            Self((position + 1).to_string())
        } else {
            Self(format!("{}.{}", self.0, position + 1))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Index of a part inside its [`PartTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartIndex(usize);

/// One node of the MIME tree.
#[derive(Debug, Clone)]
pub struct MimePart {
    pub id: PartId,
    /// Lowercased `type/subtype` without parameters.
    pub media_type: String,
    pub children: Vec<PartIndex>,
}

impl MimePart {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena of message parts, root at index 0.
#[derive(Debug, Clone, Default)]
pub struct PartTree {
    parts: Vec<MimePart>,
}

impl PartTree {
    /// Create a tree holding only a root part.
    #[must_use]
    pub fn new(root_media_type: &str) -> Self {
        Self {
            parts: vec![MimePart {
                id: PartId::root(),
                media_type: normalize_media_type(root_media_type),
                children: Vec::new(),
            }],
        }
    }

    #[must_use]
    pub fn root(&self) -> PartIndex {
        PartIndex(0)
    }

    /// Append a child under `parent`; its id derives from the parent's id and
    /// its position among the parent's children.
    pub fn add_child(&mut self, parent: PartIndex, media_type: &str) -> PartIndex {
        let position = self.parts[parent.0].children.len();
        let id = self.parts[parent.0].id.child(position);
        let index = PartIndex(self.parts.len());
        self.parts.push(MimePart {
            id,
            media_type: normalize_media_type(media_type),
            children: Vec::new(),
        });
        self.parts[parent.0].children.push(index);
        index
    }

    #[must_use]
    pub fn part(&self, index: PartIndex) -> &MimePart {
        &self.parts[index.0]
    }

    /// Child of `parent` at `position`, if present.
    #[must_use]
    pub fn child(&self, parent: PartIndex, position: usize) -> Option<PartIndex> {
        self.parts[parent.0].children.get(position).copied()
    }

    #[must_use]
    pub fn find(&self, id: &PartId) -> Option<PartIndex> {
        self.parts.iter().position(|p| &p.id == id).map(PartIndex)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// All parts in depth-first pre-order.
    #[must_use]
    pub fn depth_first(&self) -> Vec<PartIndex> {
        let mut order = Vec::with_capacity(self.parts.len());
        if self.parts.is_empty() {
            return order;
        }
        let mut stack = vec![self.root()];
        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(self.parts[index.0].children.iter().rev().copied());
        }
        order
    }
}

/// Lowercase and strip parameters from a declared content type.
#[must_use]
pub fn normalize_media_type(declared: &str) -> String {
    declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
