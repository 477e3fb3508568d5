//! Association of message parts with the signature covering them.

use crate::domain::{PartId, PartIndex, PartTree, SignatureVerdict};
use std::collections::HashMap;

/// Verdicts of one render request, keyed by signed container id.
#[derive(Debug, Default)]
pub struct VerdictStore {
    verdicts: HashMap<PartId, SignatureVerdict>,
}

impl VerdictStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `verdict` under its container id, replacing any earlier one.
    pub fn insert(&mut self, verdict: SignatureVerdict) {
        self.verdicts
            .insert(verdict.container_id().clone(), verdict);
    }

    #[must_use]
    pub fn get(&self, container: &PartId) -> Option<&SignatureVerdict> {
        self.verdicts.get(container)
    }

    pub fn remove(&mut self, container: &PartId) -> Option<SignatureVerdict> {
        self.verdicts.remove(container)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}

/// Maps every part under a signed payload to its container id.
///
/// Entries live for the whole request; only the verdict they point at is
/// consumed, so a banner is shown at most once per container.
#[derive(Debug, Default)]
pub struct SignedPartIndex {
    containers: HashMap<PartId, PartId>,
}

impl SignedPartIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `payload` and all of its descendants to `container`.
    ///
    /// Walks the arena with an explicit stack so arbitrarily deep nesting
    /// cannot exhaust the call stack. Returns the number of parts mapped.
    pub fn build(&mut self, tree: &PartTree, payload: PartIndex, container: &PartId) -> usize {
        let mut mapped = 0;
        let mut stack = vec![payload];
        while let Some(index) = stack.pop() {
            let part = tree.part(index);
            self.containers.insert(part.id.clone(), container.clone());
            mapped += 1;
            stack.extend(part.children.iter().copied());
        }
        log::debug!("Mapped {mapped} parts to signed container {container}");
        mapped
    }

    #[must_use]
    pub fn container_of(&self, part: &PartId) -> Option<&PartId> {
        self.containers.get(part)
    }

    /// Take the verdict covering `part` out of `verdicts`, if it is still there.
    pub fn lookup_and_consume(
        &self,
        part: &PartId,
        verdicts: &mut VerdictStore,
    ) -> Option<SignatureVerdict> {
        let container = self.containers.get(part)?;
        verdicts.remove(container)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}
