//! Diagnostic aggregation across cascade stages.

use crate::domain::StageDiagnostic;

/// Ordered collection of per-stage diagnostic strings.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<StageDiagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `stage`; absent or blank messages are dropped.
    /// A stage holds at most one entry: later messages are appended to it on
    /// a new line.
    pub fn record(&mut self, stage: &'static str, message: Option<String>) {
        let Some(message) = message else {
            return;
        };
        if message.trim().is_empty() {
            return;
        }
        log::debug!("{stage}: {message}");
        match self.entries.iter_mut().find(|e| e.stage == stage) {
            Some(entry) => {
                entry.message.push('\n');
                entry.message.push_str(&message);
            }
            None => self.entries.push(StageDiagnostic { stage, message }),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageDiagnostic> {
        self.entries.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<StageDiagnostic> {
        self.entries
    }
}

/// Join queued error lines the way they are reported per stage.
#[must_use]
pub fn join_lines<I, S>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = lines
        .into_iter()
        .map(|l| l.as_ref().to_string())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (!joined.is_empty()).then_some(joined)
}
