//! Status vocabulary
//!
//! The service has shipped two label sets (`QUEUED/COMPLETED/...` and
//! `queued/succeeded/...`). Rather than hard-coding either, a status label is
//! mapped onto a [`TaskPhase`] through a configurable vocabulary.

use serde::{Deserialize, Serialize};

use crate::domain::task::TaskStatus;

/// Lifecycle phase of a remote task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPhase {
    Queued,
    Processing,
    Succeeded,
    Failed,
    Cancelled,
    /// Label not present in the vocabulary
    Unknown,
}

impl TaskPhase {
    /// Whether no further state change occurs after this phase
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Mapping from status labels to lifecycle phases
///
/// Labels are compared case-insensitively after trimming whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusVocabulary {
    pub queued: Vec<String>,
    pub processing: Vec<String>,
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    pub cancelled: Vec<String>,
}

impl StatusVocabulary {
    /// Creates a vocabulary with no labels; every status classifies as `Unknown`
    pub fn empty() -> Self {
        Self {
            queued: Vec::new(),
            processing: Vec::new(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            cancelled: Vec::new(),
        }
    }

    /// Adds labels for a phase
    ///
    /// Labels for `Unknown` are ignored.
    pub fn with_labels<I, S>(mut self, phase: TaskPhase, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target = match phase {
            TaskPhase::Queued => &mut self.queued,
            TaskPhase::Processing => &mut self.processing,
            TaskPhase::Succeeded => &mut self.succeeded,
            TaskPhase::Failed => &mut self.failed,
            TaskPhase::Cancelled => &mut self.cancelled,
            TaskPhase::Unknown => return self,
        };
        target.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Maps a status label onto a phase
    pub fn classify(&self, status: &TaskStatus) -> TaskPhase {
        let label = status.as_str().trim();
        if label.is_empty() {
            return TaskPhase::Unknown;
        }

        let matches = |labels: &[String]| labels.iter().any(|l| l.eq_ignore_ascii_case(label));

        if matches(&self.succeeded) {
            TaskPhase::Succeeded
        } else if matches(&self.failed) {
            TaskPhase::Failed
        } else if matches(&self.cancelled) {
            TaskPhase::Cancelled
        } else if matches(&self.processing) {
            TaskPhase::Processing
        } else if matches(&self.queued) {
            TaskPhase::Queued
        } else {
            TaskPhase::Unknown
        }
    }

    pub fn is_terminal(&self, status: &TaskStatus) -> bool {
        self.classify(status).is_terminal()
    }
}

impl Default for StatusVocabulary {
    /// Union of both label sets the service has used
    fn default() -> Self {
        Self::empty()
            .with_labels(TaskPhase::Queued, ["QUEUED", "IN_QUEUE", "PENDING"])
            .with_labels(TaskPhase::Processing, ["PROCESSING", "RUNNING", "IN_PROGRESS"])
            .with_labels(TaskPhase::Succeeded, ["COMPLETED", "SUCCEEDED"])
            .with_labels(TaskPhase::Failed, ["FAILED", "ERROR"])
            .with_labels(TaskPhase::Cancelled, ["CANCELLED", "CANCELED"])
    }
}
