//! Task domain types

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::domain::status::{StatusVocabulary, TaskPhase};

/// Opaque identifier assigned by the service when a task is submitted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Task status label as reported by the service
///
/// The label set differs between API revisions (`COMPLETED` vs `succeeded`),
/// so the raw label is kept and interpreted through a [`StatusVocabulary`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStatus(String);

impl TaskStatus {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Classifies this label using the default vocabulary
    pub fn phase(&self) -> TaskPhase {
        StatusVocabulary::default().classify(self)
    }

    /// Whether no further state change is expected, per the default vocabulary
    pub fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskStatus {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for TaskStatus {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// State of a task at one observation instant
///
/// Produced by a status query or by a stream `message` frame. Both payload
/// shapes seen on the wire are accepted: `id` or `taskId` for the identifier,
/// and `errorMessage` / `errorMessages` as either a string or a list of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusSnapshot {
    #[serde(alias = "taskId")]
    pub id: TaskId,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    #[serde(
        default,
        alias = "errorMessages",
        deserialize_with = "deserialize_error_message",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,
}

impl TaskStatusSnapshot {
    /// Returns the output when the service reported it as a plain string
    /// (a result URL or image identifier)
    pub fn output_str(&self) -> Option<&str> {
        self.output.as_ref().and_then(|output| output.as_str())
    }

    /// Classifies the status with the given vocabulary
    pub fn phase_in(&self, vocabulary: &StatusVocabulary) -> TaskPhase {
        vocabulary.classify(&self.status)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorMessageField {
    One(String),
    Many(Vec<String>),
}

fn deserialize_error_message<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let field: Option<ErrorMessageField> = Option::deserialize(deserializer)?;
    Ok(match field {
        Some(ErrorMessageField::One(message)) if !message.is_empty() => Some(message),
        Some(ErrorMessageField::Many(messages)) if !messages.is_empty() => {
            Some(messages.join("; "))
        }
        _ => None,
    })
}
