//! Task DTOs

use serde::{Deserialize, Serialize};

use crate::domain::task::TaskId;

/// Response to an asynchronous submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub task_id: TaskId,
}
