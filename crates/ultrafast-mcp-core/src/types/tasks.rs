//! Long-running task lifecycle: `tasks/list`, `tasks/get`, `tasks/cancel`, `tasks/result`.
//!
//! A task is how a server represents work that outlives a single request/response
//! round trip (e.g. a tool call that takes minutes). The initiating request
//! returns quickly with a `Task` in `working` status; the caller polls `tasks/get`
//! (at the cadence suggested by `poll_interval`) until the status leaves `working`
//! or `input_required`, then fetches the final content with `tasks/result`.

use crate::types::content::ContentBlock;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Working,
    InputRequired,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Whether this status is terminal (no further transitions expected).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

/// A long-running operation addressable by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "taskId")]
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(rename = "statusMessage", skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    /// Suggested poll cadence, in milliseconds.
    #[serde(rename = "pollInterval", skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<u64>,
    /// Offset-aware ISO-8601 creation timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: String,
    /// Time-to-live, in milliseconds, after which the server may discard the task.
    #[serde(rename = "ttl", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

impl Task {
    pub fn new(task_id: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Working,
            status_message: None,
            poll_interval: None,
            created_at: created_at.into(),
            ttl: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval = Some(poll_interval_ms);
        self
    }

    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl = Some(ttl_ms);
        self
    }
}

/// `tasks/list` request.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListTasksRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// `tasks/list` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<Task>,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// `tasks/get` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTaskRequest {
    #[serde(rename = "taskId")]
    pub task_id: String,
}

/// `tasks/get` response: the task's current state.
pub type GetTaskResponse = Task;

/// `tasks/cancel` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelTaskRequest {
    #[serde(rename = "taskId")]
    pub task_id: String,
}

/// `tasks/cancel` response: the task's state immediately after the cancel was
/// accepted (status may still be `working` until the handler observes the
/// cancellation and transitions it to `cancelled`).
pub type CancelTaskResponse = Task;

/// `tasks/result` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResultRequest {
    #[serde(rename = "taskId")]
    pub task_id: String,
}

/// `tasks/result` response. Only meaningful once the task's status is terminal;
/// calling this against a `working`/`input_required` task is a protocol error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResultResponse {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}
