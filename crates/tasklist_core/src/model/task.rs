use crate::error::AppError;
use crate::model::{Deadline, Priority};
use serde::{Deserialize, Serialize};

pub type TaskId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub priority: Priority,
    pub deadline: Deadline,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(id: TaskId, title: String, priority: Priority, deadline: Deadline) -> Self {
        Self {
            id,
            title,
            priority,
            deadline,
            completed: false,
        }
    }
}

/// Parses a task id typed by a user.
pub fn parse_task_id(raw: &str) -> Result<TaskId, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("id is required"));
    }

    trimmed
        .parse::<TaskId>()
        .map_err(|_| AppError::validation(format!("invalid task id '{trimmed}'")))
}
