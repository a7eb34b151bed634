//! Stored record formats for the task list and the saved sort selection.

use crate::error::AppError;
use crate::model::Task;
use crate::storage::{KeyValueStore, VIEW_KEY};
use crate::view::SortState;
use log::warn;
use std::collections::HashSet;

pub fn encode_tasks(tasks: &[Task]) -> Result<String, AppError> {
    serde_json::to_string(tasks).map_err(|err| AppError::persistence(err.to_string()))
}

/// Decodes the stored task list. An absent value is an empty list.
pub fn decode_tasks(stored: Option<&str>) -> Result<Vec<Task>, AppError> {
    let Some(content) = stored else {
        return Ok(Vec::new());
    };

    let tasks: Vec<Task> = serde_json::from_str(content)
        .map_err(|err| AppError::invalid_data(format!("stored tasks: {err}")))?;

    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        if task.title.trim().is_empty() {
            return Err(AppError::invalid_data(format!(
                "stored task {} has an empty title",
                task.id
            )));
        }
        if !seen.insert(task.id) {
            return Err(AppError::invalid_data(format!(
                "stored task id {} is duplicated",
                task.id
            )));
        }
    }

    Ok(tasks)
}

/// Reads the saved sort selection. Unreadable or malformed values are
/// logged and treated as absent.
pub fn load_sort_state<S: KeyValueStore + ?Sized>(storage: &S) -> Option<SortState> {
    let stored = match storage.get(VIEW_KEY) {
        Ok(stored) => stored?,
        Err(err) => {
            warn!("event=view_load module=storage status=error error={err}");
            return None;
        }
    };

    match serde_json::from_str(&stored) {
        Ok(state) => Some(state),
        Err(err) => {
            warn!("event=view_load module=storage status=ignored error={err}");
            None
        }
    }
}

pub fn save_sort_state<S: KeyValueStore + ?Sized>(
    storage: &mut S,
    state: SortState,
) -> Result<(), AppError> {
    let content =
        serde_json::to_string(&state).map_err(|err| AppError::persistence(err.to_string()))?;
    storage.set(VIEW_KEY, &content)
}
