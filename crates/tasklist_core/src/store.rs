use crate::error::AppError;
use crate::model::{Deadline, Priority, Task, TaskId};
use crate::storage::{KeyValueStore, TASKS_KEY, records};
use log::{debug, info, warn};
use time::OffsetDateTime;

/// Owner of the canonical task list.
///
/// The list is kept in insertion order. Every change is written through to
/// the injected [`KeyValueStore`]; a failed write is logged and kept in
/// [`TaskStore::persist_error`] but never undoes the change in memory.
#[derive(Debug)]
pub struct TaskStore<S: KeyValueStore> {
    storage: S,
    tasks: Vec<Task>,
    last_id: TaskId,
    persist_error: Option<AppError>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Loads the stored list. Malformed stored data refuses to open rather
    /// than start over an empty list.
    pub fn open(storage: S) -> Result<Self, AppError> {
        let stored = storage.get(TASKS_KEY)?;
        let tasks = records::decode_tasks(stored.as_deref())?;
        let last_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);

        info!(
            "event=store_open module=store status=ok tasks={}",
            tasks.len()
        );

        Ok(Self {
            storage,
            tasks,
            last_id,
            persist_error: None,
        })
    }

    pub fn add(&mut self, title: &str, priority: Priority, deadline: &str) -> Result<Task, AppError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("title is required"));
        }
        let deadline = Deadline::parse(deadline)?;

        let task = Task::new(self.next_id(), trimmed.to_string(), priority, deadline);
        self.tasks.push(task.clone());
        debug!("event=task_add module=store id={} status=ok", task.id);
        self.persist();

        Ok(task)
    }

    /// Removes a task. Unknown ids are ignored.
    pub fn delete(&mut self, id: TaskId) -> Option<Task> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            debug!("event=task_delete module=store id={id} status=not_found");
            return None;
        };

        let removed = self.tasks.remove(index);
        debug!("event=task_delete module=store id={id} status=ok");
        self.persist();

        Some(removed)
    }

    /// Marks a task completed. Unknown ids and completed tasks are ignored.
    pub fn complete(&mut self, id: TaskId) -> Option<Task> {
        let Some(task) = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id && !task.completed)
        else {
            debug!("event=task_complete module=store id={id} status=unchanged");
            return None;
        };

        task.completed = true;
        let updated = task.clone();
        debug!("event=task_complete module=store id={id} status=ok");
        self.persist();

        Some(updated)
    }

    /// Snapshot of the canonical list in insertion order.
    pub fn list(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The most recent persistence failure, cleared by the next good write.
    pub fn persist_error(&self) -> Option<&AppError> {
        self.persist_error.as_ref()
    }

    pub fn take_persist_error(&mut self) -> Option<AppError> {
        self.persist_error.take()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    // Wall-clock milliseconds, bumped past the highest id already known.
    fn next_id(&mut self) -> TaskId {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let now = TaskId::try_from(millis).unwrap_or(0);
        let id = now.max(self.last_id.saturating_add(1));
        self.last_id = id;
        id
    }

    fn persist(&mut self) {
        let result = records::encode_tasks(&self.tasks)
            .and_then(|content| self.storage.set(TASKS_KEY, &content));

        match result {
            Ok(()) => {
                self.persist_error = None;
            }
            Err(err) => {
                warn!("event=persist module=store status=error error={err}");
                self.persist_error = Some(err);
            }
        }
    }
}
