use crate::error::AppError;

pub mod json_store;
pub mod memory_store;
pub mod records;

pub use json_store::JsonFileStore;
pub use memory_store::MemoryStore;

/// Key under which the canonical task list is stored.
pub const TASKS_KEY: &str = "tasks";
/// Key under which the last sort selection is stored.
pub const VIEW_KEY: &str = "view";

/// String key-value persistence used by the task store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError>;
}
