pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod store;
pub mod view;

pub use error::AppError;
pub use model::{Deadline, Priority, Task, TaskId};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use store::TaskStore;
pub use view::{SortOrder, SortState, SortType, active_tasks, completed_tasks};
