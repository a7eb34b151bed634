mod deadline;
mod priority;
mod task;

pub use deadline::Deadline;
pub use priority::Priority;
pub use task::{Task, TaskId, parse_task_id};
