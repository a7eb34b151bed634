//! Derived task lists.
//!
//! Views are recomputed from the canonical list on every call and never
//! write back into it. Sorting is stable, so tasks that compare equal keep
//! their insertion order in both directions.

use crate::error::AppError;
use crate::model::Task;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Field a view is sorted by.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SortType {
    #[default]
    Date,
    Priority,
}

/// Sort direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Priority => "priority",
        }
    }
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

impl FromStr for SortType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "priority" => Ok(Self::Priority),
            _ => Err(AppError::validation(format!(
                "invalid sort type '{}'. Valid types: date, priority",
                s.trim()
            ))),
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(AppError::validation(format!(
                "invalid sort order '{}'. Valid orders: asc, desc",
                s.trim()
            ))),
        }
    }
}

impl TryFrom<String> for SortType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for SortOrder {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortType> for String {
    fn from(value: SortType) -> Self {
        value.as_str().to_string()
    }
}

impl From<SortOrder> for String {
    fn from(value: SortOrder) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The current sort selection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub sort_type: SortType,
    pub sort_order: SortOrder,
}

impl SortState {
    pub fn new(sort_type: SortType, sort_order: SortOrder) -> Self {
        Self {
            sort_type,
            sort_order,
        }
    }

    /// Selecting the current type flips the order; selecting another type
    /// switches to it in ascending order.
    pub fn toggle(&mut self, requested: SortType) {
        if requested == self.sort_type {
            self.sort_order = self.sort_order.flipped();
        } else {
            self.sort_type = requested;
            self.sort_order = SortOrder::Asc;
        }
    }
}

/// Ascending comparison of two tasks for the given field.
pub fn compare_tasks(a: &Task, b: &Task, sort_type: SortType) -> Ordering {
    match sort_type {
        SortType::Date => a.deadline.instant().cmp(&b.deadline.instant()),
        SortType::Priority => a.priority.rank().cmp(&b.priority.rank()),
    }
}

/// Returns a sorted copy of `tasks`.
pub fn sort_tasks(tasks: &[Task], sort_type: SortType, sort_order: SortOrder) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| {
        let cmp = compare_tasks(a, b, sort_type);
        match sort_order {
            SortOrder::Asc => cmp,
            SortOrder::Desc => cmp.reverse(),
        }
    });
    sorted
}

pub fn active_tasks(tasks: &[Task], sort_type: SortType, sort_order: SortOrder) -> Vec<Task> {
    filtered_sorted(tasks, false, sort_type, sort_order)
}

pub fn completed_tasks(tasks: &[Task], sort_type: SortType, sort_order: SortOrder) -> Vec<Task> {
    filtered_sorted(tasks, true, sort_type, sort_order)
}

fn filtered_sorted(
    tasks: &[Task],
    completed: bool,
    sort_type: SortType,
    sort_order: SortOrder,
) -> Vec<Task> {
    let filtered: Vec<Task> = tasks
        .iter()
        .filter(|task| task.completed == completed)
        .cloned()
        .collect();
    sort_tasks(&filtered, sort_type, sort_order)
}
