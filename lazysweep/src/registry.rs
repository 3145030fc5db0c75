use alloc::collections::BTreeMap;

use crate::{Task, TaskIndex};

/// Per-index deferred work, kept in ascending index order.
///
/// The registry knows nothing about visibility or in-flight frames; cancelling a pending dispatch
/// on removal is the scheduler's job.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskIndex, Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `task` unless `index` already has one. The first registration wins.
    pub fn insert(&mut self, index: TaskIndex, task: Task) -> bool {
        if self.tasks.contains_key(&index) {
            return false;
        }
        self.tasks.insert(index, task);
        true
    }

    pub fn remove(&mut self, index: TaskIndex) -> Option<Task> {
        self.tasks.remove(&index)
    }

    pub fn get(&self, index: TaskIndex) -> Option<&Task> {
        self.tasks.get(&index)
    }

    pub fn contains(&self, index: TaskIndex) -> bool {
        self.tasks.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Registered indices, ascending.
    pub fn indices(&self) -> impl Iterator<Item = TaskIndex> + '_ {
        self.tasks.keys().copied()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

impl core::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("len", &self.tasks.len())
            .field("first", &self.tasks.keys().next())
            .field("last", &self.tasks.keys().next_back())
            .finish()
    }
}
