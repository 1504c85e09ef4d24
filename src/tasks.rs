//! Deferred work scheduled from inside host callbacks.
//!
//! A barrel created or deleted during a file-system query must not mutate the
//! project graph re-entrantly, so the follow-up is queued and run on the
//! next tick of the host's loop, in FIFO order.

use std::collections::VecDeque;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTask {
    /// Remove a deleted virtual barrel from the project's open files.
    RemoveFile(PathBuf),
    UpdateGraph,
}

#[derive(Debug, Clone)]
pub struct DeferredQueue<T> {
    pending: VecDeque<T>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }
}

impl<T: PartialEq + std::fmt::Debug> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `task` unless an identical task is already pending.
    pub fn schedule(&mut self, task: T) -> bool {
        if self.pending.contains(&task) {
            tracing::trace!(?task, "task already pending");
            return false;
        }
        tracing::debug!(?task, "scheduled task");
        self.pending.push_back(task);
        true
    }

    pub fn pop(&mut self) -> Option<T> {
        self.pending.pop_front()
    }

    /// Takes every pending task. Tasks scheduled while the returned ones run
    /// wait for the next drain.
    pub fn drain(&mut self) -> Vec<T> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
