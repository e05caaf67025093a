//! Pre-populated work queue.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::PathBuf;

/// One unit of batch input paired with its position in the caller's list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem<T> {
    /// Position in the input list; never reassigned
    pub index: usize,
    pub payload: T,
}

/// Payloads carry a printable identifier used for error attribution and
/// progress labels.
pub trait BatchPayload: Send + 'static {
    fn identifier(&self) -> String;
}

impl BatchPayload for String {
    fn identifier(&self) -> String {
        self.clone()
    }
}

impl BatchPayload for PathBuf {
    fn identifier(&self) -> String {
        self.display().to_string()
    }
}

/// Fixed-capacity queue filled once at construction.
///
/// There is no way to push after construction, so the queue is closed as soon
/// as it exists. Every item is handed out exactly once.
#[derive(Debug)]
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<WorkItem<T>>>,
    total: usize,
}

impl<T> WorkQueue<T> {
    pub fn from_payloads(payloads: Vec<T>) -> Self {
        let total = payloads.len();
        let items = payloads
            .into_iter()
            .enumerate()
            .map(|(index, payload)| WorkItem { index, payload })
            .collect();

        Self {
            items: Mutex::new(items),
            total,
        }
    }

    /// Take the next item, or `None` once drained
    pub fn pop(&self) -> Option<WorkItem<T>> {
        self.items.lock().pop_front()
    }

    /// Items not yet handed out
    pub fn remaining(&self) -> usize {
        self.items.lock().len()
    }

    /// Number of items the queue was filled with
    pub fn total(&self) -> usize {
        self.total
    }
}
