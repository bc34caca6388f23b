use std::fmt;

use super::{fmt_queue, PushingQueue};

/// Pushing queue backed by contiguous storage.
///
/// Inserting shifts every held element one slot back, so the cost grows with
/// the capacity. Reads are constant time.
#[derive(Debug, Clone)]
pub struct ArrayPushingQueue<T> {
    queue: Vec<T>,
    capacity: usize,
}

impl<T> ArrayPushingQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            // One extra slot so the insert before truncation never reallocates
            queue: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }
}

impl<T> PushingQueue<T> for ArrayPushingQueue<T> {
    type Iter<'a> = std::slice::Iter<'a, T>
    where
        Self: 'a,
        T: 'a;

    fn insert(&mut self, element: T) {
        self.queue.insert(0, element);
        self.queue.truncate(self.capacity);
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.queue.get(index)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.queue.iter()
    }
}

impl<T: fmt::Display> fmt::Display for ArrayPushingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_queue(self, f)
    }
}
