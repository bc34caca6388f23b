use std::fmt;

use super::{ArrayPushingQueue, LinkedPushingQueue, PushingQueue};

/// Capacities at or above this use the linked strategy.
pub const LINKED_THRESHOLD: usize = 40;

/// Pushing queue that picks its backing strategy from the capacity.
///
/// Small windows shift cheaply, so they use `ArrayPushingQueue`; large ones
/// use `LinkedPushingQueue` to keep inserts constant time. Behavior is the
/// same either way.
#[derive(Debug, Clone)]
pub enum MixedPushingQueue<T> {
    Array(ArrayPushingQueue<T>),
    Linked(LinkedPushingQueue<T>),
}

impl<T> MixedPushingQueue<T> {
    pub fn new(capacity: usize) -> Self {
        if capacity < LINKED_THRESHOLD {
            MixedPushingQueue::Array(ArrayPushingQueue::new(capacity))
        } else {
            MixedPushingQueue::Linked(LinkedPushingQueue::new(capacity))
        }
    }

    /// Whether the linked strategy was selected.
    pub fn is_linked(&self) -> bool {
        matches!(self, MixedPushingQueue::Linked(_))
    }
}

/// Iterator over a `MixedPushingQueue`, most recent first.
pub enum MixedIter<'a, T> {
    Array(std::slice::Iter<'a, T>),
    Linked(std::collections::linked_list::Iter<'a, T>),
}

impl<'a, T> Iterator for MixedIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            MixedIter::Array(iter) => iter.next(),
            MixedIter::Linked(iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            MixedIter::Array(iter) => iter.size_hint(),
            MixedIter::Linked(iter) => iter.size_hint(),
        }
    }
}

impl<T> PushingQueue<T> for MixedPushingQueue<T> {
    type Iter<'a> = MixedIter<'a, T>
    where
        Self: 'a,
        T: 'a;

    fn insert(&mut self, element: T) {
        match self {
            MixedPushingQueue::Array(queue) => queue.insert(element),
            MixedPushingQueue::Linked(queue) => queue.insert(element),
        }
    }

    fn get(&self, index: usize) -> Option<&T> {
        match self {
            MixedPushingQueue::Array(queue) => queue.get(index),
            MixedPushingQueue::Linked(queue) => queue.get(index),
        }
    }

    fn capacity(&self) -> usize {
        match self {
            MixedPushingQueue::Array(queue) => queue.capacity(),
            MixedPushingQueue::Linked(queue) => queue.capacity(),
        }
    }

    fn len(&self) -> usize {
        match self {
            MixedPushingQueue::Array(queue) => queue.len(),
            MixedPushingQueue::Linked(queue) => queue.len(),
        }
    }

    fn iter(&self) -> Self::Iter<'_> {
        match self {
            MixedPushingQueue::Array(queue) => MixedIter::Array(queue.iter()),
            MixedPushingQueue::Linked(queue) => MixedIter::Linked(queue.iter()),
        }
    }
}

impl<T: fmt::Display> fmt::Display for MixedPushingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixedPushingQueue::Array(queue) => fmt::Display::fmt(queue, f),
            MixedPushingQueue::Linked(queue) => fmt::Display::fmt(queue, f),
        }
    }
}
