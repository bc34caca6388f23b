use std::collections::LinkedList;
use std::fmt;

use super::{fmt_queue, PushingQueue};

/// Pushing queue backed by a doubly linked list.
///
/// Head insert and tail eviction are constant time; each element pays for its
/// own node allocation and positional reads walk the chain.
#[derive(Debug, Clone)]
pub struct LinkedPushingQueue<T> {
    queue: LinkedList<T>,
    capacity: usize,
}

impl<T> LinkedPushingQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: LinkedList::new(),
            capacity,
        }
    }
}

impl<T> PushingQueue<T> for LinkedPushingQueue<T> {
    type Iter<'a> = std::collections::linked_list::Iter<'a, T>
    where
        Self: 'a,
        T: 'a;

    fn insert(&mut self, element: T) {
        self.queue.push_front(element);
        while self.queue.len() > self.capacity {
            self.queue.pop_back();
        }
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.queue.iter().nth(index)
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

impl<T: fmt::Display> fmt::Display for LinkedPushingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_queue(self, f)
    }
}
