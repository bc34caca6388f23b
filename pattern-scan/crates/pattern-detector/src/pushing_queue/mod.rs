//! Fixed-capacity "pushing queues".
//!
//! Elements can only be added at the head of the queue. Every insert pushes
//! the existing elements one position back (their index grows by one), and
//! once the queue is full the oldest element falls off the tail.
//!
//! ```text
//!   capacity = 3
//!
//!   insert(1)  => [1]
//!   insert(2)  => [2, 1]
//!   insert(3)  => [3, 2, 1]
//!   insert(4)  => [4, 3, 2]      (1 dropped)
//!
//!   get(0) == 4, get(2) == 2, get(3) == None
//! ```
//!
//! ## Strategies
//!
//! | Type | Backing | insert | get(i) |
//! |------|---------|--------|--------|
//! | `ArrayPushingQueue` | `Vec` | O(len) shift | O(1) |
//! | `LinkedPushingQueue` | `LinkedList` | O(1) | O(i) |
//! | `MixedPushingQueue` | picks one by capacity | – | – |

mod array;
mod linked;
mod mixed;

use std::fmt;

pub use array::ArrayPushingQueue;
pub use linked::LinkedPushingQueue;
pub use mixed::{MixedIter, MixedPushingQueue, LINKED_THRESHOLD};

/// Common contract of every pushing queue strategy.
pub trait PushingQueue<T> {
    /// Iterator from the most recent element to the oldest.
    type Iter<'a>: Iterator<Item = &'a T>
    where
        Self: 'a,
        T: 'a;

    /// Insert an element at the head, dropping the tail element when full.
    fn insert(&mut self, element: T);

    /// Element `index` positions back from the head (0 = most recent).
    /// Returns `None` if fewer than `index + 1` elements have been inserted.
    fn get(&self, index: usize) -> Option<&T>;

    /// Fixed capacity set at construction.
    fn capacity(&self) -> usize;

    /// Number of elements currently held (never more than `capacity()`).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fresh iterator over the current contents, most recent first.
    fn iter(&self) -> Self::Iter<'_>;
}

/// Render a queue as `[e0, e1, ...]` across its full capacity.
/// Positions not filled yet are shown as `-`.
pub(crate) fn fmt_queue<T, Q>(queue: &Q, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    T: fmt::Display,
    Q: PushingQueue<T>,
{
    write!(f, "[")?;
    for index in 0..queue.capacity() {
        if index > 0 {
            write!(f, ", ")?;
        }
        match queue.get(index) {
            Some(element) => write!(f, "{}", element)?,
            None => write!(f, "-")?,
        }
    }
    write!(f, "]")
}
