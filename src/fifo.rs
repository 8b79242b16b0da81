/// thread safe, unbounded fifo queue.  Producers and consumers share it through an `Arc`;
/// every operation holds the same lock for its full duration and none of them block
/// waiting for data.  Consumers poll `pop`.
///
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
pub struct FifoQueue<T> {
    elements: Mutex<VecDeque<T>>,
}

impl<T> Default for FifoQueue<T> {
    fn default() -> Self {
        FifoQueue {
            elements: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> FifoQueue<T> {
    /// create an empty queue
    pub fn new() -> FifoQueue<T> {
        FifoQueue::default()
    }

    /// append to the tail; always succeeds
    pub fn push(&self, element: T) -> bool {
        self.lock().push_back(element);
        true
    }

    /// move the head into `element` and return true; on an empty queue return false and
    /// leave `element` untouched
    pub fn pop(&self, element: &mut T) -> bool {
        match self.try_pop() {
            Some(head) => {
                *element = head;
                true
            }
            None => false,
        }
    }

    /// remove and return the head, if any
    pub fn try_pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // a panic while holding the lock cannot leave the deque half-updated, so a poisoned
    // lock is still safe to use
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.elements
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn new() {
        let queue: FifoQueue<String> = FifoQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn pop_empty() {
        let queue: FifoQueue<String> = FifoQueue::new();
        let mut element = "unchanged".to_string();

        assert!(!queue.pop(&mut element));
        assert_eq!(element, "unchanged");
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn push_pop_order() {
        let queue = FifoQueue::new();
        for word in ["alpha", "beta", "gamma"] {
            assert!(queue.push(word.to_string()));
        }
        assert_eq!(queue.len(), 3);
        assert!(!queue.is_empty());

        let mut element = String::new();
        assert!(queue.pop(&mut element));
        assert_eq!(element, "alpha");
        assert_eq!(queue.try_pop(), Some("beta".to_string()));
        assert!(queue.pop(&mut element));
        assert_eq!(element, "gamma");

        assert!(!queue.pop(&mut element));
        assert_eq!(element, "gamma");
        assert!(queue.is_empty());
    }

    #[test]
    fn size_consistency() {
        let queue = FifoQueue::new();
        for n in 0..20 {
            queue.push(n);
        }
        for _ in 0..7 {
            assert!(queue.try_pop().is_some());
        }
        assert_eq!(queue.len(), 13);
    }

    #[test]
    fn poisoned_lock_recovers() {
        let queue = Arc::new(FifoQueue::new());
        queue.push(1);

        let q = queue.clone();
        let result = thread::spawn(move || {
            let _guard = q.elements.lock();
            panic!("poison the queue lock");
        })
        .join();
        assert!(result.is_err());

        queue.push(2);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.try_pop(), Some(1));
        assert_eq!(queue.try_pop(), Some(2));
    }
}
