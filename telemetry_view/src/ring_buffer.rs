use std::collections::VecDeque;

/// Fixed-size FIFO history. Pushing onto a full buffer evicts exactly one
/// element, the oldest.
#[derive(Debug, Clone, PartialEq)]
pub struct RingBuffer<T> {
    max: usize,
    buf: VecDeque<T>,
}

impl<T> RingBuffer<T> {
    pub fn new(max: usize) -> Self {
        let max = max.max(1);
        Self {
            max,
            buf: VecDeque::new(),
        }
    }

    /// Appends `item`, returning the evicted oldest element when the bound
    /// was exceeded.
    pub fn push(&mut self, item: T) -> Option<T> {
        self.buf.push_back(item);
        if self.buf.len() > self.max {
            self.buf.pop_front()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.buf.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.buf.back()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.buf.front()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max
    }
}

impl<T: Clone> RingBuffer<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.buf.iter().cloned().collect()
    }
}
