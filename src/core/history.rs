//! Bounded in-memory history of rendered records

use parking_lot::RwLock;
use std::collections::VecDeque;

/// Capacity used when history is enabled without an explicit size.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Fixed-capacity FIFO of flattened log lines.
///
/// Once full, each push evicts the oldest line. Readers take a snapshot
/// under the read lock, so they never see a half-written entry.
///
/// # Example
///
/// ```
/// use rust_kvlog::core::HistoryBuffer;
///
/// let history = HistoryBuffer::new(2);
/// history.push("one");
/// history.push("two");
/// history.push("three");
/// assert_eq!(history.snapshot(), vec!["two", "three"]);
/// ```
#[derive(Debug)]
pub struct HistoryBuffer {
    inner: RwLock<Ring>,
}

#[derive(Debug)]
struct Ring {
    capacity: usize,
    lines: VecDeque<String>,
}

impl Ring {
    fn truncate_front(&mut self) {
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Ring {
                capacity,
                lines: VecDeque::with_capacity(capacity),
            }),
        }
    }

    /// Append a line, evicting the oldest when over capacity.
    pub fn push(&self, line: impl Into<String>) {
        let mut ring = self.inner.write();
        if ring.capacity == 0 {
            return;
        }
        ring.lines.push_back(line.into());
        if ring.lines.len() > ring.capacity {
            ring.lines.pop_front();
        }
    }

    /// All retained lines, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.inner.read().lines.iter().cloned().collect()
    }

    /// Change the capacity, dropping the oldest lines if shrinking below
    /// the current occupancy.
    pub fn resize(&self, capacity: usize) {
        let mut ring = self.inner.write();
        ring.capacity = capacity;
        ring.truncate_front();
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity
    }

    pub fn len(&self) -> usize {
        self.inner.read().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().lines.is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().lines.clear();
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_push_over_capacity_evicts_oldest() {
        let history = HistoryBuffer::new(3);
        for i in 0..4 {
            history.push(format!("line {}", i));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.snapshot(), vec!["line 1", "line 2", "line 3"]);
    }

    #[test]
    fn test_shrink_truncates_front() {
        let history = HistoryBuffer::new(5);
        for i in 0..5 {
            history.push(i.to_string());
        }

        history.resize(2);
        assert_eq!(history.capacity(), 2);
        assert_eq!(history.snapshot(), vec!["3", "4"]);

        history.push("5");
        assert_eq!(history.snapshot(), vec!["4", "5"]);
    }

    #[test]
    fn test_grow_keeps_entries() {
        let history = HistoryBuffer::new(1);
        history.push("a");
        history.resize(3);
        history.push("b");
        history.push("c");
        assert_eq!(history.snapshot(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let history = HistoryBuffer::new(0);
        history.push("dropped");
        assert!(history.is_empty());
    }

    #[test]
    fn test_clear() {
        let history = HistoryBuffer::default();
        history.push("x");
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_concurrent_push_and_snapshot() {
        let history = Arc::new(HistoryBuffer::new(64));
        let mut handles = vec![];

        for t in 0..4 {
            let history = Arc::clone(&history);
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    history.push(format!("t{}-{}", t, i));
                }
            }));
        }

        for _ in 0..50 {
            for line in history.snapshot() {
                assert!(line.starts_with('t'));
                assert!(line.contains('-'));
            }
        }

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(history.len(), 64);
    }
}
