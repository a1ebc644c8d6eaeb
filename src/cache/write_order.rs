//! Write Order Module
//!
//! Tracks the order in which keys were last written, for capacity eviction.

use std::collections::VecDeque;

// == Write Order ==
/// Tracks write order for least-recently-written eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently written
/// - Back = Least recently written
///
/// Reads never reorder keys.
#[derive(Debug)]
pub struct WriteOrder<K> {
    order: VecDeque<K>,
}

impl<K> Default for WriteOrder<K> {
    fn default() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }
}

impl<K: PartialEq + Clone> WriteOrder<K> {
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Write ==
    /// Marks a key as just written (moves to front).
    pub fn record_write(&mut self, key: &K) {
        self.remove(key);
        self.order.push_front(key.clone());
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &K) {
        self.order.retain(|k| k != key);
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently written key.
    pub fn evict_oldest(&mut self) -> Option<K> {
        self.order.pop_back()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_order_new() {
        let order: WriteOrder<String> = WriteOrder::new();
        assert!(order.is_empty());
        assert_eq!(order.len(), 0);
    }

    #[test]
    fn test_evict_oldest_follows_write_order() {
        let mut order = WriteOrder::new();
        order.record_write(&"a");
        order.record_write(&"b");
        order.record_write(&"c");

        assert_eq!(order.evict_oldest(), Some("a"));
        assert_eq!(order.evict_oldest(), Some("b"));
        assert_eq!(order.len(), 1);
    }

    #[test]
    fn test_rewrite_moves_to_front() {
        let mut order = WriteOrder::new();
        order.record_write(&1);
        order.record_write(&2);
        order.record_write(&1);

        assert_eq!(order.len(), 2);
        assert_eq!(order.evict_oldest(), Some(2));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut order = WriteOrder::new();
        order.record_write(&1);
        order.record_write(&2);
        order.remove(&1);
        assert_eq!(order.len(), 1);

        order.clear();
        assert!(order.is_empty());
        assert_eq!(order.evict_oldest(), None);
    }
}
