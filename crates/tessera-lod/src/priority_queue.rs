//! Priority queue ordering chunk generation requests by visual importance.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

/// Priority score of a request; higher is processed first.
///
/// Closer chunks dominate, finer LODs get a bonus.
#[must_use]
pub fn request_priority(distance: f32, lod: usize) -> f64 {
    let d = (distance as f64).max(1.0);
    10_000.0 / (d * d) + 100.0 / (1_u64 << lod.min(63)) as f64
}

#[derive(Clone, Debug)]
struct Entry<K> {
    key: K,
    priority: f64,
    generation: u64,
}

impl<K> PartialEq for Entry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K> Eq for Entry<K> {}

impl<K> PartialOrd for Entry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Entry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            // Earlier pushes first among equal priorities.
            .then_with(|| other.generation.cmp(&self.generation))
    }
}

/// Max-priority queue keyed by `K`. Pushing an existing key replaces its
/// priority; superseded heap entries are skipped lazily on pop.
pub struct RequestQueue<K> {
    heap: BinaryHeap<Entry<K>>,
    generations: HashMap<K, u64>,
    next_generation: u64,
}

impl<K: Copy + Eq + Hash> Default for RequestQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash> RequestQueue<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            generations: HashMap::new(),
            next_generation: 0,
        }
    }

    /// Insert `key` or update its priority.
    pub fn push(&mut self, key: K, priority: f64) {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.generations.insert(key, generation);
        self.heap.push(Entry {
            key,
            priority,
            generation,
        });
    }

    pub fn pop(&mut self) -> Option<K> {
        while let Some(entry) = self.heap.pop() {
            if self.generations.get(&entry.key) == Some(&entry.generation) {
                self.generations.remove(&entry.key);
                return Some(entry.key);
            }
        }
        None
    }

    /// Drop `key` if queued. Returns whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.generations.remove(key).is_some()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.generations.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.generations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.generations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closer_request_has_higher_priority() {
        let close = request_priority(100.0, 0);
        let far = request_priority(1000.0, 0);
        assert!(close > far, "close ({close}) should exceed far ({far})");
        assert!(request_priority(500.0, 0) > request_priority(500.0, 2));
    }

    #[test]
    fn test_queue_returns_highest_priority_first() {
        let mut queue = RequestQueue::new();
        queue.push((0, 0), 10.0);
        queue.push((1, 0), 50.0);
        queue.push((2, 0), 100.0);
        assert_eq!(queue.pop(), Some((2, 0)));
        assert_eq!(queue.pop(), Some((1, 0)));
        assert_eq!(queue.pop(), Some((0, 0)));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_push_updates_priority() {
        let mut queue = RequestQueue::new();
        queue.push('a', 100.0);
        queue.push('b', 50.0);
        queue.push('a', 30.0);
        queue.push('b', 90.0);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some('b'));
        assert_eq!(queue.pop(), Some('a'));
    }

    #[test]
    fn test_remove_skips_entry() {
        let mut queue = RequestQueue::new();
        queue.push(1, 5.0);
        queue.push(2, 1.0);
        assert!(queue.remove(&1));
        assert!(!queue.contains(&1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_equal_priorities_keep_insertion_order() {
        let mut queue = RequestQueue::new();
        for key in 0..5 {
            queue.push(key, 1.0);
        }
        let order: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }
}
