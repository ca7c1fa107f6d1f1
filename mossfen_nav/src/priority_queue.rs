// Indexed priority queue used as the Dijkstra frontier.
//
// The queue stores node indices only. Their priorities live in a key array
// owned by the caller (the search's cost-so-far table) and passed in on every
// call, so the search can keep updating costs while indices sit in the queue.
//
// Internally the queue is a plain `Vec` kept sorted by key, smallest first:
// `insert` appends and bubbles toward the front, `pop_min` swaps the last
// entry into the front slot and bubbles it back in one pass. Both are O(n).
// Visibility graphs are tens to low hundreds of nodes, where a sorted vector
// beats a binary heap on constant factors and keeps ordering trivially
// deterministic. Swap in a heap only if rooms grow past a few hundred nodes.
//
// See also: `pathfinding.rs`, the only user.
//
// **Critical constraint: determinism.** Ties keep insertion order on insert
// (an index only moves past strictly larger keys), so equal-cost frontiers
// pop in a fixed order for identical input.

/// Min-priority queue over indices into a caller-owned `&[f32]` key array.
///
/// The caller must keep `keys[i]` valid for every index it has inserted, and
/// must call `decrease_key` after lowering the key of an index that is
/// already queued.
#[derive(Clone, Debug, Default)]
pub struct IndexedPriorityQueue {
    data: Vec<usize>,
}

impl IndexedPriorityQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Add `index` and move it ahead of every entry with a larger key.
    pub fn insert(&mut self, index: usize, keys: &[f32]) {
        self.data.push(index);
        self.bubble_up(self.data.len() - 1, keys);
    }

    /// Remove and return the index with the smallest key.
    pub fn pop_min(&mut self, keys: &[f32]) -> Option<usize> {
        if self.data.is_empty() {
            return None;
        }
        let min = self.data.swap_remove(0);
        // The old last entry now sits at the front; one pass moves it back
        // to its place since everything behind it is still sorted.
        for a in 0..self.data.len().saturating_sub(1) {
            if keys[self.data[a]] <= keys[self.data[a + 1]] {
                break;
            }
            self.data.swap(a, a + 1);
        }
        Some(min)
    }

    /// Restore order after `keys[index]` was lowered. No-op if `index` is not
    /// queued.
    pub fn decrease_key(&mut self, index: usize, keys: &[f32]) {
        if let Some(pos) = self.data.iter().position(|&i| i == index) {
            self.bubble_up(pos, keys);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn bubble_up(&mut self, mut a: usize, keys: &[f32]) {
        while a > 0 && keys[self.data[a]] < keys[self.data[a - 1]] {
            self.data.swap(a, a - 1);
            a -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(queue: &mut IndexedPriorityQueue, keys: &[f32]) -> Vec<usize> {
        let mut out = Vec::new();
        while let Some(i) = queue.pop_min(keys) {
            out.push(i);
        }
        out
    }

    #[test]
    fn pops_in_key_order() {
        let keys = [5.0, 1.0, 3.0, 0.5, 4.0];
        let mut queue = IndexedPriorityQueue::new();
        for i in [0, 1, 2, 3, 4] {
            queue.insert(i, &keys);
        }
        assert!(!queue.is_empty());
        assert_eq!(drain(&mut queue, &keys), vec![3, 1, 2, 4, 0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn empty_queue_pops_none() {
        let mut queue = IndexedPriorityQueue::new();
        assert_eq!(queue.pop_min(&[]), None);
    }

    #[test]
    fn equal_keys_pop_in_insertion_order() {
        let keys = [2.0, 2.0, 2.0];
        let mut queue = IndexedPriorityQueue::with_capacity(3);
        queue.insert(2, &keys);
        queue.insert(0, &keys);
        queue.insert(1, &keys);
        assert_eq!(queue.pop_min(&keys), Some(2));
    }

    #[test]
    fn interleaved_insert_and_pop() {
        let keys = [4.0, 2.0, 9.0, 1.0, 7.0];
        let mut queue = IndexedPriorityQueue::new();
        queue.insert(0, &keys);
        queue.insert(2, &keys);
        assert_eq!(queue.pop_min(&keys), Some(0));
        queue.insert(4, &keys);
        queue.insert(3, &keys);
        queue.insert(1, &keys);
        assert_eq!(drain(&mut queue, &keys), vec![3, 1, 4, 2]);
    }

    #[test]
    fn decrease_key_reorders_queued_index() {
        let mut keys = vec![1.0, 5.0, 8.0];
        let mut queue = IndexedPriorityQueue::new();
        for i in 0..3 {
            queue.insert(i, &keys);
        }
        keys[2] = 0.5;
        queue.decrease_key(2, &keys);
        assert_eq!(drain(&mut queue, &keys), vec![2, 0, 1]);
    }

    #[test]
    fn decrease_key_on_absent_index_is_noop() {
        let keys = [1.0, 2.0];
        let mut queue = IndexedPriorityQueue::new();
        queue.insert(1, &keys);
        queue.decrease_key(0, &keys);
        assert_eq!(drain(&mut queue, &keys), vec![1]);
    }
}
