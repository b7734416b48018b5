//! Min-entropy priority queue.
//!
//! Push-only: there is no decrease-key. When a cell's entropy changes a fresh
//! entry is pushed and the old one stays behind. Every entry carries the mask
//! it was computed from, so a popped entry is stale exactly when the cell's
//! live mask no longer matches that snapshot.

use crate::wave::{count, Mask};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, TryReserveError};

/// One queued cell.
#[derive(Debug, Clone, Copy)]
pub struct HeapEntry {
    pub entropy: f64,
    /// Insertion order, breaks exact entropy ties
    pub counter: u64,
    pub cell: usize,
    /// Cell mask at the time the entry was pushed
    pub mask: Mask,
}

impl HeapEntry {
    /// Whether this entry no longer describes a selectable cell.
    #[inline]
    pub fn is_stale(&self, live_mask: Mask) -> bool {
        self.mask != live_mask || count(live_mask) <= 1
    }

    fn key_cmp(&self, other: &Self) -> Ordering {
        self.entropy
            .total_cmp(&other.entropy)
            .then_with(|| self.counter.cmp(&other.counter))
    }
}

// `BinaryHeap` is a max-heap, so entries order in reverse of their key.
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key_cmp(self)
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

/// Priority queue popping the smallest `(entropy, counter)` first.
#[derive(Debug, Default)]
pub struct EntropyHeap {
    heap: BinaryHeap<HeapEntry>,
    next_counter: u64,
}

impl EntropyHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a heap with room for `capacity` entries up front.
    pub fn with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut heap = BinaryHeap::new();
        heap.try_reserve(capacity)?;
        Ok(Self {
            heap,
            next_counter: 0,
        })
    }

    /// Queue `cell` with the given entropy. Returns the insertion counter
    /// assigned to the entry.
    pub fn push(&mut self, entropy: f64, cell: usize, mask: Mask) -> Result<u64, TryReserveError> {
        self.heap.try_reserve(1)?;
        let counter = self.next_counter;
        self.next_counter += 1;
        self.heap.push(HeapEntry {
            entropy,
            counter,
            cell,
            mask,
        });
        Ok(counter)
    }

    /// Remove and return the entry with the smallest key.
    pub fn pop_min(&mut self) -> Option<HeapEntry> {
        self.heap.pop()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Total entries ever pushed.
    pub fn pushes(&self) -> u64 {
        self.next_counter
    }
}
