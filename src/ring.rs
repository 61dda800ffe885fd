// src/ring.rs
//! Fixed-capacity ring buffer shared by every bounded cache in the pipeline
//! (controller smoothing, ground heights, safe positions, prevention reasons).
//!
//! Storage is allocated once at construction; pushing past capacity
//! overwrites the oldest entry.

#[derive(Debug, Clone)]
pub struct RingBuffer<T: Copy + Default> {
    slots: Vec<T>,
    head: usize, // next slot to write
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Capacity is raised to 1 if zero is requested.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![T::default(); capacity],
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Append a value, evicting the oldest one when full.
    pub fn push(&mut self, value: T) {
        self.slots[self.head] = value;
        self.head = (self.head + 1) % self.slots.len();
        if self.len < self.slots.len() {
            self.len += 1;
        }
    }

    /// Remove and return the newest value.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.head = (self.head + self.slots.len() - 1) % self.slots.len();
        self.len -= 1;
        Some(self.slots[self.head])
    }

    pub fn latest(&self) -> Option<T> {
        self.nth_back(0)
    }

    pub fn oldest(&self) -> Option<T> {
        self.iter().next()
    }

    /// `nth_back(0)` is the newest entry.
    pub fn nth_back(&self, n: usize) -> Option<T> {
        if n >= self.len {
            return None;
        }
        let cap = self.slots.len();
        Some(self.slots[(self.head + cap - 1 - n) % cap])
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        let cap = self.slots.len();
        let start = (self.head + cap - self.len) % cap;
        (0..self.len).map(move |i| self.slots[(start + i) % cap])
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Change capacity, keeping the newest entries that still fit.
    pub fn resize(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        if capacity == self.slots.len() {
            return;
        }
        let keep = self.len.min(capacity);
        let mut kept: Vec<T> = self.iter().skip(self.len - keep).collect();
        kept.resize(capacity, T::default());
        self.slots = kept;
        self.len = keep;
        self.head = keep % capacity;
    }
}
