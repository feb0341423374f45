use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Discrete-event queue keyed on simulation time in milliseconds.
///
/// Events due at the same instant come out in the order they were scheduled.
#[derive(Debug)]
pub struct Schedule<A> {
    heap: BinaryHeap<Entry<A>>,
    next_seq: u64,
}

#[derive(Debug)]
struct Entry<A> {
    at: f64,
    seq: u64,
    action: A,
}

impl<A> PartialEq for Entry<A> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<A> Eq for Entry<A> {}

impl<A> PartialOrd for Entry<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Entry<A> {
    // Reversed so the max-heap pops the earliest entry first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<A> Default for Schedule<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Schedule<A> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, at: f64, action: A) {
        self.heap.push(Entry {
            at,
            seq: self.next_seq,
            action,
        });
        self.next_seq += 1;
    }

    /// Removes and returns the earliest action due at or before `now`.
    pub fn pop_due(&mut self, now: f64) -> Option<(f64, A)> {
        if self.heap.peek()?.at > now {
            return None;
        }
        self.heap.pop().map(|entry| (entry.at, entry.action))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Drops every pending action.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
