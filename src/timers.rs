use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::event::Event;
use crate::state::Millis;

#[derive(Debug)]
struct Timer {
    due: Millis,
    seq: u64,
    event: Event,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    // reversed: BinaryHeap is a max-heap, the earliest timer must surface first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// One-shot delayed events. Nothing is ever cancelled: a timer fires at its
/// due time whatever happened in between.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Timer>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn schedule(&mut self, due: Millis, event: Event) {
        self.next_seq += 1;
        self.heap.push(Timer {
            due,
            seq: self.next_seq,
            event,
        });
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.heap.peek().map(|timer| timer.due)
    }

    /// Pops the earliest timer if it is due at or before `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<Event> {
        if self.next_due()? > now {
            return None;
        }
        self.heap.pop().map(|timer| timer.event)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
