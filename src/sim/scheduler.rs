//! Single-threaded event queue.
//!
//! Events are ordered by timestamp, then by phase, then by the order in which
//! they were scheduled. Network activity runs in the [`Phase::Network`] phase;
//! timer expirations run in [`Phase::Timer`], after every network event that
//! shares their timestamp, even ones scheduled after the timer was armed.

use super::time::SimTime;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Sub-ordering of events that share a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Network,
    Timer,
}

struct Entry<E> {
    at: SimTime,
    phase: Phase,
    seq: u64,
    event: E,
}

impl<E> Entry<E> {
    fn key(&self) -> (SimTime, Phase, u64) {
        (self.at, self.phase, self.seq)
    }
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    // BinaryHeap is a max-heap; invert so the earliest key pops first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

/// Totally ordered stream of scheduled events with a simulated clock.
pub struct EventQueue<E> {
    heap: BinaryHeap<Entry<E>>,
    now: SimTime,
    next_seq: u64,
    processed: u64,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        EventQueue {
            heap: BinaryHeap::new(),
            now: SimTime::ZERO,
            next_seq: 0,
            processed: 0,
        }
    }

    /// Current simulated time: the timestamp of the last event popped.
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of events popped so far.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Schedule a network-phase event. Times in the past are moved to `now`.
    pub fn schedule_at(&mut self, at: SimTime, event: E) {
        self.push(at, Phase::Network, event);
    }

    /// Schedule a timer expiration at `at`.
    pub fn schedule_timer_at(&mut self, at: SimTime, event: E) {
        self.push(at, Phase::Timer, event);
    }

    fn push(&mut self, at: SimTime, phase: Phase, event: E) {
        let at = if at < self.now {
            log::warn!("Event scheduled in the past ({} < {}), running it now", at, self.now);
            self.now
        } else {
            at
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { at, phase, seq, event });
    }

    /// Timestamp of the next event without removing it.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|entry| entry.at)
    }

    /// Pop the next event and advance the clock to its timestamp.
    pub fn pop(&mut self) -> Option<(SimTime, E)> {
        let entry = self.heap.pop()?;
        self.now = entry.at;
        self.processed += 1;
        Some((entry.at, entry.event))
    }

    /// Pop the next event only if it is strictly before `horizon`.
    pub fn pop_before(&mut self, horizon: SimTime) -> Option<(SimTime, E)> {
        match self.peek_time() {
            Some(at) if at < horizon => self.pop(),
            _ => None,
        }
    }

    /// Discard every pending event, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.heap.len();
        self.heap.clear();
        dropped
    }
}
