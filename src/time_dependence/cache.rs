//! Short cache in front of a time dependence.

use super::{ftd, TimeDependence};
use std::sync::Arc;

/// A cached evaluation of a time dependence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheEntry {
    pub time: ftd,
    pub value: ftd,
    pub integral: ftd,
}

/// Ring buffer holding the most recent evaluations of a time dependence.
///
/// A Runge-Kutta step queries the field at a handful of times, often
/// repeatedly, so the buffer only needs to be long enough to hold the
/// distinct times of a single step. Lookups compare times exactly. When a
/// time is missing, the source is evaluated and the result overwrites the
/// slot at the head, which then advances (oldest entry first, regardless of
/// how recently it was read).
///
/// Every slot is always populated: binding a source or resetting fills all
/// slots with the evaluation at time zero. Without a bound source all
/// queries give zero.
///
/// The cache is not meant to be shared between threads; each integration
/// works with its own copy.
#[derive(Clone, Debug)]
pub struct TimeDependenceCache {
    time_dependence: Option<Arc<dyn TimeDependence>>,
    entries: [CacheEntry; Self::CAPACITY],
    head: usize,
}

impl TimeDependenceCache {
    /// Number of evaluations the cache holds.
    pub const CAPACITY: usize = 6;

    /// Creates a cache without any time dependence bound to it.
    pub fn new() -> Self {
        Self {
            time_dependence: None,
            entries: [CacheEntry {
                time: 0.0,
                value: 0.0,
                integral: 0.0,
            }; Self::CAPACITY],
            head: 0,
        }
    }

    /// Creates a cache bound to the given time dependence.
    pub fn with_time_dependence(time_dependence: Arc<dyn TimeDependence>) -> Self {
        let mut cache = Self::new();
        cache.set_time_dependence(time_dependence);
        cache
    }

    /// Binds the cache to a new time dependence and resets it.
    pub fn set_time_dependence(&mut self, time_dependence: Arc<dyn TimeDependence>) {
        self.time_dependence = Some(time_dependence);
        self.reset();
    }

    /// Returns the bound time dependence, if any.
    pub fn time_dependence(&self) -> Option<&Arc<dyn TimeDependence>> {
        self.time_dependence.as_ref()
    }

    /// Moves the head back to the first slot and fills every slot with the
    /// evaluation at time zero.
    pub fn reset(&mut self) {
        self.head = 0;
        if let Some(time_dependence) = &self.time_dependence {
            let initial = CacheEntry {
                time: 0.0,
                value: time_dependence.value(0.0),
                integral: time_dependence.integral(0.0),
            };
            self.entries = [initial; Self::CAPACITY];
        }
    }

    /// Finds the slot holding an evaluation at exactly the given time.
    pub fn find(&self, time: ftd) -> Option<usize> {
        self.entries.iter().position(|entry| entry.time == time)
    }

    /// Returns the value of the time dependence at the given time.
    pub fn value(&mut self, time: ftd) -> ftd {
        self.lookup(time).map_or(0.0, |entry| entry.value)
    }

    /// Returns the integral of the time dependence up to the given time.
    pub fn integral(&mut self, time: ftd) -> ftd {
        self.lookup(time).map_or(0.0, |entry| entry.integral)
    }

    /// Index of the slot that will be overwritten by the next miss.
    pub fn head(&self) -> usize {
        self.head
    }

    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    fn lookup(&mut self, time: ftd) -> Option<CacheEntry> {
        let time_dependence = self.time_dependence.as_ref()?;
        if let Some(idx) = self.find(time) {
            return Some(self.entries[idx]);
        }
        let entry = CacheEntry {
            time,
            value: time_dependence.value(time),
            integral: time_dependence.integral(time),
        };
        self.entries[self.head] = entry;
        self.head = (self.head + 1) % Self::CAPACITY;
        Some(entry)
    }
}

impl Default for TimeDependenceCache {
    fn default() -> Self {
        Self::new()
    }
}
