//! Fixed-capacity sliding window with drop-oldest semantics.
//!
//! Agent histories (harvests, cooperation outcomes) only ever look at the
//! most recent N entries. [`BoundedWindow`] keeps exactly that: pushing
//! into a full window evicts the oldest entry first, and storage never grows
//! past the capacity.
//!
//! Deserialization goes through [`WindowRepr`] so that a window read back
//! from a snapshot is trimmed to its capacity even if the input was not.
//! The capacity itself comes from the input; owners that fix it (agent
//! histories) re-impose theirs with [`BoundedWindow::set_capacity`].

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A bounded, ordered window of the most recent values (oldest first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WindowRepr<T>", into = "WindowRepr<T>")]
#[serde(bound(serialize = "T: Clone + Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct BoundedWindow<T> {
    capacity: usize,
    items: VecDeque<T>,
}

/// Serialized form of a [`BoundedWindow`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowRepr<T> {
    /// Maximum number of retained values.
    pub capacity: usize,
    /// Retained values, oldest first.
    pub items: Vec<T>,
}

impl<T> BoundedWindow<T> {
    /// Create an empty window holding at most `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a value, evicting the oldest one if the window is full.
    ///
    /// A zero-capacity window accepts and immediately discards the value.
    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(value);
    }

    /// Change the capacity, dropping the oldest values that no longer fit.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        let excess = self.items.len().saturating_sub(capacity);
        self.items.drain(..excess);
    }

    /// Maximum number of retained values.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of values currently retained.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the window holds no values.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    /// The most recent `n` values, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> {
        self.items.iter().skip(self.items.len().saturating_sub(n))
    }

    /// The most recently pushed value.
    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }
}

impl<T> From<WindowRepr<T>> for BoundedWindow<T> {
    fn from(repr: WindowRepr<T>) -> Self {
        // Allocation follows the items actually present, never the claimed
        // capacity.
        let excess = repr.items.len().saturating_sub(repr.capacity);
        Self {
            capacity: repr.capacity,
            items: repr.items.into_iter().skip(excess).collect(),
        }
    }
}

impl<T: Clone> From<BoundedWindow<T>> for WindowRepr<T> {
    fn from(window: BoundedWindow<T>) -> Self {
        Self {
            capacity: window.capacity,
            items: window.items.into_iter().collect(),
        }
    }
}
