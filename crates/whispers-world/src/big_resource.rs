//! The big-resource phase.
//!
//! Some days a large shared resource appears on the grid. It is too large for
//! one forager, so live agents are paired off and each pair negotiates a split
//! of a pool of [`BigResourcePhase::size`] units. This module decides whether
//! the resource appears and who is paired with whom; the negotiation itself
//! belongs to the agents.

use rand::Rng;
use rand::seq::SliceRandom;

/// Configuration of the daily big-resource draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BigResourcePhase {
    probability: f64,
    size: u32,
}

impl BigResourcePhase {
    /// Create a phase with a daily appearance chance and a pool size.
    ///
    /// The chance is clamped into `[0, 1]`; a NaN chance never appears.
    pub fn new(probability: f64, size: u32) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self { probability, size }
    }

    /// A phase that never fires.
    pub const fn disabled() -> Self {
        Self {
            probability: 0.0,
            size: 0,
        }
    }

    /// Daily appearance chance.
    pub const fn probability(&self) -> f64 {
        self.probability
    }

    /// Units in the shared pool.
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Draw whether the big resource appears today.
    ///
    /// Consumes one draw from `rng` even when the answer is certain, so the
    /// random sequence does not depend on the configured chance.
    pub fn appears(&self, rng: &mut impl Rng) -> bool {
        rng.random_bool(self.probability) && self.size > 0
    }

    /// Pair up to `max_pairs` candidates.
    ///
    /// Candidates are shuffled and paired consecutively; an odd one out sits
    /// the round out. Fewer than two candidates yields no pairs.
    pub fn select_pairs<T: Copy>(
        &self,
        candidates: &[T],
        max_pairs: usize,
        rng: &mut impl Rng,
    ) -> Vec<(T, T)> {
        if candidates.len() < 2 || max_pairs == 0 {
            return Vec::new();
        }
        let mut order = candidates.to_vec();
        order.shuffle(rng);
        order
            .chunks_exact(2)
            .filter_map(|pair| match *pair {
                [a, b] => Some((a, b)),
                _ => None,
            })
            .take(max_pairs)
            .collect()
    }
}

impl Default for BigResourcePhase {
    fn default() -> Self {
        Self::disabled()
    }
}
