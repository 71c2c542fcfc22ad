//! Reputation smoothing.
//!
//! Reputation is the exponentially smoothed cooperation rate of an agent:
//!
//! ```text
//! reputation = 0.9 * reputation + 0.1 * mean(cooperation_history)
//! ```
//!
//! where `cooperation_history` is the bounded window of the last 20
//! negotiation outcomes. It is never assigned directly.
//!
//! # Invariants
//!
//! - Reputation stays in `[0.0, 1.0]`.
//! - The window never holds more than 20 outcomes.

use whispers_types::{AgentState, BoundedWindow};

/// Weight kept from the previous reputation on each update.
pub const RETAIN_WEIGHT: f64 = 0.9;

/// Weight given to the current window mean on each update.
pub const LEARN_WEIGHT: f64 = 0.1;

/// Fraction of `true` outcomes in the window, or `None` when it is empty.
pub fn cooperation_rate(history: &BoundedWindow<bool>) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let successes = history.iter().filter(|&&ok| ok).count();
    Some(ratio(successes, history.len()))
}

/// Record one negotiation outcome and recompute the reputation.
pub fn record_outcome(state: &mut AgentState, success: bool) {
    state.cooperation_history.push(success);
    if let Some(rate) = cooperation_rate(&state.cooperation_history) {
        let smoothed = RETAIN_WEIGHT.mul_add(state.reputation, LEARN_WEIGHT * rate);
        state.reputation = smoothed.clamp(0.0, 1.0);
    }
}

/// `part / whole` for window counts, which always fit in a `u32`.
fn ratio(part: usize, whole: usize) -> f64 {
    let part = u32::try_from(part).unwrap_or(u32::MAX);
    let whole = u32::try_from(whole).unwrap_or(u32::MAX).max(1);
    f64::from(part) / f64::from(whole)
}
