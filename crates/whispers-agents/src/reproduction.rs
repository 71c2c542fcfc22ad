//! Offspring trait inheritance.
//!
//! With probability `mutation_rate` the offspring switches to one of the two
//! other profiles and takes that profile's default traits. Otherwise it keeps
//! the parent's profile and inherits the parent's traits, each perturbed by a
//! small uniform step and clamped back into its valid range.

use rand::Rng;
use rand::seq::IndexedRandom;
use whispers_types::{AgentState, Profile, StrategyTraits};

use crate::agent::probability;
use crate::profile;

/// Perturbation half-width for `request_multiplier` and `greed_index`.
pub const WIDE_STEP: f64 = 0.1;

/// Perturbation half-width for `negotiation_demand` and `acceptance_threshold`.
pub const NARROW_STEP: f64 = 0.05;

/// Valid range of `request_multiplier`.
pub const MULTIPLIER_RANGE: (f64, f64) = (0.1, 3.0);

/// Profile and traits for a new offspring of `parent`.
///
/// A non-finite or out-of-range `mutation_rate` is clamped to `[0, 1]`
/// (NaN counts as 0).
pub fn offspring_traits(
    parent: &AgentState,
    mutation_rate: f64,
    rng: &mut impl Rng,
) -> (Profile, StrategyTraits) {
    if rng.random_bool(probability(mutation_rate)) {
        let others = parent.profile.others();
        if let Some(&profile) = others.choose(rng) {
            return (profile, profile::default_traits(profile));
        }
    }
    (parent.profile, perturb(&parent.traits, rng))
}

/// Inherit `traits` with a uniform step on each value, then clamp.
pub fn perturb(traits: &StrategyTraits, rng: &mut impl Rng) -> StrategyTraits {
    clamp_traits(StrategyTraits {
        request_multiplier: traits.request_multiplier + rng.random_range(-WIDE_STEP..=WIDE_STEP),
        negotiation_demand: traits.negotiation_demand
            + rng.random_range(-NARROW_STEP..=NARROW_STEP),
        acceptance_threshold: traits.acceptance_threshold
            + rng.random_range(-NARROW_STEP..=NARROW_STEP),
        greed_index: traits.greed_index + rng.random_range(-WIDE_STEP..=WIDE_STEP),
    })
}

/// Pull every trait back into its valid range.
pub fn clamp_traits(traits: StrategyTraits) -> StrategyTraits {
    StrategyTraits {
        request_multiplier: traits
            .request_multiplier
            .clamp(MULTIPLIER_RANGE.0, MULTIPLIER_RANGE.1),
        negotiation_demand: traits.negotiation_demand.clamp(0.0, 1.0),
        acceptance_threshold: traits.acceptance_threshold.clamp(0.0, 1.0),
        greed_index: traits.greed_index.clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use whispers_types::Position;

    use super::*;
    use crate::agent::Agent;
    use crate::config::AgentConfig;

    fn parent(profile: Profile) -> AgentState {
        let mut rng = SmallRng::seed_from_u64(11);
        Agent::seed(profile, Position::default(), &AgentConfig::default(), &mut rng).into_state()
    }

    #[test]
    fn zero_mutation_keeps_profile_and_stays_close() {
        let mut rng = SmallRng::seed_from_u64(1);
        let p = parent(Profile::Adaptive);
        for _ in 0..200 {
            let (profile, t) = offspring_traits(&p, 0.0, &mut rng);
            assert_eq!(profile, Profile::Adaptive);
            assert!((t.request_multiplier - p.traits.request_multiplier).abs() <= WIDE_STEP + 1e-12);
            assert!((t.greed_index - p.traits.greed_index).abs() <= WIDE_STEP + 1e-12);
            assert!(
                (t.negotiation_demand - p.traits.negotiation_demand).abs() <= NARROW_STEP + 1e-12
            );
            assert!(
                (t.acceptance_threshold - p.traits.acceptance_threshold).abs()
                    <= NARROW_STEP + 1e-12
            );
        }
    }

    #[test]
    fn full_mutation_always_switches_profile() {
        let mut rng = SmallRng::seed_from_u64(2);
        for profile in Profile::ALL {
            let p = parent(profile);
            for _ in 0..50 {
                let (child, traits) = offspring_traits(&p, 1.0, &mut rng);
                assert_ne!(child, profile);
                assert_eq!(traits, profile::default_traits(child));
            }
        }
    }

    #[test]
    fn mutation_reaches_both_other_profiles() {
        let mut rng = SmallRng::seed_from_u64(5);
        for profile in Profile::ALL {
            let p = parent(profile);
            let [first, second] = profile.others();
            let (mut to_first, mut to_second) = (0_u32, 0_u32);
            for _ in 0..400 {
                let (child, _) = offspring_traits(&p, 1.0, &mut rng);
                if child == first {
                    to_first = to_first.saturating_add(1);
                } else if child == second {
                    to_second = to_second.saturating_add(1);
                }
            }
            assert_eq!(to_first.saturating_add(to_second), 400);
            // Uniform choice: each side lands near 200.
            assert!(to_first > 120 && to_second > 120, "{profile}: {to_first}/{to_second}");
        }
    }

    #[test]
    fn nonsense_rates_are_tolerated() {
        let mut rng = SmallRng::seed_from_u64(3);
        let p = parent(Profile::Cooperative);
        let (profile, _) = offspring_traits(&p, f64::NAN, &mut rng);
        assert_eq!(profile, Profile::Cooperative);
        let (profile, _) = offspring_traits(&p, -2.0, &mut rng);
        assert_eq!(profile, Profile::Cooperative);
        let (profile, _) = offspring_traits(&p, 7.0, &mut rng);
        assert_ne!(profile, Profile::Cooperative);
    }

    #[test]
    fn clamp_traits_bounds_every_field() {
        let wild = StrategyTraits {
            request_multiplier: 9.0,
            negotiation_demand: -1.0,
            acceptance_threshold: 2.0,
            greed_index: -0.5,
        };
        let t = clamp_traits(wild);
        assert!((t.request_multiplier - 3.0).abs() < 1e-12);
        assert!(t.negotiation_demand.abs() < 1e-12);
        assert!((t.acceptance_threshold - 1.0).abs() < 1e-12);
        assert!(t.greed_index.abs() < 1e-12);

        let low = clamp_traits(StrategyTraits {
            request_multiplier: 0.0,
            ..wild
        });
        assert!((low.request_multiplier - 0.1).abs() < 1e-12);
    }

    #[test]
    fn repeated_inheritance_stays_in_range() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut traits = profile::default_traits(Profile::SelfInterested);
        for _ in 0..1000 {
            traits = perturb(&traits, &mut rng);
            assert!((0.1..=3.0).contains(&traits.request_multiplier));
            assert!((0.0..=1.0).contains(&traits.negotiation_demand));
            assert!((0.0..=1.0).contains(&traits.acceptance_threshold));
            assert!((0.0..=1.0).contains(&traits.greed_index));
        }
    }
}
