//! Per-profile parameter table.
//!
//! The three profiles share one set of decision formulas (see
//! [`crate::agent`]); what differs between them is only the numbers in this
//! table. Adding a profile means adding a row, not a new type.
//!
//! | Profile | multiplier | demand | threshold | greed | band | sensitivity | leniency |
//! |---|---|---|---|---|---|---|---|
//! | cooperative | 0.7 | 0.5 | 0.3 | 0.2 | 0.3--0.7 | 0.05 | 0.5 |
//! | self-interested | 1.5 | 0.7 | 0.4 | 0.8 | 0.5--0.9 | 0.4 | 0.1 |
//! | adaptive | 1.0 | 0.55 | 0.35 | 0.5 | 0.4--0.7 | 0.2 | 0.3 |

use whispers_types::{Profile, StrategyTraits};

/// Resource-abundance scaling applied to an adaptive agent's request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbundanceScaling {
    /// Above `abundant_ratio * population` total resources, scale up.
    pub abundant_ratio: f64,
    /// Below `scarce_ratio * population` total resources, scale down.
    pub scarce_ratio: f64,
    /// Multiplier used when resources are abundant.
    pub abundant_factor: f64,
    /// Multiplier used when resources are scarce.
    pub scarce_factor: f64,
}

impl AbundanceScaling {
    /// Request factor for the given supply and population.
    pub fn factor(&self, total_resources: f64, population: f64) -> f64 {
        if total_resources > self.abundant_ratio * population {
            self.abundant_factor
        } else if total_resources < self.scarce_ratio * population {
            self.scarce_factor
        } else {
            1.0
        }
    }
}

/// Decision parameters for one profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileParams {
    /// Trait values given to seed agents and to mutated offspring.
    pub defaults: StrategyTraits,
    /// Lowest demand the profile will ever make.
    pub demand_floor: f64,
    /// Highest demand the profile will ever make.
    pub demand_ceiling: f64,
    /// How far demand moves per unit of partner reputation below 0.5.
    pub reputation_sensitivity: f64,
    /// Weight of `greed_index` added on top of the base demand.
    pub greed_weight: f64,
    /// Chance scale for accepting a below-threshold offer, multiplied by
    /// the partner's reputation.
    pub leniency: f64,
    /// Request scaling by supply; only the adaptive profile has one.
    pub abundance: Option<AbundanceScaling>,
}

impl ProfileParams {
    /// Clamp a raw demand into this profile's band.
    pub fn clamp_demand(&self, demand: f64) -> f64 {
        demand.clamp(self.demand_floor, self.demand_ceiling)
    }
}

const COOPERATIVE: ProfileParams = ProfileParams {
    defaults: StrategyTraits {
        request_multiplier: 0.7,
        negotiation_demand: 0.5,
        acceptance_threshold: 0.3,
        greed_index: 0.2,
    },
    demand_floor: 0.3,
    demand_ceiling: 0.7,
    reputation_sensitivity: 0.05,
    greed_weight: 0.0,
    leniency: 0.5,
    abundance: None,
};

const SELF_INTERESTED: ProfileParams = ProfileParams {
    defaults: StrategyTraits {
        request_multiplier: 1.5,
        negotiation_demand: 0.7,
        acceptance_threshold: 0.4,
        greed_index: 0.8,
    },
    demand_floor: 0.5,
    demand_ceiling: 0.9,
    reputation_sensitivity: 0.4,
    greed_weight: 0.1,
    leniency: 0.1,
    abundance: None,
};

const ADAPTIVE: ProfileParams = ProfileParams {
    defaults: StrategyTraits {
        request_multiplier: 1.0,
        negotiation_demand: 0.55,
        acceptance_threshold: 0.35,
        greed_index: 0.5,
    },
    demand_floor: 0.4,
    demand_ceiling: 0.7,
    reputation_sensitivity: 0.2,
    greed_weight: 0.0,
    leniency: 0.3,
    abundance: Some(AbundanceScaling {
        abundant_ratio: 10.0,
        scarce_ratio: 3.0,
        abundant_factor: 1.2,
        scarce_factor: 0.8,
    }),
};

/// Look up the parameter row for a profile.
pub const fn params(profile: Profile) -> &'static ProfileParams {
    match profile {
        Profile::Cooperative => &COOPERATIVE,
        Profile::SelfInterested => &SELF_INTERESTED,
        Profile::Adaptive => &ADAPTIVE,
    }
}

/// Default strategy traits for a profile.
pub const fn default_traits(profile: Profile) -> StrategyTraits {
    params(profile).defaults
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_demands_sit_inside_their_band() {
        for profile in Profile::ALL {
            let p = params(profile);
            let demand = p.defaults.negotiation_demand;
            assert!(demand >= p.demand_floor && demand <= p.demand_ceiling);
        }
    }

    #[test]
    fn request_multipliers_are_ordered_by_profile() {
        let coop = default_traits(Profile::Cooperative).request_multiplier;
        let adaptive = default_traits(Profile::Adaptive).request_multiplier;
        let selfish = default_traits(Profile::SelfInterested).request_multiplier;
        assert!(coop < adaptive && adaptive < selfish);
    }

    #[test]
    fn only_adaptive_scales_by_abundance() {
        assert!(params(Profile::Cooperative).abundance.is_none());
        assert!(params(Profile::SelfInterested).abundance.is_none());
        assert!(params(Profile::Adaptive).abundance.is_some());
    }

    #[test]
    fn abundance_factor_thresholds() {
        let Some(scaling) = params(Profile::Adaptive).abundance else {
            return;
        };
        assert!((scaling.factor(101.0, 10.0) - 1.2).abs() < 1e-12);
        assert!((scaling.factor(100.0, 10.0) - 1.0).abs() < 1e-12);
        assert!((scaling.factor(30.0, 10.0) - 1.0).abs() < 1e-12);
        assert!((scaling.factor(29.0, 10.0) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn clamp_demand_respects_band() {
        let p = params(Profile::SelfInterested);
        assert!((p.clamp_demand(0.1) - 0.5).abs() < 1e-12);
        assert!((p.clamp_demand(1.5) - 0.9).abs() < 1e-12);
        assert!((p.clamp_demand(0.6) - 0.6).abs() < 1e-12);
    }
}
