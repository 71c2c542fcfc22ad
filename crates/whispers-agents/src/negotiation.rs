//! Single-round bilateral negotiation.
//!
//! Two participants split a pool of `S` units:
//!
//! 1. Each side sets its demand from the other's reputation.
//! 2. Each side decides on the other's demand.
//! 3. If both accept, A receives `floor(S * (1 - demand_B))` and B receives
//!    `floor(S * (1 - demand_A))`. Any rounding remainder is left
//!    unallocated. When the two demands sum to less than one the raw shares
//!    would exceed the pool, so they are scaled down proportionally first.
//! 4. If either rejects, nothing is allocated.
//!
//! There are no counter-offers: exactly one exchange per call. The protocol
//! only needs the three capabilities in [`Negotiator`], so it can be driven by
//! test doubles as well as by [`Agent`].

use rand::Rng;

use crate::agent::{Agent, floor_to_u32};

/// The capabilities a negotiation participant must provide.
pub trait Negotiator {
    /// Current reputation in `[0, 1]`, shown to the partner.
    fn reputation(&self) -> f64;

    /// Fraction of the pool claimed from a partner with this reputation.
    fn negotiate_demand(&self, partner_reputation: f64) -> f64;

    /// Accept or reject the partner's demand.
    fn will_accept_offer(
        &self,
        partner_demand: f64,
        partner_reputation: f64,
        rng: &mut impl Rng,
    ) -> bool;
}

impl Negotiator for Agent {
    fn reputation(&self) -> f64 {
        Self::reputation(self)
    }

    fn negotiate_demand(&self, partner_reputation: f64) -> f64 {
        Self::negotiate_demand(self, partner_reputation)
    }

    fn will_accept_offer(
        &self,
        partner_demand: f64,
        partner_reputation: f64,
        rng: &mut impl Rng,
    ) -> bool {
        Self::will_accept_offer(self, partner_demand, partner_reputation, rng)
    }
}

/// Result of one negotiation round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegotiationOutcome {
    /// Demand made by A.
    pub demand_a: f64,
    /// Demand made by B.
    pub demand_b: f64,
    /// Whether A accepted B's demand.
    pub accepted_a: bool,
    /// Whether B accepted A's demand.
    pub accepted_b: bool,
    /// Units allocated to A (0 on failure).
    pub share_a: u32,
    /// Units allocated to B (0 on failure).
    pub share_b: u32,
    /// Both sides accepted.
    pub success: bool,
}

impl NegotiationOutcome {
    /// Units allocated in total; never exceeds the pool.
    pub const fn allocated(&self) -> u32 {
        self.share_a.saturating_add(self.share_b)
    }
}

/// Run one negotiation round between `a` and `b` over `pool` units.
///
/// Neither participant is mutated. The caller applies the shares and the
/// reputation updates, which keeps the protocol usable on two elements of the
/// same roster.
pub fn negotiate<A, B>(a: &A, b: &B, pool: u32, rng: &mut impl Rng) -> NegotiationOutcome
where
    A: Negotiator,
    B: Negotiator,
{
    let rep_a = a.reputation();
    let rep_b = b.reputation();

    let demand_a = a.negotiate_demand(rep_b);
    let demand_b = b.negotiate_demand(rep_a);

    let accepted_a = a.will_accept_offer(demand_b, rep_b, rng);
    let accepted_b = b.will_accept_offer(demand_a, rep_a, rng);
    let success = accepted_a && accepted_b;

    let (share_a, share_b) = if success {
        split(pool, demand_a, demand_b)
    } else {
        (0, 0)
    };

    tracing::trace!(
        demand_a,
        demand_b,
        accepted_a,
        accepted_b,
        share_a,
        share_b,
        "negotiation round"
    );

    NegotiationOutcome {
        demand_a,
        demand_b,
        accepted_a,
        accepted_b,
        share_a,
        share_b,
        success,
    }
}

/// Floored shares for an accepted deal.
///
/// A's fraction is what B leaves (`1 - demand_b`), and vice versa. If the
/// fractions sum past one they are normalized so the pool is never
/// over-allocated.
pub fn split(pool: u32, demand_a: f64, demand_b: f64) -> (u32, u32) {
    let frac_a = (1.0 - demand_b).clamp(0.0, 1.0);
    let frac_b = (1.0 - demand_a).clamp(0.0, 1.0);
    let total = frac_a + frac_b;
    let (frac_a, frac_b) = if total > 1.0 {
        (frac_a / total, frac_b / total)
    } else {
        (frac_a, frac_b)
    };

    let share_a = floor_share(pool, frac_a).min(pool);
    let share_b = floor_share(pool, frac_b).min(pool.saturating_sub(share_a));
    (share_a, share_b)
}

/// Slack added before flooring so that `1.0 - 0.9` (stored as
/// `0.09999999999999998`) still yields a whole unit of ten.
const FLOOR_EPSILON: f64 = 1e-9;

/// `floor(pool * fraction)`, tolerant of representation error in `fraction`.
fn floor_share(pool: u32, fraction: f64) -> u32 {
    floor_to_u32(f64::from(pool).mul_add(fraction, FLOOR_EPSILON))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use whispers_types::{Position, Profile};

    use super::*;
    use crate::config::AgentConfig;

    /// A participant with fixed answers.
    struct Fixed {
        reputation: f64,
        demand: f64,
        accepts: bool,
    }

    impl Negotiator for Fixed {
        fn reputation(&self) -> f64 {
            self.reputation
        }

        fn negotiate_demand(&self, _partner_reputation: f64) -> f64 {
            self.demand
        }

        fn will_accept_offer(&self, _: f64, _: f64, _rng: &mut impl Rng) -> bool {
            self.accepts
        }
    }

    fn fixed(demand: f64, accepts: bool) -> Fixed {
        Fixed {
            reputation: 0.5,
            demand,
            accepts,
        }
    }

    #[test]
    fn both_accept_splits_by_partner_demand() {
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = negotiate(&fixed(0.6, true), &fixed(0.4, true), 10, &mut rng);
        assert!(outcome.success);
        // A gets 1 - 0.4, B gets 1 - 0.6.
        assert_eq!(outcome.share_a, 6);
        assert_eq!(outcome.share_b, 4);
    }

    #[test]
    fn rounding_remainder_is_unallocated() {
        let mut rng = SmallRng::seed_from_u64(2);
        let outcome = negotiate(&fixed(0.55, true), &fixed(0.55, true), 10, &mut rng);
        assert!(outcome.success);
        assert_eq!(outcome.share_a, 4);
        assert_eq!(outcome.share_b, 4);
        assert_eq!(outcome.allocated(), 8);
    }

    #[test]
    fn modest_demands_never_over_allocate() {
        let mut rng = SmallRng::seed_from_u64(3);
        let outcome = negotiate(&fixed(0.3, true), &fixed(0.3, true), 10, &mut rng);
        assert!(outcome.success);
        assert!(outcome.allocated() <= 10);
        assert_eq!(outcome.share_a, 5);
        assert_eq!(outcome.share_b, 5);
    }

    #[test]
    fn any_rejection_fails_with_no_allocation() {
        let mut rng = SmallRng::seed_from_u64(4);
        for (a_ok, b_ok) in [(true, false), (false, true), (false, false)] {
            let outcome = negotiate(&fixed(0.5, a_ok), &fixed(0.5, b_ok), 10, &mut rng);
            assert!(!outcome.success);
            assert_eq!(outcome.allocated(), 0);
            assert_eq!(outcome.accepted_a, a_ok);
            assert_eq!(outcome.accepted_b, b_ok);
        }
    }

    #[test]
    fn empty_pool_allocates_nothing() {
        let mut rng = SmallRng::seed_from_u64(5);
        let outcome = negotiate(&fixed(0.5, true), &fixed(0.5, true), 0, &mut rng);
        assert!(outcome.success);
        assert_eq!(outcome.allocated(), 0);
    }

    #[test]
    fn split_floors_exact_tenths_without_losing_a_unit() {
        assert_eq!(split(10, 0.5, 0.9), (1, 5));
        assert_eq!(split(10, 0.5, 0.8), (2, 5));
        assert_eq!(split(10, 0.9, 0.7), (3, 1));
        assert_eq!(split(100, 0.7, 0.9), (10, 30));
    }

    #[test]
    fn split_at_self_interested_ceiling_pays_the_partner() {
        // A reputation-0 partner pushes a self-interested demand to 0.9.
        let mut rng = SmallRng::seed_from_u64(8);
        let outcome = negotiate(&fixed(0.5, true), &fixed(0.9, true), 10, &mut rng);
        assert!(outcome.success);
        assert_eq!(outcome.share_a, 1);
        assert_eq!(outcome.share_b, 5);
    }

    #[test]
    fn split_is_bounded_for_any_demands() {
        for a in 0..=10_u32 {
            for b in 0..=10_u32 {
                let (sa, sb) = split(7, f64::from(a) / 10.0, f64::from(b) / 10.0);
                assert!(sa.saturating_add(sb) <= 7);
            }
        }
    }

    #[test]
    fn agents_negotiate_with_demands_in_band() {
        let mut rng = SmallRng::seed_from_u64(6);
        let cfg = AgentConfig::default();
        let a = Agent::seed(Profile::Cooperative, Position::default(), &cfg, &mut rng);
        let b = Agent::seed(Profile::SelfInterested, Position::default(), &cfg, &mut rng);
        for _ in 0..100 {
            let outcome = negotiate(&a, &b, 10, &mut rng);
            assert!((0.3..=0.7).contains(&outcome.demand_a));
            assert!((0.5..=0.9).contains(&outcome.demand_b));
            assert!(outcome.allocated() <= 10);
            assert_eq!(outcome.success, outcome.accepted_a && outcome.accepted_b);
        }
    }

    #[test]
    fn two_cooperators_always_agree() {
        // Demand 0.5 leaves 0.5 >= threshold 0.3 on both sides.
        let mut rng = SmallRng::seed_from_u64(7);
        let cfg = AgentConfig::default();
        let a = Agent::seed(Profile::Cooperative, Position::default(), &cfg, &mut rng);
        let b = Agent::seed(Profile::Cooperative, Position::default(), &cfg, &mut rng);
        let outcome = negotiate(&a, &b, 10, &mut rng);
        assert!(outcome.success);
        assert_eq!(outcome.share_a, 5);
        assert_eq!(outcome.share_b, 5);
    }
}
