//! The agent: state plus the three decision capabilities.
//!
//! An [`Agent`] owns its [`AgentState`] and exposes:
//!
//! - **request sizing** -- [`Agent::calculate_request`]
//! - **demand setting** -- [`Agent::negotiate_demand`]
//! - **offer acceptance** -- [`Agent::will_accept_offer`]
//!
//! plus the lifecycle operations driven by the day cycle (resource credit
//! and debit, upkeep, aging, reproduction, reputation updates).
//!
//! The formulas are shared by all profiles; the profile only selects a row
//! of [`crate::profile`]. A dead agent is frozen: every mutating operation
//! is a no-op once `alive` is false.

use rand::Rng;
use whispers_types::{
    AgentId, AgentRecord, AgentState, BoundedWindow, Position, Profile, StrategyTraits,
    COOPERATION_WINDOW, HARVEST_WINDOW, INITIAL_REPUTATION,
};

use crate::config::AgentConfig;
use crate::profile;
use crate::reproduction;
use crate::reputation;

/// Half-width of the uniform jitter added to every request.
pub const REQUEST_JITTER: f64 = 1.0;

/// Reputation treated as neutral when adjusting demands.
const NEUTRAL_REPUTATION: f64 = 0.5;

/// Parameters for creating an agent.
#[derive(Debug, Clone)]
pub struct AgentParams {
    /// Personality archetype.
    pub profile: Profile,
    /// Strategy traits (profile defaults for seed agents).
    pub traits: StrategyTraits,
    /// Starting cell.
    pub position: Position,
    /// Day index of creation.
    pub born_on_day: u64,
    /// Generation number.
    pub generation: u32,
    /// Parent, for offspring.
    pub parent: Option<AgentId>,
    /// Whether the agent is flagged as born today.
    pub newborn: bool,
}

/// An autonomous forager and negotiator.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    state: AgentState,
}

impl Agent {
    /// Create a seed agent (generation 0) with the profile's default traits.
    pub fn seed(
        profile: Profile,
        position: Position,
        config: &AgentConfig,
        rng: &mut impl Rng,
    ) -> Self {
        Self::create(
            AgentParams {
                profile,
                traits: profile::default_traits(profile),
                position,
                born_on_day: 0,
                generation: 0,
                parent: None,
                newborn: false,
            },
            config,
            rng,
        )
    }

    /// Create an agent from explicit parameters.
    ///
    /// The identifier is drawn from `rng` so that runs are reproducible.
    pub fn create(params: AgentParams, config: &AgentConfig, rng: &mut impl Rng) -> Self {
        let id = AgentId::from_random_bytes(rng.random::<u128>().to_le_bytes());
        Self {
            state: AgentState {
                id,
                profile: params.profile,
                age: 0,
                alive: true,
                resources_reserve: 0,
                daily_need: config.daily_need,
                reproduction_reserve: config.reproduction_reserve,
                reproduction_cost: config.reproduction_cost,
                harvest_history: BoundedWindow::with_capacity(HARVEST_WINDOW),
                cooperation_history: BoundedWindow::with_capacity(COOPERATION_WINDOW),
                reputation: INITIAL_REPUTATION,
                traits: params.traits,
                position: params.position,
                newborn: params.newborn,
                generation: params.generation,
                parent: params.parent,
                born_on_day: params.born_on_day,
            },
        }
    }

    /// Wrap an existing state, e.g. one restored from a snapshot.
    ///
    /// The history windows are held to `HARVEST_WINDOW` and
    /// `COOPERATION_WINDOW` whatever capacity the input carried; the oldest
    /// surplus entries are dropped.
    pub fn from_state(mut state: AgentState) -> Self {
        state.harvest_history.set_capacity(HARVEST_WINDOW);
        state.cooperation_history.set_capacity(COOPERATION_WINDOW);
        Self { state }
    }

    /// Borrow the full state.
    pub const fn state(&self) -> &AgentState {
        &self.state
    }

    /// Consume the agent and return its state.
    pub fn into_state(self) -> AgentState {
        self.state
    }

    /// Agent identifier.
    pub const fn id(&self) -> AgentId {
        self.state.id
    }

    /// Personality archetype.
    pub const fn profile(&self) -> Profile {
        self.state.profile
    }

    /// Days lived.
    pub const fn age(&self) -> u32 {
        self.state.age
    }

    /// Whether the agent is alive.
    pub const fn is_alive(&self) -> bool {
        self.state.alive
    }

    /// Whether the agent was born today.
    pub const fn is_newborn(&self) -> bool {
        self.state.newborn
    }

    /// Current reputation in `[0, 1]`.
    pub const fn reputation(&self) -> f64 {
        self.state.reputation
    }

    /// Resources collected today.
    pub const fn resources_reserve(&self) -> u32 {
        self.state.resources_reserve
    }

    /// Strategy traits.
    pub const fn traits(&self) -> &StrategyTraits {
        &self.state.traits
    }

    /// Current grid cell.
    pub const fn position(&self) -> Position {
        self.state.position
    }

    /// Move the agent to a cell.
    pub const fn set_position(&mut self, position: Position) {
        self.state.position = position;
    }

    // -----------------------------------------------------------------------
    // Decision capabilities
    // -----------------------------------------------------------------------

    /// Size today's resource request.
    ///
    /// `fair_share = total_resources / max(population_size, 1)`, scaled by
    /// the request multiplier (and, for adaptive agents, by supply
    /// abundance), plus uniform jitter in `[-1, 1]`. Floored, never below 1.
    pub fn calculate_request(
        &self,
        total_resources: u32,
        population_size: usize,
        rng: &mut impl Rng,
    ) -> u32 {
        let population = count_to_f64(population_size.max(1));
        let total = f64::from(total_resources);
        let fair_share = total / population;

        let params = profile::params(self.state.profile);
        let abundance = params
            .abundance
            .map_or(1.0, |scaling| scaling.factor(total, population));
        let multiplier = self.state.traits.request_multiplier * abundance;

        let jitter = rng.random_range(-REQUEST_JITTER..=REQUEST_JITTER);
        let raw = fair_share.mul_add(multiplier, jitter);
        floor_to_u32(raw).max(1)
    }

    /// The fraction of a shared pool this agent claims from a partner with
    /// the given reputation.
    ///
    /// Demand rises as the partner's reputation falls below 0.5 and drops
    /// as it rises above, scaled by the profile's sensitivity. Greedy
    /// profiles add a share of their greed index. The result is clamped to
    /// the profile's band.
    pub fn negotiate_demand(&self, partner_reputation: f64) -> f64 {
        let params = profile::params(self.state.profile);
        let partner = partner_reputation.clamp(0.0, 1.0);
        let adjustment = params.reputation_sensitivity * (NEUTRAL_REPUTATION - partner);
        let greed = params.greed_weight * self.state.traits.greed_index;
        params.clamp_demand(self.state.traits.negotiation_demand + adjustment + greed)
    }

    /// Decide on a partner's demand.
    ///
    /// The offer is accepted outright when the share left to this agent
    /// (`1 - partner_demand`) meets the acceptance threshold. Otherwise it is
    /// accepted with probability `leniency * partner_reputation`.
    pub fn will_accept_offer(
        &self,
        partner_demand: f64,
        partner_reputation: f64,
        rng: &mut impl Rng,
    ) -> bool {
        let own_share = 1.0 - partner_demand;
        if own_share >= self.state.traits.acceptance_threshold {
            return true;
        }
        let leniency = profile::params(self.state.profile).leniency;
        let chance = probability(leniency * partner_reputation);
        rng.random_bool(chance)
    }

    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    /// Credit resources and log the amount in the harvest history.
    ///
    /// A zero amount leaves the reserve unchanged but still records a zero
    /// so the history keeps one entry per receipt.
    pub fn receive_resources(&mut self, amount: u32) {
        if !self.state.alive {
            return;
        }
        self.state.resources_reserve = self.state.resources_reserve.saturating_add(amount);
        self.state.harvest_history.push(amount);
    }

    /// Debit resources. Returns `false` (and zeroes the reserve) when the
    /// reserve cannot cover `amount`. A zero amount always succeeds.
    pub fn consume_resources(&mut self, amount: u32) -> bool {
        if amount == 0 {
            return true;
        }
        if let Some(left) = self.state.resources_reserve.checked_sub(amount) {
            self.state.resources_reserve = left;
            true
        } else {
            self.state.resources_reserve = 0;
            false
        }
    }

    /// Morning reset: nothing carries over from yesterday, and yesterday's
    /// newborns are no longer new.
    pub fn start_new_day(&mut self) {
        if !self.state.alive {
            return;
        }
        self.state.resources_reserve = 0;
        self.state.newborn = false;
    }

    /// End-of-day survival check against today's intake.
    ///
    /// Returns `true` if the agent is still alive afterwards.
    pub fn perform_daily_upkeep(&mut self) -> bool {
        if !self.state.alive {
            return false;
        }
        if self.state.resources_reserve < self.state.daily_need {
            self.die();
        }
        self.state.alive
    }

    /// Mark the agent dead. Irreversible.
    pub const fn die(&mut self) {
        self.state.alive = false;
    }

    /// Age the agent by one day.
    pub const fn age_step(&mut self) {
        if self.state.alive {
            self.state.age = self.state.age.saturating_add(1);
        }
    }

    // -----------------------------------------------------------------------
    // Reputation and reproduction
    // -----------------------------------------------------------------------

    /// Record a negotiation outcome and recompute reputation.
    pub fn update_reputation(&mut self, success: bool) {
        if self.state.alive {
            reputation::record_outcome(&mut self.state, success);
        }
    }

    /// Alive and holding at least the reproduction reserve.
    pub const fn can_reproduce(&self) -> bool {
        self.state.alive && self.state.resources_reserve >= self.state.reproduction_reserve
    }

    /// Attempt to produce one offspring.
    ///
    /// Returns `None` without side effects when the agent is not eligible.
    /// Otherwise the parent pays `reproduction_cost` and the offspring is
    /// returned, flagged newborn and born on `day`.
    pub fn reproduce(&mut self, mutation_rate: f64, day: u64, rng: &mut impl Rng) -> Option<Self> {
        if !self.can_reproduce() {
            return None;
        }
        let (profile, traits) = reproduction::offspring_traits(&self.state, mutation_rate, rng);
        let config = AgentConfig {
            daily_need: self.state.daily_need,
            reproduction_reserve: self.state.reproduction_reserve,
            reproduction_cost: self.state.reproduction_cost,
        };
        let child = Self::create(
            AgentParams {
                profile,
                traits,
                position: self.state.position,
                born_on_day: day,
                generation: self.state.generation.saturating_add(1),
                parent: Some(self.state.id),
                newborn: true,
            },
            &config,
            rng,
        );
        self.consume_resources(self.state.reproduction_cost);
        Some(child)
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    /// Mean of the last `days` harvest entries; 0.0 with no history.
    pub fn average_harvest(&self, days: usize) -> f64 {
        let recent: Vec<u32> = self.state.harvest_history.recent(days).copied().collect();
        if recent.is_empty() {
            return 0.0;
        }
        let sum: f64 = recent.iter().copied().map(f64::from).sum();
        sum / count_to_f64(recent.len())
    }

    /// How much the agent strives to collect today:
    /// `max(daily_need, round(daily_need * request_multiplier))`.
    pub fn desired_intake_today(&self) -> u32 {
        let need = self.state.daily_need;
        let scaled = (f64::from(need) * self.state.traits.request_multiplier).round();
        need.max(floor_to_u32(scaled))
    }

    /// Flat record for metrics and display consumers.
    pub fn to_record(&self) -> AgentRecord {
        let s = &self.state;
        AgentRecord {
            id: s.id,
            profile: s.profile,
            age: s.age,
            alive: s.alive,
            resources_reserve: s.resources_reserve,
            daily_need: s.daily_need,
            reputation: s.reputation,
            request_multiplier: s.traits.request_multiplier,
            negotiation_demand: s.traits.negotiation_demand,
            acceptance_threshold: s.traits.acceptance_threshold,
            greed_index: s.traits.greed_index,
            reproduction_reserve: s.reproduction_reserve,
            reproduction_cost: s.reproduction_cost,
            generation: s.generation,
        }
    }
}

impl core::fmt::Display for Agent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}(id={}, age={}, alive={})",
            self.state.profile,
            self.state.id.short(),
            self.state.age,
            self.state.alive
        )
    }
}

/// Floor a float into `u32`, saturating at both ends (NaN maps to 0).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn floor_to_u32(value: f64) -> u32 {
    // `as` saturates for out-of-range floats and maps NaN to 0.
    value.floor() as u32
}

/// Convert a count to `f64` (counts here are far below 2^32).
pub(crate) fn count_to_f64(count: usize) -> f64 {
    f64::from(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Clamp into `[0, 1]`, mapping NaN to 0.
pub(crate) fn probability(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
