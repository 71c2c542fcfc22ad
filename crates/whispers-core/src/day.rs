//! Day cycle: the five-phase loop that advances the Whispers simulation.
//!
//! Each day runs through these phases in order:
//!
//! 1. **Start day** -- every live agent's reserve resets to zero (nothing
//!    carries over) and the grid is re-spawned.
//!
//! 2. **Forage and negotiate** -- live agents, in a per-day shuffled order,
//!    collect resources round-robin up to their quota; then, if the big
//!    resource appears, paired agents negotiate over shared pools.
//!
//! 3. **Upkeep** -- every live agent that collected less than its daily need
//!    dies. Dead agents stay in the roster.
//!
//! 4. **Reproduce** -- eligible agents produce offspring, subject to the
//!    daily birth cap and the population cap.
//!
//! 5. **Advance** -- every live agent ages by one day.
//!
//! No phase is retried and none can be interrupted, so the roster is always
//! consistent between days. An empty roster simply advances.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, trace};
use whispers_agents::{Agent, negotiate};
use whispers_world::{BigResourcePhase, Environment};

use crate::accounting::{self, AccountingResult, DailyLedger};

/// The phases of one day, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayPhase {
    /// Reset reserves and spawn resources.
    StartDay,
    /// Forage, then negotiate over the big resource.
    ForageAndNegotiate,
    /// Starvation check.
    Upkeep,
    /// Births.
    Reproduce,
    /// Aging.
    Advance,
}

impl DayPhase {
    /// Phase entered at the start of every day.
    pub const FIRST: Self = Self::StartDay;

    /// The phase after this one, or `None` once the day is complete.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::StartDay => Some(Self::ForageAndNegotiate),
            Self::ForageAndNegotiate => Some(Self::Upkeep),
            Self::Upkeep => Some(Self::Reproduce),
            Self::Reproduce => Some(Self::Advance),
            Self::Advance => None,
        }
    }
}

impl core::fmt::Display for DayPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::StartDay => "start_day",
            Self::ForageAndNegotiate => "forage_and_negotiate",
            Self::Upkeep => "upkeep",
            Self::Reproduce => "reproduce",
            Self::Advance => "advance",
        })
    }
}

/// Per-day parameters drawn from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaySettings {
    /// Chance an offspring switches profile.
    pub mutation_rate: f64,
    /// Births allowed per day.
    pub max_offspring_per_day: Option<u32>,
    /// Live population above which births stop.
    pub max_population: Option<u32>,
    /// Big-resource draw and pool size.
    pub big_resource: BigResourcePhase,
    /// Pairs that negotiate on a big-resource day.
    pub max_pairs_per_day: usize,
}

/// Counters gathered while a day runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayTally {
    /// Offspring created.
    pub births: u32,
    /// Agents that died at upkeep.
    pub deaths: u32,
    /// Resources spawned this morning.
    pub resources_spawned: u32,
    /// Resources collected by foraging.
    pub resources_collected: u32,
    /// Units handed out by negotiations.
    pub resources_negotiated: u32,
    /// Negotiation rounds played.
    pub negotiations_attempted: u32,
    /// Negotiation rounds that ended in a split.
    pub negotiations_succeeded: u32,
    /// Whether the big resource appeared.
    pub big_resource_appeared: bool,
    /// Accounting totals for the day.
    pub ledger: DailyLedger,
}

/// Run one full day over `agents` and `environment`.
///
/// `day_number` is the 1-based index of the day being simulated; offspring
/// record it as their birth day.
pub fn run_day(
    day_number: u64,
    agents: &mut Vec<Agent>,
    environment: &mut Environment,
    settings: &DaySettings,
    rng: &mut impl Rng,
) -> DayTally {
    let mut tally = DayTally::default();
    let mut phase = Some(DayPhase::FIRST);
    while let Some(current) = phase {
        trace!(day = day_number, phase = %current, "entering phase");
        match current {
            DayPhase::StartDay => start_day(agents, environment, rng, &mut tally),
            DayPhase::ForageAndNegotiate => {
                forage(agents, environment, rng, &mut tally);
                negotiate_big_resource(agents, settings, rng, &mut tally);
            }
            DayPhase::Upkeep => upkeep(agents, &mut tally),
            DayPhase::Reproduce => reproduce(day_number, agents, settings, rng, &mut tally),
            DayPhase::Advance => advance(agents),
        }
        phase = current.next();
    }

    if let AccountingResult::Anomaly(anomalies) = accounting::verify_day(day_number, &tally.ledger)
    {
        debug!(day = day_number, count = anomalies.len(), "accounting anomalies recorded");
    }
    tally
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Reset every live agent for the morning and re-spawn the grid.
pub fn start_day(
    agents: &mut [Agent],
    environment: &mut Environment,
    rng: &mut impl Rng,
    tally: &mut DayTally,
) {
    for agent in agents.iter_mut() {
        agent.start_new_day();
    }
    let spawned = environment.spawn_resources(rng);
    tally.resources_spawned = spawned;
    tally.ledger.spawned = u64::from(spawned);
}

/// Round-robin foraging.
///
/// Each live agent's quota is the larger of its request and its desired
/// intake. Every round, each agent short of its quota walks to the nearest
/// uncollected resource and collects it. Rounds stop once every quota is met
/// or the grid is empty. Each agent is then credited once with its total.
pub fn forage(
    agents: &mut [Agent],
    environment: &mut Environment,
    rng: &mut impl Rng,
    tally: &mut DayTally,
) {
    let mut order = live_indices(agents);
    order.shuffle(rng);
    let population = order.len();
    let available = u32::try_from(environment.available_count()).unwrap_or(u32::MAX);

    // (roster index, quota, gathered)
    let mut foragers: Vec<(usize, u32, u32)> = order
        .iter()
        .filter_map(|&index| {
            let agent = agents.get(index)?;
            let request = agent.calculate_request(available, population, rng);
            Some((index, request.max(agent.desired_intake_today()), 0))
        })
        .collect();

    'rounds: loop {
        let mut progressed = false;
        for (index, quota, gathered) in &mut foragers {
            if *gathered >= *quota {
                continue;
            }
            let Some(agent) = agents.get_mut(*index) else {
                continue;
            };
            let Some(resource_index) = environment.closest_index(agent.position()) else {
                break 'rounds;
            };
            if let Some(resource) = environment.resources().get(resource_index) {
                agent.set_position(resource.position);
            }
            let value = environment.collect_resource(resource_index).unwrap_or(0);
            *gathered = gathered.saturating_add(value);
            progressed = true;
        }
        if !progressed {
            break;
        }
    }

    for (index, _, gathered) in foragers {
        if let Some(agent) = agents.get_mut(index) {
            agent.receive_resources(gathered);
        }
        tally.resources_collected = tally.resources_collected.saturating_add(gathered);
    }
    tally.ledger.foraged = u64::from(tally.resources_collected);
    tally.ledger.collected_on_grid = u64::try_from(environment.collected_count()).unwrap_or(u64::MAX);
    debug!(
        foragers = population,
        collected = tally.resources_collected,
        left = environment.available_count(),
        "foraging complete"
    );
}

/// Big-resource negotiations.
///
/// If the big resource appears, live agents are paired and each pair plays
/// one negotiation round over a fresh pool. Both partners record the outcome
/// in their reputation; on success each is credited its share.
pub fn negotiate_big_resource(
    agents: &mut [Agent],
    settings: &DaySettings,
    rng: &mut impl Rng,
    tally: &mut DayTally,
) {
    let phase = &settings.big_resource;
    if !phase.appears(rng) {
        return;
    }
    tally.big_resource_appeared = true;

    let live = live_indices(agents);
    let pairs = phase.select_pairs(&live, settings.max_pairs_per_day, rng);
    let pool = phase.size();

    for (i, j) in pairs {
        let outcome = match (agents.get(i), agents.get(j)) {
            (Some(a), Some(b)) => negotiate(a, b, pool, rng),
            _ => continue,
        };
        for (index, share) in [(i, outcome.share_a), (j, outcome.share_b)] {
            if let Some(agent) = agents.get_mut(index) {
                agent.update_reputation(outcome.success);
                if outcome.success {
                    agent.receive_resources(share);
                }
            }
        }

        let allocated = outcome.allocated();
        tally.negotiations_attempted = tally.negotiations_attempted.saturating_add(1);
        if outcome.success {
            tally.negotiations_succeeded = tally.negotiations_succeeded.saturating_add(1);
            tally.resources_negotiated = tally.resources_negotiated.saturating_add(allocated);
        }
        tally.ledger.record_negotiation(pool, allocated);
    }
    debug!(
        attempted = tally.negotiations_attempted,
        succeeded = tally.negotiations_succeeded,
        negotiated = tally.resources_negotiated,
        "big-resource negotiations complete"
    );
}

/// Starvation check for every live agent.
pub fn upkeep(agents: &mut [Agent], tally: &mut DayTally) {
    for agent in agents.iter_mut().filter(|a| a.is_alive()) {
        if !agent.perform_daily_upkeep() {
            tally.deaths = tally.deaths.saturating_add(1);
            debug!(agent = %agent, "agent starved");
        }
    }
}

/// Births for eligible agents, in roster order.
///
/// Offspring appended during this phase do not reproduce the same day.
pub fn reproduce(
    day_number: u64,
    agents: &mut Vec<Agent>,
    settings: &DaySettings,
    rng: &mut impl Rng,
    tally: &mut DayTally,
) {
    let parents = agents.len();
    let mut population = u32::try_from(live_indices(agents).len()).unwrap_or(u32::MAX);

    for index in 0..parents {
        if settings.max_offspring_per_day.is_some_and(|cap| tally.births >= cap) {
            break;
        }
        if settings.max_population.is_some_and(|cap| population >= cap) {
            break;
        }
        let child = agents
            .get_mut(index)
            .and_then(|parent| parent.reproduce(settings.mutation_rate, day_number, rng));
        if let Some(child) = child {
            debug!(child = %child, generation = child.state().generation, "agent born");
            agents.push(child);
            tally.births = tally.births.saturating_add(1);
            population = population.saturating_add(1);
        }
    }
}

/// Age every live agent, newborns included.
pub fn advance(agents: &mut [Agent]) {
    for agent in agents.iter_mut() {
        agent.age_step();
    }
}

/// Roster indices of live agents, in roster order.
pub fn live_indices(agents: &[Agent]) -> Vec<usize> {
    agents
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_alive())
        .map(|(index, _)| index)
        .collect()
}
