//! The simulation runner.
//!
//! A [`Simulation`] owns the roster, the grid, the random stream, and the
//! metrics buffer. [`Simulation::step`] advances exactly one day through the
//! [`crate::day`] cycle and returns that day's [`DayRecord`];
//! [`Simulation::run`] steps until the configured number of days is reached.
//!
//! All randomness comes from a single `ChaCha8Rng` seeded once from
//! `world.seed`. Its position is part of every snapshot, so a restored
//! simulation continues the exact random sequence.

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};
use whispers_agents::Agent;
use whispers_types::{
    AgentMarker, DayRecord, GridView, Position, Profile, RngState, SimulationSnapshot,
    SnapshotMetadata,
};
use whispers_world::{Environment, WorldError};

use crate::config::{ConfigError, SimulationConfig};
use crate::day::{self, DaySettings, DayTally};
use crate::metrics::{MetricsBuffer, MetricsReport};

/// Errors building or restoring a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The configuration was rejected.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// The grid could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// A running simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    settings: DaySettings,
    agents: Vec<Agent>,
    environment: Environment,
    rng: ChaCha8Rng,
    day: u64,
    metrics: MetricsBuffer,
}

impl Simulation {
    /// Build a simulation with the seed population described by `config`.
    ///
    /// Seed agents are created profile by profile at uniformly random cells.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        let mut sim = Self::empty(config)?;
        let agent_config = sim.config.agent_config();
        let (width, height) = (sim.environment.width(), sim.environment.height());
        for profile in Profile::ALL {
            for _ in 0..sim.config.population.initial(profile) {
                let position = Position::new(
                    sim.rng.random_range(0..width),
                    sim.rng.random_range(0..height),
                );
                let agent = Agent::seed(profile, position, &agent_config, &mut sim.rng);
                sim.agents.push(agent);
            }
        }
        info!(
            seed = sim.config.world.seed,
            agents = sim.agents.len(),
            width,
            height,
            "simulation created"
        );
        Ok(sim)
    }

    /// Build a simulation around a caller-supplied roster, ignoring the
    /// `population` section's seed counts.
    pub fn with_agents(
        config: SimulationConfig,
        agents: Vec<Agent>,
    ) -> Result<Self, SimulationError> {
        let mut sim = Self::empty(config)?;
        sim.agents = agents;
        Ok(sim)
    }

    /// Rebuild a simulation from a snapshot.
    ///
    /// The roster, the grid, the day counter, and the random stream position
    /// are restored exactly. The metrics buffer starts empty.
    pub fn restore(
        config: SimulationConfig,
        snapshot: &SimulationSnapshot,
    ) -> Result<Self, SimulationError> {
        let mut sim = Self::empty(config)?;
        sim.agents = snapshot
            .agents
            .iter()
            .cloned()
            .map(Agent::from_state)
            .collect();
        sim.environment.set_resources(snapshot.resources.clone());
        sim.rng = rng_from_state(&snapshot.rng);
        sim.day = snapshot.day;
        info!(day = sim.day, agents = sim.agents.len(), "simulation restored");
        Ok(sim)
    }

    fn empty(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let env = &config.environment;
        let environment = Environment::new(
            env.width,
            env.height,
            env.resource_spawn_rate,
            env.min_resources,
        )?;
        let settings = DaySettings {
            mutation_rate: config.evolution.mutation_rate,
            max_offspring_per_day: config.evolution.max_offspring_per_day,
            max_population: config.population.max_population,
            big_resource: config.big_resource_phase(),
            max_pairs_per_day: usize::try_from(config.negotiation.max_pairs_per_day)
                .unwrap_or(usize::MAX),
        };
        let mut metrics = MetricsBuffer::new();
        metrics.annotate("seed", config.world.seed);
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.world.seed),
            config,
            settings,
            agents: Vec::new(),
            environment,
            day: 0,
            metrics,
        })
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Advance one day and return its record.
    pub fn step(&mut self) -> DayRecord {
        let day_number = self.day.saturating_add(1);
        let tally = day::run_day(
            day_number,
            &mut self.agents,
            &mut self.environment,
            &self.settings,
            &mut self.rng,
        );
        self.day = day_number;

        let record = self.day_record(&tally);
        self.metrics.log_day(&record);
        info!(
            day = record.day,
            population = record.population,
            births = record.births,
            deaths = record.deaths,
            collected = record.resources_collected,
            negotiated = record.resources_negotiated,
            "day complete"
        );
        if record.population == 0 && tally.deaths > 0 {
            warn!(day = record.day, "population extinct");
        }
        record
    }

    /// Step until `world.days` days have completed and return the metrics.
    ///
    /// A restored simulation only runs the days still missing.
    pub fn run(&mut self) -> MetricsReport {
        let target = self.config.world.days;
        info!(from = self.day, to = target, "run started");
        while self.day < target {
            self.step();
        }
        let report = self.metrics.finalize();
        info!(day = self.day, population = self.live_count(), "run finished");
        report
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Days completed.
    pub const fn day(&self) -> u64 {
        self.day
    }

    /// The full roster, dead agents included.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Number of living agents.
    pub fn live_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    /// The resource grid.
    pub const fn environment(&self) -> &Environment {
        &self.environment
    }

    /// The configuration the simulation was built with.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Records logged so far.
    pub const fn metrics(&self) -> &MetricsBuffer {
        &self.metrics
    }

    /// Read-only view for grid displays.
    pub fn grid_view(&self) -> GridView {
        GridView {
            width: self.environment.width(),
            height: self.environment.height(),
            agents: self
                .agents
                .iter()
                .filter(|a| a.is_alive())
                .map(|a| AgentMarker {
                    id: a.id(),
                    position: a.position(),
                    profile: a.profile(),
                    newborn: a.is_newborn(),
                })
                .collect(),
            resources: self
                .environment
                .available_resources()
                .map(|r| r.position)
                .collect(),
        }
    }

    /// A detached copy of the full state.
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            metadata: SnapshotMetadata {
                version: SimulationSnapshot::VERSION,
                created_at: Utc::now(),
                seed: self.config.world.seed,
            },
            day: self.day,
            agents: self.agents.iter().map(|a| a.state().clone()).collect(),
            resources: self.environment.resources().to_vec(),
            rng: RngState {
                seed: self.rng.get_seed(),
                stream: self.rng.get_stream(),
                word_pos: self.rng.get_word_pos(),
            },
        }
    }

    fn day_record(&self, tally: &DayTally) -> DayRecord {
        let (mut population, mut cooperative, mut self_interested, mut adaptive) = (0_u32, 0, 0, 0);
        let mut reputation = 0.0_f64;
        let mut age = 0.0_f64;
        for agent in self.agents.iter().filter(|a| a.is_alive()) {
            population = population.saturating_add(1);
            let count: &mut u32 = match agent.profile() {
                Profile::Cooperative => &mut cooperative,
                Profile::SelfInterested => &mut self_interested,
                Profile::Adaptive => &mut adaptive,
            };
            *count = count.saturating_add(1);
            reputation += agent.reputation();
            age += f64::from(agent.age());
        }
        let mean = |total: f64| {
            if population == 0 {
                0.0
            } else {
                total / f64::from(population)
            }
        };

        DayRecord {
            day: self.day,
            population,
            cooperative,
            self_interested,
            adaptive,
            births: tally.births,
            deaths: tally.deaths,
            resources_spawned: tally.resources_spawned,
            resources_collected: tally.resources_collected,
            resources_negotiated: tally.resources_negotiated,
            negotiations_attempted: tally.negotiations_attempted,
            negotiations_succeeded: tally.negotiations_succeeded,
            average_reputation: mean(reputation),
            average_age: mean(age),
        }
    }
}

/// Rebuild a random stream at a recorded position.
fn rng_from_state(state: &RngState) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::from_seed(state.seed);
    rng.set_stream(state.stream);
    rng.set_word_pos(state.word_pos);
    rng
}
