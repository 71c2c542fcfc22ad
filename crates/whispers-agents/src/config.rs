//! Economy parameters applied to newly created agents.
//!
//! [`AgentConfig`] bundles the per-agent economic constants so that the day
//! cycle (and tests) can override them. Offspring inherit their parent's
//! values rather than reading the config again, so a population keeps the
//! economy it was seeded with.

/// Economic constants stamped onto each seed agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Resources an agent must collect in a day to survive upkeep (default: 3).
    pub daily_need: u32,

    /// Same-day reserve required before reproducing (default: 8).
    pub reproduction_reserve: u32,

    /// Amount taken from the parent's reserve on a birth (default: 8).
    pub reproduction_cost: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            daily_need: 3,
            reproduction_reserve: 8,
            reproduction_cost: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = AgentConfig::default();
        assert_eq!(cfg.daily_need, 3);
        assert_eq!(cfg.reproduction_reserve, 8);
        assert_eq!(cfg.reproduction_cost, 8);
    }
}
