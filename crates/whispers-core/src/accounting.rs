//! Daily resource accounting.
//!
//! Resources enter a day from two sources: the morning spawn and the shared
//! pools of big-resource negotiations. They leave the grid only by being
//! collected. For each day the check is:
//!
//! ```text
//! units credited by foraging == units marked collected on the grid
//! units marked collected    <= units spawned
//! units split by a pair      <= that pair's pool
//! ```
//!
//! The day cycle builds these totals while it runs, so the check passes by
//! construction for a correct cycle. A violation is logged as an error and
//! reported in the returned [`AccountingResult`].

/// Running totals for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyLedger {
    /// Units placed on the grid this morning.
    pub spawned: u64,
    /// Units the grid reports as collected.
    pub collected_on_grid: u64,
    /// Units credited to agents from foraging.
    pub foraged: u64,
    /// Units offered across all negotiation pools.
    pub pooled: u64,
    /// Units handed out by negotiations.
    pub negotiated: u64,
    /// Negotiations whose split exceeded the pool.
    pub overdrawn_pools: u32,
}

impl DailyLedger {
    /// Record one negotiation round over `pool` units that allocated
    /// `allocated` units in total.
    pub fn record_negotiation(&mut self, pool: u32, allocated: u32) {
        self.pooled = self.pooled.saturating_add(u64::from(pool));
        self.negotiated = self.negotiated.saturating_add(u64::from(allocated));
        if allocated > pool {
            self.overdrawn_pools = self.overdrawn_pools.saturating_add(1);
        }
    }
}

/// A broken accounting identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountingAnomaly {
    /// Agents were credited a different amount than the grid gave up.
    ForageMismatch {
        /// Units credited to agents.
        credited: u64,
        /// Units the grid reports collected.
        collected: u64,
    },
    /// More units were collected than spawned.
    OverCollected {
        /// Units collected.
        collected: u64,
        /// Units spawned.
        spawned: u64,
    },
    /// A negotiation handed out more than its pool.
    OverdrawnPools {
        /// Number of offending rounds.
        rounds: u32,
    },
}

/// The result of an accounting check for a single day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountingResult {
    /// Every identity holds.
    Balanced,
    /// One or more identities failed.
    Anomaly(Vec<AccountingAnomaly>),
}

impl AccountingResult {
    /// Whether the day balanced.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Check the identities for one day, logging any violation.
pub fn verify_day(day: u64, ledger: &DailyLedger) -> AccountingResult {
    let mut anomalies = Vec::new();

    if ledger.foraged != ledger.collected_on_grid {
        anomalies.push(AccountingAnomaly::ForageMismatch {
            credited: ledger.foraged,
            collected: ledger.collected_on_grid,
        });
    }
    if ledger.collected_on_grid > ledger.spawned {
        anomalies.push(AccountingAnomaly::OverCollected {
            collected: ledger.collected_on_grid,
            spawned: ledger.spawned,
        });
    }
    if ledger.overdrawn_pools > 0 {
        anomalies.push(AccountingAnomaly::OverdrawnPools {
            rounds: ledger.overdrawn_pools,
        });
    }

    if anomalies.is_empty() {
        AccountingResult::Balanced
    } else {
        tracing::error!(day, ?anomalies, "daily accounting anomaly");
        AccountingResult::Anomaly(anomalies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistent_day_balances() {
        let mut ledger = DailyLedger {
            spawned: 10,
            collected_on_grid: 7,
            foraged: 7,
            ..DailyLedger::default()
        };
        ledger.record_negotiation(10, 9);
        assert!(verify_day(1, &ledger).is_balanced());
        assert_eq!(ledger.pooled, 10);
        assert_eq!(ledger.negotiated, 9);
    }

    #[test]
    fn empty_day_balances() {
        assert!(verify_day(0, &DailyLedger::default()).is_balanced());
    }

    #[test]
    fn forage_mismatch_is_reported() {
        let ledger = DailyLedger {
            spawned: 10,
            collected_on_grid: 5,
            foraged: 6,
            ..DailyLedger::default()
        };
        assert_eq!(
            verify_day(2, &ledger),
            AccountingResult::Anomaly(vec![AccountingAnomaly::ForageMismatch {
                credited: 6,
                collected: 5,
            }])
        );
    }

    #[test]
    fn over_collection_and_overdrawn_pools_are_reported() {
        let mut ledger = DailyLedger {
            spawned: 3,
            collected_on_grid: 4,
            foraged: 4,
            ..DailyLedger::default()
        };
        ledger.record_negotiation(5, 6);
        let AccountingResult::Anomaly(anomalies) = verify_day(3, &ledger) else {
            return;
        };
        assert_eq!(anomalies.len(), 2);
    }
}
