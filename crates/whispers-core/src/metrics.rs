//! In-memory metrics buffer.
//!
//! The day cycle appends one [`DayRecord`] per simulated day. At the end of a
//! run [`MetricsBuffer::finalize`] returns the records in order together with
//! a summary map of run-level figures. Records are owned copies; nothing in
//! the buffer refers back into live simulation state.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use whispers_types::DayRecord;

/// The finalized output of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// One record per day, oldest first.
    pub daily: Vec<DayRecord>,
    /// Run-level figures keyed by name.
    pub summary: BTreeMap<String, Value>,
}

impl MetricsReport {
    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), MetricsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Errors writing a metrics report.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to write the file.
    #[error("failed to write metrics: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode the report.
    #[error("failed to encode metrics: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append-only store of day records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsBuffer {
    daily: Vec<DayRecord>,
    extra: BTreeMap<String, Value>,
}

impl MetricsBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a copy of one day's record.
    pub fn log_day(&mut self, record: &DayRecord) {
        self.daily.push(record.clone());
    }

    /// Attach an extra summary entry, e.g. the run seed.
    pub fn annotate(&mut self, key: &str, value: impl Into<Value>) {
        self.extra.insert(key.to_owned(), value.into());
    }

    /// Records logged so far.
    pub fn daily(&self) -> &[DayRecord] {
        &self.daily
    }

    /// Number of records logged.
    pub fn len(&self) -> usize {
        self.daily.len()
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    /// The ordered records plus a summary.
    ///
    /// Summary keys: `days`, `final_population`, `peak_population`,
    /// `total_births`, `total_deaths`, `total_resources_collected`,
    /// `total_resources_negotiated`, `negotiations_attempted`,
    /// `negotiations_succeeded`, `negotiation_success_rate`,
    /// `final_cooperative`, `final_self_interested`, `final_adaptive`,
    /// `final_average_reputation`, plus any annotations.
    pub fn finalize(&self) -> MetricsReport {
        let mut summary = self.extra.clone();
        let sum = |f: fn(&DayRecord) -> u32| -> u64 {
            self.daily.iter().map(|r| u64::from(f(r))).sum()
        };

        let attempted = sum(|r| r.negotiations_attempted);
        let succeeded = sum(|r| r.negotiations_succeeded);
        let success_rate = if attempted == 0 {
            0.0
        } else {
            u64_to_f64(succeeded) / u64_to_f64(attempted)
        };

        let last = self.daily.last();
        let peak = self.daily.iter().map(|r| r.population).max().unwrap_or(0);

        summary.insert("days".into(), Value::from(self.daily.len()));
        summary.insert(
            "final_population".into(),
            Value::from(last.map_or(0, |r| r.population)),
        );
        summary.insert("peak_population".into(), Value::from(peak));
        summary.insert("total_births".into(), Value::from(sum(|r| r.births)));
        summary.insert("total_deaths".into(), Value::from(sum(|r| r.deaths)));
        summary.insert(
            "total_resources_collected".into(),
            Value::from(sum(|r| r.resources_collected)),
        );
        summary.insert(
            "total_resources_negotiated".into(),
            Value::from(sum(|r| r.resources_negotiated)),
        );
        summary.insert("negotiations_attempted".into(), Value::from(attempted));
        summary.insert("negotiations_succeeded".into(), Value::from(succeeded));
        summary.insert("negotiation_success_rate".into(), Value::from(success_rate));
        summary.insert(
            "final_cooperative".into(),
            Value::from(last.map_or(0, |r| r.cooperative)),
        );
        summary.insert(
            "final_self_interested".into(),
            Value::from(last.map_or(0, |r| r.self_interested)),
        );
        summary.insert(
            "final_adaptive".into(),
            Value::from(last.map_or(0, |r| r.adaptive)),
        );
        summary.insert(
            "final_average_reputation".into(),
            Value::from(last.map_or(0.0, |r| r.average_reputation)),
        );

        MetricsReport {
            daily: self.daily.clone(),
            summary,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
const fn u64_to_f64(value: u64) -> f64 {
    // Run totals stay far below 2^52.
    value as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u64, population: u32, births: u32, attempted: u32, succeeded: u32) -> DayRecord {
        DayRecord {
            day,
            population,
            cooperative: population,
            self_interested: 0,
            adaptive: 0,
            births,
            deaths: 1,
            resources_spawned: 10,
            resources_collected: 9,
            resources_negotiated: 4,
            negotiations_attempted: attempted,
            negotiations_succeeded: succeeded,
            average_reputation: 0.5,
            average_age: 1.0,
        }
    }

    #[test]
    fn records_are_returned_in_order() {
        let mut buffer = MetricsBuffer::new();
        for day in 1..=3 {
            buffer.log_day(&record(day, 5, 0, 0, 0));
        }
        let report = buffer.finalize();
        let days: Vec<u64> = report.daily.iter().map(|r| r.day).collect();
        assert_eq!(days, vec![1, 2, 3]);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn finalized_report_is_detached_from_buffer() {
        let mut buffer = MetricsBuffer::new();
        buffer.log_day(&record(1, 5, 0, 0, 0));
        let mut report = buffer.finalize();
        if let Some(first) = report.daily.first_mut() {
            first.population = 99;
        }
        report.summary.clear();

        assert_eq!(buffer.daily().first().map(|r| r.population), Some(5));
        let again = buffer.finalize();
        assert_eq!(again.daily.first().map(|r| r.population), Some(5));
        assert!(again.summary.contains_key("final_population"));
    }

    #[test]
    fn summary_totals() {
        let mut buffer = MetricsBuffer::new();
        buffer.log_day(&record(1, 5, 2, 4, 1));
        buffer.log_day(&record(2, 8, 3, 4, 3));
        buffer.log_day(&record(3, 6, 0, 0, 0));
        buffer.annotate("seed", 42);
        let summary = buffer.finalize().summary;

        assert_eq!(summary.get("days"), Some(&Value::from(3)));
        assert_eq!(summary.get("final_population"), Some(&Value::from(6)));
        assert_eq!(summary.get("peak_population"), Some(&Value::from(8)));
        assert_eq!(summary.get("total_births"), Some(&Value::from(5)));
        assert_eq!(summary.get("total_deaths"), Some(&Value::from(3)));
        assert_eq!(summary.get("total_resources_collected"), Some(&Value::from(27)));
        assert_eq!(summary.get("seed"), Some(&Value::from(42)));
        let rate = summary
            .get("negotiation_success_rate")
            .and_then(Value::as_f64)
            .unwrap_or_default();
        assert!((rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_buffer_finalizes_to_zeros() {
        let report = MetricsBuffer::new().finalize();
        assert!(report.daily.is_empty());
        assert_eq!(report.summary.get("final_population"), Some(&Value::from(0)));
        assert_eq!(report.summary.get("negotiation_success_rate"), Some(&Value::from(0.0)));
    }
}
