//! The resource grid.
//!
//! An [`Environment`] is a bounded `width x height` grid holding the day's
//! resource units. Each morning [`Environment::spawn_resources`] discards the
//! previous day's set and scatters a fresh one. Agents look up their nearest
//! uncollected unit by Manhattan distance and collect it.
//!
//! # Invariants
//!
//! - The resource set always has the size spawned for the day; collection
//!   only flips the `collected` flag.
//! - `collected` is one-way. Collecting twice is a no-op that still reports
//!   the value.
//! - Closest-resource ties go to the first unit in spawn order.

use rand::Rng;
use whispers_types::{Position, Resource};

use crate::error::WorldError;

/// Fewest resources spawned per day, whatever the rate and area.
pub const DEFAULT_MIN_RESOURCES: u32 = 5;

/// Value of every spawned resource unit.
pub const RESOURCE_VALUE: u32 = 1;

/// The bounded resource grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    width: u32,
    height: u32,
    spawn_rate: f64,
    min_resources: u32,
    resources: Vec<Resource>,
}

impl Environment {
    /// Create an empty grid.
    ///
    /// Rejects zero dimensions and a negative or non-finite spawn rate.
    pub fn new(
        width: u32,
        height: u32,
        spawn_rate: f64,
        min_resources: u32,
    ) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::InvalidDimensions { width, height });
        }
        if !spawn_rate.is_finite() || spawn_rate < 0.0 {
            return Err(WorldError::InvalidSpawnRate(spawn_rate));
        }
        Ok(Self {
            width,
            height,
            spawn_rate,
            min_resources,
            resources: Vec::new(),
        })
    }

    /// Grid width.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Resources spawned per cell per day.
    pub const fn spawn_rate(&self) -> f64 {
        self.spawn_rate
    }

    /// How many units a spawn produces:
    /// `max(floor(spawn_rate * width * height), min_resources)`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn target_count(&self) -> u32 {
        let area = f64::from(self.width) * f64::from(self.height);
        // `as` saturates; the rate is validated finite and non-negative.
        let scaled = (self.spawn_rate * area).floor() as u32;
        scaled.max(self.min_resources)
    }

    /// Replace the resource set with a fresh scatter of unit-value
    /// resources at uniformly random cells. Returns the number spawned.
    pub fn spawn_resources(&mut self, rng: &mut impl Rng) -> u32 {
        let target = self.target_count();
        self.resources.clear();
        for _ in 0..target {
            let position = Position::new(
                rng.random_range(0..self.width),
                rng.random_range(0..self.height),
            );
            self.resources.push(Resource::new(position, RESOURCE_VALUE));
        }
        tracing::debug!(spawned = target, "resources spawned");
        target
    }

    /// Manhattan distance between two cells.
    pub const fn distance(a: Position, b: Position) -> u32 {
        a.manhattan(b)
    }

    /// Index of the uncollected resource nearest to `from`.
    ///
    /// Ties go to the lowest index. `None` when nothing is left.
    pub fn closest_index(&self, from: Position) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (index, resource) in self.resources.iter().enumerate() {
            if resource.collected {
                continue;
            }
            let d = Self::distance(from, resource.position);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((index, d));
            }
        }
        best.map(|(index, _)| index)
    }

    /// The uncollected resource nearest to `from`, if any.
    pub fn get_closest_resource(&self, from: Position) -> Option<&Resource> {
        self.closest_index(from)
            .and_then(|index| self.resources.get(index))
    }

    /// Mark the resource at `index` collected and return its value.
    ///
    /// Collecting an already-collected resource changes nothing and still
    /// returns the value. `None` only for an out-of-range index.
    pub fn collect_resource(&mut self, index: usize) -> Option<u32> {
        let resource = self.resources.get_mut(index)?;
        resource.collected = true;
        Some(resource.value)
    }

    /// All of today's resources in spawn order, collected or not.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Uncollected resources.
    pub fn available_resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(|r| !r.collected)
    }

    /// Number of uncollected resources.
    pub fn available_count(&self) -> usize {
        self.available_resources().count()
    }

    /// Number of resources spawned for the day.
    pub fn total_resources(&self) -> usize {
        self.resources.len()
    }

    /// Number of resources collected so far today.
    pub fn collected_count(&self) -> usize {
        self.resources.iter().filter(|r| r.collected).count()
    }

    /// Replace the resource set wholesale, e.g. from a snapshot.
    pub fn set_resources(&mut self, resources: Vec<Resource>) {
        self.resources = resources;
    }
}
