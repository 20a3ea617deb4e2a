//! The evolving disaster environment.
//!
//! A [`DisasterEnvironment`] is created once per run, mutated once per tick
//! by [`DisasterEnvironment::step`], and read through
//! [`DisasterEnvironment::report`]. Agents never mutate it directly: the
//! simulation loop records rescues and deliveries on their behalf.
//!
//! # Evolution rules
//!
//! | Disaster   | Per-tick rule |
//! |------------|---------------|
//! | Wildfire   | every affected cell spreads to each in-bounds neighbour with 20%; with 30% a random affected cell gains a victim |
//! | Flood      | every blocked route drifts one row down (row 0 drains away); with 40% a water need appears at a random cell |
//! | Earthquake | with 50% a random affected cell becomes both a blocked route and a victim |
//!
//! # Determinism
//!
//! All randomness comes from the caller-supplied [`Rng`]. Passing a seeded
//! `StdRng` reproduces a run exactly.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use relief_types::{Coordinate, DisasterType, EnvironmentReport, GRID_MAX, SupplyKind, SupplyNeed};

use crate::error::WorldError;

/// Minimum number of seed affected areas.
pub const MIN_SEED_AREAS: u32 = 5;
/// Maximum number of seed affected areas.
pub const MAX_SEED_AREAS: u32 = 10;

/// Chance that a seed area starts as a blocked route.
pub const SEED_BLOCKED_PROBABILITY: f64 = 0.4;
/// Chance that a seed area starts with a victim.
pub const SEED_VICTIM_PROBABILITY: f64 = 0.5;
/// Chance that a seed area starts with a supply need.
pub const SEED_SUPPLY_PROBABILITY: f64 = 0.6;

/// Per-neighbour spread chance for wildfire.
pub const WILDFIRE_SPREAD_PROBABILITY: f64 = 0.2;
/// Per-tick chance of a new wildfire victim.
pub const WILDFIRE_VICTIM_PROBABILITY: f64 = 0.3;
/// Per-tick chance of a new flood water need.
pub const FLOOD_WATER_PROBABILITY: f64 = 0.4;
/// Per-tick chance of an earthquake aftershock.
pub const EARTHQUAKE_AFTERSHOCK_PROBABILITY: f64 = 0.5;

/// The disaster grid and everything outstanding on it.
#[derive(Debug, Clone)]
pub struct DisasterEnvironment {
    disaster_type: DisasterType,
    affected_areas: Vec<Coordinate>,
    affected_cells: BTreeSet<Coordinate>,
    blocked_routes: Vec<Coordinate>,
    victim_locations: Vec<Coordinate>,
    supply_needs: Vec<SupplyNeed>,
    rescued: BTreeSet<Coordinate>,
    supplied: BTreeSet<SupplyNeed>,
    updated_at: DateTime<Utc>,
}

impl DisasterEnvironment {
    /// Create an environment with a uniformly random disaster type.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let disaster_type = DisasterType::ALL
            .choose(rng)
            .copied()
            .unwrap_or(DisasterType::Earthquake);
        Self::with_disaster(disaster_type, rng)
    }

    /// Create an environment for a fixed disaster type.
    ///
    /// Seeds 5 to 10 affected areas at uniform random cells. Each seed
    /// independently becomes a blocked route, a victim location, and a
    /// supply need of a random kind.
    pub fn with_disaster<R: Rng + ?Sized>(disaster_type: DisasterType, rng: &mut R) -> Self {
        let mut env = Self {
            disaster_type,
            affected_areas: Vec::new(),
            affected_cells: BTreeSet::new(),
            blocked_routes: Vec::new(),
            victim_locations: Vec::new(),
            supply_needs: Vec::new(),
            rescued: BTreeSet::new(),
            supplied: BTreeSet::new(),
            updated_at: Utc::now(),
        };

        let seeds = rng.random_range(MIN_SEED_AREAS..=MAX_SEED_AREAS);
        for _ in 0..seeds {
            let cell = random_cell(rng);
            env.affected_areas.push(cell);
            env.affected_cells.insert(cell);
            if rng.random_bool(SEED_BLOCKED_PROBABILITY) {
                env.blocked_routes.push(cell);
            }
            if rng.random_bool(SEED_VICTIM_PROBABILITY) {
                env.victim_locations.push(cell);
            }
            if rng.random_bool(SEED_SUPPLY_PROBABILITY) {
                let kind = SupplyKind::ALL.choose(rng).copied().unwrap_or(SupplyKind::Water);
                env.supply_needs.push(SupplyNeed {
                    location: cell,
                    kind,
                });
            }
        }

        tracing::debug!(
            disaster = %disaster_type,
            affected = env.affected_areas.len(),
            blocked = env.blocked_routes.len(),
            victims = env.victim_locations.len(),
            needs = env.supply_needs.len(),
            "environment seeded"
        );
        env
    }

    /// Rebuild an environment from a report, with no completions recorded.
    pub fn from_report(report: EnvironmentReport) -> Self {
        Self {
            disaster_type: report.disaster_type,
            affected_cells: report.affected_areas.iter().copied().collect(),
            affected_areas: report.affected_areas,
            blocked_routes: report.blocked_routes,
            victim_locations: report.victim_locations,
            supply_needs: report.supply_needs,
            rescued: BTreeSet::new(),
            supplied: BTreeSet::new(),
            updated_at: Utc::now(),
        }
    }

    /// Advance the disaster by one tick.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self.disaster_type {
            DisasterType::Wildfire => self.spread_fire(rng),
            DisasterType::Flood => self.raise_water(rng),
            DisasterType::Earthquake => self.aftershock(rng),
        }
        self.updated_at = Utc::now();
    }

    /// Only cells not yet burning are appended, so the list never holds
    /// more than one spread entry per grid cell.
    fn spread_fire<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut spread = Vec::new();
        for cell in &self.affected_areas {
            for neighbor in cell.neighbors() {
                if rng.random_bool(WILDFIRE_SPREAD_PROBABILITY) && self.affected_cells.insert(neighbor) {
                    spread.push(neighbor);
                }
            }
        }
        tracing::debug!(spread = spread.len(), burning = self.affected_cells.len(), "wildfire spread");
        self.affected_areas.extend(spread);

        if rng.random_bool(WILDFIRE_VICTIM_PROBABILITY)
            && let Some(&cell) = self.affected_areas.choose(rng)
        {
            self.victim_locations.push(cell);
        }
    }

    fn raise_water<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let before = self.blocked_routes.len();
        self.blocked_routes = self
            .blocked_routes
            .iter()
            .filter_map(|cell| cell.shifted_down())
            .collect();
        tracing::debug!(
            drained = before.saturating_sub(self.blocked_routes.len()),
            "flood waters shifted"
        );

        if rng.random_bool(FLOOD_WATER_PROBABILITY) {
            self.supply_needs.push(SupplyNeed {
                location: random_cell(rng),
                kind: SupplyKind::Water,
            });
        }
    }

    fn aftershock<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !rng.random_bool(EARTHQUAKE_AFTERSHOCK_PROBABILITY) {
            return;
        }
        if let Some(&cell) = self.affected_areas.choose(rng) {
            tracing::debug!(%cell, "aftershock");
            self.blocked_routes.push(cell);
            self.victim_locations.push(cell);
        }
    }

    /// Snapshot of the current state.
    ///
    /// Rescued victims and delivered needs are filtered out. Calling this
    /// twice without an intervening [`step`](Self::step) or completion
    /// yields equal reports.
    pub fn report(&self) -> EnvironmentReport {
        EnvironmentReport {
            disaster_type: self.disaster_type,
            affected_areas: self.affected_areas.clone(),
            blocked_routes: self.blocked_routes.clone(),
            victim_locations: self.outstanding_victims().collect(),
            supply_needs: self.outstanding_needs().collect(),
        }
    }

    /// Record a rescue at `location`.
    ///
    /// Fails unless `location` currently has an outstanding victim.
    pub fn mark_rescued(&mut self, location: Coordinate) -> Result<(), WorldError> {
        if !self.outstanding_victims().any(|cell| cell == location) {
            return Err(WorldError::NoVictimAt(location));
        }
        self.rescued.insert(location);
        Ok(())
    }

    /// Record a delivery for `need`.
    ///
    /// Fails unless `need` is currently outstanding.
    pub fn mark_supplied(&mut self, need: SupplyNeed) -> Result<(), WorldError> {
        if !self.outstanding_needs().any(|n| n == need) {
            return Err(WorldError::NoSupplyNeed(need));
        }
        self.supplied.insert(need);
        Ok(())
    }

    fn outstanding_victims(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.victim_locations
            .iter()
            .copied()
            .filter(|cell| !self.rescued.contains(cell))
    }

    fn outstanding_needs(&self) -> impl Iterator<Item = SupplyNeed> + '_ {
        self.supply_needs
            .iter()
            .copied()
            .filter(|need| !self.supplied.contains(need))
    }

    /// The disaster kind for this run.
    pub const fn disaster_type(&self) -> DisasterType {
        self.disaster_type
    }

    /// Every affected cell, in insertion order.
    pub fn affected_areas(&self) -> &[Coordinate] {
        &self.affected_areas
    }

    /// Number of distinct affected cells.
    pub fn distinct_affected(&self) -> usize {
        self.affected_cells.len()
    }

    /// Currently blocked routes.
    pub fn blocked_routes(&self) -> &[Coordinate] {
        &self.blocked_routes
    }

    /// Number of recorded rescues.
    pub fn rescued_count(&self) -> usize {
        self.rescued.len()
    }

    /// Number of recorded deliveries.
    pub fn supplied_count(&self) -> usize {
        self.supplied.len()
    }

    /// Wall-clock time of creation or the last [`step`](Self::step).
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// A uniformly random cell on the grid.
pub fn random_cell<R: Rng + ?Sized>(rng: &mut R) -> Coordinate {
    Coordinate::clamped(
        rng.random_range(0..=GRID_MAX),
        rng.random_range(0..=GRID_MAX),
    )
}
