//! Tunable constants for a ranking session.

use serde::{Deserialize, Serialize};

/// Every threshold and step size the phase controller uses.
///
/// Stored inside the tournament state so a saved session keeps replaying
/// under the settings it was created with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentSettings {
    /// Rating every candidate starts with.
    pub initial_rating: i32,
    /// Number of rounds in the coverage phase.
    pub coverage_rounds: u32,
    /// Group size for all coverage rounds.
    pub coverage_group_size: usize,
    /// Group size for the refinement round.
    pub refinement_group_size: usize,
    /// Share of the pool that survives the coverage cut.
    pub coverage_cut_ratio: f64,
    /// The coverage cut never leaves fewer than this many candidates.
    pub coverage_cut_floor: usize,
    /// Maximum number of finalists entering the Swiss phase.
    pub swiss_pool_cap: usize,
    /// Number of Swiss rounds.
    pub swiss_rounds: u32,
    /// Dampened K-factor for coverage groups.
    pub coverage_k: f64,
    /// Full K-factor for refinement groups and Swiss duels.
    pub full_k: f64,
    /// Richness counts at or above this value share the top tier.
    pub richness_tier_cap: u32,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            initial_rating: 1000,
            coverage_rounds: 2,
            coverage_group_size: 4,
            refinement_group_size: 3,
            coverage_cut_ratio: 0.5,
            coverage_cut_floor: 4,
            swiss_pool_cap: 24,
            swiss_rounds: 3,
            coverage_k: 16.0,
            full_k: 32.0,
            richness_tier_cap: 3,
        }
    }
}

impl TournamentSettings {
    /// Set the number of coverage rounds
    pub fn with_coverage_rounds(mut self, rounds: u32) -> Self {
        self.coverage_rounds = rounds;
        self
    }

    /// Set the number of Swiss rounds
    pub fn with_swiss_rounds(mut self, rounds: u32) -> Self {
        self.swiss_rounds = rounds;
        self
    }

    /// Set the Swiss finalist cap
    pub fn with_swiss_pool_cap(mut self, cap: usize) -> Self {
        self.swiss_pool_cap = cap;
        self
    }

    /// Size of the pool left after the coverage cut.
    pub fn coverage_cut_size(&self, pool_size: usize) -> usize {
        let kept = (pool_size as f64 * self.coverage_cut_ratio).ceil() as usize;
        kept.max(self.coverage_cut_floor).min(pool_size)
    }

    /// Size of the pool entering the Swiss phase.
    pub fn swiss_cut_size(&self, pool_size: usize) -> usize {
        pool_size.min(self.swiss_pool_cap)
    }
}
