//! Tournament state, Phase, and TournamentError.

use crate::config::TournamentSettings;
use crate::models::candidate::{CandidateName, CandidateRecord};
use crate::models::game::{Group, PairKey};
use crate::models::undo::{TransitionSnapshot, UndoRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Fewer than two distinct candidate names.
    NotEnoughCandidates,
    /// The operation is not allowed in this phase.
    InvalidPhase(Phase),
    /// A result was submitted while no match is awaiting one.
    NoCurrentMatch,
    /// The named winner is not part of the current match.
    WinnerNotInMatch(CandidateName),
    /// A named loser is not part of the current match.
    LoserNotInMatch(CandidateName),
    /// Winner plus losers do not cover the current match exactly.
    LosersMismatch,
    /// The same name appears twice in one result.
    DuplicateParticipant(CandidateName),
    /// Unknown candidate name.
    CandidateNotFound(CandidateName),
    /// No result is pending, so there is nothing to undo.
    NothingToUndo,
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::NotEnoughCandidates => write!(f, "Need at least 2 distinct candidates"),
            TournamentError::InvalidPhase(phase) => write!(f, "Not allowed in the {} phase", phase),
            TournamentError::NoCurrentMatch => write!(f, "No match is awaiting a result"),
            TournamentError::WinnerNotInMatch(name) => {
                write!(f, "Winner {} is not in the current match", name)
            }
            TournamentError::LoserNotInMatch(name) => {
                write!(f, "Loser {} is not in the current match", name)
            }
            TournamentError::LosersMismatch => {
                write!(f, "Winner and losers must cover the current match exactly")
            }
            TournamentError::DuplicateParticipant(name) => {
                write!(f, "{} appears more than once in the result", name)
            }
            TournamentError::CandidateNotFound(name) => write!(f, "Candidate {} not found", name),
            TournamentError::NothingToUndo => write!(f, "Nothing to undo"),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Coarse stage of the tournament. Ordered; only undo moves it backward.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Every active candidate is seen in groups of 4.
    #[default]
    Coverage,
    /// One round of groups of 3 among similarly rated survivors.
    Refinement,
    /// 1v1 duels among the finalists.
    Swiss,
    Finished,
}

impl Phase {
    /// Coverage and Refinement are played in groups.
    pub fn is_group_phase(self) -> bool {
        matches!(self, Phase::Coverage | Phase::Refinement)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Coverage => "coverage",
            Phase::Refinement => "refinement",
            Phase::Swiss => "swiss",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Full session state. Operations take it by reference and return a new value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub phase: Phase,
    pub seed: u64,
    /// Results applied over the whole run (display only).
    #[serde(default)]
    pub round_counter: u32,
    /// 0-indexed round within the current phase.
    pub phase_round: u32,
    /// Every candidate that entered, keyed by name.
    pub candidates: BTreeMap<CandidateName, CandidateRecord>,
    /// Active candidates.
    pub pool: Vec<CandidateName>,
    /// Candidates playing in the current phase.
    pub phase_pool: Vec<CandidateName>,
    pub current_groups: Vec<Group>,
    pub groups_completed: usize,
    pub groups_total: usize,
    /// Duels already played (Swiss only).
    #[serde(default)]
    pub matches_played: BTreeSet<PairKey>,
    /// Match awaiting a result.
    pub current_match: Option<Group>,
    #[serde(default)]
    pub last_result: Option<UndoRecord>,
    #[serde(default)]
    pub settings: TournamentSettings,
}

impl Tournament {
    /// Empty state before any groups are built.
    pub(crate) fn blank(
        candidates: BTreeMap<CandidateName, CandidateRecord>,
        pool: Vec<CandidateName>,
        seed: u64,
        settings: TournamentSettings,
    ) -> Self {
        Self {
            phase: Phase::Coverage,
            seed,
            round_counter: 0,
            phase_round: 0,
            candidates,
            phase_pool: pool.clone(),
            pool,
            current_groups: Vec::new(),
            groups_completed: 0,
            groups_total: 0,
            matches_played: BTreeSet::new(),
            current_match: None,
            last_result: None,
            settings,
        }
    }

    pub fn record(&self, name: &str) -> Option<&CandidateRecord> {
        self.candidates.get(name)
    }

    pub fn record_mut(&mut self, name: &str) -> Result<&mut CandidateRecord, TournamentError> {
        self.candidates
            .get_mut(name)
            .ok_or_else(|| TournamentError::CandidateNotFound(name.to_owned()))
    }

    /// Current rating, or the initial rating for an unknown name.
    pub fn rating(&self, name: &str) -> i32 {
        self.record(name)
            .map(|r| r.rating)
            .unwrap_or(self.settings.initial_rating)
    }

    /// Capture the fields a transition is about to overwrite.
    pub fn snapshot(&self) -> TransitionSnapshot {
        TransitionSnapshot {
            phase: self.phase,
            pool: self.pool.clone(),
            phase_pool: self.phase_pool.clone(),
            groups: self.current_groups.clone(),
            groups_total: self.groups_total,
            phase_round: self.phase_round,
            matches_played: self.matches_played.clone(),
        }
    }

    /// Restore the fields captured by `snapshot`.
    pub fn restore(&mut self, snap: &TransitionSnapshot) {
        self.phase = snap.phase;
        self.pool = snap.pool.clone();
        self.phase_pool = snap.phase_pool.clone();
        self.current_groups = snap.groups.clone();
        self.groups_total = snap.groups_total;
        self.phase_round = snap.phase_round;
        self.matches_played = snap.matches_played.clone();
    }

    /// Replace the current round's groups and reset progress.
    pub(crate) fn install_groups(&mut self, groups: Vec<Group>) {
        self.groups_total = groups.len();
        self.groups_completed = 0;
        self.current_groups = groups;
        self.current_match = None;
    }
}
