//! Single-slot undo record.

use crate::models::candidate::CandidateName;
use crate::models::game::{Group, PairKey};
use crate::models::tournament::Phase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fields a round or phase transition overwrites, captured just before it ran.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionSnapshot {
    pub phase: Phase,
    pub pool: Vec<CandidateName>,
    pub phase_pool: Vec<CandidateName>,
    pub groups: Vec<Group>,
    pub groups_total: usize,
    pub phase_round: u32,
    #[serde(default)]
    pub matches_played: BTreeSet<PairKey>,
}

/// The most recent result, with the exact rating deltas applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UndoRecord {
    Group {
        group: Group,
        winner: CandidateName,
        winner_delta: i32,
        /// Each loser with the (negative) delta it received.
        losers: Vec<(CandidateName, i32)>,
        /// Absent in sessions saved before snapshots existed.
        #[serde(default)]
        snapshot: Option<TransitionSnapshot>,
    },
    Duel {
        pair: Group,
        winner: CandidateName,
        winner_delta: i32,
        loser: CandidateName,
        loser_delta: i32,
        #[serde(default)]
        snapshot: Option<TransitionSnapshot>,
    },
}

impl UndoRecord {
    pub fn snapshot(&self) -> Option<&TransitionSnapshot> {
        match self {
            UndoRecord::Group { snapshot, .. } | UndoRecord::Duel { snapshot, .. } => {
                snapshot.as_ref()
            }
        }
    }

    /// Attach a snapshot unless one is already present.
    pub fn attach_snapshot(&mut self, snap: TransitionSnapshot) {
        match self {
            UndoRecord::Group { snapshot, .. } | UndoRecord::Duel { snapshot, .. } => {
                if snapshot.is_none() {
                    *snapshot = Some(snap);
                }
            }
        }
    }

    /// The match that was resolved, in its presented order.
    pub fn resolved_match(&self) -> Group {
        match self {
            UndoRecord::Group { group, .. } => group.clone(),
            UndoRecord::Duel { pair, .. } => pair.clone(),
        }
    }
}
