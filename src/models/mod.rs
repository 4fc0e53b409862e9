//! Data structures for the ranking session: candidates, matches, undo records, tournament state.

mod candidate;
mod game;
mod tournament;
mod undo;

pub use candidate::{CandidateName, CandidateRecord, Enrichment, RichnessTier, ThemeKey};
pub use game::{Group, PairKey};
pub use tournament::{Phase, Tournament, TournamentError};
pub use undo::{TransitionSnapshot, UndoRecord};
