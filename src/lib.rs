//! Archetype ranker: a deterministic tournament engine that turns repeated
//! group and duel choices into a Top-10 ranking.

pub mod config;
pub mod logic;
pub mod models;
pub mod persistence;

pub use config::TournamentSettings;
pub use logic::{
    advance_phase_if_round_complete, apply_duel_result, apply_group_result, begin_next_match,
    build_coverage_groups, build_elo_proximity_groups, create_initial_state,
    create_initial_state_with, is_swiss_complete, merge_enrichment, next_swiss_pair, standings,
    swiss_round, top_ten, undo_last_result, GroupingParams, Standing,
};
pub use models::{
    CandidateName, CandidateRecord, Enrichment, Group, PairKey, Phase, ThemeKey, Tournament,
    TournamentError, TransitionSnapshot, UndoRecord,
};
pub use persistence::{JsonFileStore, MemoryStore, SessionStore, StoreError};
