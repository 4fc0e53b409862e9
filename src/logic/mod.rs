//! Tournament business logic: seeded shuffles, ratings, grouping, Swiss pairing, phases, undo.

mod grouping;
mod phase;
mod rating;
mod rng;
mod standings;
mod swiss;
mod undo;

pub use grouping::{build_coverage_groups, build_elo_proximity_groups, GroupingParams};
pub use phase::{
    advance_phase_if_round_complete, apply_duel_result, apply_group_result, begin_next_match,
    create_initial_state, create_initial_state_with, is_swiss_complete, merge_enrichment,
    next_swiss_pair, swiss_round,
};
pub use rating::{duel_update, expected_score, group_update};
pub use rng::{derive_seed, shuffle, SeedIndex, SeedPurpose};
pub use standings::{standings, top_ten, Standing};
pub use swiss::next_pair;
pub use undo::undo_last_result;
