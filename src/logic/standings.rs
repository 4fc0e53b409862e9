//! Final ranking view.

use crate::models::{CandidateName, Tournament};
use serde::Serialize;
use std::cmp::Reverse;

/// One row of the ranking (for API / display).
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Standing {
    pub rank: usize,
    pub name: CandidateName,
    pub rating: i32,
    pub wins: u32,
    pub losses: u32,
    /// Still in the active pool.
    pub active: bool,
}

/// Every candidate ranked by rating, then wins minus losses, then name.
pub fn standings(state: &Tournament) -> Vec<Standing> {
    let mut rows: Vec<_> = state.candidates.iter().collect();
    rows.sort_by(|(an, a), (bn, b)| {
        (Reverse(a.rating), Reverse(a.score()), an).cmp(&(Reverse(b.rating), Reverse(b.score()), bn))
    });
    rows.into_iter()
        .enumerate()
        .map(|(i, (name, r))| Standing {
            rank: i + 1,
            name: name.clone(),
            rating: r.rating,
            wins: r.wins,
            losses: r.losses,
            active: state.pool.contains(name),
        })
        .collect()
}

/// The first ten rows of [`standings`].
pub fn top_ten(state: &Tournament) -> Vec<Standing> {
    let mut rows = standings(state);
    rows.truncate(10);
    rows
}
