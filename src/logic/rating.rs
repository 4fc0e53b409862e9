//! Elo updates for duels and 1-vs-N group results.
//!
//! Winner and loser sides round independently, so a result is not
//! guaranteed to be zero-sum. Ratings drift slowly; this is kept as is.

/// Expected score of a player rated `rating_a` against one rated `rating_b`.
pub fn expected_score(rating_a: i32, rating_b: i32) -> f64 {
    1.0 / (1.0 + 10_f64.powf(f64::from(rating_b - rating_a) / 400.0))
}

/// New `(winner, loser)` ratings after a 1v1 duel.
pub fn duel_update(winner: i32, loser: i32, k: f64) -> (i32, i32) {
    let new_winner = f64::from(winner) + k * (1.0 - expected_score(winner, loser));
    let new_loser = f64::from(loser) - k * (1.0 - expected_score(loser, winner));
    (new_winner.round() as i32, new_loser.round() as i32)
}

/// New ratings after one winner beat every loser in a group.
///
/// The winner's gain is summed over all losers against its pre-update rating
/// and rounded once; each loser is rounded on its own.
pub fn group_update(winner: i32, losers: &[i32], k: f64) -> (i32, Vec<i32>) {
    let gain: f64 = losers
        .iter()
        .map(|&l| k * (1.0 - expected_score(winner, l)))
        .sum();
    let new_losers = losers
        .iter()
        .map(|&l| (f64::from(l) - k * (1.0 - expected_score(l, winner))).round() as i32)
        .collect();
    ((f64::from(winner) + gain).round() as i32, new_losers)
}
