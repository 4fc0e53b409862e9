//! Phase controller: session creation, result application, and round/phase advancement.
//!
//! Coverage (2 rounds of groups of 4) → Refinement (1 round of groups of 3)
//! → Swiss (3 rounds of duels) → Finished. Every operation takes the state by
//! reference and returns a new value.

use crate::config::TournamentSettings;
use crate::logic::grouping::{build_coverage_groups, build_elo_proximity_groups, GroupingParams};
use crate::logic::rating::{duel_update, group_update};
use crate::logic::swiss::next_pair;
use crate::models::{
    CandidateName, CandidateRecord, Enrichment, Group, PairKey, Phase, Tournament,
    TournamentError, TransitionSnapshot, UndoRecord,
};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

/// Start a session over the given names with default settings and no enrichment.
pub fn create_initial_state<S: AsRef<str>>(names: &[S], seed: u64) -> Result<Tournament, TournamentError> {
    let entries = names
        .iter()
        .map(|n| (n.as_ref().to_owned(), Enrichment::default()))
        .collect();
    create_initial_state_with(entries, seed, TournamentSettings::default())
}

/// Start a session with enrichment data and custom settings.
///
/// Names are trimmed; blanks and repeats are dropped (first occurrence wins).
pub fn create_initial_state_with(
    entries: Vec<(CandidateName, Enrichment)>,
    seed: u64,
    settings: TournamentSettings,
) -> Result<Tournament, TournamentError> {
    let mut candidates: BTreeMap<CandidateName, CandidateRecord> = BTreeMap::new();
    let mut pool = Vec::new();
    for (name, enrichment) in entries {
        let name = name.trim();
        if name.is_empty() || candidates.contains_key(name) {
            continue;
        }
        let record = CandidateRecord::new(settings.initial_rating).with_enrichment(enrichment);
        candidates.insert(name.to_owned(), record);
        pool.push(name.to_owned());
    }
    if pool.len() < 2 {
        return Err(TournamentError::NotEnoughCandidates);
    }

    let mut state = Tournament::blank(candidates, pool, seed, settings);
    let groups = groups_for_round(&state, Phase::Coverage, 0);
    state.install_groups(groups);
    state.current_match = state.current_groups.first().cloned();
    log::info!(
        "Created session: {} candidates, {} coverage group(s), seed {}",
        state.pool.len(),
        state.groups_total,
        seed
    );
    Ok(state)
}

/// Merge enrichment provider results into the state.
///
/// If no result has been applied yet, the first coverage round is rebuilt so
/// tiering and theme clustering see the new data.
pub fn merge_enrichment(
    state: &Tournament,
    updates: &BTreeMap<CandidateName, Enrichment>,
) -> Result<Tournament, TournamentError> {
    let mut next = state.clone();
    for (name, enrichment) in updates {
        next.record_mut(name)?.enrichment = enrichment.clone();
    }
    let untouched = next.phase == Phase::Coverage
        && next.phase_round == 0
        && next.groups_completed == 0
        && next.last_result.is_none();
    if untouched {
        let groups = groups_for_round(&next, Phase::Coverage, 0);
        next.install_groups(groups);
        next.current_match = next.current_groups.first().cloned();
        log::debug!("Rebuilt first coverage round after enrichment merge");
    }
    Ok(next)
}

/// Check that `winner` and `losers` cover `current` exactly, each once.
fn validate_result<S: AsRef<str>>(current: &Group, winner: &str, losers: &[S]) -> Result<(), TournamentError> {
    if !current.iter().any(|n| n == winner) {
        return Err(TournamentError::WinnerNotInMatch(winner.to_owned()));
    }
    let mut seen = BTreeSet::new();
    seen.insert(winner);
    for loser in losers {
        let loser = loser.as_ref();
        if !seen.insert(loser) {
            return Err(TournamentError::DuplicateParticipant(loser.to_owned()));
        }
        if !current.iter().any(|n| n == loser) {
            return Err(TournamentError::LoserNotInMatch(loser.to_owned()));
        }
    }
    if seen.len() != current.len() {
        return Err(TournamentError::LosersMismatch);
    }
    Ok(())
}

/// Apply the winner of the current group (Coverage or Refinement).
///
/// If this completes the round, the round/phase advance runs immediately and
/// its pre-transition snapshot is stored with the undo record.
pub fn apply_group_result<S: AsRef<str>>(
    state: &Tournament,
    winner: &str,
    losers: &[S],
) -> Result<Tournament, TournamentError> {
    if !state.phase.is_group_phase() {
        return Err(TournamentError::InvalidPhase(state.phase));
    }
    let group = state.current_match.clone().ok_or(TournamentError::NoCurrentMatch)?;
    validate_result(&group, winner, losers)?;

    let k = match state.phase {
        Phase::Coverage => state.settings.coverage_k,
        _ => state.settings.full_k,
    };
    let mut next = state.clone();
    let winner_rating = next.rating(winner);
    let loser_ratings: Vec<i32> = losers.iter().map(|l| next.rating(l.as_ref())).collect();
    let (new_winner, new_losers) = group_update(winner_rating, &loser_ratings, k);

    let winner_delta = new_winner - winner_rating;
    next.record_mut(winner)?.record_win(winner_delta);
    let mut loser_deltas = Vec::with_capacity(losers.len());
    for ((name, old), new) in losers.iter().zip(&loser_ratings).zip(&new_losers) {
        let delta = new - old;
        next.record_mut(name.as_ref())?.record_loss(delta);
        loser_deltas.push((name.as_ref().to_owned(), delta));
    }

    next.current_match = None;
    next.groups_completed = (next.groups_completed + 1).min(next.groups_total);
    next.round_counter += 1;

    let mut record = UndoRecord::Group {
        group,
        winner: winner.to_owned(),
        winner_delta,
        losers: loser_deltas,
        snapshot: None,
    };
    if next.groups_completed >= next.groups_total {
        if let Some(snap) = advance(&mut next) {
            record.attach_snapshot(snap);
        }
    }
    next.last_result = Some(record);
    Ok(next)
}

/// Apply the winner of the current Swiss duel.
///
/// Does not finish the tournament; the caller checks [`is_swiss_complete`]
/// and calls [`advance_phase_if_round_complete`] when ready.
pub fn apply_duel_result(state: &Tournament, winner: &str, loser: &str) -> Result<Tournament, TournamentError> {
    if state.phase != Phase::Swiss {
        return Err(TournamentError::InvalidPhase(state.phase));
    }
    let pair = state.current_match.clone().ok_or(TournamentError::NoCurrentMatch)?;
    validate_result(&pair, winner, &[loser])?;

    let mut next = state.clone();
    let (old_winner, old_loser) = (next.rating(winner), next.rating(loser));
    let (new_winner, new_loser) = duel_update(old_winner, old_loser, next.settings.full_k);
    let (winner_delta, loser_delta) = (new_winner - old_winner, new_loser - old_loser);
    next.record_mut(winner)?.record_win(winner_delta);
    next.record_mut(loser)?.record_loss(loser_delta);

    next.matches_played.insert(PairKey::new(winner, loser));
    next.current_match = None;
    next.round_counter += 1;
    next.last_result = Some(UndoRecord::Duel {
        pair,
        winner: winner.to_owned(),
        winner_delta,
        loser: loser.to_owned(),
        loser_delta,
        snapshot: None,
    });
    Ok(next)
}

/// Advance the round or phase if the current one is complete; otherwise return the state unchanged.
pub fn advance_phase_if_round_complete(state: &Tournament) -> Tournament {
    let mut next = state.clone();
    transition_keeping_undo(&mut next);
    next
}

/// Whether the Swiss phase has played enough duels. Always true once Finished.
pub fn is_swiss_complete(state: &Tournament) -> bool {
    match state.phase {
        Phase::Swiss => {
            let n = state.phase_pool.len();
            n < 2 || state.matches_played.len() >= (n / 2) * state.settings.swiss_rounds as usize
        }
        Phase::Finished => true,
        _ => false,
    }
}

/// The next Swiss pair, or `None` when no unplayed pair is left (or not in Swiss).
pub fn next_swiss_pair(state: &Tournament) -> Option<(CandidateName, CandidateName)> {
    if state.phase != Phase::Swiss {
        return None;
    }
    next_pair(
        &state.phase_pool,
        &state.matches_played,
        &state.candidates,
        state.settings.richness_tier_cap,
    )
}

/// Derived Swiss round (0-indexed) from the number of duels played.
pub fn swiss_round(state: &Tournament) -> u32 {
    let per_round = state.phase_pool.len() / 2;
    if state.phase < Phase::Swiss || per_round == 0 {
        return 0;
    }
    (state.matches_played.len() / per_round) as u32
}

/// Present the next match: the next group, or the next Swiss pair.
///
/// Finishes the tournament when the Swiss threshold is met or no pair is
/// left. A match already awaiting a result is left in place.
pub fn begin_next_match(state: &Tournament) -> Tournament {
    let mut next = state.clone();
    if next.current_match.is_some() || next.phase == Phase::Finished {
        return next;
    }
    if next.phase.is_group_phase() && next.groups_completed >= next.groups_total {
        transition_keeping_undo(&mut next);
    }
    match next.phase {
        Phase::Coverage | Phase::Refinement => {
            next.current_match = next.current_groups.get(next.groups_completed).cloned();
        }
        Phase::Swiss => {
            let pair = if is_swiss_complete(&next) {
                None
            } else {
                next_swiss_pair(&next)
            };
            match pair {
                Some((a, b)) => next.current_match = Some(vec![a, b]),
                None => {
                    let snap = next.snapshot();
                    finish(&mut next);
                    if let Some(record) = next.last_result.as_mut() {
                        record.attach_snapshot(snap);
                    }
                }
            }
        }
        Phase::Finished => {}
    }
    next
}

/// Run `advance` and hand its snapshot to the pending undo record.
fn transition_keeping_undo(state: &mut Tournament) {
    if let Some(snap) = advance(state) {
        if let Some(record) = state.last_result.as_mut() {
            record.attach_snapshot(snap);
        }
    }
}

/// Perform a round or phase transition if one is due. Returns the pre-transition snapshot.
fn advance(state: &mut Tournament) -> Option<TransitionSnapshot> {
    match state.phase {
        Phase::Coverage | Phase::Refinement if state.groups_completed < state.groups_total => None,
        Phase::Coverage => {
            let snap = state.snapshot();
            state.phase_round += 1;
            if state.phase_round < state.settings.coverage_rounds {
                let groups = groups_for_round(state, Phase::Coverage, state.phase_round);
                state.install_groups(groups);
                log::info!("Coverage round {} with {} group(s)", state.phase_round, state.groups_total);
            } else {
                let keep = state.settings.coverage_cut_size(state.pool.len());
                enter_refinement(state, keep);
            }
            Some(snap)
        }
        Phase::Refinement => {
            let snap = state.snapshot();
            let keep = state.settings.swiss_cut_size(state.pool.len());
            enter_swiss(state, keep);
            Some(snap)
        }
        Phase::Swiss if is_swiss_complete(state) => {
            let snap = state.snapshot();
            finish(state);
            Some(snap)
        }
        Phase::Swiss | Phase::Finished => None,
    }
}

fn enter_refinement(state: &mut Tournament, keep: usize) {
    let cut = top_by_rating(state, &state.pool, keep);
    state.pool = cut.clone();
    state.phase_pool = cut;
    state.phase = Phase::Refinement;
    state.phase_round = 0;
    let groups = groups_for_round(state, Phase::Refinement, 0);
    state.install_groups(groups);
    log::info!(
        "Refinement phase: {} candidates in {} group(s)",
        state.pool.len(),
        state.groups_total
    );
}

fn enter_swiss(state: &mut Tournament, keep: usize) {
    let cut = top_by_rating(state, &state.pool, keep);
    state.pool = cut.clone();
    state.phase_pool = cut;
    state.phase = Phase::Swiss;
    state.phase_round = 0;
    state.matches_played.clear();
    state.install_groups(Vec::new());
    log::info!("Swiss phase: {} finalists", state.pool.len());
    if is_swiss_complete(state) {
        finish(state);
    }
}

fn finish(state: &mut Tournament) {
    state.phase = Phase::Finished;
    state.current_match = None;
    log::info!("Tournament finished after {} results", state.round_counter);
}

/// The `keep` highest-rated names; ties keep pool order.
pub(crate) fn top_by_rating(state: &Tournament, names: &[CandidateName], keep: usize) -> Vec<CandidateName> {
    let mut ranked: Vec<CandidateName> = names.to_vec();
    ranked.sort_by_key(|n| Reverse(state.rating(n)));
    ranked.truncate(keep);
    ranked
}

/// Groups for the given phase and round over the current phase pool.
pub(crate) fn groups_for_round(state: &Tournament, phase: Phase, phase_round: u32) -> Vec<Group> {
    let settings = &state.settings;
    let (round, group_size) = match phase {
        Phase::Refinement => (settings.coverage_rounds + phase_round, settings.refinement_group_size),
        _ => (phase_round, settings.coverage_group_size),
    };
    let params = GroupingParams {
        seed: state.seed,
        round,
        group_size,
        tier_cap: settings.richness_tier_cap,
    };
    if phase == Phase::Coverage && phase_round == 0 {
        build_coverage_groups(&state.phase_pool, &state.candidates, params)
    } else {
        build_elo_proximity_groups(&state.phase_pool, &state.candidates, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("C{i:02}")).collect()
    }

    #[test]
    fn validate_rejects_outsiders_and_duplicates() {
        let group: Group = vec!["A".into(), "B".into(), "C".into()];
        assert_eq!(
            validate_result(&group, "Z", &["A", "B"]),
            Err(TournamentError::WinnerNotInMatch("Z".into()))
        );
        assert_eq!(
            validate_result(&group, "A", &["B", "Z"]),
            Err(TournamentError::LoserNotInMatch("Z".into()))
        );
        assert_eq!(
            validate_result(&group, "A", &["B", "B"]),
            Err(TournamentError::DuplicateParticipant("B".into()))
        );
        assert_eq!(validate_result(&group, "A", &["B"]), Err(TournamentError::LosersMismatch));
        assert_eq!(validate_result(&group, "A", &["C", "B"]), Ok(()));
    }

    #[test]
    fn top_by_rating_keeps_pool_order_on_ties() {
        let mut state = create_initial_state(&names(5), 1).unwrap();
        state.candidates.get_mut("C03").unwrap().rating = 1200;
        let top = top_by_rating(&state, &state.pool, 3);
        assert_eq!(top, vec!["C03".to_string(), "C00".into(), "C01".into()]);
    }

    #[test]
    fn swiss_round_counts_full_rounds() {
        let mut state = create_initial_state(&names(4), 1).unwrap();
        state.phase = Phase::Swiss;
        state.matches_played.insert(PairKey::new("C00", "C01"));
        state.matches_played.insert(PairKey::new("C02", "C03"));
        state.matches_played.insert(PairKey::new("C00", "C02"));
        assert_eq!(swiss_round(&state), 1);
    }
}
